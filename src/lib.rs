//! # spark-shadow
//!
//! Persistent UI shadow tree with copy-on-write flexbox layout.
//!
//! ## Architecture
//!
//! A surface is a tree of immutable [`ShadowNode`] snapshots. Every logical
//! node keeps one [`ShadowNodeFamily`] for its whole life; edits clone the
//! path from the edited node to the root and share everything else.
//!
//! Layout runs through [taffy](https://github.com/DioxusLabs/taffy) on the
//! candidate tree of each commit. A layout node may only be written while it
//! belongs to the revision being built; nodes shared with a committed
//! revision are cloned before the first write.
//!
//! ```text
//! UIManager::create_node → ComponentDescriptor → ShadowNode
//!          ↓
//! ShadowTree::commit(transaction) → commit hooks → layout → seal → install
//!          ↓
//! MountingCoordinator::pull_transaction (old root, new root)
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Tags, geometry and layout value types
//! - [`shadow`] - Shadow nodes, families, props, state, traits, descriptors
//! - [`components`] - Concrete components and the descriptor registry
//! - [`layout`] - Layout style, the taffy integration, hit testing, text measurement
//! - [`mounting`] - Shadow tree commit protocol, hooks, mounting coordinator
//! - [`uimanager`] - Top-level orchestration
//! - [`config`] - Runtime configuration
//! - [`error`] - Recoverable error type

pub mod components;
pub mod config;
pub mod error;
pub mod layout;
pub mod mounting;
pub mod shadow;
pub mod types;
pub mod uimanager;

#[cfg(test)]
mod test_utils;

// Re-export commonly used items
pub use types::*;

pub use config::ShadowConfig;
pub use error::{Error, Result};

pub use shadow::{
    ComponentDescriptor, ComponentDescriptorExt, EventTarget, Props, PropsKind,
    PropsParserContext, RawProps, RevisionStamp, ShadowNode, ShadowNodeFamily,
    ShadowNodeFamilyFragment, ShadowNodeFragment, ShadowNodeList, ShadowNodeTraits,
    SharedComponentDescriptor, SharedShadowNodeList, State, StateData, StateUpdate,
};

pub use components::{
    ComponentDescriptorRegistry, ParagraphComponentDescriptor, ParagraphProps,
    PointerEventsMode, RootComponentDescriptor, RootProps, ScrollViewComponentDescriptor,
    ScrollViewState, UnimplementedViewComponentDescriptor, ViewComponentDescriptor, ViewProps,
};

pub use layout::{
    compute_relative_layout_metrics, find_node_at_point, measure_text, string_width,
    wrap_text, LayoutNodeId, StyleLength, TextAttributes, TextMeasureCache, YogaStyle,
};

pub use mounting::{
    CommitHook, CommitHookRegistry, CommitOptions, CommitStatus, MountingCoordinator,
    MountingTransaction, ShadowTree, ShadowTreeDelegate, ShadowTreeRegistry,
    ShadowTreeRevision, SharedCommitHook,
};

pub use uimanager::{LayoutEvent, UIManager, UIManagerDelegate};
