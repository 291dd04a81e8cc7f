//! Mounting Module
//!
//! The commit side of a surface and the hand-off to whoever mounts it.
//!
//! - [`ShadowTree`]: committed root and the commit protocol
//! - [`CommitHookRegistry`]: ordered interceptors shared by all trees
//! - [`MountingCoordinator`]: revisions waiting to be mounted
//! - [`ShadowTreeRegistry`]: surface id lookup

mod commit_hook;
mod coordinator;
mod registry;
mod shadow_tree;

pub use commit_hook::{CommitHook, CommitHookRegistry, SharedCommitHook};
pub use coordinator::{MountingCoordinator, MountingTransaction};
pub use registry::ShadowTreeRegistry;
pub use shadow_tree::{
    CommitOptions, CommitStatus, ShadowTree, ShadowTreeDelegate, ShadowTreeRevision,
    INITIAL_REVISION,
};
