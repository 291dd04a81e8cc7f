//! Layout Module
//!
//! Flexbox layout of shadow trees using Taffy.
//!
//! # Architecture
//!
//! The layout module uses [Taffy](https://github.com/DioxusLabs/taffy) for
//! W3C-compliant flexbox computation. Every layoutable shadow node owns a
//! mutable [`YogaNode`](yoga_node::YogaNode) holding its style, its layout
//! children, Taffy's cache and the last computed layout.
//!
//! 1. Props are parsed into a [`YogaStyle`] on create and clone
//! 2. Layout children are reconciled with shadow children, keeping the dirty
//!    flag when nothing relevant changed
//! 3. `ShadowNode::layout_tree` runs Taffy's low-level traits over a
//!    per-pass table and writes frames back into the shadow nodes
//! 4. Measurable leaves are sized by their component descriptor
//!
//! Hit testing and relative metrics read the written-back metrics only.

mod layout_tree;
mod layoutable;
mod style;
mod text_measure;
mod yoga_node;

pub use hit_test::{compute_relative_layout_metrics, find_node_at_point};
pub use style::{
    Align, Direction, Display, Edge, Edges, FlexDirection, Justify, Overflow, PositionType,
    StyleLength, Wrap, YogaStyle,
};
pub use text_measure::{
    measure_text, measure_text_height, string_width, truncate_text, wrap_text, TextAttributes,
    TextMeasureCache,
};
pub use yoga_node::{LayoutNodeId, YogaNode};
