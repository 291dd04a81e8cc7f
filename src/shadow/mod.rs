//! Shadow nodes and the types they are built from.
//!
//! - [`ShadowNode`]: immutable-once-sealed snapshot of one node
//! - [`ShadowNodeFamily`]: identity shared by every clone of a logical node
//! - [`Props`] / [`RawProps`]: parsed props and the JSON bag they came from
//! - [`State`]: identity-compared state box
//! - [`ShadowNodeTraits`]: capability flags
//! - [`ComponentDescriptor`]: per-component factory and policy

mod component_descriptor;
mod family;
mod props;
mod shadow_node;
mod state;
mod traits;

pub use component_descriptor::{
    ComponentDescriptor, ComponentDescriptorExt, SharedComponentDescriptor,
};
pub use family::{
    AncestorList, EventTarget, RevisionStamp, ShadowNodeFamily, ShadowNodeFamilyFragment,
};
pub use props::{Props, PropsKind, PropsParserContext, RawProps};
pub use shadow_node::{
    ShadowNode, ShadowNodeFragment, ShadowNodeList, SharedShadowNode, SharedShadowNodeList,
};
pub use state::{State, StateData, StateUpdate};
pub use traits::ShadowNodeTraits;
