//! Concrete components and the registry that maps names to them.
//!
//! - [`RootComponentDescriptor`]: top node of a surface, carries constraints
//! - [`ViewComponentDescriptor`]: generic container
//! - [`ScrollViewComponentDescriptor`]: container with a scroll offset in state
//! - [`ParagraphComponentDescriptor`]: measurable text leaf
//! - [`UnimplementedViewComponentDescriptor`]: fallback for unknown names

mod paragraph;
mod registry;
mod root;
mod scroll_view;
mod unimplemented;
mod view;

pub use paragraph::{ParagraphComponentDescriptor, ParagraphProps};
pub use registry::ComponentDescriptorRegistry;
pub use root::{
    clone_root_with_constraints, create_root_node, layout_if_needed, RootComponentDescriptor,
    RootProps,
};
pub use scroll_view::{ScrollViewComponentDescriptor, ScrollViewState};
pub use unimplemented::{UnimplementedViewComponentDescriptor, UNIMPLEMENTED_COMPONENT_NAME};
pub use view::{PointerEventsMode, ViewComponentDescriptor, ViewProps};
