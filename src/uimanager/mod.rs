//! UI Manager - the entry point the script side talks to.
//!
//! Creates and clones nodes through the component registry, owns one
//! [`ShadowTree`](crate::ShadowTree) per running surface and answers layout
//! queries against the newest committed revision.

mod delegate;
mod ui_manager;

pub use delegate::{LayoutEvent, UIManagerDelegate};
pub use ui_manager::UIManager;
