use std::sync::Arc;

use serde_json::Value;

use crate::mounting::MountingCoordinator;
use crate::shadow::{EventTarget, ShadowNode};
use crate::types::{Rect, SurfaceId, Tag};

/// New frame of a node whose layout changed in a commit.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEvent {
    pub surface_id: SurfaceId,
    pub tag: Tag,
    pub target: Option<EventTarget>,
    pub frame: Rect,
}

/// Receives what a [`UIManager`](super::UIManager) produces. Called outside
/// every lock of the manager and its trees.
pub trait UIManagerDelegate: Send + Sync {
    /// A revision is ready to be pulled from `coordinator`.
    fn ui_manager_did_finish_transaction(
        &self,
        coordinator: &Arc<MountingCoordinator>,
        mount_synchronously: bool,
    );

    fn ui_manager_did_create_shadow_node(&self, _node: &Arc<ShadowNode>) {}

    fn ui_manager_did_dispatch_command(&self, _node: &Arc<ShadowNode>, _command: &str, _args: &Value) {}

    fn ui_manager_did_layout(&self, _events: &[LayoutEvent]) {}
}
