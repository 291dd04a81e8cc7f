//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use parking_lot::Mutex;
use serde_json::Value;
use spark_shadow::{
    LayoutConstraints, LayoutEvent, MountingCoordinator, ShadowConfig, ShadowNode, Size,
    SurfaceId, Tag, UIManager, UIManagerDelegate,
};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Installs a test-writer subscriber once per binary. `RUST_LOG` picks the
/// level.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub const SURFACE: SurfaceId = 1;

/// Manager with the default components and surface [`SURFACE`] started at
/// `width`×`height`.
pub fn manager_with_surface(width: f32, height: f32) -> Arc<UIManager> {
    init_tracing();
    let manager = UIManager::with_default_components(ShadowConfig::default());
    manager
        .start_surface(
            SURFACE,
            LayoutConstraints::exact(Size::new(width, height)),
            None,
        )
        .unwrap();
    manager
}

pub fn create(manager: &UIManager, tag: Tag, name: &str, props: Value) -> Arc<ShadowNode> {
    manager.create_node(tag, name, SURFACE, &props.into(), None)
}

/// Records everything the manager reports.
#[derive(Default)]
pub struct RecordingDelegate {
    pub transactions: Mutex<Vec<u64>>,
    pub created: Mutex<Vec<Tag>>,
    pub commands: Mutex<Vec<(Tag, String, Value)>>,
    pub layout_events: Mutex<Vec<LayoutEvent>>,
}

impl UIManagerDelegate for RecordingDelegate {
    fn ui_manager_did_finish_transaction(
        &self,
        coordinator: &Arc<MountingCoordinator>,
        _mount_synchronously: bool,
    ) {
        if let Some(transaction) = coordinator.pull_transaction() {
            self.transactions.lock().push(transaction.number);
        }
    }

    fn ui_manager_did_create_shadow_node(&self, node: &Arc<ShadowNode>) {
        self.created.lock().push(node.tag());
    }

    fn ui_manager_did_dispatch_command(&self, node: &Arc<ShadowNode>, command: &str, args: &Value) {
        self.commands
            .lock()
            .push((node.tag(), command.to_string(), args.clone()));
    }

    fn ui_manager_did_layout(&self, events: &[LayoutEvent]) {
        self.layout_events.lock().extend_from_slice(events);
    }
}
