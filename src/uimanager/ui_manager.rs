use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::delegate::{LayoutEvent, UIManagerDelegate};
use crate::components::{clone_root_with_constraints, ComponentDescriptorRegistry};
use crate::config::ShadowConfig;
use crate::error::Result;
use crate::layout;
use crate::mounting::{
    CommitHookRegistry, CommitOptions, CommitStatus, ShadowTree, ShadowTreeDelegate,
    ShadowTreeRegistry, ShadowTreeRevision, SharedCommitHook,
};
use crate::shadow::{
    ComponentDescriptorExt, EventTarget, PropsParserContext, RawProps, ShadowNode,
    ShadowNodeFamilyFragment, ShadowNodeFragment, ShadowNodeList, SharedShadowNodeList,
    StateData, StateUpdate,
};
use crate::types::{LayoutConstraints, LayoutContext, LayoutMetrics, Point, SurfaceId, Tag};

pub struct UIManager {
    this: Weak<UIManager>,
    config: ShadowConfig,
    components: Arc<ComponentDescriptorRegistry>,
    trees: ShadowTreeRegistry,
    hooks: Arc<CommitHookRegistry>,
    delegate: RwLock<Option<Arc<dyn UIManagerDelegate>>>,
}

impl UIManager {
    pub fn new(components: Arc<ComponentDescriptorRegistry>, config: ShadowConfig) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            config,
            components,
            trees: ShadowTreeRegistry::new(),
            hooks: Arc::new(CommitHookRegistry::new()),
            delegate: RwLock::new(None),
        })
    }

    /// Manager with the built-in components registered.
    pub fn with_default_components(config: ShadowConfig) -> Arc<Self> {
        let components = Arc::new(ComponentDescriptorRegistry::with_default_components(&config));
        Self::new(components, config)
    }

    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    pub fn component_registry(&self) -> &Arc<ComponentDescriptorRegistry> {
        &self.components
    }

    pub fn shadow_tree_registry(&self) -> &ShadowTreeRegistry {
        &self.trees
    }

    pub fn set_delegate(&self, delegate: Option<Arc<dyn UIManagerDelegate>>) {
        *self.delegate.write() = delegate;
    }

    pub fn delegate(&self) -> Option<Arc<dyn UIManagerDelegate>> {
        self.delegate.read().clone()
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Creates a node of component `name`. Unknown names get the fallback
    /// descriptor, which keeps `name` in its props.
    pub fn create_node(
        &self,
        tag: Tag,
        name: &str,
        surface_id: SurfaceId,
        raw_props: &RawProps,
        event_target: Option<EventTarget>,
    ) -> Arc<ShadowNode> {
        let descriptor = self.components.at(name);
        let context = PropsParserContext {
            surface_id,
            component_name: self
                .components
                .is_fallback(&descriptor)
                .then(|| name.to_string()),
        };

        let family = descriptor.create_family(ShadowNodeFamilyFragment { tag, surface_id }, event_target);
        let props = descriptor.clone_props(&context, None, raw_props);
        let state = descriptor.create_initial_state(&props, &family);
        let node = descriptor.create_shadow_node(
            ShadowNodeFragment {
                props: Some(props),
                children: None,
                state,
            },
            family,
        );
        trace!(tag, surface_id, component = name, "node created");

        if let Some(delegate) = self.delegate() {
            delegate.ui_manager_did_create_shadow_node(&node);
        }
        node
    }

    /// Clones `node` with new children and/or a props update. `None` keeps
    /// the source's. A state older than the family's newest committed one
    /// is replaced on the way.
    pub fn clone_node(
        &self,
        node: &ShadowNode,
        children: Option<SharedShadowNodeList>,
        raw_props: Option<&RawProps>,
    ) -> Arc<ShadowNode> {
        let descriptor = node.component_descriptor();
        let context = PropsParserContext {
            surface_id: node.surface_id(),
            component_name: None,
        };
        let props = raw_props.map(|raw| descriptor.clone_props(&context, Some(node.props()), raw));
        let state = node.state().and_then(|state| state.most_recent_if_obsolete());

        node.clone_with(ShadowNodeFragment {
            props,
            children,
            state,
        })
    }

    pub fn append_child(&self, parent: &ShadowNode, child: Arc<ShadowNode>) {
        parent.component_descriptor().append_child(parent, child);
    }

    // =========================================================================
    // Surfaces
    // =========================================================================

    /// Starts a surface with an empty root. `context` defaults to the
    /// configured one.
    pub fn start_surface(
        &self,
        surface_id: SurfaceId,
        constraints: LayoutConstraints,
        context: Option<LayoutContext>,
    ) -> Result<()> {
        let delegate: Weak<dyn ShadowTreeDelegate> = self.this.clone();
        let tree = ShadowTree::new(
            surface_id,
            constraints,
            context.unwrap_or_else(|| self.config.layout_context()),
            Arc::clone(&self.hooks),
            Some(delegate),
        );
        self.trees.add(Arc::new(tree))?;
        debug!(surface_id, "surface started");
        Ok(())
    }

    /// Stops a surface: commits an empty tree so the consumer unmounts
    /// everything, then forgets the tree. The families of the last mounted
    /// nodes drop what its commits recorded on them.
    pub fn stop_surface(&self, surface_id: SurfaceId) -> Option<Arc<ShadowTree>> {
        let Some(tree) = self.trees.remove(surface_id) else {
            warn!(surface_id, "stop of unknown surface");
            return None;
        };
        let last = tree.current_revision().root;
        tree.commit_empty_tree();
        last.forget_commits();
        debug!(surface_id, "surface stopped");
        Some(tree)
    }

    /// Replaces the children of the surface's root with `root_children`.
    /// `None` when the surface is not running.
    pub fn complete_surface(
        &self,
        surface_id: SurfaceId,
        root_children: ShadowNodeList,
    ) -> Option<CommitStatus> {
        let options = self.config.surface_commit_options();
        let status = self.trees.visit(surface_id, move |tree| {
            tree.commit(
                move |root| {
                    Some(root.clone_with(ShadowNodeFragment::with_children(Arc::new(root_children))))
                },
                options,
            )
        });
        if status.is_none() {
            warn!(surface_id, "complete of unknown surface");
        }
        status
    }

    /// Lays the surface out again under new constraints. `context` defaults
    /// to the root's current one.
    pub fn constraint_surface_layout(
        &self,
        surface_id: SurfaceId,
        constraints: LayoutConstraints,
        context: Option<LayoutContext>,
    ) -> Option<CommitStatus> {
        let fallback_context = self.config.layout_context();
        self.trees.visit(surface_id, |tree| {
            tree.commit(
                |root| {
                    let context = context.unwrap_or_else(|| {
                        root.props()
                            .root_props()
                            .map_or(fallback_context, |props| props.layout_context)
                    });
                    Some(clone_root_with_constraints(root, constraints, context))
                },
                CommitOptions::default(),
            )
        })
    }

    pub fn current_revision(&self, surface_id: SurfaceId) -> Option<ShadowTreeRevision> {
        self.trees.visit(surface_id, ShadowTree::current_revision)
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Commits the reducer's result as the new state of the update's family.
    ///
    /// Cancelled when the family is not in the current tree or the reducer
    /// returns `None`; `None` when the surface is not running.
    pub fn update_state(&self, update: &StateUpdate) -> Option<CommitStatus> {
        let surface_id = update.family.surface_id();
        self.trees.visit(surface_id, |tree| {
            tree.commit(|root| apply_state_update(root, update), CommitOptions::default())
        })
    }

    /// Like [`update_state`](Self::update_state), retrying cancelled commits
    /// up to `max_attempts` times (the configured bound when `None`).
    pub fn update_state_with_retry(
        &self,
        update: &StateUpdate,
        max_attempts: Option<usize>,
    ) -> Result<()> {
        let surface_id = update.family.surface_id();
        let max_attempts = max_attempts.unwrap_or(self.config.state_update_max_attempts);
        let Some(tree) = self.trees.get(surface_id) else {
            warn!(surface_id, "state update for unknown surface");
            return Ok(());
        };
        tree.commit_with_retry(
            max_attempts,
            |root| apply_state_update(root, update),
            CommitOptions::default(),
        )
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The node of `node`'s family in the current revision of its surface.
    pub fn get_newest_clone_of_shadow_node(&self, node: &ShadowNode) -> Option<Arc<ShadowNode>> {
        let tree = self.trees.get(node.surface_id())?;
        let revision = tree.current_revision();
        let family = node.family();

        if let Some((stamp, recent)) = family.most_recent_node() {
            if stamp == tree.revision_stamp(&revision) {
                return Some(recent);
            }
        }
        if Arc::ptr_eq(family, revision.root.family()) {
            return Some(revision.root);
        }
        let ancestors = family.ancestors(&revision.root);
        let (parent, index) = ancestors.last()?;
        Some(Arc::clone(&parent.children()[*index]))
    }

    /// Metrics of the newest clone of `node`, `EMPTY` when it is gone.
    pub fn layout_metrics(&self, node: &ShadowNode) -> LayoutMetrics {
        self.get_newest_clone_of_shadow_node(node)
            .map_or(LayoutMetrics::EMPTY, |newest| newest.layout_metrics())
    }

    /// Metrics of `node` with the frame relative to `ancestor` (the surface
    /// root when `None`), both resolved to their newest clones.
    pub fn get_relative_layout_metrics(
        &self,
        node: &ShadowNode,
        ancestor: Option<&ShadowNode>,
    ) -> LayoutMetrics {
        let ancestor = match ancestor {
            Some(ancestor) => self.get_newest_clone_of_shadow_node(ancestor),
            None => self
                .current_revision(node.surface_id())
                .map(|revision| revision.root),
        };
        ancestor.map_or(LayoutMetrics::EMPTY, |ancestor| {
            layout::compute_relative_layout_metrics(node.family(), &ancestor)
        })
    }

    /// Deepest node under `point` (in the parent space of `node`) within
    /// the newest clone of `node`.
    pub fn find_node_at_point(&self, node: &ShadowNode, point: Point) -> Option<Arc<ShadowNode>> {
        let newest = self.get_newest_clone_of_shadow_node(node)?;
        layout::find_node_at_point(&newest, point)
    }

    // =========================================================================
    // Hooks & Commands
    // =========================================================================

    pub fn register_commit_hook(&self, hook: SharedCommitHook) {
        self.hooks.register(hook);
    }

    pub fn unregister_commit_hook(&self, hook: &SharedCommitHook) -> bool {
        self.hooks.unregister(hook)
    }

    /// Forwards an imperative command to the delegate.
    pub fn dispatch_command(&self, node: &Arc<ShadowNode>, command: &str, args: &Value) {
        match self.delegate() {
            Some(delegate) => delegate.ui_manager_did_dispatch_command(node, command, args),
            None => debug!(tag = node.tag(), command, "command dropped, no delegate"),
        }
    }
}

/// Clones the path to the update's family with the reducer's new state.
fn apply_state_update(root: &Arc<ShadowNode>, update: &StateUpdate) -> Option<Arc<ShadowNode>> {
    root.clone_tree(&update.family, |old| {
        let current = old.state().map_or(StateData::Empty, |state| state.data().clone());
        let data = (update.reducer)(&current)?;
        let state = old.component_descriptor().create_state(&update.family, data);
        Some(old.clone_with(ShadowNodeFragment::with_state(state)))
    })
}

impl ShadowTreeDelegate for UIManager {
    fn shadow_tree_did_finish_transaction(&self, tree: &ShadowTree, mount_synchronously: bool) {
        if let Some(delegate) = self.delegate() {
            delegate.ui_manager_did_finish_transaction(tree.mounting_coordinator(), mount_synchronously);
        }
    }

    fn shadow_tree_did_layout(&self, tree: &ShadowTree, affected: &[Arc<ShadowNode>]) {
        let Some(delegate) = self.delegate() else {
            return;
        };
        let events: Vec<LayoutEvent> = affected
            .iter()
            .map(|node| LayoutEvent {
                surface_id: tree.surface_id(),
                tag: node.tag(),
                target: node.family().event_target().cloned(),
                frame: node.layout_metrics().frame,
            })
            .collect();
        delegate.ui_manager_did_layout(&events);
    }
}

impl fmt::Debug for UIManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UIManager")
            .field("surfaces", &self.trees.surface_ids())
            .field("components", &self.components)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Size;
    use serde_json::json;

    fn manager() -> Arc<UIManager> {
        let manager = UIManager::with_default_components(ShadowConfig::default());
        manager
            .start_surface(1, LayoutConstraints::exact(Size::new(100.0, 100.0)), None)
            .unwrap();
        manager
    }

    #[test]
    fn test_create_node_resolves_descriptor() {
        let manager = manager();
        let node = manager.create_node(2, "RCTView", 1, &json!({ "width": 10 }).into(), None);
        assert_eq!(node.component_name(), "View");
        assert_eq!(node.tag(), 2);
        assert!(!node.is_sealed());

        let unknown = manager.create_node(3, "MapView", 1, &RawProps::new(), None);
        assert_eq!(unknown.props().unimplemented_component_name(), Some("MapView"));
    }

    #[test]
    fn test_clone_node_without_props_shares_props() {
        let manager = manager();
        let node = manager.create_node(2, "View", 1, &json!({ "width": 10 }).into(), None);
        let clone = manager.clone_node(&node, None, None);
        assert!(Arc::ptr_eq(node.props(), clone.props()));
        assert!(node.same_family(&clone));

        let updated = manager.clone_node(&node, None, Some(&json!({ "height": 5 }).into()));
        assert_eq!(updated.props().raw.get_f32("width"), Some(10.0));
        assert_eq!(updated.props().raw.get_f32("height"), Some(5.0));
    }

    #[test]
    fn test_unknown_surface_is_a_no_op() {
        let manager = manager();
        assert!(manager.complete_surface(9, Vec::new()).is_none());
        assert!(manager.stop_surface(9).is_none());
        assert!(manager.current_revision(9).is_none());
    }

    #[test]
    fn test_start_twice_is_an_error() {
        let manager = manager();
        let err = manager
            .start_surface(1, LayoutConstraints::default(), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "surface 1 is already running");
    }

    #[test]
    fn test_newest_clone_follows_commits() {
        let manager = manager();
        let child = manager.create_node(2, "View", 1, &json!({ "height": 10 }).into(), None);
        manager.complete_surface(1, vec![child.clone()]);
        let newest = manager.get_newest_clone_of_shadow_node(&child).unwrap();
        assert!(Arc::ptr_eq(&newest, &child));

        let resized = manager.clone_node(&child, None, Some(&json!({ "height": 20 }).into()));
        manager.complete_surface(1, vec![resized.clone()]);
        let newest = manager.get_newest_clone_of_shadow_node(&child).unwrap();
        assert!(Arc::ptr_eq(&newest, &resized));
        assert_eq!(manager.layout_metrics(&child).frame.size, Size::new(100.0, 20.0));

        // Root resolves through its family too.
        let root = manager.current_revision(1).unwrap().root;
        let newest_root = manager.get_newest_clone_of_shadow_node(&root).unwrap();
        assert!(Arc::ptr_eq(&newest_root, &root));
    }
}
