//! The shadow node.
//!
//! A node is mutable only until it is sealed. Sealing happens recursively
//! when a tree is committed; after that every edit goes through
//! [`ShadowNode::clone_with`], which shares whatever the fragment does not
//! replace. Children lists are `Arc`-shared and copied on first write.

use std::fmt;
use std::ptr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};

use super::component_descriptor::SharedComponentDescriptor;
use super::family::{RevisionStamp, ShadowNodeFamily};
use super::props::Props;
use super::state::State;
use super::traits::ShadowNodeTraits;
use crate::layout::YogaNode;
use crate::types::{LayoutMetrics, SurfaceId, Tag};

pub type SharedShadowNode = Arc<ShadowNode>;
pub type ShadowNodeList = Vec<Arc<ShadowNode>>;
pub type SharedShadowNodeList = Arc<ShadowNodeList>;

// =============================================================================
// Fragment
// =============================================================================

/// The fields a create or clone sets. `None` means "keep the source's".
#[derive(Debug, Clone, Default)]
pub struct ShadowNodeFragment {
    pub props: Option<Arc<Props>>,
    pub children: Option<SharedShadowNodeList>,
    pub state: Option<Arc<State>>,
}

impl ShadowNodeFragment {
    pub fn with_props(props: Arc<Props>) -> Self {
        Self {
            props: Some(props),
            ..Default::default()
        }
    }

    pub fn with_children(children: SharedShadowNodeList) -> Self {
        Self {
            children: Some(children),
            ..Default::default()
        }
    }

    pub fn with_state(state: Arc<State>) -> Self {
        Self {
            state: Some(state),
            ..Default::default()
        }
    }
}

// =============================================================================
// Shadow Node
// =============================================================================

pub struct ShadowNode {
    family: Arc<ShadowNodeFamily>,
    traits: ShadowNodeTraits,
    props: Arc<Props>,
    state: Option<Arc<State>>,
    children: RwLock<SharedShadowNodeList>,
    layout_metrics: RwLock<LayoutMetrics>,
    yoga: Option<Mutex<YogaNode>>,
    sealed: AtomicBool,
    /// Clone generation, 1 for a freshly created node.
    revision: u32,
}

impl ShadowNode {
    /// Builds a new unsealed node.
    ///
    /// Prefer `ComponentDescriptor::create_shadow_node`, which picks the
    /// traits for the component.
    pub fn new(
        fragment: ShadowNodeFragment,
        family: Arc<ShadowNodeFamily>,
        traits: ShadowNodeTraits,
    ) -> Self {
        let props = fragment.props.unwrap_or_default();
        let children = fragment.children.unwrap_or_default();

        let yoga = traits.contains(ShadowNodeTraits::YOGA_LAYOUTABLE).then(|| {
            Mutex::new(YogaNode::new(
                props.view.yoga_style.clone(),
                traits.contains(ShadowNodeTraits::MEASURABLE_YOGA_NODE),
            ))
        });

        let node = Self {
            family,
            traits,
            props,
            state: fragment.state,
            children: RwLock::new(children),
            layout_metrics: RwLock::new(LayoutMetrics::EMPTY),
            yoga,
            sealed: AtomicBool::new(false),
            revision: 1,
        };
        node.update_yoga_children();
        node
    }

    /// Copy constructor: a new unsealed node of the same family with the
    /// fragment's fields replaced.
    pub fn from_source(
        source: &ShadowNode,
        fragment: ShadowNodeFragment,
        traits: ShadowNodeTraits,
    ) -> Self {
        let props_changed = fragment.props.is_some();
        let children_changed = fragment.children.is_some();

        let props = fragment.props.unwrap_or_else(|| Arc::clone(&source.props));
        let state = fragment.state.or_else(|| source.state.clone());
        let children = fragment.children.unwrap_or_else(|| source.children());

        let yoga = source.yoga.as_ref().map(|yoga| {
            let mut yoga = yoga.lock().clone_for_new_owner();
            if traits.intersects(
                ShadowNodeTraits::DIRTY_YOGA_NODE | ShadowNodeTraits::MEASURABLE_YOGA_NODE,
            ) {
                yoga.set_dirty(true);
            }
            Mutex::new(yoga)
        });

        let node = Self {
            family: Arc::clone(&source.family),
            traits,
            props,
            state,
            children: RwLock::new(children),
            layout_metrics: RwLock::new(source.layout_metrics()),
            yoga,
            sealed: AtomicBool::new(false),
            revision: source.revision + 1,
        };
        if props_changed {
            node.update_yoga_props();
        }
        if children_changed {
            node.update_yoga_children();
        }
        node
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub fn family(&self) -> &Arc<ShadowNodeFamily> {
        &self.family
    }

    #[inline]
    pub fn tag(&self) -> Tag {
        self.family.tag()
    }

    #[inline]
    pub fn surface_id(&self) -> SurfaceId {
        self.family.surface_id()
    }

    pub fn component_name(&self) -> &'static str {
        self.family.component_name()
    }

    pub fn component_descriptor(&self) -> &SharedComponentDescriptor {
        self.family.component_descriptor()
    }

    #[inline]
    pub fn traits(&self) -> ShadowNodeTraits {
        self.traits
    }

    #[inline]
    pub fn props(&self) -> &Arc<Props> {
        &self.props
    }

    #[inline]
    pub fn state(&self) -> Option<&Arc<State>> {
        self.state.as_ref()
    }

    /// Snapshot of the children list. Cheap: the list is shared.
    pub fn children(&self) -> SharedShadowNodeList {
        Arc::clone(&self.children.read())
    }

    #[inline]
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Same logical node, possibly a different snapshot.
    pub fn same_family(&self, other: &ShadowNode) -> bool {
        Arc::ptr_eq(&self.family, &other.family)
    }

    pub fn layout_metrics(&self) -> LayoutMetrics {
        *self.layout_metrics.read()
    }

    pub fn set_layout_metrics(&self, layout_metrics: LayoutMetrics) {
        self.ensure_unsealed();
        *self.layout_metrics.write() = layout_metrics;
    }

    pub(crate) fn yoga(&self) -> Option<&Mutex<YogaNode>> {
        self.yoga.as_ref()
    }

    // -------------------------------------------------------------------------
    // Sealing
    // -------------------------------------------------------------------------

    #[inline]
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    pub fn seal(&self) {
        self.sealed.store(true, Ordering::Release);
    }

    /// Seals this node and everything below it. A sealed node's subtree is
    /// already sealed, so the walk stops there.
    pub fn seal_recursive(&self) {
        if self.is_sealed() {
            return;
        }
        self.seal();
        for child in self.children().iter() {
            child.seal_recursive();
        }
    }

    /// Panics when the node is sealed. Every mutation goes through here.
    pub fn ensure_unsealed(&self) {
        assert!(
            !self.is_sealed(),
            "attempt to mutate a sealed ShadowNode (tag {}, {})",
            self.tag(),
            self.component_name()
        );
    }

    // -------------------------------------------------------------------------
    // Cloning & Mutation
    // -------------------------------------------------------------------------

    /// Descriptor-dispatched clone.
    pub fn clone_with(&self, fragment: ShadowNodeFragment) -> Arc<ShadowNode> {
        self.component_descriptor().clone_shadow_node(self, fragment)
    }

    /// Appends `child`. A child whose layout node belongs to another parent
    /// is cloned first and the clone is appended instead.
    pub fn append_child(&self, child: Arc<ShadowNode>) {
        self.ensure_unsealed();
        let child = self.adopt_layout_child(child);

        Arc::make_mut(&mut *self.children.write()).push(Arc::clone(&child));
        self.append_yoga_child(&child);
    }

    /// Replaces `old` with `new`. `suggested_index` is tried first.
    ///
    /// Panics when `old` is not a child.
    pub fn replace_child(
        &self,
        old: &ShadowNode,
        new: Arc<ShadowNode>,
        suggested_index: Option<usize>,
    ) {
        self.ensure_unsealed();
        {
            let mut children = self.children.write();
            let list = Arc::make_mut(&mut *children);
            let index = suggested_index
                .filter(|&index| list.get(index).is_some_and(|child| ptr::eq(child.as_ref(), old)))
                .or_else(|| list.iter().position(|child| ptr::eq(child.as_ref(), old)));
            let Some(index) = index else {
                panic!(
                    "tag {} is not a child of tag {}",
                    old.tag(),
                    self.tag()
                );
            };
            list[index] = Arc::clone(&new);
        }
        self.replace_yoga_child(old, &new);
    }

    /// Clones the path from this root down to `family`, replacing the
    /// family's node with `callback(old_node)`.
    ///
    /// Returns `None` when the family is not reachable from this node or the
    /// callback declines.
    pub fn clone_tree<F>(self: &Arc<Self>, family: &ShadowNodeFamily, callback: F) -> Option<Arc<ShadowNode>>
    where
        F: FnOnce(&ShadowNode) -> Option<Arc<ShadowNode>>,
    {
        let ancestors = family.ancestors(self);
        let (parent, index) = ancestors.last()?;
        let old_node = Arc::clone(&parent.children()[*index]);

        let mut child = callback(&old_node)?;
        for (parent, index) in ancestors.iter().rev() {
            let mut children: ShadowNodeList = parent.children().as_ref().clone();
            children[*index] = child;
            child = parent.clone_with(ShadowNodeFragment::with_children(Arc::new(children)));
        }
        Some(child)
    }

    /// Replaces every state older than its family's newest committed state,
    /// cloning the affected paths. `None` when nothing was stale.
    pub fn progress_state(self: &Arc<Self>) -> Option<Arc<ShadowNode>> {
        let new_state = self.state.as_ref().and_then(|state| state.most_recent_if_obsolete());

        let children = self.children();
        let mut new_children: Option<ShadowNodeList> = None;
        for (index, child) in children.iter().enumerate() {
            if let Some(progressed) = child.progress_state() {
                new_children.get_or_insert_with(|| children.as_ref().clone())[index] = progressed;
            }
        }

        if new_state.is_none() && new_children.is_none() {
            return None;
        }
        Some(self.clone_with(ShadowNodeFragment {
            props: None,
            children: new_children.map(Arc::new),
            state: new_state,
        }))
    }

    /// Points the families of every node new in this revision at their node
    /// and their parent. Sealed subtrees were recorded by the commit that
    /// sealed them; only their link to the new parent is refreshed.
    pub(crate) fn record_most_recent(self: &Arc<Self>, stamp: RevisionStamp) {
        if self.is_sealed() {
            return;
        }
        self.family.set_most_recent_node(self, stamp);
        if let Some(state) = &self.state {
            self.family.set_most_recent_state(state);
        }
        for child in self.children().iter() {
            child.family.set_parent(&self.family);
            child.record_most_recent(stamp);
        }
    }

    /// Clears what commits recorded on the families of this subtree.
    pub(crate) fn forget_commits(&self) {
        self.family.forget_commits();
        for child in self.children().iter() {
            child.forget_commits();
        }
    }
}

impl fmt::Debug for ShadowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowNode")
            .field("tag", &self.tag())
            .field("component", &self.component_name())
            .field("revision", &self.revision)
            .field("sealed", &self.is_sealed())
            .field("children", &self.children.read().len())
            .finish()
    }
}
