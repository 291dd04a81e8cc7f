//! The mutable layout node owned by a layoutable shadow node.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use taffy::{Cache, Layout};

use super::style::YogaStyle;
use crate::shadow::ShadowNode;
use crate::types::LayoutDirection;

static NEXT_LAYOUT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one layout node. Clones of a layout node get a fresh id, so
/// an owner id names exactly one mutable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayoutNodeId(u64);

impl LayoutNodeId {
    fn next() -> Self {
        Self(NEXT_LAYOUT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

pub struct YogaNode {
    id: LayoutNodeId,
    /// Layout node this one is a child of. Only the owner may write it.
    pub(crate) owner: Option<LayoutNodeId>,
    pub(crate) style: YogaStyle,
    /// Shadow nodes whose layout nodes are this node's layout children.
    pub(crate) children: Vec<Arc<ShadowNode>>,
    pub(crate) cache: Cache,
    /// Unrounded output of the last pass.
    pub(crate) layout: Layout,
    pub(crate) direction: LayoutDirection,
    pub(crate) has_new_layout: bool,
    pub(crate) measurable: bool,
    dirty: bool,
}

impl YogaNode {
    /// A new node starts dirty.
    pub(crate) fn new(style: YogaStyle, measurable: bool) -> Self {
        Self {
            id: LayoutNodeId::next(),
            owner: None,
            style,
            children: Vec::new(),
            cache: Cache::new(),
            layout: Layout::with_order(0),
            direction: LayoutDirection::Undefined,
            has_new_layout: false,
            measurable,
            dirty: true,
        }
    }

    /// Copy with a fresh id and no owner. Children stay owned by `self`
    /// until the copy claims or clones them.
    pub(crate) fn clone_for_new_owner(&self) -> Self {
        Self {
            id: LayoutNodeId::next(),
            owner: None,
            style: self.style.clone(),
            children: self.children.clone(),
            cache: self.cache.clone(),
            layout: self.layout,
            direction: self.direction,
            has_new_layout: self.has_new_layout,
            measurable: self.measurable,
            dirty: self.dirty,
        }
    }

    #[inline]
    pub fn id(&self) -> LayoutNodeId {
        self.id
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Dirtying drops cached measurements.
    pub(crate) fn set_dirty(&mut self, dirty: bool) {
        if dirty {
            self.cache.clear();
        }
        self.dirty = dirty;
    }
}

impl fmt::Debug for YogaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YogaNode")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("children", &self.children.len())
            .field("dirty", &self.dirty)
            .field("has_new_layout", &self.has_new_layout)
            .finish()
    }
}
