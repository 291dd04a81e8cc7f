//! Identity shared by every clone of a logical node.
//!
//! A family is allocated once, when the node is first created, and is
//! referenced by every snapshot cloned from it. The only fields that change
//! afterwards are the back-references a commit records: the parent family,
//! the most recent committed state and the most recent committed node.
//! Building a candidate tree never touches them, so a tree that is never
//! committed leaves no trace on its families.

use std::fmt;
use std::ptr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::component_descriptor::SharedComponentDescriptor;
use super::shadow_node::ShadowNode;
use super::state::State;
use crate::types::{SurfaceId, Tag};

/// Data a family is created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowNodeFamilyFragment {
    pub tag: Tag,
    pub surface_id: SurfaceId,
}

/// Handle the event layer uses to route events to a logical node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventTarget {
    pub instance_handle: u64,
    pub tag: Tag,
}

/// Path from a root to a node's parent: each entry is an ancestor and the
/// index of the next step among its children.
pub type AncestorList = Vec<(Arc<ShadowNode>, usize)>;

/// Which commit recorded a back-reference: the committing tree and the
/// revision number it gave the commit. Numbers restart for every tree, so
/// both are needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionStamp {
    pub tree: u64,
    pub number: u64,
}

struct MostRecentNode {
    stamp: RevisionStamp,
    node: Weak<ShadowNode>,
}

pub struct ShadowNodeFamily {
    tag: Tag,
    surface_id: SurfaceId,
    event_target: Option<EventTarget>,
    component_descriptor: SharedComponentDescriptor,
    parent: RwLock<Weak<ShadowNodeFamily>>,
    state_revision: AtomicU64,
    most_recent_state: RwLock<Option<Arc<State>>>,
    most_recent_node: RwLock<Option<MostRecentNode>>,
}

impl ShadowNodeFamily {
    pub fn new(
        fragment: ShadowNodeFamilyFragment,
        event_target: Option<EventTarget>,
        component_descriptor: SharedComponentDescriptor,
    ) -> Self {
        Self {
            tag: fragment.tag,
            surface_id: fragment.surface_id,
            event_target,
            component_descriptor,
            parent: RwLock::new(Weak::new()),
            state_revision: AtomicU64::new(0),
            most_recent_state: RwLock::new(None),
            most_recent_node: RwLock::new(None),
        }
    }

    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    #[inline]
    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    pub fn event_target(&self) -> Option<&EventTarget> {
        self.event_target.as_ref()
    }

    pub fn component_descriptor(&self) -> &SharedComponentDescriptor {
        &self.component_descriptor
    }

    pub fn component_name(&self) -> &'static str {
        self.component_descriptor.component_name()
    }

    /// Family of the node this one was attached under in the last commit
    /// that contained it.
    pub fn parent(&self) -> Option<Arc<ShadowNodeFamily>> {
        self.parent.read().upgrade()
    }

    pub(crate) fn set_parent(&self, parent: &Arc<ShadowNodeFamily>) {
        *self.parent.write() = Arc::downgrade(parent);
    }

    pub(crate) fn next_state_revision(&self) -> u64 {
        self.state_revision.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Newest state committed for this family, if any.
    pub fn most_recent_state(&self) -> Option<Arc<State>> {
        self.most_recent_state.read().clone()
    }

    pub(crate) fn set_most_recent_state(&self, state: &Arc<State>) {
        let mut slot = self.most_recent_state.write();
        let newer = slot
            .as_ref()
            .is_none_or(|current| current.revision() < state.revision());
        if newer {
            *slot = Some(Arc::clone(state));
        }
    }

    /// Most recently committed node of this family with the stamp of the
    /// commit that recorded it. `None` once that node has been dropped.
    ///
    /// The node may since have been removed from its tree; compare the stamp
    /// with the tree's current revision before trusting it.
    pub fn most_recent_node(&self) -> Option<(RevisionStamp, Arc<ShadowNode>)> {
        let slot = self.most_recent_node.read();
        let recent = slot.as_ref()?;
        recent.node.upgrade().map(|node| (recent.stamp, node))
    }

    pub(crate) fn set_most_recent_node(&self, node: &Arc<ShadowNode>, stamp: RevisionStamp) {
        *self.most_recent_node.write() = Some(MostRecentNode {
            stamp,
            node: Arc::downgrade(node),
        });
    }

    /// Drops every back-reference recorded by commits. Used when the tree
    /// that recorded them is torn down.
    pub(crate) fn forget_commits(&self) {
        *self.parent.write() = Weak::new();
        *self.most_recent_state.write() = None;
        *self.most_recent_node.write() = None;
    }

    /// Walks from `root` down to the parent of this family's node.
    ///
    /// Follows the parent links recorded by commits and falls back to a
    /// depth-first search when they do not lead to the node (the tree was
    /// never committed, or a commit moved the node since). Returns an empty
    /// list when the family is not reachable from `root`, including when it
    /// is `root`'s own family.
    pub fn ancestors(&self, root: &Arc<ShadowNode>) -> AncestorList {
        if ptr::eq(root.family().as_ref(), self) {
            return Vec::new();
        }
        self.ancestors_from_parent_links(root)
            .or_else(|| {
                let mut path = Vec::new();
                search_path(root, self, &mut path).then_some(path)
            })
            .unwrap_or_default()
    }

    fn ancestors_from_parent_links(&self, root: &Arc<ShadowNode>) -> Option<AncestorList> {
        let root_family = root.family();

        // Parent chain from our parent up to the root family.
        let mut chain: Vec<Arc<ShadowNodeFamily>> = Vec::new();
        let mut cursor = self.parent();
        loop {
            let family = cursor?;
            let revisited = ptr::eq(family.as_ref(), self)
                || chain.iter().any(|seen| Arc::ptr_eq(seen, &family));
            if revisited {
                return None;
            }
            let reached_root = Arc::ptr_eq(&family, root_family);
            cursor = family.parent();
            chain.push(family);
            if reached_root {
                break;
            }
        }
        chain.reverse();

        let mut ancestors = Vec::with_capacity(chain.len());
        let mut node = Arc::clone(root);
        for depth in 0..chain.len() {
            let target: &ShadowNodeFamily = match chain.get(depth + 1) {
                Some(family) => family.as_ref(),
                None => self,
            };
            let children = node.children();
            let index = children
                .iter()
                .position(|child| ptr::eq(child.family().as_ref(), target))?;
            let next = Arc::clone(&children[index]);
            ancestors.push((node, index));
            node = next;
        }
        Some(ancestors)
    }
}

fn search_path(node: &Arc<ShadowNode>, target: &ShadowNodeFamily, path: &mut AncestorList) -> bool {
    for (index, child) in node.children().iter().enumerate() {
        path.push((Arc::clone(node), index));
        if ptr::eq(child.family().as_ref(), target) || search_path(child, target, path) {
            return true;
        }
        path.pop();
    }
    false
}

impl fmt::Debug for ShadowNodeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowNodeFamily")
            .field("tag", &self.tag)
            .field("surface_id", &self.surface_id)
            .field("component_name", &self.component_name())
            .field("event_target", &self.event_target)
            .finish()
    }
}
