//! Low-level Taffy integration for one layout pass.
//!
//! Taffy's layout traits are implemented on a per-pass lookup table instead
//! of a `TaffyTree`: `NodeId` is the index of a shadow node in the table, and
//! a node's children are registered the first time Taffy lays it out. The
//! layout nodes themselves stay inside the shadow nodes.
//!
//! Nodes shared with an earlier revision are read freely. The first write
//! that would change one of them (a different frame, or a write below it)
//! clones it under its parent, which must be writable itself.

use std::sync::Arc;

use taffy::{
    compute_cached_layout, compute_flexbox_layout, compute_hidden_layout, compute_leaf_layout,
    compute_root_layout, AvailableSpace, CacheTree, Layout, LayoutFlexboxContainer,
    LayoutInput, LayoutOutput, LayoutPartialTree, NodeId, RunMode, Style, TraversePartialTree,
    TraverseTree,
};
use tracing::trace;

use super::yoga_node::{LayoutNodeId, YogaNode};
use crate::shadow::{ShadowNode, ShadowNodeFragment, ShadowNodeTraits};
use crate::types::{LayoutConstraints, LayoutContext, LayoutDirection, Size};

// =============================================================================
// CHILD ITERATOR
// =============================================================================

/// Iterator that yields `NodeId` from a slice of `usize` children indices.
pub struct ChildIter<'a> {
    inner: std::slice::Iter<'a, usize>,
}

impl Iterator for ChildIter<'_> {
    type Item = NodeId;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|&idx| NodeId::from(idx))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ChildIter<'_> {}

// =============================================================================
// LAYOUT PASS
// =============================================================================

pub(crate) struct LayoutPass {
    nodes: Vec<Arc<ShadowNode>>,
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    prepared: Vec<bool>,
    ids: Vec<LayoutNodeId>,
    directions: Vec<LayoutDirection>,
    styles: Vec<Style>,
    context: LayoutContext,
    adopted: usize,
}

impl LayoutPass {
    /// Table with only the root registered. The root's style is bounded by
    /// the constraints.
    pub(crate) fn new(
        root: Arc<ShadowNode>,
        root_id: LayoutNodeId,
        mut root_style: Style,
        context: LayoutContext,
        direction: LayoutDirection,
        constraints: &LayoutConstraints,
    ) -> Self {
        apply_constraints(&mut root_style, constraints);

        Self {
            nodes: vec![root],
            parents: vec![None],
            children: vec![Vec::new()],
            prepared: vec![false],
            ids: vec![root_id],
            directions: vec![direction],
            styles: vec![root_style],
            context,
            adopted: 0,
        }
    }

    pub(crate) fn run(&mut self, constraints: &LayoutConstraints) {
        let available = taffy::Size {
            width: available_space(constraints.maximum_size.width),
            height: available_space(constraints.maximum_size.height),
        };
        self.prepare(0);
        compute_root_layout(self, NodeId::from(0usize), available);
    }

    /// Nodes registered during the pass.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Shared nodes cloned because the pass had to write them.
    pub(crate) fn adopted(&self) -> usize {
        self.adopted
    }

    /// Registers the layout children of `idx`.
    fn prepare(&mut self, idx: usize) {
        if self.prepared[idx] {
            return;
        }
        self.prepared[idx] = true;

        let node = Arc::clone(&self.nodes[idx]);
        if node.traits().contains(ShadowNodeTraits::LEAF_YOGA_NODE) {
            return;
        }
        let layout_children = node
            .yoga()
            .map(|yoga| yoga.lock().children.clone())
            .unwrap_or_default();

        let parent_direction = self.directions[idx];
        let mut indices = Vec::with_capacity(layout_children.len());
        for child in layout_children {
            let Some(yoga) = child.yoga() else {
                continue;
            };
            let (id, direction, style) = {
                let yoga = yoga.lock();
                let direction = yoga.style.resolve_direction(parent_direction);
                (yoga.id(), direction, yoga.style.to_taffy(direction))
            };
            indices.push(self.nodes.len());
            self.nodes.push(child);
            self.parents.push(Some(idx));
            self.children.push(Vec::new());
            self.prepared.push(false);
            self.ids.push(id);
            self.directions.push(direction);
            self.styles.push(style);
        }
        self.children[idx] = indices;
    }

    /// Whether the layout node at `idx` belongs to this revision.
    fn is_writable(&self, idx: usize) -> bool {
        let Some(parent) = self.parents[idx] else {
            return true;
        };
        let node = &self.nodes[idx];
        !node.is_sealed() && node.layout_owner() == Some(self.ids[parent])
    }

    /// Clones the node at `idx` under its parent unless it is already
    /// writable. Ancestors are made writable first.
    fn ensure_writable(&mut self, idx: usize) {
        if self.is_writable(idx) {
            return;
        }
        let Some(parent) = self.parents[idx] else {
            return;
        };
        self.ensure_writable(parent);

        let old = Arc::clone(&self.nodes[idx]);
        let clone = old.clone_with(ShadowNodeFragment::default());
        self.nodes[parent].replace_child(&old, Arc::clone(&clone), None);
        if let Some(yoga) = clone.yoga() {
            let mut yoga = yoga.lock();
            // Makes the write-back visit the clone even if only a
            // descendant changes.
            yoga.has_new_layout = true;
            self.ids[idx] = yoga.id();
        }
        trace!(tag = clone.tag(), parent = self.nodes[parent].tag(), "cloned shared layout node");
        self.nodes[idx] = clone;
        self.adopted += 1;
    }

    fn measure(&self, idx: usize, known: taffy::Size<Option<f32>>, available: taffy::Size<AvailableSpace>) -> taffy::Size<f32> {
        let node = &self.nodes[idx];
        let bound = |known: Option<f32>, available: AvailableSpace| match (known, available) {
            (Some(value), _) => (value, value),
            (None, AvailableSpace::Definite(value)) => (0.0, value.max(0.0)),
            (None, AvailableSpace::MinContent) => (0.0, 0.0),
            (None, AvailableSpace::MaxContent) => (0.0, f32::INFINITY),
        };
        let (min_width, max_width) = bound(known.width, available.width);
        let (min_height, max_height) = bound(known.height, available.height);
        let constraints = LayoutConstraints {
            minimum_size: Size::new(min_width, min_height),
            maximum_size: Size::new(max_width, max_height),
            layout_direction: self.directions[idx],
        };

        let size = node
            .component_descriptor()
            .measure_content(node, &self.context, &constraints);
        taffy::Size {
            width: known.width.unwrap_or(size.width),
            height: known.height.unwrap_or(size.height),
        }
    }

    fn with_layout_node<R>(&self, idx: usize, f: impl FnOnce(&mut YogaNode) -> R) -> Option<R> {
        self.nodes[idx].yoga().map(|yoga| f(&mut yoga.lock()))
    }
}

fn available_space(max: f32) -> AvailableSpace {
    if max.is_finite() {
        AvailableSpace::Definite(max)
    } else {
        AvailableSpace::MaxContent
    }
}

fn apply_constraints(style: &mut Style, constraints: &LayoutConstraints) {
    let min = constraints.minimum_size;
    let max = constraints.maximum_size;
    if min.width > 0.0 {
        style.min_size.width = taffy::Dimension::Length(min.width);
    }
    if min.height > 0.0 {
        style.min_size.height = taffy::Dimension::Length(min.height);
    }
    if max.width.is_finite() {
        style.max_size.width = taffy::Dimension::Length(max.width);
    }
    if max.height.is_finite() {
        style.max_size.height = taffy::Dimension::Length(max.height);
    }
}

// =============================================================================
// TRAIT IMPLEMENTATIONS
// =============================================================================

impl TraversePartialTree for LayoutPass {
    type ChildIter<'a> = ChildIter<'a> where Self: 'a;

    fn child_ids(&self, parent_node_id: NodeId) -> Self::ChildIter<'_> {
        ChildIter {
            inner: self.children[usize::from(parent_node_id)].iter(),
        }
    }

    fn child_count(&self, parent_node_id: NodeId) -> usize {
        self.children[usize::from(parent_node_id)].len()
    }

    fn get_child_id(&self, parent_node_id: NodeId, child_index: usize) -> NodeId {
        NodeId::from(self.children[usize::from(parent_node_id)][child_index])
    }
}

impl TraverseTree for LayoutPass {}

impl LayoutPartialTree for LayoutPass {
    type CoreContainerStyle<'a> = Style where Self: 'a;

    fn get_core_container_style(&self, node_id: NodeId) -> Self::CoreContainerStyle<'_> {
        self.styles[usize::from(node_id)].clone()
    }

    fn set_unrounded_layout(&mut self, node_id: NodeId, layout: &Layout) {
        let idx = usize::from(node_id);
        let unchanged = self
            .with_layout_node(idx, |yoga| yoga.layout == *layout)
            .unwrap_or(true);
        if unchanged && !self.is_writable(idx) {
            return;
        }
        self.ensure_writable(idx);

        let direction = self.directions[idx];
        self.with_layout_node(idx, |yoga| {
            yoga.layout = *layout;
            yoga.direction = direction;
            yoga.has_new_layout = true;
            yoga.set_dirty(false);
        });
    }

    fn compute_child_layout(&mut self, node_id: NodeId, inputs: LayoutInput) -> LayoutOutput {
        compute_cached_layout(self, node_id, inputs, |tree, node_id, inputs| {
            let idx = usize::from(node_id);
            tree.prepare(idx);

            if tree.styles[idx].display == taffy::Display::None {
                return compute_hidden_layout(tree, node_id);
            }

            let traits = tree.nodes[idx].traits();
            if traits.contains(ShadowNodeTraits::MEASURABLE_YOGA_NODE) {
                let style = tree.styles[idx].clone();
                let tree = &*tree;
                compute_leaf_layout(inputs, &style, |known, available| {
                    tree.measure(idx, known, available)
                })
            } else if traits.contains(ShadowNodeTraits::LEAF_YOGA_NODE) {
                let style = tree.styles[idx].clone();
                compute_leaf_layout(inputs, &style, |_, _| taffy::Size::ZERO)
            } else {
                compute_flexbox_layout(tree, node_id, inputs)
            }
        })
    }
}

impl CacheTree for LayoutPass {
    fn cache_get(
        &self,
        node_id: NodeId,
        known_dimensions: taffy::Size<Option<f32>>,
        available_space: taffy::Size<AvailableSpace>,
        run_mode: RunMode,
    ) -> Option<LayoutOutput> {
        self.with_layout_node(usize::from(node_id), |yoga| {
            yoga.cache.get(known_dimensions, available_space, run_mode)
        })
        .flatten()
    }

    fn cache_store(
        &mut self,
        node_id: NodeId,
        known_dimensions: taffy::Size<Option<f32>>,
        available_space: taffy::Size<AvailableSpace>,
        run_mode: RunMode,
        layout_output: LayoutOutput,
    ) {
        // Shared nodes are not cloned just to cache a measurement.
        let idx = usize::from(node_id);
        if !self.is_writable(idx) {
            return;
        }
        self.with_layout_node(idx, |yoga| {
            yoga.cache.store(known_dimensions, available_space, run_mode, layout_output);
        });
    }

    fn cache_clear(&mut self, node_id: NodeId) {
        let idx = usize::from(node_id);
        if !self.is_writable(idx) {
            return;
        }
        self.with_layout_node(idx, |yoga| yoga.cache.clear());
    }
}

impl LayoutFlexboxContainer for LayoutPass {
    type FlexboxContainerStyle<'a> = Style where Self: 'a;
    type FlexboxItemStyle<'a> = Style where Self: 'a;

    fn get_flexbox_container_style(&self, node_id: NodeId) -> Self::FlexboxContainerStyle<'_> {
        self.styles[usize::from(node_id)].clone()
    }

    fn get_flexbox_child_style(&self, child_node_id: NodeId) -> Self::FlexboxItemStyle<'_> {
        self.styles[usize::from(child_node_id)].clone()
    }
}
