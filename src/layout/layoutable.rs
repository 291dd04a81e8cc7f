//! Keeps a shadow node and its layout node in sync.
//!
//! A layout node may only be written by the shadow node that owns it and
//! only while that shadow node is unsealed. Layout children are shared with
//! the previous revision until something needs to write them; then the
//! child is cloned under its new parent (see `layout_tree`).

use std::sync::Arc;

use tracing::trace;

use super::layout_tree::LayoutPass;
use super::style::{Display, Overflow, YogaStyle};
use super::yoga_node::LayoutNodeId;
use crate::shadow::{ShadowNode, ShadowNodeFragment, ShadowNodeTraits};
use crate::types::{
    DisplayType, EdgeInsets, LayoutConstraints, LayoutContext, LayoutDirection, LayoutMetrics,
    Rect,
};

impl ShadowNode {
    /// Id of this node's layout node, if it takes part in layout.
    pub fn layout_node_id(&self) -> Option<LayoutNodeId> {
        self.yoga().map(|yoga| yoga.lock().id())
    }

    /// Owner of this node's layout node.
    pub fn layout_owner(&self) -> Option<LayoutNodeId> {
        self.yoga().and_then(|yoga| yoga.lock().owner)
    }

    /// Style the layout node currently holds.
    pub fn yoga_style(&self) -> Option<YogaStyle> {
        self.yoga().map(|yoga| yoga.lock().style.clone())
    }

    /// True when the next pass has nothing to recompute for this subtree.
    pub fn is_layout_clean(&self) -> bool {
        self.yoga().is_none_or(|yoga| !yoga.lock().is_dirty())
    }

    pub fn has_new_layout(&self) -> bool {
        self.yoga().is_some_and(|yoga| yoga.lock().has_new_layout)
    }

    fn has_layout_children(&self) -> bool {
        self.yoga().is_some() && !self.traits().contains(ShadowNodeTraits::LEAF_YOGA_NODE)
    }

    /// Copies the style part of the props into the layout node. Dirties
    /// only on an actual change.
    pub(crate) fn update_yoga_props(&self) {
        let Some(yoga) = self.yoga() else {
            return;
        };
        let style = &self.props().view.yoga_style;
        let mut yoga = yoga.lock();
        if yoga.style != *style {
            yoga.style = style.clone();
            yoga.set_dirty(true);
        }
    }

    /// Rebuilds the layout child list from the shadow children. The node
    /// stays clean when every child is clean and styled like the one it
    /// replaces.
    pub(crate) fn update_yoga_children(&self) {
        let Some(yoga) = self.yoga() else {
            return;
        };
        if !self.has_layout_children() {
            return;
        }

        let children: Vec<Arc<ShadowNode>> = self
            .children()
            .iter()
            .filter(|child| child.yoga().is_some())
            .cloned()
            .collect();

        let (id, was_dirty, old_children) = {
            let yoga = yoga.lock();
            (yoga.id(), yoga.is_dirty(), yoga.children.clone())
        };

        let mut is_clean = !was_dirty && children.len() == old_children.len();
        for (index, child) in children.iter().enumerate() {
            if is_clean {
                let old = &old_children[index];
                is_clean = if Arc::ptr_eq(old, child) {
                    child.is_layout_clean()
                } else {
                    let old_style = old.yoga_style();
                    child.yoga().is_some_and(|child_yoga| {
                        let child_yoga = child_yoga.lock();
                        !child_yoga.is_dirty() && old_style.as_ref() == Some(&child_yoga.style)
                    })
                };
            }
            child.claim_layout_node(id);
        }

        let mut yoga = yoga.lock();
        yoga.children = children;
        yoga.set_dirty(!is_clean);
    }

    /// Takes ownership of an unowned layout node. Nodes owned elsewhere or
    /// sealed are left alone.
    fn claim_layout_node(&self, owner: LayoutNodeId) {
        if self.is_sealed() {
            return;
        }
        if let Some(yoga) = self.yoga() {
            let mut yoga = yoga.lock();
            if yoga.owner.is_none() {
                yoga.owner = Some(owner);
            }
        }
    }

    /// The node to actually append for `child`: `child` itself when this
    /// node may own its layout node, a clone of it otherwise.
    pub(crate) fn adopt_layout_child(&self, child: Arc<ShadowNode>) -> Arc<ShadowNode> {
        let Some(id) = self.layout_node_id() else {
            return child;
        };
        if !self.has_layout_children() {
            return child;
        }
        let owner = child.layout_owner();
        let shared = child.yoga().is_some()
            && (child.is_sealed() || owner.is_some_and(|owner| owner != id));
        if !shared {
            return child;
        }
        trace!(
            tag = child.tag(),
            parent = self.tag(),
            "cloning shared child before appending"
        );
        child.clone_with(ShadowNodeFragment::default())
    }

    /// Appends an already adopted child to the layout children.
    pub(crate) fn append_yoga_child(&self, child: &Arc<ShadowNode>) {
        if !self.has_layout_children() || child.yoga().is_none() {
            return;
        }
        let Some(yoga) = self.yoga() else {
            return;
        };
        let id = yoga.lock().id();
        child.claim_layout_node(id);

        let mut yoga = yoga.lock();
        yoga.children.push(Arc::clone(child));
        yoga.set_dirty(true);
    }

    /// Swaps a layout child in place. The node is dirtied unless `new` is a
    /// clean node styled like `old`.
    pub(crate) fn replace_yoga_child(&self, old: &ShadowNode, new: &Arc<ShadowNode>) {
        if !self.has_layout_children() {
            return;
        }
        let Some(yoga) = self.yoga() else {
            return;
        };

        let old_style = old.yoga_style();
        let new_clean = new.is_layout_clean();
        let new_style = new.yoga_style();
        let id = yoga.lock().id();
        new.claim_layout_node(id);

        let mut yoga = yoga.lock();
        let index = yoga
            .children
            .iter()
            .position(|child| std::ptr::eq(child.as_ref(), old));
        match (index, new.yoga().is_some()) {
            (Some(index), true) => yoga.children[index] = Arc::clone(new),
            (Some(index), false) => {
                yoga.children.remove(index);
            }
            (None, true) => yoga.children.push(Arc::clone(new)),
            (None, false) => return,
        }
        if !(new_clean && old_style.is_some() && old_style == new_style) {
            yoga.set_dirty(true);
        }
    }

    // -------------------------------------------------------------------------
    // Layout
    // -------------------------------------------------------------------------

    /// Lays out the subtree rooted here and writes the results back into the
    /// shadow nodes that received new layout. Nodes whose metrics changed
    /// are pushed onto `affected`.
    ///
    /// Panics when the node is sealed or the constraints are malformed.
    pub fn layout_tree(
        self: &Arc<Self>,
        context: &LayoutContext,
        constraints: &LayoutConstraints,
        affected: &mut Vec<Arc<ShadowNode>>,
    ) {
        self.ensure_unsealed();
        assert_valid_constraints(constraints);

        let Some(yoga) = self.yoga() else {
            return;
        };

        if context.swap_left_and_right_in_rtl {
            self.swap_left_and_right_in_tree();
        }

        let (id, style, direction) = {
            let mut yoga = yoga.lock();
            // The constraints are not part of the cache key.
            yoga.cache.clear();
            let direction = yoga.style.resolve_direction(constraints.layout_direction);
            (yoga.id(), yoga.style.to_taffy(direction), direction)
        };

        let mut pass = LayoutPass::new(Arc::clone(self), id, style, *context, direction, constraints);
        pass.run(constraints);
        trace!(
            tag = self.tag(),
            visited = pass.len(),
            cloned = pass.adopted(),
            "layout pass finished"
        );

        let root_layout = {
            let mut yoga = yoga.lock();
            if yoga.has_new_layout {
                yoga.has_new_layout = false;
                Some((yoga.layout, yoga.direction, yoga.style.display))
            } else {
                None
            }
        };
        if let Some((layout, direction, display)) = root_layout {
            let mut metrics = metrics_from_layout(&layout, direction, display, context);
            let previous = self.layout_metrics();
            metrics.overflow_inset = previous.overflow_inset;
            if metrics != previous {
                affected.push(Arc::clone(self));
            }
            self.set_layout_metrics(metrics);
        }

        self.layout_children(context, affected);
    }

    /// Rewrites `left`/`right` edges as `start`/`end` in every layout node
    /// this node owns. Returns whether any style changed.
    fn swap_left_and_right_in_tree(&self) -> bool {
        let Some(yoga) = self.yoga() else {
            return false;
        };
        let (id, changed, children) = {
            let mut yoga = yoga.lock();
            let changed = yoga.style.swap_left_and_right();
            (yoga.id(), changed, yoga.children.clone())
        };

        let mut any_child_changed = false;
        for child in &children {
            if !child.is_sealed() && child.layout_owner() == Some(id) {
                any_child_changed |= child.swap_left_and_right_in_tree();
            }
        }

        if changed || any_child_changed {
            yoga.lock().set_dirty(true);
        }
        changed || any_child_changed
    }

    /// Copies new layout from the layout children into their shadow nodes,
    /// then recomputes this node's overflow inset.
    fn layout_children(&self, context: &LayoutContext, affected: &mut Vec<Arc<ShadowNode>>) {
        let Some(yoga) = self.yoga() else {
            return;
        };
        let (id, overflow, children) = {
            let yoga = yoga.lock();
            (yoga.id(), yoga.style.overflow, yoga.children.clone())
        };

        for child in &children {
            let Some(child_yoga) = child.yoga() else {
                continue;
            };
            let (layout, direction, display) = {
                let mut child_yoga = child_yoga.lock();
                if !child_yoga.has_new_layout {
                    continue;
                }
                child_yoga.has_new_layout = false;
                assert_eq!(
                    child_yoga.owner,
                    Some(id),
                    "new layout on a layout node owned by another parent (tag {})",
                    child.tag()
                );
                (child_yoga.layout, child_yoga.direction, child_yoga.style.display)
            };

            child.ensure_unsealed();
            let previous = child.layout_metrics();
            let mut metrics = metrics_from_layout(&layout, direction, display, context);
            metrics.overflow_inset = previous.overflow_inset;
            if metrics != previous {
                affected.push(Arc::clone(child));
            }
            child.set_layout_metrics(metrics);
            child.layout_children(context, affected);
        }

        let overflow_inset = if overflow == Overflow::Visible {
            overflow_inset_of(self.layout_metrics().frame, &children)
        } else {
            EdgeInsets::ZERO
        };
        let mut metrics = self.layout_metrics();
        if metrics.overflow_inset != overflow_inset {
            metrics.overflow_inset = overflow_inset;
            self.set_layout_metrics(metrics);
        }
    }
}

fn assert_valid_constraints(constraints: &LayoutConstraints) {
    let min = constraints.minimum_size;
    let max = constraints.maximum_size;
    assert!(
        !(min.width.is_nan() || min.height.is_nan() || max.width.is_nan() || max.height.is_nan()),
        "layout constraints must not be NaN: {constraints:?}"
    );
    assert!(
        min.width >= 0.0 && min.height >= 0.0 && min.width.is_finite() && min.height.is_finite(),
        "minimum size must be finite and non-negative: {constraints:?}"
    );
    assert!(
        min.width <= max.width && min.height <= max.height,
        "inverted layout constraints: minimum {min:?} exceeds maximum {max:?}"
    );
}

fn metrics_from_layout(
    layout: &taffy::Layout,
    direction: LayoutDirection,
    display: Display,
    context: &LayoutContext,
) -> LayoutMetrics {
    let scale = context.point_scale_factor;
    let round = |value: f32| {
        if scale > 0.0 {
            (value * scale).round() / scale
        } else {
            value
        }
    };

    let border_width = EdgeInsets::new(
        layout.border.left,
        layout.border.top,
        layout.border.right,
        layout.border.bottom,
    );
    let padding = EdgeInsets::new(
        layout.padding.left,
        layout.padding.top,
        layout.padding.right,
        layout.padding.bottom,
    );

    LayoutMetrics {
        frame: Rect::new(
            round(layout.location.x),
            round(layout.location.y),
            round(layout.size.width),
            round(layout.size.height),
        ),
        content_insets: border_width + padding,
        border_width,
        display_type: match display {
            Display::Flex => DisplayType::Flex,
            Display::None => DisplayType::None,
        },
        layout_direction: direction,
        point_scale_factor: scale,
        overflow_inset: EdgeInsets::ZERO,
    }
}

/// How far the children's frames, grown by their own overflow, stick out
/// of `frame`. Every component is zero or negative.
fn overflow_inset_of(frame: Rect, children: &[Arc<ShadowNode>]) -> EdgeInsets {
    let mut content = Rect::default();
    for child in children {
        let metrics = child.layout_metrics();
        if metrics.display_type == DisplayType::None {
            continue;
        }
        content = content.union(&metrics.frame.inset_by(&metrics.overflow_inset));
    }

    EdgeInsets::new(
        content.min_x().min(0.0),
        content.min_y().min(0.0),
        -(content.max_x() - frame.size.width).max(0.0),
        -(content.max_y() - frame.size.height).max(0.0),
    )
}
