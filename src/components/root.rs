//! RootView: the node at the top of every surface.
//!
//! A root carries the surface's layout constraints and context in its props.
//! The constraints are also folded into its style, so changing them dirties
//! the root like any other style change.

use std::sync::Arc;

use super::view::ViewProps;
use crate::layout::{Direction, StyleLength, YogaStyle};
use crate::shadow::{
    ComponentDescriptor, ComponentDescriptorExt, Props, PropsKind, PropsParserContext, RawProps,
    ShadowNode, ShadowNodeFamilyFragment, ShadowNodeFragment, ShadowNodeTraits,
    SharedComponentDescriptor,
};
use crate::types::{LayoutConstraints, LayoutContext, LayoutDirection, SurfaceId};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RootProps {
    pub layout_constraints: LayoutConstraints,
    pub layout_context: LayoutContext,
}

#[derive(Debug, Default)]
pub struct RootComponentDescriptor;

impl RootComponentDescriptor {
    /// Props for a root laid out under `constraints`, keeping the raw props
    /// of `source`.
    pub fn props_with_layout(
        source: Option<&Arc<Props>>,
        constraints: LayoutConstraints,
        context: LayoutContext,
    ) -> Arc<Props> {
        root_props(
            source,
            &RawProps::new(),
            RootProps {
                layout_constraints: constraints,
                layout_context: context,
            },
        )
    }
}

impl ComponentDescriptor for RootComponentDescriptor {
    fn component_name(&self) -> &'static str {
        "RootView"
    }

    fn traits(&self) -> ShadowNodeTraits {
        ShadowNodeTraits::ROOT_NODE | ShadowNodeTraits::YOGA_LAYOUTABLE
    }

    fn clone_props(
        &self,
        _context: &PropsParserContext,
        source: Option<&Arc<Props>>,
        raw: &RawProps,
    ) -> Arc<Props> {
        if let Some(source) = source.filter(|_| raw.is_empty()) {
            return Arc::clone(source);
        }
        let root = source
            .and_then(|source| source.root_props())
            .cloned()
            .unwrap_or_default();
        root_props(source, raw, root)
    }
}

fn root_props(source: Option<&Arc<Props>>, raw: &RawProps, root: RootProps) -> Arc<Props> {
    let merged = Props::merge_raw(source.map(Arc::as_ref), raw);
    let mut view = ViewProps::from_raw(&merged);
    apply_layout_constraints(&mut view.yoga_style, &root.layout_constraints);
    Arc::new(Props {
        raw: merged,
        view,
        kind: PropsKind::Root(root),
    })
}

fn apply_layout_constraints(style: &mut YogaStyle, constraints: &LayoutConstraints) {
    let points = |value: f32| {
        if value.is_finite() {
            StyleLength::Points(value)
        } else {
            StyleLength::Undefined
        }
    };
    style.min_width = points(constraints.minimum_size.width);
    style.min_height = points(constraints.minimum_size.height);
    style.max_width = points(constraints.maximum_size.width);
    style.max_height = points(constraints.maximum_size.height);
    style.direction = match constraints.layout_direction {
        LayoutDirection::LeftToRight => Direction::Ltr,
        LayoutDirection::RightToLeft => Direction::Rtl,
        LayoutDirection::Undefined => Direction::Inherit,
    };
}

/// A fresh, unsealed root for `surface_id`. The root's tag is the surface id.
pub fn create_root_node(
    descriptor: &SharedComponentDescriptor,
    surface_id: SurfaceId,
    constraints: LayoutConstraints,
    context: LayoutContext,
) -> Arc<ShadowNode> {
    let family = descriptor.create_family(
        ShadowNodeFamilyFragment {
            tag: surface_id,
            surface_id,
        },
        None,
    );
    let props = RootComponentDescriptor::props_with_layout(None, constraints, context);
    descriptor.create_shadow_node(ShadowNodeFragment::with_props(props), family)
}

/// Clone of `root` laid out under new constraints. When the font size
/// multiplier changes, every measurable node is cloned as well so text is
/// measured again.
pub fn clone_root_with_constraints(
    root: &ShadowNode,
    constraints: LayoutConstraints,
    context: LayoutContext,
) -> Arc<ShadowNode> {
    let multiplier_changed = root
        .props()
        .root_props()
        .is_some_and(|old| old.layout_context.font_size_multiplier != context.font_size_multiplier);

    let children = multiplier_changed.then(|| {
        Arc::new(
            root.children()
                .iter()
                .map(|child| clone_measurables(child).unwrap_or_else(|| Arc::clone(child)))
                .collect(),
        )
    });

    root.clone_with(ShadowNodeFragment {
        props: Some(RootComponentDescriptor::props_with_layout(
            Some(root.props()),
            constraints,
            context,
        )),
        children,
        state: None,
    })
}

/// Clones the paths to every measurable node below `node`. `None` when
/// there is none.
fn clone_measurables(node: &Arc<ShadowNode>) -> Option<Arc<ShadowNode>> {
    if node.traits().contains(ShadowNodeTraits::MEASURABLE_YOGA_NODE) {
        return Some(node.clone_with(ShadowNodeFragment::default()));
    }

    let children = node.children();
    let mut new_children: Option<Vec<Arc<ShadowNode>>> = None;
    for (index, child) in children.iter().enumerate() {
        if let Some(clone) = clone_measurables(child) {
            new_children.get_or_insert_with(|| children.as_ref().clone())[index] = clone;
        }
    }
    new_children.map(|children| node.clone_with(ShadowNodeFragment::with_children(Arc::new(children))))
}

/// Lays out `root` with the constraints in its props unless its layout is
/// clean. Returns whether a pass ran.
pub fn layout_if_needed(root: &Arc<ShadowNode>, affected: &mut Vec<Arc<ShadowNode>>) -> bool {
    root.ensure_unsealed();
    if root.is_layout_clean() {
        return false;
    }
    let root_props = root.props().root_props().cloned().unwrap_or_default();
    root.layout_tree(
        &root_props.layout_context,
        &root_props.layout_constraints,
        affected,
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ParagraphComponentDescriptor;
    use crate::layout::TextMeasureCache;
    use crate::test_utils::{create_node, view};
    use crate::types::{Rect, Size};
    use serde_json::json;

    fn root_descriptor() -> SharedComponentDescriptor {
        Arc::new(RootComponentDescriptor)
    }

    #[test]
    fn test_root_lays_out_to_constraints() {
        let root = create_root_node(
            &root_descriptor(),
            7,
            LayoutConstraints::exact(Size::new(320.0, 480.0)),
            LayoutContext::default(),
        );
        assert_eq!(root.tag(), 7);
        assert!(root.traits().contains(ShadowNodeTraits::ROOT_NODE));

        let mut affected = Vec::new();
        assert!(layout_if_needed(&root, &mut affected));
        assert_eq!(root.layout_metrics().frame, Rect::new(0.0, 0.0, 320.0, 480.0));
        assert!(!layout_if_needed(&root, &mut affected));
    }

    #[test]
    fn test_new_constraints_dirty_the_root() {
        let root = create_root_node(
            &root_descriptor(),
            1,
            LayoutConstraints::exact(Size::new(100.0, 100.0)),
            LayoutContext::default(),
        );
        layout_if_needed(&root, &mut Vec::new());
        root.seal_recursive();

        let resized = clone_root_with_constraints(
            &root,
            LayoutConstraints::exact(Size::new(200.0, 50.0)),
            LayoutContext::default(),
        );
        assert!(!resized.is_layout_clean());
        layout_if_needed(&resized, &mut Vec::new());
        assert_eq!(resized.layout_metrics().frame.size, Size::new(200.0, 50.0));
        assert_eq!(root.layout_metrics().frame.size, Size::new(100.0, 100.0));
    }

    #[test]
    fn test_font_multiplier_change_clones_measurables() {
        let paragraph_descriptor: SharedComponentDescriptor =
            Arc::new(ParagraphComponentDescriptor::new(Arc::new(TextMeasureCache::new(8))));
        let paragraph = create_node(&paragraph_descriptor, 3, json!({ "text": "hello" }), vec![]);
        let container = crate::test_utils::view_with_children(2, json!({}), vec![paragraph.clone()]);
        let sibling = view(4, json!({}));

        let root = create_root_node(
            &root_descriptor(),
            1,
            LayoutConstraints::exact(Size::new(100.0, 100.0)),
            LayoutContext::default(),
        );
        root.append_child(container.clone());
        root.append_child(sibling.clone());
        layout_if_needed(&root, &mut Vec::new());
        root.seal_recursive();

        let scaled = clone_root_with_constraints(
            &root,
            LayoutConstraints::exact(Size::new(100.0, 100.0)),
            LayoutContext {
                font_size_multiplier: 2.0,
                ..Default::default()
            },
        );
        let children = scaled.children();
        assert!(!Arc::ptr_eq(&children[0], &container));
        assert!(Arc::ptr_eq(&children[1], &sibling));
        assert!(!children[0].children()[0].is_layout_clean());
    }
}
