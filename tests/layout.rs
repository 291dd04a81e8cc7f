//! Layout through the public API: frames, hit testing, relative metrics,
//! text measurement and layout node ownership across revisions.

mod common;

use std::sync::Arc;

use common::{create, manager_with_surface, SURFACE};
use serde_json::json;
use spark_shadow::{
    DisplayType, LayoutConstraints, LayoutContext, LayoutMetrics, Point, Rect, ShadowNode,
    ShadowNodeFragment, Size, StateData, StateUpdate, UIManager,
};

fn root(manager: &UIManager) -> Arc<ShadowNode> {
    manager.current_revision(SURFACE).unwrap().root
}

fn tags(node: Option<Arc<ShadowNode>>) -> Option<i32> {
    node.map(|node| node.tag())
}

#[test]
fn test_hit_testing_nested_absolute_children() {
    let manager = manager_with_surface(1000.0, 1000.0);
    let child = create(
        &manager,
        2,
        "View",
        json!({ "position": "absolute", "left": 100, "top": 100, "width": 100, "height": 100 }),
    );
    let grandchild = create(
        &manager,
        3,
        "View",
        json!({ "position": "absolute", "left": 10, "top": 10, "width": 10, "height": 10 }),
    );
    manager.append_child(&child, grandchild);
    manager.complete_surface(SURFACE, vec![child]);

    let root = root(&manager);
    assert_eq!(root.tag(), 1);
    assert_eq!(tags(manager.find_node_at_point(&root, Point::new(115.0, 115.0))), Some(3));
    assert_eq!(tags(manager.find_node_at_point(&root, Point::new(105.0, 105.0))), Some(2));
    assert_eq!(tags(manager.find_node_at_point(&root, Point::new(900.0, 900.0))), Some(1));
    assert_eq!(tags(manager.find_node_at_point(&root, Point::new(1001.0, 1001.0))), None);
}

#[test]
fn test_hit_testing_respects_z_index_and_pointer_events() {
    let manager = manager_with_surface(100.0, 100.0);
    let full = json!({ "position": "absolute", "left": 0, "top": 0, "width": 50, "height": 50 });
    let mut raised = full.clone();
    raised["zIndex"] = json!(5);
    let mut see_through = full.clone();
    see_through["pointerEvents"] = json!("none");

    let low = create(&manager, 2, "View", raised);
    let high = create(&manager, 3, "View", full);
    let ignored = create(&manager, 4, "View", see_through);
    manager.complete_surface(SURFACE, vec![low, high, ignored]);

    // Tag 2 is first in order but has the highest z-index; tag 4 is last
    // but never a target.
    let root = root(&manager);
    assert_eq!(tags(manager.find_node_at_point(&root, Point::new(10.0, 10.0))), Some(2));
}

#[test]
fn test_relative_metrics_apply_scroll_offset() {
    let manager = manager_with_surface(200.0, 200.0);
    let scroll = create(
        &manager,
        2,
        "ScrollView",
        json!({ "position": "absolute", "left": 20, "top": 20, "width": 100, "height": 100 }),
    );
    let item = create(&manager, 3, "View", json!({ "marginTop": 30, "height": 10 }));
    manager.append_child(&scroll, item.clone());
    manager.complete_surface(SURFACE, vec![scroll.clone()]);

    let metrics = manager.get_relative_layout_metrics(&item, None);
    assert_eq!(metrics.frame, Rect::new(20.0, 50.0, 100.0, 10.0));

    let scrolled = StateUpdate::replace(
        Arc::clone(scroll.family()),
        StateData::ScrollView(spark_shadow::ScrollViewState {
            content_offset: Point::new(0.0, 25.0),
        }),
    );
    manager.update_state(&scrolled);

    let metrics = manager.get_relative_layout_metrics(&item, None);
    assert_eq!(metrics.frame.origin, Point::new(20.0, 25.0));
    let relative_to_scroll = manager.get_relative_layout_metrics(&item, Some(&scroll));
    assert_eq!(relative_to_scroll.frame.origin, Point::new(0.0, 5.0));

    // Hit testing sees the shifted content too.
    let root = root(&manager);
    assert_eq!(tags(manager.find_node_at_point(&root, Point::new(30.0, 28.0))), Some(3));
}

#[test]
fn test_relative_metrics_of_hidden_or_unrelated_nodes_are_empty() {
    let manager = manager_with_surface(100.0, 100.0);
    let hidden = create(&manager, 2, "View", json!({ "display": "none", "height": 10 }));
    let shown = create(&manager, 3, "View", json!({ "height": 10 }));
    manager.complete_surface(SURFACE, vec![hidden.clone(), shown.clone()]);

    assert_eq!(manager.get_relative_layout_metrics(&hidden, None), LayoutMetrics::EMPTY);
    assert_eq!(
        manager.get_relative_layout_metrics(&shown, Some(&hidden)),
        LayoutMetrics::EMPTY
    );
    assert_eq!(manager.layout_metrics(&hidden).display_type, DisplayType::None);
}

#[test]
fn test_paragraph_wraps_to_container_width() {
    let manager = manager_with_surface(100.0, 100.0);
    let container = create(&manager, 2, "View", json!({ "width": 30 }));
    let text = create(
        &manager,
        3,
        "RCTText",
        json!({ "text": "hello world", "fontSize": 10, "lineHeight": 12 }),
    );
    assert_eq!(text.component_name(), "Paragraph");
    manager.append_child(&container, text.clone());
    manager.complete_surface(SURFACE, vec![container]);

    let frame = manager.layout_metrics(&text).frame;
    assert_eq!(frame.size.width, 30.0);
    assert_eq!(frame.size.height, 24.0);
}

#[test]
fn test_font_size_multiplier_remeasures_text() {
    let manager = manager_with_surface(100.0, 100.0);
    let text = create(
        &manager,
        2,
        "Paragraph",
        json!({ "text": "hi", "fontSize": 10, "lineHeight": 10 }),
    );
    manager.complete_surface(SURFACE, vec![text.clone()]);
    assert_eq!(manager.layout_metrics(&text).frame.size.height, 10.0);

    manager.constraint_surface_layout(
        SURFACE,
        LayoutConstraints::exact(Size::new(100.0, 100.0)),
        Some(LayoutContext {
            font_size_multiplier: 2.0,
            ..Default::default()
        }),
    );
    assert_eq!(manager.layout_metrics(&text).frame.size.height, 20.0);
}

#[test]
fn test_constraint_surface_layout_resizes_root() {
    let manager = manager_with_surface(100.0, 100.0);
    let child = create(&manager, 2, "View", json!({ "flexGrow": 1 }));
    manager.complete_surface(SURFACE, vec![child.clone()]);
    assert_eq!(manager.layout_metrics(&child).frame.size, Size::new(100.0, 100.0));

    manager.constraint_surface_layout(SURFACE, LayoutConstraints::exact(Size::new(300.0, 40.0)), None);
    assert_eq!(root(&manager).layout_metrics().frame.size, Size::new(300.0, 40.0));
    assert_eq!(manager.layout_metrics(&child).frame.size, Size::new(300.0, 40.0));
}

#[test]
fn test_cloned_child_under_new_parent_leaves_original_layout() {
    let manager = manager_with_surface(100.0, 100.0);
    let a = create(&manager, 2, "View", json!({ "width": 40, "height": 10 }));
    manager.complete_surface(SURFACE, vec![a.clone()]);
    let original_frame = a.layout_metrics().frame;
    let original_style = a.yoga_style();
    assert!(a.is_sealed());

    let a_prime = manager.clone_node(&a, None, Some(&json!({ "width": 70 }).into()));
    assert_ne!(a_prime.layout_node_id(), a.layout_node_id());

    let parent = create(&manager, 3, "View", json!({ "paddingTop": 5 }));
    manager.append_child(&parent, a_prime.clone());
    manager.complete_surface(SURFACE, vec![parent]);

    assert_eq!(a.layout_metrics().frame, original_frame);
    assert_eq!(a.yoga_style(), original_style);
    assert_eq!(manager.layout_metrics(&a).frame, Rect::new(0.0, 5.0, 70.0, 10.0));
}

#[test]
fn test_unchanged_sibling_is_shared_between_revisions() {
    let manager = manager_with_surface(100.0, 100.0);
    let a = create(&manager, 2, "View", json!({ "height": 10 }));
    let b = create(&manager, 3, "View", json!({ "height": 10 }));
    manager.complete_surface(SURFACE, vec![a.clone(), b.clone()]);
    let committed_a = manager.get_newest_clone_of_shadow_node(&a).unwrap();

    let taller_b = manager.clone_node(&b, None, Some(&json!({ "height": 30 }).into()));
    manager.complete_surface(SURFACE, vec![committed_a.clone(), taller_b]);

    let root = root(&manager);
    assert!(Arc::ptr_eq(&root.children()[0], &committed_a));
    assert_eq!(manager.layout_metrics(&b).frame, Rect::new(0.0, 10.0, 100.0, 30.0));
}

#[test]
fn test_rtl_surface_mirrors_row() {
    let manager = manager_with_surface(100.0, 100.0);
    manager.constraint_surface_layout(
        SURFACE,
        LayoutConstraints {
            layout_direction: spark_shadow::LayoutDirection::RightToLeft,
            ..LayoutConstraints::exact(Size::new(100.0, 100.0))
        },
        None,
    );
    let row = create(&manager, 2, "View", json!({ "flexDirection": "row", "height": 10 }));
    let first = create(&manager, 3, "View", json!({ "width": 20 }));
    manager.append_child(&row, first.clone());
    manager.complete_surface(SURFACE, vec![row]);

    assert_eq!(manager.layout_metrics(&first).frame.origin, Point::new(80.0, 0.0));
}

#[test]
fn test_layout_is_complete_after_commit() {
    let manager = manager_with_surface(100.0, 100.0);
    let leaf = create(&manager, 3, "View", json!({ "height": 5 }));
    let middle = create(&manager, 2, "View", json!({ "padding": 4 }));
    manager.append_child(&middle, leaf.clone());
    manager.complete_surface(SURFACE, vec![middle.clone()]);

    fn assert_settled(node: &Arc<ShadowNode>) {
        assert!(node.is_sealed());
        assert!(!node.has_new_layout());
        for child in node.children().iter() {
            assert_settled(child);
        }
    }
    assert_settled(&root(&manager));

    let cloned = middle.clone_with(ShadowNodeFragment::default());
    assert!(!cloned.is_sealed());
}
