//! Commit protocol: atomicity, hook ordering, sealing and mounting hand-off.

mod common;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{create, init_tracing, manager_with_surface, SURFACE};
use serde_json::json;
use spark_shadow::{
    CommitHook, CommitHookRegistry, CommitOptions, CommitStatus, Error, LayoutConstraints,
    LayoutContext, ShadowNode, ShadowNodeFragment, ShadowTree, SharedCommitHook, Size,
};

fn tree(hooks: Arc<CommitHookRegistry>) -> ShadowTree {
    init_tracing();
    ShadowTree::new(
        7,
        LayoutConstraints::exact(Size::new(50.0, 50.0)),
        LayoutContext::default(),
        hooks,
        None,
    )
}

fn replace_children(children: Vec<Arc<ShadowNode>>) -> impl Fn(&Arc<ShadowNode>) -> Option<Arc<ShadowNode>> {
    move |root| Some(root.clone_with(ShadowNodeFragment::with_children(Arc::new(children.clone()))))
}

/// Counts the commits it has seen.
#[derive(Default)]
struct CountingHook {
    seen: AtomicUsize,
}

impl CommitHook for CountingHook {
    fn shadow_tree_will_commit(
        &self,
        _tree: &ShadowTree,
        _old_root: &Arc<ShadowNode>,
        new_root: Arc<ShadowNode>,
    ) -> Option<Arc<ShadowNode>> {
        self.seen.fetch_add(1, Ordering::SeqCst);
        Some(new_root)
    }
}

/// Cancels every commit whose candidate has more than `limit` children.
struct LimitHook {
    limit: usize,
}

impl CommitHook for LimitHook {
    fn shadow_tree_will_commit(
        &self,
        _tree: &ShadowTree,
        _old_root: &Arc<ShadowNode>,
        new_root: Arc<ShadowNode>,
    ) -> Option<Arc<ShadowNode>> {
        (new_root.children().len() <= self.limit).then_some(new_root)
    }
}

/// Panics inside the hook chain.
struct ExplodingHook;

impl CommitHook for ExplodingHook {
    fn shadow_tree_will_commit(
        &self,
        _tree: &ShadowTree,
        _old_root: &Arc<ShadowNode>,
        _new_root: Arc<ShadowNode>,
    ) -> Option<Arc<ShadowNode>> {
        panic!("hook failed");
    }
}

#[test]
fn test_revision_numbers_increase_by_one() {
    let tree = tree(Arc::new(CommitHookRegistry::new()));
    for expected in 1..=3 {
        assert_eq!(tree.commit(replace_children(vec![]), CommitOptions::default()), CommitStatus::Succeeded);
        assert_eq!(tree.current_revision().number, expected);
    }
    let transaction = tree.mounting_coordinator().pull_transaction().unwrap();
    assert_eq!(transaction.number, 3);
    assert_eq!(transaction.surface_id, 7);
}

#[test]
fn test_hook_sees_every_commit_and_may_veto() {
    let hooks = Arc::new(CommitHookRegistry::new());
    let counter = Arc::new(CountingHook::default());
    hooks.register(counter.clone());
    hooks.register(Arc::new(LimitHook { limit: 1 }));
    let tree = tree(Arc::clone(&hooks));

    let manager = manager_with_surface(10.0, 10.0);
    let one = create(&manager, 2, "View", json!({}));
    let two = create(&manager, 3, "View", json!({}));

    assert_eq!(
        tree.commit(replace_children(vec![one.clone()]), CommitOptions::default()),
        CommitStatus::Succeeded
    );
    let before = tree.current_revision();
    assert_eq!(
        tree.commit(replace_children(vec![one, two]), CommitOptions::default()),
        CommitStatus::Cancelled
    );
    assert!(Arc::ptr_eq(&tree.current_revision().root, &before.root));
    assert_eq!(counter.seen.load(Ordering::SeqCst), 2);
}

#[test]
fn test_panicking_hook_leaves_previous_root() {
    let hooks = Arc::new(CommitHookRegistry::new());
    let tree = tree(Arc::clone(&hooks));
    tree.commit(replace_children(vec![]), CommitOptions::default());
    let before = tree.current_revision();

    let exploding: SharedCommitHook = Arc::new(ExplodingHook);
    hooks.register(Arc::clone(&exploding));
    let result = catch_unwind(AssertUnwindSafe(|| {
        tree.commit(replace_children(vec![]), CommitOptions::default())
    }));
    assert!(result.is_err());
    assert!(Arc::ptr_eq(&tree.current_revision().root, &before.root));
    assert_eq!(tree.current_revision().number, before.number);
    assert_eq!(
        tree.mounting_coordinator().pull_transaction().map(|t| t.number),
        Some(before.number)
    );

    hooks.unregister(&exploding);
    assert_eq!(tree.commit(replace_children(vec![]), CommitOptions::default()), CommitStatus::Succeeded);
}

#[test]
fn test_committed_tree_is_sealed_and_edits_need_clones() {
    let tree = tree(Arc::new(CommitHookRegistry::new()));
    let manager = manager_with_surface(10.0, 10.0);
    let child = create(&manager, 2, "View", json!({}));
    tree.commit(replace_children(vec![child.clone()]), CommitOptions::default());

    let root = tree.current_revision().root;
    assert!(root.is_sealed() && child.is_sealed());
    let attempt = catch_unwind(AssertUnwindSafe(|| root.append_child(create(&manager, 3, "View", json!({})))));
    assert!(attempt.is_err());

    let clone = root.clone_with(ShadowNodeFragment::default());
    clone.append_child(create(&manager, 3, "View", json!({})));
    assert_eq!(clone.children().len(), 2);
    assert_eq!(root.children().len(), 1);
}

#[test]
fn test_empty_tree_and_retry() {
    let tree = tree(Arc::new(CommitHookRegistry::new()));
    let manager = manager_with_surface(10.0, 10.0);
    tree.commit(replace_children(vec![create(&manager, 2, "View", json!({}))]), CommitOptions::default());

    assert_eq!(tree.commit_empty_tree(), CommitStatus::Succeeded);
    assert!(tree.current_revision().root.children().is_empty());

    let attempts = AtomicUsize::new(0);
    let result = tree.commit_with_retry(
        5,
        |root| {
            // Succeeds on the third try.
            (attempts.fetch_add(1, Ordering::SeqCst) >= 2)
                .then(|| root.clone_with(ShadowNodeFragment::default()))
        },
        CommitOptions::default(),
    );
    assert!(result.is_ok());
    assert_eq!(attempts.load(Ordering::SeqCst), 3);

    let err = tree
        .commit_with_retry(2, |_| None, CommitOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::RetriesExhausted { attempts: 2 }));
}

#[test]
fn test_surface_tree_reports_its_surface() {
    let manager = manager_with_surface(10.0, 10.0);
    let tree = manager.shadow_tree_registry().get(SURFACE).unwrap();
    assert_eq!(tree.surface_id(), SURFACE);
    assert_eq!(tree.current_revision().root.tag(), SURFACE);
}
