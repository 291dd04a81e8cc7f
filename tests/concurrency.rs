//! Commits from many threads while readers walk committed revisions.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::{create, manager_with_surface, SURFACE};
use serde_json::json;
use spark_shadow::{Point, ShadowNode, StateData, StateUpdate};

const WRITERS: usize = 4;
const COMMITS_PER_WRITER: usize = 25;

fn assert_sealed(node: &Arc<ShadowNode>) {
    assert!(node.is_sealed());
    for child in node.children().iter() {
        assert_sealed(child);
    }
}

#[test]
fn test_serialized_commits_with_concurrent_readers() {
    let manager = manager_with_surface(200.0, 200.0);
    let stop = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let manager = Arc::clone(&manager);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut last = 0;
                while !stop.load(Ordering::Acquire) {
                    let revision = manager.current_revision(SURFACE).unwrap();
                    assert!(revision.number >= last);
                    last = revision.number;
                    assert_sealed(&revision.root);
                    let _ = manager.find_node_at_point(&revision.root, Point::new(5.0, 5.0));
                }
            })
        })
        .collect();

    let writers: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                for commit in 0..COMMITS_PER_WRITER {
                    let tag = (1000 + writer * COMMITS_PER_WRITER + commit) as i32;
                    let node = create(&manager, tag, "View", json!({ "height": commit % 7 }));
                    manager.complete_surface(SURFACE, vec![node]);
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }
    stop.store(true, Ordering::Release);
    for reader in readers {
        reader.join().unwrap();
    }

    let revision = manager.current_revision(SURFACE).unwrap();
    assert_eq!(revision.number, (WRITERS * COMMITS_PER_WRITER) as u64);
    assert_eq!(revision.root.children().len(), 1);
}

#[test]
fn test_state_updates_from_many_threads_are_not_lost() {
    let manager = manager_with_surface(100.0, 100.0);
    let counter = create(&manager, 2, "View", json!({}));
    manager.complete_surface(SURFACE, vec![counter.clone()]);

    let increment = StateUpdate::new(Arc::clone(counter.family()), |data| {
        let current = match data {
            StateData::Custom(value) => value.as_u64().unwrap_or(0),
            _ => 0,
        };
        Some(StateData::Custom(json!(current + 1)))
    });

    let threads: Vec<_> = (0..WRITERS)
        .map(|_| {
            let manager = Arc::clone(&manager);
            let increment = increment.clone();
            thread::spawn(move || {
                for _ in 0..COMMITS_PER_WRITER {
                    manager.update_state_with_retry(&increment, None).unwrap();
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    let newest = manager.get_newest_clone_of_shadow_node(&counter).unwrap();
    let value = match newest.state().map(|state| state.data()) {
        Some(StateData::Custom(value)) => value.as_u64(),
        _ => None,
    };
    assert_eq!(value, Some((WRITERS * COMMITS_PER_WRITER) as u64));
}

#[test]
fn test_mounting_consumer_sees_latest_revision() {
    let manager = manager_with_surface(100.0, 100.0);
    let tree = manager.shadow_tree_registry().get(SURFACE).unwrap();
    let coordinator = Arc::clone(tree.mounting_coordinator());

    let consumer = thread::spawn(move || {
        let mut mounted = 0;
        while mounted < 10 {
            if coordinator.wait_for_transaction(Duration::from_secs(5)) {
                if let Some(transaction) = coordinator.pull_transaction() {
                    assert!(transaction.number > mounted);
                    assert!(transaction.new_root.is_sealed());
                    mounted = transaction.number;
                }
            } else {
                break;
            }
        }
        mounted
    });

    for tag in 0..10 {
        let node = create(&manager, 10 + tag, "View", json!({}));
        manager.complete_surface(SURFACE, vec![node]);
    }
    assert_eq!(consumer.join().unwrap(), 10);
}
