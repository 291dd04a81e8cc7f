//! Hand-off point between the commit side and the mounting side.
//!
//! The tree pushes every committed revision; a consumer pulls the pair of
//! roots it has not mounted yet. Revisions pushed between two pulls are
//! collapsed: the consumer diffs its last mounted root against the newest.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::trace;

use super::shadow_tree::ShadowTreeRevision;
use crate::shadow::ShadowNode;
use crate::types::SurfaceId;

/// Roots to diff for one mount.
#[derive(Debug, Clone)]
pub struct MountingTransaction {
    pub surface_id: SurfaceId,
    pub number: u64,
    pub old_root: Arc<ShadowNode>,
    pub new_root: Arc<ShadowNode>,
}

struct Revisions {
    base: ShadowTreeRevision,
    last: Option<ShadowTreeRevision>,
}

pub struct MountingCoordinator {
    surface_id: SurfaceId,
    revisions: Mutex<Revisions>,
    signal: Condvar,
}

impl MountingCoordinator {
    /// Coordinator whose mounted state starts at `base`.
    pub fn new(base: ShadowTreeRevision) -> Self {
        Self {
            surface_id: base.root.surface_id(),
            revisions: Mutex::new(Revisions { base, last: None }),
            signal: Condvar::new(),
        }
    }

    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// Queues `revision` for mounting.
    ///
    /// Panics when the revision number does not increase.
    pub fn push(&self, revision: ShadowTreeRevision) {
        let mut revisions = self.revisions.lock();
        let newest = revisions
            .last
            .as_ref()
            .map_or(revisions.base.number, |last| last.number);
        assert!(
            revision.number > newest,
            "revision {} pushed after revision {}",
            revision.number,
            newest
        );
        trace!(surface_id = self.surface_id, number = revision.number, "revision pushed");
        revisions.last = Some(revision);
        self.signal.notify_all();
    }

    /// Takes the pending transaction, if any, and makes its new root the
    /// mounted base.
    pub fn pull_transaction(&self) -> Option<MountingTransaction> {
        let mut revisions = self.revisions.lock();
        let last = revisions.last.take()?;
        let transaction = MountingTransaction {
            surface_id: self.surface_id,
            number: last.number,
            old_root: Arc::clone(&revisions.base.root),
            new_root: Arc::clone(&last.root),
        };
        revisions.base = last;
        Some(transaction)
    }

    pub fn has_pending_transaction(&self) -> bool {
        self.revisions.lock().last.is_some()
    }

    /// Blocks until a revision is pending or `timeout` elapses. Returns
    /// whether one is pending.
    pub fn wait_for_transaction(&self, timeout: Duration) -> bool {
        let mut revisions = self.revisions.lock();
        if revisions.last.is_none() {
            let _ = self
                .signal
                .wait_while_for(&mut revisions, |revisions| revisions.last.is_none(), timeout);
        }
        revisions.last.is_some()
    }

    /// Revision most recently pulled.
    pub fn base_revision(&self) -> ShadowTreeRevision {
        self.revisions.lock().base.clone()
    }
}

impl std::fmt::Debug for MountingCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountingCoordinator")
            .field("surface_id", &self.surface_id)
            .field("pending", &self.has_pending_transaction())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::view;
    use serde_json::json;
    use std::thread;

    fn revision(number: u64) -> ShadowTreeRevision {
        ShadowTreeRevision {
            root: view(1, json!({})),
            number,
        }
    }

    #[test]
    fn test_pull_collapses_pending_revisions() {
        let base = revision(0);
        let coordinator = MountingCoordinator::new(base.clone());
        assert!(coordinator.pull_transaction().is_none());

        coordinator.push(revision(1));
        let second = revision(2);
        coordinator.push(second.clone());

        let transaction = coordinator.pull_transaction().unwrap();
        assert_eq!(transaction.number, 2);
        assert!(Arc::ptr_eq(&transaction.old_root, &base.root));
        assert!(Arc::ptr_eq(&transaction.new_root, &second.root));
        assert!(!coordinator.has_pending_transaction());
        assert_eq!(coordinator.base_revision().number, 2);
    }

    #[test]
    #[should_panic(expected = "pushed after")]
    fn test_non_increasing_revision_panics() {
        let coordinator = MountingCoordinator::new(revision(3));
        coordinator.push(revision(3));
    }

    #[test]
    fn test_wait_for_transaction() {
        let coordinator = Arc::new(MountingCoordinator::new(revision(0)));
        assert!(!coordinator.wait_for_transaction(Duration::from_millis(10)));

        let pusher = {
            let coordinator = Arc::clone(&coordinator);
            thread::spawn(move || coordinator.push(revision(1)))
        };
        assert!(coordinator.wait_for_transaction(Duration::from_secs(5)));
        pusher.join().unwrap();
        assert_eq!(coordinator.pull_transaction().unwrap().number, 1);
    }
}
