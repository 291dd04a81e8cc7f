//! Shadow Tree - one surface's committed root and the commit protocol.
//!
//! A commit turns the current root into a candidate through a caller's
//! transaction, runs the commit hooks over it, lays it out, seals it and
//! installs it as the next revision. Commits on one tree are serialized by
//! a mutex; readers take a snapshot of the current revision under a brief
//! read lock and never wait for a commit to finish.
//!
//! Nothing is installed until every step has succeeded, so a transaction or
//! hook that returns `None` (or panics) leaves the previous revision current.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, debug_span, warn};

use super::commit_hook::CommitHookRegistry;
use super::coordinator::MountingCoordinator;
use crate::components::{create_root_node, layout_if_needed, RootComponentDescriptor};
use crate::error::{Error, Result};
use crate::shadow::{
    RevisionStamp, ShadowNode, ShadowNodeFragment, ShadowNodeTraits, SharedComponentDescriptor,
};
use crate::types::{LayoutConstraints, LayoutContext, SurfaceId};

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    Succeeded,
    /// The candidate was not a valid root.
    Failed,
    /// The transaction or a hook returned `None`.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitOptions {
    /// Replace states that are older than their family's newest committed
    /// state before the hooks run.
    pub enable_state_reconciliation: bool,
    /// Passed through to the delegate; the consumer decides what it means.
    pub mount_synchronously: bool,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            enable_state_reconciliation: false,
            mount_synchronously: true,
        }
    }
}

/// A committed root and its position in the tree's history.
#[derive(Debug, Clone)]
pub struct ShadowTreeRevision {
    pub root: Arc<ShadowNode>,
    pub number: u64,
}

/// Number of the revision a tree starts with.
pub const INITIAL_REVISION: u64 = 0;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Receives the outcome of every successful commit, outside the commit lock.
pub trait ShadowTreeDelegate: Send + Sync {
    fn shadow_tree_did_finish_transaction(&self, tree: &ShadowTree, mount_synchronously: bool);

    /// Nodes whose layout metrics changed in the commit.
    fn shadow_tree_did_layout(&self, _tree: &ShadowTree, _affected: &[Arc<ShadowNode>]) {}
}

// =============================================================================
// Shadow Tree
// =============================================================================

pub struct ShadowTree {
    /// Unique per tree, also across restarts of the same surface.
    id: u64,
    surface_id: SurfaceId,
    commit_lock: Mutex<()>,
    current: RwLock<ShadowTreeRevision>,
    coordinator: Arc<MountingCoordinator>,
    hooks: Arc<CommitHookRegistry>,
    delegate: Option<Weak<dyn ShadowTreeDelegate>>,
}

impl ShadowTree {
    /// Tree with an empty, sealed root laid out under `constraints`.
    pub fn new(
        surface_id: SurfaceId,
        constraints: LayoutConstraints,
        context: LayoutContext,
        hooks: Arc<CommitHookRegistry>,
        delegate: Option<Weak<dyn ShadowTreeDelegate>>,
    ) -> Self {
        let descriptor: SharedComponentDescriptor = Arc::new(RootComponentDescriptor);
        let root = create_root_node(&descriptor, surface_id, constraints, context);
        root.seal_recursive();

        let revision = ShadowTreeRevision {
            root,
            number: INITIAL_REVISION,
        };
        Self {
            id: NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed),
            surface_id,
            commit_lock: Mutex::new(()),
            coordinator: Arc::new(MountingCoordinator::new(revision.clone())),
            current: RwLock::new(revision),
            hooks,
            delegate,
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// Stamp the families of `revision`'s nodes carry when this tree
    /// committed them.
    pub fn revision_stamp(&self, revision: &ShadowTreeRevision) -> RevisionStamp {
        RevisionStamp {
            tree: self.id,
            number: revision.number,
        }
    }

    /// Snapshot of the current revision.
    pub fn current_revision(&self) -> ShadowTreeRevision {
        self.current.read().clone()
    }

    pub fn mounting_coordinator(&self) -> &Arc<MountingCoordinator> {
        &self.coordinator
    }

    /// Runs one commit. `transaction` receives the current root and returns
    /// the candidate root, or `None` to cancel.
    pub fn commit<F>(&self, transaction: F, options: CommitOptions) -> CommitStatus
    where
        F: FnOnce(&Arc<ShadowNode>) -> Option<Arc<ShadowNode>>,
    {
        let span = debug_span!("commit", surface_id = self.surface_id);
        let _entered = span.enter();

        let (revision, affected) = {
            let _commit = self.commit_lock.lock();
            match self.try_commit(transaction, options) {
                Ok(committed) => committed,
                Err(status) => {
                    debug!(?status, "commit not applied");
                    return status;
                }
            }
        };

        debug!(
            number = revision.number,
            affected = affected.len(),
            "commit succeeded"
        );

        if let Some(delegate) = self.delegate.as_ref().and_then(Weak::upgrade) {
            if !affected.is_empty() {
                delegate.shadow_tree_did_layout(self, &affected);
            }
            delegate.shadow_tree_did_finish_transaction(self, options.mount_synchronously);
        }
        CommitStatus::Succeeded
    }

    /// The steps of a commit. Must be called with the commit lock held.
    fn try_commit<F>(
        &self,
        transaction: F,
        options: CommitOptions,
    ) -> std::result::Result<(ShadowTreeRevision, Vec<Arc<ShadowNode>>), CommitStatus>
    where
        F: FnOnce(&Arc<ShadowNode>) -> Option<Arc<ShadowNode>>,
    {
        let old = self.current_revision();

        let mut new_root = transaction(&old.root).ok_or(CommitStatus::Cancelled)?;

        if options.enable_state_reconciliation {
            if let Some(progressed) = new_root.progress_state() {
                new_root = progressed;
            }
        }

        for hook in self.hooks.snapshot() {
            new_root = hook
                .shadow_tree_will_commit(self, &old.root, new_root)
                .ok_or(CommitStatus::Cancelled)?;
        }

        if !new_root.traits().contains(ShadowNodeTraits::ROOT_NODE) {
            warn!(
                component = new_root.component_name(),
                "candidate root is not a root node"
            );
            return Err(CommitStatus::Failed);
        }

        let mut affected = Vec::new();
        layout_if_needed(&new_root, &mut affected);

        let number = old.number + 1;
        new_root.record_most_recent(RevisionStamp {
            tree: self.id,
            number,
        });
        new_root.seal_recursive();

        let revision = ShadowTreeRevision {
            root: new_root,
            number,
        };
        *self.current.write() = revision.clone();
        self.coordinator.push(revision.clone());
        Ok((revision, affected))
    }

    /// Commits until one attempt succeeds, at most `max_attempts` times.
    pub fn commit_with_retry<F>(
        &self,
        max_attempts: usize,
        transaction: F,
        options: CommitOptions,
    ) -> Result<()>
    where
        F: Fn(&Arc<ShadowNode>) -> Option<Arc<ShadowNode>>,
    {
        for attempt in 1..=max_attempts {
            match self.commit(&transaction, options) {
                CommitStatus::Succeeded => return Ok(()),
                status => debug!(attempt, ?status, "commit attempt did not succeed"),
            }
        }
        Err(Error::RetriesExhausted {
            attempts: max_attempts,
        })
    }

    /// Commits a root with no children.
    pub fn commit_empty_tree(&self) -> CommitStatus {
        self.commit(
            |root| Some(root.clone_with(ShadowNodeFragment::with_children(Arc::default()))),
            CommitOptions::default(),
        )
    }
}

impl fmt::Debug for ShadowTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowTree")
            .field("id", &self.id)
            .field("surface_id", &self.surface_id)
            .field("revision", &self.current.read().number)
            .finish()
    }
}
