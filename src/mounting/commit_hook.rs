//! Commit hooks: ordered interceptors that see every candidate root.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::shadow_tree::ShadowTree;
use crate::shadow::ShadowNode;

/// Intercepts every commit of every tree it is registered with.
///
/// Hooks run in registration order. Each receives the previous hook's output
/// as `new_root` and returns the root to continue with, or `None` to cancel
/// the commit.
pub trait CommitHook: Send + Sync {
    fn shadow_tree_will_commit(
        &self,
        tree: &ShadowTree,
        old_root: &Arc<ShadowNode>,
        new_root: Arc<ShadowNode>,
    ) -> Option<Arc<ShadowNode>>;

    fn commit_hook_was_registered(&self) {}

    fn commit_hook_was_unregistered(&self) {}
}

pub type SharedCommitHook = Arc<dyn CommitHook>;

/// Hooks shared by every tree of one `UIManager`.
#[derive(Default)]
pub struct CommitHookRegistry {
    hooks: RwLock<Vec<SharedCommitHook>>,
}

impl CommitHookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `hook`. Registering the same hook twice is a no-op.
    pub fn register(&self, hook: SharedCommitHook) {
        {
            let mut hooks = self.hooks.write();
            if hooks.iter().any(|existing| Arc::ptr_eq(existing, &hook)) {
                return;
            }
            hooks.push(Arc::clone(&hook));
            debug!(hooks = hooks.len(), "commit hook registered");
        }
        hook.commit_hook_was_registered();
    }

    /// Removes `hook`. Returns whether it was registered.
    pub fn unregister(&self, hook: &SharedCommitHook) -> bool {
        let removed = {
            let mut hooks = self.hooks.write();
            let before = hooks.len();
            hooks.retain(|existing| !Arc::ptr_eq(existing, hook));
            before != hooks.len()
        };
        if removed {
            debug!("commit hook unregistered");
            hook.commit_hook_was_unregistered();
        }
        removed
    }

    /// Hooks in registration order. A commit works off this copy, so hooks
    /// may (un)register hooks while running.
    pub fn snapshot(&self) -> Vec<SharedCommitHook> {
        self.hooks.read().clone()
    }

    pub fn len(&self) -> usize {
        self.hooks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.read().is_empty()
    }
}

impl std::fmt::Debug for CommitHookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitHookRegistry")
            .field("hooks", &self.len())
            .finish()
    }
}
