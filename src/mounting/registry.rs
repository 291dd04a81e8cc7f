//! Surface id → shadow tree map.
//!
//! Lookups hand out an `Arc` to the tree, so a commit never runs under the
//! registry lock.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::shadow_tree::ShadowTree;
use crate::error::{Error, Result};
use crate::types::SurfaceId;

#[derive(Debug, Default)]
pub struct ShadowTreeRegistry {
    trees: RwLock<HashMap<SurfaceId, Arc<ShadowTree>>>,
}

impl ShadowTreeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, tree: Arc<ShadowTree>) -> Result<()> {
        let surface_id = tree.surface_id();
        let mut trees = self.trees.write();
        if trees.contains_key(&surface_id) {
            return Err(Error::SurfaceAlreadyRunning(surface_id));
        }
        trees.insert(surface_id, tree);
        Ok(())
    }

    pub fn remove(&self, surface_id: SurfaceId) -> Option<Arc<ShadowTree>> {
        self.trees.write().remove(&surface_id)
    }

    pub fn get(&self, surface_id: SurfaceId) -> Option<Arc<ShadowTree>> {
        self.trees.read().get(&surface_id).cloned()
    }

    /// Calls `f` with the tree of `surface_id`. `None` for unknown surfaces.
    pub fn visit<R>(&self, surface_id: SurfaceId, f: impl FnOnce(&ShadowTree) -> R) -> Option<R> {
        let tree = self.get(surface_id)?;
        Some(f(&tree))
    }

    /// Calls `f` with every tree, in surface id order.
    pub fn enumerate(&self, mut f: impl FnMut(&ShadowTree)) {
        let mut trees: Vec<Arc<ShadowTree>> = self.trees.read().values().cloned().collect();
        trees.sort_by_key(|tree| tree.surface_id());
        for tree in &trees {
            f(tree);
        }
    }

    pub fn surface_ids(&self) -> Vec<SurfaceId> {
        let mut ids: Vec<_> = self.trees.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.trees.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.read().is_empty()
    }
}
