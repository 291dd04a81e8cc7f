//! State boxes.
//!
//! State is data a component owns outside of props (a scroll offset, a text
//! layout). Nodes compare states by identity: every update allocates a new
//! box with a higher per-family revision, even when the data is equal.

use std::fmt;
use std::sync::{Arc, Weak};

use super::family::ShadowNodeFamily;
use crate::components::ScrollViewState;

/// Component-specific state payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StateData {
    #[default]
    Empty,
    ScrollView(ScrollViewState),
    /// Free-form state for components defined outside this crate.
    Custom(serde_json::Value),
}

pub struct State {
    revision: u64,
    family: Weak<ShadowNodeFamily>,
    data: StateData,
}

impl State {
    pub(crate) fn new(family: &Arc<ShadowNodeFamily>, data: StateData) -> Self {
        Self {
            revision: family.next_state_revision(),
            family: Arc::downgrade(family),
            data,
        }
    }

    #[inline]
    pub fn data(&self) -> &StateData {
        &self.data
    }

    /// Position of this box in its family's update sequence, starting at 1.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn family(&self) -> Option<Arc<ShadowNodeFamily>> {
        self.family.upgrade()
    }

    /// The family's newest committed state when it is newer than this one.
    pub fn most_recent_if_obsolete(&self) -> Option<Arc<State>> {
        let family = self.family.upgrade()?;
        let recent = family.most_recent_state()?;
        (recent.revision > self.revision).then_some(recent)
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("revision", &self.revision)
            .field("data", &self.data)
            .finish()
    }
}

type StateReducer = dyn Fn(&StateData) -> Option<StateData> + Send + Sync;

/// A request to replace the state of one family in its surface's tree.
///
/// The reducer receives the current data and returns the new data, or
/// `None` when the update no longer applies (the commit is cancelled).
#[derive(Clone)]
pub struct StateUpdate {
    pub family: Arc<ShadowNodeFamily>,
    pub reducer: Arc<StateReducer>,
}

impl StateUpdate {
    pub fn new<F>(family: Arc<ShadowNodeFamily>, reducer: F) -> Self
    where
        F: Fn(&StateData) -> Option<StateData> + Send + Sync + 'static,
    {
        Self {
            family,
            reducer: Arc::new(reducer),
        }
    }

    /// Unconditionally replaces the data.
    pub fn replace(family: Arc<ShadowNodeFamily>, data: StateData) -> Self {
        Self::new(family, move |_| Some(data.clone()))
    }
}

impl fmt::Debug for StateUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateUpdate")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}
