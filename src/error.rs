//! Recoverable errors.
//!
//! Contract violations (mutating a sealed node, inverted layout constraints)
//! panic instead; expected absence (unknown surface, unreachable family) is
//! an `Option` or a [`CommitStatus`](crate::CommitStatus).

use thiserror::Error;

use crate::types::SurfaceId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("surface {0} is already running")]
    SurfaceAlreadyRunning(SurfaceId),

    #[error("commit did not succeed after {attempts} attempts")]
    RetriesExhausted { attempts: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("invalid props: {0}")]
    InvalidProps(String),
}

pub type Result<T> = std::result::Result<T, Error>;
