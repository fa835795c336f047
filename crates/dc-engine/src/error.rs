//! Failures that abort a handler.

use dc_core::UserId;
use thiserror::Error;

use crate::ports::PortError;

/// A handler could not complete because storage failed.
///
/// Delivery and generation failures never surface here: the engine logs them
/// and carries on with fallback text.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load user {user}: {source}")]
    Load {
        user: UserId,
        #[source]
        source: PortError,
    },
    #[error("failed to save user {user}: {source}")]
    Save {
        user: UserId,
        #[source]
        source: PortError,
    },
    #[error("failed to record journal entry for {user}: {source}")]
    Journal {
        user: UserId,
        #[source]
        source: PortError,
    },
    #[error("failed to record goal for {user}: {source}")]
    Goal {
        user: UserId,
        #[source]
        source: PortError,
    },
    #[error("failed to list users: {0}")]
    ListUsers(#[source] PortError),
    #[error("failed to list goals: {0}")]
    ListGoals(#[source] PortError),
}
