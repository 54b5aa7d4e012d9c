//! # Domain Errors
//!
//! Error types for the runtime adapter.

use thiserror::Error;

/// Runtime adapter error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuntimeError {
    /// Could not reach the container runtime.
    #[error("runtime connection failed: {0}")]
    Connection(String),

    /// The runtime answered with an error.
    #[error("{0}")]
    Api(String),

    /// The runtime reported the addressed object as missing.
    #[error("no such object: {0}")]
    NotFound(String),

    /// Container was created but could not be started. It is left in place.
    #[error("container {container_id} was created but failed to start: {reason}")]
    StartFailed {
        /// Id of the created container
        container_id: String,
        /// Underlying runtime message
        reason: String,
    },

    /// No container with the given name exists.
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    /// The runtime event feed ended.
    #[error("event subscription ended")]
    SubscriptionEnded,

    /// A task driving the runtime panicked.
    #[error("runtime task failed: {0}")]
    TaskFailed(String),
}

impl RuntimeError {
    /// Whether this is the "named container is missing" condition.
    pub fn is_container_not_found(&self) -> bool {
        matches!(self, RuntimeError::ContainerNotFound(_))
    }
}
