//! Error types for completion futures and executors
use std::sync::Arc;

use thiserror::Error;

use crate::executor::ExecutorId;

/// Result type for executor and future operations
pub type Result<T> = std::result::Result<T, ExecutorError>;

/// Failure cause carried by a failed future.
///
/// Shared so every listener and waiter can observe the same cause.
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by completion futures, promises and executors
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// An argument was outside its accepted range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not supported in the current state
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// A blocking wait was attempted from the thread that must complete the future
    #[error("Blocking wait on a pending future from inside the event loop of {executor}")]
    BlockingOperation {
        /// The executor whose own thread attempted to block
        executor: ExecutorId,
    },

    /// The future was cancelled
    #[error("Operation was cancelled")]
    Cancelled,

    /// A completion attempt hit a future that is already terminal
    #[error("Future already completed")]
    AlreadyCompleted,

    /// The future failed with the given cause
    #[error("Operation failed: {0}")]
    Failed(#[source] Cause),

    /// The executor no longer accepts tasks
    #[error("Executor {executor} rejected the task: shutting down")]
    Rejected {
        /// The rejecting executor
        executor: ExecutorId,
    },

    /// A submitted task panicked
    #[error("Task panicked: {0}")]
    TaskPanicked(String),

    /// The event loop thread could not be spawned
    #[error("Failed to spawn event loop thread")]
    Spawn(#[source] std::io::Error),
}

impl ExecutorError {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an illegal state error
    pub fn illegal_state<S: Into<String>>(message: S) -> Self {
        Self::IllegalState(message.into())
    }

    /// Check whether this error reports a cancellation
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Convert into a shareable failure cause
    #[must_use]
    pub fn into_cause(self) -> Cause {
        Arc::new(self)
    }
}

/// Render a caught panic payload as text.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
