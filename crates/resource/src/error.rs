//! Error types for per-executor resources
use strand_executor::{ExecutorError, ExecutorId};
use thiserror::Error;

/// Result type for resource operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by factories and `close`
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by [`ResourceGroup`](crate::ResourceGroup)
#[derive(Error, Debug)]
pub enum Error {
    /// The executor no longer accepts tasks
    #[error("Executor {executor} is not accepting tasks")]
    IllegalState {
        /// The executor that was asked for a resource
        executor: ExecutorId,
    },

    /// The factory failed; nothing was cached
    #[error("Failed to create a new resource for {executor}")]
    Creation {
        /// The executor the resource was requested for
        executor: ExecutorId,
        /// The factory error
        #[source]
        source: BoxError,
    },

    /// The executor refused an operation the group depends on
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

impl Error {
    /// The executor this error concerns, if any
    #[must_use]
    pub fn executor(&self) -> Option<ExecutorId> {
        match self {
            Self::IllegalState { executor } | Self::Creation { executor, .. } => Some(*executor),
            Self::Executor(
                ExecutorError::BlockingOperation { executor }
                | ExecutorError::Rejected { executor },
            ) => Some(*executor),
            Self::Executor(_) => None,
        }
    }
}
