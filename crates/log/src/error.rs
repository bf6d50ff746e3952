//! Error types for logger setup
use thiserror::Error;

/// Result type for logger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while installing the global subscriber
#[derive(Error, Debug)]
pub enum Error {
    /// The level filter could not be parsed
    #[error("Invalid filter '{filter}': {reason}")]
    Filter {
        /// The rejected filter string
        filter: String,
        /// Why parsing failed
        reason: String,
    },

    /// A global subscriber is already installed
    #[error("Failed to install subscriber: {0}")]
    Init(String),
}
