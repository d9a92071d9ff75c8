//! Error types for Coldstream.
//!
//! Only construction-time and configuration failures are represented here.
//! Failures produced while a stream is running travel on the observable's own
//! error channel (`E`) and never through these types.

use thiserror::Error;

/// Root error type for Coldstream operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObservableError {
    /// An argument handed to `concat` does not expose a subscribe capability
    #[error("argument {index} is not an observable")]
    NotObservable {
        /// Position of the offending argument, counting from the first `other`
        index: usize,
    },

    /// A value handed to `from` is neither observable, iterable nor a sequence
    #[error("value cannot be converted to an observable")]
    NotConvertible,

    /// A configuration value was rejected by `Config::validate`
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<String> for ObservableError {
    fn from(msg: String) -> Self {
        ObservableError::InvalidConfig(msg)
    }
}

/// Result type alias for Coldstream operations.
pub type ObservableResult<T> = Result<T, ObservableError>;
