//! Error types shared by the async core.
//!
//! The runtime uses a closed error set instead of an "anything can be thrown"
//! dynamic value: every failure that travels through a future chain or a
//! coroutine is an [`AsyncError`] with a known [`ErrorKind`].

use thiserror::Error;

/// The kind of runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An ordinary rejection raised by user code or a host source.
    Failure,
    /// A future was resolved with itself, directly or through an adoption
    /// chain.
    ChainingCycle,
    /// Internal runtime error.
    Internal,
}

/// An error carried by a rejected future or a failed coroutine step.
///
/// # Examples
///
/// ```
/// use core_types::{AsyncError, ErrorKind};
///
/// let error = AsyncError::failure("request timed out");
/// assert_eq!(error.kind, ErrorKind::Failure);
/// assert_eq!(error.message, "request timed out");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AsyncError {
    /// The class of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl AsyncError {
    /// Creates an ordinary failure with the given message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Failure,
            message: message.into(),
        }
    }

    /// Creates the error used to reject a self-resolving future.
    pub fn chaining_cycle() -> Self {
        Self {
            kind: ErrorKind::ChainingCycle,
            message: "chaining cycle detected: future resolved with itself".to_string(),
        }
    }

    /// Creates an internal runtime error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Internal,
            message: message.into(),
        }
    }
}
