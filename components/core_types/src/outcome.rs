//! Per-future settlement records.
//!
//! An [`Outcome`] captures how a single future settled without losing the
//! distinction between fulfillment and rejection. `all_settled` reports one
//! record per input, in input order.

use crate::AsyncError;

/// The recorded settlement of one future.
///
/// # Examples
///
/// ```
/// use core_types::{AsyncError, Outcome};
///
/// let ok: Outcome<i32> = Outcome::Fulfilled(1);
/// let err: Outcome<i32> = Outcome::Rejected(AsyncError::failure("x"));
///
/// assert!(ok.is_fulfilled());
/// assert_eq!(err.error().unwrap().message, "x");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The future fulfilled with a value.
    Fulfilled(T),
    /// The future rejected with an error.
    Rejected(AsyncError),
}

impl<T> Outcome<T> {
    /// Returns true if this records a fulfillment.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Outcome::Fulfilled(_))
    }

    /// Returns true if this records a rejection.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    /// Returns the fulfillment value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Fulfilled(value) => Some(value),
            Outcome::Rejected(_) => None,
        }
    }

    /// Returns the rejection error, if any.
    pub fn error(&self) -> Option<&AsyncError> {
        match self {
            Outcome::Fulfilled(_) => None,
            Outcome::Rejected(error) => Some(error),
        }
    }
}
