//! Core types for the async runtime.
//!
//! This crate provides the foundational types shared by every component of
//! the async core: the closed error taxonomy and the settlement outcome
//! record.
//!
//! # Overview
//!
//! - [`AsyncError`] - Errors carried by rejected futures
//! - [`ErrorKind`] - The closed set of error classes
//! - [`Outcome`] - How a single future settled (used by `all_settled`)
//!
//! # Examples
//!
//! ```
//! use core_types::{AsyncError, ErrorKind, Outcome};
//!
//! let error = AsyncError::failure("connection reset");
//! assert_eq!(error.kind, ErrorKind::Failure);
//!
//! let outcome: Outcome<i32> = Outcome::Fulfilled(42);
//! assert!(outcome.is_fulfilled());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod outcome;

pub use error::{AsyncError, ErrorKind};
pub use outcome::Outcome;
