//! Deterministic async core: futures, scheduler, coroutines, combinators.
//!
//! This crate provides the asynchronous execution model as a standalone
//! component:
//! - [`EventLoop`] - Two-tier scheduler with a virtual clock
//! - [`Future`] - Settle-once deferred result with reaction chaining
//! - [`Coroutine`] / [`spawn`] - Suspendable computations driven by
//!   settlement notifications
//! - [`all`], [`race`], [`all_settled`] - Combinators over future groups
//!
//! # Overview
//!
//! User code creates futures and attaches reactions; the event loop is the
//! sole authority for when any reaction body runs. Reactions fire from the
//! microtask queue, which is drained to empty before each task, so the same
//! sequence of external inputs always produces the same interleaving.
//!
//! # Examples
//!
//! ## Chaining
//!
//! ```
//! use async_runtime::{EventLoop, Future, FutureState, Handler, Resolution};
//!
//! let event_loop = EventLoop::new();
//! let future = Future::new(&event_loop);
//!
//! let doubled = future.then(
//!     Some(Handler::new(|v: i32| Ok(Resolution::Value(v * 2)))),
//!     None,
//! );
//!
//! future.fulfill(21);
//! event_loop.run_until_idle();
//! assert_eq!(doubled.state(), FutureState::Fulfilled(42));
//! ```
//!
//! ## Timers
//!
//! ```
//! use async_runtime::{EventLoop, Future, FutureState, Task};
//!
//! let event_loop = EventLoop::new();
//! let future: Future<&str> = Future::new(&event_loop);
//!
//! let settled = future.clone();
//! event_loop.set_timeout(Task::new(move || settled.fulfill("done")), 100);
//!
//! event_loop.run_until_idle();
//! assert_eq!(future.state(), FutureState::Fulfilled("done"));
//! assert_eq!(event_loop.now(), 100);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod combinators;
pub mod coroutine;
pub mod event_loop;
pub mod future;
pub mod task_queue;

// Re-export main types at crate root
pub use combinators::{all, all_settled, race};
pub use core_types::{AsyncError, ErrorKind, Outcome};
pub use coroutine::{spawn, Coroutine, CoroutineStep, Resume};
pub use event_loop::EventLoop;
pub use future::{FulfillHandler, Future, FutureState, Handler, RejectHandler, Resolution};
pub use task_queue::{MicroTask, MicrotaskQueue, Task, TaskQueue, TimerId};
