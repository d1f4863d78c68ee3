//! Deferred results with settle-once semantics.
//!
//! A [`Future`] is a single-assignment, observe-many container for a value
//! that will be known later. Settlement never runs continuations inline:
//! every registered reaction is enqueued on the owning event loop's
//! microtask queue and fired from there, which is what makes callback
//! ordering observable and deterministic.

use core_types::AsyncError;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use crate::event_loop::EventLoop;
use crate::task_queue::MicroTask;

/// The state of a future.
///
/// Futures transition out of `Pending` exactly once. Once settled
/// (Fulfilled or Rejected), a future cannot change state; a second settle
/// attempt is silently ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum FutureState<T> {
    /// The initial state; neither fulfilled nor rejected.
    Pending,
    /// The future has been fulfilled with a value.
    Fulfilled(T),
    /// The future has been rejected with an error.
    Rejected(AsyncError),
}

/// What a continuation produced for the downstream future.
pub enum Resolution<T> {
    /// A plain value; the downstream future fulfills with it.
    Value(T),
    /// Another future; the downstream future adopts its settlement.
    Chained(Future<T>),
}

/// A continuation registered through [`Future::then`].
///
/// Wraps a boxed closure taking the settled input and producing either a
/// [`Resolution`] for the downstream future or an error that rejects it.
pub struct Handler<A, T> {
    callback: Box<dyn FnMut(A) -> Result<Resolution<T>, AsyncError> + Send>,
}

impl<A, T> Handler<A, T> {
    /// Creates a new Handler from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut(A) -> Result<Resolution<T>, AsyncError> + Send + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Calls the handler with the settled input.
    pub fn call(&mut self, input: A) -> Result<Resolution<T>, AsyncError> {
        (self.callback)(input)
    }
}

impl<A, T> fmt::Debug for Handler<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handler {{ ... }}")
    }
}

/// Handler invoked when the upstream future fulfills.
pub type FulfillHandler<T> = Handler<T, T>;
/// Handler invoked when the upstream future rejects.
pub type RejectHandler<T> = Handler<AsyncError, T>;

/// A reaction registered on a future, fired exactly once after settlement.
pub(crate) enum Reaction<T> {
    /// A `then` registration: optional handlers plus the downstream future
    /// they settle. An absent handler passes the settlement through.
    Chain {
        downstream: Future<T>,
        on_fulfilled: Option<FulfillHandler<T>>,
        on_rejected: Option<RejectHandler<T>>,
    },
    /// An internal settlement observer (adoption, coroutine resumption,
    /// combinator bookkeeping). Has no downstream of its own.
    Notify(Box<dyn FnOnce(Result<T, AsyncError>) + Send>),
}

struct FutureInner<T> {
    state: FutureState<T>,
    reactions: Vec<Reaction<T>>,
    /// Whether any reaction was ever registered. Rejected futures that stay
    /// unobserved by the end of a microtask drain get reported.
    handled: bool,
    /// The future this one is currently adopting from, if any. Used to
    /// detect chaining cycles.
    adopting: Option<Future<T>>,
}

/// A deferred result: a single-assignment container settled exactly once.
///
/// `Future` is a cheap-clone handle; all clones observe the same state.
/// Each future belongs to an [`EventLoop`], which is the sole authority for
/// when any registered continuation runs.
///
/// # Examples
///
/// ```
/// use async_runtime::{EventLoop, Future, FutureState};
///
/// let event_loop = EventLoop::new();
/// let future: Future<i32> = Future::new(&event_loop);
/// assert_eq!(future.state(), FutureState::Pending);
///
/// future.fulfill(42);
/// assert_eq!(future.state(), FutureState::Fulfilled(42));
/// ```
pub struct Future<T> {
    inner: Arc<Mutex<FutureInner<T>>>,
    event_loop: EventLoop,
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            event_loop: self.event_loop.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Future")
            .field("state", &inner.state)
            .field("reactions", &inner.reactions.len())
            .finish()
    }
}

impl<T: Clone + Send + 'static> Future<T> {
    /// Creates a new pending future owned by the given event loop.
    pub fn new(event_loop: &EventLoop) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FutureInner {
                state: FutureState::Pending,
                reactions: Vec::new(),
                handled: false,
                adopting: None,
            })),
            event_loop: event_loop.clone(),
        }
    }

    /// Creates a future already fulfilled with `value`.
    pub fn fulfilled(event_loop: &EventLoop, value: T) -> Self {
        let future = Self::new(event_loop);
        future.fulfill(value);
        future
    }

    /// Creates a future already rejected with `error`.
    pub fn rejected(event_loop: &EventLoop, error: AsyncError) -> Self {
        let future = Self::new(event_loop);
        future.reject(error);
        future
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> FutureState<T> {
        self.inner.lock().state.clone()
    }

    /// Checks if there are reactions waiting for settlement.
    pub fn has_pending_reactions(&self) -> bool {
        !self.inner.lock().reactions.is_empty()
    }

    /// Fulfills the future with a value.
    ///
    /// Every currently registered reaction's fire-job is enqueued on the
    /// microtask queue in registration order, then the reaction list is
    /// cleared. If the future is already settled, this is a no-op.
    pub fn fulfill(&self, value: T) {
        self.settle(Ok(value));
    }

    /// Rejects the future with an error.
    ///
    /// Same enqueue-in-order semantics as [`Future::fulfill`]. A rejection
    /// that no reaction ever observes is reported to the event loop at the
    /// end of the microtask drain in which it happened.
    pub fn reject(&self, error: AsyncError) {
        self.settle(Err(error));
    }

    /// Resolves this future with another future's eventual settlement.
    ///
    /// If `other` is already settled, this behaves like settling with its
    /// value or error. If `other` is pending, an internal reaction forwards
    /// its settlement here. Resolving a future with itself, directly or
    /// through a chain of adoptions, rejects with a chaining-cycle error
    /// instead of hanging.
    pub fn resolve_with(&self, other: Future<T>) {
        if !matches!(self.inner.lock().state, FutureState::Pending) {
            return;
        }

        // Walk the adoption chain starting at `other`; finding ourselves
        // means the chain can never settle.
        let mut cursor = other.clone();
        loop {
            if Arc::ptr_eq(&cursor.inner, &self.inner) {
                self.reject(AsyncError::chaining_cycle());
                return;
            }
            let next = cursor.inner.lock().adopting.clone();
            match next {
                Some(target) => cursor = target,
                None => break,
            }
        }

        match other.state() {
            FutureState::Fulfilled(value) => self.fulfill(value),
            FutureState::Rejected(error) => self.reject(error),
            FutureState::Pending => {
                self.inner.lock().adopting = Some(other.clone());
                let adopter = self.clone();
                other.when_settled(move |result| {
                    adopter.inner.lock().adopting = None;
                    match result {
                        Ok(value) => adopter.fulfill(value),
                        Err(error) => adopter.reject(error),
                    }
                });
            }
        }
    }

    /// Adds handlers for fulfillment and/or rejection.
    ///
    /// Returns the downstream future the handlers settle. If this future is
    /// already settled the fire-job is enqueued immediately; it is never run
    /// synchronously in the caller's stack. An absent handler forwards the
    /// settlement to the downstream future unchanged.
    pub fn then(
        &self,
        on_fulfilled: Option<FulfillHandler<T>>,
        on_rejected: Option<RejectHandler<T>>,
    ) -> Future<T> {
        let downstream = Future::new(&self.event_loop);
        self.register(Reaction::Chain {
            downstream: downstream.clone(),
            on_fulfilled,
            on_rejected,
        });
        downstream
    }

    /// Adds a rejection handler. Equivalent to `then(None, Some(handler))`.
    pub fn catch(&self, on_rejected: RejectHandler<T>) -> Future<T> {
        self.then(None, Some(on_rejected))
    }

    /// Runs `callback` once this future settles, either way, and passes the
    /// settlement through unchanged. If the callback itself fails, the
    /// downstream future rejects with that error instead.
    pub fn finally<F>(&self, callback: F) -> Future<T>
    where
        F: FnOnce() -> Result<(), AsyncError> + Send + 'static,
    {
        let downstream = Future::new(&self.event_loop);
        let target = downstream.clone();
        self.when_settled(move |result| match callback() {
            Ok(()) => match result {
                Ok(value) => target.fulfill(value),
                Err(error) => target.reject(error),
            },
            Err(error) => target.reject(error),
        });
        downstream
    }

    /// Registers an internal settlement observer.
    ///
    /// Observers count as handling the future for rejection-reporting
    /// purposes, and like every reaction they fire from the microtask queue.
    pub(crate) fn when_settled<F>(&self, callback: F)
    where
        F: FnOnce(Result<T, AsyncError>) + Send + 'static,
    {
        self.register(Reaction::Notify(Box::new(callback)));
    }

    fn register(&self, reaction: Reaction<T>) {
        let mut inner = self.inner.lock();
        inner.handled = true;
        let settled = match &inner.state {
            FutureState::Pending => None,
            FutureState::Fulfilled(value) => Some(Ok(value.clone())),
            FutureState::Rejected(error) => Some(Err(error.clone())),
        };
        match settled {
            None => inner.reactions.push(reaction),
            Some(result) => {
                drop(inner);
                self.enqueue_fire(reaction, result);
            }
        }
    }

    fn settle(&self, result: Result<T, AsyncError>) {
        let (reactions, unobserved_rejection) = {
            let mut inner = self.inner.lock();
            if !matches!(inner.state, FutureState::Pending) {
                return;
            }
            inner.state = match &result {
                Ok(value) => FutureState::Fulfilled(value.clone()),
                Err(error) => FutureState::Rejected(error.clone()),
            };
            let reactions = std::mem::take(&mut inner.reactions);
            (reactions, result.is_err() && !inner.handled)
        };

        for reaction in reactions {
            self.enqueue_fire(reaction, result.clone());
        }

        if unobserved_rejection {
            let probe = Arc::clone(&self.inner);
            self.event_loop.watch_rejection(Box::new(move || {
                let inner = probe.lock();
                if inner.handled {
                    return None;
                }
                match &inner.state {
                    FutureState::Rejected(error) => Some(error.clone()),
                    _ => None,
                }
            }));
        }
    }

    fn enqueue_fire(&self, reaction: Reaction<T>, result: Result<T, AsyncError>) {
        self.event_loop
            .enqueue_microtask(MicroTask::new(move || fire(reaction, result)));
    }
}

/// Fires one reaction with the settlement it was waiting for.
fn fire<T: Clone + Send + 'static>(reaction: Reaction<T>, result: Result<T, AsyncError>) {
    match reaction {
        Reaction::Notify(callback) => callback(result),
        Reaction::Chain {
            downstream,
            on_fulfilled,
            on_rejected,
        } => match result {
            Ok(value) => match on_fulfilled {
                Some(mut handler) => apply(downstream, handler.call(value)),
                None => downstream.fulfill(value),
            },
            Err(error) => match on_rejected {
                Some(mut handler) => apply(downstream, handler.call(error)),
                None => downstream.reject(error),
            },
        },
    }
}

/// Settles the downstream future with what a continuation produced. Handler
/// errors become downstream rejections; they never reach the scheduler's
/// own call frame.
fn apply<T: Clone + Send + 'static>(
    downstream: Future<T>,
    produced: Result<Resolution<T>, AsyncError>,
) {
    match produced {
        Ok(Resolution::Value(value)) => downstream.fulfill(value),
        Ok(Resolution::Chained(future)) => downstream.resolve_with(future),
        Err(error) => downstream.reject(error),
    }
}
