//! Coroutine driver: suspendable computations over futures.
//!
//! A coroutine is an explicit resumable state machine: a step function
//! that, given a resume input, runs until it yields a future to wait on or
//! completes. The driver never runs computation between steps; it only
//! subscribes to the yielded future and waits. Because subscriptions fire
//! from the microtask queue, the coroutine's call stack is fully popped
//! between suspension and resumption, and its stack depth stays bounded no
//! matter how many times it suspends.

use core_types::AsyncError;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use crate::event_loop::EventLoop;
use crate::future::Future;

/// The input a coroutine step is resumed with.
#[derive(Debug, Clone)]
pub enum Resume<T> {
    /// First step; no value has been awaited yet.
    Start,
    /// The awaited future fulfilled with this value.
    Value(T),
    /// The awaited future rejected; the step observes this as a raised
    /// error at its suspension point.
    Failure(AsyncError),
}

/// What one coroutine step produced.
pub enum CoroutineStep<T> {
    /// Suspend until this future settles.
    Yield(Future<T>),
    /// The coroutine completed with a final value.
    Done(T),
    /// The coroutine completed by propagating an error.
    Failed(AsyncError),
}

impl<T: fmt::Debug> fmt::Debug for CoroutineStep<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoroutineStep::Yield(_) => write!(f, "Yield(..)"),
            CoroutineStep::Done(value) => f.debug_tuple("Done").field(value).finish(),
            CoroutineStep::Failed(error) => f.debug_tuple("Failed").field(error).finish(),
        }
    }
}

/// A suspendable computation, created suspended at its first statement.
pub struct Coroutine<T> {
    step: Box<dyn FnMut(Resume<T>) -> CoroutineStep<T> + Send>,
}

impl<T> Coroutine<T> {
    /// Creates a coroutine from its step function.
    pub fn new<F>(step: F) -> Self
    where
        F: FnMut(Resume<T>) -> CoroutineStep<T> + Send + 'static,
    {
        Self {
            step: Box::new(step),
        }
    }

    fn step(&mut self, resume: Resume<T>) -> CoroutineStep<T> {
        (self.step)(resume)
    }
}

impl<T> fmt::Debug for Coroutine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coroutine {{ ... }}")
    }
}

/// Driver bookkeeping for one coroutine instance.
///
/// The coroutine is taken out of the slot for the duration of a step, which
/// enforces at most one in-flight step per instance.
struct DriverState<T> {
    coroutine: Option<Coroutine<T>>,
    result: Future<T>,
}

/// Starts driving a coroutine and returns its result future immediately.
///
/// The first step runs inline, the way a direct-style async body executes
/// until its first suspension. Every later resumption is triggered by a
/// fired reaction, never by a recursive call.
///
/// # Examples
///
/// ```
/// use async_runtime::{spawn, Coroutine, CoroutineStep, EventLoop, FutureState, Resume};
///
/// let event_loop = EventLoop::new();
/// let coroutine = Coroutine::new(|_resume| CoroutineStep::Done(7));
/// let result = spawn(&event_loop, coroutine);
///
/// assert_eq!(result.state(), FutureState::Fulfilled(7));
/// ```
pub fn spawn<T: Clone + Send + 'static>(
    event_loop: &EventLoop,
    coroutine: Coroutine<T>,
) -> Future<T> {
    let result = Future::new(event_loop);
    let state = Arc::new(Mutex::new(DriverState {
        coroutine: Some(coroutine),
        result: result.clone(),
    }));
    advance(&state, Resume::Start);
    result
}

fn advance<T: Clone + Send + 'static>(state: &Arc<Mutex<DriverState<T>>>, resume: Resume<T>) {
    let mut coroutine = {
        let mut driver = state.lock();
        match driver.coroutine.take() {
            Some(coroutine) => coroutine,
            // Already completed, or a step is in flight.
            None => return,
        }
    };

    match coroutine.step(resume) {
        CoroutineStep::Yield(future) => {
            state.lock().coroutine = Some(coroutine);
            let waiting = Arc::clone(state);
            future.when_settled(move |settled| match settled {
                Ok(value) => advance(&waiting, Resume::Value(value)),
                Err(error) => advance(&waiting, Resume::Failure(error)),
            });
        }
        CoroutineStep::Done(value) => {
            let result = state.lock().result.clone();
            result.fulfill(value);
        }
        CoroutineStep::Failed(error) => {
            let result = state.lock().result.clone();
            result.reject(error);
        }
    }
}
