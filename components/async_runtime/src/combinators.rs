//! Combinators over groups of futures.
//!
//! Built purely on settlement observers; none of these run user code
//! themselves or cancel anything. Inputs that settle after the combined
//! future has already settled are observed and discarded.

use core_types::Outcome;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::event_loop::EventLoop;
use crate::future::Future;

struct GatherState<T> {
    slots: Vec<Option<T>>,
    remaining: usize,
}

/// Returns a future of every input's value, in input order.
///
/// Fulfills once every input fulfills; rejects with the first rejection.
/// Later settlements of the remaining inputs are ignored, not cancelled.
/// An empty input fulfills with an empty vector.
///
/// # Examples
///
/// ```
/// use async_runtime::{all, EventLoop, Future, FutureState};
///
/// let event_loop = EventLoop::new();
/// let a = Future::fulfilled(&event_loop, 1);
/// let b = Future::fulfilled(&event_loop, 2);
///
/// let combined = all(&event_loop, vec![a, b]);
/// event_loop.run_until_idle();
/// assert_eq!(combined.state(), FutureState::Fulfilled(vec![1, 2]));
/// ```
pub fn all<T: Clone + Send + 'static>(
    event_loop: &EventLoop,
    inputs: Vec<Future<T>>,
) -> Future<Vec<T>> {
    let combined = Future::new(event_loop);
    if inputs.is_empty() {
        combined.fulfill(Vec::new());
        return combined;
    }

    let state = Arc::new(Mutex::new(GatherState {
        slots: vec![None; inputs.len()],
        remaining: inputs.len(),
    }));

    for (index, input) in inputs.into_iter().enumerate() {
        let combined = combined.clone();
        let state = Arc::clone(&state);
        input.when_settled(move |settled| match settled {
            Ok(value) => {
                let finished = {
                    let mut state = state.lock();
                    state.slots[index] = Some(value);
                    state.remaining -= 1;
                    state.remaining == 0
                };
                if finished {
                    let values = state.lock().slots.drain(..).flatten().collect();
                    combined.fulfill(values);
                }
            }
            Err(error) => combined.reject(error),
        });
    }

    combined
}

/// Returns a future settling with whichever input settles first.
///
/// Settle-once plus FIFO reaction firing makes insertion order the
/// tie-break when several inputs settle within the same drain. An empty
/// input never settles.
pub fn race<T: Clone + Send + 'static>(event_loop: &EventLoop, inputs: Vec<Future<T>>) -> Future<T> {
    let combined = Future::new(event_loop);
    for input in inputs {
        let combined = combined.clone();
        input.when_settled(move |settled| match settled {
            Ok(value) => combined.fulfill(value),
            Err(error) => combined.reject(error),
        });
    }
    combined
}

/// Returns a future of one [`Outcome`] per input, in input order.
///
/// Always fulfills, once every input has settled either way.
///
/// # Examples
///
/// ```
/// use async_runtime::{all_settled, EventLoop, Future, FutureState, Outcome};
/// use core_types::AsyncError;
///
/// let event_loop = EventLoop::new();
/// let ok = Future::fulfilled(&event_loop, 1);
/// let err = Future::rejected(&event_loop, AsyncError::failure("x"));
///
/// let combined = all_settled(&event_loop, vec![ok, err]);
/// event_loop.run_until_idle();
/// assert_eq!(
///     combined.state(),
///     FutureState::Fulfilled(vec![
///         Outcome::Fulfilled(1),
///         Outcome::Rejected(AsyncError::failure("x")),
///     ])
/// );
/// ```
pub fn all_settled<T: Clone + Send + 'static>(
    event_loop: &EventLoop,
    inputs: Vec<Future<T>>,
) -> Future<Vec<Outcome<T>>> {
    let combined = Future::new(event_loop);
    if inputs.is_empty() {
        combined.fulfill(Vec::new());
        return combined;
    }

    let state = Arc::new(Mutex::new(GatherState {
        slots: vec![None; inputs.len()],
        remaining: inputs.len(),
    }));

    for (index, input) in inputs.into_iter().enumerate() {
        let combined = combined.clone();
        let state = Arc::clone(&state);
        input.when_settled(move |settled| {
            let outcome = match settled {
                Ok(value) => Outcome::Fulfilled(value),
                Err(error) => Outcome::Rejected(error),
            };
            let finished = {
                let mut state = state.lock();
                state.slots[index] = Some(outcome);
                state.remaining -= 1;
                state.remaining == 0
            };
            if finished {
                let outcomes = state.lock().slots.drain(..).flatten().collect();
                combined.fulfill(outcomes);
            }
        });
    }

    combined
}
