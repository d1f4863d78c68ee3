//! End-to-end async execution tests
//!
//! Drives full scenarios across the future, scheduler, coroutine, and
//! combinator layers:
//! - Promise-style chaining resolved by timers
//! - Coroutines awaiting futures settled from macrotasks
//! - Combinators over mixed immediate/deferred inputs
//! - Unhandled-rejection diagnostics

use async_runtime::{
    all, all_settled, spawn, Coroutine, CoroutineStep, EventLoop, Future, FutureState, Handler,
    Outcome, Resolution, Resume, Task,
};
use core_types::AsyncError;
use parking_lot::Mutex;
use std::sync::Arc;

/// Creates a future settled by a timer after `delay_ms`, standing in for a
/// host I/O completion.
fn deferred_ok(event_loop: &EventLoop, value: i32, delay_ms: u64) -> Future<i32> {
    let future = Future::new(event_loop);
    let settled = future.clone();
    event_loop.set_timeout(Task::new(move || settled.fulfill(value)), delay_ms);
    future
}

fn deferred_err(event_loop: &EventLoop, message: &str, delay_ms: u64) -> Future<i32> {
    let future = Future::new(event_loop);
    let settled = future.clone();
    let message = message.to_string();
    event_loop.set_timeout(
        Task::new(move || settled.reject(AsyncError::failure(message))),
        delay_ms,
    );
    future
}

#[test]
fn chained_continuations_run_across_timer_ticks() {
    let event_loop = EventLoop::new();
    let log = Arc::new(Mutex::new(vec![]));

    let source = deferred_ok(&event_loop, 1, 10);
    let l = log.clone();
    let tail = source
        .then(
            Some(Handler::new(move |v: i32| {
                l.lock().push(v);
                Ok(Resolution::Value(v + 1))
            })),
            None,
        )
        .then(
            Some(Handler::new(|v: i32| Ok(Resolution::Value(v * 10)))),
            None,
        );

    event_loop.run_until_idle();
    assert_eq!(*log.lock(), vec![1]);
    assert_eq!(tail.state(), FutureState::Fulfilled(20));
}

#[test]
fn continuation_returning_deferred_future_extends_the_chain() {
    let event_loop = EventLoop::new();

    let first = deferred_ok(&event_loop, 5, 10);
    let chain_loop = event_loop.clone();
    let tail = first.then(
        Some(Handler::new(move |v: i32| {
            Ok(Resolution::Chained(deferred_ok(&chain_loop, v * 2, 10)))
        })),
        None,
    );

    event_loop.run_until_idle();
    assert_eq!(tail.state(), FutureState::Fulfilled(10));
    assert_eq!(event_loop.now(), 20);
}

#[test]
fn coroutine_awaits_two_macrotasks_in_program_order() {
    let event_loop = EventLoop::new();
    let first = deferred_ok(&event_loop, 10, 10);
    let second = deferred_ok(&event_loop, 20, 30);
    let seen = Arc::new(Mutex::new(vec![]));

    let f = first.clone();
    let s = second.clone();
    let log = seen.clone();
    let result = spawn(
        &event_loop,
        Coroutine::new(move |resume| match resume {
            Resume::Start => CoroutineStep::Yield(f.clone()),
            Resume::Value(v) => {
                log.lock().push(v);
                if log.lock().len() == 1 {
                    CoroutineStep::Yield(s.clone())
                } else {
                    let total = log.lock().iter().sum();
                    CoroutineStep::Done(total)
                }
            }
            Resume::Failure(e) => CoroutineStep::Failed(e),
        }),
    );

    // Nothing has resolved before the first timer fires.
    event_loop.run_once();
    assert_eq!(*seen.lock(), vec![10]);
    assert_eq!(result.state(), FutureState::Pending);

    event_loop.run_until_idle();
    assert_eq!(*seen.lock(), vec![10, 20]);
    assert_eq!(result.state(), FutureState::Fulfilled(30));
}

#[test]
fn coroutine_recovers_from_rejected_await_with_fallback() {
    let event_loop = EventLoop::new();
    let failing = deferred_err(&event_loop, "fetch failed", 10);
    let fallback = deferred_ok(&event_loop, -1, 20);

    let f = failing.clone();
    let alt = fallback.clone();
    let result = spawn(
        &event_loop,
        Coroutine::new(move |resume| match resume {
            Resume::Start => CoroutineStep::Yield(f.clone()),
            Resume::Value(v) => CoroutineStep::Done(v),
            Resume::Failure(_) => CoroutineStep::Yield(alt.clone()),
        }),
    );

    event_loop.run_until_idle();
    assert_eq!(result.state(), FutureState::Fulfilled(-1));
    assert!(event_loop.take_unhandled_rejections().is_empty());
}

#[test]
fn all_over_immediate_and_deferred_inputs() {
    let event_loop = EventLoop::new();
    let combined = all(
        &event_loop,
        vec![
            Future::fulfilled(&event_loop, 1),
            deferred_ok(&event_loop, 2, 15),
            deferred_ok(&event_loop, 3, 5),
        ],
    );

    event_loop.run_until_idle();
    assert_eq!(combined.state(), FutureState::Fulfilled(vec![1, 2, 3]));
}

#[test]
fn all_rejection_wins_while_stragglers_keep_running() {
    let event_loop = EventLoop::new();
    let straggler_ran = Arc::new(Mutex::new(false));

    let straggler = Future::new(&event_loop);
    let settled = straggler.clone();
    let ran = straggler_ran.clone();
    event_loop.set_timeout(
        Task::new(move || {
            *ran.lock() = true;
            settled.fulfill(3);
        }),
        50,
    );

    let combined = all(
        &event_loop,
        vec![
            Future::fulfilled(&event_loop, 1),
            deferred_err(&event_loop, "x", 10),
            straggler,
        ],
    );

    event_loop.run_until_idle();
    assert_eq!(
        combined.state(),
        FutureState::Rejected(AsyncError::failure("x"))
    );
    // The straggler still ran to completion; its result was discarded.
    assert!(*straggler_ran.lock());
}

#[test]
fn all_settled_reports_every_outcome() {
    let event_loop = EventLoop::new();
    let combined = all_settled(
        &event_loop,
        vec![
            deferred_ok(&event_loop, 1, 10),
            deferred_err(&event_loop, "x", 5),
        ],
    );

    event_loop.run_until_idle();
    assert_eq!(
        combined.state(),
        FutureState::Fulfilled(vec![
            Outcome::Fulfilled(1),
            Outcome::Rejected(AsyncError::failure("x")),
        ])
    );
}

#[test]
fn dropped_rejection_is_reported_but_does_not_stop_the_loop() {
    let event_loop = EventLoop::new();
    let order = Arc::new(Mutex::new(vec![]));

    let _ignored = deferred_err(&event_loop, "nobody listens", 10);
    let o = order.clone();
    event_loop.set_timeout(Task::new(move || o.lock().push("later work")), 20);

    event_loop.run_until_idle();
    assert_eq!(*order.lock(), vec!["later work"]);
    assert_eq!(
        event_loop.take_unhandled_rejections(),
        vec![AsyncError::failure("nobody listens")]
    );
}
