//! Unit tests for the combinators

use async_runtime::{all, all_settled, race, EventLoop, Future, FutureState, Outcome};
use core_types::AsyncError;

#[test]
fn all_fulfills_with_values_in_input_order() {
    let event_loop = EventLoop::new();
    let a = Future::new(&event_loop);
    let b = Future::new(&event_loop);
    let c = Future::new(&event_loop);
    let combined = all(&event_loop, vec![a.clone(), b.clone(), c.clone()]);

    c.fulfill(3);
    a.fulfill(1);
    b.fulfill(2);
    event_loop.run_until_idle();

    assert_eq!(combined.state(), FutureState::Fulfilled(vec![1, 2, 3]));
}

#[test]
fn all_stays_pending_until_every_input_settles() {
    let event_loop = EventLoop::new();
    let a = Future::fulfilled(&event_loop, 1);
    let b = Future::new(&event_loop);
    let combined = all(&event_loop, vec![a, b.clone()]);

    event_loop.run_until_idle();
    assert_eq!(combined.state(), FutureState::Pending);

    b.fulfill(2);
    event_loop.run_until_idle();
    assert_eq!(combined.state(), FutureState::Fulfilled(vec![1, 2]));
}

#[test]
fn all_rejects_with_first_rejection() {
    let event_loop = EventLoop::new();
    let combined = all(
        &event_loop,
        vec![
            Future::fulfilled(&event_loop, 1),
            Future::rejected(&event_loop, AsyncError::failure("x")),
            Future::fulfilled(&event_loop, 3),
        ],
    );

    event_loop.run_until_idle();
    assert_eq!(
        combined.state(),
        FutureState::Rejected(AsyncError::failure("x"))
    );
}

#[test]
fn all_of_nothing_fulfills_immediately() {
    let event_loop = EventLoop::new();
    let combined: Future<Vec<i32>> = all(&event_loop, vec![]);
    assert_eq!(combined.state(), FutureState::Fulfilled(vec![]));
}

#[test]
fn race_settles_with_first_winner() {
    let event_loop = EventLoop::new();
    let slow = Future::new(&event_loop);
    let fast = Future::new(&event_loop);
    let combined = race(&event_loop, vec![slow.clone(), fast.clone()]);

    fast.reject(AsyncError::failure("fast loser"));
    event_loop.run_until_idle();
    slow.fulfill(1);
    event_loop.run_until_idle();

    assert_eq!(
        combined.state(),
        FutureState::Rejected(AsyncError::failure("fast loser"))
    );
}

#[test]
fn race_ties_break_by_insertion_order() {
    let event_loop = EventLoop::new();
    let combined = race(
        &event_loop,
        vec![
            Future::fulfilled(&event_loop, 1),
            Future::fulfilled(&event_loop, 2),
        ],
    );

    event_loop.run_until_idle();
    assert_eq!(combined.state(), FutureState::Fulfilled(1));
}

#[test]
fn all_settled_always_fulfills() {
    let event_loop = EventLoop::new();
    let combined = all_settled(
        &event_loop,
        vec![
            Future::fulfilled(&event_loop, 1),
            Future::rejected(&event_loop, AsyncError::failure("x")),
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
fn all_settled_waits_for_late_inputs() {
    let event_loop = EventLoop::new();
    let late: Future<i32> = Future::new(&event_loop);
    let combined = all_settled(
        &event_loop,
        vec![Future::fulfilled(&event_loop, 1), late.clone()],
    );

    event_loop.run_until_idle();
    assert_eq!(combined.state(), FutureState::Pending);

    late.reject(AsyncError::failure("slow"));
    event_loop.run_until_idle();
    assert_eq!(
        combined.state(),
        FutureState::Fulfilled(vec![
            Outcome::Fulfilled(1),
            Outcome::Rejected(AsyncError::failure("slow")),
        ])
    );
}

#[test]
fn combinator_inputs_do_not_report_unhandled_rejections() {
    let event_loop = EventLoop::new();
    let rejected: Future<i32> = Future::rejected(&event_loop, AsyncError::failure("x"));
    let combined = all(&event_loop, vec![rejected]);

    // `all` observes the input; only the combined future could be unhandled.
    combined.catch(async_runtime::Handler::new(|_| {
        Ok(async_runtime::Resolution::Value(vec![]))
    }));
    event_loop.run_until_idle();
    assert!(event_loop.take_unhandled_rejections().is_empty());
}
