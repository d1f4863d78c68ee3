//! Event loop implementation.
//!
//! This module provides the scheduler that coordinates task and microtask
//! execution. Each turn of the loop drains the microtask queue to empty,
//! runs the task with the earliest deadline, then drains again; draining
//! extends to microtasks enqueued while the drain is in progress.
//!
//! Time is virtual: the loop owns a millisecond clock that advances to the
//! deadline of each task it runs, so a fixed sequence of inputs always
//! produces the same interleaving. A real-time host binding sits outside
//! the core and only needs [`EventLoop::set_timeout`] and the settle
//! methods on futures.

use core_types::AsyncError;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use crate::task_queue::{MicroTask, MicrotaskQueue, Task, TaskQueue, TimerId};

/// Checks one rejected future at the end of a drain; returns the error if it
/// is still unobserved.
pub(crate) type RejectionProbe = Box<dyn FnOnce() -> Option<AsyncError> + Send>;

#[derive(Default)]
struct EventLoopState {
    microtasks: MicrotaskQueue,
    tasks: TaskQueue,
    now: u64,
    next_timer: u64,
    rejection_probes: Vec<RejectionProbe>,
    unhandled: Vec<AsyncError>,
}

/// The scheduler: two ordered job queues and the drain algorithm.
///
/// `EventLoop` is a cheap-clone handle; futures keep one so that settlement
/// can enqueue reaction fire-jobs. Multiple independent loops can coexist,
/// which keeps tests hermetic. A single-threaded host drives the loop
/// directly; a multi-threaded host can share the handle across threads, the
/// internal lock serializes queue access without changing drain order.
///
/// # Examples
///
/// ```
/// use async_runtime::{EventLoop, Task};
///
/// let event_loop = EventLoop::new();
/// event_loop.enqueue_task(Task::new(|| {}));
/// event_loop.run_until_idle();
/// assert!(event_loop.is_task_queue_empty());
/// ```
#[derive(Clone)]
pub struct EventLoop {
    state: Arc<Mutex<EventLoopState>>,
}

impl EventLoop {
    /// Creates a new EventLoop with empty queues and the clock at zero.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(EventLoopState::default())),
        }
    }

    /// Returns the current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.state.lock().now
    }

    /// Adds a microtask to the back of the microtask queue.
    pub fn enqueue_microtask(&self, microtask: MicroTask) {
        self.state.lock().microtasks.enqueue(microtask);
    }

    /// Adds a task due immediately (delay zero).
    pub fn enqueue_task(&self, task: Task) {
        self.set_timeout(task, 0);
    }

    /// Schedules a task to run `delay_ms` after the current virtual time.
    ///
    /// Returns a handle that cancels the task if it has not run yet. This is
    /// the shape host timer APIs bind to.
    pub fn set_timeout(&self, task: Task, delay_ms: u64) -> TimerId {
        let mut state = self.state.lock();
        let id = TimerId(state.next_timer);
        state.next_timer += 1;
        let deadline = state.now + delay_ms;
        state.tasks.schedule(id, deadline, task);
        id
    }

    /// Cancels a scheduled task before it runs.
    ///
    /// Returns true if the task was still queued. Microtasks cannot be
    /// cancelled.
    pub fn cancel_timeout(&self, id: TimerId) -> bool {
        self.state.lock().tasks.cancel(id)
    }

    /// Returns true if the task queue is empty.
    pub fn is_task_queue_empty(&self) -> bool {
        self.state.lock().tasks.is_empty()
    }

    /// Returns true if the microtask queue is empty.
    pub fn is_microtask_queue_empty(&self) -> bool {
        self.state.lock().microtasks.is_empty()
    }

    /// Returns true if both queues are empty.
    pub fn is_idle(&self) -> bool {
        let state = self.state.lock();
        state.microtasks.is_empty() && state.tasks.is_empty()
    }

    /// Drains the microtask queue completely.
    ///
    /// Microtasks enqueued while the drain is in progress run before this
    /// method returns. The drain ends with an unhandled-rejection sweep.
    /// Returns true if any microtask ran.
    pub fn run_all_microtasks(&self) -> bool {
        let mut ran = false;
        loop {
            let microtask = self.state.lock().microtasks.dequeue();
            match microtask {
                Some(microtask) => {
                    microtask.run();
                    ran = true;
                }
                None => break,
            }
        }
        self.sweep_rejections();
        ran
    }

    /// Processes one turn: drain microtasks, run the earliest task, drain
    /// microtasks again.
    ///
    /// Running a task advances the virtual clock to its deadline. Returns
    /// true if any job ran.
    pub fn run_once(&self) -> bool {
        let mut ran = self.run_all_microtasks();

        let next = {
            let mut state = self.state.lock();
            let popped = state.tasks.pop_next();
            if let Some((_, deadline, _)) = &popped {
                state.now = state.now.max(*deadline);
            }
            popped
        };

        if let Some((_, _, task)) = next {
            task.run();
            ran = true;
            self.run_all_microtasks();
        }

        ran
    }

    /// Repeats [`EventLoop::run_once`] until both queues are empty.
    pub fn run_until_idle(&self) {
        while self.run_once() {}
    }

    /// Returns every unhandled rejection reported so far, clearing the list.
    ///
    /// A rejection is unhandled when the future was still rejected with no
    /// reaction ever registered at the end of the microtask drain in which
    /// it was last touched. Reports are diagnostics; they never abort the
    /// loop.
    pub fn take_unhandled_rejections(&self) -> Vec<AsyncError> {
        std::mem::take(&mut self.state.lock().unhandled)
    }

    /// Registers a probe to be checked at the end of the current drain.
    pub(crate) fn watch_rejection(&self, probe: RejectionProbe) {
        self.state.lock().rejection_probes.push(probe);
    }

    fn sweep_rejections(&self) {
        let probes = std::mem::take(&mut self.state.lock().rejection_probes);
        if probes.is_empty() {
            return;
        }
        let reports: Vec<AsyncError> = probes.into_iter().filter_map(|probe| probe()).collect();
        if !reports.is_empty() {
            self.state.lock().unhandled.extend(reports);
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("EventLoop")
            .field("now", &state.now)
            .field("tasks", &state.tasks.len())
            .field("microtasks", &state.microtasks.len())
            .finish()
    }
}
