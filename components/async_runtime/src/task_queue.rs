//! Task and microtask queue management.
//!
//! This module provides the two job queues used by the event loop. Tasks
//! are executed one at a time in deadline order, with all microtasks
//! draining after each task.

use std::collections::VecDeque;
use std::fmt;

/// Identity of a scheduled task, usable to cancel it before it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// A task (macrotask) to be executed by the event loop.
///
/// Tasks represent external or timed events: timer callbacks, I/O
/// completions, host events. At most one task runs per event loop tick.
pub struct Task {
    callback: Box<dyn FnOnce() + Send>,
}

impl Task {
    /// Creates a new Task from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Executes the task.
    pub fn run(self) {
        (self.callback)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task {{ ... }}")
    }
}

/// A microtask to be executed by the event loop.
///
/// Microtasks represent fired future reactions. They are drained eagerly
/// and exhaustively after each task, and once enqueued they cannot be
/// cancelled: a reaction whose future has settled is committed.
pub struct MicroTask {
    callback: Box<dyn FnOnce() + Send>,
}

impl MicroTask {
    /// Creates a new MicroTask from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Executes the microtask.
    pub fn run(self) {
        (self.callback)()
    }
}

impl fmt::Debug for MicroTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MicroTask {{ ... }}")
    }
}

/// A task waiting in the queue, keyed by `(deadline, seq)`.
#[derive(Debug)]
struct ScheduledTask {
    id: TimerId,
    deadline: u64,
    /// Insertion sequence, the tie-break for equal deadlines.
    seq: u64,
    task: Task,
}

/// A queue for tasks, ordered by deadline with insertion order as tie-break.
#[derive(Debug, Default)]
pub struct TaskQueue {
    entries: Vec<ScheduledTask>,
    next_seq: u64,
}

impl TaskQueue {
    /// Creates a new empty TaskQueue.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    /// Adds a task with the given identity and deadline.
    pub fn schedule(&mut self, id: TimerId, deadline: u64, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(ScheduledTask {
            id,
            deadline,
            seq,
            task,
        });
    }

    /// Removes and returns the task with the earliest `(deadline, seq)` key.
    pub fn pop_next(&mut self) -> Option<(TimerId, u64, Task)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(_, entry)| (entry.deadline, entry.seq))
            .map(|(index, _)| index)?;
        let entry = self.entries.remove(index);
        Some((entry.id, entry.deadline, entry.task))
    }

    /// Removes the task with the given identity before it runs.
    ///
    /// Returns true if the task was still queued.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of tasks in the queue.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A FIFO queue for microtasks.
#[derive(Debug, Default)]
pub struct MicrotaskQueue {
    queue: VecDeque<MicroTask>,
}

impl MicrotaskQueue {
    /// Creates a new empty MicrotaskQueue.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Adds a microtask to the end of the queue.
    pub fn enqueue(&mut self, microtask: MicroTask) {
        self.queue.push_back(microtask);
    }

    /// Removes and returns the next microtask from the queue.
    pub fn dequeue(&mut self) -> Option<MicroTask> {
        self.queue.pop_front()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of microtasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
