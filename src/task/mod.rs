//! Deferred task scheduling.
//!
//! Promise reactions never run on the stack that registered them or that
//! settled their promise. Instead each reaction is wrapped in a [`Task`] and
//! handed to the thread's current [`Scheduler`], which plays the role of the
//! host's task queue.
//!
//! By default every thread owns a [`TaskQueue`] that the host drains with
//! [`run_until_idle`] or [`run_once`]. A different scheduler can be installed
//! for the current thread with [`install`]; with the `async` feature,
//! [`LocalSetScheduler`] hands tasks to a tokio `LocalSet` instead.
//!
//! # Examples
//!
//! ```rust
//! use aplus::promise::Promise;
//! use aplus::task;
//! use aplus::value::Value;
//!
//! let promise = Promise::resolved(1).map(|value| Ok(value));
//! assert!(promise.is_pending());
//!
//! task::run_until_idle();
//! assert_eq!(promise.value(), Some(Value::from(1)));
//! ```

#[cfg(feature = "async")]
mod local_set;
mod queue;

#[cfg(feature = "async")]
pub use local_set::LocalSetScheduler;
pub use queue::TaskQueue;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A unit of deferred work.
pub struct Task {
    job: Box<dyn FnOnce()>,
}

impl Task {
    /// Wraps a closure.
    pub fn new<F>(job: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self { job: Box::new(job) }
    }

    /// Consumes the task and runs it.
    pub fn run(self) {
        (self.job)();
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("Task")
    }
}

/// A host task queue that runs [`Task`]s at some later point.
///
/// Implementations must never run a task synchronously inside
/// [`schedule`](Scheduler::schedule), and must run the tasks they receive
/// in the order they were scheduled.
pub trait Scheduler {
    /// Enqueues a task.
    fn schedule(&self, task: Task);
}

thread_local! {
    static DEFAULT_QUEUE: Rc<TaskQueue> = Rc::new(TaskQueue::new());
    static INSTALLED: RefCell<Option<Rc<dyn Scheduler>>> = const { RefCell::new(None) };
}

/// Hands a task to the current thread's scheduler.
pub fn schedule(task: Task) {
    let installed = INSTALLED.with(|installed| installed.borrow().clone());
    match installed {
        Some(scheduler) => scheduler.schedule(task),
        None => DEFAULT_QUEUE.with(|queue| queue.schedule(task)),
    }
}

/// Runs the thread's default queue until it is empty and returns how many
/// tasks ran.
///
/// Tasks sent to an installed scheduler are not affected.
pub fn run_until_idle() -> usize {
    default_queue().run_until_idle()
}

/// Runs the oldest task of the thread's default queue, if any.
pub fn run_once() -> bool {
    default_queue().run_once()
}

/// Number of tasks waiting in the thread's default queue.
#[must_use]
pub fn pending() -> usize {
    DEFAULT_QUEUE.with(|queue| queue.len())
}

fn default_queue() -> Rc<TaskQueue> {
    DEFAULT_QUEUE.with(Rc::clone)
}

/// Makes `scheduler` the current thread's scheduler until the returned
/// guard is dropped.
///
/// Guards nest: dropping one restores whichever scheduler was current when
/// it was created.
///
/// # Examples
///
/// ```rust
/// use aplus::promise::Promise;
/// use aplus::task::{self, TaskQueue};
/// use std::rc::Rc;
///
/// let queue = Rc::new(TaskQueue::new());
/// let guard = task::install(queue.clone());
///
/// let promise = Promise::resolved(1).map(Ok);
/// assert_eq!(queue.len(), 1);
/// assert_eq!(task::pending(), 0);
///
/// queue.run_until_idle();
/// assert!(promise.is_fulfilled());
/// drop(guard);
/// ```
#[must_use = "the scheduler is uninstalled as soon as the guard is dropped"]
pub fn install(scheduler: Rc<dyn Scheduler>) -> SchedulerGuard {
    let previous = INSTALLED.with(|installed| installed.borrow_mut().replace(scheduler));
    SchedulerGuard { previous }
}

/// Restores the previous scheduler when dropped. Returned by [`install`].
pub struct SchedulerGuard {
    previous: Option<Rc<dyn Scheduler>>,
}

impl Drop for SchedulerGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        INSTALLED.with(|installed| *installed.borrow_mut() = previous);
    }
}

impl fmt::Debug for SchedulerGuard {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SchedulerGuard")
            .field("restores_default", &self.previous.is_none())
            .finish()
    }
}
