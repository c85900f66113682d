//! The default host task queue.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;

use super::{Scheduler, Task};

/// A FIFO queue of deferred tasks, drained explicitly by its owner.
///
/// Every thread has one of these as its default scheduler (see
/// [`run_until_idle`](super::run_until_idle)). Standalone instances can be
/// installed with [`install`](super::install) to isolate a group of
/// promises.
///
/// # Examples
///
/// ```rust
/// use aplus::task::{Scheduler, Task, TaskQueue};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let queue = TaskQueue::new();
/// let ran = Rc::new(Cell::new(false));
/// let flag = Rc::clone(&ran);
/// queue.schedule(Task::new(move || flag.set(true)));
///
/// assert!(!ran.get());
/// assert_eq!(queue.run_until_idle(), 1);
/// assert!(ran.get());
/// ```
#[derive(Default)]
pub struct TaskQueue {
    tasks: RefCell<VecDeque<Task>>,
}

impl TaskQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the oldest task, if any. Returns `false` when the queue was
    /// empty.
    pub fn run_once(&self) -> bool {
        let next = self.tasks.borrow_mut().pop_front();
        match next {
            Some(task) => {
                task.run();
                true
            }
            None => false,
        }
    }

    /// Runs tasks until the queue is empty, including tasks scheduled by
    /// the tasks being run. Returns how many tasks ran.
    pub fn run_until_idle(&self) -> usize {
        let mut executed = 0;
        while self.run_once() {
            executed += 1;
        }
        executed
    }

    /// Number of tasks waiting to run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Returns `true` if no task is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Drops every waiting task without running it.
    pub fn clear(&self) {
        let discarded = std::mem::take(&mut *self.tasks.borrow_mut());
        drop(discarded);
    }
}

impl Scheduler for TaskQueue {
    fn schedule(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TaskQueue")
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_runs_in_fifo_order() {
        let queue = TaskQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for index in 0..3 {
            let log = Rc::clone(&log);
            queue.schedule(Task::new(move || log.borrow_mut().push(index)));
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.run_until_idle(), 3);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_tasks_scheduled_while_draining_run_last() {
        let queue = Rc::new(TaskQueue::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_queue = Rc::clone(&queue);
        let inner_log = Rc::clone(&log);
        queue.schedule(Task::new(move || {
            inner_log.borrow_mut().push("first");
            let nested_log = Rc::clone(&inner_log);
            inner_queue.schedule(Task::new(move || nested_log.borrow_mut().push("nested")));
        }));
        let second_log = Rc::clone(&log);
        queue.schedule(Task::new(move || second_log.borrow_mut().push("second")));

        assert_eq!(queue.run_until_idle(), 3);
        assert_eq!(*log.borrow(), vec!["first", "second", "nested"]);
    }

    #[test]
    fn test_run_once_on_empty_queue() {
        let queue = TaskQueue::new();
        assert!(!queue.run_once());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clear_discards_tasks() {
        let queue = TaskQueue::new();
        queue.schedule(Task::new(|| panic!("must not run")));
        queue.clear();
        assert_eq!(queue.run_until_idle(), 0);
    }
}
