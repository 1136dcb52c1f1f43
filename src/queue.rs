//! Shared task queues.
//!
//! Workers compete for tasks on a single queue. Both backends hand out each
//! task to exactly one caller and report emptiness through `dequeue`
//! returning `None`, which is the only signal a worker uses to stop.

use std::collections::VecDeque;

use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use crate::pool::task::Task;

/// A FIFO queue of tasks shared between the driver and every worker.
pub trait TaskQueue: Send + Sync + 'static {
    /// Appends `task` to the back of the queue.
    fn enqueue(&self, task: Task);

    /// Removes and returns the front task, or `None` if the queue is empty.
    fn dequeue(&self) -> Option<Task>;

    /// Snapshot of emptiness. May be stale as soon as it returns.
    fn is_empty(&self) -> bool;

    fn len(&self) -> usize;

    /// Returns the name of the queue backend.
    fn mode(&self) -> &'static str;
}

/// A `VecDeque` guarded by one mutex. Every operation holds the lock for O(1).
#[derive(Default)]
pub struct LockedQueue {
    inner: Mutex<VecDeque<Task>>,
}

impl LockedQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskQueue for LockedQueue {
    fn enqueue(&self, task: Task) {
        self.inner.lock().push_back(task);
    }

    fn dequeue(&self) -> Option<Task> {
        self.inner.lock().pop_front()
    }

    fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    fn len(&self) -> usize {
        self.inner.lock().len()
    }

    fn mode(&self) -> &'static str {
        "LockedQueue"
    }
}

/// An unbounded multi-consumer channel, filled before workers start and
/// drained with non-blocking receives.
pub struct ChannelQueue {
    tx: Sender<Task>,
    rx: Receiver<Task>,
}

impl ChannelQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }
}

impl Default for ChannelQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskQueue for ChannelQueue {
    fn enqueue(&self, task: Task) {
        // The receiver lives as long as `self`, so the send cannot fail.
        let _ = self.tx.send(task);
    }

    fn dequeue(&self) -> Option<Task> {
        self.rx.try_recv().ok()
    }

    fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    fn len(&self) -> usize {
        self.rx.len()
    }

    fn mode(&self) -> &'static str {
        "ChannelQueue"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fifo_order<Q: TaskQueue>(q: Q) {
        for t in 1..=5 {
            q.enqueue(t);
        }
        assert_eq!(q.len(), 5);
        let drained: Vec<_> = std::iter::from_fn(|| q.dequeue()).collect();
        assert_eq!(drained, vec![1, 2, 3, 4, 5]);
        assert!(q.is_empty());
        assert_eq!(q.dequeue(), None);
    }

    #[test]
    fn locked_queue_is_fifo() {
        fifo_order(LockedQueue::new());
    }

    #[test]
    fn channel_queue_is_fifo() {
        fifo_order(ChannelQueue::new());
    }

    #[test]
    fn is_empty_is_idempotent() {
        let q = LockedQueue::new();
        assert!((0..10).all(|_| q.is_empty()));
        q.enqueue(1);
        assert!((0..10).all(|_| !q.is_empty()));
        assert_eq!(q.len(), 1);

        let c = ChannelQueue::new();
        assert!((0..10).all(|_| c.is_empty()));
        c.enqueue(1);
        assert!((0..10).all(|_| !c.is_empty()));
    }

    #[test]
    fn mode_names() {
        assert_eq!(LockedQueue::new().mode(), "LockedQueue");
        assert_eq!(ChannelQueue::new().mode(), "ChannelQueue");
    }
}
