//! Bounded drop-oldest queues
//!
//! Both pipeline queues (audio chunks, recorded transmissions) admit loss:
//! blocking the producer would either stall the OS audio callback or stall
//! the squelch poll loop. Evicting the oldest entry preserves recency, which
//! is what a live monitor wants.
//!
//! Tokio's `mpsc` has no drop-oldest mode and `broadcast` clones every
//! element per receive, so this is a thin wrapper over a locked `VecDeque`
//! with a `Notify` for the async consumer. `push` is synchronous and
//! lock-bounded, safe to call from an audio callback.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::Notify;

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// A bounded MPSC queue that evicts its oldest element on overflow
pub struct DropOldestQueue<T> {
    inner: Mutex<Inner<T>>,
    notify: Notify,
    capacity: usize,
}

impl<T> DropOldestQueue<T> {
    /// Create a queue bounded at `capacity` elements
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be nonzero");
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            notify: Notify::new(),
            capacity,
        }
    }

    /// Push an element, never blocking.
    ///
    /// Returns the evicted oldest element when the queue was full, so callers
    /// can count drops. Pushes after [`close`](Self::close) are discarded.
    pub fn push(&self, item: T) -> Option<T> {
        let evicted = {
            let mut inner = self.inner.lock().expect("queue lock poisoned");
            if inner.closed {
                return None;
            }
            inner.items.push_back(item);
            if inner.items.len() > self.capacity {
                inner.items.pop_front()
            } else {
                None
            }
        };
        self.notify.notify_one();
        evicted
    }

    /// Pop without waiting
    pub fn try_pop(&self) -> Option<T> {
        self.inner
            .lock()
            .expect("queue lock poisoned")
            .items
            .pop_front()
    }

    /// Pop, waiting for an element.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub async fn pop(&self) -> Option<T> {
        loop {
            let notified = self.notify.notified();
            {
                let mut inner = self.inner.lock().expect("queue lock poisoned");
                if let Some(item) = inner.items.pop_front() {
                    return Some(item);
                }
                if inner.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Close the queue: waiters drain remaining elements, then see `None`
    pub fn close(&self) {
        self.inner.lock().expect("queue lock poisoned").closed = true;
        self.notify.notify_waiters();
    }

    /// Number of queued elements
    pub fn len(&self) -> usize {
        self.inner.lock().expect("queue lock poisoned").items.len()
    }

    /// True when no elements are queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn evicts_oldest_on_overflow() {
        let q = DropOldestQueue::new(3);
        assert_eq!(q.push(1), None);
        assert_eq!(q.push(2), None);
        assert_eq!(q.push(3), None);
        assert_eq!(q.push(4), Some(1));
        assert_eq!(q.push(5), Some(2));

        assert_eq!(q.try_pop(), Some(3));
        assert_eq!(q.try_pop(), Some(4));
        assert_eq!(q.try_pop(), Some(5));
        assert_eq!(q.try_pop(), None);
    }

    #[tokio::test]
    async fn pop_waits_for_push() {
        let q = Arc::new(DropOldestQueue::new(4));
        let q2 = q.clone();
        let waiter = tokio::spawn(async move { q2.pop().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        q.push(42);
        assert_eq!(waiter.await.unwrap(), Some(42));
    }

    #[tokio::test]
    async fn close_drains_then_ends() {
        let q = DropOldestQueue::new(4);
        q.push(1);
        q.push(2);
        q.close();

        assert_eq!(q.pop().await, Some(1));
        assert_eq!(q.pop().await, Some(2));
        assert_eq!(q.pop().await, None);
    }

    #[tokio::test]
    async fn close_wakes_waiter() {
        let q = Arc::new(DropOldestQueue::<u8>::new(4));
        let q2 = q.clone();
        let waiter = tokio::spawn(async move { q2.pop().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        q.close();
        assert_eq!(waiter.await.unwrap(), None);
    }

    #[test]
    fn push_after_close_is_discarded() {
        let q = DropOldestQueue::new(2);
        q.close();
        assert_eq!(q.push(1), None);
        assert!(q.is_empty());
    }
}
