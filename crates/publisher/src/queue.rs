//! Bounded outbound queue with drop-oldest backpressure.
//!
//! `push` never blocks: once the high-water mark is reached the oldest
//! queued message is discarded to make room. Wire transmission happens
//! on the socket worker, asynchronously relative to the caller.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio::sync::Notify;

use crate::codec::PublishMessage;

/// Outbound high-water mark before drop-oldest engages.
pub const SEND_HIGH_WATER_MARK: usize = 10;

/// Bounded FIFO shared between publish callers and the socket worker.
#[derive(Debug)]
pub struct SendQueue {
    inner: Mutex<VecDeque<PublishMessage>>,
    notify: Notify,
    capacity: usize,
    dropped: AtomicU64,
}

impl SendQueue {
    /// Create a queue with the given high-water mark.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            notify: Notify::new(),
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    /// Enqueue a message, dropping the oldest one when full.
    ///
    /// Returns the dropped message, if any.
    pub fn push(&self, message: PublishMessage) -> Option<PublishMessage> {
        let dropped = {
            let mut queue = self.inner.lock().expect("send queue poisoned");
            let dropped = if queue.len() == self.capacity {
                queue.pop_front()
            } else {
                None
            };
            queue.push_back(message);
            dropped
        };

        if dropped.is_some() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.notify.notify_one();
        dropped
    }

    /// Dequeue the oldest message, if any.
    pub fn pop(&self) -> Option<PublishMessage> {
        self.inner.lock().expect("send queue poisoned").pop_front()
    }

    /// Wait for and dequeue the next message.
    pub async fn recv(&self) -> PublishMessage {
        loop {
            if let Some(message) = self.pop() {
                return message;
            }
            self.notify.notified().await;
        }
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("send queue poisoned").len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total messages discarded by backpressure.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for SendQueue {
    fn default() -> Self {
        Self::new(SEND_HIGH_WATER_MARK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn msg(n: u8) -> PublishMessage {
        PublishMessage::new("Frame", Bytes::from(vec![n]))
    }

    #[test]
    fn test_fifo_order() {
        let queue = SendQueue::new(10);
        queue.push(msg(1));
        queue.push(msg(2));
        queue.push(msg(3));

        assert_eq!(queue.pop().unwrap().payload[0], 1);
        assert_eq!(queue.pop().unwrap().payload[0], 2);
        assert_eq!(queue.pop().unwrap().payload[0], 3);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_drop_oldest_at_high_water_mark() {
        let queue = SendQueue::new(10);

        // 15 messages against a mark of 10: the earliest 5 are dropped
        for n in 0..15u8 {
            queue.push(msg(n));
        }

        assert_eq!(queue.len(), 10);
        assert_eq!(queue.dropped_count(), 5);

        // Exactly the 10 most recent remain, in order
        for expected in 5..15u8 {
            assert_eq!(queue.pop().unwrap().payload[0], expected);
        }
    }

    #[test]
    fn test_push_reports_dropped_message() {
        let queue = SendQueue::new(1);
        assert!(queue.push(msg(1)).is_none());
        let dropped = queue.push(msg(2)).unwrap();
        assert_eq!(dropped.payload[0], 1);
    }

    #[tokio::test]
    async fn test_recv_wakes_on_push() {
        use std::sync::Arc;

        let queue = Arc::new(SendQueue::new(10));
        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.recv().await })
        };

        // Give the consumer a chance to park first
        tokio::task::yield_now().await;
        queue.push(msg(7));

        let received = consumer.await.unwrap();
        assert_eq!(received.payload[0], 7);
    }
}
