//! Publisher metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for one publish socket
#[derive(Debug, Default)]
pub struct PublisherMetrics {
    /// Current outbound queue length
    queue_len: AtomicUsize,
    /// Messages put on the wire
    sent_count: AtomicU64,
    /// Messages discarded by drop-oldest backpressure
    dropped_count: AtomicU64,
    /// Per-subscriber send failures (subscriber disconnects)
    send_failures: AtomicU64,
    /// Currently connected subscribers
    subscriber_count: AtomicUsize,
}

impl PublisherMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current queue length
    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    /// Set current queue length
    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// Get sent message count
    pub fn sent_count(&self) -> u64 {
        self.sent_count.load(Ordering::Relaxed)
    }

    /// Increment sent message count
    pub fn inc_sent_count(&self) {
        self.sent_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get dropped message count
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    /// Increment dropped message count
    pub fn inc_dropped_count(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get send failure count
    pub fn send_failures(&self) -> u64 {
        self.send_failures.load(Ordering::Relaxed)
    }

    /// Increment send failure count
    pub fn inc_send_failures(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get connected subscriber count
    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::Relaxed)
    }

    /// Set connected subscriber count
    pub fn set_subscriber_count(&self, count: usize) {
        self.subscriber_count.store(count, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> PublisherSnapshot {
        PublisherSnapshot {
            queue_len: self.queue_len(),
            sent_count: self.sent_count(),
            dropped_count: self.dropped_count(),
            send_failures: self.send_failures(),
            subscriber_count: self.subscriber_count(),
        }
    }
}

/// Snapshot of publisher metrics (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct PublisherSnapshot {
    pub queue_len: usize,
    pub sent_count: u64,
    pub dropped_count: u64,
    pub send_failures: u64,
    pub subscriber_count: usize,
}
