//! Stream metrics collection
//!
//! Prometheus recorders for the publish path and the mirror
//! compositor, plus an in-memory aggregator for end-of-run summaries.

use metrics::{counter, gauge, histogram};

/// Record one frame going out on the wire.
pub fn record_frame_published(payload_len: usize) {
    counter!("pbm_frames_published_total").increment(1);
    histogram!("pbm_frame_payload_bytes").record(payload_len as f64);
}

/// Record a message evicted from the outbound queue.
pub fn record_send_dropped() {
    counter!("pbm_messages_dropped_total").increment(1);
}

/// Record a failed subscriber write.
pub fn record_send_failure() {
    counter!("pbm_send_failures_total").increment(1);
}

/// Record the outbound queue depth.
pub fn record_queue_depth(depth: usize) {
    gauge!("pbm_send_queue_depth").set(depth as f64);
}

/// Record the number of connected subscribers.
pub fn record_subscriber_count(count: usize) {
    gauge!("pbm_subscribers").set(count as f64);
}

/// Record the active/inactive mirror split for one tick.
pub fn record_active_mirrors(active: usize, inactive: usize) {
    gauge!("pbm_mirrors_active").set(active as f64);
    gauge!("pbm_mirrors_inactive").set(inactive as f64);
}

/// Record a focal-length compensation ratio per capturer.
pub fn record_compensation_ratio(capturer_id: &str, ratio: f32) {
    gauge!(
        "pbm_compensation_ratio",
        "capturer_id" => capturer_id.to_string()
    )
    .set(ratio as f64);
}

/// Record end-to-end publish latency (capture pull to queue push).
pub fn record_publish_latency_ms(latency_ms: f64) {
    histogram!("pbm_publish_latency_ms").record(latency_ms);
}

/// In-memory aggregation of stream metrics for run summaries.
#[derive(Debug, Clone, Default)]
pub struct StreamMetricsAggregator {
    /// Ticks observed
    pub total_ticks: u64,

    /// Frames published
    pub total_frames: u64,

    /// Messages evicted from the send queue
    pub total_dropped: u64,

    /// Ticks with at least one active mirror
    pub ticks_with_active_mirror: u64,

    /// Active mirror count statistics
    pub active_stats: RunningStats,

    /// Publish latency statistics (ms)
    pub latency_stats: RunningStats,

    /// Compensation ratio statistics
    pub ratio_stats: RunningStats,
}

impl StreamMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one tick of the render/publish loop.
    pub fn update_tick(&mut self, active_mirrors: usize, frame_published: bool) {
        self.total_ticks += 1;
        if frame_published {
            self.total_frames += 1;
        }
        if active_mirrors > 0 {
            self.ticks_with_active_mirror += 1;
        }
        self.active_stats.push(active_mirrors as f64);
    }

    /// Fold in a publish latency sample.
    pub fn update_latency(&mut self, latency_ms: f64) {
        self.latency_stats.push(latency_ms);
    }

    /// Fold in a compensation ratio sample.
    pub fn update_ratio(&mut self, ratio: f32) {
        self.ratio_stats.push(ratio as f64);
    }

    /// Fold in the drop counter (absolute, from the queue).
    pub fn set_total_dropped(&mut self, dropped: u64) {
        self.total_dropped = dropped;
    }

    /// Produce a summary report.
    pub fn summary(&self) -> StreamSummary {
        StreamSummary {
            total_ticks: self.total_ticks,
            total_frames: self.total_frames,
            total_dropped: self.total_dropped,
            ticks_with_active_mirror: self.ticks_with_active_mirror,
            active_rate: if self.total_ticks > 0 {
                self.ticks_with_active_mirror as f64 / self.total_ticks as f64 * 100.0
            } else {
                0.0
            },
            active_mirrors: StatsSummary::from(&self.active_stats),
            publish_latency_ms: StatsSummary::from(&self.latency_stats),
            compensation_ratio: StatsSummary::from(&self.ratio_stats),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Run summary
#[derive(Debug, Clone, Default)]
pub struct StreamSummary {
    pub total_ticks: u64,
    pub total_frames: u64,
    pub total_dropped: u64,
    pub ticks_with_active_mirror: u64,
    pub active_rate: f64,
    pub active_mirrors: StatsSummary,
    pub publish_latency_ms: StatsSummary,
    pub compensation_ratio: StatsSummary,
}

impl std::fmt::Display for StreamSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Stream Summary ===")?;
        writeln!(f, "Total ticks: {}", self.total_ticks)?;
        writeln!(f, "Frames published: {}", self.total_frames)?;
        writeln!(f, "Messages dropped: {}", self.total_dropped)?;
        writeln!(
            f,
            "Ticks with active mirror: {} ({:.2}%)",
            self.ticks_with_active_mirror, self.active_rate
        )?;
        writeln!(f, "Active mirrors: {}", self.active_mirrors)?;
        writeln!(f, "Publish latency (ms): {}", self.publish_latency_ms)?;
        writeln!(f, "Compensation ratio: {}", self.compensation_ratio)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = StreamMetricsAggregator::new();

        aggregator.update_tick(2, true);
        aggregator.update_tick(0, false);
        aggregator.update_latency(4.5);
        aggregator.update_ratio(1.2);
        aggregator.set_total_dropped(3);

        let summary = aggregator.summary();
        assert_eq!(summary.total_ticks, 2);
        assert_eq!(summary.total_frames, 1);
        assert_eq!(summary.total_dropped, 3);
        assert_eq!(summary.ticks_with_active_mirror, 1);
        assert!((summary.active_rate - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = StreamMetricsAggregator::new();
        aggregator.update_tick(1, true);

        let output = format!("{}", aggregator.summary());
        assert!(output.contains("Total ticks: 1"));
        assert!(output.contains("Frames published: 1"));
    }
}
