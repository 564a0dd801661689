//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::StreamMetricsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total ticks executed
    pub ticks: u64,

    /// Total frames published on the wire
    pub frames_published: u64,

    /// Total messages evicted from the send queue
    pub messages_dropped: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Number of configured capturers
    pub active_capturers: usize,

    /// Stream metrics aggregator
    pub stream_metrics: StreamMetricsAggregator,
}

impl PipelineStats {
    /// Frames per second actually published
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames_published as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Drop rate as percentage of published + dropped
    #[allow(dead_code)]
    pub fn drop_rate(&self) -> f64 {
        let total = self.frames_published + self.messages_dropped;
        if total > 0 {
            (self.messages_dropped as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Ticks: {}", self.ticks);
        println!("   ├─ Frames published: {}", self.frames_published);
        println!("   ├─ Messages dropped: {}", self.messages_dropped);
        println!("   ├─ FPS: {:.2}", self.fps());
        println!("   └─ Capturers: {}", self.active_capturers);

        let summary = self.stream_metrics.summary();

        println!("\n📈 Stream Metrics");
        println!(
            "   ├─ Ticks with active mirror: {} ({:.2}%)",
            summary.ticks_with_active_mirror, summary.active_rate
        );
        println!("   ├─ Active mirrors: {}", summary.active_mirrors);
        println!("   ├─ Publish latency (ms): {}", summary.publish_latency_ms);
        println!("   └─ Compensation ratio: {}", summary.compensation_ratio);

        println!();
    }
}
