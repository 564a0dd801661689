//! Pipeline orchestrator - coordinates all components.
//!
//! Runs the render/publish loop against mock capture and pose
//! sources; the real device and tracker attach through the same
//! `FrameSource`/`PoseSource` traits.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use capture::{downsample_frame, MockColorSource, MockPoseSource, NullRenderSink};
use compositor::MirrorCompositor;
use contracts::{CapturerDescriptor, CapturerId, PoseSource, StreamBlueprint};
use observability::{record_active_mirrors, record_frame_published, record_publish_latency_ms};
use publisher::{StreamConfig, StreamPipeline};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The stream blueprint configuration
    pub blueprint: StreamBlueprint,

    /// Maximum number of ticks to run (None = unlimited)
    pub max_ticks: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Render/publish tick rate in Hz
    pub tick_rate_hz: u32,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Capture and pose sources (mock mode: no hardware attached)
        let (capture_w, capture_h) = blueprint
            .capturers
            .first()
            .map(|c| {
                (
                    c.intrinsics.sensor_width as u32,
                    c.intrinsics.sensor_height as u32,
                )
            })
            .unwrap_or((640, 480));

        let mut source = MockColorSource::new(capture_w, capture_h);
        let mut poses = MockPoseSource::new(2.0, 0.02);
        for capturer in &blueprint.capturers {
            poses = poses.with_capturer(CapturerId::new(&capturer.id), capturer.pose());
        }

        info!(
            width = capture_w,
            height = capture_h,
            capturers = blueprint.capturers.len(),
            "Running in MOCK mode (no capture hardware required)"
        );

        // Compositor + render sink
        let mut sink = NullRenderSink::new();
        let mut mirror_compositor = MirrorCompositor::new(blueprint.mirror);
        let descriptors: Vec<CapturerDescriptor> =
            blueprint.capturers.iter().map(|c| c.descriptor()).collect();

        // Publish pipeline
        let mut stream = StreamPipeline::new(StreamConfig {
            port: blueprint.network.port,
            size_broadcast_interval: Duration::from_secs_f32(
                blueprint.network.size_broadcast_interval_s,
            ),
        });
        stream
            .start()
            .await
            .with_context(|| format!("Failed to bind pub socket on port {}", blueprint.network.port))?;

        info!(
            port = stream.publisher().bound_port(),
            "Pub socket bound, pipeline running"
        );

        let factor = blueprint.stream.downsample_factor;
        let tick_period = Duration::from_secs_f64(1.0 / self.config.tick_rate_hz.max(1) as f64);
        let mut ticker = tokio::time::interval(tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let deadline = self.config.timeout.map(|t| start_time + t);

        // Timestamp prefix + packed RGB8 at the published resolution
        let wire_payload_len = 8
            + (capture_w / factor.max(1)).max(1) as usize
                * (capture_h / factor.max(1)).max(1) as usize
                * 3;

        let mut stats = PipelineStats {
            active_capturers: descriptors.len(),
            ..Default::default()
        };

        loop {
            ticker.tick().await;
            poses.advance();

            // Refresh descriptor poses from the tracker
            let mut live = descriptors.clone();
            for descriptor in &mut live {
                if let Some(pose) = poses.capturer_pose(&descriptor.id) {
                    descriptor.pose = pose;
                }
            }

            let observer = poses.observer_pose().unwrap_or_default();
            let summary = mirror_compositor.tick(&observer, &live, &mut sink);
            record_active_mirrors(summary.active, summary.inactive);

            let publish_start = Instant::now();
            let published = stream
                .tick(&mut source, &poses, &|f| downsample_frame(&f, factor))
                .await;
            if published {
                stats.frames_published += 1;
                record_frame_published(wire_payload_len);
                record_publish_latency_ms(publish_start.elapsed().as_secs_f64() * 1000.0);
            }

            stats.ticks += 1;
            stats.stream_metrics.update_tick(summary.active, published);
            stats
                .stream_metrics
                .update_latency(publish_start.elapsed().as_secs_f64() * 1000.0);

            if let Some(max) = self.config.max_ticks {
                if stats.ticks >= max {
                    info!(ticks = stats.ticks, "Reached max ticks limit");
                    break;
                }
            }
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    warn!(
                        timeout_secs = self.config.timeout.map(|t| t.as_secs()),
                        "Pipeline timed out"
                    );
                    break;
                }
            }
        }

        // Shutdown
        info!("Shutting down pipeline...");
        mirror_compositor.shutdown(&mut sink);

        if let Some(snapshot) = stream.publisher().metrics() {
            stats.messages_dropped = snapshot.dropped_count;
            stats.stream_metrics.set_total_dropped(snapshot.dropped_count);
        }
        stream.shutdown().await;

        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            fps = format!("{:.2}", stats.fps()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}
