//! Mirror Pipeline Demo
//!
//! Drives the full mirror pipeline with mock capture and pose sources:
//! per-tick mirror geometry plus the framed pub/sub stream. Runs
//! without capture hardware or a tracker.
//!
//! Run with: cargo run --bin mirror_pipeline [config.toml]

use std::time::Duration;

use capture::{downsample_frame, MockColorSource, MockPoseSource, NullRenderSink};
use compositor::MirrorCompositor;
use config_loader::ConfigLoader;
use contracts::{CapturerDescriptor, CapturerId, PoseSource, StreamBlueprint};
use publisher::{StreamConfig, StreamPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Mirror Pipeline Demo");

    // ==== Stage 1: Use default config or load from file ====
    let blueprint = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading blueprint config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        create_test_blueprint()
    };

    // ==== Stage 2: Sources (mock) ====
    let (width, height) = blueprint
        .capturers
        .first()
        .map(|c| {
            (
                c.intrinsics.sensor_width as u32,
                c.intrinsics.sensor_height as u32,
            )
        })
        .unwrap_or((640, 480));

    let mut source = MockColorSource::new(width, height);
    let mut poses = MockPoseSource::new(2.5, 0.03).with_calibration_after(5);
    for capturer in &blueprint.capturers {
        poses = poses.with_capturer(CapturerId::new(&capturer.id), capturer.pose());
    }

    tracing::info!(width, height, "Mock sources ready");

    // ==== Stage 3: Compositor ====
    let mut sink = NullRenderSink::new();
    let mut compositor = MirrorCompositor::new(blueprint.mirror);
    let descriptors: Vec<CapturerDescriptor> =
        blueprint.capturers.iter().map(|c| c.descriptor()).collect();

    // ==== Stage 4: Publish pipeline ====
    let mut stream = StreamPipeline::new(StreamConfig {
        port: blueprint.network.port,
        size_broadcast_interval: Duration::from_secs_f32(
            blueprint.network.size_broadcast_interval_s,
        ),
    });
    stream.start().await?;
    tracing::info!(
        port = stream.publisher().bound_port(),
        "Pub socket bound, subscribers can connect"
    );

    // ==== Stage 5: Tick loop ====
    let factor = blueprint.stream.downsample_factor;
    let target_ticks = 300u64;
    let mut ticker = tokio::time::interval(Duration::from_millis(33));

    for tick in 0..target_ticks {
        ticker.tick().await;
        poses.advance();

        let mut live = descriptors.clone();
        for descriptor in &mut live {
            if let Some(pose) = poses.capturer_pose(&descriptor.id) {
                descriptor.pose = pose;
            }
        }

        let observer = poses.observer_pose().unwrap_or_default();
        let summary = compositor.tick(&observer, &live, &mut sink);

        stream
            .tick(&mut source, &poses, &|f| downsample_frame(&f, factor))
            .await;

        if tick % 30 == 0 {
            tracing::info!(
                tick,
                active = summary.active,
                inactive = summary.inactive,
                subscribers = stream
                    .publisher()
                    .metrics()
                    .map(|m| m.subscriber_count)
                    .unwrap_or(0),
                "Pipeline running"
            );
        }
    }

    // ==== Stage 6: Shutdown ====
    tracing::info!("Shutting down...");
    compositor.shutdown(&mut sink);
    stream.shutdown().await;

    tracing::info!("Mirror Pipeline Demo finished");
    Ok(())
}

/// Minimal in-code blueprint for running without a config file
fn create_test_blueprint() -> StreamBlueprint {
    use contracts::{CameraIntrinsics, CapturerConfig, PositionConfig, RotationConfig};

    StreamBlueprint {
        capturers: vec![CapturerConfig {
            id: "main-camera".into(),
            position: PositionConfig::default(),
            rotation: RotationConfig::default(),
            intrinsics: CameraIntrinsics::new(640.0, 480.0, 500.0),
            enabled: true,
        }],
        ..Default::default()
    }
}
