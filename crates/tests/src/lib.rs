//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - Contract smoke tests
//! - Compositor against a live render sink
//! - Full mock pipeline: capture -> compositor -> pub socket -> subscriber

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // Keep the ICD surface reachable from one place
        let _ = contracts::PixelFormat::Rgb8;
        let _ = contracts::MirrorSettings::default();
        let _ = contracts::StreamBlueprint::default();
    }
}

#[cfg(test)]
mod geometry_tests {
    use contracts::{CameraIntrinsics, Pose};
    use geometry::{compensation_ratio, is_valid_observer_position, CameraFrustum};
    use nalgebra::Point3;

    fn frustum() -> CameraFrustum {
        CameraFrustum::new(Pose::identity(), CameraIntrinsics::new(102.0, 102.0, 50.0))
    }

    #[test]
    fn test_observer_ahead_of_camera_is_valid() {
        let frustum = frustum();
        assert!(is_valid_observer_position(
            &frustum,
            &Point3::new(0.0, 0.0, 3.0)
        ));
        assert!(!is_valid_observer_position(
            &frustum,
            &Point3::new(0.0, 0.0, -3.0)
        ));
    }

    #[test]
    fn test_compensation_widens_off_axis() {
        let frustum = frustum();
        let head_on = compensation_ratio(&frustum, &Point3::new(0.0, 0.0, 3.0));
        // 53 degrees off axis, past the validity threshold
        let off_axis = compensation_ratio(&frustum, &Point3::new(4.0, 0.0, 3.0));
        assert!(head_on >= 1.0);
        assert!(off_axis > head_on);
    }
}

#[cfg(test)]
mod observability_tests {
    use observability::StreamMetricsAggregator;

    #[test]
    fn test_aggregator_summary_counts() {
        let mut aggregator = StreamMetricsAggregator::new();
        aggregator.update_tick(1, true);
        aggregator.update_tick(0, false);
        aggregator.update_latency(2.0);
        aggregator.set_total_dropped(3);

        let summary = aggregator.summary();
        assert_eq!(summary.total_ticks, 2);
        assert_eq!(summary.total_frames, 1);
        assert_eq!(summary.total_dropped, 3);
    }
}

#[cfg(test)]
mod compositor_tests {
    use std::f32::consts::PI;

    use capture::NullRenderSink;
    use compositor::MirrorCompositor;
    use contracts::{
        CameraIntrinsics, CapturerDescriptor, MirrorSettings, Pose,
    };
    use nalgebra::{Point3, UnitQuaternion, Vector3};

    fn facing_pair() -> (Pose, CapturerDescriptor) {
        // Capturer at the origin looking +Z, observer 4m out looking back
        let observer = Pose::new(
            Point3::new(0.0, 0.0, 4.0),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), PI),
        );
        let capturer = CapturerDescriptor::new(
            "cam",
            Pose::identity(),
            CameraIntrinsics::new(102.0, 102.0, 50.0),
        );
        (observer, capturer)
    }

    #[test]
    fn test_head_on_mirror_is_active() {
        let mut sink = NullRenderSink::new();
        let mut compositor = MirrorCompositor::new(MirrorSettings::default());
        let (observer, capturer) = facing_pair();

        let summary = compositor.tick(&observer, &[capturer], &mut sink);

        assert_eq!(summary.active, 1);
        assert_eq!(summary.inactive, 0);
        assert_eq!(sink.submissions(), 1);
    }

    #[test]
    fn test_registry_follows_capturer_list() {
        let mut sink = NullRenderSink::new();
        let mut compositor = MirrorCompositor::new(MirrorSettings::default());
        let (observer, capturer) = facing_pair();

        let mut a = capturer.clone();
        a.id = "a".into();
        let mut b = capturer.clone();
        b.id = "b".into();
        let mut c = capturer.clone();
        c.id = "c".into();

        let first = compositor.tick(&observer, &[a, b.clone()], &mut sink);
        assert_eq!(first.added, 2);
        assert_eq!(sink.target_count(), 2);

        let second = compositor.tick(&observer, &[b, c], &mut sink);
        assert_eq!(second.added, 1);
        assert_eq!(second.removed, 1);
        assert_eq!(sink.target_count(), 2);

        compositor.shutdown(&mut sink);
        assert_eq!(sink.target_count(), 0);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::Duration;

    use capture::{downsample_frame, MockColorSource, MockPoseSource, NullRenderSink};
    use compositor::MirrorCompositor;
    use contracts::{CameraIntrinsics, CapturerDescriptor, MirrorSettings, Pose, PoseSource};
    use futures::StreamExt;
    use publisher::{
        PubCodec, StreamConfig, StreamPipeline, TOPIC_CALIBRATION, TOPIC_FRAME, TOPIC_SIZE,
    };
    use tokio::net::TcpStream;
    use tokio::time::{sleep, timeout};
    use tokio_util::codec::FramedRead;

    /// End-to-end: mock capture -> compositor -> pub socket -> subscriber
    ///
    /// Verifies the full flow:
    /// 1. MockColorSource produces frames, downsampled for the wire
    /// 2. MirrorCompositor reconciles and updates the mirror
    /// 3. The subscriber sees Calibration, Size, and timestamped Frames
    #[tokio::test]
    async fn test_e2e_mock_pipeline() {
        let mut stream = StreamPipeline::new(StreamConfig {
            port: 0,
            size_broadcast_interval: Duration::from_secs(3600),
        });
        stream.start().await.unwrap();

        let addr = format!("127.0.0.1:{}", stream.publisher().bound_port());
        let socket = TcpStream::connect(&addr).await.unwrap();
        let mut subscriber = FramedRead::new(socket, PubCodec);
        sleep(Duration::from_millis(50)).await;

        let mut source = MockColorSource::new(32, 24);
        let mut poses = MockPoseSource::new(2.0, 0.05).with_calibration_after(0);

        let mut sink = NullRenderSink::new();
        let mut compositor = MirrorCompositor::new(MirrorSettings::default());
        let capturer = CapturerDescriptor::new(
            "cam",
            Pose::identity(),
            CameraIntrinsics::new(102.0, 102.0, 50.0),
        );

        let target_frames = 3;
        for _ in 0..target_frames {
            poses.advance();
            let observer = poses.observer_pose().unwrap();
            compositor.tick(&observer, &[capturer.clone()], &mut sink);

            let published = stream
                .tick(&mut source, &poses, &|f| downsample_frame(&f, 2))
                .await;
            assert!(published);
        }

        let mut frame_ticks = Vec::new();
        let mut saw_calibration = false;
        let mut saw_size = false;

        for _ in 0..(target_frames + 2) {
            let message = timeout(Duration::from_secs(2), subscriber.next())
                .await
                .expect("subscriber timed out")
                .unwrap()
                .unwrap();

            match message.topic.as_str() {
                TOPIC_CALIBRATION => {
                    saw_calibration = true;
                    assert_eq!(message.payload.len(), 64);
                }
                TOPIC_SIZE => {
                    saw_size = true;
                    let w = i32::from_le_bytes(message.payload[0..4].try_into().unwrap());
                    let h = i32::from_le_bytes(message.payload[4..8].try_into().unwrap());
                    assert_eq!((w, h), (16, 12));
                }
                TOPIC_FRAME => {
                    let ticks = u64::from_le_bytes(message.payload[0..8].try_into().unwrap());
                    assert_eq!(message.payload.len(), 8 + 16 * 12 * 3);
                    frame_ticks.push(ticks);
                }
                other => panic!("unexpected topic: {other}"),
            }
        }

        assert!(saw_calibration, "calibration never published");
        assert!(saw_size, "size never published");
        assert_eq!(frame_ticks.len(), target_frames);
        assert!(
            frame_ticks.windows(2).all(|w| w[0] < w[1]),
            "frame timestamps not strictly increasing: {frame_ticks:?}"
        );

        compositor.shutdown(&mut sink);
        stream.shutdown().await;
    }
}

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};

    const CONFIG: &str = r#"
[network]
port = 0
size_broadcast_interval_s = 1.0

[stream]
downsample_factor = 2

[mirror]
cropping_enabled = true
crop_size = 0.3

[[capturers]]
id = "front"
[capturers.position]
y = 1.2
[capturers.intrinsics]
sensor_width = 640.0
sensor_height = 480.0
focal_length = 500.0

[[capturers]]
id = "rear"
enabled = false
[capturers.rotation]
yaw_deg = 180.0
[capturers.intrinsics]
sensor_width = 640.0
sensor_height = 480.0
focal_length = 500.0
"#;

    #[test]
    fn test_blueprint_to_descriptors() {
        let blueprint = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        assert!(blueprint.mirror.cropping_enabled);

        let descriptors: Vec<_> = blueprint.capturers.iter().map(|c| c.descriptor()).collect();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].id.as_str(), "front");
        assert!((descriptors[0].pose.position.y - 1.2).abs() < 1e-6);
        assert!(descriptors[0].enabled);

        assert!(!descriptors[1].enabled);
        // Rear camera yawed 180 degrees: forward points -Z
        assert!((descriptors[1].pose.forward().z + 1.0).abs() < 1e-5);
    }
}
