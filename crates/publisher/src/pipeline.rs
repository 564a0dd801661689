//! Streaming pipeline: frame source to pub socket.
//!
//! Owns the per-tick publishing policy: calibration goes out once,
//! as soon as the pose source has it; stream dimensions are
//! re-broadcast periodically so late subscribers can size their
//! receive buffers; every captured frame goes out timestamped.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use contracts::{ColorFrame, FrameSource, PoseSource};

use crate::error::PublisherError;
use crate::publisher::{FramePublisher, DEFAULT_PORT};

/// How often stream dimensions are re-announced.
pub const SIZE_BROADCAST_INTERVAL: Duration = Duration::from_secs(3);

/// Pipeline tuning knobs.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// TCP port the pub socket binds on.
    pub port: u16,

    /// Interval between `Size` broadcasts.
    pub size_broadcast_interval: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            size_broadcast_interval: SIZE_BROADCAST_INTERVAL,
        }
    }
}

/// Drives one frame stream onto the pub socket.
pub struct StreamPipeline {
    publisher: FramePublisher,
    config: StreamConfig,
    last_size_broadcast: Option<Instant>,
    calibration_sent: bool,
}

impl StreamPipeline {
    pub fn new(config: StreamConfig) -> Self {
        let publisher = FramePublisher::new(config.port);
        Self {
            publisher,
            config,
            last_size_broadcast: None,
            calibration_sent: false,
        }
    }

    /// Bind the pub socket.
    ///
    /// # Errors
    /// Returns `PublisherError::Bind` when the port is unavailable.
    pub async fn start(&mut self) -> Result<(), PublisherError> {
        self.publisher.bind().await
    }

    pub fn publisher(&self) -> &FramePublisher {
        &self.publisher
    }

    /// Run one tick: pull a frame, apply `transform` (downsampling,
    /// format conversion), and publish. Returns whether a frame went
    /// out this tick.
    pub async fn tick(
        &mut self,
        source: &mut dyn FrameSource,
        poses: &dyn PoseSource,
        transform: &dyn Fn(ColorFrame) -> ColorFrame,
    ) -> bool {
        if !self.calibration_sent {
            if let Some(matrix) = poses.calibration() {
                self.publisher.publish_calibration(&matrix).await;
                self.calibration_sent = true;
                debug!("calibration published");
            }
        }

        let Some(frame) = source.next_frame() else {
            return false;
        };
        if !frame.is_consistent() {
            warn!(
                source = source.name(),
                width = frame.width,
                height = frame.height,
                len = frame.data.len(),
                "inconsistent frame discarded"
            );
            return false;
        }

        let frame = transform(frame);
        self.maybe_broadcast_size(frame.width, frame.height).await;
        self.publisher.publish_frame(&frame).await;
        true
    }

    async fn maybe_broadcast_size(&mut self, width: u32, height: u32) {
        let due = match self.last_size_broadcast {
            None => true,
            Some(at) => at.elapsed() >= self.config.size_broadcast_interval,
        };
        if due {
            self.publisher.publish_size(width, height).await;
            self.last_size_broadcast = Some(Instant::now());
        }
    }

    /// Release the transport.
    pub async fn shutdown(&mut self) {
        self.publisher.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::{CapturerId, PixelFormat, Pose};
    use futures::StreamExt;
    use nalgebra::Matrix4;
    use tokio::net::TcpStream;
    use tokio::time::{sleep, timeout};
    use tokio_util::codec::FramedRead;

    use crate::codec::{PubCodec, TOPIC_CALIBRATION, TOPIC_FRAME, TOPIC_SIZE};

    struct TestSource {
        frames: Vec<ColorFrame>,
    }

    impl FrameSource for TestSource {
        fn name(&self) -> &str {
            "test"
        }

        fn resolution(&self) -> (u32, u32) {
            (2, 2)
        }

        fn next_frame(&mut self) -> Option<ColorFrame> {
            if self.frames.is_empty() {
                None
            } else {
                Some(self.frames.remove(0))
            }
        }
    }

    struct TestPoses {
        calibration: Option<Matrix4<f32>>,
    }

    impl PoseSource for TestPoses {
        fn observer_pose(&self) -> Option<Pose> {
            Some(Pose::default())
        }

        fn capturer_pose(&self, _id: &CapturerId) -> Option<Pose> {
            Some(Pose::default())
        }

        fn calibration(&self) -> Option<Matrix4<f32>> {
            self.calibration
        }
    }

    fn frame_2x2() -> ColorFrame {
        ColorFrame {
            width: 2,
            height: 2,
            format: PixelFormat::Rgb8,
            data: Bytes::from(vec![7u8; 12]),
        }
    }

    #[tokio::test]
    async fn test_tick_publishes_calibration_size_then_frame() {
        let mut pipeline = StreamPipeline::new(StreamConfig {
            port: 0,
            ..Default::default()
        });
        pipeline.start().await.unwrap();

        let addr = format!("127.0.0.1:{}", pipeline.publisher().bound_port());
        let stream = TcpStream::connect(&addr).await.unwrap();
        let mut subscriber = FramedRead::new(stream, PubCodec);
        sleep(Duration::from_millis(50)).await;

        let mut source = TestSource {
            frames: vec![frame_2x2()],
        };
        let poses = TestPoses {
            calibration: Some(Matrix4::identity()),
        };

        let published = pipeline.tick(&mut source, &poses, &|f| f).await;
        assert!(published);

        let mut topics = Vec::new();
        for _ in 0..3 {
            let message = timeout(Duration::from_secs(2), subscriber.next())
                .await
                .unwrap()
                .unwrap()
                .unwrap();
            topics.push(message.topic);
        }
        assert_eq!(topics, vec![TOPIC_CALIBRATION, TOPIC_SIZE, TOPIC_FRAME]);

        pipeline.shutdown().await;
    }

    #[tokio::test]
    async fn test_calibration_is_one_shot() {
        let mut pipeline = StreamPipeline::new(StreamConfig {
            port: 0,
            size_broadcast_interval: Duration::from_secs(3600),
        });
        pipeline.start().await.unwrap();

        let addr = format!("127.0.0.1:{}", pipeline.publisher().bound_port());
        let stream = TcpStream::connect(&addr).await.unwrap();
        let mut subscriber = FramedRead::new(stream, PubCodec);
        sleep(Duration::from_millis(50)).await;

        let mut source = TestSource {
            frames: vec![frame_2x2(), frame_2x2()],
        };
        let poses = TestPoses {
            calibration: Some(Matrix4::identity()),
        };

        pipeline.tick(&mut source, &poses, &|f| f).await;
        pipeline.tick(&mut source, &poses, &|f| f).await;

        let mut topics = Vec::new();
        for _ in 0..4 {
            let message = timeout(Duration::from_secs(2), subscriber.next())
                .await
                .unwrap()
                .unwrap()
                .unwrap();
            topics.push(message.topic);
        }
        // Second tick carries only the frame
        assert_eq!(
            topics,
            vec![TOPIC_CALIBRATION, TOPIC_SIZE, TOPIC_FRAME, TOPIC_FRAME]
        );

        pipeline.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_source_publishes_nothing() {
        let mut pipeline = StreamPipeline::new(StreamConfig::default());
        let mut source = TestSource { frames: vec![] };
        let poses = TestPoses { calibration: None };

        // Not even bound: tick must still be a safe no-op
        let published = pipeline.tick(&mut source, &poses, &|f| f).await;
        assert!(!published);
    }

    #[tokio::test]
    async fn test_inconsistent_frame_discarded() {
        let mut pipeline = StreamPipeline::new(StreamConfig::default());
        let mut source = TestSource {
            frames: vec![ColorFrame {
                width: 4,
                height: 4,
                format: PixelFormat::Rgb8,
                data: Bytes::from(vec![0u8; 5]),
            }],
        };
        let poses = TestPoses { calibration: None };

        let published = pipeline.tick(&mut source, &poses, &|f| f).await;
        assert!(!published);
    }
}
