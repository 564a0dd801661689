//! # Publisher
//!
//! Framed publish protocol: length-prefixed, topic-tagged, timestamped
//! messages over a pub/sub TCP socket, with bounded drop-oldest
//! backpressure and best-effort (at-most-once) delivery.
//!
//! Responsibilities:
//! - Wire codec (topic frame + payload frame)
//! - Socket lifecycle (bind, lazy reinit, bounded-grace shutdown)
//! - Topic helpers: `Size`, `Calibration`, `Frame` (timestamped)
//! - Pull-based capture-and-publish pipeline

pub mod clock;
pub mod codec;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod publisher;
pub mod queue;
pub mod socket;

pub use clock::TickClock;
pub use codec::{PubCodec, PublishMessage, TOPIC_CALIBRATION, TOPIC_FRAME, TOPIC_SIZE};
pub use error::PublisherError;
pub use metrics::{PublisherMetrics, PublisherSnapshot};
pub use pipeline::{StreamConfig, StreamPipeline};
pub use publisher::{FramePublisher, DEFAULT_PORT};
pub use queue::{SendQueue, SEND_HIGH_WATER_MARK};
pub use socket::PubSocket;
