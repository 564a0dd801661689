//! Topic-level publisher facade.
//!
//! Wraps [`PubSocket`] with the stream's wire payloads and the
//! fault policy the render loop relies on: publishing never raises.
//! When the underlying transport has terminated, the message that
//! discovers it is dropped and the socket is re-established on the
//! next publish.

use bytes::{BufMut, Bytes, BytesMut};
use nalgebra::Matrix4;
use tracing::{debug, warn};

use contracts::ColorFrame;

use crate::clock::TickClock;
use crate::codec::{PublishMessage, TOPIC_CALIBRATION, TOPIC_FRAME, TOPIC_SIZE};
use crate::error::PublisherError;
use crate::metrics::PublisherSnapshot;
use crate::socket::PubSocket;

/// Default pub/sub port.
pub const DEFAULT_PORT: u16 = 55555;

/// Publishes frames, stream size, and calibration over one pub socket.
pub struct FramePublisher {
    port: u16,
    socket: Option<PubSocket>,
    clock: TickClock,
    ever_bound: bool,
    bound_port: u16,
}

impl FramePublisher {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            socket: None,
            clock: TickClock::new(),
            ever_bound: false,
            bound_port: port,
        }
    }

    /// Bind the pub socket. Idempotent while already bound.
    ///
    /// # Errors
    /// Returns `PublisherError::Bind` when the port is unavailable.
    pub async fn bind(&mut self) -> Result<(), PublisherError> {
        if self.socket.is_some() {
            return Ok(());
        }
        let socket = PubSocket::bind(self.port).await?;
        self.bound_port = socket.local_addr().port();
        self.socket = Some(socket);
        self.ever_bound = true;
        Ok(())
    }

    pub fn is_bound(&self) -> bool {
        self.socket.is_some()
    }

    /// Port the socket is actually bound on (differs from the
    /// requested port only when port 0 was requested).
    pub fn bound_port(&self) -> u16 {
        self.bound_port
    }

    /// Publish a raw topic/payload pair. Never raises: transport
    /// faults drop the current message and schedule a rebind.
    pub async fn publish(&mut self, topic: &str, payload: Bytes) {
        if let Some(socket) = &self.socket {
            if socket.is_terminated() {
                warn!(topic, "publish transport terminated, message dropped");
                self.socket = None;
                return;
            }
            socket.send(PublishMessage::new(topic, payload));
            return;
        }

        if !self.ever_bound {
            debug!(topic, "publish before bind, message dropped");
            return;
        }

        // Lazy re-initialization after a terminated transport.
        match PubSocket::bind(self.port).await {
            Ok(socket) => {
                self.bound_port = socket.local_addr().port();
                socket.send(PublishMessage::new(topic, payload));
                self.socket = Some(socket);
            }
            Err(e) => warn!(topic, error = %e, "publish rebind failed, message dropped"),
        }
    }

    /// Publish one color frame on the `Frame` topic, prefixed with
    /// the capture timestamp in ticks.
    pub async fn publish_frame(&mut self, frame: &ColorFrame) {
        let ticks = self.clock.now_ticks();
        self.publish(TOPIC_FRAME, frame_payload(ticks, &frame.data))
            .await;
    }

    /// Publish stream dimensions on the `Size` topic.
    pub async fn publish_size(&mut self, width: u32, height: u32) {
        self.publish(TOPIC_SIZE, size_payload(width, height)).await;
    }

    /// Publish a 4x4 calibration matrix on the `Calibration` topic.
    pub async fn publish_calibration(&mut self, matrix: &Matrix4<f32>) {
        self.publish(TOPIC_CALIBRATION, calibration_payload(matrix))
            .await;
    }

    /// Metrics of the current socket, when bound.
    pub fn metrics(&self) -> Option<PublisherSnapshot> {
        self.socket.as_ref().map(|s| s.metrics().snapshot())
    }

    /// Release the transport, draining queued messages within the
    /// shutdown grace period. No further rebind happens after this.
    pub async fn shutdown(&mut self) {
        self.ever_bound = false;
        if let Some(socket) = self.socket.take() {
            socket.shutdown().await;
        }
    }
}

/// `Frame` payload: 8-byte LE tick count, then the pixel data.
fn frame_payload(ticks: u64, data: &Bytes) -> Bytes {
    let mut buf = BytesMut::with_capacity(8 + data.len());
    buf.put_u64_le(ticks);
    buf.extend_from_slice(data);
    buf.freeze()
}

/// `Size` payload: width and height as two LE i32 values.
fn size_payload(width: u32, height: u32) -> Bytes {
    let mut buf = BytesMut::with_capacity(8);
    buf.put_i32_le(width as i32);
    buf.put_i32_le(height as i32);
    buf.freeze()
}

/// `Calibration` payload: 16 LE f32 values, row-major.
fn calibration_payload(matrix: &Matrix4<f32>) -> Bytes {
    let mut buf = BytesMut::with_capacity(64);
    for row in 0..4 {
        for col in 0..4 {
            buf.put_f32_le(matrix[(row, col)]);
        }
    }
    buf.freeze()
}
