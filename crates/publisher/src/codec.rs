//! Wire codec for the publish protocol.
//!
//! One logical message is a topic frame followed by a payload frame,
//! each prefixed with a u32 little-endian byte length:
//!
//! ```text
//! [topic_len: u32 LE][topic bytes][payload_len: u32 LE][payload bytes]
//! ```
//!
//! Both frames are encoded back to back, so a subscriber always sees
//! them as one unit (at-most-once delivery: either the whole message
//! arrives or none of it does).

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::PublisherError;

/// Stream resolution announcements: 2 x i32 LE (width, height).
pub const TOPIC_SIZE: &str = "Size";

/// Extrinsic calibration: 16 x f32 LE, row-major 4x4 matrix.
pub const TOPIC_CALIBRATION: &str = "Calibration";

/// Continuous video frames: 8-byte LE tick timestamp + pixel buffer.
pub const TOPIC_FRAME: &str = "Frame";

/// Upper bound on a topic frame.
pub const MAX_TOPIC_LEN: usize = 256;

/// Upper bound on a payload frame (generous for raw video).
pub const MAX_PAYLOAD_LEN: usize = 64 * 1024 * 1024;

/// One topic-tagged message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishMessage {
    /// Topic label identifying the logical stream
    pub topic: String,

    /// Raw payload (already timestamp-prefixed for `Frame`)
    pub payload: Bytes,
}

impl PublishMessage {
    /// Create a message.
    pub fn new(topic: impl Into<String>, payload: Bytes) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }

    /// Encoded size on the wire.
    pub fn wire_len(&self) -> usize {
        8 + self.topic.len() + self.payload.len()
    }
}

/// Length-prefixed two-frame codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct PubCodec;

impl Encoder<PublishMessage> for PubCodec {
    type Error = PublisherError;

    fn encode(&mut self, item: PublishMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.topic.len() > MAX_TOPIC_LEN {
            return Err(PublisherError::FrameTooLarge {
                size: item.topic.len(),
                limit: MAX_TOPIC_LEN,
            });
        }
        if item.payload.len() > MAX_PAYLOAD_LEN {
            return Err(PublisherError::FrameTooLarge {
                size: item.payload.len(),
                limit: MAX_PAYLOAD_LEN,
            });
        }

        dst.reserve(item.wire_len());
        dst.put_u32_le(item.topic.len() as u32);
        dst.put_slice(item.topic.as_bytes());
        dst.put_u32_le(item.payload.len() as u32);
        dst.put_slice(&item.payload);
        Ok(())
    }
}

impl Decoder for PubCodec {
    type Item = PublishMessage;
    type Error = PublisherError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < 4 {
            return Ok(None);
        }

        let topic_len = u32::from_le_bytes(src[0..4].try_into().expect("4-byte slice")) as usize;
        if topic_len > MAX_TOPIC_LEN {
            return Err(PublisherError::FrameTooLarge {
                size: topic_len,
                limit: MAX_TOPIC_LEN,
            });
        }
        if src.len() < 4 + topic_len + 4 {
            return Ok(None);
        }

        let payload_off = 4 + topic_len;
        let payload_len = u32::from_le_bytes(
            src[payload_off..payload_off + 4]
                .try_into()
                .expect("4-byte slice"),
        ) as usize;
        if payload_len > MAX_PAYLOAD_LEN {
            return Err(PublisherError::FrameTooLarge {
                size: payload_len,
                limit: MAX_PAYLOAD_LEN,
            });
        }
        let total = payload_off + 4 + payload_len;
        if src.len() < total {
            // Make room for the rest of the message in one go
            src.reserve(total - src.len());
            return Ok(None);
        }

        let mut message = src.split_to(total);
        message.advance(4);
        let topic_bytes = message.split_to(topic_len);
        let topic = std::str::from_utf8(&topic_bytes)
            .map_err(|e| PublisherError::MalformedFrame(format!("topic not utf-8: {e}")))?
            .to_string();
        message.advance(4);

        Ok(Some(PublishMessage {
            topic,
            payload: message.freeze(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(msg: PublishMessage) -> PublishMessage {
        let mut codec = PubCodec;
        let mut buf = BytesMut::new();
        codec.encode(msg, &mut buf).unwrap();
        codec.decode(&mut buf).unwrap().unwrap()
    }

    #[test]
    fn test_round_trip() {
        let msg = PublishMessage::new(TOPIC_FRAME, Bytes::from(vec![1u8, 2, 3, 4]));
        let decoded = round_trip(msg.clone());
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_empty_payload() {
        let msg = PublishMessage::new(TOPIC_SIZE, Bytes::new());
        assert_eq!(round_trip(msg.clone()), msg);
    }

    #[test]
    fn test_partial_input_yields_none() {
        let mut codec = PubCodec;
        let mut buf = BytesMut::new();
        codec
            .encode(
                PublishMessage::new(TOPIC_FRAME, Bytes::from(vec![0u8; 100])),
                &mut buf,
            )
            .unwrap();

        // Feed only part of the message
        let mut partial = buf.split_to(buf.len() - 10);
        std::mem::swap(&mut partial, &mut buf);

        assert!(codec.decode(&mut buf).unwrap().is_none());

        // Complete it
        buf.unsplit(partial);
        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded.payload.len(), 100);
    }

    #[test]
    fn test_two_back_to_back_messages() {
        let mut codec = PubCodec;
        let mut buf = BytesMut::new();
        codec
            .encode(PublishMessage::new("a", Bytes::from_static(b"one")), &mut buf)
            .unwrap();
        codec
            .encode(PublishMessage::new("b", Bytes::from_static(b"two")), &mut buf)
            .unwrap();

        assert_eq!(codec.decode(&mut buf).unwrap().unwrap().topic, "a");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap().topic, "b");
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_oversized_topic_rejected() {
        let mut codec = PubCodec;
        let mut buf = BytesMut::new();
        let msg = PublishMessage::new("t".repeat(MAX_TOPIC_LEN + 1), Bytes::new());
        assert!(codec.encode(msg, &mut buf).is_err());
    }
}
