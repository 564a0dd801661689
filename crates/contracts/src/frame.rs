//! ColorFrame and the external source traits
//!
//! The capture device and pose tracker are external collaborators; the
//! core consumes them through these traits, one pull per tick.

use bytes::Bytes;
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

use crate::{CapturerId, Pose};

/// Pixel format of a raw color buffer.
///
/// `Rgb8` is the canonical wire format; sources delivering the other
/// layouts are converted before publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
    Bgra8,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => 4,
        }
    }
}

/// A raw color buffer, packed interleaved, row-major.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorFrame {
    /// Frame width (pixels)
    pub width: u32,

    /// Frame height (pixels)
    pub height: u32,

    /// Pixel layout
    pub format: PixelFormat,

    /// Pixel data (zero-copy)
    pub data: Bytes,
}

impl ColorFrame {
    /// Expected byte length for the announced dimensions and format.
    #[inline]
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }

    /// Whether the payload length matches the announced dimensions.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.expected_len()
    }
}

/// Color-frame source (capture device).
///
/// Pull-based: the pipeline asks for at most one frame per tick.
/// `None` means no new frame this tick; the source going away entirely
/// is surfaced by the host, not by this trait.
pub trait FrameSource {
    /// Source name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Native resolution of produced frames (width, height)
    fn resolution(&self) -> (u32, u32);

    /// Pull the next frame, if one is available this tick
    fn next_frame(&mut self) -> Option<ColorFrame>;
}

/// Pose source (tracking system).
///
/// Provides world transforms for the observer and each capturer, and
/// the observer-to-capture-device extrinsic once tracking has locked.
pub trait PoseSource {
    /// Current observer (viewing camera) pose, if tracked
    fn observer_pose(&self) -> Option<Pose>;

    /// Current pose of the given capturer, if tracked
    fn capturer_pose(&self, id: &CapturerId) -> Option<Pose>;

    /// Extrinsic calibration matrix (row-major consumer layout),
    /// available once the tracking target has been acquired
    fn calibration(&self) -> Option<Matrix4<f32>>;
}
