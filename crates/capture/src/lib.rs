//! # Capture
//!
//! Frame acquisition helpers: pixel-format normalization, integer
//! downsampling for the wire, and deterministic mock sources for
//! running the pipeline without capture hardware or a tracker.

pub mod mock;
pub mod resize;
pub mod sink;

pub use mock::{MockColorSource, MockPoseSource};
pub use resize::{downsample_frame, to_rgb8};
pub use sink::NullRenderSink;
