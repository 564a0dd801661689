//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Coordinate Model
//! - Right-handed camera frame: +Z forward, +X right, +Y up
//! - Positions in meters (world) / physical sensor units (intrinsics)
//! - Timestamps are 100 ns ticks since the Unix epoch

mod blueprint;
mod capturer;
mod capturer_id;
mod error;
mod frame;
mod pose;
mod render;
mod settings;

pub use blueprint::*;
pub use capturer::*;
pub use capturer_id::CapturerId;
pub use error::*;
pub use frame::*;
pub use pose::*;
pub use render::*;
pub use settings::*;
