//! # Compositor
//!
//! Mirror compositor: owns one registration per capturer, reconciles
//! the live capturer list every tick, and drives the geometry kernel
//! to produce quad geometry + composite parameters for the external
//! renderer.
//!
//! No ambient singletons: the host owns one `MirrorCompositor` and
//! passes it wherever it is needed.

mod compositor;
mod registry;

pub use compositor::{MirrorCompositor, TickSummary};
pub use registry::{CapturerRegistry, MirrorState, ReconcileReport, Registration};
