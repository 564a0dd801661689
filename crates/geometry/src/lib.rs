//! # Geometry
//!
//! Mirror-geometry kernel: plane/ray/line intersection primitives,
//! frustum-corner projection, observer-validity test and focal-length
//! compensation.
//!
//! All functions here are pure and stateless. Degenerate inputs
//! (parallel rays, zero-length segments, coincident cameras) are
//! ordinary `Option::None` results, never errors - callers treat them
//! as "mirror inactive this tick".

mod frustum;
mod plane;
mod validity;

pub use frustum::{plane_corner_intersection, viewport_point, CameraFrustum, PlaneCorners};
pub use plane::{line3d_intersection, mirror_plane_between, Plane, Ray};
pub use validity::{compensation_ratio, is_valid_observer_position};

use nalgebra::Vector3;

/// Shared degeneracy threshold for squared norms and denominators.
pub(crate) const EPS: f32 = 1e-7;

/// Unsigned angle between two vectors in radians, zero when either
/// vector is degenerate (matches the host engine's angle contract).
pub(crate) fn angle_between(a: &Vector3<f32>, b: &Vector3<f32>) -> f32 {
    let denom = (a.norm_squared() * b.norm_squared()).sqrt();
    if denom < EPS {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}
