//! Observer-validity test and focal-length compensation.
//!
//! A mirror only behaves like a physical reflection while the
//! observer stays inside the capturing camera's effective reflective
//! cone. The cone's half-angle blends the horizontal and vertical
//! field-of-view envelopes depending on where the observer sits
//! around the camera's forward axis (an ellipse-like interpolation).

use nalgebra::{Point3, Vector3};

use crate::frustum::CameraFrustum;
use crate::{angle_between, EPS};

use std::f32::consts::PI;

/// Lateral angle of the observer around the forward axis.
///
/// Projects the camera-local observer position onto the lateral plane
/// (depth zeroed) and measures the angle to the nearer of the
/// right/left axes. Symmetric about forward, result in [0, PI/2].
fn lateral_phi(local: &Point3<f32>) -> f32 {
    let lateral = Vector3::new(local.x, local.y, 0.0);
    let to_right = angle_between(&Vector3::x(), &lateral);
    let to_left = angle_between(&-Vector3::x(), &lateral);
    to_right.min(to_left)
}

/// Test whether the observer lies inside the capturer's effective
/// reflective cone.
pub fn is_valid_observer_position(frustum: &CameraFrustum, observer_world: &Point3<f32>) -> bool {
    let vfov = frustum.intrinsics.vertical_fov();
    let hfov = frustum.intrinsics.horizontal_fov();

    let a = (hfov / 2.0).tan();
    let b = (vfov / 2.0).tan();

    let local = frustum.pose.world_to_local(observer_world);
    let phi = lateral_phi(&local);

    // Blended half-angle between the horizontal and vertical FOV envelopes
    let gamma = 2.0 * (phi.cos() * a + phi.sin() * b).atan();

    let theta_critical = PI - gamma;

    let to_forward = angle_between(&local.coords, &Vector3::z());

    to_forward < theta_critical / 2.0
}

/// Maximal field of view (radians) for which the observer position
/// would still be valid.
fn fov_for_valid_mirror(frustum: &CameraFrustum, observer_world: &Point3<f32>) -> f32 {
    let local = frustum.pose.world_to_local(observer_world);
    let theta_critical = angle_between(&local.coords, &Vector3::z()) * 2.0;
    PI - theta_critical
}

/// Focal-length compensation ratio for the given observer position.
///
/// 1.0 while the observer is valid; otherwise the ratio that widens
/// the effective focal length so the sensor maps onto the largest
/// still-valid field of view, blended by the same lateral weighting
/// as the validity test. Always >= 1 and continuous through the
/// validity boundary.
pub fn compensation_ratio(frustum: &CameraFrustum, observer_world: &Point3<f32>) -> f32 {
    if is_valid_observer_position(frustum, observer_world) {
        return 1.0;
    }

    let local = frustum.pose.world_to_local(observer_world);
    let phi = lateral_phi(&local);

    let fov0 = fov_for_valid_mirror(frustum, observer_world);
    let tan_half = (fov0 / 2.0).tan().max(EPS);

    let w = frustum.intrinsics.sensor_width;
    let h = frustum.intrinsics.sensor_height;

    let adjusted_focal = phi.sin() * (h / (2.0 * tan_half)) + phi.cos() * (w / (2.0 * tan_half));

    (adjusted_focal / frustum.intrinsics.focal_length).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CameraIntrinsics, Pose};
    use nalgebra::{Point3, UnitQuaternion, Vector3};

    /// Square sensor, f = h/2 gives a 90 degree FOV both ways.
    fn square_90deg_frustum() -> CameraFrustum {
        CameraFrustum::new(
            Pose::identity(),
            CameraIntrinsics::new(100.0, 100.0, 50.0),
        )
    }

    /// Observer direction at `angle_deg` off forward in the x/z plane,
    /// at the given distance.
    fn observer_at(angle_deg: f32, distance: f32) -> Point3<f32> {
        let rad = angle_deg.to_radians();
        Point3::new(rad.sin() * distance, 0.0, rad.cos() * distance)
    }

    #[test]
    fn test_boresight_always_valid() {
        let frustum = square_90deg_frustum();
        for distance in [0.1_f32, 1.0, 10.0, 1000.0] {
            let observer = Point3::new(0.0, 0.0, distance);
            assert!(is_valid_observer_position(&frustum, &observer));
            assert_eq!(compensation_ratio(&frustum, &observer), 1.0);
        }
    }

    #[test]
    fn test_validity_boundary_square_90() {
        // 90 degree FOV both ways: gamma = 90 deg at any phi, so the
        // critical half-angle is (180 - 90) / 2 = 45 degrees.
        let frustum = square_90deg_frustum();

        assert!(is_valid_observer_position(&frustum, &observer_at(44.0, 2.0)));
        assert!(!is_valid_observer_position(&frustum, &observer_at(46.0, 2.0)));
    }

    #[test]
    fn test_ratio_continuous_at_boundary() {
        let frustum = square_90deg_frustum();

        // Just inside: exactly 1. Just outside: above but near 1.
        let inside = compensation_ratio(&frustum, &observer_at(44.9, 2.0));
        let outside = compensation_ratio(&frustum, &observer_at(45.1, 2.0));

        assert_eq!(inside, 1.0);
        assert!(outside >= 1.0);
        assert!(
            (outside - 1.0).abs() < 0.05,
            "ratio jumped at the boundary: {outside}"
        );
    }

    #[test]
    fn test_ratio_grows_with_angle() {
        let frustum = square_90deg_frustum();

        let near = compensation_ratio(&frustum, &observer_at(50.0, 2.0));
        let far = compensation_ratio(&frustum, &observer_at(70.0, 2.0));

        assert!(near >= 1.0);
        assert!(far > near, "wider angle must compensate more: {near} vs {far}");
    }

    #[test]
    fn test_validity_rotated_camera() {
        // Camera yawed 90 degrees: forward is +X, so a +X observer is valid
        let pose = Pose::new(
            Point3::origin(),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f32::consts::FRAC_PI_2),
        );
        let frustum = CameraFrustum::new(pose, CameraIntrinsics::new(100.0, 100.0, 50.0));

        assert!(is_valid_observer_position(&frustum, &Point3::new(3.0, 0.0, 0.0)));
        assert!(!is_valid_observer_position(&frustum, &Point3::new(0.0, 0.0, 3.0)));
    }
}
