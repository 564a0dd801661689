//! Capturer descriptors - intrinsics and the live capturer list entry
//!
//! Intrinsics mirror a physical camera model: sensor size in sensor
//! units and a focal length in the same units.

use serde::{Deserialize, Serialize};

use crate::{CapturerId, Pose};

/// Guard band subtracted from the sensor extent (1 unit per side).
/// The offset increases stability at the sensor edge during
/// focal-length compensation.
pub const SENSOR_GUARD_BAND: f32 = 2.0;

/// Physical camera intrinsics of a capturing camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Full sensor width (sensor units)
    pub sensor_width: f32,

    /// Full sensor height (sensor units)
    pub sensor_height: f32,

    /// Focal length (sensor units)
    pub focal_length: f32,
}

impl CameraIntrinsics {
    /// Create intrinsics from sensor size and focal length.
    pub fn new(sensor_width: f32, sensor_height: f32, focal_length: f32) -> Self {
        Self {
            sensor_width,
            sensor_height,
            focal_length,
        }
    }

    /// Sensor width minus the guard band.
    #[inline]
    pub fn effective_width(&self) -> f32 {
        self.sensor_width - SENSOR_GUARD_BAND
    }

    /// Sensor height minus the guard band.
    #[inline]
    pub fn effective_height(&self) -> f32 {
        self.sensor_height - SENSOR_GUARD_BAND
    }

    /// Width / height aspect ratio of the full sensor.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.sensor_width / self.sensor_height
    }

    /// Vertical field of view (radians), from the full sensor.
    #[inline]
    pub fn vertical_fov(&self) -> f32 {
        2.0 * (self.sensor_height / (2.0 * self.focal_length)).atan()
    }

    /// Horizontal field of view (radians), from the full sensor.
    #[inline]
    pub fn horizontal_fov(&self) -> f32 {
        2.0 * ((self.vertical_fov() / 2.0).tan() * self.aspect()).atan()
    }
}

/// One entry of the live capturer list, reconciled each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturerDescriptor {
    /// Stable identity assigned at registration
    pub id: CapturerId,

    /// Current world pose
    pub pose: Pose,

    /// Camera intrinsics
    pub intrinsics: CameraIntrinsics,

    /// Disabled capturers keep their registration but render inactive
    pub enabled: bool,
}

impl CapturerDescriptor {
    /// Create an enabled descriptor.
    pub fn new(id: impl Into<CapturerId>, pose: Pose, intrinsics: CameraIntrinsics) -> Self {
        Self {
            id: id.into(),
            pose,
            intrinsics,
            enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_band_applied_per_side() {
        let intr = CameraIntrinsics::new(640.0, 480.0, 500.0);
        assert_eq!(intr.effective_width(), 638.0);
        assert_eq!(intr.effective_height(), 478.0);
    }

    #[test]
    fn test_square_sensor_fovs_match() {
        // Square aspect: hfov == vfov
        let intr = CameraIntrinsics::new(100.0, 100.0, 50.0);
        assert!((intr.horizontal_fov() - intr.vertical_fov()).abs() < 1e-6);
        // f = h/2 gives a 90 degree vertical FOV
        assert!((intr.vertical_fov() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
