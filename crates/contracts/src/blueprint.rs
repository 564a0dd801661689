//! StreamBlueprint - the parsed runtime configuration
//!
//! The blueprint is what the config loader produces and the rest of
//! the system consumes: network endpoint, stream tuning, mirror
//! defaults, and the static capturer roster.

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::{CameraIntrinsics, CapturerDescriptor, CapturerId, MirrorSettings, PixelFormat, Pose};

/// Pub/sub endpoint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// TCP port the pub socket binds on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds between `Size` re-broadcasts
    #[serde(default = "default_size_broadcast_interval_s")]
    pub size_broadcast_interval_s: f32,
}

fn default_port() -> u16 {
    55555
}

fn default_size_broadcast_interval_s() -> f32 {
    3.0
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            size_broadcast_interval_s: default_size_broadcast_interval_s(),
        }
    }
}

/// Frame stream tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSettings {
    /// Integer downsampling factor applied before publishing
    #[serde(default = "default_downsample_factor")]
    pub downsample_factor: u32,

    /// Wire pixel format (sources are converted to this)
    #[serde(default = "default_pixel_format")]
    pub pixel_format: PixelFormat,
}

fn default_downsample_factor() -> u32 {
    2
}

fn default_pixel_format() -> PixelFormat {
    PixelFormat::Rgb8
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            downsample_factor: default_downsample_factor(),
            pixel_format: default_pixel_format(),
        }
    }
}

/// World position in config form.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionConfig {
    #[serde(default)]
    pub x: f32,

    #[serde(default)]
    pub y: f32,

    #[serde(default)]
    pub z: f32,
}

/// Orientation in config form, degrees.
///
/// Yaw turns about +Y (up), pitch about +X (right), roll about +Z
/// (forward), applied in that order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RotationConfig {
    #[serde(default)]
    pub yaw_deg: f32,

    #[serde(default)]
    pub pitch_deg: f32,

    #[serde(default)]
    pub roll_deg: f32,
}

impl RotationConfig {
    pub fn quaternion(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw_deg.to_radians())
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.pitch_deg.to_radians())
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.roll_deg.to_radians())
    }
}

/// One configured capturer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturerConfig {
    /// Stable capturer id
    pub id: String,

    /// Initial world position
    #[serde(default)]
    pub position: PositionConfig,

    /// Initial world orientation
    #[serde(default)]
    pub rotation: RotationConfig,

    /// Camera intrinsics
    pub intrinsics: CameraIntrinsics,

    /// Disabled capturers keep their slot but render inactive
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl CapturerConfig {
    /// Initial pose built from the config fields.
    pub fn pose(&self) -> Pose {
        Pose::new(
            Point3::new(self.position.x, self.position.y, self.position.z),
            self.rotation.quaternion(),
        )
    }

    /// Live-list descriptor for this capturer.
    pub fn descriptor(&self) -> CapturerDescriptor {
        CapturerDescriptor {
            id: CapturerId::new(&self.id),
            pose: self.pose(),
            intrinsics: self.intrinsics,
            enabled: self.enabled,
        }
    }
}

/// Complete parsed configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StreamBlueprint {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub stream: StreamSettings,

    #[serde(default)]
    pub mirror: MirrorSettings,

    #[serde(default)]
    pub capturers: Vec<CapturerConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let bp = StreamBlueprint::default();
        assert_eq!(bp.network.port, 55555);
        assert_eq!(bp.network.size_broadcast_interval_s, 3.0);
        assert_eq!(bp.stream.downsample_factor, 2);
        assert_eq!(bp.stream.pixel_format, PixelFormat::Rgb8);
        assert!(bp.capturers.is_empty());
    }

    #[test]
    fn test_yaw_turns_forward_axis() {
        let config = CapturerConfig {
            id: "cam".into(),
            position: PositionConfig::default(),
            rotation: RotationConfig {
                yaw_deg: 90.0,
                ..Default::default()
            },
            intrinsics: CameraIntrinsics::new(640.0, 480.0, 500.0),
            enabled: true,
        };
        let fwd = config.pose().forward();

        assert!((fwd.x - 1.0).abs() < 1e-5);
        assert!(fwd.z.abs() < 1e-5);
    }

    #[test]
    fn test_descriptor_carries_identity() {
        let config = CapturerConfig {
            id: "main-camera".into(),
            position: PositionConfig::default(),
            rotation: RotationConfig::default(),
            intrinsics: CameraIntrinsics::new(640.0, 480.0, 500.0),
            enabled: false,
        };
        let descriptor = config.descriptor();

        assert_eq!(descriptor.id.as_str(), "main-camera");
        assert!(!descriptor.enabled);
    }
}
