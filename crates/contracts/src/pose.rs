//! Pose - world transform of observers and capturers
//!
//! Right-handed camera convention: +Z forward, +X right, +Y up.

use nalgebra::{Isometry3, Matrix4, Point3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Position + orientation of a camera in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// World position (meters)
    pub position: Point3<f32>,

    /// World orientation
    pub rotation: UnitQuaternion<f32>,
}

impl Pose {
    /// Create a pose from position and rotation.
    pub fn new(position: Point3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self { position, rotation }
    }

    /// Identity pose at the world origin.
    pub fn identity() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Pose at `position` rotated to look along `forward` with the given up hint.
    ///
    /// Falls back to identity rotation when `forward` is degenerate.
    pub fn looking_along(position: Point3<f32>, forward: Vector3<f32>, up: Vector3<f32>) -> Self {
        if forward.norm_squared() < f32::EPSILON {
            return Self {
                position,
                rotation: UnitQuaternion::identity(),
            };
        }
        let rotation = UnitQuaternion::face_towards(&forward, &up);
        Self { position, rotation }
    }

    /// Local-to-world isometry.
    pub fn isometry(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.position.coords), self.rotation)
    }

    /// Local-to-world homogeneous matrix.
    pub fn matrix(&self) -> Matrix4<f32> {
        self.isometry().to_homogeneous()
    }

    /// Transform a world-space point into this pose's local frame.
    pub fn world_to_local(&self, world: &Point3<f32>) -> Point3<f32> {
        self.isometry().inverse_transform_point(world)
    }

    /// Transform a local-space point into world space.
    pub fn local_to_world(&self, local: &Point3<f32>) -> Point3<f32> {
        self.isometry().transform_point(local)
    }

    /// Forward axis (+Z) in world space.
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation * Vector3::z()
    }

    /// Right axis (+X) in world space.
    pub fn right(&self) -> Vector3<f32> {
        self.rotation * Vector3::x()
    }

    /// Up axis (+Y) in world space.
    pub fn up(&self) -> Vector3<f32> {
        self.rotation * Vector3::y()
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}
