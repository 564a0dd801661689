//! Camera frustum and frustum-corner projection.

use nalgebra::{Point3, Vector2};

use contracts::{CameraIntrinsics, Pose};

use crate::plane::{Plane, Ray};
use crate::validity::compensation_ratio;
use crate::EPS;

/// Frustum of a capturing camera: pose + intrinsics + the current
/// focal-length compensation ratio.
///
/// Immutable per frame apart from the ratio, which the compositor
/// updates once per tick from the observer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrustum {
    /// World pose of the camera
    pub pose: Pose,

    /// Physical intrinsics
    pub intrinsics: CameraIntrinsics,

    /// Current compensation ratio (>= 1)
    ratio: f32,
}

impl CameraFrustum {
    /// Create a frustum with no compensation applied.
    pub fn new(pose: Pose, intrinsics: CameraIntrinsics) -> Self {
        Self {
            pose,
            intrinsics,
            ratio: 1.0,
        }
    }

    /// Current compensation ratio.
    #[inline]
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Focal length widened by the compensation ratio.
    #[inline]
    pub fn effective_focal_length(&self) -> f32 {
        self.intrinsics.focal_length * self.ratio
    }

    /// Recompute the compensation ratio for the given observer.
    pub fn update_compensation(&mut self, observer_world: &Point3<f32>) {
        self.ratio = compensation_ratio(self, observer_world);
    }

    /// The four corner rays (LT, RT, RB, LB) through the effective
    /// sensor corners, in world space.
    pub fn corner_rays(&self) -> [Ray; 4] {
        let half_w = self.intrinsics.effective_width() / 2.0;
        let half_h = self.intrinsics.effective_height() / 2.0;
        let f = self.effective_focal_length();

        let locals = [
            Point3::new(-half_w / f, half_h / f, 1.0),  // LT
            Point3::new(half_w / f, half_h / f, 1.0),   // RT
            Point3::new(half_w / f, -half_h / f, 1.0),  // RB
            Point3::new(-half_w / f, -half_h / f, 1.0), // LB
        ];

        let origin = self.pose.position;
        locals.map(|local| {
            let world = self.pose.local_to_world(&local);
            Ray::new(origin, world - origin)
        })
    }
}

/// The four frustum-corner hits on a plane, LT/RT/RB/LB order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneCorners {
    pub lt: Point3<f32>,
    pub rt: Point3<f32>,
    pub rb: Point3<f32>,
    pub lb: Point3<f32>,
}

impl PlaneCorners {
    /// Corners as an array in LT, RT, RB, LB order.
    pub fn as_array(&self) -> [Point3<f32>; 4] {
        [self.lt, self.rt, self.rb, self.lb]
    }

    /// Map every corner through `f`, preserving order.
    pub fn map(&self, f: impl Fn(&Point3<f32>) -> Point3<f32>) -> Self {
        Self {
            lt: f(&self.lt),
            rt: f(&self.rt),
            rb: f(&self.rb),
            lb: f(&self.lb),
        }
    }
}

/// Intersect the four frustum-corner rays with a plane.
///
/// Fails when any of the rays misses (parallel to the plane or the
/// plane lies behind the camera). On success the corners come back in
/// world space; use [`PlaneCorners::map`] with the capturer pose for
/// camera-local output.
pub fn plane_corner_intersection(frustum: &CameraFrustum, plane: &Plane) -> Option<PlaneCorners> {
    let rays = frustum.corner_rays();

    let mut hits = [Point3::origin(); 4];
    for (hit, ray) in hits.iter_mut().zip(rays.iter()) {
        let t = plane.raycast(ray)?;
        *hit = ray.point_at(t);
    }

    Some(PlaneCorners {
        lt: hits[0],
        rt: hits[1],
        rb: hits[2],
        lb: hits[3],
    })
}

/// Project a world point into the capturer's normalized view
/// coordinates (0..1 per axis inside the frame, origin bottom-left).
///
/// Uses the raw focal length - the compensation ratio only affects
/// corner projection, not where a world point lands on the sensor.
/// `None` when the point is at or behind the camera.
pub fn viewport_point(frustum: &CameraFrustum, world: &Point3<f32>) -> Option<Vector2<f32>> {
    let local = frustum.pose.world_to_local(world);
    if local.z < EPS {
        return None;
    }

    let f = frustum.intrinsics.focal_length;
    let u = 0.5 + f * local.x / (local.z * frustum.intrinsics.sensor_width);
    let v = 0.5 + f * local.y / (local.z * frustum.intrinsics.sensor_height);
    Some(Vector2::new(u, v))
}
