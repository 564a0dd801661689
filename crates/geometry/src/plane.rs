//! Plane/ray primitives and the skew-line midpoint intersection.

use nalgebra::{Point3, Unit, Vector3};

use crate::EPS;

/// Infinite plane given by a point and a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal
    pub normal: Unit<Vector3<f32>>,

    /// Any point on the plane
    pub point: Point3<f32>,
}

impl Plane {
    /// Create a plane from a unit normal and a point on it.
    pub fn new(normal: Unit<Vector3<f32>>, point: Point3<f32>) -> Self {
        Self { normal, point }
    }

    /// Signed distance from a point to the plane.
    pub fn signed_distance(&self, p: &Point3<f32>) -> f32 {
        self.normal.dot(&(p - self.point))
    }

    /// Intersect a ray with the plane.
    ///
    /// Returns the ray parameter `t` with `t > 0`, or `None` when the
    /// ray is parallel to the plane or the plane lies behind the ray
    /// origin.
    pub fn raycast(&self, ray: &Ray) -> Option<f32> {
        let vdot = self.normal.dot(&ray.direction);
        if vdot.abs() < EPS {
            return None;
        }
        let t = -self.signed_distance(&ray.origin) / vdot;
        if t > 0.0 {
            Some(t)
        } else {
            None
        }
    }
}

/// Ray from an origin along a (not necessarily unit) direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a ray.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t` along the ray.
    pub fn point_at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

/// Mirror plane between an observer and a capturing camera: midpoint
/// of the two positions with the bisecting normal pointing at the
/// observer.
///
/// Returns `None` when the two positions coincide (degenerate normal).
pub fn mirror_plane_between(
    observer_pos: &Point3<f32>,
    capturer_pos: &Point3<f32>,
) -> Option<Plane> {
    let midpoint = Point3::from((observer_pos.coords + capturer_pos.coords) / 2.0);
    let normal = observer_pos - midpoint;
    if normal.norm_squared() < EPS {
        return None;
    }
    Some(Plane::new(Unit::new_normalize(normal), midpoint))
}

/// Closest-approach midpoint of two 3D line segments A1-A2 and B1-B2.
///
/// Classical least-distance closed form (Paul Bourke). Fails on
/// degenerate segments or parallel lines; on success returns the
/// midpoint of the two closest points, used as the quad's
/// diagonal-intersection reference.
pub fn line3d_intersection(
    a1: &Point3<f32>,
    a2: &Point3<f32>,
    b1: &Point3<f32>,
    b2: &Point3<f32>,
) -> Option<Point3<f32>> {
    let p13 = a1 - b1;
    let p43 = b2 - b1;

    if p43.norm_squared() < EPS {
        return None;
    }
    let p21 = a2 - a1;
    if p21.norm_squared() < EPS {
        return None;
    }

    let d1343 = p13.dot(&p43);
    let d4321 = p43.dot(&p21);
    let d1321 = p13.dot(&p21);
    let d4343 = p43.dot(&p43);
    let d2121 = p21.dot(&p21);

    let denom = d2121 * d4343 - d4321 * d4321;
    if denom.abs() < EPS {
        return None;
    }
    let numer = d1343 * d4321 - d1321 * d4343;

    let mua = numer / denom;
    let mub = (d1343 + d4321 * mua) / d4343;

    let on_a = a1 + p21 * mua;
    let on_b = b1 + p43 * mub;

    Some(Point3::from((on_a.coords + on_b.coords) / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raycast_head_on() {
        let plane = Plane::new(
            Unit::new_normalize(Vector3::new(0.0, 0.0, -1.0)),
            Point3::new(0.0, 0.0, 5.0),
        );
        let ray = Ray::new(Point3::origin(), Vector3::z());

        let t = plane.raycast(&ray).unwrap();
        assert!((t - 5.0).abs() < 1e-5);
        assert!((ray.point_at(t).z - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_raycast_parallel_fails() {
        let plane = Plane::new(Unit::new_normalize(Vector3::z()), Point3::new(0.0, 0.0, 5.0));
        let ray = Ray::new(Point3::origin(), Vector3::x());
        assert!(plane.raycast(&ray).is_none());
    }

    #[test]
    fn test_raycast_behind_origin_fails() {
        let plane = Plane::new(Unit::new_normalize(Vector3::z()), Point3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Point3::origin(), Vector3::z());
        assert!(plane.raycast(&ray).is_none());
    }

    #[test]
    fn test_line3d_crossing_segments() {
        // Diagonals of the unit square in the z=0 plane cross at (0.5, 0.5)
        let center = line3d_intersection(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 1.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        )
        .unwrap();

        assert!((center - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_line3d_skew_segments_midpoint() {
        // Two skew lines separated by 1 along z; midpoint sits between
        let center = line3d_intersection(
            &Point3::new(-1.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, -1.0, 1.0),
            &Point3::new(0.0, 1.0, 1.0),
        )
        .unwrap();

        assert!((center - Point3::new(0.0, 0.0, 0.5)).norm() < 1e-5);
    }

    #[test]
    fn test_line3d_parallel_fails() {
        assert!(line3d_intersection(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
            &Point3::new(1.0, 1.0, 0.0),
        )
        .is_none());
    }

    #[test]
    fn test_line3d_degenerate_segment_fails() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!(line3d_intersection(&p, &p, &Point3::origin(), &Point3::new(1.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_mirror_plane_midpoint_and_normal() {
        let observer = Point3::new(0.0, 0.0, 4.0);
        let capturer = Point3::new(0.0, 0.0, 0.0);

        let plane = mirror_plane_between(&observer, &capturer).unwrap();
        assert!((plane.point - Point3::new(0.0, 0.0, 2.0)).norm() < 1e-6);
        // Normal points towards the observer
        assert!((plane.normal.into_inner() - Vector3::z()).norm() < 1e-6);
    }

    #[test]
    fn test_mirror_plane_coincident_fails() {
        let p = Point3::new(1.0, 1.0, 1.0);
        assert!(mirror_plane_between(&p, &p).is_none());
    }
}
