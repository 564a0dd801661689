//! Deterministic stand-ins for the capture device and the tracker.
//!
//! Used by the demo pipeline and the integration tests: the color
//! source emits gradient frames, the pose source orbits the observer
//! around the origin and reports calibration after a warm-up period.

use std::collections::BTreeMap;

use bytes::Bytes;
use nalgebra::{Matrix4, Vector3};

use contracts::{CapturerId, ColorFrame, FrameSource, PixelFormat, Pose, PoseSource};

/// Gradient frame generator with a per-frame rolling blue channel,
/// so consecutive frames are distinguishable on the wire.
pub struct MockColorSource {
    width: u32,
    height: u32,
    frame_index: u64,
}

impl MockColorSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_index: 0,
        }
    }

    pub fn frames_produced(&self) -> u64 {
        self.frame_index
    }
}

impl FrameSource for MockColorSource {
    fn name(&self) -> &str {
        "mock-color"
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn next_frame(&mut self) -> Option<ColorFrame> {
        let (w, h) = (self.width as usize, self.height as usize);
        let blue = (self.frame_index % 256) as u8;
        let mut data = Vec::with_capacity(w * h * 3);
        for y in 0..h {
            for x in 0..w {
                data.push((x * 255 / w.max(1)) as u8);
                data.push((y * 255 / h.max(1)) as u8);
                data.push(blue);
            }
        }
        self.frame_index += 1;

        Some(ColorFrame {
            width: self.width,
            height: self.height,
            format: PixelFormat::Rgb8,
            data: Bytes::from(data),
        })
    }
}

/// Observer orbiting the origin in the XZ plane, always facing in.
///
/// `advance` moves the simulation one tick; the trait getters are
/// pure reads of the current tick.
pub struct MockPoseSource {
    capturers: BTreeMap<CapturerId, Pose>,
    orbit_radius: f32,
    angular_step: f32,
    calibration_after: u64,
    tick: u64,
}

impl MockPoseSource {
    pub fn new(orbit_radius: f32, angular_step: f32) -> Self {
        Self {
            capturers: BTreeMap::new(),
            orbit_radius,
            angular_step,
            calibration_after: 10,
            tick: 0,
        }
    }

    /// Ticks before `calibration` starts reporting a matrix.
    pub fn with_calibration_after(mut self, ticks: u64) -> Self {
        self.calibration_after = ticks;
        self
    }

    pub fn with_capturer(mut self, id: CapturerId, pose: Pose) -> Self {
        self.capturers.insert(id, pose);
        self
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }
}

impl PoseSource for MockPoseSource {
    fn observer_pose(&self) -> Option<Pose> {
        let angle = self.tick as f32 * self.angular_step;
        let position = nalgebra::Point3::new(
            self.orbit_radius * angle.sin(),
            0.0,
            self.orbit_radius * angle.cos(),
        );
        Some(Pose::looking_along(position, -position.coords, Vector3::y()))
    }

    fn capturer_pose(&self, id: &CapturerId) -> Option<Pose> {
        self.capturers.get(id).copied()
    }

    fn calibration(&self) -> Option<Matrix4<f32>> {
        if self.tick >= self.calibration_after {
            // Fixed observer-to-device offset: slightly below and in
            // front of the tracked target.
            Some(Matrix4::new_translation(&Vector3::new(0.0, -0.05, 0.02)))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_are_consistent_and_distinct() {
        let mut source = MockColorSource::new(8, 4);
        let a = source.next_frame().unwrap();
        let b = source.next_frame().unwrap();

        assert!(a.is_consistent());
        assert_eq!(a.format, PixelFormat::Rgb8);
        assert_ne!(a.data, b.data);
        assert_eq!(source.frames_produced(), 2);
    }

    #[test]
    fn test_observer_stays_on_orbit_facing_origin() {
        let mut poses = MockPoseSource::new(3.0, 0.1);
        for _ in 0..25 {
            poses.advance();
            let pose = poses.observer_pose().unwrap();
            assert!((pose.position.coords.norm() - 3.0).abs() < 1e-4);

            let inward = -pose.position.coords.normalize();
            assert!((pose.forward() - inward).norm() < 1e-4);
        }
    }

    #[test]
    fn test_calibration_appears_after_warmup() {
        let mut poses = MockPoseSource::new(2.0, 0.05).with_calibration_after(3);
        assert!(poses.calibration().is_none());

        for _ in 0..3 {
            poses.advance();
        }
        assert!(poses.calibration().is_some());
    }

    #[test]
    fn test_unknown_capturer_has_no_pose() {
        let poses = MockPoseSource::new(2.0, 0.05);
        assert!(poses.capturer_pose(&CapturerId::new("nope")).is_none());
    }
}
