//! Per-tick mirror update: geometry kernel calls + sink emission.

use nalgebra::Vector3;
use tracing::{debug, warn};

use contracts::{
    CapturerDescriptor, CompositeParams, MirrorQuad, MirrorSettings, Pose, RenderSink,
};
use geometry::{
    line3d_intersection, mirror_plane_between, plane_corner_intersection, viewport_point,
    CameraFrustum, Ray,
};

use crate::registry::{CapturerRegistry, MirrorState};

const EPS: f32 = 1e-7;

/// What one tick produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Mirrors that emitted a quad this tick
    pub active: usize,

    /// Registered mirrors that were hidden this tick
    pub inactive: usize,

    /// Registrations created this tick
    pub added: usize,

    /// Registrations destroyed this tick
    pub removed: usize,
}

/// Drives every registered mirror once per host tick.
///
/// Owned explicitly by the host; pure with respect to everything but
/// its own registry.
#[derive(Debug)]
pub struct MirrorCompositor {
    registry: CapturerRegistry,
}

impl MirrorCompositor {
    /// Create a compositor with the given default mirror settings.
    pub fn new(defaults: MirrorSettings) -> Self {
        Self {
            registry: CapturerRegistry::new(defaults),
        }
    }

    /// Registration access.
    pub fn registry(&self) -> &CapturerRegistry {
        &self.registry
    }

    /// Mutable registration access (per-capturer settings edits).
    pub fn registry_mut(&mut self) -> &mut CapturerRegistry {
        &mut self.registry
    }

    /// One tick: reconcile registrations, then update every mirror.
    pub fn tick(
        &mut self,
        observer: &Pose,
        capturers: &[CapturerDescriptor],
        sink: &mut dyn RenderSink,
    ) -> TickSummary {
        let report = self.registry.reconcile(capturers, sink);
        let mut summary = TickSummary {
            added: report.added.len(),
            removed: report.removed.len(),
            ..TickSummary::default()
        };

        for capturer in capturers {
            let Some(registration) = self.registry.get(&capturer.id) else {
                // Allocation failed during reconcile; retried next tick.
                continue;
            };
            let settings = registration.settings;
            let was_active = registration.is_active();

            let active = update_mirror(observer, capturer, &settings, sink);

            if let Some(registration) = self.registry.get_mut(&capturer.id) {
                registration.state = if active {
                    MirrorState::Active
                } else {
                    MirrorState::Inactive
                };
            }
            if active != was_active {
                debug!(capturer = %capturer.id, active, "mirror state changed");
            }

            if active {
                summary.active += 1;
            } else {
                summary.inactive += 1;
            }
        }

        summary
    }

    /// Release every render target (teardown path, safe to repeat).
    pub fn shutdown(&mut self, sink: &mut dyn RenderSink) {
        self.registry.release_all(sink);
    }
}

/// Update one mirror; returns whether it is active this tick.
fn update_mirror(
    observer: &Pose,
    capturer: &CapturerDescriptor,
    settings: &MirrorSettings,
    sink: &mut dyn RenderSink,
) -> bool {
    if !capturer.enabled {
        sink.deactivate(&capturer.id);
        return false;
    }

    // Mirror plane bisecting observer and capturer
    let Some(plane) = mirror_plane_between(&observer.position, &capturer.pose.position) else {
        sink.deactivate(&capturer.id);
        return false;
    };

    let mut frustum = CameraFrustum::new(capturer.pose, capturer.intrinsics);
    frustum.update_compensation(&observer.position);

    let Some(corners) = plane_corner_intersection(&frustum, &plane) else {
        sink.deactivate(&capturer.id);
        return false;
    };

    // Diagonal intersection as the UV weighting reference
    let Some(center) = line3d_intersection(&corners.lt, &corners.rb, &corners.rt, &corners.lb)
    else {
        sink.deactivate(&capturer.id);
        return false;
    };

    let d_lt = (corners.lt - center).norm();
    let d_rt = (corners.rt - center).norm();
    let d_rb = (corners.rb - center).norm();
    let d_lb = (corners.lb - center).norm();
    if d_lt < EPS || d_rt < EPS || d_rb < EPS || d_lb < EPS {
        // Zero-length diagonal: no usable perspective weights
        sink.deactivate(&capturer.id);
        return false;
    }

    // Perspective-correction weight per corner: for each corner, the
    // sum of its diagonal distances normalized by the opposite
    // corner's distance to the center.
    let w_lt = (d_lt + d_rb) / d_rb;
    let w_rt = (d_rt + d_lb) / d_lb;
    let w_rb = (d_rb + d_lt) / d_lt;
    let w_lb = (d_lb + d_rt) / d_rt;

    let uvs = [
        Vector3::new(0.0, w_lt, w_lt),
        Vector3::new(w_rt, w_rt, w_rt),
        Vector3::new(w_rb, 0.0, w_rb),
        Vector3::new(0.0, 0.0, w_lb),
    ];

    // Gaze-following crop window
    let crop = if settings.cropping_enabled {
        let gaze = Ray::new(observer.position, observer.forward());
        plane
            .raycast(&gaze)
            .map(|t| gaze.point_at(t))
            .and_then(|hit| viewport_point(&frustum, &hit))
            .map(|screen| contracts::CropWindow::centered(screen, settings.crop_size))
    } else {
        None
    };

    // Corners into observer-local space, LT/RT/RB/LB order preserved
    let quad = MirrorQuad {
        corners: corners.as_array().map(|p| observer.world_to_local(&p)),
        uvs,
    };
    let params = CompositeParams {
        crop,
        transparency: settings.transparency,
        border_size: settings.border_size,
        compensation_ratio: frustum.ratio(),
    };

    if let Err(e) = sink.submit(&capturer.id, &quad, &params) {
        // Renderer trouble deactivates this mirror only, never the tick.
        warn!(capturer = %capturer.id, error = %e, "render sink rejected mirror");
        sink.deactivate(&capturer.id);
        return false;
    }

    true
}
