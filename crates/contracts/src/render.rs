//! RenderSink trait - Compositor output interface
//!
//! The actual renderer (quad meshes, materials, blits) is an external
//! collaborator; the compositor only hands it geometry and composite
//! parameters.

use nalgebra::{Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::{CapturerId, ContractError};

/// Opaque handle to a renderer-owned target (texture + material).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetHandle(pub u64);

/// Mirror quad in observer-local space.
///
/// Corner order is LT, RT, RB, LB; the matching UVs are projective
/// 3-component weights for perspective-correct texture mapping on a
/// two-triangle quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorQuad {
    /// Corners in observer-local space: LT, RT, RB, LB
    pub corners: [Point3<f32>; 4],

    /// Projective UV weight per corner, same order
    pub uvs: [Vector3<f32>; 4],
}

/// Symmetric crop rectangle in normalized view coordinates, clamped
/// to [0, 1] per component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropWindow {
    pub top_left: Vector2<f32>,
    pub top_right: Vector2<f32>,
    pub bottom_left: Vector2<f32>,
    pub bottom_right: Vector2<f32>,
}

impl CropWindow {
    /// Build a symmetric window of half-size `crop_size` around a
    /// normalized center point, clamped to [0, 1].
    pub fn centered(center: Vector2<f32>, crop_size: f32) -> Self {
        let clamp = |v: f32| v.clamp(0.0, 1.0);
        Self {
            top_left: Vector2::new(clamp(center.x - crop_size), clamp(center.y - crop_size)),
            top_right: Vector2::new(clamp(center.x + crop_size), clamp(center.y - crop_size)),
            bottom_left: Vector2::new(clamp(center.x - crop_size), clamp(center.y + crop_size)),
            bottom_right: Vector2::new(clamp(center.x + crop_size), clamp(center.y + crop_size)),
        }
    }
}

/// Composite material parameters emitted alongside the quad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeParams {
    /// Crop window (None = cropping disabled this tick)
    pub crop: Option<CropWindow>,

    /// Main texture transparency [0, 1]
    pub transparency: f32,

    /// Mirror border size [0, 0.5]
    pub border_size: f32,

    /// Current focal-length compensation ratio (>= 1)
    pub compensation_ratio: f32,
}

/// Renderer sink trait.
///
/// Target lifecycle is owned by the sink: the compositor requests one
/// target per registration and releases it exactly once on removal.
pub trait RenderSink {
    /// Allocate a render target for a newly registered capturer.
    ///
    /// # Errors
    /// Returns `ContractError::RenderTarget` on allocation failure.
    fn create_target(
        &mut self,
        id: &CapturerId,
        width: u32,
        height: u32,
    ) -> Result<TargetHandle, ContractError>;

    /// Release a previously created target. Must be idempotent on the
    /// sink side only for unknown handles; the compositor never
    /// releases the same handle twice.
    fn release_target(&mut self, id: &CapturerId, handle: TargetHandle);

    /// Submit an active mirror for this tick.
    fn submit(
        &mut self,
        id: &CapturerId,
        quad: &MirrorQuad,
        params: &CompositeParams,
    ) -> Result<(), ContractError>;

    /// Hide the mirror for this tick (inactive state).
    fn deactivate(&mut self, id: &CapturerId);
}
