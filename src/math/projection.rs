// Copyright @yucwang 2026

use super::constants::{ Float, Vector2f, Vector3f, Vector4f };
use super::transform::Transform;
use crate::core::error::{ Result, TurretError };

/// Window rectangle in pixels: origin plus extent.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub x: Float,
    pub y: Float,
    pub width: Float,
    pub height: Float,
}

impl Viewport {
    pub fn new(x: Float, y: Float, width: Float, height: Float) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_size(width: Float, height: Float) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn aspect(&self) -> Float {
        if self.height != 0.0 { self.width / self.height } else { 1.0 }
    }

    pub fn check(&self) -> Result<()> {
        if self.width > 0.0 && self.height > 0.0 {
            Ok(())
        } else {
            Err(TurretError::InvalidViewport { width: self.width, height: self.height })
        }
    }
}

/// Object space to window coordinates. x and y are pixels inside the
/// viewport, z is window depth in [0, 1] for points between the clip planes.
pub fn project(point: &Vector3f, transform: &Transform, viewport: &Viewport) -> Result<Vector3f> {
    viewport.check()?;
    let clip = transform.apply_homogeneous(&point.push(1.0));
    if clip.w == 0.0 {
        return Err(TurretError::ZeroW);
    }
    let ndc = clip.xyz() / clip.w;

    Ok(Vector3f::new(viewport.x + viewport.width * (ndc.x + 1.0) * 0.5,
                     viewport.y + viewport.height * (ndc.y + 1.0) * 0.5,
                     (ndc.z + 1.0) * 0.5))
}

/// Inverse of [`project`].
pub fn unproject(window: &Vector3f, transform: &Transform, viewport: &Viewport) -> Result<Vector3f> {
    viewport.check()?;
    let ndc = Vector4f::new((window.x - viewport.x) / viewport.width * 2.0 - 1.0,
                            (window.y - viewport.y) / viewport.height * 2.0 - 1.0,
                            window.z * 2.0 - 1.0,
                            1.0);
    let obj = transform.inv_apply_homogeneous(&ndc);
    if obj.w == 0.0 {
        return Err(TurretError::ZeroW);
    }
    Ok(obj.xyz() / obj.w)
}

/// Maps a window-space displacement to an object-space vector at the depth
/// of the object-space origin.
pub fn unproject_vector(delta: &Vector2f, transform: &Transform, viewport: &Viewport) -> Result<Vector3f> {
    let origin = project(&Vector3f::zeros(), transform, viewport)?;
    let moved = Vector3f::new(origin.x + delta.x, origin.y + delta.y, origin.z);

    let start = unproject(&origin, transform, viewport)?;
    let end = unproject(&moved, transform, viewport)?;
    Ok(end - start)
}
