// Copyright @yucwang 2026

use crate::core::error::{ Result, TurretError };
use crate::math::constants::{ Float, Matrix4f, Vector2f, Vector3f };
use crate::math::projection::{ self, Viewport };
use crate::math::transform::Transform;

use nalgebra::{ Isometry3, Point3 };

/// Camera and window state handed to input handling and the render loop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewContext {
    view: Transform,
    projection: Transform,
    viewport: Viewport,
}

impl ViewContext {
    pub fn new(view: Transform, projection: Transform, viewport: Viewport) -> Self {
        Self { view, projection, viewport }
    }

    pub fn look_at(origin: &Vector3f,
                   target: &Vector3f,
                   up: &Vector3f,
                   fov_y_radians: Float,
                   near_clip: Float,
                   far_clip: Float,
                   viewport: Viewport) -> Result<Self> {
        viewport.check()?;
        check_frustum(fov_y_radians, near_clip, far_clip)?;
        let view = Isometry3::look_at_rh(&Point3::from(*origin), &Point3::from(*target), up);
        let view = Transform::new(view.to_homogeneous())?;
        let projection = Transform::new(
            Matrix4f::new_perspective(viewport.aspect(), fov_y_radians, near_clip, far_clip))?;
        Ok(Self::new(view, projection, viewport))
    }

    pub fn view(&self) -> &Transform {
        &self.view
    }

    pub fn projection(&self) -> &Transform {
        &self.projection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn resize(&mut self, viewport: Viewport) -> Result<()> {
        viewport.check()?;
        let m = self.projection.matrix();
        // Keep the field of view, only the aspect changes.
        let proj = nalgebra::Perspective3::from_matrix_unchecked(*m);
        let rebuilt = Matrix4f::new_perspective(viewport.aspect(), proj.fovy(), proj.znear(), proj.zfar());
        self.projection = Transform::new(rebuilt)?;
        self.viewport = viewport;
        Ok(())
    }

    pub fn model_view_projection(&self, model: &Transform) -> Transform {
        self.projection.then(&self.view).then(model)
    }

    /// Window position of a point given in the model's space.
    pub fn to_screen(&self, model: &Transform, point: &Vector3f) -> Result<Vector3f> {
        projection::project(point, &self.model_view_projection(model), &self.viewport)
    }

    /// Translation in the model's space that follows a mouse drag at the
    /// depth of the model origin.
    pub fn drag_translation(&self, model: &Transform, delta: &Vector2f) -> Result<Vector3f> {
        projection::unproject_vector(delta, &self.model_view_projection(model), &self.viewport)
    }

    /// Rotation axis in the model's space for a drag: perpendicular to both
    /// the drag and the view direction. `None` for a zero drag.
    pub fn drag_rotation_axis(&self, model: &Transform, delta: &Vector2f) -> Result<Option<Vector3f>> {
        let along = self.drag_translation(model, delta)?;
        let mv = self.view.then(model);
        let eye = mv.inv_apply_point(Vector3f::zeros());
        let axis = eye.cross(&along);
        let len = axis.norm();
        if len > 0.0 {
            Ok(Some(axis / len))
        } else {
            Ok(None)
        }
    }
}

// A flat frustum has no inverse; nalgebra asserts on it instead of failing.
fn check_frustum(fov_y_radians: Float, near_clip: Float, far_clip: Float) -> Result<()> {
    if fov_y_radians > 0.0 && near_clip > 0.0 && far_clip > near_clip {
        Ok(())
    } else {
        Err(TurretError::SingularTransform)
    }
}
