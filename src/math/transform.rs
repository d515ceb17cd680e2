// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f, Vector4f, Matrix4f };
use crate::core::error::{ Result, TurretError };

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
    inv_matrix: Matrix4f
}

impl Default for Transform {
    fn default() -> Self {
        Self { matrix: Matrix4f::identity(),
               inv_matrix: Matrix4f::identity() }
    }
}

impl Transform {
    pub fn new(matrix: Matrix4f) -> Result<Self> {
        let inv_matrix = matrix.try_inverse().ok_or(TurretError::SingularTransform)?;
        if inv_matrix.iter().any(|v| !v.is_finite()) {
            return Err(TurretError::SingularTransform);
        }
        Ok(Self { matrix, inv_matrix })
    }

    pub fn identity() -> Self {
        Self::default()
    }

    pub fn translate(offset: &Vector3f) -> Self {
        Self { matrix: Matrix4f::new_translation(offset),
               inv_matrix: Matrix4f::new_translation(&-offset) }
    }

    /// Right-handed rotation about +Y.
    pub fn rotate_y(angle: Float) -> Self {
        let axis = Vector3f::y() * angle;
        Self { matrix: Matrix4f::new_rotation(axis),
               inv_matrix: Matrix4f::new_rotation(-axis) }
    }

    /// Right-handed rotation about +Z.
    pub fn rotate_z(angle: Float) -> Self {
        let axis = Vector3f::z() * angle;
        Self { matrix: Matrix4f::new_rotation(axis),
               inv_matrix: Matrix4f::new_rotation(-axis) }
    }

    // Post-multiplication, as on a matrix stack: `other` acts on points
    // before `self` does.
    pub fn then(&self, other: &Transform) -> Self {
        Self { matrix: self.matrix * other.matrix,
               inv_matrix: other.inv_matrix * self.inv_matrix }
    }

    pub fn inverse(&self) -> Self {
        Self { matrix: self.inv_matrix,
               inv_matrix: self.matrix }
    }

    pub fn matrix(&self) -> &Matrix4f {
        &self.matrix
    }

    pub fn inv_matrix(&self) -> &Matrix4f {
        &self.inv_matrix
    }

    pub fn apply_homogeneous(&self, p: &Vector4f) -> Vector4f {
        self.matrix * p
    }

    pub fn inv_apply_homogeneous(&self, p: &Vector4f) -> Vector4f {
        self.inv_matrix * p
    }

    pub fn apply_point(&self, p: Vector3f) -> Vector3f {
        divide_w(&(self.matrix * p.push(1.0)))
    }

    pub fn apply_vector(&self, v: Vector3f) -> Vector3f {
        self.matrix.fixed_slice::<3, 3>(0, 0) * v
    }

    // Normal transformation is different from point transformation.
    // Before transformation, we have n^Tx = 0
    // After transformation, we have (Sn)^T(Mx) = 0
    // Then, we will get: S = (M^{-1})^T
    pub fn apply_normal(&self, n: Vector3f) -> Vector3f {
        self.inv_matrix.fixed_slice::<3, 3>(0, 0).transpose() * n
    }

    pub fn inv_apply_point(&self, p: Vector3f) -> Vector3f {
        divide_w(&(self.inv_matrix * p.push(1.0)))
    }

    pub fn inv_apply_vector(&self, v: Vector3f) -> Vector3f {
        self.inv_matrix.fixed_slice::<3, 3>(0, 0) * v
    }
}

// Affine chains keep w == 1; the divide only matters for projective matrices.
fn divide_w(p: &Vector4f) -> Vector3f {
    if p.w != 0.0 && p.w != 1.0 {
        p.xyz() / p.w
    } else {
        p.xyz()
    }
}
