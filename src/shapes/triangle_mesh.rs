// Copyright @yucwang 2023

use crate::core::error::{ Result, TurretError };
use crate::core::tangent_frame::{ self, TangentSpace };
use crate::math::constants::{ Float, Vector3f };

use std::vec::Vec;

/// Indexed triangle mesh in the flat layout vertex buffers are uploaded in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshBuffers {
    pub positions: Vec<Float>,
    pub normals:   Vec<Float>,
    pub uvs:       Vec<Float>,
    pub indices:   Vec<u32>,
}

impl MeshBuffers {
    pub fn new(positions: Vec<Float>, normals: Vec<Float>,
               uvs: Vec<Float>, indices: Vec<u32>) -> Result<Self> {
        let mesh = Self { positions, normals, uvs, indices };
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn validate(&self) -> Result<()> {
        let n = self.vertex_count();
        if self.positions.len() != n * 3 || self.normals.len() != n * 3 || self.uvs.len() != n * 2 {
            return Err(TurretError::MismatchedBuffers(format!(
                "{} position, {} normal and {} uv floats do not describe the same vertices",
                self.positions.len(), self.normals.len(), self.uvs.len())));
        }
        if self.indices.len() % 3 != 0 {
            return Err(TurretError::MismatchedBuffers(
                format!("index count {} is not a multiple of 3", self.indices.len())));
        }
        match self.indices.iter().find(|&&i| i as usize >= n) {
            Some(&bad) => Err(TurretError::OutOfRange { index: bad as usize, vertex_count: n }),
            None => Ok(()),
        }
    }

    pub fn compute_tangents(&self) -> Result<TangentSpace> {
        tangent_frame::compute_tangents(&self.positions, &self.normals, &self.uvs, &self.indices)
    }

    pub fn position(&self, vertex: usize) -> Vector3f {
        Vector3f::new(self.positions[3 * vertex],
                      self.positions[3 * vertex + 1],
                      self.positions[3 * vertex + 2])
    }

    pub fn normal(&self, vertex: usize) -> Vector3f {
        Vector3f::new(self.normals[3 * vertex],
                      self.normals[3 * vertex + 1],
                      self.normals[3 * vertex + 2])
    }

    /// Axis-aligned bounds as (min, max), `None` for a mesh without vertices.
    pub fn bounding_box(&self) -> Option<(Vector3f, Vector3f)> {
        if self.vertex_count() == 0 {
            return None;
        }
        let first = self.position(0);
        let mut p_min = first;
        let mut p_max = first;
        for i in 1..self.vertex_count() {
            let p = self.position(i);
            p_min = p_min.inf(&p);
            p_max = p_max.sup(&p);
        }
        Some((p_min, p_max))
    }
}
