// Copyright @yucwang 2026

use crate::core::error::{ Result, TurretError };
use crate::math::constants::{ Float, Vector2f, Vector3f };

/// Per-vertex tangent space, laid out like the position buffer
/// (three floats per vertex).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TangentSpace {
    pub tangents: Vec<Float>,
    pub bitangents: Vec<Float>,
    /// Triangles skipped because their UV area is zero.
    pub degenerate_triangles: usize,
    /// Vertices left with a zero tangent after orthogonalization.
    pub zero_tangents: usize,
}

impl TangentSpace {
    pub fn vertex_count(&self) -> usize {
        self.tangents.len() / 3
    }

    pub fn tangent(&self, vertex: usize) -> Vector3f {
        read_vec3(&self.tangents, vertex)
    }

    pub fn bitangent(&self, vertex: usize) -> Vector3f {
        read_vec3(&self.bitangents, vertex)
    }
}

/// Solves the UV-gradient system of one triangle:
///
///   e1 = du1 * T + dv1 * B
///   e2 = du2 * T + dv2 * B
///
/// Returns `None` when the UV triangle has zero area.
pub fn triangle_tangent(e1: &Vector3f, e2: &Vector3f,
                        duv1: &Vector2f, duv2: &Vector2f) -> Option<(Vector3f, Vector3f)> {
    let denom = duv1.x * duv2.y - duv2.x * duv1.y;
    if denom == 0.0 {
        return None;
    }
    let r = 1.0 / denom;
    let tangent = (e1 * duv2.y - e2 * duv1.y) * r;
    let bitangent = (e2 * duv1.x - e1 * duv2.x) * r;
    Some((tangent, bitangent))
}

/// Removes the component of `v` along `n` and normalizes what is left.
/// A vector with nothing left stays zero.
pub fn orthonormalize_against(v: &Vector3f, n: &Vector3f) -> Vector3f {
    let ortho = v - n * n.dot(v);
    let len = ortho.norm();
    if len > 0.0 {
        ortho / len
    } else {
        Vector3f::zeros()
    }
}

/// Accumulates per-triangle tangents onto shared vertices, then makes each
/// vertex's tangent and bitangent unit length and orthogonal to its normal.
///
/// Tangent and bitangent are orthogonalized against the normal separately,
/// so they are not guaranteed to be orthogonal to each other.
pub fn compute_tangents(positions: &[Float],
                        normals: &[Float],
                        uvs: &[Float],
                        indices: &[u32]) -> Result<TangentSpace> {
    let vertex_count = check_buffers(positions, normals, uvs, indices)?;

    let mut tan_accum = vec![Vector3f::zeros(); vertex_count];
    let mut bitan_accum = vec![Vector3f::zeros(); vertex_count];
    let mut degenerate_triangles = 0;

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);

        let p0 = read_vec3(positions, i0);
        let e1 = read_vec3(positions, i1) - p0;
        let e2 = read_vec3(positions, i2) - p0;

        let uv0 = read_vec2(uvs, i0);
        let duv1 = read_vec2(uvs, i1) - uv0;
        let duv2 = read_vec2(uvs, i2) - uv0;

        match triangle_tangent(&e1, &e2, &duv1, &duv2) {
            Some((t, b)) => {
                for &idx in &[i0, i1, i2] {
                    tan_accum[idx] += t;
                    bitan_accum[idx] += b;
                }
            }
            None => degenerate_triangles += 1,
        }
    }

    let mut tangents = Vec::with_capacity(vertex_count * 3);
    let mut bitangents = Vec::with_capacity(vertex_count * 3);
    let mut zero_tangents = 0;

    for i in 0..vertex_count {
        let n = read_vec3(normals, i);
        let t = orthonormalize_against(&tan_accum[i], &n);
        let b = orthonormalize_against(&bitan_accum[i], &n);
        if t == Vector3f::zeros() {
            zero_tangents += 1;
        }
        tangents.extend_from_slice(t.as_slice());
        bitangents.extend_from_slice(b.as_slice());
    }

    if degenerate_triangles > 0 || zero_tangents > 0 {
        log::debug!("Tangent generation skipped {} degenerate triangles, {} of {} vertices have no tangent.",
                    degenerate_triangles, zero_tangents, vertex_count);
    }

    Ok(TangentSpace {
        tangents,
        bitangents,
        degenerate_triangles,
        zero_tangents,
    })
}

fn check_buffers(positions: &[Float], normals: &[Float],
                 uvs: &[Float], indices: &[u32]) -> Result<usize> {
    if positions.len() % 3 != 0 {
        return Err(TurretError::MismatchedBuffers(
            format!("position buffer length {} is not a multiple of 3", positions.len())));
    }
    let vertex_count = positions.len() / 3;
    if normals.len() != positions.len() {
        return Err(TurretError::MismatchedBuffers(
            format!("{} normal floats for {} vertices", normals.len(), vertex_count)));
    }
    if uvs.len() != vertex_count * 2 {
        return Err(TurretError::MismatchedBuffers(
            format!("{} uv floats for {} vertices", uvs.len(), vertex_count)));
    }
    if indices.len() % 3 != 0 {
        return Err(TurretError::MismatchedBuffers(
            format!("index count {} is not a multiple of 3", indices.len())));
    }
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(TurretError::OutOfRange { index: bad as usize, vertex_count });
    }
    Ok(vertex_count)
}

fn read_vec3(buf: &[Float], i: usize) -> Vector3f {
    Vector3f::new(buf[3 * i], buf[3 * i + 1], buf[3 * i + 2])
}

fn read_vec2(buf: &[Float], i: usize) -> Vector2f {
    Vector2f::new(buf[2 * i], buf[2 * i + 1])
}
