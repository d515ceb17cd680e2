use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;
use wavefront_obj::{obj, ParseError};

use crate::core::error::TurretError;
use crate::core::tangent_frame::TangentSpace;
use crate::math::constants::{ Float, Vector3f };
use crate::shapes::triangle_mesh::MeshBuffers;

#[derive(Debug, Error)]
pub enum ObjLoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(ParseError),
    #[error("invalid mesh: {0}")]
    Mesh(#[from] TurretError),
}

impl From<ParseError> for ObjLoadError {
    fn from(err: ParseError) -> Self {
        ObjLoadError::Parse(err)
    }
}

/// Vertex buffers of a model together with the tangent space the
/// normal-mapped shader needs as extra attributes.
#[derive(Debug, Clone)]
pub struct LoadedMesh {
    pub buffers: MeshBuffers,
    pub tangents: TangentSpace,
}

pub fn load_obj_from_str<S: AsRef<str>>(input: S) -> Result<obj::ObjSet, ParseError> {
    let triangulated = triangulate_faces(input.as_ref());
    obj::parse(triangulated)
}

pub fn load_obj_from_file<P: AsRef<Path>>(path: P) -> Result<obj::ObjSet, ObjLoadError> {
    let data = fs::read_to_string(path)?;
    let obj_set = load_obj_from_str(data)?;
    Ok(obj_set)
}

pub fn load_mesh_from_str<S: AsRef<str>>(input: S) -> Result<LoadedMesh, ObjLoadError> {
    let obj_set = load_obj_from_str(input)?;
    let buffers = mesh_from_obj_set(&obj_set)?;
    let tangents = buffers.compute_tangents()?;
    Ok(LoadedMesh { buffers, tangents })
}

pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<LoadedMesh, ObjLoadError> {
    let path = path.as_ref();
    log::info!("Loading mesh from: {}.", path.display());
    let obj_set = load_obj_from_file(path)?;
    let buffers = mesh_from_obj_set(&obj_set)?;
    let tangents = buffers.compute_tangents()?;
    let mesh = LoadedMesh { buffers, tangents };
    log::info!("Mesh loaded, {} vertices, {} triangles.",
               mesh.buffers.vertex_count(), mesh.buffers.triangle_count());
    Ok(mesh)
}

/// Flattens every object of the set into one single-index vertex stream.
/// Each distinct position/uv/normal corner becomes one vertex. File
/// normals are rescaled to unit length, corners without a normal get the
/// smoothed face normal of their position, and corners without a uv get
/// (0, 0).
pub fn mesh_from_obj_set(obj_set: &obj::ObjSet) -> Result<MeshBuffers, TurretError> {
    let mut mesh = MeshBuffers::default();

    for object in &obj_set.objects {
        let smooth_normals = face_normals_per_position(object);
        let mut corners: HashMap<obj::VTNIndex, u32> = HashMap::new();

        for geom in &object.geometry {
            for shape in &geom.shapes {
                let (a, b, c) = match &shape.primitive {
                    obj::Primitive::Triangle(a, b, c) => (*a, *b, *c),
                    _ => continue,
                };
                for corner in [a, b, c].iter() {
                    let index = match corners.get(corner) {
                        Some(&i) => i,
                        None => {
                            let i = mesh.vertex_count() as u32;
                            push_corner(&mut mesh, object, &smooth_normals, corner)?;
                            corners.insert(*corner, i);
                            i
                        }
                    };
                    mesh.indices.push(index);
                }
            }
        }
    }

    mesh.validate()?;
    Ok(mesh)
}

fn push_corner(mesh: &mut MeshBuffers,
               object: &obj::Object,
               smooth_normals: &[Vector3f],
               corner: &obj::VTNIndex) -> Result<(), TurretError> {
    let (vi, ti, ni) = *corner;
    let v = object.vertices.get(vi)
        .ok_or(TurretError::OutOfRange { index: vi, vertex_count: object.vertices.len() })?;
    mesh.positions.extend_from_slice(&[v.x as Float, v.y as Float, v.z as Float]);

    match ti {
        Some(ti) => {
            let t = object.tex_vertices.get(ti)
                .ok_or(TurretError::OutOfRange { index: ti, vertex_count: object.tex_vertices.len() })?;
            mesh.uvs.extend_from_slice(&[t.u as Float, t.v as Float]);
        }
        None => mesh.uvs.extend_from_slice(&[0.0, 0.0]),
    }

    let normal = match ni {
        Some(ni) => {
            let n = object.normals.get(ni)
                .ok_or(TurretError::OutOfRange { index: ni, vertex_count: object.normals.len() })?;
            let n = Vector3f::new(n.x as Float, n.y as Float, n.z as Float);
            let len = n.norm();
            if len > 0.0 { n / len } else { Vector3f::zeros() }
        }
        None => smooth_normals[vi],
    };
    mesh.normals.extend_from_slice(normal.as_slice());
    Ok(())
}

// Area-weighted sum of the geometric normals around each position.
fn face_normals_per_position(object: &obj::Object) -> Vec<Vector3f> {
    let mut sums = vec![Vector3f::zeros(); object.vertices.len()];
    let position = |i: usize| {
        object.vertices.get(i).map(|v| Vector3f::new(v.x as Float, v.y as Float, v.z as Float))
    };
    for geom in &object.geometry {
        for shape in &geom.shapes {
            if let obj::Primitive::Triangle(a, b, c) = &shape.primitive {
                if let (Some(p0), Some(p1), Some(p2)) = (position(a.0), position(b.0), position(c.0)) {
                    let n = (p1 - p0).cross(&(p2 - p0));
                    for &i in &[a.0, b.0, c.0] {
                        sums[i] += n;
                    }
                }
            }
        }
    }
    sums.iter()
        .map(|n| {
            let len = n.norm();
            if len > 0.0 { n / len } else { Vector3f::zeros() }
        })
        .collect()
}

fn triangulate_faces(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 4);
    for line in input.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("f ") || trimmed.starts_with("f\t") {
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts.len() > 4 {
                let base = parts[1];
                for i in 2..(parts.len() - 1) {
                    out.push_str("f ");
                    out.push_str(base);
                    out.push(' ');
                    out.push_str(parts[i]);
                    out.push(' ');
                    out.push_str(parts[i + 1]);
                    out.push('\n');
                }
                continue;
            }
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
