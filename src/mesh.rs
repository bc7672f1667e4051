//! Mesh types consumed by the rasterizer

use crate::color::Color;
use crate::math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// A vertex with position, normal, texture coordinate, and base color
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vertex {
    pub pos: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub color: Color,
}

impl Vertex {
    pub fn new(pos: Vec3, normal: Vec3, uv: Vec2, color: Color) -> Self {
        Self { pos, normal, uv, color }
    }

    pub fn from_pos(x: f32, y: f32, z: f32) -> Self {
        Self {
            pos: Vec3::new(x, y, z),
            normal: Vec3::ZERO,
            uv: Vec2::default(),
            color: Color::WHITE,
        }
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            normal: Vec3::ZERO,
            uv: Vec2::default(),
            color: Color::WHITE,
        }
    }
}

/// A triangle face (indices into a vertex array)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Face {
    pub v0: usize,
    pub v1: usize,
    pub v2: usize,
    pub texture_slot: Option<usize>,
}

impl Face {
    pub fn new(v0: usize, v1: usize, v2: usize) -> Self {
        Self {
            v0,
            v1,
            v2,
            texture_slot: None,
        }
    }

    pub fn with_texture(v0: usize, v1: usize, v2: usize, texture_slot: usize) -> Self {
        Self {
            v0,
            v1,
            v2,
            texture_slot: Some(texture_slot),
        }
    }
}

/// Build faces from a flat triangle index list. Trailing indices that do
/// not form a full triangle are ignored.
pub fn faces_from_indices(indices: &[usize], texture_slot: Option<usize>) -> Vec<Face> {
    indices
        .chunks_exact(3)
        .map(|tri| Face {
            v0: tri[0],
            v1: tri[1],
            v2: tri[2],
            texture_slot,
        })
        .collect()
}

/// Create a unit test cube, faces wound counter-clockwise seen from outside
pub fn create_test_cube() -> (Vec<Vertex>, Vec<Face>) {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();

    let positions = [
        // Front face (+Z)
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
        // Back face (-Z)
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        // Top face (+Y)
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, 1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(1.0, 1.0, -1.0),
        // Bottom face (-Y)
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        // Right face (+X)
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        // Left face (-X)
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
        Vec3::new(-1.0, 1.0, -1.0),
    ];

    let normals = [
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.0, 0.0, -1.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, -1.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(-1.0, 0.0, 0.0),
    ];

    let uvs = [
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
    ];

    for face_idx in 0..6 {
        let base = face_idx * 4;
        let normal = normals[face_idx];

        for i in 0..4 {
            vertices.push(Vertex {
                pos: positions[base + i],
                normal,
                uv: uvs[i],
                color: Color::WHITE,
            });
        }

        faces.push(Face::with_texture(base, base + 1, base + 2, 0));
        faces.push(Face::with_texture(base, base + 2, base + 3, 0));
    }

    (vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faces_from_indices_drops_partial_triangle() {
        let faces = faces_from_indices(&[0, 1, 2, 3, 4, 5, 6], None);
        assert_eq!(faces.len(), 2);
        assert_eq!((faces[1].v0, faces[1].v1, faces[1].v2), (3, 4, 5));
    }

    #[test]
    fn test_cube_winding_is_outward() {
        let (vertices, faces) = create_test_cube();
        for face in &faces {
            let a = vertices[face.v0].pos;
            let b = vertices[face.v1].pos;
            let c = vertices[face.v2].pos;
            let geometric = (b - a).cross(c - a).normalize();
            let stored = vertices[face.v0].normal;
            assert!(geometric.dot(stored) > 0.9, "face wound against its normal");
        }
    }
}
