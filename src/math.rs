//! Vector and matrix math for the software rasterizer

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// 2D Vector (for texture coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Row-major 4x4 matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
    pub rows: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Transform a point, returning homogeneous (x, y, z, w)
    pub fn transform_point(&self, v: Vec3) -> [f32; 4] {
        let r = &self.rows;
        [
            r[0][0] * v.x + r[0][1] * v.y + r[0][2] * v.z + r[0][3],
            r[1][0] * v.x + r[1][1] * v.y + r[1][2] * v.z + r[1][3],
            r[2][0] * v.x + r[2][1] * v.y + r[2][2] * v.z + r[2][3],
            r[3][0] * v.x + r[3][1] * v.y + r[3][2] * v.z + r[3][3],
        ]
    }

    /// Transform a direction by the upper 3x3 only (no translation)
    pub fn transform_dir(&self, v: Vec3) -> Vec3 {
        let r = &self.rows;
        Vec3 {
            x: r[0][0] * v.x + r[0][1] * v.y + r[0][2] * v.z,
            y: r[1][0] * v.x + r[1][1] * v.y + r[1][2] * v.z,
            z: r[2][0] * v.x + r[2][1] * v.y + r[2][2] * v.z,
        }
    }

    pub fn translation(t: Vec3) -> Mat4 {
        Mat4 {
            rows: [
                [1.0, 0.0, 0.0, t.x],
                [0.0, 1.0, 0.0, t.y],
                [0.0, 0.0, 1.0, t.z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn rotation_x(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        Mat4 {
            rows: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, -s, 0.0],
                [0.0, s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn rotation_y(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        Mat4 {
            rows: [
                [c, 0.0, s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [-s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    pub fn rotation_z(angle: f32) -> Mat4 {
        let (s, c) = angle.sin_cos();
        Mat4 {
            rows: [
                [c, -s, 0.0, 0.0],
                [s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Right-handed perspective projection, NDC depth in [-1, 1]
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (fov_y * 0.5).tan();
        let nf = 1.0 / (near - far);
        Mat4 {
            rows: [
                [f / aspect, 0.0, 0.0, 0.0],
                [0.0, f, 0.0, 0.0],
                [0.0, 0.0, (far + near) * nf, 2.0 * far * near * nf],
                [0.0, 0.0, -1.0, 0.0],
            ],
        }
    }

    /// View matrix for a camera at `eye` looking at `target`
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let fwd = (target - eye).normalize();
        let side = fwd.cross(up).normalize();
        let up = side.cross(fwd);
        Mat4 {
            rows: [
                [side.x, side.y, side.z, -side.dot(eye)],
                [up.x, up.y, up.z, -up.dot(eye)],
                [-fwd.x, -fwd.y, -fwd.z, fwd.dot(eye)],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Mat4::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut rows = [[0.0f32; 4]; 4];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = self.rows[i][0] * rhs.rows[0][j]
                    + self.rows[i][1] * rhs.rows[1][j]
                    + self.rows[i][2] * rhs.rows[2][j]
                    + self.rows[i][3] * rhs.rows[3][j];
            }
        }
        Mat4 { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_dot() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < 0.001);
    }

    #[test]
    fn test_vec3_cross() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);
        let c = a.cross(b);
        assert!((c.z - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_mat4_identity_transform() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let [x, y, z, w] = Mat4::IDENTITY.transform_point(v);
        assert_eq!((x, y, z, w), (1.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn test_mat4_translation() {
        let m = Mat4::translation(Vec3::new(1.0, 2.0, 3.0));
        let [x, y, z, w] = m.transform_point(Vec3::ZERO);
        assert_eq!((x, y, z, w), (1.0, 2.0, 3.0, 1.0));
        // Directions ignore translation
        let d = m.transform_dir(Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(d, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_mat4_mul_matches_chained_transform() {
        let a = Mat4::rotation_y(0.7);
        let b = Mat4::translation(Vec3::new(0.0, 0.0, -5.0));
        let v = Vec3::new(1.0, 2.0, 3.0);

        let [bx, by, bz, _] = b.transform_point(v);
        let chained = a.transform_point(Vec3::new(bx, by, bz));
        let combined = (a * b).transform_point(v);

        for i in 0..4 {
            assert!((chained[i] - combined[i]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_perspective_divide_maps_into_ndc() {
        let m = Mat4::perspective(std::f32::consts::FRAC_PI_3, 4.0 / 3.0, 0.1, 100.0);
        // A point in front of the camera (camera looks down -Z)
        let [x, y, z, w] = m.transform_point(Vec3::new(0.0, 0.0, -10.0));
        assert!(w > 0.0);
        let (nx, ny, nz) = (x / w, y / w, z / w);
        assert!(nx.abs() < 1.0 && ny.abs() < 1.0);
        assert!((-1.0..=1.0).contains(&nz));
    }

    #[test]
    fn test_look_at_centers_target() {
        let m = Mat4::look_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::UP);
        let [x, y, z, _] = m.transform_point(Vec3::ZERO);
        assert!(x.abs() < 1e-5 && y.abs() < 1e-5);
        assert!(z < 0.0); // target in front of the camera
    }
}
