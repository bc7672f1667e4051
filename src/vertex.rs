//! Vertex processor: transform, snap, light, and precompute the affine
//! warp factor for one mesh vertex.

use crate::color::Color;
use crate::config::RenderConfig;
use crate::light::{shade_intensity, Light};
use crate::math::{Mat4, Vec3};
use crate::mesh::Vertex;

/// A vertex after transform, ready for rasterization. Transient: rebuilt
/// every draw call, never cached across frames.
#[derive(Debug, Clone, Copy)]
pub struct ProcessedVertex {
    /// x/y in render-buffer pixel space, z is NDC depth in [-1, 1]
    pub screen: Vec3,
    /// World-space position (lighting only)
    pub world: Vec3,
    /// World-space unit normal
    pub normal: Vec3,
    /// Base color, pre-lighting
    pub color: Color,
    /// Texture coordinates, premultiplied by `affine`
    pub u: f32,
    pub v: f32,
    /// Affine warp factor; interpolation divides it back out
    pub affine: f32,
    /// Precomputed diffuse intensity in [0, 1]
    pub light: f32,
}

/// Transform one mesh vertex into screen space.
///
/// Pure function of its inputs, so per-vertex results can be computed
/// once per draw call and shared by every triangle using the index.
pub fn process_vertex(
    vertex: &Vertex,
    mvp: &Mat4,
    model: &Mat4,
    lights: &[Light],
    config: &RenderConfig,
    width: usize,
    height: usize,
) -> ProcessedVertex {
    let [cx, cy, cz, w] = mvp.transform_point(vertex.pos);

    // Perspective divide. A near-zero w is degenerate; keep the undivided
    // coordinates instead of dividing into infinity and let culling drop
    // the triangle.
    let (mut nx, mut ny, nz) = if w.abs() > 1e-6 {
        (cx / w, cy / w, cz / w)
    } else {
        (cx, cy, cz)
    };

    // Coarse grid quantization in NDC reproduces low-precision transform
    // hardware jitter.
    if config.vertex_snapping {
        let (sx, sy) = config.snap_resolution;
        nx = (nx * sx).floor() / sx;
        ny = (ny * sy).floor() / sy;
    }

    // Viewport transform; NDC +1 maps to pixel row 0
    let screen = Vec3::new(
        (nx + 1.0) * 0.5 * width as f32,
        (1.0 - ny) * 0.5 * height as f32,
        nz,
    );

    let [wx, wy, wz, _] = model.transform_point(vertex.pos);
    let normal = model.transform_dir(vertex.normal).normalize();

    // Empirical warp factor. Exaggerates the affine swim; both the
    // premultiplication here and the divide during interpolation must use
    // the same value.
    let dist = w.max(0.001);
    let affine = dist + (w * 8.0 / dist) * 0.5;

    let light = if config.lighting {
        shade_intensity(normal, lights, config.ambient)
    } else {
        1.0
    };

    ProcessedVertex {
        screen,
        world: Vec3::new(wx, wy, wz),
        normal,
        color: vertex.color,
        u: vertex.uv.x * affine,
        v: vertex.uv.y * affine,
        affine,
        light,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    fn unit_config() -> RenderConfig {
        RenderConfig {
            vertex_snapping: false,
            lighting: false,
            ..RenderConfig::default()
        }
    }

    fn vertex_at(x: f32, y: f32, z: f32) -> Vertex {
        Vertex {
            pos: Vec3::new(x, y, z),
            normal: Vec3::new(0.0, 0.0, 1.0),
            uv: Vec2::new(0.5, 0.25),
            color: Color::WHITE,
        }
    }

    #[test]
    fn test_viewport_maps_ndc_corners() {
        let config = unit_config();
        // Identity MVP: position is already NDC with w=1
        let pv = process_vertex(&vertex_at(-1.0, 1.0, 0.0), &Mat4::IDENTITY, &Mat4::IDENTITY, &[], &config, 320, 240);
        assert_eq!((pv.screen.x, pv.screen.y), (0.0, 0.0));
        let pv = process_vertex(&vertex_at(1.0, -1.0, 0.0), &Mat4::IDENTITY, &Mat4::IDENTITY, &[], &config, 320, 240);
        assert_eq!((pv.screen.x, pv.screen.y), (320.0, 240.0));
    }

    #[test]
    fn test_affine_factor_formula() {
        let config = unit_config();
        let pv = process_vertex(&vertex_at(0.0, 0.0, 0.0), &Mat4::IDENTITY, &Mat4::IDENTITY, &[], &config, 320, 240);
        // w = 1: dist = 1, affine = 1 + (1 * 8 / 1) * 0.5 = 5
        assert!((pv.affine - 5.0).abs() < 1e-5);
        assert!((pv.u - 0.5 * 5.0).abs() < 1e-5);
        assert!((pv.v - 0.25 * 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_snapping_quantizes_to_shared_cell() {
        let mut config = unit_config();
        config.vertex_snapping = true;
        config.snap_resolution = (320.0, 240.0);
        let a = process_vertex(&vertex_at(0.3000, 0.4000, 0.0), &Mat4::IDENTITY, &Mat4::IDENTITY, &[], &config, 320, 240);
        let b = process_vertex(&vertex_at(0.3010, 0.4010, 0.0), &Mat4::IDENTITY, &Mat4::IDENTITY, &[], &config, 320, 240);
        assert_eq!(a.screen.x, b.screen.x);
        assert_eq!(a.screen.y, b.screen.y);
    }

    #[test]
    fn test_lighting_disabled_is_full_intensity() {
        let config = unit_config();
        let lights = [Light::new(Vec3::new(0.0, 0.0, 1.0), 1.0)];
        let pv = process_vertex(&vertex_at(0.0, 0.0, 0.0), &Mat4::IDENTITY, &Mat4::IDENTITY, &lights, &config, 320, 240);
        assert_eq!(pv.light, 1.0);
    }

    #[test]
    fn test_degenerate_w_does_not_divide() {
        let config = unit_config();
        // A projection row that zeroes w
        let mut mvp = Mat4::IDENTITY;
        mvp.rows[3] = [0.0, 0.0, 0.0, 0.0];
        let pv = process_vertex(&vertex_at(0.5, 0.5, 0.5), &mvp, &Mat4::IDENTITY, &[], &config, 320, 240);
        assert!(pv.screen.x.is_finite() && pv.screen.y.is_finite() && pv.screen.z.is_finite());
    }
}
