//! The rasterizer context: owns the buffers, texture slots, lights, and
//! settings, and drives the per-frame draw path.

use crate::batch;
use crate::color::Color;
use crate::config::RenderConfig;
use crate::framebuffer::Framebuffer;
use crate::light::{shade_intensity, Light};
use crate::math::Mat4;
use crate::mesh::{faces_from_indices, Face, Vertex};
use crate::overlay;
use crate::raster;
use crate::texture::Texture;
use crate::vertex::{process_vertex, ProcessedVertex};
use log::{info, warn};

/// Texture slots are small integers; uploads beyond this are ignored
pub const MAX_TEXTURE_SLOTS: usize = 64;

/// A software rasterizer instance. Buffers are allocated once per
/// resolution and reused every frame; instances are independent, so
/// tests can spin up as many as they like.
///
/// Single-threaded by contract: one draw call at a time, and no cached
/// views may be held across a `resize`.
pub struct Renderer {
    pub fb: Framebuffer,
    pub config: RenderConfig,
    textures: Vec<Option<Texture>>,
    lights: Vec<Light>,
    /// Per-draw vertex scratch, reused across calls
    processed: Vec<ProcessedVertex>,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        let fb = Framebuffer::new(width, height);
        info!("renderer created at {}x{}", fb.width, fb.height);
        Self {
            fb,
            config: RenderConfig::default(),
            textures: Vec::new(),
            lights: vec![Light::default()],
            processed: Vec::new(),
        }
    }

    /// Upload a texture into a slot. Out-of-range slots are a caller
    /// bug; they are logged and ignored rather than grown unbounded.
    pub fn set_texture(&mut self, slot: usize, texture: Texture) {
        if slot >= MAX_TEXTURE_SLOTS {
            warn!("texture slot {} out of range, ignoring", slot);
            return;
        }
        if self.textures.len() <= slot {
            self.textures.resize_with(slot + 1, || None);
        }
        self.textures[slot] = Some(texture);
    }

    pub fn clear_texture(&mut self, slot: usize) {
        if let Some(entry) = self.textures.get_mut(slot) {
            *entry = None;
        }
    }

    pub fn texture(&self, slot: usize) -> Option<&Texture> {
        self.textures.get(slot).and_then(|t| t.as_ref())
    }

    pub fn set_lights(&mut self, lights: Vec<Light>) {
        self.lights = lights;
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn clear(&mut self, color: Color) {
        self.fb.clear(color);
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.fb.resize(width, height);
    }

    pub fn present_into(&self, dest: &mut [u8], dest_width: usize, dest_height: usize) {
        self.fb.present_into(dest, dest_width, dest_height);
    }

    pub fn depth_at(&self, x: usize, y: usize) -> u16 {
        self.fb.depth_at(x, y)
    }

    pub fn is_point_visible(&self, x: usize, y: usize, depth_ndc: f32) -> bool {
        self.fb.is_point_visible(x, y, depth_ndc)
    }

    /// Render a full triangle list. Processes every vertex exactly once,
    /// then culls and rasterizes face by face. Synchronous; returns only
    /// when the whole list has been drawn.
    pub fn render_mesh(
        &mut self,
        vertices: &[Vertex],
        faces: &[Face],
        model: &Mat4,
        view: &Mat4,
        projection: &Mat4,
    ) {
        let mvp = *projection * *view * *model;

        self.processed.clear();
        self.processed.reserve(vertices.len());
        for v in vertices {
            self.processed.push(process_vertex(
                v,
                &mvp,
                model,
                &self.lights,
                &self.config,
                self.fb.width,
                self.fb.height,
            ));
        }

        for face in faces {
            let (Some(p0), Some(p1), Some(p2)) = (
                self.processed.get(face.v0),
                self.processed.get(face.v1),
                self.processed.get(face.v2),
            ) else {
                debug_assert!(false, "face index out of range");
                continue;
            };
            let mut tri = [*p0, *p1, *p2];

            // Flat shading shares one intensity across the face, taken
            // from the geometric world-space normal
            if self.config.lighting && !self.config.smooth_shading {
                let n = (tri[1].world - tri[0].world)
                    .cross(tri[2].world - tri[0].world)
                    .normalize();
                let shared = shade_intensity(n, &self.lights, self.config.ambient);
                for pv in &mut tri {
                    pv.light = shared;
                }
            }

            if raster::culled(&tri, &self.config) {
                continue;
            }

            if self.config.wireframe {
                self.draw_wireframe(&tri);
                continue;
            }

            let texture = face
                .texture_slot
                .filter(|_| self.config.texturing)
                .and_then(|slot| self.textures.get(slot))
                .and_then(|t| t.as_ref());

            match texture {
                // Texture addressing keeps this on the scalar path
                Some(_) => raster::draw_triangle(&mut self.fb, &tri, texture, &self.config),
                None => batch::draw_triangle_flat(&mut self.fb, &tri, &self.config),
            }
        }
    }

    /// Render from a flat triangle-index list
    pub fn render_mesh_indexed(
        &mut self,
        vertices: &[Vertex],
        indices: &[usize],
        texture_slot: Option<usize>,
        model: &Mat4,
        view: &Mat4,
        projection: &Mat4,
    ) {
        let faces = faces_from_indices(indices, texture_slot);
        self.render_mesh(vertices, &faces, model, view, projection);
    }

    fn draw_wireframe(&mut self, tri: &[ProcessedVertex; 3]) {
        for i in 0..3 {
            let a = &tri[i];
            let b = &tri[(i + 1) % 3];
            let color = a.color.shade(a.light);
            overlay::draw_line_depth(
                &mut self.fb,
                a.screen.x as i32,
                a.screen.y as i32,
                a.screen.z,
                b.screen.x as i32,
                b.screen.y as i32,
                b.screen.z,
                color,
            );
        }
    }

    // Overlay pass-throughs for gizmo/selection callers

    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        overlay::draw_line(&mut self.fb, x0, y0, x1, y1, color);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_line_depth(&mut self, x0: i32, y0: i32, z0: f32, x1: i32, y1: i32, z1: f32, color: Color) {
        overlay::draw_line_depth(&mut self.fb, x0, y0, z0, x1, y1, z1, color);
    }

    pub fn render_points(&mut self, points: &[(i32, i32, f32)], radius: i32, color: Color) {
        overlay::render_points(&mut self.fb, points, radius, color);
    }

    pub fn render_transparent_triangles(&mut self, tris: &[[ProcessedVertex; 3]], alpha: f32) {
        overlay::render_transparent_triangles(&mut self.fb, tris, alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use crate::mesh::create_test_cube;

    fn camera() -> (Mat4, Mat4, Mat4) {
        let model = Mat4::IDENTITY;
        let view = Mat4::look_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::UP);
        let projection = Mat4::perspective(std::f32::consts::FRAC_PI_3, 1.0, 0.1, 100.0);
        (model, view, projection)
    }

    #[test]
    fn test_cube_renders_pixels() {
        let mut r = Renderer::new(64, 64);
        r.config.dithering = false;
        r.clear(Color::BLACK);
        let (vertices, faces) = create_test_cube();
        let (model, view, projection) = camera();
        r.render_mesh(&vertices, &faces, &model, &view, &projection);

        let drawn = r.fb.pixels.iter().filter(|&&p| p != Color::BLACK.to_u32()).count();
        assert!(drawn > 100, "cube should cover a meaningful area, got {}", drawn);
        // Center of the screen is on the cube
        assert!(r.depth_at(32, 32) < crate::framebuffer::DEPTH_CLEAR);
    }

    #[test]
    fn test_out_of_range_face_indices_skipped() {
        let mut r = Renderer::new(32, 32);
        r.clear(Color::BLACK);
        let (model, view, projection) = camera();
        let vertices = vec![Vertex::from_pos(0.0, 0.0, 0.0)];
        let faces = vec![Face::new(0, 10, 20)];
        // Must not panic in release; buffer stays clean
        if cfg!(not(debug_assertions)) {
            r.render_mesh(&vertices, &faces, &model, &view, &projection);
            assert!(r.fb.pixels.iter().all(|&p| p == Color::BLACK.to_u32()));
        }
    }

    #[test]
    fn test_unset_texture_slot_falls_back_to_flat() {
        let mut r = Renderer::new(64, 64);
        r.config.dithering = false;
        r.clear(Color::BLACK);
        let (vertices, faces) = create_test_cube();
        // Faces reference slot 0 but nothing is uploaded: renders untextured
        let (model, view, projection) = camera();
        r.render_mesh(&vertices, &faces, &model, &view, &projection);
        let drawn = r.fb.pixels.iter().filter(|&&p| p != Color::BLACK.to_u32()).count();
        assert!(drawn > 100);
    }

    #[test]
    fn test_texture_slot_out_of_range_ignored() {
        let mut r = Renderer::new(8, 8);
        r.set_texture(MAX_TEXTURE_SLOTS + 5, Texture::new(2, 2));
        assert!(r.texture(MAX_TEXTURE_SLOTS + 5).is_none());
    }
}
