//! Scalar rasterizer core: edge-function triangle fill with depth
//! testing, affine texture mapping, and ordered dithering.
//!
//! This is the reference algorithm. The batch path in `batch` must stay
//! pixel-identical to it for untextured draws; any change to arithmetic
//! order here has to be mirrored there.

use crate::color::Color;
use crate::config::RenderConfig;
use crate::framebuffer::{depth_to_fixed, Framebuffer};
use crate::texture::Texture;
use crate::vertex::ProcessedVertex;

/// Degenerate-triangle threshold on the signed double area
pub(crate) const AREA_EPS: f32 = 1e-4;

/// Slack on the normalized barycentric inside test. Dividing the edge
/// values by the signed area makes the test winding-neutral: all three
/// normalized weights are non-negative for interior pixels either way.
pub(crate) const INSIDE_EPS: f32 = -1e-4;

/// NDC depth threshold for the near guard. Triangles whose vertices
/// disagree about being behind it are dropped whole; nothing is clipped.
const NEAR_GUARD: f32 = -0.5;

/// The canonical 8x8 Bayer threshold matrix, indexed [y][x]; its 64
/// entries are the standard recursive permutation of 0..63.
pub const BAYER_8X8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Ordered-dither one channel: add a signed threshold offset, then
/// quantize by dropping `shift` low bits. The offset never exceeds one
/// quantization step in magnitude.
#[inline]
pub fn dither_channel(value: u8, x: usize, y: usize, shift: u8) -> u8 {
    let shift = shift.min(7) as u32;
    let step = 1i32 << shift;
    let offset = (BAYER_8X8[y & 7][x & 7] as i32 - 32) * step / 32;
    let v = (value as i32 + offset).clamp(0, 255);
    ((v >> shift) << shift) as u8
}

#[inline]
pub(crate) fn dither_color(color: Color, x: usize, y: usize, shift: u8) -> Color {
    Color {
        r: dither_channel(color.r, x, y, shift),
        g: dither_channel(color.g, x, y, shift),
        b: dither_channel(color.b, x, y, shift),
        a: color.a,
    }
}

/// Signed double area of a triangle in screen space. Positive means
/// clockwise in y-down pixel coordinates, which is the back side for
/// meshes wound counter-clockwise seen from outside.
#[inline]
pub fn signed_double_area(tri: &[ProcessedVertex; 3]) -> f32 {
    let (v0, v1, v2) = (tri[0].screen, tri[1].screen, tri[2].screen);
    (v1.x - v0.x) * (v2.y - v0.y) - (v1.y - v0.y) * (v2.x - v0.x)
}

/// Frustum/near rejection. True when the triangle is entirely outside
/// the depth range, or when its vertices straddle the inner near guard.
/// Straddling triangles are discarded wholesale, never clipped.
pub(crate) fn frustum_rejected(tri: &[ProcessedVertex; 3]) -> bool {
    let (z0, z1, z2) = (tri[0].screen.z, tri[1].screen.z, tri[2].screen.z);
    if z0 < -1.0 && z1 < -1.0 && z2 < -1.0 {
        return true;
    }
    if z0 > 1.0 && z1 > 1.0 && z2 > 1.0 {
        return true;
    }
    let (b0, b1, b2) = (z0 < NEAR_GUARD, z1 < NEAR_GUARD, z2 < NEAR_GUARD);
    b0 != b1 || b1 != b2
}

pub(crate) fn backface_rejected(tri: &[ProcessedVertex; 3]) -> bool {
    signed_double_area(tri) > 0.0
}

/// Run the rejection passes that precede rasterization
pub fn culled(tri: &[ProcessedVertex; 3], config: &RenderConfig) -> bool {
    if frustum_rejected(tri) {
        return true;
    }
    config.backface_culling && backface_rejected(tri)
}

/// Edge-function setup shared by the scalar and batch fill loops.
///
/// Edge i is opposite vertex i, with coefficients `A = y_i - y_j`,
/// `B = x_j - x_i`; edge values are evaluated relative to a vertex the
/// edge passes through, so no large constant term accumulates.
pub(crate) struct TriangleSetup {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
    /// Per-edge x step
    pub a: [f32; 3],
    /// Per-edge y step
    pub b: [f32; 3],
    /// Edge values at (min_x, min_y)
    pub w_row: [f32; 3],
    pub inv_area: f32,
}

impl TriangleSetup {
    /// None when the clamped bounding box is empty or the triangle is
    /// degenerate (silent rejection, not an error).
    pub fn new(tri: &[ProcessedVertex; 3], width: usize, height: usize) -> Option<Self> {
        let (v0, v1, v2) = (tri[0].screen, tri[1].screen, tri[2].screen);

        let min_x = v0.x.min(v1.x).min(v2.x).max(0.0) as usize;
        let max_x = ((v0.x.max(v1.x).max(v2.x) + 1.0).min(width as f32)).max(0.0) as usize;
        let min_y = v0.y.min(v1.y).min(v2.y).max(0.0) as usize;
        let max_y = ((v0.y.max(v1.y).max(v2.y) + 1.0).min(height as f32)).max(0.0) as usize;
        if min_x >= max_x || min_y >= max_y {
            return None;
        }

        let a = [v1.y - v2.y, v2.y - v0.y, v0.y - v1.y];
        let b = [v2.x - v1.x, v0.x - v2.x, v1.x - v0.x];

        let area = a[0] * (v0.x - v1.x) + b[0] * (v0.y - v1.y);
        if area.abs() < AREA_EPS {
            return None;
        }

        let (px, py) = (min_x as f32, min_y as f32);
        let w_row = [
            a[0] * (px - v1.x) + b[0] * (py - v1.y),
            a[1] * (px - v2.x) + b[1] * (py - v2.y),
            a[2] * (px - v0.x) + b[2] * (py - v0.y),
        ];

        Some(Self {
            min_x,
            min_y,
            max_x,
            max_y,
            a,
            b,
            w_row,
            inv_area: 1.0 / area,
        })
    }
}

/// Per-pixel state for the untextured fill: NDC depths and lit vertex
/// colors (base color scaled by precomputed light).
pub(crate) struct FlatFill {
    pub z: [f32; 3],
    pub r: [f32; 3],
    pub g: [f32; 3],
    pub b: [f32; 3],
    pub dither: bool,
    pub shift: u8,
}

impl FlatFill {
    pub fn new(tri: &[ProcessedVertex; 3], config: &RenderConfig) -> Self {
        let mut z = [0.0; 3];
        let mut r = [0.0; 3];
        let mut g = [0.0; 3];
        let mut b = [0.0; 3];
        for i in 0..3 {
            z[i] = tri[i].screen.z;
            r[i] = tri[i].color.r as f32 * tri[i].light;
            g[i] = tri[i].color.g as f32 * tri[i].light;
            b[i] = tri[i].color.b as f32 * tri[i].light;
        }
        Self {
            z,
            r,
            g,
            b,
            dither: config.dithering,
            shift: config.color_depth_shift,
        }
    }

    /// Shade and write one interior pixel. (x, y) is inside the clamped
    /// bounding box; the barycentrics are already normalized.
    ///
    /// The batch path replays this exact arithmetic lane-wise. Keep the
    /// interpolation, clamp, and rounding order in sync with `batch`.
    #[inline]
    pub fn pixel(&self, fb: &mut Framebuffer, x: usize, y: usize, b0: f32, b1: f32, b2: f32) {
        let z = b0 * self.z[0] + b1 * self.z[1] + b2 * self.z[2];
        let fixed = depth_to_fixed(z);

        let idx = y * fb.width + x;
        if fixed >= fb.depth[idx] {
            return;
        }

        // Round to nearest: the barycentrics sum to 1 only within a ULP,
        // so truncation would leave 254s inside a solid-255 triangle
        let r = (b0 * self.r[0] + b1 * self.r[1] + b2 * self.r[2]).max(0.0).min(255.0) + 0.5;
        let g = (b0 * self.g[0] + b1 * self.g[1] + b2 * self.g[2]).max(0.0).min(255.0) + 0.5;
        let b = (b0 * self.b[0] + b1 * self.b[1] + b2 * self.b[2]).max(0.0).min(255.0) + 0.5;
        let (r, g, b) = (r as u8, g as u8, b as u8);

        let mut color = Color::new(r, g, b);
        if self.dither {
            color = dither_color(color, x, y, self.shift);
        }

        fb.depth[idx] = fixed;
        fb.pixels[idx] = color.to_u32();
    }
}

/// Rasterize one triangle into the framebuffer. Degenerate or fully
/// off-screen triangles are silent no-ops; color and depth are written
/// together or not at all.
pub fn draw_triangle(
    fb: &mut Framebuffer,
    tri: &[ProcessedVertex; 3],
    texture: Option<&Texture>,
    config: &RenderConfig,
) {
    let Some(setup) = TriangleSetup::new(tri, fb.width, fb.height) else {
        return;
    };

    match texture {
        Some(tex) if config.texturing => fill_textured(fb, tri, tex, config, &setup),
        _ => fill_flat(fb, tri, config, &setup),
    }
}

/// Scalar untextured fill: incremental edge stepping over the bounding
/// box, one pixel at a time.
pub(crate) fn fill_flat(
    fb: &mut Framebuffer,
    tri: &[ProcessedVertex; 3],
    config: &RenderConfig,
    setup: &TriangleSetup,
) {
    let fill = FlatFill::new(tri, config);
    let mut w_row = setup.w_row;

    for y in setup.min_y..setup.max_y {
        let mut w = w_row;
        for x in setup.min_x..setup.max_x {
            let b0 = w[0] * setup.inv_area;
            let b1 = w[1] * setup.inv_area;
            let b2 = w[2] * setup.inv_area;

            if b0 >= INSIDE_EPS && b1 >= INSIDE_EPS && b2 >= INSIDE_EPS {
                fill.pixel(fb, x, y, b0, b1, b2);
            }

            w[0] += setup.a[0];
            w[1] += setup.a[1];
            w[2] += setup.a[2];
        }
        w_row[0] += setup.b[0];
        w_row[1] += setup.b[1];
        w_row[2] += setup.b[2];
    }
}

/// Textured fill. Texture addressing is scalar by nature, so this branch
/// has no batch counterpart.
fn fill_textured(
    fb: &mut Framebuffer,
    tri: &[ProcessedVertex; 3],
    texture: &Texture,
    config: &RenderConfig,
    setup: &TriangleSetup,
) {
    let fill = FlatFill::new(tri, config);
    let (u0, u1, u2) = (tri[0].u, tri[1].u, tri[2].u);
    let (v0, v1, v2) = (tri[0].v, tri[1].v, tri[2].v);
    let (af0, af1, af2) = (tri[0].affine, tri[1].affine, tri[2].affine);

    let mut w_row = setup.w_row;

    for y in setup.min_y..setup.max_y {
        let mut w = w_row;
        for x in setup.min_x..setup.max_x {
            let b0 = w[0] * setup.inv_area;
            let b1 = w[1] * setup.inv_area;
            let b2 = w[2] * setup.inv_area;

            if b0 >= INSIDE_EPS && b1 >= INSIDE_EPS && b2 >= INSIDE_EPS {
                let z = b0 * fill.z[0] + b1 * fill.z[1] + b2 * fill.z[2];
                let fixed = depth_to_fixed(z);
                let idx = y * fb.width + x;

                if fixed < fb.depth[idx] {
                    // Interpolate the premultiplied coordinates, then
                    // divide the warp factor back out. Linear in screen
                    // space: the affine swim is the point.
                    let ua = b0 * u0 + b1 * u1 + b2 * u2;
                    let va = b0 * v0 + b1 * v1 + b2 * v2;
                    let aa = b0 * af0 + b1 * af1 + b2 * af2;
                    let denom = if aa.abs() < 1e-6 { 1e-6 } else { aa };

                    let tu = (ua / denom).rem_euclid(1.0);
                    let tv = (va / denom).rem_euclid(1.0);

                    // v=0 is the bottom row of the texture
                    let texel = texture.sample(tu, 1.0 - tv);

                    let lit = Color::new(
                        ((b0 * fill.r[0] + b1 * fill.r[1] + b2 * fill.r[2]).max(0.0).min(255.0) + 0.5) as u8,
                        ((b0 * fill.g[0] + b1 * fill.g[1] + b2 * fill.g[2]).max(0.0).min(255.0) + 0.5) as u8,
                        ((b0 * fill.b[0] + b1 * fill.b[1] + b2 * fill.b[2]).max(0.0).min(255.0) + 0.5) as u8,
                    );
                    let mut color = texel.modulate(lit);

                    if fill.dither {
                        color = dither_color(color, x, y, fill.shift);
                    }

                    fb.depth[idx] = fixed;
                    fb.pixels[idx] = color.to_u32();
                }
            }

            w[0] += setup.a[0];
            w[1] += setup.a[1];
            w[2] += setup.a[2];
        }
        w_row[0] += setup.b[0];
        w_row[1] += setup.b[1];
        w_row[2] += setup.b[2];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    pub(crate) fn screen_vertex(x: f32, y: f32, z: f32, color: Color) -> ProcessedVertex {
        ProcessedVertex {
            screen: Vec3::new(x, y, z),
            world: Vec3::ZERO,
            normal: Vec3::new(0.0, 0.0, 1.0),
            color,
            u: 0.0,
            v: 0.0,
            affine: 1.0,
            light: 1.0,
        }
    }

    fn flat_config() -> RenderConfig {
        RenderConfig {
            dithering: false,
            texturing: false,
            lighting: false,
            vertex_snapping: false,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_degenerate_triangle_writes_nothing() {
        let mut fb = Framebuffer::new(16, 16);
        fb.clear(Color::BLACK);
        let before_pixels = fb.pixels.clone();
        let before_depth = fb.depth.clone();

        // Collinear vertices: zero area
        let tri = [
            screen_vertex(1.0, 1.0, 0.0, Color::RED),
            screen_vertex(8.0, 8.0, 0.0, Color::RED),
            screen_vertex(4.0, 4.0, 0.0, Color::RED),
        ];
        draw_triangle(&mut fb, &tri, None, &flat_config());

        assert_eq!(fb.pixels, before_pixels);
        assert_eq!(fb.depth, before_depth);
    }

    #[test]
    fn test_fill_covers_interior() {
        let mut fb = Framebuffer::new(16, 16);
        fb.clear(Color::BLACK);
        let tri = [
            screen_vertex(0.0, 0.0, 0.0, Color::RED),
            screen_vertex(15.0, 0.0, 0.0, Color::RED),
            screen_vertex(0.0, 15.0, 0.0, Color::RED),
        ];
        draw_triangle(&mut fb, &tri, None, &flat_config());
        // A pixel well inside the triangle
        assert_eq!(fb.pixels[3 * 16 + 3], Color::RED.to_u32());
        // A pixel well outside (the far corner)
        assert_eq!(fb.pixels[15 * 16 + 15], Color::BLACK.to_u32());
    }

    #[test]
    fn test_solid_color_fill_is_exact() {
        // Three identical vertex colors must come out of interpolation
        // unchanged on every pixel. The barycentrics only sum to 1
        // within a ULP, so this fails if the channel cast truncates.
        let mut fb = Framebuffer::new(64, 64);
        fb.clear(Color::BLACK);
        let tri = [
            screen_vertex(0.0, 0.0, 0.2, Color::RED),
            screen_vertex(40.0, 0.0, 0.2, Color::RED),
            screen_vertex(0.0, 40.0, 0.2, Color::RED),
        ];
        draw_triangle(&mut fb, &tri, None, &flat_config());

        let mut drawn = 0;
        for (i, &p) in fb.pixels.iter().enumerate() {
            if p != Color::BLACK.to_u32() {
                assert_eq!(p, Color::RED.to_u32(), "off-color pixel at index {}", i);
                drawn += 1;
            }
        }
        assert!(drawn > 100);
    }

    #[test]
    fn test_winding_does_not_affect_fill() {
        let config = flat_config();
        let mut fb_a = Framebuffer::new(16, 16);
        let mut fb_b = Framebuffer::new(16, 16);
        fb_a.clear(Color::BLACK);
        fb_b.clear(Color::BLACK);

        let v0 = screen_vertex(1.0, 1.0, 0.0, Color::GREEN);
        let v1 = screen_vertex(13.0, 2.0, 0.0, Color::GREEN);
        let v2 = screen_vertex(4.0, 12.0, 0.0, Color::GREEN);
        draw_triangle(&mut fb_a, &[v0, v1, v2], None, &config);
        draw_triangle(&mut fb_b, &[v0, v2, v1], None, &config);

        assert_eq!(fb_a.pixels, fb_b.pixels);
    }

    #[test]
    fn test_near_guard_straddle_rejected() {
        let near = [
            screen_vertex(0.0, 0.0, -0.6, Color::RED),
            screen_vertex(8.0, 0.0, -0.4, Color::RED),
            screen_vertex(0.0, 8.0, -0.4, Color::RED),
        ];
        assert!(frustum_rejected(&near));

        let agree = [
            screen_vertex(0.0, 0.0, -0.4, Color::RED),
            screen_vertex(8.0, 0.0, -0.3, Color::RED),
            screen_vertex(0.0, 8.0, -0.2, Color::RED),
        ];
        assert!(!frustum_rejected(&agree));

        let behind_far = [
            screen_vertex(0.0, 0.0, 1.5, Color::RED),
            screen_vertex(8.0, 0.0, 1.5, Color::RED),
            screen_vertex(0.0, 8.0, 1.5, Color::RED),
        ];
        assert!(frustum_rejected(&behind_far));
    }

    #[test]
    fn test_dither_offset_bounded_by_one_step() {
        for shift in [3u8, 5u8] {
            let step = 1i32 << shift;
            for v in 0..=255u8 {
                let plain = ((v >> shift) << shift) as i32;
                for y in 0..8 {
                    for x in 0..8 {
                        let dithered = dither_channel(v, x, y, shift) as i32;
                        assert!(
                            (dithered - plain).abs() <= step,
                            "v={} x={} y={} shift={}: {} vs {}",
                            v, x, y, shift, dithered, plain
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_bayer_matrix_is_permutation() {
        let mut seen = [false; 64];
        for row in &BAYER_8X8 {
            for &m in row {
                assert!(!seen[m as usize]);
                seen[m as usize] = true;
            }
        }
    }
}
