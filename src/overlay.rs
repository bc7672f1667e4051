//! Overlay primitives: lines, point sprites, and transparent triangle
//! highlights for gizmos and selection rendering.

use crate::color::Color;
use crate::framebuffer::{depth_to_fixed, Framebuffer};
use crate::raster::{TriangleSetup, INSIDE_EPS};
use crate::vertex::ProcessedVertex;

/// Bresenham line, no depth test: always overwrites
pub fn draw_line(fb: &mut Framebuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut x = x0;
    let mut y = y0;

    loop {
        if x >= 0 && x < fb.width as i32 && y >= 0 && y < fb.height as i32 {
            fb.set_pixel(x as usize, y as usize, color);
        }

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Depth-tested line: NDC depth interpolated along the run, each pixel
/// tested against the depth buffer
pub fn draw_line_depth(
    fb: &mut Framebuffer,
    x0: i32,
    y0: i32,
    z0: f32,
    x1: i32,
    y1: i32,
    z1: f32,
    color: Color,
) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut x = x0;
    let mut y = y0;

    let steps = dx.max(-dy).max(1) as f32;
    let mut i = 0.0f32;

    loop {
        if x >= 0 && x < fb.width as i32 && y >= 0 && y < fb.height as i32 {
            let z = z0 + (z1 - z0) * (i / steps);
            fb.set_pixel_depth(x as usize, y as usize, depth_to_fixed(z), color);
        }

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        i += 1.0;
    }
}

/// Axis-aligned filled squares around projected points, depth tested
/// with the forward bias so dots sit on the surface they mark. Color
/// only; the depth buffer is left untouched.
pub fn render_points(fb: &mut Framebuffer, points: &[(i32, i32, f32)], radius: i32, color: Color) {
    for &(cx, cy, z) in points {
        let fixed = depth_to_fixed(z);
        let y_lo = (cy - radius).max(0);
        let y_hi = (cy + radius).min(fb.height as i32 - 1);
        let x_lo = (cx - radius).max(0);
        let x_hi = (cx + radius).min(fb.width as i32 - 1);
        for y in y_lo..=y_hi {
            for x in x_lo..=x_hi {
                fb.blend_pixel_biased(x as usize, y as usize, fixed, color, 1.0);
            }
        }
    }
}

/// Alpha-blended triangle fill for selection highlights. Same edge scan
/// as the solid rasterizer, but blends `new*alpha + old*(1-alpha)` and
/// uses the forward-biased depth test so slightly-behind highlights
/// still appear on the surface they annotate. Depth is never written.
pub fn render_transparent_triangles(
    fb: &mut Framebuffer,
    tris: &[[ProcessedVertex; 3]],
    alpha: f32,
) {
    for tri in tris {
        let Some(setup) = TriangleSetup::new(tri, fb.width, fb.height) else {
            continue;
        };

        let mut z = [0.0f32; 3];
        let mut r = [0.0f32; 3];
        let mut g = [0.0f32; 3];
        let mut b = [0.0f32; 3];
        for i in 0..3 {
            z[i] = tri[i].screen.z;
            r[i] = tri[i].color.r as f32 * tri[i].light;
            g[i] = tri[i].color.g as f32 * tri[i].light;
            b[i] = tri[i].color.b as f32 * tri[i].light;
        }

        let mut w_row = setup.w_row;
        for y in setup.min_y..setup.max_y {
            let mut w = w_row;
            for x in setup.min_x..setup.max_x {
                let b0 = w[0] * setup.inv_area;
                let b1 = w[1] * setup.inv_area;
                let b2 = w[2] * setup.inv_area;

                if b0 >= INSIDE_EPS && b1 >= INSIDE_EPS && b2 >= INSIDE_EPS {
                    let zi = b0 * z[0] + b1 * z[1] + b2 * z[2];
                    let color = Color::new(
                        ((b0 * r[0] + b1 * r[1] + b2 * r[2]).max(0.0).min(255.0) + 0.5) as u8,
                        ((b0 * g[0] + b1 * g[1] + b2 * g[2]).max(0.0).min(255.0) + 0.5) as u8,
                        ((b0 * b[0] + b1 * b[1] + b2 * b[2]).max(0.0).min(255.0) + 0.5) as u8,
                    );
                    fb.blend_pixel_biased(x, y, depth_to_fixed(zi), color, alpha);
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
}
