//! Vectorized untextured fill: four horizontally adjacent pixels per
//! iteration on x86_64 (SSE2), with a scalar tail for partial groups.
//!
//! Equivalence contract: for the same inputs this path produces
//! byte-identical color and depth buffers to `raster::fill_flat`. Two
//! rules keep that true:
//! - edge values for each lane come from the same scalar `+=` recurrence
//!   the reference loop uses, never from a multiply by the lane index;
//! - every lane-wise operation replays the reference op sequence
//!   (mul/add in the same association, min/max in the same operand
//!   order, no FMA).
//!
//! Texturing stays on the scalar path; texture addressing is inherently
//! per-pixel. Other targets compile the scalar fallback only.

use crate::config::RenderConfig;
use crate::framebuffer::Framebuffer;
use crate::raster::{self, TriangleSetup};
use crate::vertex::ProcessedVertex;

#[cfg(target_arch = "x86_64")]
const LANES: usize = 4;

/// Rasterize one untextured triangle through the batched path. Same
/// silent-rejection behavior as the scalar reference.
pub fn draw_triangle_flat(fb: &mut Framebuffer, tri: &[ProcessedVertex; 3], config: &RenderConfig) {
    let Some(setup) = TriangleSetup::new(tri, fb.width, fb.height) else {
        return;
    };
    fill_flat_batched(fb, tri, config, &setup);
}

#[cfg(not(target_arch = "x86_64"))]
fn fill_flat_batched(
    fb: &mut Framebuffer,
    tri: &[ProcessedVertex; 3],
    config: &RenderConfig,
    setup: &TriangleSetup,
) {
    raster::fill_flat(fb, tri, config, setup);
}

#[cfg(target_arch = "x86_64")]
fn fill_flat_batched(
    fb: &mut Framebuffer,
    tri: &[ProcessedVertex; 3],
    config: &RenderConfig,
    setup: &TriangleSetup,
) {
    let fill = raster::FlatFill::new(tri, config);
    let mut w_row = setup.w_row;

    for y in setup.min_y..setup.max_y {
        let mut w = w_row;
        let mut x = setup.min_x;

        while x + LANES <= setup.max_x {
            // Lane edge values via the reference recurrence
            let mut w0 = [0.0f32; LANES];
            let mut w1 = [0.0f32; LANES];
            let mut w2 = [0.0f32; LANES];
            for lane in 0..LANES {
                w0[lane] = w[0];
                w1[lane] = w[1];
                w2[lane] = w[2];
                w[0] += setup.a[0];
                w[1] += setup.a[1];
                w[2] += setup.a[2];
            }

            // SSE2 is baseline on x86_64
            unsafe {
                shade_group(fb, x, y, &w0, &w1, &w2, setup.inv_area, &fill);
            }
            x += LANES;
        }

        // Scalar tail for the partial group at the end of the row
        while x < setup.max_x {
            let b0 = w[0] * setup.inv_area;
            let b1 = w[1] * setup.inv_area;
            let b2 = w[2] * setup.inv_area;
            if b0 >= raster::INSIDE_EPS && b1 >= raster::INSIDE_EPS && b2 >= raster::INSIDE_EPS {
                fill.pixel(fb, x, y, b0, b1, b2);
            }
            w[0] += setup.a[0];
            w[1] += setup.a[1];
            w[2] += setup.a[2];
            x += 1;
        }

        w_row[0] += setup.b[0];
        w_row[1] += setup.b[1];
        w_row[2] += setup.b[2];
    }
}

/// Shade one group of four pixels starting at (x0, y). Inside test,
/// depth and color interpolation run on all four lanes; the depth
/// compare and buffer writes finish per lane so color and depth stay
/// atomic per pixel.
#[cfg(target_arch = "x86_64")]
#[inline]
unsafe fn shade_group(
    fb: &mut Framebuffer,
    x0: usize,
    y: usize,
    w0: &[f32; LANES],
    w1: &[f32; LANES],
    w2: &[f32; LANES],
    inv_area: f32,
    fill: &raster::FlatFill,
) {
    use core::arch::x86_64::*;

    let inv = _mm_set1_ps(inv_area);
    let b0 = _mm_mul_ps(_mm_loadu_ps(w0.as_ptr()), inv);
    let b1 = _mm_mul_ps(_mm_loadu_ps(w1.as_ptr()), inv);
    let b2 = _mm_mul_ps(_mm_loadu_ps(w2.as_ptr()), inv);

    let eps = _mm_set1_ps(raster::INSIDE_EPS);
    let inside = _mm_and_ps(
        _mm_and_ps(_mm_cmpge_ps(b0, eps), _mm_cmpge_ps(b1, eps)),
        _mm_cmpge_ps(b2, eps),
    );
    let mask = _mm_movemask_ps(inside);
    if mask == 0 {
        return;
    }

    // z = b0*z0 + b1*z1 + b2*z2, left-associated like the reference
    let z = _mm_add_ps(
        _mm_add_ps(
            _mm_mul_ps(b0, _mm_set1_ps(fill.z[0])),
            _mm_mul_ps(b1, _mm_set1_ps(fill.z[1])),
        ),
        _mm_mul_ps(b2, _mm_set1_ps(fill.z[2])),
    );

    // depth_to_fixed, lane-wise: ((z + 1) * 0.5 * 65535).max(0).min(65535)
    let t = _mm_mul_ps(
        _mm_mul_ps(_mm_add_ps(z, _mm_set1_ps(1.0)), _mm_set1_ps(0.5)),
        _mm_set1_ps(65535.0),
    );
    let t = _mm_min_ps(_mm_max_ps(t, _mm_setzero_ps()), _mm_set1_ps(65535.0));
    let mut fixed = [0i32; LANES];
    _mm_storeu_si128(fixed.as_mut_ptr() as *mut __m128i, _mm_cvttps_epi32(t));

    let rl = interp3(b0, b1, b2, &fill.r);
    let gl = interp3(b0, b1, b2, &fill.g);
    let bl = interp3(b0, b1, b2, &fill.b);

    for lane in 0..LANES {
        if mask & (1 << lane) == 0 {
            continue;
        }
        let x = x0 + lane;
        let idx = y * fb.width + x;
        let fx = fixed[lane] as u16;
        if fx >= fb.depth[idx] {
            continue;
        }

        // Clamp then round to nearest, same order as the reference
        let r = (rl[lane].max(0.0).min(255.0) + 0.5) as u8;
        let g = (gl[lane].max(0.0).min(255.0) + 0.5) as u8;
        let b = (bl[lane].max(0.0).min(255.0) + 0.5) as u8;

        let mut color = crate::color::Color::new(r, g, b);
        if fill.dither {
            color = raster::dither_color(color, x, y, fill.shift);
        }

        fb.depth[idx] = fx;
        fb.pixels[idx] = color.to_u32();
    }
}

/// Lane-wise `b0*c0 + b1*c1 + b2*c2`, same association as the scalar
/// reference interpolation.
#[cfg(target_arch = "x86_64")]
#[inline]
unsafe fn interp3(
    b0: core::arch::x86_64::__m128,
    b1: core::arch::x86_64::__m128,
    b2: core::arch::x86_64::__m128,
    c: &[f32; 3],
) -> [f32; LANES] {
    use core::arch::x86_64::*;

    let v = _mm_add_ps(
        _mm_add_ps(_mm_mul_ps(b0, _mm_set1_ps(c[0])), _mm_mul_ps(b1, _mm_set1_ps(c[1]))),
        _mm_mul_ps(b2, _mm_set1_ps(c[2])),
    );
    let mut out = [0.0f32; LANES];
    _mm_storeu_ps(out.as_mut_ptr(), v);
    out
}
