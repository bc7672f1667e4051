//! Color and depth buffer management

use crate::color::Color;
use log::debug;

/// Hard ceiling on buffer dimensions; larger requests are clamped, not
/// rejected.
pub const MAX_WIDTH: usize = 1920;
pub const MAX_HEIGHT: usize = 1200;

/// Depth buffer clear value ("infinitely far"); lower stored value = nearer.
pub const DEPTH_CLEAR: u16 = 0xFFFF;

/// Forward bias, in fixed-point depth units, for overlay occlusion tests.
/// Lets annotations draw on the exact surface they belong to without
/// z-fighting it.
pub const DEPTH_BIAS: i32 = 512;

/// Map an NDC depth in [-1, 1] to 16-bit fixed point, truncating.
///
/// The batch path replays this op sequence lane-wise; keep the order of
/// operations stable.
#[inline]
pub fn depth_to_fixed(ndc: f32) -> u16 {
    ((ndc + 1.0) * 0.5 * 65535.0).max(0.0).min(65535.0) as u16
}

/// Framebuffer: packed 32-bit colors plus a 16-bit fixed-point depth
/// buffer of the same dimensions.
pub struct Framebuffer {
    pub pixels: Vec<u32>,
    pub depth: Vec<u16>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.clamp(1, MAX_WIDTH);
        let height = height.clamp(1, MAX_HEIGHT);
        Self {
            pixels: vec![0; width * height],
            depth: vec![DEPTH_CLEAR; width * height],
            width,
            height,
        }
    }

    /// Reset every pixel to `color` and every depth cell to the far
    /// sentinel. Buffers are reused in place, frame after frame.
    pub fn clear(&mut self, color: Color) {
        let packed = color.to_u32();
        self.pixels.fill(packed);
        self.depth.fill(DEPTH_CLEAR);
    }

    /// Reallocate both buffers. Dimensions above the maximum are clamped.
    /// Contents after a resize are unspecified until the next clear.
    pub fn resize(&mut self, width: usize, height: usize) {
        let width = width.clamp(1, MAX_WIDTH);
        let height = height.clamp(1, MAX_HEIGHT);
        if width == self.width && height == self.height {
            return;
        }
        debug!("framebuffer resize {}x{} -> {}x{}", self.width, self.height, width, height);
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width * height];
        self.depth = vec![DEPTH_CLEAR; width * height];
    }

    /// Unconditional pixel write, no depth interaction
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color.to_u32();
        }
    }

    /// Depth-tested write: strictly nearer wins, ties never overwrite.
    /// Color and depth are updated together or not at all.
    pub fn set_pixel_depth(&mut self, x: usize, y: usize, depth: u16, color: Color) -> bool {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            if depth < self.depth[idx] {
                self.depth[idx] = depth;
                self.pixels[idx] = color.to_u32();
                return true;
            }
        }
        false
    }

    /// Alpha-blended write with a forward-biased depth test: slightly
    /// behind the stored surface still draws. Does not write depth, so
    /// highlights never occlude later geometry.
    pub fn blend_pixel_biased(&mut self, x: usize, y: usize, depth: u16, color: Color, alpha: f32) {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            if (depth as i32) <= self.depth[idx] as i32 + DEPTH_BIAS {
                let dst = Color::from_u32(self.pixels[idx]);
                self.pixels[idx] = color.blend_over(dst, alpha).to_u32();
            }
        }
    }

    /// Raw depth read; out-of-bounds reads the far sentinel
    pub fn depth_at(&self, x: usize, y: usize) -> u16 {
        if x < self.width && y < self.height {
            self.depth[y * self.width + x]
        } else {
            DEPTH_CLEAR
        }
    }

    /// Occlusion query for overlay dots and handles: is a point at this
    /// NDC depth visible at (x, y), within the forward bias?
    pub fn is_point_visible(&self, x: usize, y: usize, depth_ndc: f32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let fixed = depth_to_fixed(depth_ndc) as i32;
        fixed <= self.depth[y * self.width + x] as i32 + DEPTH_BIAS
    }

    /// Copy the color buffer out as RGBA bytes at native resolution
    pub fn as_rgba_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for &packed in &self.pixels {
            bytes.extend_from_slice(&packed.to_be_bytes());
        }
        bytes
    }

    /// Nearest-neighbor scale-out into a caller-provided RGBA byte
    /// buffer of `dest_width * dest_height` pixels. Hard pixel edges,
    /// no smoothing.
    pub fn present_into(&self, dest: &mut [u8], dest_width: usize, dest_height: usize) {
        if dest_width == 0 || dest_height == 0 || dest.len() < dest_width * dest_height * 4 {
            return;
        }
        for dy in 0..dest_height {
            let sy = (dy * self.height / dest_height).min(self.height - 1);
            for dx in 0..dest_width {
                let sx = (dx * self.width / dest_width).min(self.width - 1);
                let bytes = self.pixels[sy * self.width + sx].to_be_bytes();
                let o = (dy * dest_width + dx) * 4;
                dest[o..o + 4].copy_from_slice(&bytes);
            }
        }
    }
}
