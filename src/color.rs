//! Packed RGBA color

use serde::{Deserialize, Serialize};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Apply shading (multiply by intensity 0.0-1.0)
    pub fn shade(self, intensity: f32) -> Self {
        let i = intensity.clamp(0.0, 1.0);
        Self {
            r: (self.r as f32 * i) as u8,
            g: (self.g as f32 * i) as u8,
            b: (self.b as f32 * i) as u8,
            a: self.a,
        }
    }

    /// Modulate by another color (texture * vertex color, normalized by 255)
    pub fn modulate(self, other: Color) -> Self {
        Self {
            r: ((self.r as u32 * other.r as u32) / 255) as u8,
            g: ((self.g as u32 * other.g as u32) / 255) as u8,
            b: ((self.b as u32 * other.b as u32) / 255) as u8,
            a: self.a,
        }
    }

    /// Blend over a destination color: self*alpha + dst*(1-alpha)
    pub fn blend_over(self, dst: Color, alpha: f32) -> Self {
        let a = alpha.clamp(0.0, 1.0);
        let inv = 1.0 - a;
        Self {
            r: (self.r as f32 * a + dst.r as f32 * inv).min(255.0) as u8,
            g: (self.g as f32 * a + dst.g as f32 * inv).min(255.0) as u8,
            b: (self.b as f32 * a + dst.b as f32 * inv).min(255.0) as u8,
            a: 255,
        }
    }

    /// Pack to u32. The byte order here is the framebuffer's single source
    /// of truth: `from_u32` and the present path must agree with it.
    pub fn to_u32(self) -> u32 {
        ((self.r as u32) << 24) | ((self.g as u32) << 16) | ((self.b as u32) << 8) | (self.a as u32)
    }

    pub fn from_u32(packed: u32) -> Self {
        Self {
            r: (packed >> 24) as u8,
            g: (packed >> 16) as u8,
            b: (packed >> 8) as u8,
            a: packed as u8,
        }
    }

    /// Convert to [r, g, b, a] bytes
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_roundtrip() {
        let c = Color::with_alpha(12, 34, 56, 78);
        assert_eq!(Color::from_u32(c.to_u32()), c);
    }

    #[test]
    fn test_packed_matches_bytes() {
        let c = Color::new(1, 2, 3);
        assert_eq!(c.to_u32().to_be_bytes(), c.to_bytes());
    }

    #[test]
    fn test_shade_scales_channels() {
        let c = Color::new(200, 100, 50).shade(0.5);
        assert_eq!((c.r, c.g, c.b), (100, 50, 25));
    }

    #[test]
    fn test_modulate_white_is_identity() {
        let c = Color::new(10, 20, 30);
        assert_eq!(c.modulate(Color::WHITE), c);
    }

    #[test]
    fn test_blend_over_extremes() {
        let src = Color::new(255, 0, 0);
        let dst = Color::new(0, 0, 255);
        assert_eq!(src.blend_over(dst, 1.0), Color::new(255, 0, 0));
        assert_eq!(src.blend_over(dst, 0.0), Color::new(0, 0, 255));
    }
}
