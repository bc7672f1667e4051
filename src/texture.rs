//! RGBA8 textures with nearest-neighbor wrap sampling

use crate::color::Color;
use crate::error::RasterError;
use log::{info, warn};

/// Simple texture: row-major RGBA8 texels, origin top-left in storage.
/// The rasterizer samples it with v=0 at the bottom.
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
    pub name: String,
}

impl Texture {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            pixels: vec![Color::WHITE; width.max(1) * height.max(1)],
            name: String::new(),
        }
    }

    /// Build from a raw RGBA8 buffer (the upload format callers use).
    /// A short buffer is padded with opaque black rather than rejected.
    pub fn from_rgba8(bytes: &[u8], width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut pixels = Vec::with_capacity(width * height);
        for i in 0..width * height {
            let o = i * 4;
            if o + 3 < bytes.len() {
                pixels.push(Color::with_alpha(bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]));
            } else {
                pixels.push(Color::BLACK);
            }
        }
        Self {
            width,
            height,
            pixels,
            name: String::new(),
        }
    }

    /// Load a texture from an image file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, RasterError> {
        use image::GenericImageView;

        let path = path.as_ref();
        let img = image::open(path)?;

        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        info!("loaded texture {} ({}x{})", name, width, height);

        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        })
    }

    /// Load texture from raw encoded image bytes (PNG/JPEG/BMP)
    pub fn from_bytes(bytes: &[u8], name: String) -> Result<Self, RasterError> {
        use image::GenericImageView;

        let img = image::load_from_memory(bytes)?;

        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        })
    }

    /// Load all PNG textures from a directory, sorted by path
    pub fn load_directory<P: AsRef<std::path::Path>>(dir: P) -> Vec<Self> {
        let dir = dir.as_ref();
        let mut textures = Vec::new();

        if let Ok(entries) = std::fs::read_dir(dir) {
            let mut paths: Vec<_> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    p.extension()
                        .map(|ext| ext.to_ascii_lowercase() == "png")
                        .unwrap_or(false)
                })
                .collect();

            paths.sort();

            for path in paths {
                match Self::from_file(&path) {
                    Ok(tex) => textures.push(tex),
                    Err(e) => warn!("skipping {}: {}", path.display(), e),
                }
            }
        }

        textures
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self {
            width,
            height,
            pixels,
            name: "checkerboard".to_string(),
        }
    }

    /// Sample at UV coordinates. Nearest-neighbor, coordinates wrap
    /// (modulo, not clamp), so u=1.5 samples the same texel as u=0.5.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);
        let tx = ((u * self.width as f32) as usize).min(self.width - 1);
        let ty = ((v * self.height as f32) as usize).min(self.height - 1);
        self.pixels[ty * self.width + tx]
    }

    /// Get texel at integer coordinates
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Color::BLACK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> Texture {
        let mut tex = Texture::new(2, 2);
        tex.pixels = vec![Color::RED, Color::GREEN, Color::BLUE, Color::WHITE];
        tex
    }

    #[test]
    fn test_sample_wraps_not_clamps() {
        let tex = two_by_two();
        assert_eq!(tex.sample(1.5, 0.25), tex.sample(0.5, 0.25));
        assert_eq!(tex.sample(-0.5, 0.25), tex.sample(0.5, 0.25));
        assert_eq!(tex.sample(0.25, 2.75), tex.sample(0.25, 0.75));
    }

    #[test]
    fn test_sample_nearest_texel() {
        let tex = two_by_two();
        assert_eq!(tex.sample(0.25, 0.25), Color::RED);
        assert_eq!(tex.sample(0.75, 0.25), Color::GREEN);
        assert_eq!(tex.sample(0.25, 0.75), Color::BLUE);
        assert_eq!(tex.sample(0.75, 0.75), Color::WHITE);
    }

    #[test]
    fn test_from_rgba8_pads_short_buffer() {
        let tex = Texture::from_rgba8(&[255, 0, 0, 255], 2, 1);
        assert_eq!(tex.pixels[0], Color::RED);
        assert_eq!(tex.pixels[1], Color::BLACK);
    }
}
