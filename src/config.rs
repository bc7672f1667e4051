//! Render settings and RON persistence

use crate::error::RasterError;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rasterizer toggles. Defaults reproduce the PS1 look: snapped
/// vertices, dithered color, affine-warped textures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Draw triangle outlines instead of filling
    pub wireframe: bool,
    /// Apply diffuse lighting (off = everything at full intensity)
    pub lighting: bool,
    /// Sample textures (off = vertex colors only)
    pub texturing: bool,
    /// Reject back-facing triangles
    pub backface_culling: bool,
    /// Quantize NDC positions to a coarse grid (PS1 jitter)
    pub vertex_snapping: bool,
    /// Ordered dithering down to reduced color depth
    pub dithering: bool,
    /// Per-vertex (Gouraud) vs per-face (flat) lighting
    pub smooth_shading: bool,
    /// Bits dropped per channel when dithering quantizes (3 = 5-bit color)
    pub color_depth_shift: u8,
    /// Snap grid resolution, in grid cells across NDC [-1, 1]
    pub snap_resolution: (f32, f32),
    /// Ambient light intensity (0.0-1.0)
    pub ambient: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            wireframe: false,
            lighting: true,
            texturing: true,
            backface_culling: true,
            vertex_snapping: true,
            dithering: true,
            smooth_shading: true,
            color_depth_shift: 3,
            snap_resolution: (320.0, 240.0),
            ambient: 0.3,
        }
    }
}

impl RenderConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RasterError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = ron::from_str(&text)?;
        info!("loaded render config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RasterError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path.as_ref(), text)?;
        info!("saved render config to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_ps1_flavored() {
        let config = RenderConfig::default();
        assert!(config.vertex_snapping);
        assert!(config.dithering);
        assert_eq!(config.color_depth_shift, 3);
        assert_eq!(config.snap_resolution, (320.0, 240.0));
    }

    #[test]
    fn test_ron_roundtrip() {
        let mut config = RenderConfig::default();
        config.wireframe = true;
        config.ambient = 0.5;
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let back: RenderConfig = ron::from_str(&text).unwrap();
        assert!(back.wireframe);
        assert_eq!(back.ambient, 0.5);
    }
}
