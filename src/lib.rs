//! PS1-style software triangle rasterizer
//!
//! Emulates a fixed-function, early-90s-console rendering pipeline:
//! - Affine texture mapping (no perspective correction = warpy textures)
//! - Vertex snapping (coarse NDC grid = jittery vertices)
//! - Ordered (Bayer) dithering down to reduced color depth
//! - 16-bit fixed-point depth buffer
//!
//! The scalar rasterizer in [`raster`] is the reference algorithm; the
//! batched path in [`batch`] is a pixel-identical SIMD reformulation of
//! its untextured branch.

pub mod batch;
pub mod color;
pub mod config;
pub mod error;
pub mod framebuffer;
pub mod light;
pub mod math;
pub mod mesh;
pub mod overlay;
pub mod raster;
pub mod renderer;
pub mod texture;
pub mod vertex;

pub use color::Color;
pub use config::RenderConfig;
pub use error::RasterError;
pub use framebuffer::{depth_to_fixed, Framebuffer, DEPTH_CLEAR, MAX_HEIGHT, MAX_WIDTH};
pub use light::Light;
pub use math::{Mat4, Vec2, Vec3};
pub use mesh::{create_test_cube, faces_from_indices, Face, Vertex};
pub use renderer::Renderer;
pub use texture::Texture;
pub use vertex::ProcessedVertex;

/// Native render resolution (authentic PS1)
pub const WIDTH: usize = 320;
pub const HEIGHT: usize = 240;
