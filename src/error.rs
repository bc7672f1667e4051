//! Error type for the fallible edges of the crate.
//!
//! The draw path itself never returns errors: degenerate or out-of-range
//! geometry is rejected silently. Only texture decoding and config file
//! I/O can actually fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("failed to decode texture: {0}")]
    Texture(#[from] image::ImageError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    #[error("failed to serialize config: {0}")]
    ConfigWrite(#[from] ron::Error),
}
