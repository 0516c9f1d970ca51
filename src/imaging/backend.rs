//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the pipeline needs
//! from a pixel library: identify, convert_heic, and crop.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate with optional `libheif` support for HEIC/HEIF input.

use super::params::{ConvertParams, CropParams};
use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{0}")]
    Decode(String),
    #[error("{0}")]
    Encode(String),
    #[error("{0}")]
    Unsupported(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Every backend works on in-memory bytes only; reading files is the
/// caller's business.
pub trait ImageBackend: Sync {
    /// Read image dimensions from encoded bytes.
    fn identify(&self, data: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode HEIC/HEIF bytes and re-encode them as JPEG.
    fn convert_heic(&self, params: &ConvertParams) -> Result<Vec<u8>, BackendError>;

    /// Decode, cut the square window, and resample it to `target_size`.
    fn crop(&self, params: &CropParams) -> Result<RgbaImage, BackendError>;
}
