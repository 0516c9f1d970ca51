//! High-level image operations.
//!
//! These functions combine calculations with backend execution: they decide
//! whether a file needs converting and where the square crop sits, then hand
//! the pixel work to the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{MAX_THUMBNAIL_SIZE, calculate_center_square};
use super::params::{ConvertParams, CropParams, Quality};
use crate::naming::converted_name;
use crate::types::{NormalizedImage, SourceFile, Thumbnail};
use thiserror::Error;

/// MIME types that need re-encoding before they can be decoded.
const HEIC_MIME_TYPES: &[&str] = &["image/heic", "image/heif"];

/// MIME type of the bytes a HEIC conversion produces.
const CONVERTED_MIME: &str = "image/jpeg";

/// A HEIC/HEIF file could not be converted. Nothing was produced.
#[derive(Error, Debug)]
#[error("Failed to convert HEIC file")]
pub struct ConversionError {
    #[source]
    pub source: BackendError,
}

/// Normalized bytes could not be decoded into pixels.
#[derive(Error, Debug)]
#[error("Failed to decode image: {source}")]
pub struct DecodeError {
    #[source]
    pub source: BackendError,
}

/// Whether a MIME type names a HEIC/HEIF container.
pub fn is_heic_mime(mime: &str) -> bool {
    HEIC_MIME_TYPES
        .iter()
        .any(|m| m.eq_ignore_ascii_case(mime))
}

/// Turn a source file into bytes the crop engine can decode.
///
/// HEIC/HEIF is converted to JPEG at `quality` and renamed to `.jpg`.
/// Everything else passes through untouched, so normalizing an already
/// normalized image yields the same image.
pub fn normalize(
    backend: &impl ImageBackend,
    source: &SourceFile,
    quality: Quality,
) -> Result<NormalizedImage, ConversionError> {
    if !is_heic_mime(&source.mime) {
        return Ok(NormalizedImage {
            name: source.name.clone(),
            mime: source.mime.clone(),
            bytes: source.bytes.clone(),
        });
    }

    let bytes = backend
        .convert_heic(&ConvertParams {
            data: &source.bytes,
            quality,
        })
        .map_err(|source| ConversionError { source })?;

    Ok(NormalizedImage {
        name: converted_name(&source.name),
        mime: CONVERTED_MIME.to_string(),
        bytes,
    })
}

/// Plan a crop without executing it.
///
/// Identifies the image and computes the centered square window. Target
/// sizes outside `1..=MAX_THUMBNAIL_SIZE` are refused before any decoding.
pub fn plan_crop<'a>(
    backend: &impl ImageBackend,
    image: &'a NormalizedImage,
    target_size: u32,
) -> Result<CropParams<'a>, DecodeError> {
    if !(1..=MAX_THUMBNAIL_SIZE).contains(&target_size) {
        return Err(DecodeError {
            source: BackendError::Decode(format!(
                "target size {target_size} outside 1..={MAX_THUMBNAIL_SIZE}"
            )),
        });
    }
    let dims = backend
        .identify(&image.bytes)
        .map_err(|source| DecodeError { source })?;
    let window = calculate_center_square(dims.width, dims.height).ok_or_else(|| DecodeError {
        source: BackendError::Decode(format!(
            "degenerate image {}x{}",
            dims.width, dims.height
        )),
    })?;

    Ok(CropParams {
        data: &image.bytes,
        window,
        target_size,
    })
}

/// Crop a normalized image to a centered `target_size × target_size` square.
pub fn crop_to_square(
    backend: &impl ImageBackend,
    image: &NormalizedImage,
    source_name: &str,
    target_size: u32,
) -> Result<Thumbnail, DecodeError> {
    let params = plan_crop(backend, image, target_size)?;
    let raster = backend
        .crop(&params)
        .map_err(|source| DecodeError { source })?;

    Thumbnail::new(image.name.clone(), source_name, raster).map_err(|e| DecodeError {
        source: BackendError::Decode(e.to_string()),
    })
}
