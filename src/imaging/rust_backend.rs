//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageDecoder::dimensions` + `orientation` (header only) |
//! | Decode (JPEG, PNG, WebP) | `image` crate (pure Rust decoders) |
//! | EXIF orientation | `DynamicImage::apply_orientation` |
//! | Decode (HEIC/HEIF) | `libheif-rs`, behind the `heic` feature |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Square crop | `DynamicImage::crop_imm` |
//! | Resample | `DynamicImage::resize_exact` with `Lanczos3` |
//!
//! Dimensions and pixels are both reported upright: a phone portrait stored
//! sideways with EXIF orientation 6 identifies as portrait and is cropped
//! after rotation.
//!
//! HEIC is the one format with no pure Rust decoder. Builds without the
//! `heic` feature still accept HEIC files at the type gate; conversion then
//! fails per file with a clear error instead of aborting the batch.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{ConvertParams, CropParams};
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbaImage};
use std::io::Cursor;

/// Whether this build can decode HEIC/HEIF (the `heic` feature).
pub const HEIC_SUPPORTED: bool = cfg!(feature = "heic");

/// Backend built on the `image` crate.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn reader(data: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| BackendError::Decode(format!("could not read image header: {e}")))
}

/// Decoder for `data` and the orientation its metadata asks for.
///
/// Missing or unreadable orientation metadata counts as upright.
fn oriented_decoder(
    data: &[u8],
) -> Result<(impl ImageDecoder + '_, Orientation), BackendError> {
    let mut decoder = reader(data)?
        .into_decoder()
        .map_err(|e| BackendError::Decode(format!("could not read image header: {e}")))?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    Ok((decoder, orientation))
}

/// Whether displaying with `orientation` swaps width and height.
fn swaps_axes(orientation: Orientation) -> bool {
    matches!(
        orientation,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    )
}

/// Decode an in-memory image and turn it upright.
fn load_image(data: &[u8]) -> Result<DynamicImage, BackendError> {
    let (decoder, orientation) = oriented_decoder(data)?;
    let mut img = DynamicImage::from_decoder(decoder)
        .map_err(|e| BackendError::Decode(format!("invalid image data: {e}")))?;
    if orientation != Orientation::NoTransforms {
        tracing::debug!(?orientation, "applying EXIF orientation");
        img.apply_orientation(orientation);
    }
    Ok(img)
}

/// Encode interleaved RGB8 pixels as JPEG.
#[cfg(feature = "heic")]
fn encode_jpeg(rgb: &[u8], width: u32, height: u32, quality: u32) -> Result<Vec<u8>, BackendError> {
    use image::ImageEncoder;

    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality as u8)
        .write_image(rgb, width, height, image::ExtendedColorType::Rgb8)
        .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {e}")))?;
    Ok(buf)
}

/// Decode the primary image of a HEIF container to tightly packed RGB8.
#[cfg(feature = "heic")]
fn decode_heic(data: &[u8]) -> Result<(Vec<u8>, u32, u32), BackendError> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let heif_err = |e: libheif_rs::HeifError| BackendError::Decode(format!("libheif: {e}"));

    let lib = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(data).map_err(heif_err)?;
    let handle = ctx.primary_image_handle().map_err(heif_err)?;
    let decoded = lib
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(heif_err)?;

    let planes = decoded.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| BackendError::Decode("HEIC image has no interleaved RGB plane".into()))?;

    // libheif pads rows to `stride`; strip the padding.
    let row_bytes = plane.width as usize * 3;
    let mut rgb = Vec::with_capacity(row_bytes * plane.height as usize);
    for row in plane.data.chunks(plane.stride).take(plane.height as usize) {
        rgb.extend_from_slice(&row[..row_bytes]);
    }
    Ok((rgb, plane.width, plane.height))
}

impl ImageBackend for RustBackend {
    fn identify(&self, data: &[u8]) -> Result<Dimensions, BackendError> {
        let (decoder, orientation) = oriented_decoder(data)?;
        let (width, height) = decoder.dimensions();
        if swaps_axes(orientation) {
            Ok(Dimensions {
                width: height,
                height: width,
            })
        } else {
            Ok(Dimensions { width, height })
        }
    }

    #[cfg(feature = "heic")]
    fn convert_heic(&self, params: &ConvertParams) -> Result<Vec<u8>, BackendError> {
        let (rgb, width, height) = decode_heic(params.data)?;
        tracing::debug!(width, height, quality = params.quality.value(), "decoded HEIC");
        encode_jpeg(&rgb, width, height, params.quality.value())
    }

    #[cfg(not(feature = "heic"))]
    fn convert_heic(&self, params: &ConvertParams) -> Result<Vec<u8>, BackendError> {
        tracing::warn!(
            bytes = params.data.len(),
            "HEIC input but this build has no HEIC decoder"
        );
        Err(BackendError::Unsupported(
            "HEIC decoding is not compiled in (rebuild with --features heic)".into(),
        ))
    }

    fn crop(&self, params: &CropParams) -> Result<RgbaImage, BackendError> {
        let img = load_image(params.data)?;
        let (x, y) = params.window.pixel_origin();
        let side = params.window.side;

        // The window comes from `identify`; a decoder disagreeing about the
        // size means the stream is not what its header claims.
        if u64::from(x) + u64::from(side) > u64::from(img.width())
            || u64::from(y) + u64::from(side) > u64::from(img.height())
        {
            return Err(BackendError::Decode(format!(
                "crop window {side}px at ({x}, {y}) exceeds decoded image {}x{}",
                img.width(),
                img.height()
            )));
        }

        let square = img.crop_imm(x, y, side, side);
        let resampled = if side == params.target_size {
            square
        } else {
            square.resize_exact(params.target_size, params.target_size, FilterType::Lanczos3)
        };
        Ok(resampled.to_rgba8())
    }
}
