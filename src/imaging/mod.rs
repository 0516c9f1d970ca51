//! Image processing: format normalization and square cropping.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageDecoder::dimensions`, swapped for EXIF rotations |
//! | **Orientation** | `DynamicImage::apply_orientation` before cropping |
//! | **HEIC → JPEG** | `libheif-rs` + `JpegEncoder` (`heic` feature) |
//! | **Square crop** | `crop_imm` + `resize_exact` (Lanczos3) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop and grid math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`normalize`] and [`crop_to_square`], combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    CellRect, CropWindow, GridLayout, GridSpec, MAX_THUMBNAIL_SIZE, calculate_center_square,
    calculate_grid,
};
pub use operations::{ConversionError, DecodeError, crop_to_square, is_heic_mime, normalize};
pub use params::{ConvertParams, CropParams, Quality};
pub use rust_backend::{HEIC_SUPPORTED, RustBackend};
