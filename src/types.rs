//! Shared types passed between pipeline stages.
//!
//! A photo moves through three shapes on its way into the sheet:
//!
//! ```text
//! SourceFile  →  NormalizedImage  →  Thumbnail
//! (as given)     (decodable bytes)   (square raster, owned by the sheet)
//! ```

use image::RgbaImage;
use std::io::Cursor;
use thiserror::Error;

/// A file as submitted by the user: raw bytes plus the MIME type the caller
/// declared for it. Nothing here has been validated yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Display name, usually the submitted filename.
    pub name: String,
    /// Declared MIME type. May be empty when the caller could not tell.
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

/// Bytes in a format the crop engine can decode (JPEG, PNG or WebP).
///
/// `name` reflects any conversion: `IMG_0001.heic` becomes `IMG_0001.jpg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl From<NormalizedImage> for SourceFile {
    fn from(image: NormalizedImage) -> Self {
        SourceFile::new(image.name, image.mime, image.bytes)
    }
}

/// A raster handed to [`Thumbnail::new`] that is not a non-empty square.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("thumbnail raster must be a non-empty square, got {width}x{height}")]
pub struct NotSquare {
    pub width: u32,
    pub height: u32,
}

/// A square, fixed-size raster ready to be placed on the sheet.
///
/// The raster is private so a thumbnail can only exist with equal, non-zero
/// edges.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    /// Name shown next to the thumbnail (post-conversion).
    pub display_name: String,
    /// Name of the file this thumbnail was cut from.
    pub source_name: String,
    raster: RgbaImage,
}

impl Thumbnail {
    pub fn new(
        display_name: impl Into<String>,
        source_name: impl Into<String>,
        raster: RgbaImage,
    ) -> Result<Self, NotSquare> {
        let (width, height) = raster.dimensions();
        if width != height || width == 0 {
            return Err(NotSquare { width, height });
        }
        Ok(Self {
            display_name: display_name.into(),
            source_name: source_name.into(),
            raster,
        })
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    /// Edge length in pixels. Width and height are always equal.
    pub fn size(&self) -> u32 {
        self.raster.width()
    }

    /// Encode the raster as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buf = Cursor::new(Vec::new());
        self.raster.write_to(&mut buf, image::ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}
