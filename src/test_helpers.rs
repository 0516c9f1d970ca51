//! Shared test utilities: synthetic images and source files.
//!
//! Images are generated in memory with a gradient so decoders have real
//! content to chew on, and so crops of different regions differ.

use crate::types::SourceFile;
use image::{ImageEncoder, RgbImage};

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Encode any RGB image as JPEG.
pub fn jpeg_of(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    buf
}

/// Encode a `width × height` gradient as JPEG.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    jpeg_of(&gradient(width, height))
}

/// Add an EXIF APP1 segment carrying only an orientation tag to a JPEG.
///
/// The segment goes after the JFIF APP0 header when there is one.
pub fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"Exif\0\0");
    // Little-endian TIFF header, first IFD at offset 8.
    tiff.extend_from_slice(&[b'I', b'I', 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]);
    // One entry: tag 0x0112 (Orientation), SHORT, count 1.
    tiff.extend_from_slice(&[0x01, 0x00, 0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00]);
    tiff.extend_from_slice(&orientation.to_le_bytes());
    tiff.extend_from_slice(&[0x00, 0x00]);
    // No next IFD.
    tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&(tiff.len() as u16 + 2).to_be_bytes());
    segment.extend_from_slice(&tiff);

    let at = if jpeg[2..4] == [0xFF, 0xE0] {
        4 + usize::from(u16::from_be_bytes([jpeg[4], jpeg[5]]))
    } else {
        2
    };
    let mut out = jpeg[..at].to_vec();
    out.extend_from_slice(&segment);
    out.extend_from_slice(&jpeg[at..]);
    out
}

/// Encode a `width × height` gradient as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// A JPEG source file with the MIME type a browser would declare.
pub fn jpeg_source(name: &str, width: u32, height: u32) -> SourceFile {
    SourceFile::new(name, "image/jpeg", jpeg_bytes(width, height))
}

/// A PNG source file with the MIME type a browser would declare.
pub fn png_source(name: &str, width: u32, height: u32) -> SourceFile {
    SourceFile::new(name, "image/png", png_bytes(width, height))
}

/// Encode a solid `width × height` image as HEIC.
///
/// `None` when the installed libheif has no HEVC encoder plugin.
#[cfg(feature = "heic")]
pub fn heic_bytes(width: u32, height: u32) -> Option<Vec<u8>> {
    use libheif_rs::{
        Channel, ColorSpace, CompressionFormat, EncoderQuality, HeifContext, Image, LibHeif,
        RgbChroma,
    };

    let lib = LibHeif::new();
    let mut encoder = lib.encoder_for_format(CompressionFormat::Hevc).ok()?;
    encoder.set_quality(EncoderQuality::Lossy(90)).unwrap();

    let mut image = Image::new(width, height, ColorSpace::Rgb(RgbChroma::Rgb)).unwrap();
    image
        .create_plane(Channel::Interleaved, width, height, 8)
        .unwrap();
    let planes = image.planes_mut();
    let mut plane = planes.interleaved.unwrap();
    for row in plane.data.chunks_mut(plane.stride).take(height as usize) {
        for px in row[..width as usize * 3].chunks_mut(3) {
            px.copy_from_slice(&[200, 60, 40]);
        }
    }

    let mut context = HeifContext::new().unwrap();
    context.encode_image(&image, &mut encoder, None).unwrap();
    Some(context.write_to_bytes().unwrap())
}

/// A HEIC source file whose bytes no decoder will accept.
pub fn corrupt_heic_source(name: &str) -> SourceFile {
    SourceFile::new(name, "image/heic", b"CORRUPT not really heic".to_vec())
}
