//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what to convert and where to crop) and the
//! [`backend`](super::backend) (which does the actual pixel work). Swapping
//! the backend for a mock in tests leaves the operation logic untouched.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 90). Clamped on construction.
//! - [`ConvertParams`]: HEIC/HEIF bytes plus the quality to re-encode them at.
//! - [`CropParams`]: Encoded bytes, the square window to cut, and the output edge length.

use super::calculations::CropWindow;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    /// Build from a `0.0..=1.0` fraction, the way config expresses it.
    pub fn from_fraction(fraction: f32) -> Self {
        Self::new((fraction.clamp(0.0, 1.0) * 100.0).round() as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Parameters for a HEIC/HEIF → JPEG conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertParams<'a> {
    pub data: &'a [u8],
    pub quality: Quality,
}

/// Parameters for a square crop-and-resample.
#[derive(Debug, Clone, PartialEq)]
pub struct CropParams<'a> {
    pub data: &'a [u8],
    pub window: CropWindow,
    /// Edge length of the output raster.
    pub target_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn quality_from_fraction() {
        assert_eq!(Quality::from_fraction(0.9).value(), 90);
        assert_eq!(Quality::from_fraction(1.0).value(), 100);
        assert_eq!(Quality::from_fraction(0.0).value(), 1);
        assert_eq!(Quality::from_fraction(0.5).value(), 50);
        assert_eq!(Quality::from_fraction(2.0).value(), 100);
    }
}
