//! Contact sheet configuration.
//!
//! Handles loading, validating, and merging `contact-sheet.toml`. Stock
//! defaults are the base layer; a user file only needs the keys it wants to
//! change, and command-line flags override individual keys on top of that.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [thumbnails]
//! target_size = 600          # Edge length of every cropped thumbnail raster
//! display_size = 150         # Edge length of a cell on the sheet at 1x
//!
//! [conversion]
//! quality = 0.9              # HEIC -> JPEG re-encode quality (0.0-1.0)
//! accept_heif = true         # Accept image/heif as well as image/heic
//! accept_any_image = false   # Accept any image/* type, not just the allow-set
//! extension_fallback = true  # Resolve an empty MIME type from the extension
//!
//! [export]
//! scale = 2                  # Rasterization multiplier for the final sheet
//! columns = 5                # Grid columns
//! gap = 24                   # Space between cells (px at 1x)
//! padding = 24               # Space around the grid (px at 1x)
//! background = "#ffffff"
//! filename = "contact-sheet.png"
//! labels = true              # Draw each file name above its cell
//! label_height = 24          # Height of the name band (px at 1x)
//! label_color = "#1d4ed8"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::MAX_THUMBNAIL_SIZE;
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config file name looked up in the working directory.
pub const CONFIG_FILENAME: &str = "contact-sheet.toml";

/// Largest accepted `export.scale`.
pub const MAX_EXPORT_SCALE: u32 = 64;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    /// Thumbnail raster and display sizes.
    pub thumbnails: ThumbnailsConfig,
    /// Type gate and HEIC conversion settings.
    pub conversion: ConversionConfig,
    /// Final sheet layout and rasterization.
    pub export: ExportConfig,
}

impl SheetConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.thumbnails.target_size == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.target_size must be non-zero".into(),
            ));
        }
        if self.thumbnails.target_size > MAX_THUMBNAIL_SIZE {
            return Err(ConfigError::Validation(format!(
                "thumbnails.target_size must be at most {MAX_THUMBNAIL_SIZE}"
            )));
        }
        if self.thumbnails.display_size == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.display_size must be non-zero".into(),
            ));
        }
        if self.thumbnails.display_size > MAX_THUMBNAIL_SIZE {
            return Err(ConfigError::Validation(format!(
                "thumbnails.display_size must be at most {MAX_THUMBNAIL_SIZE}"
            )));
        }
        if !(0.0..=1.0).contains(&self.conversion.quality) {
            return Err(ConfigError::Validation(
                "conversion.quality must be between 0.0 and 1.0".into(),
            ));
        }
        if !(1..=MAX_EXPORT_SCALE).contains(&self.export.scale) {
            return Err(ConfigError::Validation(format!(
                "export.scale must be between 1 and {MAX_EXPORT_SCALE}"
            )));
        }
        if self.export.columns == 0 {
            return Err(ConfigError::Validation(
                "export.columns must be at least 1".into(),
            ));
        }
        if self.export.filename.trim().is_empty() {
            return Err(ConfigError::Validation(
                "export.filename must not be empty".into(),
            ));
        }
        if self.export.label_height > MAX_THUMBNAIL_SIZE {
            return Err(ConfigError::Validation(format!(
                "export.label_height must be at most {MAX_THUMBNAIL_SIZE}"
            )));
        }
        parse_hex_color(&self.export.background)?;
        parse_hex_color(&self.export.label_color)?;
        Ok(())
    }
}

/// Thumbnail sizes.
///
/// `target_size` is the pixel size of the cropped raster; `display_size` is
/// how big a cell is drawn on the sheet at 1x. Keeping the raster larger
/// than the cell gives high export scales real detail to work with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    pub target_size: u32,
    pub display_size: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            target_size: 600,
            display_size: 150,
        }
    }
}

/// Type gate and format conversion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionConfig {
    /// HEIC → JPEG re-encode quality as a fraction (0.0 = worst, 1.0 = best).
    pub quality: f32,
    /// Treat `image/heif` like `image/heic`.
    pub accept_heif: bool,
    /// Accept any `image/*` MIME type. Undecodable ones fail at decode time.
    pub accept_any_image: bool,
    /// When the declared MIME type is empty, infer it from the file extension.
    pub extension_fallback: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            quality: 0.9,
            accept_heif: true,
            accept_any_image: false,
            extension_fallback: true,
        }
    }
}

/// Sheet layout and export settings. Pixel values are at 1x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub scale: u32,
    pub columns: u32,
    pub gap: u32,
    pub padding: u32,
    /// Canvas colour as `#rrggbb` or `#rrggbbaa`.
    pub background: String,
    /// Output file name used when no explicit path is given.
    pub filename: String,
    /// Draw each photo's display name in a band above its cell.
    pub labels: bool,
    pub label_height: u32,
    pub label_color: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 2,
            columns: 5,
            gap: 24,
            padding: 24,
            background: "#ffffff".to_string(),
            filename: "contact-sheet.png".to_string(),
            labels: true,
            label_height: 24,
            label_color: "#1d4ed8".to_string(),
        }
    }
}

impl ExportConfig {
    /// Background colour as RGBA. Call after [`SheetConfig::validate`].
    pub fn background_rgba(&self) -> Result<Rgba<u8>, ConfigError> {
        parse_hex_color(&self.background)
    }

    pub fn label_rgba(&self) -> Result<Rgba<u8>, ConfigError> {
        parse_hex_color(&self.label_color)
    }

    /// Height of the name band at 1x, `0` when labels are off.
    pub fn label_band(&self) -> u32 {
        if self.labels { self.label_height } else { 0 }
    }
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` into an RGBA pixel.
pub fn parse_hex_color(value: &str) -> Result<Rgba<u8>, ConfigError> {
    let invalid = || ConfigError::Validation(format!("invalid colour '{value}'"));
    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if !hex.is_ascii() {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = channel(&c.to_string())?;
                rgb[i] = v * 16 + v;
            }
            Ok(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 | 8 => {
            let r = channel(&hex[0..2])?;
            let g = channel(&hex[2..4])?;
            let b = channel(&hex[4..6])?;
            let a = if hex.len() == 8 {
                channel(&hex[6..8])?
            } else {
                255
            };
            Ok(Rgba([r, g, b, a]))
        }
        _ => Err(invalid()),
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SheetConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SheetConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SheetConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults if it is absent.
pub fn load_config(path: &Path) -> Result<SheetConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock config file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Contact Sheet Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Edge length (px) of every cropped thumbnail raster.
# Keep this at least display_size * export.scale to avoid visible upscaling.
target_size = 600

# Edge length (px) of a cell on the sheet at 1x.
display_size = 150

# ---------------------------------------------------------------------------
# Type gate and HEIC conversion
# ---------------------------------------------------------------------------
[conversion]
# HEIC -> JPEG re-encode quality (0.0 = worst, 1.0 = best).
quality = 0.9

# Accept image/heif as well as image/heic.
accept_heif = true

# Accept any image/* type. Formats that cannot be decoded are reported per file.
accept_any_image = false

# When a file has no declared MIME type, infer it from the extension.
extension_fallback = true

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# Rasterization multiplier for the final sheet.
scale = 2

# Grid columns.
columns = 5

# Space between cells and around the grid (px at 1x).
gap = 24
padding = 24

# Canvas colour (#rgb, #rrggbb or #rrggbbaa).
background = "#ffffff"

# Output file name.
filename = "contact-sheet.png"

# Draw each photo's name in a band above its cell.
labels = true

# Height of the name band (px at 1x) and the colour of the text.
label_height = 24
label_color = "#1d4ed8"
"##
}
