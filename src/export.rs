//! Sheet export: lay the thumbnails out on a grid and encode one PNG.
//!
//! The layout is computed at 1× from the display size, gap, padding and name
//! band, then every pixel dimension is multiplied by `export.scale`:
//!
//! ```text
//! columns = min(export.columns, count)      rows = ceil(count / columns)
//! label   = export.label_height, or 0 with export.labels off
//! width   = 2·padding + columns·display_size           + (columns − 1)·gap
//! height  = 2·padding + rows·(label + display_size)    + (rows − 1)·gap
//! ```
//!
//! With the defaults (display 150, gap 24, padding 24, label 24, scale 2)
//! three photos give a 1092×444 PNG. Canvases above [`MAX_SHEET_PIXELS`] are
//! refused with [`ExportError::TooLarge`] before anything is allocated.
//!
//! Names are drawn with the 8×8 bitmap font from `font8x8`, scaled by whole
//! pixels to the band height and cut with `...` when wider than the cell.
//!
//! The PNG is encoded fully in memory before anything touches the disk, so a
//! failed export leaves no partial file behind.

use crate::config::{ConfigError, SheetConfig};
use crate::imaging::{CellRect, GridLayout, GridSpec, calculate_grid};
use crate::sheet::ContactSheet;
use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// Largest canvas `render` will allocate (1 GiB of RGBA).
pub const MAX_SHEET_PIXELS: u64 = 1 << 28;

/// Edge of an unscaled font8x8 glyph.
const GLYPH: u32 = 8;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Contact sheet is empty, nothing to export")]
    EmptySheet,
    #[error("Sheet of {count} photos at scale {scale} is too large to render")]
    TooLarge { count: usize, scale: u32 },
    #[error("PNG encode failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Layout sidecar written next to the sheet with `--manifest`.
///
/// All coordinates are in exported (scaled) pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetManifest {
    pub width: u32,
    pub height: u32,
    pub scale: u32,
    pub columns: u32,
    pub rows: u32,
    /// Height of the name band above each cell, `0` without labels.
    pub label: u32,
    pub cells: Vec<ManifestCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestCell {
    /// Name shown for the photo (`.jpg` for converted HEIC).
    pub name: String,
    /// Name of the file as it was submitted.
    pub source: String,
    pub x: u32,
    pub y: u32,
    pub size: u32,
    /// Top of the name band.
    pub label_y: u32,
}

/// Grid for `count` photos at `scale`.
///
/// Fails with [`ExportError::TooLarge`] when the canvas would exceed
/// [`MAX_SHEET_PIXELS`].
pub fn layout(count: usize, config: &SheetConfig, scale: u32) -> Result<GridLayout, ExportError> {
    if count == 0 {
        return Err(ExportError::EmptySheet);
    }
    let too_large = || ExportError::TooLarge { count, scale };
    let spec = GridSpec {
        max_columns: config.export.columns,
        cell: config.thumbnails.display_size,
        gap: config.export.gap,
        padding: config.export.padding,
        label: config.export.label_band(),
    }
    .scaled(scale)
    .ok_or_else(too_large)?;
    let grid = calculate_grid(count, spec).ok_or_else(too_large)?;
    if grid.pixel_count() > MAX_SHEET_PIXELS {
        tracing::warn!(
            width = grid.width,
            height = grid.height,
            limit = MAX_SHEET_PIXELS,
            "sheet exceeds pixel budget"
        );
        return Err(too_large());
    }
    Ok(grid)
}

/// Describe where every photo lands on the exported sheet.
pub fn manifest(sheet: &ContactSheet, config: &SheetConfig) -> Result<SheetManifest, ExportError> {
    let scale = config.export.scale;
    let grid = layout(sheet.len(), config, scale)?;
    let cells = sheet
        .thumbnails()
        .zip(&grid.cells)
        .map(|(thumb, cell)| ManifestCell {
            name: thumb.display_name.clone(),
            source: thumb.source_name.clone(),
            x: cell.x,
            y: cell.y,
            size: cell.size,
            label_y: cell.label_y,
        })
        .collect();

    Ok(SheetManifest {
        width: grid.width,
        height: grid.height,
        scale,
        columns: grid.columns,
        rows: grid.rows,
        label: grid.label,
        cells,
    })
}

/// Compose the sheet into one RGBA canvas at `export.scale`.
pub fn render(sheet: &ContactSheet, config: &SheetConfig) -> Result<RgbaImage, ExportError> {
    let scale = config.export.scale;
    let grid = layout(sheet.len(), config, scale)?;
    let background = config.export.background_rgba()?;
    let label_color = config.export.label_rgba()?;

    tracing::debug!(
        photos = sheet.len(),
        width = grid.width,
        height = grid.height,
        scale,
        "rendering sheet"
    );

    let mut canvas = RgbaImage::from_pixel(grid.width, grid.height, background);
    for (thumb, cell) in sheet.thumbnails().zip(&grid.cells) {
        if thumb.size() == cell.size {
            imageops::overlay(&mut canvas, thumb.raster(), cell.x.into(), cell.y.into());
        } else {
            let resized =
                imageops::resize(thumb.raster(), cell.size, cell.size, FilterType::Lanczos3);
            imageops::overlay(&mut canvas, &resized, cell.x.into(), cell.y.into());
        }
        if grid.label > 0 {
            draw_label(&mut canvas, &thumb.display_name, cell, grid.label, label_color);
        }
    }
    Ok(canvas)
}

/// Draw `text` left-aligned and vertically centered in the band above `cell`.
///
/// Glyphs are scaled by `band / 16` (at least 1). Nothing is drawn when even
/// an unscaled glyph is taller than the band.
fn draw_label(canvas: &mut RgbaImage, text: &str, cell: &CellRect, band: u32, color: Rgba<u8>) {
    let scale = (band / 16).max(1);
    let glyph_size = GLYPH * scale;
    if glyph_size > band {
        return;
    }
    let top = cell.label_y + (band - glyph_size) / 2;
    let max_chars = (cell.size / glyph_size) as usize;

    for (i, ch) in fit_label(text, max_chars).chars().enumerate() {
        let left = cell.x + i as u32 * glyph_size;
        for (row, bits) in (0u32..).zip(glyph(ch)) {
            for col in (0..GLYPH).filter(|col| (bits >> col) & 1 == 1) {
                let x0 = left + col * scale;
                let y0 = top + row * scale;
                for y in y0..(y0 + scale).min(canvas.height()) {
                    for x in x0..(x0 + scale).min(canvas.width()) {
                        canvas.put_pixel(x, y, color);
                    }
                }
            }
        }
    }
}

/// Bitmap for `ch`, falling back to `?` for characters the font lacks.
fn glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

/// Cut `name` to at most `max_chars` characters, ending in `...` when cut.
fn fit_label(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    if max_chars <= 3 {
        return name.chars().take(max_chars).collect();
    }
    let mut cut: String = name.chars().take(max_chars - 3).collect();
    cut.push_str("...");
    cut
}

/// Render the sheet and encode it as PNG bytes.
pub fn export_png(sheet: &ContactSheet, config: &SheetConfig) -> Result<Vec<u8>, ExportError> {
    let canvas = render(sheet, config)?;
    let mut buf = Cursor::new(Vec::new());
    canvas.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Render, encode, and write the sheet to `path`.
///
/// Returns the layout that was written so callers can report it or save
/// it as a sidecar.
pub fn export(
    sheet: &ContactSheet,
    config: &SheetConfig,
    path: &Path,
) -> Result<SheetManifest, ExportError> {
    let layout = manifest(sheet, config)?;
    let png = export_png(sheet, config)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &png)?;
    tracing::debug!(path = %path.display(), bytes = png.len(), "wrote sheet");
    Ok(layout)
}

/// Save a layout sidecar as pretty JSON.
pub fn write_manifest(manifest: &SheetManifest, path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Thumbnail;
    use image::Rgba;
    use tempfile::TempDir;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn solid(name: &str, size: u32, color: Rgba<u8>) -> Thumbnail {
        Thumbnail::new(name, name, RgbaImage::from_pixel(size, size, color)).unwrap()
    }

    fn rgb_sheet() -> ContactSheet {
        let mut sheet = ContactSheet::new();
        sheet.push(solid("r.jpg", 600, RED));
        sheet.push(solid("g.png", 600, GREEN));
        sheet.push(solid("b.webp", 600, BLUE));
        sheet
    }

    /// Lanczos can ring by a unit or two even on flat colour.
    fn assert_close(actual: Rgba<u8>, expected: Rgba<u8>) {
        for (a, e) in actual.0.iter().zip(expected.0.iter()) {
            assert!(a.abs_diff(*e) <= 3, "{actual:?} != {expected:?}");
        }
    }

    fn unlabelled() -> SheetConfig {
        let mut config = SheetConfig::default();
        config.export.labels = false;
        config
    }

    /// Whether any pixel in the rectangle has `color`.
    fn any_pixel(canvas: &RgbaImage, x: std::ops::Range<u32>, y: std::ops::Range<u32>, color: Rgba<u8>) -> bool {
        y.flat_map(|py| x.clone().map(move |px| (px, py)))
            .any(|(px, py)| *canvas.get_pixel(px, py) == color)
    }

    #[test]
    fn layout_matches_formula_at_1x() {
        let grid = layout(3, &SheetConfig::default(), 1).unwrap();
        assert_eq!((grid.columns, grid.rows), (3, 1));
        // 2·24 + (24 + 150)
        assert_eq!((grid.width, grid.height), (546, 222));
        assert_eq!(grid.label, 24);
    }

    #[test]
    fn layout_wraps_after_configured_columns() {
        let grid = layout(7, &SheetConfig::default(), 1).unwrap();
        assert_eq!((grid.columns, grid.rows), (5, 2));
        // 2·24 + 5·150 + 4·24
        assert_eq!(grid.width, 894);
        // 2·24 + 2·(24 + 150) + 1·24
        assert_eq!(grid.height, 420);
        assert_eq!((grid.cells[5].x, grid.cells[5].label_y, grid.cells[5].y), (24, 222, 246));
    }

    #[test]
    fn label_band_changes_layout_height() {
        let labelled = layout(7, &SheetConfig::default(), 2).unwrap();
        let plain = layout(7, &unlabelled(), 2).unwrap();
        assert_eq!(labelled.width, plain.width);
        // Two rows, each 48px taller at scale 2.
        assert_eq!(labelled.height - plain.height, 2 * 48);
        assert_eq!(plain.label, 0);
        assert_eq!((plain.cells[0].x, plain.cells[0].y), (48, 48));
    }

    #[test]
    fn empty_sheet_is_an_error() {
        let sheet = ContactSheet::new();
        assert!(matches!(
            export_png(&sheet, &SheetConfig::default()),
            Err(ExportError::EmptySheet)
        ));
    }

    #[test]
    fn oversized_layout_is_too_large() {
        let mut config = SheetConfig::default();
        config.export.scale = u32::MAX;
        assert!(matches!(
            layout(1, &config, config.export.scale),
            Err(ExportError::TooLarge { count: 1, .. })
        ));
    }

    #[test]
    fn canvas_that_fits_u32_but_not_memory_is_too_large() {
        // 2.5 gigapixel edges fit in u32 but would abort the allocator.
        let mut config = SheetConfig::default();
        config.thumbnails.display_size = 50_000;
        config.export.scale = 50_000;
        let mut sheet = ContactSheet::new();
        sheet.push(solid("a.jpg", 4, RED));

        assert!(matches!(
            render(&sheet, &config),
            Err(ExportError::TooLarge { count: 1, scale: 50_000 })
        ));
    }

    #[test]
    fn thousand_photos_at_scale_16_is_too_large() {
        let config = SheetConfig::default();
        assert!(matches!(
            layout(1000, &config, 16),
            Err(ExportError::TooLarge { count: 1000, .. })
        ));
        assert!(layout(1000, &config, 1).is_ok());
    }

    #[test]
    fn render_places_thumbnails_in_order() {
        let canvas = render(&rgb_sheet(), &SheetConfig::default()).unwrap();
        assert_eq!(canvas.dimensions(), (1092, 444));

        // Cell centres at scale 2: x = 48 + i·348 + 150, y = 48 + 48 + 150.
        assert_close(*canvas.get_pixel(198, 246), RED);
        assert_close(*canvas.get_pixel(546, 246), GREEN);
        assert_close(*canvas.get_pixel(894, 246), BLUE);

        // Padding and gaps show the background.
        assert_eq!(*canvas.get_pixel(0, 0), WHITE);
        assert_eq!(*canvas.get_pixel(360, 246), WHITE);
        assert_eq!(*canvas.get_pixel(198, 440), WHITE);
    }

    #[test]
    fn render_draws_names_in_the_label_band() {
        let config = SheetConfig::default();
        let ink = config.export.label_rgba().unwrap();
        let canvas = render(&rgb_sheet(), &config).unwrap();

        // Band is y 48..96; 24px glyphs sit at y 60..84 starting at the cell's x.
        assert!(any_pixel(&canvas, 48..48 + 5 * 24, 60..84, ink));
        assert!(any_pixel(&canvas, 396..396 + 5 * 24, 60..84, ink));
        // Band edges and the space past the name stay clear.
        assert!(!any_pixel(&canvas, 48..348, 48..60, ink));
        assert!(!any_pixel(&canvas, 48 + 5 * 24..348, 48..96, ink));
    }

    #[test]
    fn render_without_labels_leaves_band_out() {
        let config = unlabelled();
        let ink = config.export.label_rgba().unwrap();
        let canvas = render(&rgb_sheet(), &config).unwrap();
        assert_eq!(canvas.dimensions(), (1092, 396));
        assert!(!any_pixel(&canvas, 0..1092, 0..396, ink));
        assert_close(*canvas.get_pixel(198, 198), RED);
    }

    #[test]
    fn long_names_are_cut_to_the_cell() {
        assert_eq!(fit_label("IMG_0042.jpg", 12), "IMG_0042.jpg");
        assert_eq!(fit_label("IMG_20240101_120000.jpg", 12), "IMG_20240...");
        assert_eq!(fit_label("abcdef", 2), "ab");
        assert_eq!(fit_label("café.png", 20), "café.png");
    }

    #[test]
    fn unknown_characters_fall_back_to_question_mark() {
        assert_eq!(glyph('\u{1F4F7}'), glyph('?'));
        assert_ne!(glyph('é'), glyph('?'));
        assert_eq!(glyph(' '), [0; 8]);
    }

    #[test]
    fn render_uses_configured_background() {
        let mut config = SheetConfig::default();
        config.export.background = "#000000".into();
        let canvas = render(&rgb_sheet(), &config).unwrap();
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn render_skips_resample_when_sizes_match() {
        let mut config = unlabelled();
        config.export.scale = 1;
        config.thumbnails.display_size = 4;
        config.export.padding = 0;
        config.export.gap = 0;

        let mut raster = RgbaImage::from_pixel(4, 4, RED);
        raster.put_pixel(0, 0, BLUE);
        let mut sheet = ContactSheet::new();
        sheet.push(Thumbnail::new("a.jpg", "a.jpg", raster.clone()).unwrap());

        assert_eq!(render(&sheet, &config).unwrap(), raster);
    }

    #[test]
    fn export_png_decodes_to_scaled_layout() {
        let mut config = SheetConfig::default();
        config.export.scale = 1;
        let png = export_png(&rgb_sheet(), &config).unwrap();

        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (546, 222));
    }

    #[test]
    fn manifest_lists_cells_in_sheet_order() {
        let m = manifest(&rgb_sheet(), &SheetConfig::default()).unwrap();
        assert_eq!((m.width, m.height, m.scale, m.label), (1092, 444, 2, 48));
        let names: Vec<_> = m.cells.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["r.jpg", "g.png", "b.webp"]);
        let cell = &m.cells[1];
        assert_eq!((cell.x, cell.y, cell.size, cell.label_y), (396, 96, 300, 48));
    }

    #[test]
    fn export_writes_png_and_manifest() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("nested").join("sheet.png");
        let sidecar = tmp.path().join("sheet.json");

        let m = export(&rgb_sheet(), &SheetConfig::default(), &out).unwrap();
        write_manifest(&m, &sidecar).unwrap();

        let (w, h) = image::image_dimensions(&out).unwrap();
        assert_eq!((w, h), (1092, 444));

        let json = std::fs::read_to_string(&sidecar).unwrap();
        let parsed: SheetManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, m);
    }

    #[test]
    fn failed_export_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("sheet.png");

        let result = export(&ContactSheet::new(), &SheetConfig::default(), &out);
        assert!(matches!(result, Err(ExportError::EmptySheet)));
        assert!(!out.exists());
    }
}
