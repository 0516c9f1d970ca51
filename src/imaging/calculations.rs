//! Pure calculation functions for crop windows and sheet layout.
//!
//! All functions here are pure and testable without any I/O or images.

/// A centered square window inside a `width × height` image.
///
/// Offsets are kept as `f64` because an odd difference between the edges
/// puts the true center on a half pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropWindow {
    pub offset_x: f64,
    pub offset_y: f64,
    pub side: u32,
}

impl CropWindow {
    /// Integer origin of the window in source pixels.
    ///
    /// Both axes are floored the same way, so a half-pixel center never
    /// favours one axis over the other.
    pub fn pixel_origin(&self) -> (u32, u32) {
        (self.offset_x.floor() as u32, self.offset_y.floor() as u32)
    }
}

/// Calculate the centered square crop for an image.
///
/// Returns `None` for degenerate images (zero width or height).
///
/// # Examples
/// ```
/// # use contact_sheet::imaging::calculate_center_square;
/// // 4000x3000 landscape → 3000px square, 500px in from the left
/// let w = calculate_center_square(4000, 3000).unwrap();
/// assert_eq!((w.offset_x, w.offset_y, w.side), (500.0, 0.0, 3000));
/// ```
pub fn calculate_center_square(width: u32, height: u32) -> Option<CropWindow> {
    if width == 0 || height == 0 {
        return None;
    }
    let side = width.min(height);
    let offset = |edge: u32| (edge - side) as f64 / 2.0;
    Some(CropWindow {
        offset_x: offset(width),
        offset_y: offset(height),
        side,
    })
}

/// Largest thumbnail edge the crop engine will render.
pub const MAX_THUMBNAIL_SIZE: u32 = 8192;

/// Pixel rectangle of one cell on the sheet.
///
/// `label_y` is the top of the name band above the image; it equals `y`
/// when the sheet has no labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x: u32,
    pub y: u32,
    pub size: u32,
    pub label_y: u32,
}

/// Grid geometry for a sheet of square cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
    pub width: u32,
    pub height: u32,
    /// Height of the name band above each cell.
    pub label: u32,
    pub cells: Vec<CellRect>,
}

impl GridLayout {
    /// Number of pixels in the canvas.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Sizes that shape a grid, all in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub max_columns: u32,
    pub cell: u32,
    pub gap: u32,
    pub padding: u32,
    /// Name band above each cell, `0` for none.
    pub label: u32,
}

impl GridSpec {
    /// The same grid with every pixel dimension multiplied by `scale`.
    pub fn scaled(self, scale: u32) -> Option<Self> {
        Some(Self {
            max_columns: self.max_columns,
            cell: self.cell.checked_mul(scale)?,
            gap: self.gap.checked_mul(scale)?,
            padding: self.padding.checked_mul(scale)?,
            label: self.label.checked_mul(scale)?,
        })
    }
}

/// Lay out `count` cells left-to-right, top-to-bottom.
///
/// The grid uses `min(max_columns, count)` columns so short sheets are not
/// padded with empty tracks. Each row is `label + cell` tall. Returns `None`
/// when `count` is zero or the canvas would not fit in `u32`.
pub fn calculate_grid(count: usize, spec: GridSpec) -> Option<GridLayout> {
    if count == 0 || spec.max_columns == 0 {
        return None;
    }
    let count = u32::try_from(count).ok()?;
    let columns = spec.max_columns.min(count);
    let rows = count.div_ceil(columns);

    let extent = |n: u32, track: u64| -> Option<u32> {
        let n = u64::from(n);
        let total = 2 * u64::from(spec.padding) + n * track + (n - 1) * u64::from(spec.gap);
        u32::try_from(total).ok()
    };
    let row_track = u64::from(spec.label) + u64::from(spec.cell);
    let width = extent(columns, u64::from(spec.cell))?;
    let height = extent(rows, row_track)?;

    // Every cell lies inside the canvas, so positions fit once the extent does.
    let position = |track: u32, size: u64| {
        (u64::from(spec.padding) + u64::from(track) * (size + u64::from(spec.gap))) as u32
    };
    let cells = (0..count)
        .map(|i| {
            let label_y = position(i / columns, row_track);
            CellRect {
                x: position(i % columns, u64::from(spec.cell)),
                y: label_y + spec.label,
                size: spec.cell,
                label_y,
            }
        })
        .collect();

    Some(GridLayout {
        columns,
        rows,
        width,
        height,
        label: spec.label,
        cells,
    })
}
