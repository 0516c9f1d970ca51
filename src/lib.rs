//! # Contact Sheet
//!
//! Turns a pile of photos into a contact sheet: every photo is cut to a
//! centered square thumbnail, the thumbnails are laid out on a grid in the
//! order they were submitted, and the grid is exported as one PNG.
//!
//! # Architecture: Per-File Pipeline
//!
//! ```text
//! inputs ─► type gate ─► normalize ─► crop_to_square ─► sheet ─► export ─► PNG
//!             (mime)     (HEIC→JPEG)   (center square)   (ordered)  (grid)
//! ```
//!
//! Files are read and handled one at a time. A file that fails anywhere
//! before the sheet, including being unreadable, is reported and dropped;
//! the rest of the batch carries on.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Expands command-line paths into source files with a declared MIME type |
//! | [`mime`] | The type gate: which declared types may enter the pipeline |
//! | [`imaging`] | HEIC normalization, center-square crop, grid maths, backend seam |
//! | [`ingest`] | Runs each file through gate → normalize → crop and fills the sheet |
//! | [`sheet`] | The ordered thumbnail collection with stable ids |
//! | [`export`] | Grid layout, composition at export scale, PNG encoding |
//! | [`config`] | `contact-sheet.toml` loading, defaults, validation |
//! | [`types`] | Values passed between stages (`SourceFile`, `Thumbnail`) |
//! | [`naming`] | Extension helpers: MIME lookup, HEIC → JPEG renaming |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Square Thumbnails from the Center
//!
//! The crop side is the shorter image edge and the window is centered on the
//! longer one. Thumbnails are rendered at `target_size` (600px by default)
//! so the sheet stays sharp at export scale, and shown at `display_size`.
//! EXIF orientation is applied first, so the square is taken from the
//! upright photo.
//!
//! ## Names on the Sheet
//!
//! Each cell has a band above it with the photo's display name, drawn with
//! the `font8x8` bitmap font so no font file has to ship with the binary.
//! `export.labels = false` removes the band and the grid closes up.
//!
//! ## HEIC Through libheif
//!
//! HEIC is the one common camera format with no pure Rust decoder. It is
//! decoded with `libheif-rs` when built with the `heic` feature and
//! re-encoded as JPEG, so everything after normalization sees one of the
//! formats the `image` crate decodes natively. Without the feature HEIC
//! files still pass the type gate and fail individually with a conversion
//! error.
//!
//! ## Pluggable Imaging Backend
//!
//! All pixel work goes through [`imaging::ImageBackend`]. The pipeline logic
//! is tested against a mock that records calls, and only a handful of tests
//! decode real images.

pub mod config;
pub mod export;
pub mod imaging;
pub mod ingest;
pub mod mime;
pub mod naming;
pub mod output;
pub mod scan;
pub mod sheet;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
