//! CLI output formatting for every command.
//!
//! Output is **information-first**: each photo leads with its positional
//! index and the name it is shown under, with the submitted file name and
//! any error as indented context lines.
//!
//! # Output Format
//!
//! ## Ingest
//!
//! ```text
//! Ingesting 3 files
//!     001 A.jpg
//!     002 B.heic: skipped
//!         Error processing B.heic: Failed to convert HEIC file: ...
//!     003 IMG_0042.jpg
//!         Source: IMG_0042.HEIC (converted)
//! Added 2 photos, skipped 1
//! ```
//!
//! ## Export
//!
//! ```text
//! Sheet: 2 photos, 2×1 grid
//!     001 A.jpg (48, 96)
//!     002 IMG_0042.jpg (396, 96)
//! Wrote contact-sheet.png (744×444, scale 2)
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 A.jpg: image/jpeg
//! 002 IMG_0042.HEIC: image/heic (needs a build with --features heic)
//! 003 notes.txt: rejected (text/plain)
//! 3 files, 2 accepted, 1 rejected
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::export::SheetManifest;
use crate::imaging::is_heic_mime;
use crate::ingest::{IngestEvent, IngestReport};
use crate::mime::TypeCheck;
use std::path::{Path, PathBuf};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 photo` / `3 photos`.
fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Ingest
// ============================================================================

/// Format a single ingest progress event as display lines.
pub fn format_ingest_event(event: &IngestEvent) -> Vec<String> {
    match event {
        IngestEvent::BatchStarted { file_count } => {
            vec![format!("Ingesting {}", plural(*file_count, "file"))]
        }
        IngestEvent::ThumbnailAdded {
            index,
            source_name,
            display_name,
            converted,
            ..
        } => {
            let mut lines = vec![format!(
                "{}{} {}",
                indent(1),
                format_index(*index),
                display_name
            )];
            if *converted {
                lines.push(format!("{}Source: {} (converted)", indent(2), source_name));
            }
            lines
        }
        IngestEvent::FileSkipped {
            index,
            name,
            reason,
        } => vec![
            format!("{}{} {}: skipped", indent(1), format_index(*index), name),
            format!("{}{}", indent(2), reason),
        ],
    }
}

pub fn format_ingest_summary(report: &IngestReport) -> Vec<String> {
    let added = plural(report.added.len(), "photo");
    if report.failures.is_empty() {
        vec![format!("Added {added}")]
    } else {
        vec![format!("Added {added}, skipped {}", report.failures.len())]
    }
}

pub fn print_ingest_summary(report: &IngestReport) {
    for line in format_ingest_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Export
// ============================================================================

/// Format the written sheet: grid shape, each cell, and the output file.
pub fn format_export_output(manifest: &SheetManifest, path: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Sheet: {}, {}×{} grid",
        plural(manifest.cells.len(), "photo"),
        manifest.columns,
        manifest.rows
    )];
    for (i, cell) in manifest.cells.iter().enumerate() {
        lines.push(format!(
            "{}{} {} ({}, {})",
            indent(1),
            format_index(i + 1),
            cell.name,
            cell.x,
            cell.y
        ));
    }
    lines.push(format!(
        "Wrote {} ({}×{}, scale {})",
        path.display(),
        manifest.width,
        manifest.height,
        manifest.scale
    ));
    lines
}

pub fn print_export_output(manifest: &SheetManifest, path: &Path) {
    for line in format_export_output(manifest, path) {
        println!("{}", line);
    }
}

// ============================================================================
// Thumbs
// ============================================================================

/// Format the per-thumbnail files written by `thumbs`.
pub fn format_thumbs_output(written: &[(String, PathBuf)]) -> Vec<String> {
    let mut lines: Vec<String> = written
        .iter()
        .enumerate()
        .map(|(i, (name, path))| {
            format!("{} {} → {}", format_index(i + 1), name, path.display())
        })
        .collect();
    lines.push(format!("Wrote {}", plural(written.len(), "thumbnail")));
    lines
}

pub fn print_thumbs_output(written: &[(String, PathBuf)]) {
    for line in format_thumbs_output(written) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format type-gate results, one line per file plus a tally.
///
/// Accepted HEIC/HEIF files are flagged when `heic_decoder` is false, since
/// they will pass the gate and then fail conversion.
pub fn format_check_output(results: &[(String, TypeCheck)], heic_decoder: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut accepted = 0;
    for (i, (name, check)) in results.iter().enumerate() {
        let status = match check {
            TypeCheck::Accepted(mime) if !heic_decoder && is_heic_mime(mime) => {
                accepted += 1;
                format!("{mime} (needs a build with --features heic)")
            }
            TypeCheck::Accepted(mime) => {
                accepted += 1;
                mime.clone()
            }
            TypeCheck::Rejected(mime) if mime.is_empty() => "rejected (no type)".to_string(),
            TypeCheck::Rejected(mime) => format!("rejected ({mime})"),
        };
        lines.push(format!("{} {}: {}", format_index(i + 1), name, status));
    }
    lines.push(format!(
        "{}, {} accepted, {} rejected",
        plural(results.len(), "file"),
        accepted,
        results.len() - accepted
    ));
    lines
}

pub fn print_check_output(results: &[(String, TypeCheck)], heic_decoder: bool) {
    for line in format_check_output(results, heic_decoder) {
        println!("{}", line);
    }
}
