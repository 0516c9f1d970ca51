//! Input discovery: turn command-line paths into source files.
//!
//! Files are taken as given. A directory contributes its immediate files
//! (symlinks included), hidden ones skipped, sorted by name:
//!
//! ```text
//! shoot/
//! ├── .DS_Store        # skipped
//! ├── IMG_0001.HEIC    # read
//! ├── IMG_0002.jpg     # read
//! ├── notes.txt        # read (rejected later by the type gate)
//! └── selects/         # not descended into
//! ```
//!
//! Every file gets the MIME type a browser would declare for its extension,
//! and an empty one when the extension is unknown. Whether the type is
//! acceptable is decided by the type gate, not here.
//!
//! Collecting only lists paths. Bytes are read one file at a time by
//! [`read_source`] as the ingest driver reaches each file, so a file that
//! vanished or is unreadable fails on its own.

use crate::naming::mime_from_name;
use crate::types::SourceFile;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Input not found: {0}")]
    NotFound(PathBuf),
}

impl From<walkdir::Error> for ScanError {
    fn from(err: walkdir::Error) -> Self {
        ScanError::Io(err.into())
    }
}

/// Expand `paths` into an ordered list of files.
///
/// Order follows the arguments; files inside one directory are sorted by
/// file name. Only an argument with no directory entry at all is an error;
/// a dangling symlink is listed and fails later when it is read.
pub fn collect_inputs<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    for path in paths {
        let path = path.as_ref();
        if fs::symlink_metadata(path).is_err() {
            return Err(ScanError::NotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            files.push(path.to_path_buf());
            continue;
        }

        let walker = WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
        for entry in walker {
            let entry = entry?;
            let listed = entry.file_type().is_file()
                || (entry.path_is_symlink() && !entry.path().is_dir());
            if listed {
                files.push(entry.into_path());
            }
        }
    }
    Ok(files)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// The name a file is known by in the pipeline: its final path component.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// MIME type a browser would declare for `path`.
pub fn declared_mime(path: &Path) -> &'static str {
    mime_from_name(&display_name(path))
}

/// Read one file into a [`SourceFile`].
pub fn read_source(path: &Path) -> Result<SourceFile, ScanError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ScanError::NotFound(path.to_path_buf()),
        _ => ScanError::Io(e),
    })?;
    Ok(SourceFile::new(display_name(path), declared_mime(path), bytes))
}
