//! Batch ingestion: source files in, thumbnails on the sheet.
//!
//! Each file runs through the same steps:
//!
//! ```text
//! read  →  type gate  →  normalize (HEIC → JPEG)  →  crop_to_square  →  sheet.push
//! ```
//!
//! Files are processed one at a time, in submission order. A file that fails
//! at any step is recorded in the [`IngestReport`] and reported through the
//! event channel; it never stops the rest of the batch. Successful files land
//! on the sheet in the order they were submitted.
//!
//! [`ingest_paths`] reads each file only when its turn comes, so a batch
//! holds one file's bytes at a time and an unreadable file is just another
//! per-file failure.

use crate::config::SheetConfig;
use crate::imaging::{
    ConversionError, DecodeError, ImageBackend, Quality, RustBackend, crop_to_square,
    is_heic_mime, normalize,
};
use crate::mime::{TypeCheck, check_type};
use crate::scan::{self, ScanError};
use crate::sheet::{ContactSheet, PhotoId};
use crate::types::{SourceFile, Thumbnail};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Why a single file did not make it onto the sheet.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Could not read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: ScanError,
    },
    #[error("{name} is not a supported file type")]
    UnsupportedType { name: String, mime: String },
    #[error("Error processing {name}: {source}")]
    Conversion {
        name: String,
        #[source]
        source: ConversionError,
    },
    #[error("Error processing {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: DecodeError,
    },
}

impl IngestError {
    /// Name of the file the error refers to.
    pub fn file_name(&self) -> &str {
        match self {
            IngestError::Read { name, .. }
            | IngestError::UnsupportedType { name, .. }
            | IngestError::Conversion { name, .. }
            | IngestError::Decode { name, .. } => name,
        }
    }
}

/// Progress events, emitted in order as the batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestEvent {
    BatchStarted {
        file_count: usize,
    },
    ThumbnailAdded {
        /// 1-based position in the submitted batch.
        index: usize,
        id: PhotoId,
        source_name: String,
        display_name: String,
        converted: bool,
    },
    FileSkipped {
        index: usize,
        name: String,
        reason: String,
    },
}

/// A file that was skipped, with the reason.
#[derive(Debug)]
pub struct IngestFailure {
    pub name: String,
    pub error: IngestError,
}

/// Outcome of one batch.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Ids of the thumbnails added, in submission order.
    pub added: Vec<PhotoId>,
    /// Every file that was skipped, in submission order.
    pub failures: Vec<IngestFailure>,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run one file through the type gate, normalizer, and crop engine.
pub fn process_file(
    backend: &impl ImageBackend,
    file: &SourceFile,
    config: &SheetConfig,
) -> Result<Thumbnail, IngestError> {
    let mime = match check_type(&file.name, &file.mime, &config.conversion) {
        TypeCheck::Accepted(mime) => mime,
        TypeCheck::Rejected(mime) => {
            return Err(IngestError::UnsupportedType {
                name: file.name.clone(),
                mime,
            });
        }
    };

    // The gate may have recovered the type from the extension.
    let gated;
    let file = if mime == file.mime {
        file
    } else {
        gated = SourceFile::new(file.name.clone(), mime, file.bytes.clone());
        &gated
    };

    let quality = Quality::from_fraction(config.conversion.quality);
    let normalized = normalize(backend, file, quality).map_err(|source| {
        IngestError::Conversion {
            name: file.name.clone(),
            source,
        }
    })?;

    crop_to_square(
        backend,
        &normalized,
        &file.name,
        config.thumbnails.target_size,
    )
    .map_err(|source| IngestError::Decode {
        name: file.name.clone(),
        source,
    })
}

/// Ingest a batch of in-memory files with the default backend.
pub fn ingest<I>(
    files: I,
    config: &SheetConfig,
    sheet: &mut ContactSheet,
    events: Option<Sender<IngestEvent>>,
) -> IngestReport
where
    I: IntoIterator<Item = SourceFile, IntoIter: ExactSizeIterator>,
{
    let backend = RustBackend::new();
    ingest_with_backend(&backend, files, config, sheet, events)
}

/// Ingest a batch using a specific backend (allows testing with mock).
pub fn ingest_with_backend<I>(
    backend: &impl ImageBackend,
    files: I,
    config: &SheetConfig,
    sheet: &mut ContactSheet,
    events: Option<Sender<IngestEvent>>,
) -> IngestReport
where
    I: IntoIterator<Item = SourceFile, IntoIter: ExactSizeIterator>,
{
    run_batch(backend, files.into_iter().map(Ok), config, sheet, events)
}

/// Read and ingest files from disk with the default backend.
///
/// Each path is read right before it is processed. Paths normally come from
/// [`scan::collect_inputs`].
pub fn ingest_paths(
    paths: &[PathBuf],
    config: &SheetConfig,
    sheet: &mut ContactSheet,
    events: Option<Sender<IngestEvent>>,
) -> IngestReport {
    let backend = RustBackend::new();
    ingest_paths_with_backend(&backend, paths, config, sheet, events)
}

pub fn ingest_paths_with_backend(
    backend: &impl ImageBackend,
    paths: &[PathBuf],
    config: &SheetConfig,
    sheet: &mut ContactSheet,
    events: Option<Sender<IngestEvent>>,
) -> IngestReport {
    let files = paths.iter().map(|path| {
        scan::read_source(path).map_err(|source| IngestError::Read {
            name: scan::display_name(path),
            source,
        })
    });
    run_batch(backend, files, config, sheet, events)
}

/// The driver loop shared by every entry point. `files` yields each file
/// lazily, or the error that stopped it from being loaded.
fn run_batch(
    backend: &impl ImageBackend,
    files: impl ExactSizeIterator<Item = Result<SourceFile, IngestError>>,
    config: &SheetConfig,
    sheet: &mut ContactSheet,
    events: Option<Sender<IngestEvent>>,
) -> IngestReport {
    let emit = |event: IngestEvent| {
        if let Some(tx) = &events {
            // A closed receiver only means nobody is listening.
            let _ = tx.send(event);
        }
    };

    emit(IngestEvent::BatchStarted {
        file_count: files.len(),
    });

    let mut report = IngestReport::default();
    for (i, file) in files.enumerate() {
        let index = i + 1;
        let outcome = file.and_then(|file| {
            tracing::debug!(index, name = %file.name, mime = %file.mime, bytes = file.bytes.len(), "ingesting");
            let thumbnail = process_file(backend, &file, config)?;
            Ok((thumbnail, is_heic_mime(&file.mime)))
        });

        match outcome {
            Ok((thumbnail, heic)) => {
                let source_name = thumbnail.source_name.clone();
                let display_name = thumbnail.display_name.clone();
                let converted = heic || source_name != display_name;
                let id = sheet.push(thumbnail);
                report.added.push(id);
                emit(IngestEvent::ThumbnailAdded {
                    index,
                    id,
                    source_name,
                    display_name,
                    converted,
                });
            }
            Err(error) => {
                let name = error.file_name().to_string();
                tracing::warn!(index, name = %name, error = %error, "skipping file");
                emit(IngestEvent::FileSkipped {
                    index,
                    name: name.clone(),
                    reason: error_chain(&error),
                });
                report.failures.push(IngestFailure { name, error });
            }
        }
    }

    report
}

/// Render an error and its sources as `outer: inner: innermost`.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}
