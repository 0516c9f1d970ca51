//! Filename handling for display names and declared MIME types.
//!
//! Conversion changes the *logical* name of a file: `IMG_0042.HEIC` is shown
//! as `IMG_0042.jpg` once it has been re-encoded. The rename is cosmetic and
//! never touches pixel data.
//!
//! The extension table here also stands in for a browser's file picker: a
//! file read from disk gets the MIME type a browser would have declared for it.

/// Extensions that mark a HEIC/HEIF container.
const HEIC_EXTENSIONS: &[&str] = &["heic", "heif"];

/// Extension → MIME table, as a browser file picker would report it.
const MIME_BY_EXTENSION: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("avif", "image/avif"),
];

/// Lowercased extension of a file name, if it has one.
///
/// Dotfiles like `.hidden` have no extension.
pub fn extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// MIME type implied by a file name, or an empty string for unknown extensions.
pub fn mime_from_name(name: &str) -> &'static str {
    extension(name)
        .and_then(|ext| {
            MIME_BY_EXTENSION
                .iter()
                .find(|(e, _)| *e == ext)
                .map(|(_, mime)| *mime)
        })
        .unwrap_or("")
}

/// Rename a converted HEIC/HEIF file to its JPEG display name.
///
/// - `"IMG_1.heic"` → `"IMG_1.jpg"`
/// - `"IMG_1.HEIF"` → `"IMG_1.jpg"`
/// - `"IMG_1.jpeg"` → `"IMG_1.jpeg"` (untouched)
pub fn converted_name(name: &str) -> String {
    match extension(name) {
        Some(ext) if HEIC_EXTENSIONS.contains(&ext.as_str()) => {
            let stem = &name[..name.len() - ext.len() - 1];
            format!("{stem}.jpg")
        }
        _ => name.to_string(),
    }
}

/// Stem used when writing per-thumbnail files: `"IMG_1.jpg"` → `"IMG_1"`.
pub fn file_stem(name: &str) -> &str {
    match extension(name) {
        Some(ext) => &name[..name.len() - ext.len() - 1],
        None => name,
    }
}
