//! The type gate: decides whether a declared MIME type may enter the pipeline.
//!
//! The allow-set is `image/jpeg`, `image/png`, `image/webp` and `image/heic`.
//! Configuration can widen it (`image/heif`, any `image/*`) and can recover
//! an empty MIME type from the file extension. Anything rejected here is
//! reported as [`IngestError::UnsupportedType`](crate::ingest::IngestError)
//! and never reaches the normalizer.

use crate::config::ConversionConfig;
use crate::naming::mime_from_name;

/// MIME types every build accepts.
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/heic"];

/// Accepted when `conversion.accept_heif` is on.
pub const HEIF_MIME_TYPE: &str = "image/heif";

/// Classification of a declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeCheck {
    /// Accepted. Carries the MIME type the pipeline should use, which may
    /// have been recovered from the extension and is always lowercase.
    Accepted(String),
    /// Rejected. Carries the type as declared (possibly empty).
    Rejected(String),
}

impl TypeCheck {
    pub fn is_accepted(&self) -> bool {
        matches!(self, TypeCheck::Accepted(_))
    }
}

/// Run the type gate for one file.
pub fn check_type(name: &str, declared: &str, config: &ConversionConfig) -> TypeCheck {
    let declared = declared.trim();
    let effective = if declared.is_empty() && config.extension_fallback {
        mime_from_name(name).to_string()
    } else {
        declared.to_ascii_lowercase()
    };

    if is_allowed(&effective, config) {
        TypeCheck::Accepted(effective)
    } else {
        TypeCheck::Rejected(declared.to_string())
    }
}

fn is_allowed(mime: &str, config: &ConversionConfig) -> bool {
    if mime.is_empty() {
        return false;
    }
    if ALLOWED_MIME_TYPES.contains(&mime) {
        return true;
    }
    if config.accept_heif && mime == HEIF_MIME_TYPE {
        return true;
    }
    config.accept_any_image
        && mime
            .strip_prefix("image/")
            .is_some_and(|subtype| !subtype.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> ConversionConfig {
        ConversionConfig {
            accept_heif: false,
            accept_any_image: false,
            extension_fallback: false,
            ..ConversionConfig::default()
        }
    }

    #[test]
    fn allow_set_is_accepted() {
        for mime in ALLOWED_MIME_TYPES {
            assert_eq!(
                check_type("x", mime, &strict()),
                TypeCheck::Accepted(mime.to_string())
            );
        }
    }

    #[test]
    fn mime_comparison_ignores_case() {
        assert_eq!(
            check_type("x.jpg", "Image/JPEG", &strict()),
            TypeCheck::Accepted("image/jpeg".into())
        );
    }

    #[test]
    fn non_images_are_rejected() {
        let config = ConversionConfig::default();
        assert_eq!(
            check_type("notes.txt", "text/plain", &config),
            TypeCheck::Rejected("text/plain".into())
        );
        assert!(!check_type("doc.pdf", "application/pdf", &config).is_accepted());
    }

    #[test]
    fn heif_depends_on_config() {
        assert!(!check_type("a.heif", "image/heif", &strict()).is_accepted());
        assert!(check_type("a.heif", "image/heif", &ConversionConfig::default()).is_accepted());
    }

    #[test]
    fn other_image_types_need_accept_any_image() {
        assert!(!check_type("a.gif", "image/gif", &ConversionConfig::default()).is_accepted());

        let config = ConversionConfig {
            accept_any_image: true,
            ..ConversionConfig::default()
        };
        assert!(check_type("a.gif", "image/gif", &config).is_accepted());
        assert!(!check_type("a", "image/", &config).is_accepted());
        assert!(!check_type("a.txt", "text/plain", &config).is_accepted());
    }

    #[test]
    fn empty_mime_falls_back_to_extension() {
        let config = ConversionConfig::default();
        assert_eq!(
            check_type("IMG_1.HEIC", "", &config),
            TypeCheck::Accepted("image/heic".into())
        );
        assert_eq!(
            check_type("mystery", "", &config),
            TypeCheck::Rejected(String::new())
        );
    }

    #[test]
    fn empty_mime_rejected_without_fallback() {
        assert_eq!(
            check_type("a.jpg", "", &strict()),
            TypeCheck::Rejected(String::new())
        );
    }

    #[test]
    fn declared_type_wins_over_extension() {
        // A browser that says text/plain is believed, whatever the name says.
        assert!(!check_type("a.jpg", "text/plain", &ConversionConfig::default()).is_accepted());
    }
}
