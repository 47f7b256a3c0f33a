//! Error taxonomy.
//!
//! Validation findings are data ([`crate::validate::Issue`]), never
//! errors, and parse-time format problems degrade instead of aborting a
//! library scan; this enum covers the failures that genuinely stop an
//! operation.

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the parser, registry, and configuration layers.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The document content could not be read. Fatal for that document
    /// only; a batch sweep records it and moves on.
    #[error("failed to read document {}: {source}", .path.display())]
    MalformedInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A header block is present but cannot be decoded. The parser never
    /// returns this; it degrades to a body-only parse and reports the
    /// failure on the log side channel. Callers decoding headers directly
    /// receive it as a value.
    #[error("invalid header syntax in {}: {message}", .path.display())]
    InvalidHeaderSyntax { path: PathBuf, message: String },

    /// An unknown document name was requested.
    #[error("document not found: {0}")]
    NotFound(String),

    /// Two documents resolved to the same name during discovery. Raised
    /// only by callers opting into strict uniqueness; the default policy
    /// reports the collision and keeps the last-discovered location.
    #[error("duplicate document name '{name}': {} shadows {}", .kept.display(), .shadowed.display())]
    DuplicateName {
        name: String,
        kept: PathBuf,
        shadowed: PathBuf,
    },

    /// Configuration or environment problem.
    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn messages_name_the_offending_document() {
        let err = LibraryError::NotFound("phantom".to_string());
        assert_eq!(err.to_string(), "document not found: phantom");

        let err = LibraryError::InvalidHeaderSyntax {
            path: Path::new("docs/broken.md").to_path_buf(),
            message: "unexpected end of stream".to_string(),
        };
        assert!(err.to_string().contains("docs/broken.md"));
    }

    #[test]
    fn read_failure_keeps_the_io_source() {
        let err = LibraryError::MalformedInput {
            path: Path::new("docs/gone.md").to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
