//! Header block detection and decoding.
//!
//! A header block opens with a first line of exactly three hyphens and
//! closes with the next line of exactly three hyphens; everything after
//! the closing delimiter is body.

use crate::document::Frontmatter;
use crate::error::LibraryError;
use serde_yaml::Value;
use std::path::Path;

/// Split content into `(header_yaml, body)`.
///
/// `None` when no recognizable delimiter block is present, in which case
/// the entire content is body.
pub fn split(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix("---\n")?;
    if let Some(body) = rest.strip_prefix("---\n") {
        return Some(("", body));
    }
    if let Some(idx) = rest.find("\n---\n") {
        return Some((&rest[..idx + 1], &rest[idx + 5..]));
    }
    if let Some(yaml) = rest.strip_suffix("\n---") {
        return Some((yaml, ""));
    }
    None
}

/// Decode a header block into the lenient wire struct.
pub fn decode(path: &Path, raw: &str) -> Result<Frontmatter, LibraryError> {
    serde_yaml::from_str(raw).map_err(|e| LibraryError::InvalidHeaderSyntax {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Decode a header block into an untyped YAML value, for schema checks
/// that want to see exactly what was written.
pub fn decode_value(path: &Path, raw: &str) -> Result<Value, LibraryError> {
    serde_yaml::from_str(raw).map_err(|e| LibraryError::InvalidHeaderSyntax {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_header_and_body() {
        let (yaml, body) = split("---\nname: a\n---\nbody text\n").unwrap();
        assert_eq!(yaml, "name: a\n");
        assert_eq!(body, "body text\n");
    }

    #[test]
    fn no_delimiter_means_no_header() {
        assert!(split("plain prose\n").is_none());
        assert!(split("prose\n---\nlater\n---\n").is_none());
    }

    #[test]
    fn unterminated_block_is_not_a_header() {
        assert!(split("---\nname: a\nno closing\n").is_none());
    }

    #[test]
    fn closing_delimiter_at_end_of_input() {
        let (yaml, body) = split("---\nname: a\n---").unwrap();
        assert_eq!(yaml, "name: a");
        assert_eq!(body, "");
    }

    #[test]
    fn four_hyphen_lines_do_not_close() {
        assert!(split("---\nname: a\n----\nmore\n").is_none());
    }

    #[test]
    fn decode_reports_broken_yaml() {
        let err = decode(Path::new("x.md"), "name: [unclosed\n").unwrap_err();
        assert!(matches!(err, LibraryError::InvalidHeaderSyntax { .. }));
    }
}
