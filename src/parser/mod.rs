//! Format detector and normalizer.
//!
//! Reads a document, decides its schema generation, and emits the one
//! canonical in-memory representation regardless of input generation.
//! Three generations exist: the current structured header, the legacy
//! typed header (name, description, color only), and body-only files
//! that predate headers entirely.

pub mod frontmatter;
pub mod inference;
pub mod sections;

use crate::document::{
    Coordination, Document, DocumentStatus, Frontmatter, Generation, Header, Thinking, ToolGrants,
    Verification, DEFAULT_ESCALATION,
};
use crate::error::LibraryError;
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Description stamped on body-only documents that carry none.
const MIGRATION_PLACEHOLDER: &str = "Legacy document - needs migration";

/// Format-detecting parser. Stateless; one instance can serve any number
/// of documents.
#[derive(Debug, Default)]
pub struct Parser;

impl Parser {
    /// Canonical schema version a migration rewrite would stamp.
    pub const SCHEMA_VERSION: &'static str = "3.0.0";
    /// Version assigned to headers that declare none.
    pub const LEGACY_VERSION: &'static str = "1.0.0";
    /// Version assigned to body-only documents.
    pub const PRE_SCHEMA_VERSION: &'static str = "0.9.0";

    pub fn new() -> Self {
        Self
    }

    /// Parse a document from its storage location.
    ///
    /// Fails only when the content cannot be read. A header block that is
    /// present but undecodable degrades to the body-only path; the decode
    /// failure is reported at warn level, never raised.
    pub fn parse(&self, path: &Path) -> Result<Document, LibraryError> {
        let content = fs::read_to_string(path).map_err(|source| LibraryError::MalformedInput {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.parse_content(path, &content))
    }

    /// Parse already-read content. Infallible: every input produces a
    /// usable `Document`.
    pub fn parse_content(&self, path: &Path, content: &str) -> Document {
        match frontmatter::split(content) {
            Some((raw, body)) => match frontmatter::decode(path, raw) {
                Ok(fm) => {
                    if Self::is_current(&fm) {
                        self.normalize_current(path, fm, body)
                    } else {
                        self.normalize_legacy_typed(path, fm, body)
                    }
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "header decode failed; falling back to body-only parse"
                    );
                    self.normalize_untyped(path, content)
                }
            },
            None => self.normalize_untyped(path, content),
        }
    }

    /// Classifier: a `version` or `tools` key marks the current schema.
    fn is_current(fm: &Frontmatter) -> bool {
        fm.version.is_some() || fm.tools.is_some()
    }

    fn normalize_current(&self, path: &Path, fm: Frontmatter, body: &str) -> Document {
        let mut extensions = fm.custom;
        if let Some(color) = fm.color {
            extensions.insert("color".to_string(), Value::String(color));
        }
        let header = Header {
            name: fm.name.unwrap_or_else(|| file_stem(path)),
            description: fm.description.unwrap_or_default(),
            schema_version: fm
                .version
                .unwrap_or_else(|| Self::LEGACY_VERSION.to_string()),
            status: fm
                .status
                .as_deref()
                .and_then(DocumentStatus::parse)
                .unwrap_or_default(),
            tags: fm.tags.into_iter().collect(),
            thinking: fm.thinking.map(|t| Thinking {
                default_mode: if t.default_mode.is_empty() {
                    crate::document::DEFAULT_THINKING_MODE.to_string()
                } else {
                    t.default_mode
                },
                when_to_use_deeper: t.when_to_use_deeper,
            }),
            tools: fm
                .tools
                .map(|g| ToolGrants {
                    primary: g.primary,
                    external: g.external,
                    restricted: g.restricted,
                })
                .unwrap_or_default(),
            coordination: Coordination {
                coordinates_with: fm.coordinates_with.into_iter().collect(),
                escalates_to: fm
                    .escalates_to
                    .unwrap_or_else(|| DEFAULT_ESCALATION.to_string()),
            },
            verification: Verification {
                required: fm.verification_required,
                self_verifying: fm.self_verification,
            },
            extensions,
        };
        Document {
            path: path.to_path_buf(),
            generation: Generation::Current,
            header,
            body: body.to_string(),
            needs_migration: false,
        }
    }

    /// Legacy typed headers guarantee only name, description, and color;
    /// everything else comes from the inference tables and body scan.
    fn normalize_legacy_typed(&self, path: &Path, fm: Frontmatter, body: &str) -> Document {
        let name = fm.name.unwrap_or_else(|| file_stem(path));
        let mut extensions = BTreeMap::new();
        if let Some(color) = fm.color {
            extensions.insert("color".to_string(), Value::String(color));
        }
        let verification_section = sections::extract(body, sections::SELF_VERIFICATION);
        let header = Header {
            description: fm.description.unwrap_or_default(),
            schema_version: Self::LEGACY_VERSION.to_string(),
            status: DocumentStatus::Stable,
            tags: owned_set(inference::tags(&name)),
            thinking: Some(Thinking {
                default_mode: inference::thinking_mode(&name).to_string(),
                when_to_use_deeper: None,
            }),
            tools: extract_tools(body, &name),
            coordination: Coordination {
                coordinates_with: owned_set(inference::collaborators(&name)),
                escalates_to: DEFAULT_ESCALATION.to_string(),
            },
            verification: Verification {
                required: verification_section.is_some(),
                self_verifying: verification_section.map(sections::has_checklist).unwrap_or(false),
            },
            extensions,
            name,
        };
        Document {
            path: path.to_path_buf(),
            generation: Generation::LegacyTyped,
            header,
            body: body.to_string(),
            needs_migration: true,
        }
    }

    /// Body-only documents: name from the introductory role phrase (else
    /// the filename stem), status forced to deprecated.
    fn normalize_untyped(&self, path: &Path, content: &str) -> Document {
        let name = sections::role_introduction(content).unwrap_or_else(|| file_stem(path));
        let mut extensions = BTreeMap::new();
        extensions.insert("color".to_string(), Value::String("gray".to_string()));
        let header = Header {
            description: sections::leading_paragraph(content)
                .map(str::to_string)
                .unwrap_or_else(|| MIGRATION_PLACEHOLDER.to_string()),
            schema_version: Self::PRE_SCHEMA_VERSION.to_string(),
            status: DocumentStatus::Deprecated,
            tags: owned_set(&["legacy"]),
            thinking: None,
            tools: extract_tools(content, &name),
            coordination: Coordination::default(),
            verification: Verification::default(),
            extensions,
            name,
        };
        Document {
            path: path.to_path_buf(),
            generation: Generation::LegacyUntyped,
            header,
            body: content.to_string(),
            needs_migration: true,
        }
    }
}

/// Pull tool grants out of the body's tool-permissions section, falling
/// back to the per-name defaults table when the scan yields no primary
/// tools.
fn extract_tools(body: &str, name: &str) -> ToolGrants {
    let mut grants = sections::extract(body, sections::TOOL_PERMISSIONS)
        .map(|section| {
            let (primary, external, restricted) = sections::grant_lists(section);
            ToolGrants {
                primary,
                external,
                restricted,
            }
        })
        .unwrap_or_default();
    if grants.primary.is_empty() {
        grants.primary = inference::default_tools(name)
            .iter()
            .map(|t| t.to_string())
            .collect();
    }
    grants
}

fn owned_set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string())
}
