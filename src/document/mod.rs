//! Canonical document model.
//!
//! A `Document` pairs a structured `Header` with an opaque prose body. The
//! library has seen three header schema generations; the parser resolves
//! the generation exactly once and every downstream consumer operates on
//! the canonical `Header` alone.

mod frontmatter;

pub use frontmatter::{Frontmatter, GrantSpec, ThinkingSpec};

use crate::error::LibraryError;
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// Default escalation target when a header names none.
pub const DEFAULT_ESCALATION: &str = "@coordinator";

/// Reasoning-depth hint applied when none is declared.
pub const DEFAULT_THINKING_MODE: &str = "think";

/// Which of the three historical header schemas a document used.
///
/// Derived once at parse time and never changes independent of a re-parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// Full structured header (version or tool grants present).
    Current,
    /// Structured header carrying only name, description, and color.
    LegacyTyped,
    /// No header block at all; the whole file is body.
    LegacyUntyped,
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Generation::Current => "current",
            Generation::LegacyTyped => "legacy-typed",
            Generation::LegacyUntyped => "legacy-untyped",
        };
        f.write_str(label)
    }
}

/// Lifecycle status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentStatus {
    #[default]
    Stable,
    Beta,
    Experimental,
    Deprecated,
}

impl DocumentStatus {
    /// All accepted wire values, in declaration order.
    pub const VALUES: [&'static str; 4] = ["stable", "beta", "experimental", "deprecated"];

    /// Parse a wire value; `None` for anything outside the enum.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "stable" => Some(DocumentStatus::Stable),
            "beta" => Some(DocumentStatus::Beta),
            "experimental" => Some(DocumentStatus::Experimental),
            "deprecated" => Some(DocumentStatus::Deprecated),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentStatus::Stable => "stable",
            DocumentStatus::Beta => "beta",
            DocumentStatus::Experimental => "experimental",
            DocumentStatus::Deprecated => "deprecated",
        };
        f.write_str(label)
    }
}

/// Reasoning-depth hint plus an optional escalation condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thinking {
    pub default_mode: String,
    pub when_to_use_deeper: Option<String>,
}

/// Three disjoint tool grant lists.
///
/// Kept as ordered lists rather than sets so the structural validator can
/// report exactly what was written, duplicates included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolGrants {
    pub primary: Vec<String>,
    /// Cross-system integrations; this namespace is open-ended.
    pub external: Vec<String>,
    pub restricted: Vec<String>,
}

impl ToolGrants {
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.external.is_empty() && self.restricted.is_empty()
    }

    /// The three lists with their wire labels.
    pub fn labeled(&self) -> [(&'static str, &[String]); 3] {
        [
            ("primary", self.primary.as_slice()),
            ("external", self.external.as_slice()),
            ("restricted", self.restricted.as_slice()),
        ]
    }
}

/// Collaboration links to other documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordination {
    pub coordinates_with: BTreeSet<String>,
    /// Another document name or the sentinel `user`.
    pub escalates_to: String,
}

impl Default for Coordination {
    fn default() -> Self {
        Self {
            coordinates_with: BTreeSet::new(),
            escalates_to: DEFAULT_ESCALATION.to_string(),
        }
    }
}

/// Verification expectations declared by the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Verification {
    pub required: bool,
    pub self_verifying: bool,
}

/// Canonical post-normalization header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub name: String,
    pub description: String,
    /// Semantic version string, `MAJOR.MINOR.PATCH`.
    pub schema_version: String,
    pub status: DocumentStatus,
    pub tags: BTreeSet<String>,
    /// `Some` only when the source header declared (or a legacy table
    /// inferred) a mode; consumers wanting the effective mode should use
    /// [`Header::thinking_mode`].
    pub thinking: Option<Thinking>,
    pub tools: ToolGrants,
    pub coordination: Coordination,
    pub verification: Verification,
    /// Open mapping of additional keys, preserved but not interpreted.
    /// The legacy top-level `color` key is kept here under `"color"`.
    pub extensions: BTreeMap<String, Value>,
}

impl Header {
    /// Effective reasoning-depth hint, defaulted when none is declared.
    pub fn thinking_mode(&self) -> &str {
        self.thinking
            .as_ref()
            .map(|t| t.default_mode.as_str())
            .unwrap_or(DEFAULT_THINKING_MODE)
    }

    /// Render the canonical frontmatter wire form of this header.
    pub fn to_frontmatter(&self) -> Frontmatter {
        let mut custom = self.extensions.clone();
        // only a string-valued color moves to the top-level key
        let color = match custom.get("color").and_then(Value::as_str) {
            Some(color) => {
                let color = color.to_string();
                custom.remove("color");
                Some(color)
            }
            None => None,
        };
        Frontmatter {
            name: Some(self.name.clone()),
            description: Some(self.description.clone()),
            version: Some(self.schema_version.clone()),
            status: (self.status != DocumentStatus::Stable).then(|| self.status.to_string()),
            color,
            tags: self.tags.iter().cloned().collect(),
            thinking: self.thinking.as_ref().map(|t| ThinkingSpec {
                default_mode: t.default_mode.clone(),
                when_to_use_deeper: t.when_to_use_deeper.clone(),
            }),
            tools: (!self.tools.is_empty()).then(|| GrantSpec {
                primary: self.tools.primary.clone(),
                external: self.tools.external.clone(),
                restricted: self.tools.restricted.clone(),
            }),
            coordinates_with: self.coordination.coordinates_with.iter().cloned().collect(),
            escalates_to: (self.coordination.escalates_to != DEFAULT_ESCALATION)
                .then(|| self.coordination.escalates_to.clone()),
            verification_required: self.verification.required,
            self_verification: self.verification.self_verifying,
            custom,
        }
    }

    /// Serialize the canonical header block, delimiters included.
    pub fn to_frontmatter_string(&self) -> Result<String, LibraryError> {
        let yaml = serde_yaml::to_string(&self.to_frontmatter())
            .map_err(|e| LibraryError::Config(format!("failed to serialize header: {e}")))?;
        Ok(format!("---\n{yaml}---\n"))
    }
}

/// One structured-header-plus-prose unit in the library.
///
/// Immutable value object for a given content snapshot: a changed file
/// produces a new `Document`, never an in-place mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Storage location the content was read from.
    pub path: PathBuf,
    pub generation: Generation,
    pub header: Header,
    /// Free-form prose; never interpreted by this crate.
    pub body: String,
    /// Metadata only; blocks no operation.
    pub needs_migration: bool,
}

impl Document {
    /// Canonical rewrite of the whole document: normalized header plus the
    /// original body. This is what the external migration surface writes.
    pub fn canonical_text(&self) -> Result<String, LibraryError> {
        Ok(format!("{}{}", self.header.to_frontmatter_string()?, self.body))
    }
}
