//! Three-layer validation pipeline.
//!
//! Each layer is independently invocable and returns a [`LayerReport`];
//! all layers share the [`Issue`] shape. Issues are collected, never
//! thrown, so a caller can report every problem in one pass. Composed
//! validation runs all three layers and is valid iff all are valid.

pub mod content;
pub mod crossref;
pub mod structural;

pub use content::ContentValidator;
pub use crossref::CrossRefValidator;
pub use structural::StructuralValidator;

use crate::parser::{frontmatter, Parser};
use crate::registry::DocumentRegistry;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// How bad a finding is. Warnings never fail a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One validation finding with a human-actionable fix suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Field, section, or link the finding is about.
    pub locator: String,
    pub message: String,
    pub suggested_fix: String,
    pub severity: Severity,
}

impl Issue {
    pub fn error(locator: impl Into<String>, message: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            message: message.into(),
            suggested_fix: fix.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(
        locator: impl Into<String>,
        message: impl Into<String>,
        fix: impl Into<String>,
    ) -> Self {
        Self {
            locator: locator.into(),
            message: message.into(),
            suggested_fix: fix.into(),
            severity: Severity::Warning,
        }
    }
}

/// Result of one validation layer.
#[derive(Debug, Clone, Serialize)]
pub struct LayerReport {
    pub valid: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl Default for LayerReport {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerReport {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Route an issue by severity, updating validity.
    pub fn push(&mut self, issue: Issue) {
        match issue.severity {
            Severity::Error => {
                self.valid = false;
                self.errors.push(issue);
            }
            Severity::Warning => self.warnings.push(issue),
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Composed result for one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub structural: Option<LayerReport>,
    pub crossref: Option<LayerReport>,
    pub content: Option<LayerReport>,
}

impl DocumentReport {
    fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            structural: None,
            crossref: None,
            content: None,
        }
    }

    pub fn valid(&self) -> bool {
        self.layers().all(|layer| layer.valid)
    }

    pub fn has_warnings(&self) -> bool {
        self.layers().any(LayerReport::has_warnings)
    }

    fn layers(&self) -> impl Iterator<Item = &LayerReport> {
        [
            self.structural.as_ref(),
            self.crossref.as_ref(),
            self.content.as_ref(),
        ]
        .into_iter()
        .flatten()
    }
}

/// Batch outcome: always a full summary, even when single documents fail.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    /// RFC 3339 timestamp of the sweep.
    pub generated_at: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub warned: usize,
    pub reports: Vec<DocumentReport>,
}

/// Runs all three layers over files or a whole registry.
pub struct Validator {
    parser: Parser,
    structural: StructuralValidator,
    crossref: CrossRefValidator,
    content: ContentValidator,
}

impl Validator {
    pub fn new(crossref: CrossRefValidator) -> Self {
        Self {
            parser: Parser::new(),
            structural: StructuralValidator::new(),
            crossref,
            content: ContentValidator::new(),
        }
    }

    /// Validate one file through every layer.
    ///
    /// A file with no header block stops at the structural layer: there
    /// is nothing for the other layers to check against.
    pub fn validate_path(&self, path: &Path) -> DocumentReport {
        let mut report = DocumentReport::empty(path);

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                let mut layer = LayerReport::new();
                layer.push(Issue::error(
                    "file",
                    format!("failed to read {}: {err}", path.display()),
                    "Check the file exists and is readable",
                ));
                report.structural = Some(layer);
                return report;
            }
        };

        if frontmatter::split(&content).is_none() {
            report.structural = Some(structural::missing_frontmatter_report());
            return report;
        }

        report.structural = Some(self.structural.validate_source(path, &content));

        let document = self.parser.parse_content(path, &content);
        report.crossref = Some(self.crossref.validate(&document.header));
        report.content = Some(self.content.validate(
            &document.header,
            &document.body,
            path,
        ));
        report
    }

    /// Validate every discovered document. Always produces the full
    /// summary; an erroring document counts as failed and the sweep
    /// continues.
    pub fn validate_all(&self, registry: &DocumentRegistry) -> BatchSummary {
        let mut summary = BatchSummary {
            generated_at: chrono::Utc::now().to_rfc3339(),
            ..BatchSummary::default()
        };
        for name in registry.list_names() {
            let Some(location) = registry.location_of(name) else {
                continue;
            };
            let report = self.validate_path(location);
            summary.total += 1;
            if report.valid() {
                summary.passed += 1;
                if report.has_warnings() {
                    summary.warned += 1;
                }
            } else {
                summary.failed += 1;
            }
            summary.reports.push(report);
        }
        summary
    }
}
