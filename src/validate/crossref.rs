//! Cross-reference layer: do the identifiers the header points at exist?
//!
//! Tool names are checked against a tool registry (file-backed or the
//! built-in default list); coordination and escalation targets against
//! the known-document set derived from discovery. Unknown external
//! integrations are warnings since that namespace is open-ended; unknown
//! primary or restricted tools are hard errors.

use super::{Issue, LayerReport};
use crate::document::{DocumentStatus, Header};
use crate::error::LibraryError;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static SEMVER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("valid regex"));

/// Built-in tool registry, used when no file-backed registry is supplied.
pub const DEFAULT_TOOL_REGISTRY: [&str; 22] = [
    "Read",
    "Write",
    "Edit",
    "MultiEdit",
    "Bash",
    "Task",
    "Grep",
    "Glob",
    "TodoWrite",
    "NotebookEdit",
    "WebSearch",
    "WebFetch",
    "mcp__github",
    "mcp__context7",
    "mcp__firecrawl",
    "mcp__playwright",
    "mcp__supabase",
    "mcp__stripe",
    "mcp__netlify",
    "mcp__railway",
    "mcp__grep",
    "mcp__ide",
];

/// Escalation target that is always valid.
const USER_SENTINEL: &str = "user";

/// Cross-reference checker over a tool registry and a document-name set.
#[derive(Debug, Clone)]
pub struct CrossRefValidator {
    tools: BTreeSet<String>,
    documents: BTreeSet<String>,
}

impl CrossRefValidator {
    pub fn new(tools: BTreeSet<String>, documents: BTreeSet<String>) -> Self {
        Self { tools, documents }
    }

    /// Use the built-in tool list.
    pub fn with_default_tools(documents: BTreeSet<String>) -> Self {
        Self::new(
            DEFAULT_TOOL_REGISTRY.iter().map(|t| t.to_string()).collect(),
            documents,
        )
    }

    /// Load the tool registry from a JSON array of names.
    pub fn from_tool_registry_file(
        path: &Path,
        documents: BTreeSet<String>,
    ) -> Result<Self, LibraryError> {
        let content = fs::read_to_string(path).map_err(|e| {
            LibraryError::Config(format!("failed to read tool registry {}: {e}", path.display()))
        })?;
        let tools: Vec<String> = serde_json::from_str(&content).map_err(|e| {
            LibraryError::Config(format!(
                "invalid tool registry {}: {e}",
                path.display()
            ))
        })?;
        Ok(Self::new(tools.into_iter().collect(), documents))
    }

    pub fn validate(&self, header: &Header) -> LayerReport {
        let mut report = LayerReport::new();
        self.check_tools(header, &mut report);
        self.check_coordination(header, &mut report);
        self.check_escalation(header, &mut report);
        self.check_version(header, &mut report);
        self.check_status_consistency(header, &mut report);
        report
    }

    fn check_tools(&self, header: &Header, report: &mut LayerReport) {
        for (label, list) in header.tools.labeled() {
            for tool in list {
                if self.tools.contains(tool) {
                    continue;
                }
                let locator = format!("tools.{label}");
                if label == "external" {
                    report.push(Issue::warning(
                        locator,
                        format!("Unknown external tool: {tool}"),
                        format!("Verify '{tool}' is a valid integration or add it to the tool registry"),
                    ));
                } else {
                    report.push(Issue::error(
                        locator,
                        format!("Unknown tool: {tool}"),
                        format!("Use a valid tool name or add '{tool}' to the tool registry"),
                    ));
                }
            }
        }
    }

    fn check_coordination(&self, header: &Header, report: &mut LayerReport) {
        for target in &header.coordination.coordinates_with {
            let name = target.trim_start_matches('@');
            if name == USER_SENTINEL || self.documents.contains(name) {
                continue;
            }
            report.push(Issue::error(
                "coordinates_with",
                format!("Unknown document: {target}"),
                format!("Use a valid document name from: {}", self.known_names()),
            ));
        }
    }

    fn check_escalation(&self, header: &Header, report: &mut LayerReport) {
        let target = header.coordination.escalates_to.trim_start_matches('@');
        if target == USER_SENTINEL || self.documents.contains(target) {
            return;
        }
        report.push(Issue::error(
            "escalates_to",
            format!(
                "Unknown escalation target: {}",
                header.coordination.escalates_to
            ),
            "Use @user or a valid document name",
        ));
    }

    fn check_version(&self, header: &Header, report: &mut LayerReport) {
        if !SEMVER_RE.is_match(&header.schema_version) {
            report.push(Issue::error(
                "version",
                format!("Invalid semantic version: {}", header.schema_version),
                "Use format: MAJOR.MINOR.PATCH (e.g., \"3.0.0\")",
            ));
        }
    }

    fn check_status_consistency(&self, header: &Header, report: &mut LayerReport) {
        match header.status {
            DocumentStatus::Deprecated => {
                if !header.extensions.contains_key("alternative") {
                    report.push(Issue::warning(
                        "status",
                        "Deprecated document should specify an alternative",
                        "Add custom.alternative: \"document-name\" to the header",
                    ));
                }
            }
            DocumentStatus::Experimental => {
                let major = header
                    .schema_version
                    .split('.')
                    .next()
                    .and_then(|m| m.parse::<u64>().ok());
                if matches!(major, Some(m) if m >= 1) {
                    report.push(Issue::warning(
                        "status",
                        "Experimental documents should use version <1.0.0",
                        "Set version to \"0.x.x\" for experimental status",
                    ));
                }
            }
            DocumentStatus::Beta => {
                report.push(Issue::warning(
                    "status",
                    "Beta documents should document known issues in the body",
                    "Add a \"## Known Issues\" section",
                ));
            }
            DocumentStatus::Stable => {}
        }
    }

    fn known_names(&self) -> String {
        self.documents
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}
