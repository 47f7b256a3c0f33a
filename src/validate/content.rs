//! Content layer: does the prose body back up what the header declares?
//!
//! Section checks are presence checks against documented heading markers,
//! driven by the declared header features. Intra-library links are
//! checked for existence; broken ones are warnings.

use super::{Issue, LayerReport};
use crate::document::Header;
use crate::parser::sections;
use std::path::Path;

/// Completeness checker for prose bodies.
#[derive(Debug, Default)]
pub struct ContentValidator;

impl ContentValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, header: &Header, body: &str, path: &Path) -> LayerReport {
        let mut report = LayerReport::new();
        self.check_required_sections(header, body, &mut report);
        self.check_verification(header, body, &mut report);
        self.check_thinking_guidance(header, body, &mut report);
        self.check_tool_documentation(header, body, &mut report);
        self.check_links(body, path, &mut report);
        report
    }

    fn check_required_sections(&self, header: &Header, body: &str, report: &mut LayerReport) {
        if !sections::contains_heading(body, sections::CONTEXT_PRESERVATION) {
            report.push(missing_section(sections::CONTEXT_PRESERVATION, "handoff guidelines"));
        }
        if !sections::contains_heading(body, sections::CONTEXT_EDITING) {
            report.push(missing_section(sections::CONTEXT_EDITING, "context-window hygiene"));
        }
        if !header.tools.is_empty()
            && !sections::contains_heading(body, sections::TOOL_PERMISSIONS)
        {
            report.push(missing_section(sections::TOOL_PERMISSIONS, "tool usage rationale"));
        }
    }

    fn check_verification(&self, header: &Header, body: &str, report: &mut LayerReport) {
        if !header.verification.required && !header.verification.self_verifying {
            return;
        }
        let Some(section) = sections::extract(body, sections::SELF_VERIFICATION) else {
            report.push(missing_section(sections::SELF_VERIFICATION, "quality checklist"));
            return;
        };
        for (marker, fix) in [
            (
                "Pre-Handoff Checklist",
                "Add a **Pre-Handoff Checklist** subsection with actionable items",
            ),
            (
                "Quality Validation",
                "Add a **Quality Validation** subsection with quality criteria",
            ),
            (
                "Error Recovery",
                "Add an **Error Recovery** subsection with recovery protocols",
            ),
        ] {
            if !section.contains(marker) {
                report.push(Issue::error(
                    sections::SELF_VERIFICATION,
                    format!("Missing {marker} in self-verification section"),
                    fix,
                ));
            }
        }
        if !section.contains("- [ ]") {
            report.push(Issue::error(
                sections::SELF_VERIFICATION,
                "Self-verification section has no checklist items",
                "Add '- [ ]' items under the Pre-Handoff Checklist",
            ));
        }
    }

    fn check_thinking_guidance(&self, header: &Header, body: &str, report: &mut LayerReport) {
        let Some(thinking) = header.thinking.as_ref() else {
            return;
        };
        let Some(section) = sections::extract(body, sections::EXTENDED_THINKING) else {
            report.push(missing_section(sections::EXTENDED_THINKING, "thinking modes"));
            return;
        };
        if !section.contains(&thinking.default_mode) {
            report.push(Issue::warning(
                sections::EXTENDED_THINKING,
                format!(
                    "Default thinking mode \"{}\" not explained in guidance",
                    thinking.default_mode
                ),
                format!(
                    "Add an explanation of when to use \"{}\" mode",
                    thinking.default_mode
                ),
            ));
        }
        if !section.to_lowercase().contains("cost") {
            report.push(Issue::warning(
                sections::EXTENDED_THINKING,
                "Missing cost-benefit guidance for thinking modes",
                "Explain when deeper thinking is worth the cost",
            ));
        }
    }

    fn check_tool_documentation(&self, header: &Header, body: &str, report: &mut LayerReport) {
        let Some(section) = sections::extract(body, sections::TOOL_PERMISSIONS) else {
            return;
        };
        for tool in &header.tools.primary {
            if !section.contains(tool.as_str()) {
                report.push(Issue::warning(
                    sections::TOOL_PERMISSIONS,
                    format!("Primary tool '{tool}' not documented in tool-permissions section"),
                    format!("Add an explanation for why {tool} is essential"),
                ));
            }
        }
        if !header.tools.external.is_empty()
            && !section.contains("MCP FALLBACK")
            && !section.contains("Fallback")
        {
            report.push(Issue::warning(
                sections::TOOL_PERMISSIONS,
                "External integrations used but no fallback strategies documented",
                "Add a fallback strategies note explaining alternatives",
            ));
        }
    }

    fn check_links(&self, body: &str, path: &Path, report: &mut LayerReport) {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let base = dunce::canonicalize(base).unwrap_or_else(|_| base.to_path_buf());
        for (_, url) in sections::local_links(body) {
            let target = if url.starts_with('/') {
                Path::new(&url).to_path_buf()
            } else {
                base.join(&url)
            };
            if !target.exists() {
                report.push(Issue::warning(
                    "links",
                    format!("Broken internal link: {url}"),
                    format!("Create the file at {url} or fix the link"),
                ));
            }
        }
    }
}

fn missing_section(heading: &str, hint: &str) -> Issue {
    Issue::error(
        heading,
        format!("Missing required section: ## {heading}"),
        format!("Add a {heading} section with {hint}"),
    )
}
