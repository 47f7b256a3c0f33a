//! Narrow body-scanning utility.
//!
//! The only requirement on prose bodies is "does this labeled section
//! exist, and does it contain marker X". This module answers exactly
//! that and is not a markdown parser. Section headings are `##` lines;
//! a section runs until the next `##` heading or end of input.

use regex::Regex;
use std::sync::LazyLock;

/// Section heading: handoff guidelines. Always required.
pub const CONTEXT_PRESERVATION: &str = "CONTEXT PRESERVATION PROTOCOL";
/// Section heading: context-window hygiene. Always required.
pub const CONTEXT_EDITING: &str = "CONTEXT EDITING GUIDANCE";
/// Section heading: tool usage rationale.
pub const TOOL_PERMISSIONS: &str = "TOOL PERMISSIONS";
/// Section heading: quality checklists.
pub const SELF_VERIFICATION: &str = "SELF-VERIFICATION PROTOCOL";
/// Section heading: reasoning-depth guidance.
pub const EXTENDED_THINKING: &str = "EXTENDED THINKING GUIDANCE";

static ROLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\byou are the ([A-Za-z0-9_-]+)").expect("valid regex"));
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid regex"));
static GRANT_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\*\*(Primary|MCP|Restricted) Tools[^*]*\*\*:").expect("valid regex")
});
static GRANT_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s+\*\*([A-Za-z][A-Za-z0-9_]*)\*\*").expect("valid regex"));

/// True when the body carries a `## <heading>` line.
pub fn contains_heading(body: &str, heading: &str) -> bool {
    find_heading(body, heading).is_some()
}

/// Slice of the body from `## <heading>` up to the next `##` heading.
pub fn extract<'a>(body: &'a str, heading: &str) -> Option<&'a str> {
    let start = find_heading(body, heading)?;
    let after = start + heading.len();
    let end = body[after..]
        .find("\n## ")
        .map(|i| after + i)
        .unwrap_or(body.len());
    Some(&body[start..end])
}

fn find_heading(body: &str, heading: &str) -> Option<usize> {
    let needle = format!("## {heading}");
    body.find(&needle)
}

/// Role name from an introductory `You are THE <ROLE>` phrase, lowercased.
pub fn role_introduction(body: &str) -> Option<String> {
    ROLE_RE
        .captures(body)
        .map(|caps| caps[1].to_ascii_lowercase())
}

/// First line that is neither blank nor a heading.
pub fn leading_paragraph(body: &str) -> Option<&str> {
    body.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Bolded tool tokens grouped by the Primary/MCP/Restricted sub-labels
/// of a tool-permissions section, in order of appearance.
pub fn grant_lists(section: &str) -> (Vec<String>, Vec<String>, Vec<String>) {
    #[derive(Clone, Copy)]
    enum Bucket {
        Primary,
        External,
        Restricted,
    }

    let mut primary = Vec::new();
    let mut external = Vec::new();
    let mut restricted = Vec::new();
    let mut current: Option<Bucket> = None;

    for line in section.lines() {
        let line = line.trim_start();
        if let Some(caps) = GRANT_LABEL_RE.captures(line) {
            current = Some(match &caps[1] {
                "Primary" => Bucket::Primary,
                "MCP" => Bucket::External,
                _ => Bucket::Restricted,
            });
            continue;
        }
        if line.starts_with("**") {
            // some other bold label ends the grant block
            current = None;
            continue;
        }
        if let Some(caps) = GRANT_ITEM_RE.captures(line) {
            match current {
                Some(Bucket::Primary) => primary.push(caps[1].to_string()),
                Some(Bucket::External) => external.push(caps[1].to_string()),
                Some(Bucket::Restricted) => restricted.push(caps[1].to_string()),
                None => {}
            }
        }
    }

    (primary, external, restricted)
}

/// True when the section carries checklist-style content.
pub fn has_checklist(section: &str) -> bool {
    section.contains("- [ ]") || section.contains("Pre-Handoff Checklist")
}

/// Markdown links pointing at local paths (relative or absolute).
pub fn local_links(body: &str) -> Vec<(String, String)> {
    LINK_RE
        .captures_iter(body)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .filter(|(_, url)| url.starts_with('/') || url.starts_with('.'))
        .collect()
}
