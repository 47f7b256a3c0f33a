//! Structural layer: the decoded header against the fixed schema.
//!
//! Required fields, types, enum values, and cross-field uniqueness of
//! tool names. Runs on every document on every validation invocation, so
//! it stays cheap; it also collects *every* problem rather than stopping
//! at the first.

use super::{Issue, LayerReport};
use crate::document::DocumentStatus;
use crate::parser::frontmatter;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("valid regex"));

const KNOWN_FIELDS: [&str; 13] = [
    "name",
    "description",
    "version",
    "status",
    "color",
    "tags",
    "thinking",
    "tools",
    "coordinates_with",
    "escalates_to",
    "verification_required",
    "self_verification",
    "custom",
];

const KNOWN_GRANT_LISTS: [&str; 4] = ["primary", "external", "mcp", "restricted"];

/// Report for a file that has no header block at all.
pub(super) fn missing_frontmatter_report() -> LayerReport {
    let mut report = LayerReport::new();
    report.push(Issue::error(
        "frontmatter",
        "No YAML frontmatter found",
        "Add YAML frontmatter between --- delimiters at file start",
    ));
    report
}

/// Fixed-schema checker for decoded header blocks.
#[derive(Debug, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a file on disk.
    pub fn validate_file(&self, path: &Path) -> LayerReport {
        match fs::read_to_string(path) {
            Ok(content) => self.validate_source(path, &content),
            Err(err) => {
                let mut report = LayerReport::new();
                report.push(Issue::error(
                    "file",
                    format!("failed to read {}: {err}", path.display()),
                    "Check the file exists and is readable",
                ));
                report
            }
        }
    }

    /// Validate raw document content (header block plus body).
    pub fn validate_source(&self, path: &Path, content: &str) -> LayerReport {
        let Some((raw, _body)) = frontmatter::split(content) else {
            return missing_frontmatter_report();
        };
        match frontmatter::decode_value(path, raw) {
            Ok(value) => self.validate_value(&value),
            Err(err) => {
                let mut report = LayerReport::new();
                report.push(Issue::error(
                    "yaml",
                    format!("YAML parse error: {err}"),
                    "Fix YAML syntax error (check indentation, quotes, special characters)",
                ));
                report
            }
        }
    }

    /// Validate an already-decoded header value.
    pub fn validate_value(&self, value: &Value) -> LayerReport {
        let mut report = LayerReport::new();
        let Some(map) = value.as_mapping() else {
            report.push(Issue::error(
                "frontmatter",
                "Header must be a key-value mapping",
                "Write the header as `key: value` lines",
            ));
            return report;
        };

        check_unknown_fields(map, &mut report);
        check_name(map, &mut report);
        check_required_string(map, "description", &mut report);
        check_optional_string(map, "version", &mut report);
        check_status(map, &mut report);
        check_optional_string(map, "color", &mut report);
        check_optional_string(map, "escalates_to", &mut report);
        check_string_sequence(map, "tags", true, &mut report);
        check_string_sequence(map, "coordinates_with", false, &mut report);
        check_thinking(map, &mut report);
        check_tools(map, &mut report);
        check_optional_bool(map, "verification_required", &mut report);
        check_optional_bool(map, "self_verification", &mut report);
        check_optional_mapping(map, "custom", &mut report);

        report
    }
}

fn get<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.get(key)
}

fn check_unknown_fields(map: &Mapping, report: &mut LayerReport) {
    for key in map.keys() {
        let Some(key) = key.as_str() else {
            report.push(Issue::error(
                "frontmatter",
                "Header keys must be strings",
                "Quote the offending key",
            ));
            continue;
        };
        if !KNOWN_FIELDS.contains(&key) {
            report.push(Issue::error(
                key,
                format!("Unknown field: {key}"),
                format!("Remove unknown field: {key} (or move it under custom)"),
            ));
        }
    }
}

fn check_name(map: &Mapping, report: &mut LayerReport) {
    let Some(value) = get(map, "name") else {
        report.push(Issue::error(
            "name",
            "Missing required field: name",
            "Add required field: name",
        ));
        return;
    };
    let Some(name) = value.as_str() else {
        report.push(type_issue("name", "string"));
        return;
    };
    if name.is_empty() {
        report.push(Issue::error(
            "name",
            "name must not be empty",
            "Give the document a non-empty name",
        ));
    } else if !NAME_PATTERN.is_match(name) {
        report.push(Issue::error(
            "name",
            format!("Invalid name: {name}"),
            "Use lowercase letters, digits, and dashes",
        ));
    }
}

fn check_required_string(map: &Mapping, field: &str, report: &mut LayerReport) {
    match get(map, field) {
        None => report.push(Issue::error(
            field,
            format!("Missing required field: {field}"),
            format!("Add required field: {field}"),
        )),
        Some(value) => match value.as_str() {
            Some(s) if s.is_empty() => report.push(Issue::error(
                field,
                format!("{field} must not be empty"),
                format!("Fill in the {field} field"),
            )),
            Some(_) => {}
            None => report.push(type_issue(field, "string")),
        },
    }
}

fn check_optional_string(map: &Mapping, field: &str, report: &mut LayerReport) {
    if let Some(value) = get(map, field) {
        if value.as_str().is_none() {
            report.push(type_issue(field, "string"));
        }
    }
}

fn check_optional_bool(map: &Mapping, field: &str, report: &mut LayerReport) {
    if let Some(value) = get(map, field) {
        if value.as_bool().is_none() {
            report.push(type_issue(field, "boolean"));
        }
    }
}

fn check_optional_mapping(map: &Mapping, field: &str, report: &mut LayerReport) {
    if let Some(value) = get(map, field) {
        if value.as_mapping().is_none() {
            report.push(type_issue(field, "mapping"));
        }
    }
}

fn check_status(map: &Mapping, report: &mut LayerReport) {
    let Some(value) = get(map, "status") else {
        return;
    };
    let Some(status) = value.as_str() else {
        report.push(type_issue("status", "string"));
        return;
    };
    if DocumentStatus::parse(status).is_none() {
        report.push(Issue::error(
            "status",
            format!("Invalid status: {status}"),
            format!("Use one of: {}", DocumentStatus::VALUES.join(", ")),
        ));
    }
}

fn check_string_sequence(map: &Mapping, field: &str, unique: bool, report: &mut LayerReport) {
    let Some(value) = get(map, field) else {
        return;
    };
    let Some(items) = value.as_sequence() else {
        report.push(type_issue(field, "list of strings"));
        return;
    };
    let mut seen = Vec::new();
    for item in items {
        let Some(item) = item.as_str() else {
            report.push(type_issue(field, "list of strings"));
            return;
        };
        if unique && seen.contains(&item) {
            report.push(Issue::error(
                field,
                format!("Remove duplicate items from {field}"),
                format!("Drop the repeated '{item}' entry"),
            ));
            return;
        }
        seen.push(item);
    }
}

fn check_thinking(map: &Mapping, report: &mut LayerReport) {
    let Some(value) = get(map, "thinking") else {
        return;
    };
    let Some(thinking) = value.as_mapping() else {
        report.push(type_issue("thinking", "mapping"));
        return;
    };
    if let Some(mode) = get(thinking, "default") {
        if mode.as_str().is_none() {
            report.push(type_issue("thinking.default", "string"));
        }
    }
}

fn check_tools(map: &Mapping, report: &mut LayerReport) {
    let Some(value) = get(map, "tools") else {
        return;
    };
    let Some(tools) = value.as_mapping() else {
        report.push(type_issue("tools", "mapping"));
        return;
    };

    // one pass over the lists in wire order, tracking where each tool
    // name first appeared
    let mut seen: Vec<(String, &str)> = Vec::new();
    for key in tools.keys() {
        let Some(key) = key.as_str() else {
            report.push(type_issue("tools", "mapping with string keys"));
            continue;
        };
        if !KNOWN_GRANT_LISTS.contains(&key) {
            report.push(Issue::error(
                "tools",
                format!("Unknown grant list: {key}"),
                "Use primary, external, or restricted",
            ));
            continue;
        }
        let Some(items) = get(tools, key).and_then(Value::as_sequence) else {
            report.push(type_issue(&format!("tools.{key}"), "list of strings"));
            continue;
        };
        for item in items {
            let Some(tool) = item.as_str() else {
                report.push(type_issue(&format!("tools.{key}"), "list of strings"));
                continue;
            };
            if let Some((_, first_list)) = seen.iter().find(|(name, _)| name == tool) {
                report.push(Issue::error(
                    "tools",
                    format!("Duplicate tool '{tool}' found in both '{first_list}' and '{key}'"),
                    format!("Remove duplicate '{tool}' from one of the tool lists"),
                ));
            } else {
                seen.push((tool.to_string(), key));
            }
        }
    }
}

fn type_issue(field: &str, expected: &str) -> Issue {
    Issue::error(
        field,
        format!("Wrong type for {field}"),
        format!("Change {field} to type: {expected}"),
    )
}
