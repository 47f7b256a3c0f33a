//! Composed three-layer validation over a real library directory.

use anyhow::Result;
use quill::{CrossRefValidator, DocumentRegistry, LibraryConfig, StructuralValidator, Validator};
use std::collections::BTreeSet;
use std::fs;
use tempfile::TempDir;

const AUDITOR: &str = "\
---
name: auditor
description: Reviews changes before they land
version: 3.0.0
tags: [qa]
thinking:
  default: think
tools:
  primary: [Read, Grep]
  external: [mcp__github]
coordinates_with: [coordinator]
escalates_to: \"@coordinator\"
verification_required: true
---
## CONTEXT PRESERVATION PROTOCOL

Record findings before handing off.

## CONTEXT EDITING GUIDANCE

Trim stale context early.

## TOOL PERMISSIONS

**Primary Tools**:
- **Read** - inspect changed files
- **Grep** - locate affected call sites

**MCP Tools**:
- **mcp__github** - pull request metadata

Fallback: clone locally when the integration is down.

## SELF-VERIFICATION PROTOCOL

Pre-Handoff Checklist:
- [ ] every finding has a file and line

Quality Validation: findings are reproducible.

Error Recovery: re-run the sweep after fixing tooling.

## EXTENDED THINKING GUIDANCE

Use think for routine reviews; deeper modes cost latency and are
reserved for ambiguous diffs.
";

const COORDINATOR: &str = "\
---
name: coordinator
description: Orchestrates the team
color: green
---
Orchestrates work across the library.
";

const RELIC: &str = "\
You are THE ARCHIVIST

Keeps historical records in order.
";

fn seed_library() -> Result<TempDir> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("auditor.md"), AUDITOR)?;
    fs::write(dir.path().join("coordinator.md"), COORDINATOR)?;
    fs::write(dir.path().join("relic.md"), RELIC)?;
    Ok(dir)
}

fn known_documents(registry: &DocumentRegistry) -> BTreeSet<String> {
    registry.list_names().iter().cloned().collect()
}

#[test]
fn complete_document_passes_every_layer() -> Result<()> {
    let dir = seed_library()?;
    let mut registry = DocumentRegistry::new(dir.path());
    registry.discover()?;

    let validator = Validator::new(CrossRefValidator::with_default_tools(known_documents(
        &registry,
    )));
    let report = validator.validate_path(&dir.path().join("auditor.md"));
    assert!(report.valid(), "{report:?}");
    assert!(report.structural.as_ref().unwrap().valid);
    assert!(report.crossref.as_ref().unwrap().valid);
    assert!(report.content.as_ref().unwrap().valid);
    assert!(!report.has_warnings(), "{report:?}");
    Ok(())
}

#[test]
fn batch_validation_always_yields_a_full_summary() -> Result<()> {
    let dir = seed_library()?;
    let mut registry = DocumentRegistry::new(dir.path());
    registry.discover()?;

    let validator = Validator::new(CrossRefValidator::with_default_tools(known_documents(
        &registry,
    )));
    let summary = validator.validate_all(&registry);

    assert_eq!(summary.total, 3);
    assert_eq!(summary.passed, 1);
    // coordinator: legacy body lacks required sections; relic: no header
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.reports.len(), 3);
    Ok(())
}

#[test]
fn summaries_serialize_as_structured_records() -> Result<()> {
    let dir = seed_library()?;
    let mut registry = DocumentRegistry::new(dir.path());
    registry.discover()?;

    let validator = Validator::new(CrossRefValidator::with_default_tools(known_documents(
        &registry,
    )));
    let summary = validator.validate_all(&registry);
    let json = serde_json::to_value(&summary)?;

    assert_eq!(json["total"], 3);
    assert_eq!(json["passed"], 1);
    assert!(json["reports"].as_array().unwrap().len() == 3);
    Ok(())
}

#[test]
fn unknown_primary_tool_fails_only_the_crossref_layer() -> Result<()> {
    let dir = seed_library()?;
    fs::write(
        dir.path().join("auditor.md"),
        AUDITOR.replace("primary: [Read, Grep]", "primary: [Transmogrify, Read, Grep]"),
    )?;
    let mut registry = DocumentRegistry::new(dir.path());
    registry.discover()?;

    let validator = Validator::new(CrossRefValidator::with_default_tools(known_documents(
        &registry,
    )));
    let report = validator.validate_path(&dir.path().join("auditor.md"));
    assert!(report.structural.as_ref().unwrap().valid);
    assert!(!report.crossref.as_ref().unwrap().valid);
    Ok(())
}

#[test]
fn headerless_file_stops_at_the_structural_layer() -> Result<()> {
    let dir = seed_library()?;
    let validator = Validator::new(CrossRefValidator::with_default_tools(BTreeSet::new()));
    let report = validator.validate_path(&dir.path().join("relic.md"));

    assert!(!report.valid());
    let structural = report.structural.as_ref().unwrap();
    assert_eq!(structural.errors[0].locator, "frontmatter");
    assert!(report.crossref.is_none());
    assert!(report.content.is_none());
    Ok(())
}

#[test]
fn configured_registry_and_tool_file_drive_validation() -> Result<()> {
    let dir = seed_library()?;
    let tools_path = dir.path().join("tool-registry.json");
    fs::write(&tools_path, r#"["Read", "Grep", "mcp__github"]"#)?;

    let config = LibraryConfig {
        library_dir: dir.path().to_path_buf(),
        tool_registry_path: Some(tools_path),
        ..LibraryConfig::default()
    };
    let mut registry = DocumentRegistry::from_config(&config);
    registry.discover()?;

    let crossref = match &config.tool_registry_path {
        Some(path) => CrossRefValidator::from_tool_registry_file(path, known_documents(&registry))?,
        None => CrossRefValidator::with_default_tools(known_documents(&registry)),
    };
    let validator = Validator::new(crossref);
    let report = validator.validate_path(&dir.path().join("auditor.md"));
    assert!(report.valid(), "{report:?}");
    Ok(())
}

#[test]
fn layers_remain_independently_invocable() -> Result<()> {
    let dir = seed_library()?;
    let structural = StructuralValidator::new();
    let report = structural.validate_file(&dir.path().join("coordinator.md"));
    assert!(report.valid, "{:?}", report.errors);
    Ok(())
}
