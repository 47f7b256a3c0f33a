//! Lazy document registry.
//!
//! Discovery is a cheap scan: only the first few hundred bytes of each
//! candidate file are read to pattern-match a `name:` field, never a full
//! parse. Full normalization is deferred until a document is actually
//! requested, and the cache is consulted first. Each registry owns its
//! cache; independent registries are fully independent.

use crate::cache::{CacheStats, DocumentCache};
use crate::config::LibraryConfig;
use crate::document::Document;
use crate::error::LibraryError;
use crate::parser::Parser;
use regex::Regex;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// How many leading bytes the discovery probe reads.
pub const DEFAULT_PROBE_BYTES: usize = 300;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"name:\s*['"]?([a-z0-9-]+)"#).expect("valid regex"));

/// Two documents resolved to the same name during discovery. The
/// last-discovered location wins operationally; both are reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateName {
    pub name: String,
    pub kept: PathBuf,
    pub shadowed: PathBuf,
}

/// Outcome of a discovery scan.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryReport {
    pub discovered: usize,
    pub duplicates: Vec<DuplicateName>,
}

impl DiscoveryReport {
    /// Strict uniqueness: fail on the first name collision instead of
    /// accepting the last-discovered location.
    pub fn require_unique(&self) -> Result<(), LibraryError> {
        match self.duplicates.first() {
            None => Ok(()),
            Some(dup) => Err(LibraryError::DuplicateName {
                name: dup.name.clone(),
                kept: dup.kept.clone(),
                shadowed: dup.shadowed.clone(),
            }),
        }
    }
}

/// Outcome of a load-everything sweep. Per-document failures never abort
/// the sweep.
#[derive(Debug, Clone, Default)]
pub struct BatchLoadSummary {
    pub loaded: usize,
    pub failures: Vec<(String, String)>,
}

/// Registry and cache occupancy counters.
#[derive(Debug, Clone, Copy)]
pub struct RegistryStats {
    pub discovered: usize,
    pub cache: CacheStats,
}

/// Name-addressed access to a library directory of documents.
pub struct DocumentRegistry {
    root: PathBuf,
    parser: Parser,
    cache: DocumentCache,
    probe_bytes: usize,
    locations: HashMap<String, PathBuf>,
    order: Vec<String>,
}

impl DocumentRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_cache(root, DocumentCache::new())
    }

    /// Build a registry around an explicit cache instance.
    pub fn with_cache(root: impl Into<PathBuf>, cache: DocumentCache) -> Self {
        let root = root.into();
        let root = dunce::canonicalize(&root).unwrap_or(root);
        Self {
            root,
            parser: Parser::new(),
            cache,
            probe_bytes: DEFAULT_PROBE_BYTES,
            locations: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn with_probe_bytes(mut self, probe_bytes: usize) -> Self {
        self.probe_bytes = probe_bytes;
        self
    }

    /// Build a registry from loaded configuration.
    pub fn from_config(config: &LibraryConfig) -> Self {
        Self::with_cache(
            &config.library_dir,
            DocumentCache::with_max_age(std::time::Duration::from_secs(
                config.cache_max_age_secs,
            )),
        )
        .with_probe_bytes(config.discovery_probe_bytes)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Populate the name→location map. Re-running replaces the previous
    /// scan entirely.
    pub fn discover(&mut self) -> Result<DiscoveryReport, LibraryError> {
        if !self.root.is_dir() {
            return Err(LibraryError::Config(format!(
                "library directory {} does not exist",
                self.root.display()
            )));
        }

        self.locations.clear();
        self.order.clear();
        let mut report = DiscoveryReport::default();

        for entry in walkdir::WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry during discovery");
                    continue;
                }
            };
            if !entry.file_type().is_file()
                || entry.path().extension().and_then(|e| e.to_str()) != Some("md")
            {
                continue;
            }
            let path = entry.path().to_path_buf();
            let name = self.probe_name(&path);
            if let Some(previous) = self.locations.insert(name.clone(), path.clone()) {
                warn!(
                    name = %name,
                    kept = %path.display(),
                    shadowed = %previous.display(),
                    "duplicate document name; last discovered wins"
                );
                report.duplicates.push(DuplicateName {
                    name,
                    kept: path,
                    shadowed: previous,
                });
            } else {
                self.order.push(name);
            }
        }

        report.discovered = self.locations.len();
        debug!(count = report.discovered, root = %self.root.display(), "discovery complete");
        Ok(report)
    }

    /// Cheap name probe: first `probe_bytes` of the file, else the stem.
    fn probe_name(&self, path: &Path) -> String {
        let head = std::fs::File::open(path).ok().and_then(|mut file| {
            let mut buf = vec![0u8; self.probe_bytes];
            let n = file.read(&mut buf).ok()?;
            buf.truncate(n);
            Some(String::from_utf8_lossy(&buf).into_owned())
        });
        head.as_deref()
            .and_then(|head| NAME_RE.captures(head))
            .map(|caps| caps[1].to_string())
            .unwrap_or_else(|| {
                path.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "unnamed".to_string())
            })
    }

    /// Fetch a document by name, parsing at most once per content
    /// snapshot. Repeated calls with no underlying change return the
    /// cached value.
    pub fn get(&self, name: &str) -> Result<Arc<Document>, LibraryError> {
        let location = self
            .locations
            .get(name)
            .ok_or_else(|| LibraryError::NotFound(name.to_string()))?;

        if let Some(document) = self.cache.get(location) {
            return Ok(document);
        }

        match self.parser.parse(location) {
            Ok(document) => {
                let document = Arc::new(document);
                self.cache.set(location, Arc::clone(&document));
                Ok(document)
            }
            // discovered but gone by read time: not found, not a crash
            Err(LibraryError::MalformedInput { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Err(LibraryError::NotFound(name.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.locations.contains_key(name)
    }

    /// Known names in discovery order.
    pub fn list_names(&self) -> &[String] {
        &self.order
    }

    /// Storage location for a known name.
    pub fn location_of(&self, name: &str) -> Option<&Path> {
        self.locations.get(name).map(PathBuf::as_path)
    }

    /// Invalidate one document; the next `get` re-parses.
    pub fn reload(&self, name: &str) {
        if let Some(location) = self.locations.get(name) {
            self.cache.invalidate(location);
        }
    }

    /// Drop the whole cache and re-scan the library directory.
    pub fn reload_all(&mut self) -> Result<DiscoveryReport, LibraryError> {
        self.cache.clear();
        self.discover()
    }

    /// Parse every known document, collecting per-document failures.
    pub fn load_all(&self) -> BatchLoadSummary {
        let mut summary = BatchLoadSummary::default();
        for name in &self.order {
            match self.get(name) {
                Ok(_) => summary.loaded += 1,
                Err(err) => {
                    warn!(name = %name, error = %err, "failed to load document");
                    summary.failures.push((name.clone(), err.to_string()));
                }
            }
        }
        summary
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            discovered: self.locations.len(),
            cache: self.cache.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn library(files: &[(&str, &str)]) -> (tempfile::TempDir, DocumentRegistry) {
        let dir = tempfile::tempdir().unwrap();
        for (file, content) in files {
            fs::write(dir.path().join(file), content).unwrap();
        }
        let mut registry = DocumentRegistry::new(dir.path());
        registry.discover().unwrap();
        (dir, registry)
    }

    const AUDITOR: &str = "---\nname: auditor\ndescription: d\nversion: 3.0.0\n---\nbody\n";

    #[test]
    fn discovery_probes_names_without_parsing() {
        let (_dir, registry) = library(&[
            ("auditor.md", AUDITOR),
            ("notes.md", "no header here\n"),
        ]);
        assert_eq!(registry.list_names(), &["auditor", "notes"]);
        assert!(registry.has("auditor"));
        // nothing parsed yet
        assert_eq!(registry.stats().cache.size, 0);
    }

    #[test]
    fn get_is_idempotent_and_cache_served() {
        let (_dir, registry) = library(&[("auditor.md", AUDITOR)]);
        let first = registry.get("auditor").unwrap();
        let second = registry.get("auditor").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.stats().cache.hits, 1);
    }

    #[test]
    fn unknown_name_is_not_found() {
        let (_dir, registry) = library(&[("auditor.md", AUDITOR)]);
        assert!(matches!(
            registry.get("phantom"),
            Err(LibraryError::NotFound(_))
        ));
    }

    #[test]
    fn duplicate_names_report_both_and_last_wins() {
        let (_dir, registry) = library(&[
            ("auditor-copy.md", AUDITOR),
            ("auditor.md", AUDITOR),
        ]);
        let mut registry = registry;
        let report = registry.discover().unwrap();
        assert_eq!(report.discovered, 1);
        assert_eq!(report.duplicates.len(), 1);
        let dup = &report.duplicates[0];
        assert_eq!(dup.name, "auditor");
        assert!(dup.kept.ends_with("auditor.md"));
        assert!(dup.shadowed.ends_with("auditor-copy.md"));
        assert!(registry
            .location_of("auditor")
            .unwrap()
            .ends_with("auditor.md"));

        // strict callers can reject the collision outright
        assert!(matches!(
            report.require_unique(),
            Err(LibraryError::DuplicateName { .. })
        ));
    }

    #[test]
    fn reload_forces_a_fresh_parse() {
        let (_dir, registry) = library(&[("auditor.md", AUDITOR)]);
        let first = registry.get("auditor").unwrap();
        registry.reload("auditor");
        let second = registry.get("auditor").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }

    #[test]
    fn changed_file_yields_fresh_document() {
        let (dir, registry) = library(&[("auditor.md", AUDITOR)]);
        registry.get("auditor").unwrap();
        fs::write(
            dir.path().join("auditor.md"),
            "---\nname: auditor\ndescription: rewritten\nversion: 3.0.0\n---\nbody\n",
        )
        .unwrap();
        let fresh = registry.get("auditor").unwrap();
        assert_eq!(fresh.header.description, "rewritten");
    }

    #[test]
    fn vanished_file_surfaces_not_found() {
        let (dir, registry) = library(&[("auditor.md", AUDITOR)]);
        fs::remove_file(dir.path().join("auditor.md")).unwrap();
        assert!(matches!(
            registry.get("auditor"),
            Err(LibraryError::NotFound(_))
        ));
    }

    #[test]
    fn load_all_collects_failures_without_aborting() {
        let (dir, registry) = library(&[("auditor.md", AUDITOR), ("gone.md", "body\n")]);
        fs::remove_file(dir.path().join("gone.md")).unwrap();
        let summary = registry.load_all();
        assert_eq!(summary.loaded, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].0, "gone");
    }

    #[test]
    fn missing_root_is_a_config_error() {
        let mut registry = DocumentRegistry::new("/nonexistent/library");
        assert!(matches!(
            registry.discover(),
            Err(LibraryError::Config(_))
        ));
    }
}
