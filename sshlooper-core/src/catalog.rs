//! Command catalog loaded from a directory of JSON files
//!
//! Each `.json` file holds exactly one command:
//!
//! ```json
//! { "Disk Usage": { "command": "df -h /", "parse": "(\\d+)%", "category": "posix" } }
//! ```
//!
//! Entries are keyed for display as `CATEGORY: label`. Files that cannot be
//! used are collected in [`CommandCatalog::skipped`] and never abort the load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{LoadError, LoadResult};
use crate::models::CommandSpec;
use crate::tracing::span_names;

/// Category used when an entry has none
pub const DEFAULT_CATEGORY: &str = "GENERAL";

#[derive(Debug, Deserialize)]
struct RawEntry {
    command: String,
    #[serde(default)]
    parse: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: Option<String>,
}

/// One catalog command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Display key, `CATEGORY: label`
    pub key: String,
    /// Label as written in the file
    pub label: String,
    /// Upper-cased category
    pub category: String,
    /// Command and extraction pattern
    pub spec: CommandSpec,
    /// File the entry came from
    pub source: PathBuf,
}

impl CatalogEntry {
    /// Builds an entry, normalizing the category
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        category: Option<&str>,
        spec: CommandSpec,
        source: impl Into<PathBuf>,
    ) -> Self {
        let label = label.into();
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map_or_else(|| DEFAULT_CATEGORY.to_string(), str::to_uppercase);
        Self {
            key: format!("{category}: {label}"),
            label,
            category,
            spec,
            source: source.into(),
        }
    }
}

/// A file that did not contribute an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// Offending file
    pub path: PathBuf,
    /// Why it was skipped
    pub reason: String,
}

/// All commands available for dispatch, ordered by display key
#[derive(Debug, Clone, Default)]
pub struct CommandCatalog {
    entries: BTreeMap<String, CatalogEntry>,
    /// Files that were ignored during loading
    pub skipped: Vec<SkippedFile>,
}

impl CommandCatalog {
    /// Creates an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every `.json` file in `dir`, in file name order
    ///
    /// # Errors
    ///
    /// Returns an IO error only if the directory itself cannot be read.
    pub fn load_dir(dir: &Path) -> LoadResult<Self> {
        let _span = tracing::info_span!(span_names::CATALOG_LOAD, dir = %dir.display()).entered();

        let read_dir = std::fs::read_dir(dir).map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files: Vec<PathBuf> = read_dir
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
            })
            .collect();
        files.sort();

        let mut catalog = Self::new();
        for path in files {
            match read_entry(&path) {
                Ok(entry) => {
                    if catalog.entries.contains_key(&entry.key) {
                        catalog.skip(path, format!("duplicate command '{}'", entry.key));
                    } else {
                        catalog.insert(entry);
                    }
                }
                Err(reason) => catalog.skip(path, reason),
            }
        }

        tracing::debug!(
            commands = catalog.len(),
            skipped = catalog.skipped.len(),
            "Command catalog loaded"
        );
        Ok(catalog)
    }

    fn skip(&mut self, path: PathBuf, reason: String) {
        tracing::warn!(path = %path.display(), reason = %reason, "Command file skipped");
        self.skipped.push(SkippedFile { path, reason });
    }

    /// Adds or replaces an entry
    pub fn insert(&mut self, entry: CatalogEntry) {
        self.entries.insert(entry.key.clone(), entry);
    }

    /// Number of commands
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the catalog has no commands
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in display key order
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Distinct categories in order
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self.entries.values().map(|e| e.category.as_str()).collect();
        categories.dedup();
        categories
    }

    /// Looks up a command by display key, falling back to a unique label
    ///
    /// Both comparisons ignore ASCII case.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&CatalogEntry> {
        let key = key.trim();
        if let Some(entry) = self.entries.get(key) {
            return Some(entry);
        }
        if let Some(entry) = self
            .entries
            .values()
            .find(|e| e.key.eq_ignore_ascii_case(key))
        {
            return Some(entry);
        }

        let mut by_label = self
            .entries
            .values()
            .filter(|e| e.label.eq_ignore_ascii_case(key));
        match (by_label.next(), by_label.next()) {
            (Some(entry), None) => Some(entry),
            _ => None,
        }
    }

    /// Entries whose key or command text contains `keyword`, ignoring case
    ///
    /// An empty keyword matches everything.
    #[must_use]
    pub fn filter(&self, keyword: &str) -> Vec<&CatalogEntry> {
        let needle = keyword.trim().to_lowercase();
        self.entries
            .values()
            .filter(|e| {
                needle.is_empty()
                    || e.key.to_lowercase().contains(&needle)
                    || e.spec.command.to_lowercase().contains(&needle)
            })
            .collect()
    }
}

fn read_entry(path: &Path) -> Result<CatalogEntry, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("unreadable: {e}"))?;
    if text.trim().is_empty() {
        return Err("empty file".to_string());
    }

    let object: BTreeMap<String, serde_json::Value> =
        serde_json::from_str(&text).map_err(|e| format!("invalid JSON: {e}"))?;
    if object.len() != 1 {
        return Err(format!(
            "expected exactly one command, found {}",
            object.len()
        ));
    }

    let Some((label, value)) = object.into_iter().next() else {
        return Err("expected exactly one command, found 0".to_string());
    };
    let raw: RawEntry =
        serde_json::from_value(value).map_err(|e| format!("invalid command '{label}': {e}"))?;

    let spec = CommandSpec::new(raw.command, raw.parse).with_description(raw.description);
    Ok(CatalogEntry::new(label, raw.category.as_deref(), spec, path))
}
