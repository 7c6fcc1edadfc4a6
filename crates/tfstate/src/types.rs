//! Core types for normalized state.

use crate::cancel::CancelToken;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Reserved file name the collector looks for.
pub const STATE_FILENAME: &str = "terraform.tfstate";

/// One infrastructure resource extracted from a state document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Identifier unique within one state document (e.g., "aws_instance.web")
    pub key: String,
    /// Resource type (e.g., "aws_instance")
    #[serde(rename = "type")]
    pub resource_type: String,
    /// The entry body exactly as it appeared in the document
    pub attributes: Map<String, Value>,
    /// File the record was loaded from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
}

impl ResourceRecord {
    /// Create a record without provenance.
    pub fn new(
        key: impl Into<String>,
        resource_type: impl Into<String>,
        attributes: Map<String, Value>,
    ) -> Self {
        Self {
            key: key.into(),
            resource_type: resource_type.into(),
            attributes,
            source_path: None,
        }
    }

    /// Attach the file the record came from.
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// The entry body as a JSON object.
    pub fn body(&self) -> Value {
        Value::Object(self.attributes.clone())
    }
}

/// Kind of non-fatal problem found during aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Directory entry could not be visited
    Walk,
    /// File could not be read
    Read,
    /// File is not valid JSON
    Decode,
    /// File or entry has an unexpected shape
    Format,
    /// Resources in modules beyond the first were not loaded
    IgnoredModules,
    /// Scan stopped before all files were processed
    Cancelled,
}

impl DiagnosticKind {
    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Read => "read",
            Self::Decode => "decode",
            Self::Format => "format",
            Self::IgnoredModules => "ignored-modules",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A non-fatal problem recorded while scanning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// File (or scan root) the problem relates to
    pub path: PathBuf,
    /// What went wrong
    pub kind: DiagnosticKind,
    /// Human-readable detail
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic.
    pub fn new(path: impl Into<PathBuf>, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// A record that was replaced by a later one with the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overwrite {
    /// The shared key
    pub key: String,
    /// File of the dropped record
    pub replaced: PathBuf,
    /// File of the record that won
    pub replaced_by: PathBuf,
}

/// Which modules of a legacy document are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleScope {
    /// Only `modules[0]`
    #[default]
    First,
    /// Every module, in order
    All,
}

impl fmt::Display for ModuleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleScope::First => write!(f, "first"),
            ModuleScope::All => write!(f, "all"),
        }
    }
}

/// Options for an aggregation scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Exact file name to collect
    pub filename: String,
    /// Which legacy modules to read
    pub modules: ModuleScope,
    /// Checked between files
    pub cancel: CancelToken,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            filename: STATE_FILENAME.to_string(),
            modules: ModuleScope::default(),
            cancel: CancelToken::new(),
        }
    }
}

impl ScanOptions {
    /// Set the file name to collect.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Set the module scope.
    pub fn with_modules(mut self, modules: ModuleScope) -> Self {
        self.modules = modules;
        self
    }

    /// Set the cancellation token.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Merged result of scanning a directory tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedState {
    /// Records by key
    pub resources: BTreeMap<String, ResourceRecord>,
    /// Non-fatal problems, in the order they were found
    pub diagnostics: Vec<Diagnostic>,
    /// Records that lost to a later record with the same key
    pub overwrites: Vec<Overwrite>,
    /// Number of files fully processed
    pub files_scanned: usize,
    /// Whether the scan was stopped early
    pub cancelled: bool,
}

impl AggregatedState {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a record. A record with the same key is replaced, not merged.
    ///
    /// Returns the replaced record, if any.
    pub fn insert(&mut self, record: ResourceRecord) -> Option<ResourceRecord> {
        let key = record.key.clone();
        let winner = record.source_path.clone();
        let previous = self.resources.insert(key.clone(), record)?;

        self.overwrites.push(Overwrite {
            key,
            replaced: previous.source_path.clone().unwrap_or_default(),
            replaced_by: winner.unwrap_or_default(),
        });
        Some(previous)
    }

    /// Look up a record by key.
    pub fn get(&self, key: &str) -> Option<&ResourceRecord> {
        self.resources.get(key)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether no records were collected.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Whether the scan finished without diagnostics.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Record count per resource type.
    pub fn type_counts(&self) -> BTreeMap<String, usize> {
        count_types(self.resources.values())
    }

    /// Render as `{"resources": {key: body}, "diagnostics": [string]}`.
    pub fn to_json(&self) -> Value {
        let resources: Map<String, Value> = self
            .resources
            .iter()
            .map(|(key, record)| (key.clone(), record.body()))
            .collect();
        let diagnostics: Vec<String> = self.diagnostics.iter().map(ToString::to_string).collect();

        json!({
            "resources": resources,
            "diagnostics": diagnostics,
        })
    }
}

/// Records read from a single baseline state file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Baseline {
    /// File the records were read from
    pub path: PathBuf,
    /// Records in declaration order
    pub resources: Vec<ResourceRecord>,
}

impl Baseline {
    /// Create a baseline.
    pub fn new(path: &Path, resources: Vec<ResourceRecord>) -> Self {
        Self {
            path: path.to_path_buf(),
            resources,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the file declared no resources.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resource types in declaration order.
    pub fn types(&self) -> Vec<&str> {
        self.resources
            .iter()
            .map(|r| r.resource_type.as_str())
            .collect()
    }

    /// Record count per resource type.
    pub fn type_counts(&self) -> BTreeMap<String, usize> {
        count_types(self.resources.iter())
    }

    /// Render as `{"resources": [body, ...]}`.
    pub fn to_json(&self) -> Value {
        let resources: Vec<Value> = self.resources.iter().map(ResourceRecord::body).collect();
        json!({ "resources": resources })
    }
}

fn count_types<'a>(records: impl Iterator<Item = &'a ResourceRecord>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.resource_type.clone()).or_insert(0) += 1;
    }
    counts
}

/// Callback trait for scan progress updates
pub trait ProgressCallback {
    /// Called once discovery is done, with the number of files to read
    fn on_start(&mut self, total_files: usize);

    /// Called when starting to read a file
    fn on_file(&mut self, path: &Path);

    /// Called when a file is done (success or failure)
    fn on_file_complete(&mut self, success: bool);

    /// Called when the scan is complete
    fn on_complete(&mut self, state: &AggregatedState);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_start(&mut self, _total_files: usize) {}
    fn on_file(&mut self, _path: &Path) {}
    fn on_file_complete(&mut self, _success: bool) {}
    fn on_complete(&mut self, _state: &AggregatedState) {}
}
