//! Aggregation of state files found under a directory tree.
//!
//! Files are discovered first, sorted by full path, then read one at a time.
//! Records are merged by key with last-write-wins, so for a given tree the
//! winner of every key collision is always the same.

use crate::document::{StateDocument, Variant};
use crate::error::{Error, Result};
use crate::types::{
    AggregatedState, Diagnostic, DiagnosticKind, NoProgress, ProgressCallback, ScanOptions,
};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Scans directory trees and merges the state files it finds.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    options: ScanOptions,
}

/// Files found under a root, in processing order.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Matching files, sorted by full path
    pub files: Vec<PathBuf>,
    /// Entries that could not be visited
    pub diagnostics: Vec<Diagnostic>,
}

impl Collector {
    /// Create a collector with the given options.
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }

    /// Find every file named exactly like the state file under `root`.
    pub fn discover(&self, root: &Path) -> Result<Discovery> {
        if !root.exists() {
            return Err(Error::PathNotFound(root.to_path_buf()));
        }

        let mut discovery = Discovery::default();
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(root).to_path_buf();
                    log::warn!("Skipping {}: {}", path.display(), e);
                    discovery
                        .diagnostics
                        .push(Diagnostic::new(path, DiagnosticKind::Walk, e.to_string()));
                    continue;
                }
            };

            if entry.file_type().is_file()
                && entry.file_name().to_str() == Some(self.options.filename.as_str())
            {
                log::debug!("Found state file: {}", entry.path().display());
                discovery.files.push(entry.into_path());
            }
        }

        discovery.files.sort();
        Ok(discovery)
    }

    /// Scan a tree and merge every state file in it.
    pub fn scan(&self, root: &Path) -> Result<AggregatedState> {
        self.scan_with_progress(root, &mut NoProgress)
    }

    /// Scan a tree, reporting progress.
    ///
    /// Per-file problems become diagnostics; only a missing root is fatal.
    pub fn scan_with_progress<P: ProgressCallback>(
        &self,
        root: &Path,
        progress: &mut P,
    ) -> Result<AggregatedState> {
        let discovery = self.discover(root)?;
        let total = discovery.files.len();

        let mut state = AggregatedState::new();
        state.diagnostics = discovery.diagnostics;
        progress.on_start(total);

        for path in &discovery.files {
            if self.options.cancel.is_cancelled() {
                log::warn!(
                    "Scan of {} cancelled after {} of {} files",
                    root.display(),
                    state.files_scanned,
                    total
                );
                state.cancelled = true;
                state.diagnostics.push(Diagnostic::new(
                    root,
                    DiagnosticKind::Cancelled,
                    format!(
                        "scan cancelled after {} of {} files",
                        state.files_scanned, total
                    ),
                ));
                break;
            }

            progress.on_file(path);
            let ok = self.merge_file(path, &mut state);
            state.files_scanned += 1;
            progress.on_file_complete(ok);
        }

        log::info!(
            "Loaded {} resources from {} files under {} ({} diagnostics)",
            state.len(),
            state.files_scanned,
            root.display(),
            state.diagnostics.len()
        );
        progress.on_complete(&state);
        Ok(state)
    }

    /// Load one file into `state`. Returns false if anything was reported.
    fn merge_file(&self, path: &Path, state: &mut AggregatedState) -> bool {
        let before = state.diagnostics.len();

        let doc = match StateDocument::load(path) {
            Ok(doc) => doc,
            Err(e) => {
                report(state, diagnostic_from(path, &e));
                return false;
            }
        };

        if doc.variant() == Variant::Flat && !doc.has_modules() {
            report(
                state,
                Diagnostic::new(
                    path,
                    DiagnosticKind::Format,
                    "flat state document has no `modules`; no resources loaded",
                ),
            );
            return false;
        }

        let loaded = match doc.legacy_records(self.options.modules) {
            Ok(loaded) => loaded,
            Err(e) => {
                report(state, diagnostic_from(path, &e));
                return false;
            }
        };

        for message in loaded.rejected {
            report(
                state,
                Diagnostic::new(path, DiagnosticKind::Format, format!("rejected {message}")),
            );
        }
        if loaded.ignored > 0 {
            report(
                state,
                Diagnostic::new(
                    path,
                    DiagnosticKind::IgnoredModules,
                    format!(
                        "{} resources in modules after the first were not loaded",
                        loaded.ignored
                    ),
                ),
            );
        }

        for record in loaded.records {
            log::debug!("Loaded {} (type={})", record.key, record.resource_type);
            if let Some(previous) = state.insert(record.with_source(path)) {
                log::debug!(
                    "{} from {} replaced by {}",
                    previous.key,
                    previous
                        .source_path
                        .as_deref()
                        .unwrap_or(Path::new("?"))
                        .display(),
                    path.display()
                );
            }
        }

        state.diagnostics.len() == before
    }
}

fn report(state: &mut AggregatedState, diagnostic: Diagnostic) {
    log::warn!("{diagnostic}");
    state.diagnostics.push(diagnostic);
}

fn diagnostic_from(path: &Path, error: &Error) -> Diagnostic {
    let kind = match error {
        Error::Read { .. } => DiagnosticKind::Read,
        Error::Decode { .. } => DiagnosticKind::Decode,
        _ => DiagnosticKind::Format,
    };
    let message = match error {
        Error::Read { source, .. } => source.to_string(),
        Error::Decode { source, .. } => source.to_string(),
        Error::Format { message, .. } => message.clone(),
        other => other.to_string(),
    };
    Diagnostic::new(path, kind, message)
}
