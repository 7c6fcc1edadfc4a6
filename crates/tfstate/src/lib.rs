//! # tfstate
//!
//! Reading and aggregating Terraform state files for drift detection.
//!
//! This crate provides functionality for:
//! - Normalizing both historical state shapes (flat `resources` and legacy
//!   `modules`) into [`ResourceRecord`]s
//! - Reading a single last-deployed baseline file
//! - Merging every `terraform.tfstate` under a directory tree into one keyed
//!   collection, with per-file diagnostics instead of aborting
//! - Running `terraformer` to import the resources of a live account
//!
//! Comparing a baseline with the imported state is left to the caller.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! let baseline = tfstate::read_baseline(Path::new("deploy/terraform.tfstate"))?;
//! let actual = tfstate::read_aggregated_state(Path::new("generated/aws"))?;
//!
//! for record in &baseline.resources {
//!     if actual.get(&record.key).is_none() {
//!         println!("not found in account: {}", record.key);
//!     }
//! }
//! for diagnostic in &actual.diagnostics {
//!     eprintln!("warning: {diagnostic}");
//! }
//! # Ok::<(), tfstate::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod baseline;
pub mod cancel;
pub mod collect;
pub mod document;
pub mod error;
pub mod import;
pub mod types;

pub use cancel::CancelToken;
pub use collect::Collector;
pub use document::StateDocument;
pub use error::{Error, ErrorKind, Result};
pub use import::{
    ImportBackend, ImportOutcome, ImportReport, ImportRequest, ImportStatus,
    terraformer::TerraformerBackend,
};
pub use types::{
    AggregatedState, Baseline, Diagnostic, DiagnosticKind, ModuleScope, NoProgress, Overwrite,
    ProgressCallback, ResourceRecord, STATE_FILENAME, ScanOptions,
};

use std::path::Path;

/// Read the last-deployed resources from one flat state file.
pub fn read_baseline(path: &Path) -> Result<Baseline> {
    baseline::read(path)
}

/// Merge every `terraform.tfstate` under `root`.
///
/// Only a missing root is an error; problems with individual files are
/// returned as [`AggregatedState::diagnostics`].
pub fn read_aggregated_state(root: &Path) -> Result<AggregatedState> {
    Collector::default().scan(root)
}

/// Run an import and report the result without failing.
///
/// A tool that cannot be started is reported as an error status with the
/// launch failure in `stderr`.
pub fn import_deployed_resources(
    backend: &dyn ImportBackend,
    request: &ImportRequest,
) -> ImportReport {
    match backend.run(request) {
        Ok(outcome) => outcome.into(),
        Err(e) => {
            log::warn!("{} could not be started: {e}", backend.name());
            ImportReport {
                status: ImportStatus::Error,
                stdout: String::new(),
                stderr: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockBackend {
        outcome: Option<ImportOutcome>,
        seen: Mutex<Vec<ImportRequest>>,
    }

    impl ImportBackend for MockBackend {
        fn name(&self) -> &str {
            "mock"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn run(&self, request: &ImportRequest) -> Result<ImportOutcome> {
            self.seen.lock().unwrap().push(request.clone());
            self.outcome.clone().ok_or_else(|| Error::Adapter {
                message: "no such file".to_string(),
            })
        }
    }

    #[test]
    fn test_import_success() {
        let backend = MockBackend {
            outcome: Some(ImportOutcome::Success {
                stdout: "imported 3 resources".to_string(),
                stderr: String::new(),
            }),
            seen: Mutex::new(Vec::new()),
        };
        let request = ImportRequest::new("aws", "ec2,s3", "us-east-1", "/out");

        let report = import_deployed_resources(&backend, &request);
        assert_eq!(report.status, ImportStatus::Success);
        assert_eq!(report.stdout, "imported 3 resources");
        assert_eq!(backend.seen.lock().unwrap().as_slice(), &[request]);
    }

    #[test]
    fn test_import_failure_is_reported() {
        let backend = MockBackend {
            outcome: Some(ImportOutcome::Failure {
                stdout: "scanning".to_string(),
                stderr: "AccessDenied".to_string(),
                detail: "exit status: 1".to_string(),
            }),
            seen: Mutex::new(Vec::new()),
        };
        let request = ImportRequest::new("aws", "ec2,s3", "us-east-1", "/out");

        let report = import_deployed_resources(&backend, &request);
        assert_eq!(report.status, ImportStatus::Error);
        assert_eq!(report.stdout, "scanning");
        assert_eq!(report.stderr, "AccessDenied");
    }

    #[test]
    fn test_import_launch_failure_is_reported() {
        let backend = MockBackend {
            outcome: None,
            seen: Mutex::new(Vec::new()),
        };
        let request = ImportRequest::new("aws", "ec2", "us-east-1", "/out");

        let report = import_deployed_resources(&backend, &request);
        assert_eq!(report.status, ImportStatus::Error);
        assert!(report.stderr.contains("no such file"));
    }
}
