//! Triggering external resource discovery.
//!
//! The [`ImportBackend`] trait is the seam between the engine and whatever
//! tool writes state files for a live cloud account, allowing for:
//! - Real `terraformer` execution
//! - Mock implementations for testing
//!
//! On success the request's output directory holds a tree of state files
//! ready for [`crate::Collector`].

pub mod terraformer;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;

/// Resource filter that imports everything.
pub const ALL_RESOURCES: &str = "*";

/// What to import and where to put it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRequest {
    /// Cloud provider (e.g., "aws")
    pub cloud: String,
    /// Comma-separated resource filter (e.g., "ec2,s3"), or `*`
    pub resources: String,
    /// Comma-separated region list (e.g., "us-east-1,eu-west-1")
    pub regions: String,
    /// Directory the tool writes state files into
    pub output: PathBuf,
}

impl ImportRequest {
    /// Create a request.
    pub fn new(
        cloud: impl Into<String>,
        resources: impl Into<String>,
        regions: impl Into<String>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            cloud: cloud.into(),
            resources: resources.into(),
            regions: regions.into(),
            output: output.into(),
        }
    }

    /// Whether this request imports every resource type.
    pub fn is_unscoped(&self) -> bool {
        self.resources
            .split(',')
            .any(|r| r.trim() == ALL_RESOURCES)
    }

    /// Arguments passed to the import tool.
    pub fn args(&self) -> Vec<OsString> {
        vec![
            "import".into(),
            self.cloud.clone().into(),
            "--resources".into(),
            self.resources.clone().into(),
            "--regions".into(),
            self.regions.clone().into(),
            "--path-output".into(),
            self.output.clone().into_os_string(),
        ]
    }
}

/// Result of running the import tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Tool exited cleanly
    Success {
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },
    /// Tool exited with a failure
    Failure {
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
        /// How it failed (e.g., exit status)
        detail: String,
    },
}

/// Status reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    /// Tool exited cleanly
    Success,
    /// Tool failed or could not be started
    Error,
}

/// `{status, stdout, stderr}` as handed to the orchestrating layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Whether the import succeeded
    pub status: ImportStatus,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl From<ImportOutcome> for ImportReport {
    fn from(outcome: ImportOutcome) -> Self {
        match outcome {
            ImportOutcome::Success { stdout, stderr } => Self {
                status: ImportStatus::Success,
                stdout,
                stderr,
            },
            ImportOutcome::Failure { stdout, stderr, .. } => Self {
                status: ImportStatus::Error,
                stdout,
                stderr,
            },
        }
    }
}

/// Backend trait for import tools.
pub trait ImportBackend: Send + Sync {
    /// Name of the tool, for messages.
    fn name(&self) -> &str;

    /// Check if the tool can be run.
    fn is_available(&self) -> bool;

    /// Run an import.
    ///
    /// A tool that runs and fails is `Ok(ImportOutcome::Failure)`; `Err` is
    /// reserved for a tool that could not be started at all.
    fn run(&self, request: &ImportRequest) -> Result<ImportOutcome>;
}
