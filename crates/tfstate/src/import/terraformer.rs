//! Real `terraformer` CLI backend.

use crate::error::{Error, Result};
use crate::import::{ImportBackend, ImportOutcome, ImportRequest};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Where terraformer lives when it is not on `PATH`.
pub const DEFAULT_TERRAFORMER: &str = "/usr/local/bin/terraformer";

/// Backend that executes `terraformer import`.
#[derive(Debug, Clone)]
pub struct TerraformerBackend {
    binary: PathBuf,
}

impl TerraformerBackend {
    /// Locate terraformer on `PATH`, falling back to [`DEFAULT_TERRAFORMER`].
    pub fn new() -> Self {
        let binary = which::which("terraformer")
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TERRAFORMER));
        Self { binary }
    }

    /// Use a specific executable.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// The executable this backend runs.
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for TerraformerBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportBackend for TerraformerBackend {
    fn name(&self) -> &str {
        "terraformer"
    }

    fn is_available(&self) -> bool {
        self.binary.is_file()
    }

    fn run(&self, request: &ImportRequest) -> Result<ImportOutcome> {
        log::info!(
            "Running {} import {} (resources={}, regions={}) into {}",
            self.binary.display(),
            request.cloud,
            request.resources,
            request.regions,
            request.output.display()
        );

        let output = Command::new(&self.binary)
            .args(request.args())
            .output()
            .map_err(|e| Error::Adapter {
                message: format!("failed to execute {}: {e}", self.binary.display()),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            Ok(ImportOutcome::Success { stdout, stderr })
        } else {
            log::warn!("terraformer import failed: {}", output.status);
            Ok(ImportOutcome::Failure {
                stdout,
                stderr,
                detail: output.status.to_string(),
            })
        }
    }
}
