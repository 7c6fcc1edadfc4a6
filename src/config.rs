use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tfstate::{ModuleScope, STATE_FILENAME, ScanOptions, TerraformerBackend};

use crate::paths;

/// Environment variable overriding the terraformer executable
pub const ENV_TERRAFORMER: &str = "DRIFTSCAN_TERRAFORMER";

const CONFIG_FILE: &str = "config.toml";

/// Settings from `config.toml`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the terraformer executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terraformer: Option<String>,

    /// Default cloud provider for imports
    #[serde(default = "default_cloud")]
    pub cloud: String,

    /// Default comma-separated region list for imports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<String>,

    /// File name collected by `imported`
    #[serde(default = "default_state_filename")]
    pub state_filename: String,

    /// Which legacy modules to read
    #[serde(default)]
    pub modules: ModuleScope,
}

fn default_cloud() -> String {
    "aws".to_string()
}

fn default_state_filename() -> String {
    STATE_FILENAME.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            terraformer: None,
            cloud: default_cloud(),
            regions: None,
            state_filename: default_state_filename(),
            modules: ModuleScope::default(),
        }
    }
}

impl Config {
    /// Location of the config file
    pub fn path() -> Result<PathBuf> {
        Ok(paths::config_dir()?.join(CONFIG_FILE))
    }

    /// Load the config file, or defaults if there is none
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load a specific config file, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Resolve the terraformer executable
    ///
    /// Priority: `DRIFTSCAN_TERRAFORMER`, config value, `PATH`, fixed default.
    pub fn terraformer_backend(&self) -> TerraformerBackend {
        if let Ok(path) = std::env::var(ENV_TERRAFORMER) {
            log::debug!("Using terraformer from {ENV_TERRAFORMER}: {path}");
            return TerraformerBackend::with_binary(paths::expand(&path));
        }
        if let Some(path) = &self.terraformer {
            return TerraformerBackend::with_binary(paths::expand(path));
        }
        TerraformerBackend::new()
    }

    /// Scan options for aggregation
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::default()
            .with_filename(&self.state_filename)
            .with_modules(self.modules)
    }
}
