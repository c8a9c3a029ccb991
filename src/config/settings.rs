use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{ProviderError, Result};

/// Project-level configuration, loaded from `.bwsm.toml`.
///
/// Every field has a sensible default so bwsm works out-of-the-box
/// without any config file at all. The access token is never
/// read from here; pass it with `--access-token` or `BW_ACCESS_TOKEN`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Secrets Manager API base URL.
    #[serde(default)]
    pub api_url: Option<String>,

    /// Identity service base URL.
    #[serde(default)]
    pub identity_url: Option<String>,

    /// Organization that owns the managed secrets.
    #[serde(default)]
    pub organization_id: Option<String>,

    /// State file (relative to the project root).
    #[serde(default = "default_state_file")]
    pub state_file: String,

    /// Use a JSON file at this path instead of the remote API.
    #[serde(default)]
    pub local_store: Option<String>,

    /// Deadline for each HTTP request, in seconds (default: 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_state_file() -> String {
    ".bwsm/state.json".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: None,
            identity_url: None,
            organization_id: None,
            state_file: default_state_file(),
            local_store: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = ".bwsm.toml";

    /// Load settings from `<project_dir>/.bwsm.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            ProviderError::Settings(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.request_timeout_secs == 0 {
            return Err(ProviderError::Settings(format!(
                "{}: request_timeout_secs must be greater than zero",
                config_path.display()
            )));
        }

        Ok(settings)
    }

    /// Full path to the state file, e.g. `project_dir/.bwsm/state.json`.
    pub fn state_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.state_file)
    }

    /// Full path to the local store file, if one is configured.
    pub fn local_store_path(&self, project_dir: &Path) -> Option<PathBuf> {
        self.local_store.as_ref().map(|p| project_dir.join(p))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
