//! Local state file.
//!
//! Maps resource names to the last observed `SecretState`. The file holds
//! secret values in plaintext, so it is written with owner-only
//! permissions on Unix.
//!
//! Format (`.bwsm/state.json` by default):
//!
//! ```json
//! { "version": 1, "resources": { "db_password": { "id": "...", ... } } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ProviderError, Result};
use crate::secret::SecretState;

/// Current state file format version.
pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    pub version: u32,
    #[serde(default)]
    pub resources: BTreeMap<String, SecretState>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            resources: BTreeMap::new(),
        }
    }
}

impl StateFile {
    /// Load the state file, or an empty state if it does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let state: StateFile = serde_json::from_str(&contents).map_err(|e| {
            ProviderError::State(format!("failed to parse {}: {e}", path.display()))
        })?;

        if state.version > STATE_VERSION {
            return Err(ProviderError::State(format!(
                "{} has format version {}, this build supports up to {STATE_VERSION}",
                path.display(),
                state.version
            )));
        }
        Ok(state)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)
            .map_err(|e| ProviderError::Serialization(format!("state: {e}")))?;
        write_atomic(path, &bytes)
    }

    pub fn get(&self, name: &str) -> Option<&SecretState> {
        self.resources.get(name)
    }

    /// Like `get`, but a missing entry is an error.
    pub fn require(&self, name: &str) -> Result<&SecretState> {
        self.get(name)
            .ok_or_else(|| ProviderError::UnmanagedResource(name.to_string()))
    }

    pub fn insert(&mut self, name: impl Into<String>, state: SecretState) {
        self.resources.insert(name.into(), state);
    }

    pub fn remove(&mut self, name: &str) -> Option<SecretState> {
        self.resources.remove(name)
    }
}

/// Write `bytes` to `path` through a uniquely named temp file in the same
/// directory and a rename, creating parent directories as needed. On Unix
/// the temp file is created with mode 0600, so the content is never
/// readable by other users.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let tmp_path = parent.join(format!(
        ".{}.{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id(),
        Uuid::new_v4().simple()
    ));

    let written = create_private(&tmp_path).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|()| fs::rename(&tmp_path, path)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(unix)]
fn create_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new().write(true).create_new(true).open(path)
}
