//! File-backed secret store.
//!
//! Same semantics as `MemoryStore`, but every operation loads the JSON
//! file, applies the change and writes it back atomically. Used for
//! offline work and by the CLI integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;
use uuid::Uuid;

use crate::config::ProviderConfig;
use crate::errors::{ProviderError, Result};
use crate::secret::{DeleteOutcome, ProjectRecord, SecretIdentifier, SecretInput, SecretRecord};
use crate::state::write_atomic;

use super::memory::StoreData;
use super::{SecretStore, StoreFactory};

/// Serialises file access across every `LocalStore` in the process.
static FILE_LOCK: Mutex<()> = Mutex::new(());

#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoreData> {
        if !self.path.exists() {
            return Ok(StoreData::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        serde_json::from_str(&contents).map_err(|e| {
            ProviderError::store(
                "read local store",
                format!("{} is not a valid store file: {e}", self.path.display()),
            )
        })
    }

    fn write(&self, data: &StoreData) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(data)
            .map_err(|e| ProviderError::Serialization(format!("local store: {e}")))?;
        write_atomic(&self.path, &bytes)
    }

    /// Run `f` against the current data without writing it back.
    fn view<T>(&self, f: impl FnOnce(&StoreData) -> Result<T>) -> Result<T> {
        let _guard = FILE_LOCK
            .lock()
            .map_err(|_| ProviderError::store("access local store", "lock poisoned"))?;
        f(&self.read()?)
    }

    /// Run `f` against the current data and persist the result.
    fn modify<T>(&self, f: impl FnOnce(&mut StoreData) -> Result<T>) -> Result<T> {
        let _guard = FILE_LOCK
            .lock()
            .map_err(|_| ProviderError::store("access local store", "lock poisoned"))?;
        let mut data = self.read()?;
        let out = f(&mut data)?;
        self.write(&data)?;
        debug!(path = %self.path.display(), "local store updated");
        Ok(out)
    }
}

impl SecretStore for LocalStore {
    fn create_secret(&self, input: &SecretInput) -> Result<SecretRecord> {
        self.modify(|data| data.create_secret(input))
    }

    fn get_secret(&self, id: Uuid) -> Result<SecretRecord> {
        self.view(|data| data.get_secret(id))
    }

    fn update_secret(&self, id: Uuid, input: &SecretInput) -> Result<SecretRecord> {
        self.modify(|data| data.update_secret(id, input))
    }

    fn delete_secrets(&self, ids: &[Uuid]) -> Result<Vec<DeleteOutcome>> {
        self.modify(|data| Ok(data.delete_secrets(ids)))
    }

    fn list_secrets(&self, organization_id: Uuid) -> Result<Vec<SecretIdentifier>> {
        self.view(|data| Ok(data.list_secrets(organization_id)))
    }

    fn create_project(&self, organization_id: Uuid, name: &str) -> Result<ProjectRecord> {
        self.modify(|data| Ok(data.create_project(organization_id, name)))
    }

    fn get_project(&self, id: Uuid) -> Result<ProjectRecord> {
        self.view(|data| data.get_project(id))
    }

    fn update_project(
        &self,
        id: Uuid,
        organization_id: Uuid,
        name: &str,
    ) -> Result<ProjectRecord> {
        self.modify(|data| data.update_project(id, organization_id, name))
    }

    fn delete_projects(&self, ids: &[Uuid]) -> Result<Vec<DeleteOutcome>> {
        self.modify(|data| Ok(data.delete_projects(ids)))
    }

    fn list_projects(&self, organization_id: Uuid) -> Result<Vec<ProjectRecord>> {
        self.view(|data| Ok(data.list_projects(organization_id)))
    }
}

/// Opens a new `LocalStore` on the same file for every client.
#[derive(Debug, Clone)]
pub struct LocalStoreFactory {
    path: PathBuf,
}

impl LocalStoreFactory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StoreFactory for LocalStoreFactory {
    fn connect(&self, _config: &ProviderConfig) -> Result<Box<dyn SecretStore>> {
        Ok(Box::new(LocalStore::new(self.path.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn input(org: Uuid) -> SecretInput {
        SecretInput {
            key: "K".into(),
            value: "v".into(),
            note: String::new(),
            organization_id: org,
            project_ids: vec![],
        }
    }

    #[test]
    fn data_survives_reopening() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        let org = Uuid::new_v4();

        let created = LocalStore::new(&path).create_secret(&input(org)).unwrap();
        let reopened = LocalStore::new(&path);
        assert_eq!(reopened.get_secret(created.id).unwrap(), created);
        assert_eq!(reopened.list_secrets(org).unwrap().len(), 1);
    }

    #[test]
    fn failed_operation_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        let store = LocalStore::new(&path);

        let err = store.update_secret(Uuid::new_v4(), &input(Uuid::new_v4()));
        assert!(err.unwrap_err().is_not_found());
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_file_is_a_store_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        fs::write(&path, "not json").unwrap();
        let err = LocalStore::new(&path).list_projects(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, ProviderError::StoreOperationFailed { .. }));
    }
}
