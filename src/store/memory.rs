//! In-memory secret store.
//!
//! `MemoryStore` keeps secrets and projects in a `StoreData` behind an
//! `Arc<Mutex<_>>`, so clones share the same data. `StoreData` holds the
//! actual store semantics and is reused by the file-backed `LocalStore`.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ProviderConfig;
use crate::errors::{ProviderError, Result};
use crate::secret::{DeleteOutcome, ProjectRecord, SecretIdentifier, SecretInput, SecretRecord};

use super::{SecretStore, StoreFactory};

/// Secrets and projects keyed by id.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub secrets: BTreeMap<Uuid, SecretRecord>,
    #[serde(default)]
    pub projects: BTreeMap<Uuid, ProjectRecord>,
}

impl StoreData {
    pub fn create_secret(&mut self, input: &SecretInput) -> Result<SecretRecord> {
        let project_id = self.check_project_reference("create secret", input)?;
        let now = Utc::now();
        let record = SecretRecord {
            id: Uuid::new_v4(),
            key: input.key.clone(),
            value: input.value.clone(),
            note: input.note.clone(),
            project_id,
            organization_id: input.organization_id,
            creation_date: now,
            revision_date: now,
        };
        self.secrets.insert(record.id, record.clone());
        Ok(record)
    }

    pub fn get_secret(&self, id: Uuid) -> Result<SecretRecord> {
        self.secrets
            .get(&id)
            .cloned()
            .ok_or_else(|| ProviderError::ResourceNotFound {
                kind: "Secret",
                id: id.to_string(),
            })
    }

    pub fn update_secret(&mut self, id: Uuid, input: &SecretInput) -> Result<SecretRecord> {
        let project_id = self.check_project_reference("update secret", input)?;
        let record = self
            .secrets
            .get_mut(&id)
            .ok_or_else(|| ProviderError::ResourceNotFound {
                kind: "Secret",
                id: id.to_string(),
            })?;

        if record.organization_id != input.organization_id {
            return Err(ProviderError::store(
                "update secret",
                "a secret cannot be moved to another organization",
            ));
        }

        record.key = input.key.clone();
        record.value = input.value.clone();
        record.note = input.note.clone();
        record.project_id = project_id;
        record.revision_date = Utc::now();
        Ok(record.clone())
    }

    pub fn delete_secrets(&mut self, ids: &[Uuid]) -> Vec<DeleteOutcome> {
        ids.iter()
            .map(|id| DeleteOutcome {
                id: *id,
                error: match self.secrets.remove(id) {
                    Some(_) => None,
                    None => Some("Secret not found".to_string()),
                },
            })
            .collect()
    }

    pub fn list_secrets(&self, organization_id: Uuid) -> Vec<SecretIdentifier> {
        self.secrets
            .values()
            .filter(|s| s.organization_id == organization_id)
            .map(SecretIdentifier::from)
            .collect()
    }

    pub fn create_project(&mut self, organization_id: Uuid, name: &str) -> ProjectRecord {
        let now = Utc::now();
        let project = ProjectRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            organization_id,
            creation_date: now,
            revision_date: now,
        };
        self.projects.insert(project.id, project.clone());
        project
    }

    pub fn get_project(&self, id: Uuid) -> Result<ProjectRecord> {
        self.projects
            .get(&id)
            .cloned()
            .ok_or_else(|| ProviderError::ResourceNotFound {
                kind: "Project",
                id: id.to_string(),
            })
    }

    pub fn update_project(
        &mut self,
        id: Uuid,
        organization_id: Uuid,
        name: &str,
    ) -> Result<ProjectRecord> {
        let project = self
            .projects
            .get_mut(&id)
            .ok_or_else(|| ProviderError::ResourceNotFound {
                kind: "Project",
                id: id.to_string(),
            })?;
        if project.organization_id != organization_id {
            return Err(ProviderError::store(
                "update project",
                "a project cannot be moved to another organization",
            ));
        }
        project.name = name.to_string();
        project.revision_date = Utc::now();
        Ok(project.clone())
    }

    /// Delete projects; secrets that referenced them become unassigned.
    pub fn delete_projects(&mut self, ids: &[Uuid]) -> Vec<DeleteOutcome> {
        let outcomes: Vec<DeleteOutcome> = ids
            .iter()
            .map(|id| DeleteOutcome {
                id: *id,
                error: match self.projects.remove(id) {
                    Some(_) => None,
                    None => Some("Project not found".to_string()),
                },
            })
            .collect();

        for secret in self.secrets.values_mut() {
            if secret.project_id.is_some_and(|p| ids.contains(&p)) {
                secret.project_id = None;
            }
        }
        outcomes
    }

    pub fn list_projects(&self, organization_id: Uuid) -> Vec<ProjectRecord> {
        self.projects
            .values()
            .filter(|p| p.organization_id == organization_id)
            .cloned()
            .collect()
    }

    /// A secret belongs to at most one project, in its own organization.
    fn check_project_reference(&self, operation: &str, input: &SecretInput) -> Result<Option<Uuid>> {
        match input.project_ids.as_slice() {
            [] => Ok(None),
            [id] => match self.projects.get(id) {
                Some(p) if p.organization_id == input.organization_id => Ok(Some(*id)),
                Some(_) => Err(ProviderError::store(
                    operation,
                    format!("project {id} belongs to another organization"),
                )),
                None => Err(ProviderError::store(
                    operation,
                    format!("project {id} does not exist or is not accessible"),
                )),
            },
            _ => Err(ProviderError::store(
                operation,
                "a secret can belong to at most one project",
            )),
        }
    }
}

/// Thread-safe in-memory store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<StoreData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything currently stored.
    pub fn snapshot(&self) -> Result<StoreData> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreData>> {
        self.data
            .lock()
            .map_err(|_| ProviderError::store("access memory store", "lock poisoned"))
    }
}

impl SecretStore for MemoryStore {
    fn create_secret(&self, input: &SecretInput) -> Result<SecretRecord> {
        self.lock()?.create_secret(input)
    }

    fn get_secret(&self, id: Uuid) -> Result<SecretRecord> {
        self.lock()?.get_secret(id)
    }

    fn update_secret(&self, id: Uuid, input: &SecretInput) -> Result<SecretRecord> {
        self.lock()?.update_secret(id, input)
    }

    fn delete_secrets(&self, ids: &[Uuid]) -> Result<Vec<DeleteOutcome>> {
        Ok(self.lock()?.delete_secrets(ids))
    }

    fn list_secrets(&self, organization_id: Uuid) -> Result<Vec<SecretIdentifier>> {
        Ok(self.lock()?.list_secrets(organization_id))
    }

    fn create_project(&self, organization_id: Uuid, name: &str) -> Result<ProjectRecord> {
        Ok(self.lock()?.create_project(organization_id, name))
    }

    fn get_project(&self, id: Uuid) -> Result<ProjectRecord> {
        self.lock()?.get_project(id)
    }

    fn update_project(
        &self,
        id: Uuid,
        organization_id: Uuid,
        name: &str,
    ) -> Result<ProjectRecord> {
        self.lock()?.update_project(id, organization_id, name)
    }

    fn delete_projects(&self, ids: &[Uuid]) -> Result<Vec<DeleteOutcome>> {
        Ok(self.lock()?.delete_projects(ids))
    }

    fn list_projects(&self, organization_id: Uuid) -> Result<Vec<ProjectRecord>> {
        Ok(self.lock()?.list_projects(organization_id))
    }
}

/// Hands out clones, so every client sees the same data.
impl StoreFactory for MemoryStore {
    fn connect(&self, _config: &ProviderConfig) -> Result<Box<dyn SecretStore>> {
        Ok(Box::new(self.clone()))
    }
}
