//! Read-only data sources.
//!
//! Each data source owns its own store client. Unlike the resource's
//! `read`, a missing object here is an error (`ResourceNotFound`).

use tracing::debug;
use uuid::Uuid;

use crate::config::ProviderConfig;
use crate::errors::{ProviderError, Result};
use crate::secret::{ProjectRecord, SecretIdentifier, SecretRecord};
use crate::store::SecretStore;

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ProviderError::InvalidUuid {
        attribute: "id",
        value: raw.to_string(),
    })
}

/// `bitwarden-sm_list_secrets`: id and key of every accessible secret.
pub struct ListSecretsDataSource {
    store: Box<dyn SecretStore>,
    organization_id: Uuid,
}

impl ListSecretsDataSource {
    pub const TYPE_NAME: &'static str = "bitwarden-sm_list_secrets";

    pub fn new(store: Box<dyn SecretStore>, config: &ProviderConfig) -> Self {
        Self {
            store,
            organization_id: config.organization_id,
        }
    }

    pub fn read(&self) -> Result<Vec<SecretIdentifier>> {
        let secrets = self.store.list_secrets(self.organization_id)?;
        debug!(count = secrets.len(), "listed secrets");
        Ok(secrets)
    }
}

/// `bitwarden-sm_secret`: one secret by id, including its value.
pub struct SecretDataSource {
    store: Box<dyn SecretStore>,
}

impl SecretDataSource {
    pub const TYPE_NAME: &'static str = "bitwarden-sm_secret";

    pub fn new(store: Box<dyn SecretStore>) -> Self {
        Self { store }
    }

    pub fn read(&self, id: &str) -> Result<SecretRecord> {
        let id = parse_id(id)?;
        let record = self.store.get_secret(id)?;
        debug!(%id, "read secret data source");
        Ok(record)
    }
}

/// `bitwarden-sm_projects`: every accessible project.
pub struct ProjectsDataSource {
    store: Box<dyn SecretStore>,
    organization_id: Uuid,
}

impl ProjectsDataSource {
    pub const TYPE_NAME: &'static str = "bitwarden-sm_projects";

    pub fn new(store: Box<dyn SecretStore>, config: &ProviderConfig) -> Self {
        Self {
            store,
            organization_id: config.organization_id,
        }
    }

    pub fn read(&self) -> Result<Vec<ProjectRecord>> {
        let projects = self.store.list_projects(self.organization_id)?;
        debug!(count = projects.len(), "listed projects");
        Ok(projects)
    }
}

/// `bitwarden-sm_project`: one project by id.
pub struct ProjectDataSource {
    store: Box<dyn SecretStore>,
}

impl ProjectDataSource {
    pub const TYPE_NAME: &'static str = "bitwarden-sm_project";

    pub fn new(store: Box<dyn SecretStore>) -> Self {
        Self { store }
    }

    pub fn read(&self, id: &str) -> Result<ProjectRecord> {
        let id = parse_id(id)?;
        self.store.get_project(id)
    }
}
