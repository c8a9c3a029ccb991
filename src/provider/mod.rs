//! The `bitwarden-sm` provider.
//!
//! `Provider` resolves configuration into a `ConfiguredProvider`, which
//! hands out resources and data sources. Every object it hands out gets
//! its own store client from the `StoreFactory`, so clients are never
//! shared between objects.

pub mod data_sources;
pub mod plan;
pub mod schema;
pub mod secret_resource;

use std::sync::Arc;

use tracing::info;

use crate::config::{ProviderConfig, ProviderSettings};
use crate::errors::Result;
use crate::store::{SecretStore, StoreFactory};

pub use data_sources::{
    ListSecretsDataSource, ProjectDataSource, ProjectsDataSource, SecretDataSource,
};
pub use plan::{AttributeChange, Plan, PlannedAction};
pub use secret_resource::{Applied, SecretResource};

/// Provider type name; resource and data-source names are prefixed with it.
pub const PROVIDER_TYPE_NAME: &str = "bitwarden-sm";

/// An unconfigured provider.
pub struct Provider {
    version: String,
    factory: Arc<dyn StoreFactory>,
}

impl Provider {
    pub fn new(version: impl Into<String>, factory: Arc<dyn StoreFactory>) -> Self {
        Self {
            version: version.into(),
            factory,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Resolve `explicit` against the process environment.
    pub fn configure(&self, explicit: &ProviderSettings) -> Result<ConfiguredProvider> {
        self.configure_with(ProviderConfig::from_env(explicit)?)
    }

    /// Use an already resolved configuration.
    pub fn configure_with(&self, config: ProviderConfig) -> Result<ConfiguredProvider> {
        info!(version = %self.version, api_url = %config.api_url, "provider configured");
        Ok(ConfiguredProvider {
            config: Arc::new(config),
            factory: Arc::clone(&self.factory),
        })
    }
}

/// A configured provider. Cheap to clone and safe to share across threads.
#[derive(Clone)]
pub struct ConfiguredProvider {
    config: Arc<ProviderConfig>,
    factory: Arc<dyn StoreFactory>,
}

impl ConfiguredProvider {
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// A fresh store client for direct store operations.
    pub fn connect(&self) -> Result<Box<dyn SecretStore>> {
        self.factory.connect(&self.config)
    }

    pub fn secret_resource(&self) -> Result<SecretResource> {
        Ok(SecretResource::new(self.connect()?, &self.config))
    }

    pub fn list_secrets_data_source(&self) -> Result<ListSecretsDataSource> {
        Ok(ListSecretsDataSource::new(self.connect()?, &self.config))
    }

    pub fn secret_data_source(&self) -> Result<SecretDataSource> {
        Ok(SecretDataSource::new(self.connect()?))
    }

    pub fn projects_data_source(&self) -> Result<ProjectsDataSource> {
        Ok(ProjectsDataSource::new(self.connect()?, &self.config))
    }

    pub fn project_data_source(&self) -> Result<ProjectDataSource> {
        Ok(ProjectDataSource::new(self.connect()?))
    }
}

/// Names of the resources this provider declares.
pub fn resource_types() -> Vec<&'static str> {
    vec![SecretResource::TYPE_NAME]
}

/// Names of the data sources this provider declares.
pub fn data_source_types() -> Vec<&'static str> {
    vec![
        ListSecretsDataSource::TYPE_NAME,
        SecretDataSource::TYPE_NAME,
        ProjectsDataSource::TYPE_NAME,
        ProjectDataSource::TYPE_NAME,
    ]
}
