//! Secret store: the remote system secrets and projects live in.
//!
//! This module provides:
//! - The `SecretStore` capability trait consumed by resources and data sources
//! - `StoreFactory`, which builds one store client per resource object
//! - An in-memory store (`memory`), a JSON-file store (`local`) and the
//!   native Bitwarden Secrets Manager HTTP store (`bitwarden`)

pub mod bitwarden;
pub mod local;
pub mod memory;

use uuid::Uuid;

use crate::config::ProviderConfig;
use crate::errors::Result;
use crate::secret::generator::{self, GeneratorConfig};
use crate::secret::{DeleteOutcome, ProjectRecord, SecretIdentifier, SecretInput, SecretRecord};

// Re-export the most commonly used items.
pub use bitwarden::{BitwardenStore, BitwardenStoreFactory};
pub use local::{LocalStore, LocalStoreFactory};
pub use memory::MemoryStore;

/// Operations the provider needs from a secret store.
///
/// Implementations must be safe to use from several threads, but the
/// provider never shares one client between resource objects: every
/// resource and data source gets its own from a `StoreFactory`.
///
/// Implementations must not log secret values.
pub trait SecretStore: Send + Sync {
    fn create_secret(&self, input: &SecretInput) -> Result<SecretRecord>;

    /// Fetch one secret, or `ResourceNotFound` if it no longer exists.
    fn get_secret(&self, id: Uuid) -> Result<SecretRecord>;

    fn update_secret(&self, id: Uuid, input: &SecretInput) -> Result<SecretRecord>;

    /// Delete secrets in bulk; per-item failures are reported, not raised.
    fn delete_secrets(&self, ids: &[Uuid]) -> Result<Vec<DeleteOutcome>>;

    fn list_secrets(&self, organization_id: Uuid) -> Result<Vec<SecretIdentifier>>;

    fn create_project(&self, organization_id: Uuid, name: &str) -> Result<ProjectRecord>;

    fn get_project(&self, id: Uuid) -> Result<ProjectRecord>;

    fn update_project(&self, id: Uuid, organization_id: Uuid, name: &str)
        -> Result<ProjectRecord>;

    fn delete_projects(&self, ids: &[Uuid]) -> Result<Vec<DeleteOutcome>>;

    fn list_projects(&self, organization_id: Uuid) -> Result<Vec<ProjectRecord>>;

    /// Generate a secret value.
    ///
    /// Stores without native generation use the local generator.
    fn generate_password(&self, config: &GeneratorConfig) -> Result<String> {
        generator::generate(config)
    }
}

/// Builds a fresh store client for one resource or data-source object.
pub trait StoreFactory: Send + Sync {
    fn connect(&self, config: &ProviderConfig) -> Result<Box<dyn SecretStore>>;
}
