//! The `bitwarden-sm_secret` resource.
//!
//! Lifecycle:
//! - `plan`: diff desired configuration against the prior state
//! - `create` / `update`: reconcile the value, call the store, echo the
//!   generator configuration into the new state
//! - `read`: refresh from the store; a vanished secret yields `None`
//! - `delete`: bulk-delete a single id and surface per-item errors
//! - `import`: adopt an existing secret by id

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ProviderConfig;
use crate::errors::{ProviderError, Result};
use crate::secret::reconcile::{self, ValueSource};
use crate::secret::{DesiredState, GeneratorConfig, SecretState};
use crate::store::SecretStore;

use super::plan::{Plan, PlannedAction};

pub struct SecretResource {
    store: Box<dyn SecretStore>,
    organization_id: Uuid,
}

/// Result of `SecretResource::apply`.
#[derive(Debug, Clone)]
pub struct Applied {
    pub plan: Plan,
    pub state: SecretState,
    /// `None` when nothing was sent to the store.
    pub value_source: Option<ValueSource>,
}

impl SecretResource {
    pub const TYPE_NAME: &'static str = "bitwarden-sm_secret";

    pub fn new(store: Box<dyn SecretStore>, config: &ProviderConfig) -> Self {
        Self {
            store,
            organization_id: config.organization_id,
        }
    }

    pub fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    /// Compute the change set without touching the store.
    pub fn plan(&self, desired: &DesiredState, prior: Option<&SecretState>) -> Result<Plan> {
        desired.validate()?;
        Ok(match prior {
            None => Plan::create(desired),
            Some(prior) => Plan::diff(desired, prior),
        })
    }

    pub fn create(&self, desired: &DesiredState) -> Result<SecretState> {
        Ok(self.create_reporting(desired)?.0)
    }

    fn create_reporting(&self, desired: &DesiredState) -> Result<(SecretState, ValueSource)> {
        let reconciled =
            reconcile::reconcile_create(desired, self.organization_id, self.store.as_ref())?;
        let record = self.store.create_secret(&reconciled.input)?;
        info!(id = %record.id, key = %record.key, "created secret");
        Ok((
            SecretState::from_record(record, desired.generator),
            reconciled.source,
        ))
    }

    /// Refresh `prior` from the store.
    ///
    /// Returns `Ok(None)` when the secret no longer exists, so the caller
    /// can drop it from state.
    pub fn read(&self, prior: &SecretState) -> Result<Option<SecretState>> {
        match self.store.get_secret(prior.id) {
            Ok(record) => {
                debug!(id = %prior.id, "read secret");
                Ok(Some(prior.refreshed(record)))
            }
            Err(e) if e.is_not_found() => {
                warn!(id = %prior.id, "secret no longer exists, removing from state");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn update(&self, desired: &DesiredState, prior: &SecretState) -> Result<SecretState> {
        Ok(self.update_reporting(desired, prior)?.0)
    }

    fn update_reporting(
        &self,
        desired: &DesiredState,
        prior: &SecretState,
    ) -> Result<(SecretState, ValueSource)> {
        let reconciled = reconcile::reconcile_update(desired, prior, self.store.as_ref())?;
        let record = self.store.update_secret(prior.id, &reconciled.input)?;
        info!(id = %record.id, source = ?reconciled.source, "updated secret");
        Ok((
            SecretState::from_record(record, desired.generator),
            reconciled.source,
        ))
    }

    /// Delete the secret. A secret that is already gone yields
    /// `ResourceNotFound`; any other per-item failure, or a response that
    /// does not mention the id at all, is a store error.
    pub fn delete(&self, state: &SecretState) -> Result<()> {
        let outcome = self
            .store
            .delete_secrets(&[state.id])?
            .into_iter()
            .find(|o| o.id == state.id)
            .ok_or_else(|| {
                ProviderError::store("delete secret", format!("no result reported for {}", state.id))
            })?;

        if let Some(error) = outcome.error {
            return match self.store.get_secret(state.id) {
                Err(e) if e.is_not_found() => Err(e),
                _ => Err(ProviderError::store("delete secret", error)),
            };
        }
        info!(id = %state.id, "deleted secret");
        Ok(())
    }

    /// Adopt an existing secret. The generator configuration is set to its
    /// defaults, so a default-configured resource plans no change.
    pub fn import(&self, id: &str) -> Result<SecretState> {
        let id = Uuid::parse_str(id.trim()).map_err(|_| ProviderError::InvalidUuid {
            attribute: "id",
            value: id.to_string(),
        })?;
        let record = self.store.get_secret(id)?;
        info!(%id, key = %record.key, "imported secret");
        Ok(SecretState::from_record(record, GeneratorConfig::default()))
    }

    /// Plan, then create or update as needed.
    pub fn apply(&self, desired: &DesiredState, prior: Option<&SecretState>) -> Result<Applied> {
        let plan = self.plan(desired, prior)?;
        let (state, value_source) = match (plan.action, prior) {
            (PlannedAction::NoOp, Some(prior)) => (prior.clone(), None),
            (PlannedAction::Update, Some(prior)) => {
                let (state, source) = self.update_reporting(desired, prior)?;
                (state, Some(source))
            }
            _ => {
                let (state, source) = self.create_reporting(desired)?;
                (state, Some(source))
            }
        };
        Ok(Applied {
            plan,
            state,
            value_source,
        })
    }
}
