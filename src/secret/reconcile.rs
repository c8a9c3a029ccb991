//! Value reconciliation for the secret resource.
//!
//! Decides, for create and update, which value is sent to the store:
//!
//! - an explicit value in the desired configuration always wins
//! - on create without one, a value is generated
//! - on update without one, a value is generated only when the generator
//!   configuration differs from the prior state; otherwise the prior value
//!   is reused verbatim, so values rotated outside the provider survive
//!
//! Other attributes (`key`, `note`, `project_id`) fall back to the prior
//! state when the desired configuration leaves them empty.

use std::fmt;

use tracing::debug;
use uuid::Uuid;

use crate::errors::{ProviderError, Result};
use crate::store::SecretStore;

use super::generator::GeneratorConfig;
use super::record::SecretInput;
use super::state::SecretState;

/// What the user declared for one secret resource.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct DesiredState {
    pub key: String,
    pub value: Option<String>,
    pub note: Option<String>,
    pub project_id: Option<Uuid>,
    pub generator: GeneratorConfig,
}

impl fmt::Debug for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesiredState")
            .field("key", &self.key)
            .field("value", &self.value.as_ref().map(|_| "[redacted]"))
            .field("note", &self.note)
            .field("project_id", &self.project_id)
            .field("generator", &self.generator)
            .finish()
    }
}

impl DesiredState {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_project_id(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }

    /// Treat empty strings as "not supplied".
    pub fn normalized(mut self) -> Self {
        self.value = self.value.filter(|v| !v.is_empty());
        self.note = self.note.filter(|n| !n.is_empty());
        self
    }

    /// The explicit value, if one was supplied and is non-empty.
    pub fn explicit_value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }

    pub fn explicit_note(&self) -> Option<&str> {
        self.note.as_deref().filter(|n| !n.is_empty())
    }

    /// Check the generator constraints. Runs before any store call,
    /// whether or not a value will actually be generated.
    pub fn validate(&self) -> Result<()> {
        self.generator.validate()
    }
}

/// Where the value sent to the store came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Supplied in the desired configuration.
    Explicit,
    /// Freshly generated.
    Generated,
    /// Carried over from the prior state.
    Preserved,
}

/// The store request produced by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub input: SecretInput,
    pub source: ValueSource,
}

/// `true` when the generator configuration changed since the prior state.
pub fn generator_changed(desired: &DesiredState, prior: &SecretState) -> bool {
    desired.generator != prior.generator
}

/// Build the create request for `desired`.
pub fn reconcile_create(
    desired: &DesiredState,
    organization_id: Uuid,
    store: &dyn SecretStore,
) -> Result<Reconciled> {
    desired.validate()?;
    if desired.key.is_empty() {
        return Err(ProviderError::InvalidAttribute {
            attribute: "key",
            reason: "must not be empty".into(),
        });
    }

    let (value, source) = match desired.explicit_value() {
        Some(value) => (value.to_string(), ValueSource::Explicit),
        None => (
            store.generate_password(&desired.generator)?,
            ValueSource::Generated,
        ),
    };
    debug!(key = %desired.key, source = ?source, "resolved value for create");

    Ok(Reconciled {
        input: SecretInput {
            key: desired.key.clone(),
            value,
            note: desired.explicit_note().unwrap_or_default().to_string(),
            organization_id,
            project_ids: desired.project_id.into_iter().collect(),
        },
        source,
    })
}

/// Build the update request for `desired` against `prior`.
pub fn reconcile_update(
    desired: &DesiredState,
    prior: &SecretState,
    store: &dyn SecretStore,
) -> Result<Reconciled> {
    desired.validate()?;

    let (value, source) = match desired.explicit_value() {
        Some(value) => (value.to_string(), ValueSource::Explicit),
        None if generator_changed(desired, prior) => (
            store.generate_password(&desired.generator)?,
            ValueSource::Generated,
        ),
        None => (prior.value.clone(), ValueSource::Preserved),
    };
    debug!(id = %prior.id, source = ?source, "resolved value for update");

    let key = if desired.key.is_empty() {
        prior.key.clone()
    } else {
        desired.key.clone()
    };
    let note = desired
        .explicit_note()
        .map(str::to_string)
        .unwrap_or_else(|| prior.note.clone());
    let project_id = desired.project_id.or(prior.project_id);

    Ok(Reconciled {
        input: SecretInput {
            key,
            value,
            note,
            organization_id: prior.organization_id,
            project_ids: project_id.into_iter().collect(),
        },
        source,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::secret::record::SecretRecord;
    use crate::store::MemoryStore;

    fn prior(value: &str, generator: GeneratorConfig) -> SecretState {
        let now = Utc::now();
        SecretState::from_record(
            SecretRecord {
                id: Uuid::new_v4(),
                key: "DB_PASSWORD".into(),
                value: value.into(),
                note: "primary".into(),
                project_id: Some(Uuid::new_v4()),
                organization_id: Uuid::new_v4(),
                creation_date: now,
                revision_date: now,
            },
            generator,
        )
    }

    #[test]
    fn normalized_drops_empty_strings() {
        let desired = DesiredState::new("K").with_value("").with_note("").normalized();
        assert_eq!(desired.value, None);
        assert_eq!(desired.note, None);
    }

    #[test]
    fn create_prefers_explicit_value() {
        let store = MemoryStore::new();
        let desired = DesiredState::new("K").with_value("abc123");
        let out = reconcile_create(&desired, Uuid::new_v4(), &store).unwrap();
        assert_eq!(out.input.value, "abc123");
        assert_eq!(out.source, ValueSource::Explicit);
    }

    #[test]
    fn create_generates_when_value_absent() {
        let store = MemoryStore::new();
        let desired = DesiredState::new("K");
        let out = reconcile_create(&desired, Uuid::new_v4(), &store).unwrap();
        assert_eq!(out.input.value.len(), 64);
        assert_eq!(out.source, ValueSource::Generated);
        assert!(out.input.project_ids.is_empty());
    }

    #[test]
    fn create_rejects_empty_key() {
        let store = MemoryStore::new();
        let err = reconcile_create(&DesiredState::new(""), Uuid::new_v4(), &store).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidAttribute { attribute: "key", .. }));
    }

    #[test]
    fn update_preserves_value_when_generator_unchanged() {
        let store = MemoryStore::new();
        let prior = prior("rotated-out-of-band", GeneratorConfig::default());
        let out = reconcile_update(&DesiredState::new("DB_PASSWORD"), &prior, &store).unwrap();
        assert_eq!(out.input.value, "rotated-out-of-band");
        assert_eq!(out.source, ValueSource::Preserved);
    }

    #[test]
    fn update_regenerates_when_generator_changes() {
        let store = MemoryStore::new();
        let prior = prior("old", GeneratorConfig::default());
        let desired = DesiredState::new("DB_PASSWORD").with_generator(GeneratorConfig {
            length: 16,
            ..GeneratorConfig::default()
        });
        let out = reconcile_update(&desired, &prior, &store).unwrap();
        assert_eq!(out.source, ValueSource::Generated);
        assert_eq!(out.input.value.len(), 16);
    }

    #[test]
    fn update_falls_back_to_prior_attributes() {
        let store = MemoryStore::new();
        let prior = prior("v", GeneratorConfig::default());
        let out = reconcile_update(&DesiredState::new(""), &prior, &store).unwrap();
        assert_eq!(out.input.key, prior.key);
        assert_eq!(out.input.note, prior.note);
        assert_eq!(out.input.project_ids, prior.project_id.into_iter().collect::<Vec<_>>());
        assert_eq!(out.input.organization_id, prior.organization_id);
    }

    #[test]
    fn invalid_generator_is_rejected_even_with_explicit_value() {
        let store = MemoryStore::new();
        let desired = DesiredState::new("K")
            .with_value("explicit")
            .with_generator(GeneratorConfig {
                length: 2,
                ..GeneratorConfig::default()
            });
        assert!(matches!(
            reconcile_create(&desired, Uuid::new_v4(), &store),
            Err(ProviderError::InvalidConstraint(_))
        ));
    }
}
