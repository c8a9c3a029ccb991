//! Persisted state of a managed secret.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::generator::GeneratorConfig;
use super::record::SecretRecord;

/// Everything the store returned for a secret, plus the generator
/// configuration that was in effect when it was last planned.
///
/// The generator configuration only lives here; it is never sent to the
/// store. Update compares it against the next plan to decide whether a
/// fresh value is needed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretState {
    pub id: Uuid,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    pub organization_id: Uuid,
    pub creation_date: DateTime<Utc>,
    pub revision_date: DateTime<Utc>,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl SecretState {
    pub fn from_record(record: SecretRecord, generator: GeneratorConfig) -> Self {
        Self {
            id: record.id,
            key: record.key,
            value: record.value,
            note: record.note,
            project_id: record.project_id,
            organization_id: record.organization_id,
            creation_date: record.creation_date,
            revision_date: record.revision_date,
            generator,
        }
    }

    /// Overwrite every store-owned field, keeping the generator config.
    pub fn refreshed(&self, record: SecretRecord) -> Self {
        Self::from_record(record, self.generator)
    }
}

impl fmt::Debug for SecretState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretState")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("value", &"[redacted]")
            .field("note", &self.note)
            .field("project_id", &self.project_id)
            .field("organization_id", &self.organization_id)
            .field("revision_date", &self.revision_date)
            .field("generator", &self.generator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: &str) -> SecretRecord {
        let now = Utc::now();
        SecretRecord {
            id: Uuid::new_v4(),
            key: "TOKEN".into(),
            value: value.into(),
            note: "ci".into(),
            project_id: None,
            organization_id: Uuid::new_v4(),
            creation_date: now,
            revision_date: now,
        }
    }

    #[test]
    fn refresh_keeps_generator_config() {
        let generator = GeneratorConfig {
            length: 20,
            special: true,
            ..GeneratorConfig::default()
        };
        let state = SecretState::from_record(record("old"), generator);
        let refreshed = state.refreshed(record("rotated"));
        assert_eq!(refreshed.value, "rotated");
        assert_eq!(refreshed.generator, generator);
    }

    #[test]
    fn debug_output_redacts_value() {
        let state = SecretState::from_record(record("s3cr3t"), GeneratorConfig::default());
        assert!(!format!("{state:?}").contains("s3cr3t"));
    }
}
