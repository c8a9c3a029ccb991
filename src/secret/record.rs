//! Records returned by the secret store.
//!
//! `SecretRecord` carries the sensitive value, so its `Debug` output is
//! redacted. The list shapes (`SecretIdentifier`) never hold a value.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A secret as it exists in the remote store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    pub id: Uuid,
    /// Display name of the secret ("name" in the Secrets Manager UI).
    pub key: String,
    pub value: String,
    pub note: String,
    pub project_id: Option<Uuid>,
    pub organization_id: Uuid,
    pub creation_date: DateTime<Utc>,
    pub revision_date: DateTime<Utc>,
}

impl fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretRecord")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("value", &"[redacted]")
            .field("note", &self.note)
            .field("project_id", &self.project_id)
            .field("organization_id", &self.organization_id)
            .field("creation_date", &self.creation_date)
            .field("revision_date", &self.revision_date)
            .finish()
    }
}

/// A secret without its value, as returned by list operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretIdentifier {
    pub id: Uuid,
    pub key: String,
    pub organization_id: Uuid,
}

impl From<&SecretRecord> for SecretIdentifier {
    fn from(record: &SecretRecord) -> Self {
        Self {
            id: record.id,
            key: record.key.clone(),
            organization_id: record.organization_id,
        }
    }
}

/// A project grouping secrets inside an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: Uuid,
    pub name: String,
    pub organization_id: Uuid,
    pub creation_date: DateTime<Utc>,
    pub revision_date: DateTime<Utc>,
}

/// Fields sent to the store when creating or updating a secret.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretInput {
    pub key: String,
    pub value: String,
    pub note: String,
    pub organization_id: Uuid,
    pub project_ids: Vec<Uuid>,
}

impl fmt::Debug for SecretInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretInput")
            .field("key", &self.key)
            .field("value", &"[redacted]")
            .field("note", &self.note)
            .field("organization_id", &self.organization_id)
            .field("project_ids", &self.project_ids)
            .finish()
    }
}

/// Per-item result of a bulk delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub id: Uuid,
    /// Store-reported failure for this id, if any.
    pub error: Option<String>,
}
