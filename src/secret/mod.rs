//! Secret data model, value generation and reconciliation.
//!
//! This module provides:
//! - The records exchanged with the secret store (`record`)
//! - The constrained value generator (`generator`)
//! - Persisted resource state (`state`)
//! - The create/update value policy (`reconcile`)

pub mod generator;
pub mod reconcile;
pub mod record;
pub mod state;

// Re-export the most commonly used types.
pub use generator::{CharClass, GeneratorConfig};
pub use reconcile::{DesiredState, Reconciled, ValueSource};
pub use record::{DeleteOutcome, ProjectRecord, SecretIdentifier, SecretInput, SecretRecord};
pub use state::SecretState;
