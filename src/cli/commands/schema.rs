//! `bwsm schema`: print the provider schema as JSON.

use crate::errors::{ProviderError, Result};
use crate::provider::schema::provider_schema;

/// Execute the `schema` command.
pub fn execute() -> Result<()> {
    let json = serde_json::to_string_pretty(&provider_schema())
        .map_err(|e| ProviderError::Serialization(format!("schema: {e}")))?;
    println!("{json}");
    Ok(())
}
