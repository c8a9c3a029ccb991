use thiserror::Error;

/// All errors that can occur in the provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    // --- Provider configuration errors ---
    #[error("Missing {attribute}: set `{attribute}` in the configuration or the {env_var} environment variable")]
    MissingConfiguration {
        attribute: &'static str,
        env_var: &'static str,
    },

    #[error("Invalid {attribute}: '{value}' is not a valid UUID")]
    InvalidUuid { attribute: &'static str, value: String },

    #[error("Provider configuration failed: {}", join_errors(.0))]
    Configuration(Vec<ProviderError>),

    #[error("Settings file error: {0}")]
    Settings(String),

    // --- Generator errors ---
    #[error("Invalid generator constraint: {0}")]
    InvalidConstraint(String),

    // --- Resource errors ---
    #[error("Invalid {attribute}: {reason}")]
    InvalidAttribute {
        attribute: &'static str,
        reason: String,
    },

    // --- Store errors ---
    #[error("Unable to {operation}: {message}")]
    StoreOperationFailed { operation: String, message: String },

    #[error("{kind} '{id}' not found")]
    ResourceNotFound { kind: &'static str, id: String },

    #[error("Crypto error: {0}")]
    Crypto(String),

    // --- State errors ---
    #[error("State file error: {0}")]
    State(String),

    #[error("Resource '{0}' is not managed in this state file")]
    UnmanagedResource(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl ProviderError {
    /// Shorthand for a failed call against the secret store.
    pub fn store(operation: impl Into<String>, message: impl ToString) -> Self {
        Self::StoreOperationFailed {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// Returns `true` when the remote object no longer exists.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound { .. })
    }

    /// The individual failures behind a configuration error.
    ///
    /// Any other error is reported as a single-element slice.
    pub fn issues(&self) -> &[ProviderError] {
        match self {
            Self::Configuration(errors) => errors,
            other => std::slice::from_ref(other),
        }
    }
}

fn join_errors(errors: &[ProviderError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience type alias for provider results.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_lists_every_issue() {
        let err = ProviderError::Configuration(vec![
            ProviderError::MissingConfiguration {
                attribute: "api_url",
                env_var: "BW_API_URL",
            },
            ProviderError::MissingConfiguration {
                attribute: "access_token",
                env_var: "BW_ACCESS_TOKEN",
            },
        ]);

        let msg = err.to_string();
        assert!(msg.contains("BW_API_URL"));
        assert!(msg.contains("BW_ACCESS_TOKEN"));
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn single_error_is_its_own_issue() {
        let err = ProviderError::InvalidConstraint("length".into());
        assert_eq!(err.issues().len(), 1);
    }

    #[test]
    fn store_shorthand_formats_operation() {
        let err = ProviderError::store("create secret", "HTTP 400");
        assert_eq!(err.to_string(), "Unable to create secret: HTTP 400");
        assert!(!err.is_not_found());
    }
}
