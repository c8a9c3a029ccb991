//! Provider configuration.
//!
//! Four attributes, each resolved from an explicit value first and an
//! environment variable second:
//!
//! | attribute         | environment variable   |
//! |-------------------|------------------------|
//! | `api_url`         | `BW_API_URL`           |
//! | `identity_url`    | `BW_IDENTITY_API_URL`  |
//! | `access_token`    | `BW_ACCESS_TOKEN`      |
//! | `organization_id` | `BW_ORGANIZATION_ID`   |
//!
//! Every missing or malformed attribute is reported, not just the first.

use std::fmt;

use tracing::debug;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::errors::{ProviderError, Result};

pub const ENV_API_URL: &str = "BW_API_URL";
pub const ENV_IDENTITY_URL: &str = "BW_IDENTITY_API_URL";
pub const ENV_ACCESS_TOKEN: &str = "BW_ACCESS_TOKEN";
pub const ENV_ORGANIZATION_ID: &str = "BW_ORGANIZATION_ID";

/// Explicitly supplied provider attributes, any of which may be absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub api_url: Option<String>,
    pub identity_url: Option<String>,
    pub access_token: Option<String>,
    pub organization_id: Option<String>,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_url", &self.api_url)
            .field("identity_url", &self.identity_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "[redacted]"))
            .field("organization_id", &self.organization_id.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Validated provider configuration shared by every resource and data source.
#[derive(Clone)]
pub struct ProviderConfig {
    pub api_url: String,
    pub identity_url: String,
    pub access_token: Zeroizing<String>,
    pub organization_id: Uuid,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_url", &self.api_url)
            .field("identity_url", &self.identity_url)
            .field("access_token", &"[redacted]")
            .field("organization_id", &"[redacted]")
            .finish()
    }
}

impl ProviderConfig {
    /// Resolve against the process environment.
    pub fn from_env(explicit: &ProviderSettings) -> Result<Self> {
        Self::resolve(explicit, |name| std::env::var(name).ok())
    }

    /// Resolve `explicit` with `env` as the fallback source.
    ///
    /// An explicit value wins even when empty; an empty final value counts
    /// as missing. `organization_id` must parse as a UUID.
    pub fn resolve(
        explicit: &ProviderSettings,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut issues = Vec::new();

        let mut pick = |attribute: &'static str, env_var: &'static str, value: &Option<String>| {
            let resolved = value.clone().or_else(|| env(env_var)).filter(|v| !v.is_empty());
            if resolved.is_none() {
                issues.push(ProviderError::MissingConfiguration { attribute, env_var });
            }
            resolved
        };

        let api_url = pick("api_url", ENV_API_URL, &explicit.api_url);
        let identity_url = pick("identity_url", ENV_IDENTITY_URL, &explicit.identity_url);
        let access_token = pick("access_token", ENV_ACCESS_TOKEN, &explicit.access_token)
            .map(Zeroizing::new);
        let organization_id =
            pick("organization_id", ENV_ORGANIZATION_ID, &explicit.organization_id);

        let organization_id = organization_id.and_then(|raw| match Uuid::parse_str(&raw) {
            Ok(id) => Some(id),
            Err(_) => {
                issues.push(ProviderError::InvalidUuid {
                    attribute: "organization_id",
                    value: raw,
                });
                None
            }
        });

        match (api_url, identity_url, access_token, organization_id) {
            (Some(api_url), Some(identity_url), Some(access_token), Some(organization_id))
                if issues.is_empty() =>
            {
                debug!(%api_url, %identity_url, "provider configuration resolved");
                Ok(Self {
                    api_url,
                    identity_url,
                    access_token,
                    organization_id,
                })
            }
            _ => Err(ProviderError::Configuration(issues)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const ORG: &str = "0b1e8c46-4f6b-4c2a-8f8e-8d4b6e0c3a11";

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn environment_fills_missing_attributes() {
        let config = ProviderConfig::resolve(
            &ProviderSettings::default(),
            env(&[
                (ENV_API_URL, "https://api.bitwarden.com"),
                (ENV_IDENTITY_URL, "https://identity.bitwarden.com"),
                (ENV_ACCESS_TOKEN, "token"),
                (ENV_ORGANIZATION_ID, ORG),
            ]),
        )
        .unwrap();
        assert_eq!(config.organization_id.to_string(), ORG);
        assert_eq!(config.access_token.as_str(), "token");
    }

    #[test]
    fn explicit_values_win_over_environment() {
        let explicit = ProviderSettings {
            api_url: Some("https://vault.example.com/api".into()),
            ..ProviderSettings::default()
        };
        let config = ProviderConfig::resolve(
            &explicit,
            env(&[
                (ENV_API_URL, "https://api.bitwarden.com"),
                (ENV_IDENTITY_URL, "https://identity.bitwarden.com"),
                (ENV_ACCESS_TOKEN, "token"),
                (ENV_ORGANIZATION_ID, ORG),
            ]),
        )
        .unwrap();
        assert_eq!(config.api_url, "https://vault.example.com/api");
    }

    #[test]
    fn every_missing_attribute_is_reported() {
        let err = ProviderConfig::resolve(&ProviderSettings::default(), env(&[])).unwrap_err();
        let missing: Vec<&str> = err
            .issues()
            .iter()
            .filter_map(|e| match e {
                ProviderError::MissingConfiguration { attribute, .. } => Some(*attribute),
                _ => None,
            })
            .collect();
        assert_eq!(
            missing,
            ["api_url", "identity_url", "access_token", "organization_id"]
        );
    }

    #[test]
    fn malformed_organization_id_is_invalid_uuid() {
        let explicit = ProviderSettings {
            organization_id: Some("not-a-uuid".into()),
            ..ProviderSettings::default()
        };
        let err = ProviderConfig::resolve(
            &explicit,
            env(&[
                (ENV_API_URL, "a"),
                (ENV_IDENTITY_URL, "i"),
                (ENV_ACCESS_TOKEN, "t"),
            ]),
        )
        .unwrap_err();
        assert!(matches!(
            err.issues(),
            [ProviderError::InvalidUuid { attribute: "organization_id", .. }]
        ));
    }

    #[test]
    fn debug_redacts_token() {
        let config = ProviderConfig {
            api_url: "a".into(),
            identity_url: "i".into(),
            access_token: Zeroizing::new("super-secret".into()),
            organization_id: Uuid::nil(),
        };
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
