//! Attribute declarations for the provider, its resource and data sources.
//!
//! Built with a small builder and serialisable to JSON (`bwsm schema`).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::secret::generator::DEFAULT_LENGTH;

use super::data_sources::{
    ListSecretsDataSource, ProjectDataSource, ProjectsDataSource, SecretDataSource,
};
use super::secret_resource::SecretResource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    Int64,
    List,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub kind: AttributeType,
    pub description: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub computed: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Element attributes of a `List` of objects.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub nested: BTreeMap<&'static str, Attribute>,
}

impl Attribute {
    fn new(kind: AttributeType, description: &'static str) -> Self {
        Self {
            kind,
            description,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            default: None,
            nested: BTreeMap::new(),
        }
    }

    pub fn required(kind: AttributeType, description: &'static str) -> Self {
        Self {
            required: true,
            ..Self::new(kind, description)
        }
    }

    pub fn optional(kind: AttributeType, description: &'static str) -> Self {
        Self {
            optional: true,
            ..Self::new(kind, description)
        }
    }

    pub fn computed(kind: AttributeType, description: &'static str) -> Self {
        Self {
            computed: true,
            ..Self::new(kind, description)
        }
    }

    /// Optional, filled from the prior state or the store when unset.
    pub fn optional_computed(kind: AttributeType, description: &'static str) -> Self {
        Self {
            optional: true,
            computed: true,
            ..Self::new(kind, description)
        }
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default = Some(value.into());
        self.computed = true;
        self
    }

    pub fn with_nested(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.nested.insert(name, attribute);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub description: &'static str,
    pub attributes: BTreeMap<&'static str, Attribute>,
}

impl Schema {
    pub fn new(description: &'static str) -> Self {
        Self {
            description,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSchema {
    pub provider: Schema,
    pub resources: BTreeMap<&'static str, Schema>,
    pub data_sources: BTreeMap<&'static str, Schema>,
}

// ── Shared descriptions ──────────────────────────────────────────────

const SECRET_ID: &str = "ID of the secret inside Bitwarden Secrets Manager.";
const SECRET_KEY: &str = "Key of the secret. Inside Bitwarden Secrets Manager this is called \"name\".";
const SECRET_NOTE: &str = "Note attached to the secret.";
const SECRET_PROJECT: &str = "ID of the project the secret belongs to. The machine account needs read access to it.";
const ORGANIZATION: &str = "ID of the organization the object belongs to.";
const CREATED: &str = "Creation date (RFC 3339).";
const REVISED: &str = "Last revision date (RFC 3339).";
const GENERATOR_NOTE: &str = "Ignored when value is set explicitly or was rotated in Bitwarden Secrets Manager.";

/// Full provider schema.
pub fn provider_schema() -> ProviderSchema {
    ProviderSchema {
        provider: provider_config(),
        resources: BTreeMap::from([(SecretResource::TYPE_NAME, secret_resource())]),
        data_sources: BTreeMap::from([
            (ListSecretsDataSource::TYPE_NAME, list_secrets_data_source()),
            (SecretDataSource::TYPE_NAME, secret_data_source()),
            (ProjectsDataSource::TYPE_NAME, projects_data_source()),
            (ProjectDataSource::TYPE_NAME, project_data_source()),
        ]),
    }
}

fn provider_config() -> Schema {
    use AttributeType::String;
    Schema::new("Manages secrets and projects in Bitwarden Secrets Manager.")
        .with_attribute(
            "api_url",
            Attribute::optional(String, "Secrets Manager API URL. Falls back to BW_API_URL."),
        )
        .with_attribute(
            "identity_url",
            Attribute::optional(String, "Identity service URL. Falls back to BW_IDENTITY_API_URL."),
        )
        .with_attribute(
            "access_token",
            Attribute::optional(String, "Machine account access token. Falls back to BW_ACCESS_TOKEN.")
                .sensitive(),
        )
        .with_attribute(
            "organization_id",
            Attribute::optional(String, "Organization UUID. Falls back to BW_ORGANIZATION_ID.")
                .sensitive(),
        )
}

fn secret_resource() -> Schema {
    use AttributeType::{Bool, Int64, String};
    Schema::new("Manages a secret in Bitwarden Secrets Manager.")
        .with_attribute("id", Attribute::computed(String, SECRET_ID))
        .with_attribute("key", Attribute::required(String, SECRET_KEY))
        .with_attribute(
            "value",
            Attribute::optional_computed(
                String,
                "Value of the secret. Generated when unset; values rotated in Bitwarden Secrets Manager are kept without a plan change.",
            )
            .sensitive(),
        )
        .with_attribute("note", Attribute::optional_computed(String, SECRET_NOTE))
        .with_attribute("project_id", Attribute::optional_computed(String, SECRET_PROJECT))
        .with_attribute("organization_id", Attribute::computed(String, ORGANIZATION))
        .with_attribute("creation_date", Attribute::computed(String, CREATED))
        .with_attribute("revision_date", Attribute::computed(String, REVISED))
        .with_attribute(
            "length",
            Attribute::optional(Int64, GENERATOR_NOTE).with_default(DEFAULT_LENGTH),
        )
        .with_attribute(
            "avoid_ambiguous",
            Attribute::optional(Bool, GENERATOR_NOTE).with_default(false),
        )
        .with_attribute("lowercase", Attribute::optional(Bool, GENERATOR_NOTE).with_default(true))
        .with_attribute("min_lowercase", Attribute::optional(Int64, GENERATOR_NOTE).with_default(1))
        .with_attribute("uppercase", Attribute::optional(Bool, GENERATOR_NOTE).with_default(true))
        .with_attribute("min_uppercase", Attribute::optional(Int64, GENERATOR_NOTE).with_default(1))
        .with_attribute("numbers", Attribute::optional(Bool, GENERATOR_NOTE).with_default(true))
        .with_attribute("min_number", Attribute::optional(Int64, GENERATOR_NOTE).with_default(1))
        .with_attribute("special", Attribute::optional(Bool, GENERATOR_NOTE).with_default(false))
        .with_attribute("min_special", Attribute::optional(Int64, GENERATOR_NOTE).with_default(1))
}

fn list_secrets_data_source() -> Schema {
    use AttributeType::{List, String};
    Schema::new("Lists every secret the machine account can access, without values.").with_attribute(
        "secrets",
        Attribute::computed(List, "Accessible secrets.")
            .with_nested("id", Attribute::computed(String, SECRET_ID))
            .with_nested("key", Attribute::computed(String, SECRET_KEY)),
    )
}

fn secret_data_source() -> Schema {
    use AttributeType::String;
    Schema::new("Reads one secret by ID.")
        .with_attribute("id", Attribute::required(String, SECRET_ID))
        .with_attribute("key", Attribute::computed(String, SECRET_KEY))
        .with_attribute(
            "value",
            Attribute::computed(String, "Value of the secret.").sensitive(),
        )
        .with_attribute("note", Attribute::computed(String, SECRET_NOTE))
        .with_attribute("project_id", Attribute::computed(String, SECRET_PROJECT))
        .with_attribute("organization_id", Attribute::computed(String, ORGANIZATION))
        .with_attribute("creation_date", Attribute::computed(String, CREATED))
        .with_attribute("revision_date", Attribute::computed(String, REVISED))
}

fn project_attributes(list: Attribute) -> Attribute {
    use AttributeType::String;
    list.with_nested("id", Attribute::computed(String, "ID of the project."))
        .with_nested("name", Attribute::computed(String, "Name of the project."))
        .with_nested("organization_id", Attribute::computed(String, ORGANIZATION))
        .with_nested("creation_date", Attribute::computed(String, CREATED))
        .with_nested("revision_date", Attribute::computed(String, REVISED))
}

fn projects_data_source() -> Schema {
    Schema::new("Lists every project the machine account can access.").with_attribute(
        "projects",
        project_attributes(Attribute::computed(AttributeType::List, "Accessible projects.")),
    )
}

fn project_data_source() -> Schema {
    use AttributeType::String;
    Schema::new("Reads one project by ID.")
        .with_attribute("id", Attribute::required(String, "ID of the project."))
        .with_attribute("name", Attribute::computed(String, "Name of the project."))
        .with_attribute("organization_id", Attribute::computed(String, ORGANIZATION))
        .with_attribute("creation_date", Attribute::computed(String, CREATED))
        .with_attribute("revision_date", Attribute::computed(String, REVISED))
}
