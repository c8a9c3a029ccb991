//! Secrets Manager REST client.
//!
//! Thin blocking wrapper over `ureq`: builds requests, maps HTTP status
//! codes and (de)serialises the wire types. Every field that is encrypted
//! on the server stays an EncString here; `super` handles the crypto.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Device type the server expects from SDK-style machine clients.
const DEVICE_TYPE: &str = "21";
const CLIENT_NAME: &str = "bwsm";

/// Failure of a single HTTP exchange.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 401: the bearer token expired or was revoked.
    #[error("HTTP 401 Unauthorized")]
    Unauthorized,

    #[error("HTTP 404 Not Found")]
    NotFound,

    /// Any other non-2xx status.
    #[error("HTTP {status}{}", body_suffix(.body))]
    Status { status: u16, body: String },

    /// Connection, TLS or timeout failure.
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    /// The exchange completed but a body could not be built or decoded.
    #[error("{0}")]
    Transport(String),
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub encrypted_payload: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretResponse {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    pub creation_date: DateTime<Utc>,
    pub revision_date: DateTime<Utc>,
    #[serde(default)]
    pub projects: Option<Vec<ProjectRef>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRef {
    pub id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretIdentifierResponse {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub key: String,
}

#[derive(Deserialize)]
struct SecretIdentifiersResponse {
    secrets: Vec<SecretIdentifierResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRequest {
    pub key: String,
    pub value: String,
    pub note: String,
    pub project_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub creation_date: DateTime<Utc>,
    pub revision_date: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ProjectsResponse {
    data: Vec<ProjectResponse>,
}

#[derive(Debug, Serialize)]
pub struct ProjectRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteItem {
    pub id: Uuid,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize)]
struct DeleteResponse {
    data: Vec<DeleteItem>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct SmClient {
    agent: ureq::Agent,
    api_url: String,
    identity_url: String,
}

impl SmClient {
    pub fn new(api_url: &str, identity_url: &str, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            api_url: api_url.trim_end_matches('/').to_string(),
            identity_url: identity_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client-credentials login with a machine-account access token.
    pub fn login(&self, client_id: &str, client_secret: &str) -> ApiResult<LoginResponse> {
        let url = format!("{}/connect/token", self.identity_url);
        debug!("secrets manager login");

        let resp = self
            .agent
            .post(&url)
            .header("Device-Type", DEVICE_TYPE)
            .header("Bitwarden-Client-Name", CLIENT_NAME)
            .header("Bitwarden-Client-Version", env!("CARGO_PKG_VERSION"))
            .send_form([
                ("grant_type", "client_credentials"),
                ("scope", "api.secrets"),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])?;
        read_json(resp)
    }

    pub fn create_secret(
        &self,
        bearer: &str,
        organization_id: Uuid,
        body: &SecretRequest,
    ) -> ApiResult<SecretResponse> {
        let url = format!("{}/organizations/{organization_id}/secrets", self.api_url);
        self.post_json(bearer, &url, body)
    }

    pub fn get_secret(&self, bearer: &str, id: Uuid) -> ApiResult<SecretResponse> {
        self.get_json(bearer, &format!("{}/secrets/{id}", self.api_url))
    }

    pub fn update_secret(
        &self,
        bearer: &str,
        id: Uuid,
        body: &SecretRequest,
    ) -> ApiResult<SecretResponse> {
        let url = format!("{}/secrets/{id}", self.api_url);
        debug!(%url, "PUT");
        let resp = self
            .agent
            .put(&url)
            .header("Authorization", format!("Bearer {bearer}"))
            .header("Bitwarden-Client-Name", CLIENT_NAME)
            .send_json(body)?;
        read_json(resp)
    }

    pub fn delete_secrets(&self, bearer: &str, ids: &[Uuid]) -> ApiResult<Vec<DeleteItem>> {
        let url = format!("{}/secrets/delete", self.api_url);
        let resp: DeleteResponse = self.post_json(bearer, &url, &ids)?;
        Ok(resp.data)
    }

    pub fn list_secrets(
        &self,
        bearer: &str,
        organization_id: Uuid,
    ) -> ApiResult<Vec<SecretIdentifierResponse>> {
        let url = format!("{}/organizations/{organization_id}/secrets", self.api_url);
        let resp: SecretIdentifiersResponse = self.get_json(bearer, &url)?;
        debug!(count = resp.secrets.len(), "secret identifiers fetched");
        Ok(resp.secrets)
    }

    pub fn create_project(
        &self,
        bearer: &str,
        organization_id: Uuid,
        body: &ProjectRequest,
    ) -> ApiResult<ProjectResponse> {
        let url = format!("{}/organizations/{organization_id}/projects", self.api_url);
        self.post_json(bearer, &url, body)
    }

    pub fn get_project(&self, bearer: &str, id: Uuid) -> ApiResult<ProjectResponse> {
        self.get_json(bearer, &format!("{}/projects/{id}", self.api_url))
    }

    pub fn update_project(
        &self,
        bearer: &str,
        id: Uuid,
        body: &ProjectRequest,
    ) -> ApiResult<ProjectResponse> {
        let url = format!("{}/projects/{id}", self.api_url);
        debug!(%url, "PUT");
        let resp = self
            .agent
            .put(&url)
            .header("Authorization", format!("Bearer {bearer}"))
            .header("Bitwarden-Client-Name", CLIENT_NAME)
            .send_json(body)?;
        read_json(resp)
    }

    pub fn delete_projects(&self, bearer: &str, ids: &[Uuid]) -> ApiResult<Vec<DeleteItem>> {
        let url = format!("{}/projects/delete", self.api_url);
        let resp: DeleteResponse = self.post_json(bearer, &url, &ids)?;
        Ok(resp.data)
    }

    pub fn list_projects(
        &self,
        bearer: &str,
        organization_id: Uuid,
    ) -> ApiResult<Vec<ProjectResponse>> {
        let url = format!("{}/organizations/{organization_id}/projects", self.api_url);
        let resp: ProjectsResponse = self.get_json(bearer, &url)?;
        debug!(count = resp.data.len(), "projects fetched");
        Ok(resp.data)
    }

    fn get_json<T: DeserializeOwned>(&self, bearer: &str, url: &str) -> ApiResult<T> {
        debug!(%url, "GET");
        let resp = self
            .agent
            .get(url)
            .header("Authorization", format!("Bearer {bearer}"))
            .header("Bitwarden-Client-Name", CLIENT_NAME)
            .call()?;
        read_json(resp)
    }

    fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        bearer: &str,
        url: &str,
        body: &B,
    ) -> ApiResult<T> {
        debug!(%url, "POST");
        let resp = self
            .agent
            .post(url)
            .header("Authorization", format!("Bearer {bearer}"))
            .header("Bitwarden-Client-Name", CLIENT_NAME)
            .send_json(body)?;
        read_json(resp)
    }
}

/// Map the status code, then decode a JSON body.
fn read_json<T: DeserializeOwned>(mut resp: ureq::http::Response<ureq::Body>) -> ApiResult<T> {
    let status = resp.status().as_u16();
    match status {
        200..=299 => resp
            .body_mut()
            .read_json::<T>()
            .map_err(|e| ApiError::Transport(format!("invalid response body: {e}"))),
        401 => Err(ApiError::Unauthorized),
        404 => Err(ApiError::NotFound),
        _ => {
            let body = resp.body_mut().read_to_string().unwrap_or_default();
            debug!(status, "request failed");
            Err(ApiError::Status { status, body })
        }
    }
}
