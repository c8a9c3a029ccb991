//! Bitwarden Secrets Manager store.
//!
//! Talks to the Secrets Manager REST API directly:
//!
//! 1. Parse the machine-account access token and derive its key
//! 2. Log in with client credentials, receiving a bearer token and the
//!    encrypted organization key
//! 3. Encrypt `key`/`value`/`note` (and project names) with the
//!    organization key on the way out, decrypt them on the way in
//!
//! The session is established lazily, cached per store instance and
//! re-established once when the server answers 401.

pub mod api;
pub mod crypto;
#[cfg(test)]
mod test_server;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::config::ProviderConfig;
use crate::errors::{ProviderError, Result};
use crate::secret::{DeleteOutcome, ProjectRecord, SecretIdentifier, SecretInput, SecretRecord};

use self::api::{
    ApiError, ApiResult, ProjectRequest, ProjectResponse, SecretRequest, SecretResponse, SmClient,
};
use self::crypto::{AccessToken, SymmetricKey};
use super::{SecretStore, StoreFactory};

/// Bearer token plus the decrypted organization key.
struct Session {
    bearer: Zeroizing<String>,
    org_key: SymmetricKey,
}

pub struct BitwardenStore {
    client: SmClient,
    token: AccessToken,
    session: Mutex<Option<Arc<Session>>>,
}

impl BitwardenStore {
    /// Build a store client. Does not contact the server.
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self> {
        let token = AccessToken::parse(config.access_token.as_str())?;
        Ok(Self {
            client: SmClient::new(&config.api_url, &config.identity_url, timeout),
            token,
            session: Mutex::new(None),
        })
    }

    /// Log in now instead of on the first request.
    pub fn authenticate(&self) -> Result<()> {
        self.session(true).map(|_| ())
    }

    fn session(&self, renew: bool) -> Result<Arc<Session>> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| ProviderError::store("authenticate", "session lock poisoned"))?;

        if let (false, Some(session)) = (renew, guard.as_ref()) {
            return Ok(Arc::clone(session));
        }

        let login = self
            .client
            .login(
                &self.token.access_token_id.to_string(),
                self.token.client_secret.as_str(),
            )
            .map_err(|e| ProviderError::store("authenticate with access token", e))?;

        let token_key = self.token.derive_key()?;
        let org_key = crypto::decrypt_organization_key(&login.encrypted_payload, &token_key)?;
        let session = Arc::new(Session {
            bearer: Zeroizing::new(login.access_token),
            org_key,
        });
        info!(access_token_id = %self.token.access_token_id, "authenticated to secrets manager");

        *guard = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Run one API exchange, logging in again once on 401.
    fn call<T>(
        &self,
        operation: &str,
        not_found: Option<(&'static str, Uuid)>,
        f: impl Fn(&SmClient, &Session) -> ApiResult<T>,
    ) -> Result<T> {
        let session = self.session(false)?;
        let result = match f(&self.client, session.as_ref()) {
            Err(ApiError::Unauthorized) => {
                debug!(operation, "bearer token rejected, logging in again");
                let session = self.session(true)?;
                f(&self.client, session.as_ref())
            }
            other => other,
        };

        result.map_err(|e| match (e, not_found) {
            (ApiError::NotFound, Some((kind, id))) => ProviderError::ResourceNotFound {
                kind,
                id: id.to_string(),
            },
            (e, _) => ProviderError::store(operation, e),
        })
    }

    fn secret_request(&self, input: &SecretInput, key: &SymmetricKey) -> Result<SecretRequest> {
        Ok(SecretRequest {
            key: crypto::encrypt_str(&input.key, key)?,
            value: crypto::encrypt_str(&input.value, key)?,
            note: crypto::encrypt_str(&input.note, key)?,
            project_ids: Some(input.project_ids.clone()),
        })
    }

    fn decrypt_secret(&self, raw: SecretResponse) -> Result<SecretRecord> {
        let session = self.session(false)?;
        let key = &session.org_key;
        Ok(SecretRecord {
            id: raw.id,
            key: crypto::decrypt_str(Some(&raw.key), key)?,
            value: crypto::decrypt_str(raw.value.as_deref(), key)?,
            note: crypto::decrypt_str(raw.note.as_deref(), key)?,
            project_id: raw
                .projects
                .as_deref()
                .and_then(|p| p.first())
                .map(|p| p.id),
            organization_id: raw.organization_id,
            creation_date: raw.creation_date,
            revision_date: raw.revision_date,
        })
    }

    fn decrypt_project(&self, raw: ProjectResponse) -> Result<ProjectRecord> {
        let session = self.session(false)?;
        Ok(ProjectRecord {
            id: raw.id,
            name: crypto::decrypt_str(Some(&raw.name), &session.org_key)?,
            organization_id: raw.organization_id,
            creation_date: raw.creation_date,
            revision_date: raw.revision_date,
        })
    }

    /// Encrypt with the session key inside the retried exchange, so a
    /// renewed session re-encrypts with its own key.
    fn write_secret(
        &self,
        operation: &str,
        not_found: Option<(&'static str, Uuid)>,
        input: &SecretInput,
        send: impl Fn(&SmClient, &str, &SecretRequest) -> ApiResult<SecretResponse>,
    ) -> Result<SecretRecord> {
        let raw = self.call(operation, not_found, |client, session| {
            let body = self
                .secret_request(input, &session.org_key)
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            send(client, session.bearer.as_str(), &body)
        })?;
        self.decrypt_secret(raw)
    }
}

fn delete_outcomes(items: Vec<api::DeleteItem>) -> Vec<DeleteOutcome> {
    items
        .into_iter()
        .map(|item| DeleteOutcome {
            id: item.id,
            error: item.error.filter(|e| !e.is_empty()),
        })
        .collect()
}

impl SecretStore for BitwardenStore {
    fn create_secret(&self, input: &SecretInput) -> Result<SecretRecord> {
        let org = input.organization_id;
        let record = self.write_secret("create secret", None, input, |client, bearer, body| {
            client.create_secret(bearer, org, body)
        })?;
        info!(id = %record.id, "secret created");
        Ok(record)
    }

    fn get_secret(&self, id: Uuid) -> Result<SecretRecord> {
        let raw = self.call("read secret", Some(("Secret", id)), |client, session| {
            client.get_secret(&session.bearer, id)
        })?;
        self.decrypt_secret(raw)
    }

    fn update_secret(&self, id: Uuid, input: &SecretInput) -> Result<SecretRecord> {
        let record = self.write_secret(
            "update secret",
            Some(("Secret", id)),
            input,
            |client, bearer, body| client.update_secret(bearer, id, body),
        )?;
        info!(%id, "secret updated");
        Ok(record)
    }

    fn delete_secrets(&self, ids: &[Uuid]) -> Result<Vec<DeleteOutcome>> {
        let items = self.call("delete secrets", None, |client, session| {
            client.delete_secrets(&session.bearer, ids)
        })?;
        Ok(delete_outcomes(items))
    }

    fn list_secrets(&self, organization_id: Uuid) -> Result<Vec<SecretIdentifier>> {
        let raw = self.call("list secrets", None, |client, session| {
            client.list_secrets(&session.bearer, organization_id)
        })?;
        let session = self.session(false)?;
        raw.into_iter()
            .map(|s| {
                Ok(SecretIdentifier {
                    id: s.id,
                    key: crypto::decrypt_str(Some(&s.key), &session.org_key)?,
                    organization_id: s.organization_id,
                })
            })
            .collect()
    }

    fn create_project(&self, organization_id: Uuid, name: &str) -> Result<ProjectRecord> {
        let raw = self.call("create project", None, |client, session| {
            let body = ProjectRequest {
                name: crypto::encrypt_str(name, &session.org_key)
                    .map_err(|e| ApiError::Transport(e.to_string()))?,
            };
            client.create_project(&session.bearer, organization_id, &body)
        })?;
        self.decrypt_project(raw)
    }

    fn get_project(&self, id: Uuid) -> Result<ProjectRecord> {
        let raw = self.call("read project", Some(("Project", id)), |client, session| {
            client.get_project(&session.bearer, id)
        })?;
        self.decrypt_project(raw)
    }

    fn update_project(
        &self,
        id: Uuid,
        _organization_id: Uuid,
        name: &str,
    ) -> Result<ProjectRecord> {
        let raw = self.call("update project", Some(("Project", id)), |client, session| {
            let body = ProjectRequest {
                name: crypto::encrypt_str(name, &session.org_key)
                    .map_err(|e| ApiError::Transport(e.to_string()))?,
            };
            client.update_project(&session.bearer, id, &body)
        })?;
        self.decrypt_project(raw)
    }

    fn delete_projects(&self, ids: &[Uuid]) -> Result<Vec<DeleteOutcome>> {
        let items = self.call("delete projects", None, |client, session| {
            client.delete_projects(&session.bearer, ids)
        })?;
        Ok(delete_outcomes(items))
    }

    fn list_projects(&self, organization_id: Uuid) -> Result<Vec<ProjectRecord>> {
        let raw = self.call("list projects", None, |client, session| {
            client.list_projects(&session.bearer, organization_id)
        })?;
        raw.into_iter().map(|p| self.decrypt_project(p)).collect()
    }
}

/// Connects one authenticated `BitwardenStore` per resource object.
#[derive(Debug, Clone)]
pub struct BitwardenStoreFactory {
    timeout: Duration,
}

impl BitwardenStoreFactory {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for BitwardenStoreFactory {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl StoreFactory for BitwardenStoreFactory {
    fn connect(&self, config: &ProviderConfig) -> Result<Box<dyn SecretStore>> {
        let store = BitwardenStore::new(config, self.timeout)?;
        store.authenticate()?;
        Ok(Box::new(store))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use base64::{engine::general_purpose::STANDARD as B64, Engine as _};

    use super::test_server::TestServer;
    use super::*;
    use crate::provider::SecretResource;
    use crate::secret::{GeneratorConfig, SecretState};

    const TOKEN: &str = "0.ec2c1d46-6a4b-4751-a310-af9601317f2d.C2IgxjjLF7qSshsbwe8JGcbM075YXw:X8vbvA0bduihIDe/qrzIQQ==";
    const ORG: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    fn org_key() -> SymmetricKey {
        Zeroizing::new([7u8; 64])
    }

    fn login_body() -> String {
        let token_key = AccessToken::parse(TOKEN).unwrap().derive_key().unwrap();
        let payload = serde_json::json!({ "encryptionKey": B64.encode(*org_key()) }).to_string();
        let encrypted = crypto::encrypt(payload.as_bytes(), &token_key).unwrap();
        serde_json::json!({ "access_token": "bearer", "encrypted_payload": encrypted }).to_string()
    }

    fn secret_body(id: &str) -> String {
        let key = org_key();
        serde_json::json!({
            "id": id,
            "organizationId": ORG,
            "key": crypto::encrypt_str("API_KEY", &key).unwrap(),
            "value": crypto::encrypt_str("s3cr3t", &key).unwrap(),
            "note": crypto::encrypt_str("", &key).unwrap(),
            "creationDate": "2024-05-01T10:00:00Z",
            "revisionDate": "2024-05-02T10:00:00Z",
            "projects": []
        })
        .to_string()
    }

    fn config(server: &TestServer) -> ProviderConfig {
        ProviderConfig {
            api_url: server.url.clone(),
            identity_url: server.url.clone(),
            access_token: Zeroizing::new(TOKEN.into()),
            organization_id: Uuid::parse_str(ORG).unwrap(),
        }
    }

    fn store(server: &TestServer) -> BitwardenStore {
        BitwardenStore::new(&config(server), Duration::from_secs(5)).unwrap()
    }

    /// Answers logins; every other request goes to `api`.
    fn server(api: impl Fn(&str, &str) -> (u16, String) + Send + Sync + 'static) -> TestServer {
        let login = login_body();
        TestServer::start(move |method, path| {
            if path == "/connect/token" {
                (200, login.clone())
            } else {
                api(method, path)
            }
        })
    }

    #[test]
    fn get_secret_decrypts_fields() {
        let id = Uuid::new_v4();
        let body = secret_body(&id.to_string());
        let server = server(move |_, _| (200, body.clone()));

        let record = store(&server).get_secret(id).unwrap();
        assert_eq!(record.key, "API_KEY");
        assert_eq!(record.value, "s3cr3t");
        assert_eq!(record.note, "");
        assert_eq!(server.count("POST /connect/token"), 1);
    }

    #[test]
    fn missing_secret_is_not_found() {
        let server = server(|_, _| (404, String::new()));
        let err = store(&server).get_secret(Uuid::new_v4()).unwrap_err();
        assert!(err.is_not_found(), "{err:?}");
    }

    #[test]
    fn resource_read_of_missing_secret_is_none() {
        let server = server(|_, _| (404, String::new()));
        let config = config(&server);
        let resource = SecretResource::new(Box::new(store(&server)), &config);

        let now = chrono::Utc::now();
        let prior = SecretState::from_record(
            SecretRecord {
                id: Uuid::new_v4(),
                key: "API_KEY".into(),
                value: "v".into(),
                note: String::new(),
                project_id: None,
                organization_id: config.organization_id,
                creation_date: now,
                revision_date: now,
            },
            GeneratorConfig::default(),
        );
        assert!(resource.read(&prior).unwrap().is_none());
    }

    #[test]
    fn unauthorized_triggers_one_login_and_retry() {
        let id = Uuid::new_v4();
        let body = secret_body(&id.to_string());
        let calls = AtomicUsize::new(0);
        let server = server(move |_, _| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                (401, String::new())
            } else {
                (200, body.clone())
            }
        });

        let record = store(&server).get_secret(id).unwrap();
        assert_eq!(record.key, "API_KEY");
        assert_eq!(server.count("POST /connect/token"), 2);
        assert_eq!(server.count("GET /secrets/"), 2);
    }

    #[test]
    fn persistent_unauthorized_gives_up_after_one_retry() {
        let server = server(|_, _| (401, String::new()));
        let err = store(&server).get_secret(Uuid::new_v4()).unwrap_err();

        assert!(matches!(err, ProviderError::StoreOperationFailed { .. }), "{err:?}");
        assert_eq!(server.count("POST /connect/token"), 2);
        assert_eq!(server.count("GET /secrets/"), 2);
    }

    #[test]
    fn server_error_is_store_failure() {
        let server = server(|_, _| (500, "internal".into()));
        let err = store(&server).list_secrets(Uuid::parse_str(ORG).unwrap()).unwrap_err();

        assert!(matches!(err, ProviderError::StoreOperationFailed { .. }), "{err:?}");
        assert!(err.to_string().contains("HTTP 500: internal"));
    }

    #[test]
    fn session_is_reused_between_calls() {
        let id = Uuid::new_v4();
        let body = secret_body(&id.to_string());
        let server = server(move |_, _| (200, body.clone()));
        let store = store(&server);

        store.get_secret(id).unwrap();
        store.get_secret(id).unwrap();
        assert_eq!(server.count("POST /connect/token"), 1);
    }

    #[test]
    fn rejected_login_is_store_failure() {
        let server = TestServer::start(|_, _| (400, r#"{"error":"invalid_client"}"#.into()));
        let err = store(&server).get_secret(Uuid::new_v4()).unwrap_err();
        assert!(err.to_string().contains("authenticate"), "{err}");
    }
}
