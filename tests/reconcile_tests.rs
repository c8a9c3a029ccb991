//! Integration tests for value reconciliation through the secret resource.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bwsm::config::ProviderConfig;
use bwsm::errors::Result;
use bwsm::provider::{PlannedAction, SecretResource};
use bwsm::secret::reconcile;
use bwsm::secret::{
    DeleteOutcome, DesiredState, GeneratorConfig, ProjectRecord, SecretIdentifier, SecretInput,
    SecretRecord, ValueSource,
};
use bwsm::store::{MemoryStore, SecretStore};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Memory store that counts calls to the value generator.
#[derive(Clone, Default)]
struct CountingStore {
    inner: MemoryStore,
    generated: Arc<AtomicUsize>,
}

impl CountingStore {
    fn generated(&self) -> usize {
        self.generated.load(Ordering::SeqCst)
    }
}

impl SecretStore for CountingStore {
    fn create_secret(&self, input: &SecretInput) -> Result<SecretRecord> {
        self.inner.create_secret(input)
    }
    fn get_secret(&self, id: Uuid) -> Result<SecretRecord> {
        self.inner.get_secret(id)
    }
    fn update_secret(&self, id: Uuid, input: &SecretInput) -> Result<SecretRecord> {
        self.inner.update_secret(id, input)
    }
    fn delete_secrets(&self, ids: &[Uuid]) -> Result<Vec<DeleteOutcome>> {
        self.inner.delete_secrets(ids)
    }
    fn list_secrets(&self, organization_id: Uuid) -> Result<Vec<SecretIdentifier>> {
        self.inner.list_secrets(organization_id)
    }
    fn create_project(&self, organization_id: Uuid, name: &str) -> Result<ProjectRecord> {
        self.inner.create_project(organization_id, name)
    }
    fn get_project(&self, id: Uuid) -> Result<ProjectRecord> {
        self.inner.get_project(id)
    }
    fn update_project(&self, id: Uuid, organization_id: Uuid, name: &str) -> Result<ProjectRecord> {
        self.inner.update_project(id, organization_id, name)
    }
    fn delete_projects(&self, ids: &[Uuid]) -> Result<Vec<DeleteOutcome>> {
        self.inner.delete_projects(ids)
    }
    fn list_projects(&self, organization_id: Uuid) -> Result<Vec<ProjectRecord>> {
        self.inner.list_projects(organization_id)
    }
    fn generate_password(&self, config: &GeneratorConfig) -> Result<String> {
        self.generated.fetch_add(1, Ordering::SeqCst);
        self.inner.generate_password(config)
    }
}

fn config() -> ProviderConfig {
    ProviderConfig {
        api_url: "http://localhost".into(),
        identity_url: "http://localhost".into(),
        access_token: Zeroizing::new("unused".into()),
        organization_id: Uuid::new_v4(),
    }
}

fn resource(store: &CountingStore) -> SecretResource {
    SecretResource::new(Box::new(store.clone()), &config())
}

fn rotate_out_of_band(store: &CountingStore, record: &SecretRecord, value: &str) {
    store
        .inner
        .update_secret(
            record.id,
            &SecretInput {
                key: record.key.clone(),
                value: value.into(),
                note: record.note.clone(),
                organization_id: record.organization_id,
                project_ids: record.project_id.into_iter().collect(),
            },
        )
        .unwrap();
}

#[test]
fn create_without_value_generates_64_chars() {
    let store = CountingStore::default();
    let state = resource(&store).create(&DesiredState::new("DB_PASSWORD")).unwrap();
    assert_eq!(state.value.len(), 64);
    assert_eq!(state.note, "");
    assert_eq!(store.generated(), 1);
}

#[test]
fn explicit_value_is_sent_verbatim() {
    let store = CountingStore::default();
    let state = resource(&store)
        .create(&DesiredState::new("K").with_value("abc123"))
        .unwrap();
    assert_eq!(state.value, "abc123");
    assert_eq!(store.generated(), 0);
}

#[test]
fn update_with_same_generator_reuses_prior_value() {
    let store = CountingStore::default();
    let res = resource(&store);
    let prior = res.create(&DesiredState::new("K")).unwrap();

    let desired = DesiredState::new("K").with_note("now with a note");
    let reconciled = reconcile::reconcile_update(&desired, &prior, &store).unwrap();
    assert_eq!(reconciled.source, ValueSource::Preserved);
    assert_eq!(reconciled.input.value, prior.value);
    assert_eq!(store.generated(), 1);
}

#[test]
fn changing_a_minimum_regenerates() {
    let store = CountingStore::default();
    let res = resource(&store);
    let prior = res.create(&DesiredState::new("K")).unwrap();

    let generator = GeneratorConfig {
        min_uppercase: 5,
        ..GeneratorConfig::default()
    };
    let updated = res
        .update(&DesiredState::new("K").with_generator(generator), &prior)
        .unwrap();

    assert_ne!(updated.value, prior.value);
    assert!(updated.value.chars().filter(char::is_ascii_uppercase).count() >= 5);
    assert_eq!(updated.generator, generator);
    assert_eq!(store.generated(), 2);
}

#[test]
fn rotation_outside_the_provider_survives_apply() {
    let store = CountingStore::default();
    let res = resource(&store);
    let desired = DesiredState::new("K");
    let created = res.apply(&desired, None).unwrap().state;

    let record = store.inner.get_secret(created.id).unwrap();
    rotate_out_of_band(&store, &record, "rotated-by-hand");

    let current = res.read(&created).unwrap().unwrap();
    assert_eq!(current.value, "rotated-by-hand");

    let applied = res.apply(&desired, Some(&current)).unwrap();
    assert_eq!(applied.plan.action, PlannedAction::NoOp);
    assert_eq!(applied.state.value, "rotated-by-hand");
    assert_eq!(store.generated(), 1);
}

#[test]
fn update_keeps_prior_note_and_project_when_unset() {
    let store = CountingStore::default();
    let res = resource(&store);
    let project = store.create_project(res.organization_id(), "backend").unwrap();
    let prior = res
        .create(
            &DesiredState::new("K")
                .with_note("original")
                .with_project_id(project.id),
        )
        .unwrap();

    let updated = res
        .update(&DesiredState::new("K2"), &prior)
        .unwrap();
    assert_eq!(updated.key, "K2");
    assert_eq!(updated.note, "original");
    assert_eq!(updated.project_id, Some(project.id));
    assert_eq!(updated.value, prior.value);
}

#[test]
fn invalid_generator_fails_before_any_store_call() {
    let store = CountingStore::default();
    let generator = GeneratorConfig {
        length: 3,
        ..GeneratorConfig::default()
    };
    let desired = DesiredState::new("K")
        .with_value("explicit")
        .with_generator(generator);

    assert!(resource(&store).create(&desired).is_err());
    assert!(store.inner.snapshot().unwrap().secrets.is_empty());
}
