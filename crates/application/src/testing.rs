//! In-memory doubles of the outbound ports.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::identity::email::EmailAddress;
use domain::identity::id::ProfileId;
use domain::identity::patch::ProfileChanges;
use domain::identity::profile::{Profile, Role};

use crate::dto::{NewIdentity, ProvisionPath};
use crate::error::{ApplicationError, Result, StoreError};
use crate::ports::outbound::{
    Clock, IdentityProvider, Mailer, ProfileRepository, StoreResult,
    TelemetryPort,
};

pub fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-02-03T04:05:06Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Profile `id` with an email derived from it.
pub fn profile(id: &str) -> Profile {
    Profile {
        id: ProfileId::parse(id).unwrap(),
        email: EmailAddress::parse(format!("{id}@example.com")).unwrap(),
        name: format!("User {id}"),
        role: Role::Homeowner,
        phone: None,
        first_name: None,
        last_name: None,
        created_at: fixed_now(),
        builder_id: None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calls {
    pub find_all: usize,
    pub find_by_id: usize,
    pub find_by_email: usize,
    pub insert: usize,
    pub update: usize,
}

#[derive(Default)]
struct State {
    rows: HashMap<String, Profile>,
    calls: Calls,
    fail_reads: bool,
    conflict_on_write: bool,
    last_inserted: Option<Profile>,
    last_changes: Option<ProfileChanges>,
}

/// Profile table kept in a map, counting every call.
#[derive(Default)]
pub struct InMemoryProfiles {
    state: Mutex<State>,
}

#[derive(Debug, thiserror::Error)]
#[error("connection reset by peer")]
struct ConnectionReset;

impl InMemoryProfiles {
    pub fn with(rows: Vec<Profile>) -> Self {
        let repo = Self::default();
        {
            let mut state = repo.state.lock().unwrap();
            for row in rows {
                state.rows.insert(row.id.to_string(), row);
            }
        }
        repo
    }

    pub fn fail_reads(&self) {
        self.state.lock().unwrap().fail_reads = true;
    }

    pub fn fail_writes_with_conflict(&self) {
        self.state.lock().unwrap().conflict_on_write = true;
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().unwrap().calls
    }

    pub fn last_inserted(&self) -> Option<Profile> {
        self.state.lock().unwrap().last_inserted.clone()
    }

    pub fn last_changes(&self) -> Option<ProfileChanges> {
        self.state.lock().unwrap().last_changes.clone()
    }

    pub fn get(&self, id: &str) -> Option<Profile> {
        self.state.lock().unwrap().rows.get(id).cloned()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfiles {
    async fn find_all(&self) -> StoreResult<Vec<Profile>> {
        let mut state = self.state.lock().unwrap();
        state.calls.find_all += 1;
        if state.fail_reads {
            return Err(StoreError::backend(ConnectionReset));
        }
        Ok(state.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &ProfileId) -> StoreResult<Option<Profile>> {
        let mut state = self.state.lock().unwrap();
        state.calls.find_by_id += 1;
        if state.fail_reads {
            return Err(StoreError::backend(ConnectionReset));
        }
        Ok(state.rows.get(id.as_str()).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> StoreResult<Profile> {
        let mut state = self.state.lock().unwrap();
        state.calls.find_by_email += 1;
        if state.fail_reads {
            return Err(StoreError::backend(ConnectionReset));
        }
        let mut matches = state.rows.values().filter(|row| &row.email == email);
        match (matches.next(), matches.next()) {
            (Some(row), None) => Ok(row.clone()),
            (None, _) => Err(StoreError::NotFound),
            (Some(_), Some(_)) => Err(StoreError::MultipleRows),
        }
    }

    async fn insert(&self, profile: &Profile) -> StoreResult<Profile> {
        let mut state = self.state.lock().unwrap();
        state.calls.insert += 1;
        let exists = state.rows.contains_key(profile.id.as_str());
        if state.conflict_on_write || exists {
            return Err(StoreError::Conflict("profiles_pkey".into()));
        }
        state.last_inserted = Some(profile.clone());
        state.rows.insert(profile.id.to_string(), profile.clone());
        Ok(profile.clone())
    }

    async fn update(
        &self,
        id: &ProfileId,
        changes: &ProfileChanges,
    ) -> StoreResult<Profile> {
        let mut state = self.state.lock().unwrap();
        state.calls.update += 1;
        if state.conflict_on_write {
            return Err(StoreError::Conflict("profiles_email_key".into()));
        }
        state.last_changes = Some(changes.clone());
        let row = state.rows.get_mut(id.as_str()).ok_or(StoreError::NotFound)?;

        if let Some(name) = &changes.name {
            row.name = name.clone();
        }
        if let Some(role) = changes.role {
            row.role = role;
        }
        if let Some(phone) = &changes.phone {
            row.phone = phone.clone();
        }
        if let Some(first_name) = &changes.first_name {
            row.first_name = first_name.clone();
        }
        if let Some(last_name) = &changes.last_name {
            row.last_name = last_name.clone();
        }
        if let Some(builder_id) = &changes.builder_id {
            row.builder_id = builder_id.clone();
        }
        Ok(row.clone())
    }
}

#[derive(Default)]
struct IdentityState {
    last_request: Option<NewIdentity>,
}

/// Identity provider issuing a fixed id, or failing with a message.
#[derive(Clone)]
pub struct FakeIdentityProvider {
    outcome: std::result::Result<String, String>,
    state: Arc<Mutex<IdentityState>>,
}

impl FakeIdentityProvider {
    pub fn issuing(id: &str) -> Self {
        Self {
            outcome: Ok(id.to_string()),
            state: Arc::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            state: Arc::default(),
        }
    }

    pub fn last_request(&self) -> Option<NewIdentity> {
        self.state.lock().unwrap().last_request.clone()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn create_identity(
        &self,
        identity: &NewIdentity,
    ) -> Result<ProfileId> {
        self.state.lock().unwrap().last_request = Some(identity.clone());
        match &self.outcome {
            Ok(id) => Ok(ProfileId::parse(id.as_str())?),
            Err(message) => {
                Err(ApplicationError::Provisioning(message.clone()))
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("broker unreachable")]
struct BrokerUnreachable;

/// Mailer counting attempts, optionally failing every one of them.
#[derive(Clone, Default)]
pub struct FakeMailer {
    fail: bool,
    sent: Arc<Mutex<usize>>,
}

impl FakeMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> usize {
        *self.sent.lock().unwrap()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send_welcome(&self, _profile: &Profile) -> Result<()> {
        *self.sent.lock().unwrap() += 1;
        if self.fail {
            return Err(ApplicationError::notification(BrokerUnreachable));
        }
        Ok(())
    }
}

pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        fixed_now()
    }
}

#[derive(Default)]
pub struct RecordingTelemetry {
    created: Mutex<Vec<(String, ProvisionPath)>>,
    welcome_failures: Mutex<Vec<String>>,
    skipped: Mutex<Vec<String>>,
}

impl RecordingTelemetry {
    pub fn created(&self) -> Vec<(String, ProvisionPath)> {
        self.created.lock().unwrap().clone()
    }

    pub fn welcome_failures(&self) -> Vec<String> {
        self.welcome_failures.lock().unwrap().clone()
    }

    pub fn skipped(&self) -> Vec<String> {
        self.skipped.lock().unwrap().clone()
    }
}

impl TelemetryPort for RecordingTelemetry {
    fn record_user_created(&self, user_id: &str, path: ProvisionPath) {
        self.created.lock().unwrap().push((user_id.to_string(), path));
    }

    fn record_welcome_failed(&self, user_id: &str) {
        self.welcome_failures.lock().unwrap().push(user_id.to_string());
    }

    fn record_update_skipped(&self, user_id: &str) {
        self.skipped.lock().unwrap().push(user_id.to_string());
    }
}
