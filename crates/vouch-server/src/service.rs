use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use vouch_crypto::RecordSigner;
use vouch_protocol::BatchCodec;
use vouch_types::{NewUser, UserPatch, UserRecord};

use crate::error::{ServerError, ServerResult};
use crate::stats::{count_by_day, DayCount};
use crate::store::UserStore;

/// User operations on the signing side. Every write that sets an email
/// seals the record before it reaches the store.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    signer: RecordSigner,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, signer: RecordSigner) -> Self {
        Self { store, signer }
    }

    pub fn signer(&self) -> &RecordSigner {
        &self.signer
    }

    pub fn create(&self, input: &NewUser) -> ServerResult<UserRecord> {
        let draft = input.validate()?;
        if self.store.find_by_email(&draft.email)?.is_some() {
            return Err(ServerError::Conflict(format!("email already registered: {}", draft.email)));
        }
        let record = self
            .signer
            .issue(Uuid::new_v4(), &draft, Utc::now().timestamp_millis())?;
        self.store.insert(record.clone())?;
        info!(id = %record.id, role = %record.role, "user created");
        Ok(record)
    }

    pub fn get(&self, id: Uuid) -> ServerResult<UserRecord> {
        self.store
            .get(&id)?
            .ok_or_else(|| ServerError::NotFound(id.to_string()))
    }

    /// Apply a partial update. Email, hash and signature change together,
    /// and only when the email actually changes.
    pub fn update(&self, id: Uuid, patch: &UserPatch) -> ServerResult<UserRecord> {
        let patch = patch.validate()?;
        let mut record = self.get(id)?;

        if let Some(email) = patch.email.as_deref().filter(|e| *e != record.email()) {
            if self.store.find_by_email(email)?.is_some_and(|other| other.id != id) {
                return Err(ServerError::Conflict(format!("email already registered: {email}")));
            }
            self.signer.reseal(&mut record, email)?;
        }
        if let Some(role) = patch.role {
            record.role = role;
        }
        if let Some(status) = patch.status {
            record.status = status;
        }

        if !self.store.replace(record.clone())? {
            return Err(ServerError::NotFound(id.to_string()));
        }
        info!(%id, "user updated");
        Ok(record)
    }

    pub fn delete(&self, id: Uuid) -> ServerResult<()> {
        if !self.store.remove(&id)? {
            return Err(ServerError::NotFound(id.to_string()));
        }
        info!(%id, "user deleted");
        Ok(())
    }

    /// All users, newest first.
    pub fn list(&self) -> ServerResult<Vec<UserRecord>> {
        self.store.list()
    }

    /// Users created per UTC day over the last `days` days, today included.
    pub fn stats_last_days(&self, days: u32) -> ServerResult<Vec<DayCount>> {
        let records = self.store.list()?;
        Ok(count_by_day(&records, Utc::now().date_naive(), days))
    }

    /// Encode every user, newest first, as one batch.
    pub fn export(&self) -> ServerResult<Vec<u8>> {
        let records = self.store.list()?;
        let bytes = BatchCodec::encode(&records);
        info!(records = records.len(), bytes = bytes.len(), "users exported");
        Ok(bytes)
    }
}
