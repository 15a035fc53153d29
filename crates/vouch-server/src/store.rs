use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;
use vouch_types::UserRecord;

use crate::error::{ServerError, ServerResult};

/// Persistence for sealed user records.
///
/// Implementations keep emails unique across records and store records
/// exactly as given; sealing happens before a record reaches the store.
pub trait UserStore: Send + Sync {
    /// Add a new record. Fails with `Conflict` if the id or email is taken.
    fn insert(&self, record: UserRecord) -> ServerResult<()>;

    /// Replace the record with the same id.
    ///
    /// Returns `Ok(false)` if no such record exists. Fails with `Conflict`
    /// if the new email belongs to a different record.
    fn replace(&self, record: UserRecord) -> ServerResult<bool>;

    fn get(&self, id: &Uuid) -> ServerResult<Option<UserRecord>>;

    fn find_by_email(&self, email: &str) -> ServerResult<Option<UserRecord>>;

    /// Delete a record. Returns `true` if it existed.
    fn remove(&self, id: &Uuid) -> ServerResult<bool>;

    /// All records, newest `created_at` first.
    fn list(&self) -> ServerResult<Vec<UserRecord>>;
}

/// In-memory, HashMap-based user store.
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.users.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

fn email_taken(map: &HashMap<Uuid, UserRecord>, email: &str, except: Option<Uuid>) -> bool {
    map.values().any(|r| r.email() == email && Some(r.id) != except)
}

impl UserStore for InMemoryUserStore {
    fn insert(&self, record: UserRecord) -> ServerResult<()> {
        let mut map = self.users.write().expect("lock poisoned");
        if map.contains_key(&record.id) {
            return Err(ServerError::Conflict(format!("user id already exists: {}", record.id)));
        }
        if email_taken(&map, record.email(), None) {
            return Err(ServerError::Conflict(format!("email already registered: {}", record.email())));
        }
        map.insert(record.id, record);
        Ok(())
    }

    fn replace(&self, record: UserRecord) -> ServerResult<bool> {
        let mut map = self.users.write().expect("lock poisoned");
        if !map.contains_key(&record.id) {
            return Ok(false);
        }
        if email_taken(&map, record.email(), Some(record.id)) {
            return Err(ServerError::Conflict(format!("email already registered: {}", record.email())));
        }
        map.insert(record.id, record);
        Ok(true)
    }

    fn get(&self, id: &Uuid) -> ServerResult<Option<UserRecord>> {
        Ok(self.users.read().expect("lock poisoned").get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> ServerResult<Option<UserRecord>> {
        let map = self.users.read().expect("lock poisoned");
        Ok(map.values().find(|r| r.email() == email).cloned())
    }

    fn remove(&self, id: &Uuid) -> ServerResult<bool> {
        Ok(self.users.write().expect("lock poisoned").remove(id).is_some())
    }

    fn list(&self) -> ServerResult<Vec<UserRecord>> {
        let map = self.users.read().expect("lock poisoned");
        let mut records: Vec<UserRecord> = map.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }
}
