use std::sync::Arc;

use vouch_crypto::{KeyManager, RecordSigner};

use crate::service::UserService;
use crate::store::UserStore;

/// Shared handler state: the initialized key manager and the user service.
#[derive(Clone)]
pub struct AppState {
    keys: Arc<KeyManager>,
    users: UserService,
}

impl AppState {
    pub fn new(keys: Arc<KeyManager>, store: Arc<dyn UserStore>) -> Self {
        let signer = RecordSigner::new(Arc::clone(&keys));
        Self {
            keys,
            users: UserService::new(store, signer),
        }
    }

    pub fn keys(&self) -> &KeyManager {
        &self.keys
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }
}
