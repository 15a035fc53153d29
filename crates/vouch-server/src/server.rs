use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use vouch_crypto::KeyManager;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::router::build_router;
use crate::state::AppState;
use crate::store::{InMemoryUserStore, UserStore};

/// vouch signing server.
pub struct VouchServer {
    config: ServerConfig,
    state: AppState,
}

impl VouchServer {
    /// Load or create the key pair under `config.key_dir`, backed by an
    /// in-memory user store. Key errors surface here, before any request.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        Self::with_store(config, Arc::new(InMemoryUserStore::new()))
    }

    pub fn with_store(config: ServerConfig, store: Arc<dyn UserStore>) -> ServerResult<Self> {
        let keys = Arc::new(KeyManager::open(config.key_dir.clone())?);
        let state = AppState::new(keys, store);
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Serve until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!(
            addr = %self.config.bind_addr,
            key_dir = %self.config.key_dir.display(),
            "vouch server listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutdown requested");
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerError;

    fn config_in(dir: &tempfile::TempDir) -> ServerConfig {
        ServerConfig {
            key_dir: dir.path().join("keys"),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn construction_initializes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let server = VouchServer::new(config_in(&dir)).unwrap();
        assert!(server.state().keys().is_initialized());
        assert!(dir.path().join("keys/private.pem").exists());
        assert_eq!(server.config().bind_addr.port(), 4000);
    }

    #[test]
    fn restart_keeps_public_key() {
        let dir = tempfile::tempdir().unwrap();
        let first = VouchServer::new(config_in(&dir)).unwrap();
        let pem = first.state().keys().public_key_pem().unwrap().to_string();
        let second = VouchServer::new(config_in(&dir)).unwrap();
        assert_eq!(second.state().keys().public_key_pem().unwrap(), pem);
    }

    #[test]
    fn corrupt_key_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("keys")).unwrap();
        std::fs::write(dir.path().join("keys/private.pem"), "not a key").unwrap();
        assert!(matches!(VouchServer::new(config_in(&dir)), Err(ServerError::KeyInit(_))));
    }

    #[test]
    fn router_builds() {
        let dir = tempfile::tempdir().unwrap();
        let _router = VouchServer::new(config_in(&dir)).unwrap().router();
    }
}
