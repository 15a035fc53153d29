use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vouch_crypto::DEFAULT_KEY_DIR;

use crate::error::{ServerError, ServerResult};

/// Environment variable overriding [`ServerConfig::bind_addr`].
pub const ENV_BIND_ADDR: &str = "VOUCH_BIND_ADDR";
/// Environment variable overriding [`ServerConfig::key_dir`].
pub const ENV_KEY_DIR: &str = "VOUCH_KEY_DIR";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding `private.pem` and `public.pem`.
    pub key_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 4000)),
            key_dir: PathBuf::from(DEFAULT_KEY_DIR),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Apply `VOUCH_BIND_ADDR` and `VOUCH_KEY_DIR` from the process environment.
    pub fn apply_env(self) -> ServerResult<Self> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> ServerResult<Self> {
        if let Some(addr) = lookup(ENV_BIND_ADDR) {
            self.bind_addr = addr
                .parse()
                .map_err(|e| ServerError::Config(format!("{ENV_BIND_ADDR}={addr}: {e}")))?;
        }
        if let Some(dir) = lookup(ENV_KEY_DIR).filter(|d| !d.is_empty()) {
            self.key_dir = PathBuf::from(dir);
        }
        Ok(self)
    }
}
