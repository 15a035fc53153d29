/// HTTP endpoint paths served by a signing server.
pub mod endpoints {
    pub const HEALTH: &str = "/api/health";
    pub const PUBLIC_KEY: &str = "/api/crypto/public-key";
    pub const USERS: &str = "/api/users";
    pub const USER: &str = "/api/users/:id";
    pub const EXPORT: &str = "/api/users/export";
    /// Users created per day over the last seven days.
    pub const USER_STATS: &str = "/api/users/graph/last7d";
}

/// Content types of the non-JSON endpoints.
pub mod content_types {
    /// Public key response (PEM text).
    pub const PUBLIC_KEY: &str = "text/plain; charset=utf-8";
    /// Export response (`Batch` bytes).
    pub const EXPORT: &str = "application/octet-stream";
}

/// Health check response.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}
