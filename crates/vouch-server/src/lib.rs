//! HTTP server for vouch.
//!
//! Stores user records sealed with the server's Ed25519 key, publishes the
//! public key, and exports all records as a protobuf batch that consumers
//! re-verify on their side.

pub mod config;
pub mod error;
pub mod handler;
pub mod response;
pub mod router;
pub mod server;
pub mod service;
pub mod state;
pub mod stats;
pub mod store;

pub use config::ServerConfig;
pub use error::{ApiError, ServerError, ServerResult};
pub use response::{Envelope, ErrorBody, Meta};
pub use server::VouchServer;
pub use service::UserService;
pub use state::AppState;
pub use stats::{DayCount, GRAPH_DAYS};
pub use store::{InMemoryUserStore, UserStore};

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;
    use vouch_protocol::content_types;

    struct App {
        _dir: tempfile::TempDir,
        router: Router,
    }

    impl App {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let config = ServerConfig {
                key_dir: dir.path().join("keys"),
                ..ServerConfig::default()
            };
            let router = VouchServer::new(config).unwrap().router();
            Self { _dir: dir, router }
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let content_type = response
                .headers()
                .get(header::CONTENT_TYPE)
                .map(|v| v.to_str().unwrap().to_string());
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, content_type, bytes.to_vec())
        }

        async fn get(&self, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
            self.send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
        }

        async fn json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            let (status, _, bytes) = self.send(request).await;
            (status, serde_json::from_slice(&bytes).unwrap())
        }

        async fn create(&self, email: &str) -> Value {
            let (status, body) = self.json("POST", "/api/users", json!({ "email": email })).await;
            assert_eq!(status, StatusCode::CREATED);
            body["data"].clone()
        }

        async fn public_key(&self) -> String {
            String::from_utf8(self.get("/api/crypto/public-key").await.2).unwrap()
        }
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = App::new();
        let (status, _, body) = app.get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn public_key_is_plain_pem() {
        let app = App::new();
        let (status, content_type, body) = app.get("/api/crypto/public-key").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some(content_types::PUBLIC_KEY));
        let pem = String::from_utf8(body).unwrap();
        assert!(pem.starts_with("-----BEGIN PUBLIC KEY-----"));
    }

    #[tokio::test]
    async fn create_returns_sealed_record() {
        let app = App::new();
        let user = app.create(" Alice@Example.com ").await;
        assert_eq!(user["email"], "alice@example.com");
        assert_eq!(user["role"], "user");
        assert_eq!(user["status"], "active");
        assert_eq!(user["emailHash"].as_str().unwrap().len(), 96);
        assert!(user["createdAt"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn duplicate_email_is_409_envelope() {
        let app = App::new();
        app.create("bob@example.com").await;
        let (status, body) = app.json("POST", "/api/users", json!({ "email": "BOB@example.com" })).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "CONFLICT");
        assert_eq!(body["meta"]["path"], "/api/users");
    }

    #[tokio::test]
    async fn invalid_input_is_400() {
        let app = App::new();
        let (status, body) = app.json("POST", "/api/users", json!({ "email": "nope" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");

        let (status, _) = app.json("POST", "/api/users", json!({ "email": "a@example.com", "role": "root" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app.json("POST", "/api/users", json!({ "role": "user" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_id_is_400_and_unknown_id_is_404() {
        let app = App::new();
        let (status, body) = app.json("PATCH", "/api/users/not-a-uuid", json!({ "role": "admin" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["meta"]["path"], "/api/users/not-a-uuid");

        let missing = format!("/api/users/{}", uuid::Uuid::new_v4());
        let (status, body) = app.json("PATCH", &missing, json!({ "role": "admin" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn patch_email_reseals() {
        let app = App::new();
        let user = app.create("old@example.com").await;
        let uri = format!("/api/users/{}", user["id"].as_str().unwrap());

        let (status, body) = app.json("PATCH", &uri, json!({ "email": "new@example.com" })).await;
        assert_eq!(status, StatusCode::OK);
        let updated = &body["data"];
        assert_eq!(updated["email"], "new@example.com");
        assert_ne!(updated["emailHash"], user["emailHash"]);
        assert_ne!(updated["signature"], user["signature"]);

        let (status, body) = app.json("PATCH", &uri, json!({ "status": "inactive" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["signature"], updated["signature"]);
    }

    #[tokio::test]
    async fn delete_then_list() {
        let app = App::new();
        let user = app.create("gone@example.com").await;
        app.create("kept@example.com").await;
        let uri = format!("/api/users/{}", user["id"].as_str().unwrap());

        let request = Request::builder().method("DELETE").uri(&uri).body(Body::empty()).unwrap();
        let (status, _, _) = app.send(request).await;
        assert_eq!(status, StatusCode::OK);

        let (_, _, body) = app.get("/api/users").await;
        let body: Value = serde_json::from_slice(&body).unwrap();
        let emails: Vec<&str> = body["data"].as_array().unwrap().iter().map(|u| u["email"].as_str().unwrap()).collect();
        assert_eq!(emails, vec!["kept@example.com"]);
    }

    #[tokio::test]
    async fn unknown_route_is_enveloped_404() {
        let app = App::new();
        let (status, _, body) = app.get("/api/nothing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn export_verifies_on_consumer_side() {
        let app = App::new();
        for email in ["a@example.com", "b@example.com", "c@example.com"] {
            app.create(email).await;
        }
        let (status, content_type, batch) = app.get("/api/users/export").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some(content_types::EXPORT));

        let trusted = vouch_verify::trusted_set(batch, &app.public_key().await).unwrap();
        assert_eq!(trusted.len(), 3);
        assert!(trusted.rejected().is_empty());
    }

    #[tokio::test]
    async fn user_graph_covers_last_week() {
        let app = App::new();
        app.create("a@example.com").await;
        app.create("b@example.com").await;

        let (status, _, body) = app.get("/api/users/graph/last7d").await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        let days = body["data"].as_array().unwrap();
        assert_eq!(days.len(), 7);
        let today = chrono::Utc::now().date_naive().to_string();
        assert_eq!(days[6]["day"], today.as_str());
        assert_eq!(days[6]["count"], 2);
        assert_eq!(days[0]["count"], 0);
    }

    #[tokio::test]
    async fn export_from_other_server_is_untrusted() {
        let a = App::new();
        let b = App::new();
        a.create("a@example.com").await;
        let (_, _, batch) = a.get("/api/users/export").await;
        let trusted = vouch_verify::trusted_set(batch, &b.public_key().await).unwrap();
        assert!(trusted.is_empty());
        assert_eq!(trusted.total(), 1);
    }
}
