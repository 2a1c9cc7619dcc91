#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::{json, Value};

use portfolio_api::auth::{generate_jwt, Claims};
use portfolio_api::store::MemoryStore;
use portfolio_api::{app, AppConfig, AppState};

pub const JWT_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register a fresh user and sign in, returning the bearer token
    pub async fn token(&self) -> Result<String> {
        let email = format!("admin.{}@example.com", uuid::Uuid::new_v4().simple());
        let res = self
            .client
            .post(self.url("/api/users"))
            .json(&json!({
                "firstname": "Admin",
                "lastname": "User",
                "email": email,
                "password": "pass"
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "sign-up failed: {}", res.status());

        let res = self
            .client
            .post(self.url("/api/auth/signin"))
            .json(&json!({ "email": email, "password": "pass" }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "sign-in failed: {}", res.status());

        let body = res.json::<Value>().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("sign-in response has no token")
    }
}

/// Start the application on a free port with an empty in-memory store.
///
/// Each test gets its own server; it stops with the test's runtime.
pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(AppConfig::development(JWT_SECRET)).await
}

/// Same as [`spawn_server`] with an adjusted configuration
pub async fn spawn_server_with(config: AppConfig) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let state = AppState::new(config, Arc::new(MemoryStore::new()));
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app(state)).await {
            eprintln!("test server error: {}", e);
        }
    });

    Ok(TestServer {
        port,
        base_url,
        client: reqwest::Client::new(),
    })
}

/// A correctly signed token whose expiry is an hour in the past
pub fn expired_token() -> String {
    let mut claims =
        Claims::new("expired-user", "old@example.com", "Old", "Token", 24).expect("failed to build claims");
    claims.iat = Utc::now().timestamp() - 25 * 3600;
    claims.exp = Utc::now().timestamp() - 3600;
    generate_jwt(&claims, JWT_SECRET).expect("failed to sign expired token")
}

/// Assert the uniform error envelope and return its message
pub async fn error_message(res: reqwest::Response, expected: StatusCode) -> Result<String> {
    let status = res.status();
    let body = res.json::<Value>().await?;
    assert_eq!(status, expected, "unexpected status, body: {}", body);
    assert_eq!(body["success"], false, "missing success=false: {}", body);
    assert_eq!(body["status"], expected.as_u16(), "status field mismatch: {}", body);
    body["message"]
        .as_str()
        .map(str::to_string)
        .context("error envelope has no message")
}
