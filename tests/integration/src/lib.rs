//! Integration tests for the Bankly server.
//!
//! These tests spawn the built server binary on a scratch database and
//! exercise the HTTP API end to end: registration, login, the auth gates,
//! and the user lifecycle.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

use std::process::{Child, Command, Stdio};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use tempfile::TempDir;

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub admin: bool,
}

impl RegisterRequest {
    pub fn new(username: &str, admin: bool) -> Self {
        Self {
            username: username.to_string(),
            password: "password".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: format!("{username}@example.com"),
            phone: "1234567890".to_string(),
            admin,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// ============================================================================
// Test Server
// ============================================================================

/// A test server instance that manages its own data directory and process.
pub struct TestServer {
    process: Child,
    pub base_url: String,
    pub port: u16,
    _data_dir: TempDir,
}

impl TestServer {
    /// Start a new test server on the specified port.
    pub async fn start(port: u16) -> Result<Self> {
        let data_dir = TempDir::new().context("Failed to create temp dir")?;

        // Find the server binary
        let server_binary = find_server_binary()?;

        let process = Command::new(&server_binary)
            .arg("--data-dir")
            .arg(data_dir.path())
            .arg("--bind")
            .arg(format!("127.0.0.1:{}", port))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start server: {:?}", server_binary))?;

        let base_url = format!("http://127.0.0.1:{}", port);

        let server = Self {
            process,
            base_url,
            port,
            _data_dir: data_dir,
        };

        // Wait for server to be ready
        server.wait_for_ready().await?;

        Ok(server)
    }

    /// Wait for the server to be ready to accept connections.
    async fn wait_for_ready(&self) -> Result<()> {
        let client = Client::new();
        let url = format!("{}/health", self.base_url);

        for _ in 0..50 {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                _ => tokio::time::sleep(Duration::from_millis(100)).await,
            }
        }

        bail!("Server failed to start within 5 seconds")
    }

    /// Get a configured HTTP client for this server.
    pub fn client(&self) -> BanklyClient {
        BanklyClient::new(&self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

/// Find the server binary in the target directory.
fn find_server_binary() -> Result<std::path::PathBuf> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());

    // Try debug build first, then release
    let candidates = [
        std::path::Path::new(&manifest_dir).join("../../target/debug/bankly-server"),
        std::path::Path::new(&manifest_dir).join("../../target/debug/bankly-server.exe"),
        std::path::Path::new(&manifest_dir).join("../../target/release/bankly-server"),
        std::path::Path::new(&manifest_dir).join("../../target/release/bankly-server.exe"),
    ];

    for candidate in &candidates {
        if candidate.exists() {
            return Ok(candidate.canonicalize()?);
        }
    }

    bail!(
        "Could not find bankly-server binary. Run 'cargo build -p bankly-server' first. Searched in: {:?}",
        candidates
    )
}

// ============================================================================
// Test Client
// ============================================================================

/// HTTP client for testing the Bankly API.
///
/// The token travels the way the identity stage reads it: as a `_token`
/// query parameter on GET/DELETE and as a `_token` body field on PATCH.
pub struct BanklyClient {
    client: Client,
    base_url: String,
}

impl BanklyClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<Value> {
        let resp = self.client.get(self.url("/health")).send().await?;
        Ok(resp.json().await?)
    }

    /// Registers a user and returns the issued token.
    pub async fn register(&self, req: &RegisterRequest) -> Result<String> {
        let resp = self.register_raw(req).await?;
        if !resp.status().is_success() {
            bail!("Register failed: {}", resp.text().await?);
        }
        let body: Value = resp.json().await?;
        body["token"]
            .as_str()
            .map(String::from)
            .context("register response missing token")
    }

    pub async fn register_raw(&self, req: &RegisterRequest) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/auth/register"))
            .json(req)
            .send()
            .await?)
    }

    /// Logs in and returns the issued token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let resp = self.login_raw(username, password).await?;
        if !resp.status().is_success() {
            bail!("Login failed: {}", resp.text().await?);
        }
        let body: Value = resp.json().await?;
        body["token"]
            .as_str()
            .map(String::from)
            .context("login response missing token")
    }

    pub async fn login_raw(&self, username: &str, password: &str) -> Result<Response> {
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        Ok(self
            .client
            .post(self.url("/auth/login"))
            .json(&req)
            .send()
            .await?)
    }

    pub async fn list_users(&self, token: Option<&str>) -> Result<Response> {
        let path = match token {
            Some(token) => format!("/users?_token={token}"),
            None => "/users".to_string(),
        };
        Ok(self.client.get(self.url(&path)).send().await?)
    }

    pub async fn get_user(&self, token: &str, username: &str) -> Result<Response> {
        let path = format!("/users/{username}?_token={token}");
        Ok(self.client.get(self.url(&path)).send().await?)
    }

    pub async fn patch_user(&self, token: &str, username: &str, fields: Value) -> Result<Response> {
        let mut body = fields;
        body["_token"] = Value::String(token.to_string());
        Ok(self
            .client
            .patch(self.url(&format!("/users/{username}")))
            .json(&body)
            .send()
            .await?)
    }

    pub async fn delete_user(&self, token: &str, username: &str) -> Result<Response> {
        let path = format!("/users/{username}?_token={token}");
        Ok(self.client.delete(self.url(&path)).send().await?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU16, Ordering};

    // Port counter to avoid conflicts between parallel tests
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(13300);

    fn next_port() -> u16 {
        PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_server_health() {
        let server = TestServer::start(next_port()).await.unwrap();
        let client = server.client();

        let health = client.health().await.unwrap();

        assert_eq!(health["status"], "ok");
    }

    #[tokio::test]
    async fn test_register_login_and_list() {
        let server = TestServer::start(next_port()).await.unwrap();
        let client = server.client();

        let token = client
            .register(&RegisterRequest::new("alice", false))
            .await
            .unwrap();
        assert!(!token.is_empty());

        // A fresh token via login works the same
        let token = client.login("alice", "password").await.unwrap();

        let resp = client.list_users(Some(&token)).await.unwrap();
        assert!(resp.status().is_success());

        let body: Value = resp.json().await.unwrap();
        let users = body["users"].as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["username"], "alice");
        assert!(users[0].get("password").is_none(), "hash must not leak");
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let server = TestServer::start(next_port()).await.unwrap();
        let client = server.client();

        client
            .register(&RegisterRequest::new("alice", false))
            .await
            .unwrap();

        let resp = client.login_raw("alice", "wrong").await.unwrap();
        assert_eq!(resp.status().as_u16(), 401);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["message"], "Cannot authenticate");
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let server = TestServer::start(next_port()).await.unwrap();
        let client = server.client();

        let req = RegisterRequest::new("alice", false);
        client.register(&req).await.unwrap();

        let resp = client.register_raw(&req).await.unwrap();
        assert_eq!(resp.status().as_u16(), 409);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(
            body["message"],
            "There already exists a user with username 'alice'"
        );
    }

    #[tokio::test]
    async fn test_authentication_required() {
        let server = TestServer::start(next_port()).await.unwrap();
        let client = server.client();

        let resp = client.list_users(None).await.unwrap();
        assert_eq!(resp.status().as_u16(), 401);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Not authenticated" }));
    }

    #[tokio::test]
    async fn test_invalid_token_rejected() {
        let server = TestServer::start(next_port()).await.unwrap();
        let client = server.client();

        let resp = client.list_users(Some("invalid-token")).await.unwrap();
        assert_eq!(resp.status().as_u16(), 401);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["message"], "Failed to decode token");
    }

    #[tokio::test]
    async fn test_non_admin_cannot_delete() {
        let server = TestServer::start(next_port()).await.unwrap();
        let client = server.client();

        let alice = client
            .register(&RegisterRequest::new("alice", false))
            .await
            .unwrap();
        client
            .register(&RegisterRequest::new("bob", false))
            .await
            .unwrap();

        let resp = client.delete_user(&alice, "bob").await.unwrap();
        assert_eq!(resp.status().as_u16(), 401);

        // The admin gate rejects through the error channel
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({ "status": 401, "message": "Unauthorized" }));
    }

    #[tokio::test]
    async fn test_complete_user_lifecycle() {
        let server = TestServer::start(next_port()).await.unwrap();
        let client = server.client();

        // 1. Register an admin and a regular user
        let root = client
            .register(&RegisterRequest::new("root", true))
            .await
            .unwrap();
        let alice = client
            .register(&RegisterRequest::new("alice", false))
            .await
            .unwrap();

        // 2. Fetch the regular user
        let resp = client.get_user(&alice, "alice").await.unwrap();
        assert!(resp.status().is_success());
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["user"]["email"], "alice@example.com");

        // 3. Users can update themselves
        let resp = client
            .patch_user(&alice, "alice", json!({ "first_name": "Alicia" }))
            .await
            .unwrap();
        assert!(resp.status().is_success());
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["user"]["first_name"], "Alicia");

        // 4. Admins can update anyone
        let resp = client
            .patch_user(&root, "alice", json!({ "phone": "0987654321" }))
            .await
            .unwrap();
        assert!(resp.status().is_success());

        // 5. Non-admins cannot update others
        let resp = client
            .patch_user(&alice, "root", json!({ "first_name": "Nope" }))
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 401);

        // 6. Admin deletes the user
        let resp = client.delete_user(&root, "alice").await.unwrap();
        assert!(resp.status().is_success());
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["message"], "User deleted");

        // 7. The user is gone
        let resp = client.get_user(&root, "alice").await.unwrap();
        assert_eq!(resp.status().as_u16(), 404);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["message"], "No such user");

        // 8. Deleting again reports not found
        let resp = client.delete_user(&root, "alice").await.unwrap();
        assert_eq!(resp.status().as_u16(), 404);
    }
}
