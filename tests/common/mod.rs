#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chess_tournament_api::api::Event;
use chess_tournament_api::database::models::UserRecord;
use chess_tournament_api::database::Store;
use chess_tournament_api::handlers::Function;
use chess_tournament_api::testing::MemoryStore;
use chess_tournament_api::types::Role;
use reqwest::StatusCode;
use serde_json::Value;

pub const PASSWORD: &str = "secret1";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Cargo builds the server binary for integration tests and tells us where it is
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_chess-tournament-api"));
        cmd.env("API_PORT", port.to_string())
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Without a database the server still answers 503 from /health
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Spawn a server owned by the caller; it is killed when the handle drops
pub async fn spawn_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

// In-process helpers: drive a function against any store

/// Invoke a function and decode its status and JSON body (null when empty)
pub async fn call(function: Function, store: &dyn Store, event: Event) -> Result<(u16, Value)> {
    let response = function.handle(store, event).await;
    let body = response.json().context("response body is not JSON")?;
    Ok((response.status_code, body))
}

pub fn post(body: Value) -> Event {
    Event::new("POST", "/").with_json(body)
}

/// Seed a user with [`PASSWORD`] and a live session; returns the user and token
pub fn signed_in(store: &MemoryStore, username: &str, role: Role) -> (UserRecord, String) {
    let user = store.seed_user(username, PASSWORD, role);
    let token = store.seed_session(user.id, chrono::Duration::hours(1));
    (user, token)
}

pub fn date(s: &str) -> chrono::NaiveDate {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("test date")
}
