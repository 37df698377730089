//! Shared helpers for CLI integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// Creates a temp FORGEGUARD_HOME directory for test isolation.
pub fn temp_home() -> TempDir {
    TempDir::new().expect("create temp forgeguard home")
}

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Writes a persisted session the way the client stores it.
pub fn write_session(home: &Path, token: &str, user_json: &str) {
    let entries = serde_json::json!({
        "auth_token": token,
        "auth_user": user_json,
    });
    fs::write(
        home.join("session.json"),
        serde_json::to_string_pretty(&entries).unwrap(),
    )
    .unwrap();
}

pub fn read_session(home: &Path) -> serde_json::Value {
    let contents = fs::read_to_string(home.join("session.json")).unwrap_or_default();
    serde_json::from_str(&contents).unwrap_or_else(|_| serde_json::json!({}))
}

pub const USER_SESSION: &str = r#"{"id":"2","email":"u@b.com","role":"user"}"#;
