//! Login, logout and expiry handling end to end.

mod common;

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{can_bind_localhost, read_session, temp_home, write_session};
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_persists_session_and_whoami_shows_admin_menu() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "admin@forgeguard.io", "password": "s3cret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-admin",
            "user": {"id": "1", "email": "admin@forgeguard.io", "role": "admin", "name": "Root"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("forgeguard")
        .env("FORGEGUARD_HOME", home.path())
        .env("FORGEGUARD_API_URL", server.uri())
        .args(["login", "--email", "admin@forgeguard.io", "--password", "s3cret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as Root (admin)"));

    let session = read_session(home.path());
    assert_eq!(session["auth_token"], "tok-admin");
    assert!(session["auth_user"].as_str().unwrap().contains("admin@forgeguard.io"));

    cargo_bin_cmd!("forgeguard")
        .env("FORGEGUARD_HOME", home.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Role: admin"))
        .stdout(predicate::str::contains("Manage Users"))
        .stdout(predicate::str::contains("Upload & Analyze").not());
}

#[tokio::test]
async fn test_login_reads_password_from_stdin() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "u@forgeguard.io", "password": "piped"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-user",
            "user": {"id": "2", "email": "u@forgeguard.io", "role": "employee"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("forgeguard")
        .env("FORGEGUARD_HOME", home.path())
        .env("FORGEGUARD_API_URL", server.uri())
        .env_remove("FORGEGUARD_PASSWORD")
        .args(["login", "--email", "u@forgeguard.io"])
        .write_stdin("piped\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as u@forgeguard.io (employee)"));
}

#[tokio::test]
async fn test_failed_login_writes_nothing() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})))
        .mount(&server)
        .await;

    cargo_bin_cmd!("forgeguard")
        .env("FORGEGUARD_HOME", home.path())
        .env("FORGEGUARD_API_URL", server.uri())
        .args(["login", "--email", "a@b.com", "--password", "x"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Invalid credentials"));

    assert!(!home.path().join("session.json").exists());
}

#[tokio::test]
async fn test_logout_clears_session_when_backend_fails() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    write_session(home.path(), "tok", r#"{"id":"2","email":"u@b.com","role":"user"}"#);
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("forgeguard")
        .env("FORGEGUARD_HOME", home.path())
        .env("FORGEGUARD_API_URL", server.uri())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));

    let session = read_session(home.path());
    assert!(session.get("auth_token").is_none());
    assert!(session.get("auth_user").is_none());
}

#[tokio::test]
async fn test_expired_session_exits_with_code_2() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    write_session(home.path(), "stale", r#"{"id":"2","email":"u@b.com","role":"user"}"#);
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/images"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    cargo_bin_cmd!("forgeguard")
        .env("FORGEGUARD_HOME", home.path())
        .env("FORGEGUARD_API_URL", server.uri())
        .args(["images", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Session expired"));

    let session = read_session(home.path());
    assert!(session.get("auth_token").is_none());

    cargo_bin_cmd!("forgeguard")
        .env("FORGEGUARD_HOME", home.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in."));
}

#[test]
fn test_commands_require_login() {
    let home = temp_home();

    cargo_bin_cmd!("forgeguard")
        .env("FORGEGUARD_HOME", home.path())
        .env("FORGEGUARD_API_URL", "http://127.0.0.1:9")
        .args(["images", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_corrupt_session_is_cleared() {
    let home = temp_home();
    write_session(home.path(), "tok", "{not json");

    cargo_bin_cmd!("forgeguard")
        .env("FORGEGUARD_HOME", home.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in."));

    let contents = fs::read_to_string(home.path().join("session.json")).unwrap();
    assert!(!contents.contains("auth_token"));
}
