//! CLI tests against a mock Salt API.
//!
//! Each test starts a wiremock server, runs the `saltctl` binary against it
//! and keeps the token cache in a temporary directory.

use std::process::Output;

use serde_json::json;
use tempfile::TempDir;
use tokio::process::Command;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Run the CLI binary against `server` with the given arguments.
async fn run_cli(server: &MockServer, cache: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_saltctl"))
        .args(["--address", &server.uri()])
        .args(["--username", "admin"])
        .args(["--token", "sa-token"])
        .arg("--cache-dir")
        .arg(cache.path())
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("SALT_API_TOKEN_TYPE")
        .env("NO_COLOR", "1")
        .output()
        .await
        .expect("Failed to execute CLI")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

async fn mount_login(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({
            "eauth": "kubernetes_rbac",
            "username": "admin",
            "token": "sa-token",
            "token_type": "Bearer"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return": [{
                "token": "session-1",
                "expire": 1999999999.0,
                "user": "admin",
                "perms": [".*"]
            }]
        })))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_then_ping_reuses_cached_token() {
    let server = MockServer::start().await;
    let cache = tempfile::tempdir().unwrap();

    mount_login(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-auth-token", "session-1"))
        .and(body_json(json!({"client": "local", "tgt": "*", "fun": "test.ping"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return": [{"bootstrap": true}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let login = run_cli(&server, &cache, &["login"]).await;
    assert!(login.status.success(), "stderr: {}", stderr(&login));
    assert!(stdout(&login).contains("Logged in successfully"));
    assert!(cache.path().join("session.json").exists());

    let ping = run_cli(&server, &cache, &["ping"]).await;
    assert!(ping.status.success(), "stderr: {}", stderr(&ping));
    assert!(stdout(&ping).contains("bootstrap"));
}

#[tokio::test]
async fn test_ping_fails_when_a_minion_does_not_answer() {
    let server = MockServer::start().await;
    let cache = tempfile::tempdir().unwrap();

    mount_login(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return": [{"node-1": true, "node-2": false}]
        })))
        .mount(&server)
        .await;

    let ping = run_cli(&server, &cache, &["ping"]).await;
    assert!(!ping.status.success());
    assert!(stderr(&ping).contains("1 minion(s) did not answer"));
}

#[tokio::test]
async fn test_call_prints_result_as_json() {
    let server = MockServer::start().await;
    let cache = tempfile::tempdir().unwrap();

    mount_login(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_json(json!({
            "client": "local",
            "tgt": "node-1",
            "fun": "grains.item",
            "arg": ["os_family"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "return": [{"node-1": {"os_family": "RedHat"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let call = run_cli(
        &server,
        &cache,
        &["call", "grains.item", "--tgt", "node-1", "--arg", "os_family"],
    )
    .await;
    assert!(call.status.success(), "stderr: {}", stderr(&call));

    let printed: serde_json::Value = serde_json::from_str(stdout(&call).trim()).unwrap();
    assert_eq!(printed, json!({"node-1": {"os_family": "RedHat"}}));
}

#[tokio::test]
async fn test_call_reports_error_page() {
    let server = MockServer::start().await;
    let cache = tempfile::tempdir().unwrap();

    mount_login(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string("<html>Internal Server Error</html>"),
        )
        .mount(&server)
        .await;

    let call = run_cli(&server, &cache, &["call", "test.ping"]).await;
    assert!(!call.status.success());
    let err = stderr(&call);
    assert!(err.contains("500"));
    assert!(err.contains("<html>Internal Server Error</html>"));
}

#[tokio::test]
async fn test_logout_removes_cached_session() {
    let server = MockServer::start().await;
    let cache = tempfile::tempdir().unwrap();

    mount_login(&server, 1).await;

    let login = run_cli(&server, &cache, &["login"]).await;
    assert!(login.status.success(), "stderr: {}", stderr(&login));

    let logout = run_cli(&server, &cache, &["logout"]).await;
    assert!(logout.status.success());
    assert!(!cache.path().join("session.json").exists());
}

#[tokio::test]
async fn test_logout_without_cache_leaves_disk_alone() {
    let cache = tempfile::tempdir().unwrap();
    let dir = cache.path().join("never-created");

    let output = Command::new(env!("CARGO_BIN_EXE_saltctl"))
        .arg("--cache-dir")
        .arg(&dir)
        .arg("--no-cache")
        .arg("logout")
        .env("NO_COLOR", "1")
        .output()
        .await
        .expect("Failed to execute CLI");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!dir.exists());
}

#[tokio::test]
async fn test_missing_username_is_reported() {
    let cache = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_saltctl"))
        .args(["--address", "http://127.0.0.1:1"])
        .arg("--cache-dir")
        .arg(cache.path())
        .arg("ping")
        .env_remove("SALT_API_USERNAME")
        .env_remove("SALT_API_TOKEN")
        .output()
        .await
        .expect("Failed to execute CLI");

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Missing --username"));
}
