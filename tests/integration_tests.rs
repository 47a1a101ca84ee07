mod common;

use common::{MockServer, Reply};
use serde_json::json;
use std::process::{Command, Output, Stdio};
use tempfile::{tempdir, TempDir};

fn tixview_binary() -> String {
    env!("CARGO_BIN_EXE_tixview").to_string()
}

/// A command isolated from the caller's credentials and profile file.
fn tixview(profile_dir: &TempDir) -> Command {
    let mut cmd = Command::new(tixview_binary());
    cmd.env_remove("ZCC_SUBDOMAIN")
        .env_remove("ZCC_EMAIL_ADDRESS")
        .env_remove("ZCC_API_KEY")
        .env_remove("TIXVIEW_LOG_LEVEL")
        .env("TIXVIEW_PROFILE_PATH", profile_dir.path().join("profiles.ini"))
        .stdin(Stdio::null());
    cmd
}

fn run_against(server: &MockServer, args: &[&str]) -> Output {
    let dir = tempdir().unwrap();
    tixview(&dir)
        .args(["--base-url", server.base(), "-e", "agent@acme.com", "-t", "secret"])
        .args(args)
        .output()
        .expect("Failed to execute tixview")
}

#[test]
fn test_help_command() {
    let output = Command::new(tixview_binary())
        .arg("--help")
        .output()
        .expect("Failed to execute tixview");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("A terminal viewer for ticketing REST APIs"));
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("--subdomain"));
}

#[test]
fn test_version_command() {
    let output = Command::new(tixview_binary())
        .arg("--version")
        .output()
        .expect("Failed to execute tixview");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tixview"));
}

#[test]
fn test_missing_credentials_without_terminal() {
    let dir = tempdir().unwrap();
    let output = tixview(&dir)
        .arg("all")
        .output()
        .expect("Failed to execute tixview");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Missing subdomain, email, api_token"));
    assert!(stderr.contains("ZCC_API_KEY"));
}

#[test]
fn test_credentials_from_profile_file() {
    let server = MockServer::start(|_| {
        vec![
            Reply::json(200, r#"{"tickets":[],"count":0}"#),
            Reply::json(200, r#"{"ticket":{"id":8,"subject":"From profile"}}"#),
        ]
    });
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("profiles.ini"),
        format!(
            "[work]\nbase_url={}\nemail=agent@acme.com\napi_token=secret\n",
            server.base()
        ),
    )
    .unwrap();

    let output = tixview(&dir)
        .args(["-p", "work", "select", "8"])
        .output()
        .expect("Failed to execute tixview");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Ticket ID: 8\tSubject: From profile"));
}

#[test]
fn test_authentication_failure_exits() {
    let server = MockServer::start(|_| vec![Reply::json(401, r#"{"error":"Couldn't authenticate you"}"#)]);
    let output = run_against(&server, &["all"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Authentication failed, status code: 401"));
    assert_eq!(server.requests().len(), 1);
}

#[test]
fn test_select_prints_ticket() {
    let server = MockServer::start(|_| {
        vec![
            Reply::json(200, r#"{"tickets":[],"count":0}"#),
            Reply::json(
                200,
                &json!({ "ticket": {
                    "id": 5, "subject": "Printer", "description": "It is on fire",
                    "priority": "urgent", "status": "open",
                    "submitter_id": 1, "assignee_id": 2, "organization_id": null
                }})
                .to_string(),
            ),
        ]
    });
    let output = run_against(&server, &["select", "5"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ticket ID: 5\tSubject: Printer"));
    assert!(stdout.contains("Priority: urgent\tStatus: open"));
    assert!(stdout.contains("Organization: None\tSubmitted by: 1\tAssigned to: 2"));
    assert_eq!(server.requests()[1].target, "/api/v2/tickets/5.json");
}

#[test]
fn test_invalid_select_sends_no_ticket_request() {
    let server = MockServer::start(|_| vec![Reply::json(200, r#"{"tickets":[],"count":0}"#)]);
    let output = run_against(&server, &["select", "3A"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ticket_id value is invalid"));
    assert_eq!(server.requests().len(), 1);
}

#[test]
fn test_all_downloads_and_pages() {
    let server = MockServer::start(|base| {
        vec![
            Reply::json(200, r#"{"tickets":[],"count":2}"#),
            Reply::json(
                200,
                &json!({
                    "tickets": [{ "id": 1, "subject": "Alpha" }],
                    "count": 2,
                    "next_page": format!("{base}/api/v2/tickets.json?page=2")
                })
                .to_string(),
            ),
            Reply::json(
                200,
                &json!({ "tickets": [{ "id": 2, "subject": "Beta" }], "count": 2 }).to_string(),
            ),
        ]
    });
    let output = run_against(&server, &["all"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("50.0% downloaded...\r100.0% downloaded...\r"));
    assert!(stdout.contains("Type '<' or '>' to navigate between pages"));
    assert!(stdout.contains("Alpha"));
    assert!(stdout.contains("Beta"));
    assert_eq!(server.requests().len(), 3);
}

#[test]
fn test_unknown_ticket_keeps_stderr_quiet() {
    let server = MockServer::start(|_| {
        vec![
            Reply::json(200, r#"{"tickets":[],"count":0}"#),
            Reply::json(404, r#"{"error":"RecordNotFound","description":"Not found"}"#),
        ]
    });
    let output = run_against(&server, &["select", "999"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("possibly due to invalid ticket_id"));
    assert_eq!(String::from_utf8_lossy(&output.stderr), "");
    assert_eq!(server.requests()[1].target, "/api/v2/tickets/999.json");
}
