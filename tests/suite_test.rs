//! Integration tests for suite files: parsing, validation, and running
//! command checks end to end.

use tempfile::tempdir;

use soundcheck::config::{SuiteError, SuiteFile};
use soundcheck::{TestRunner, TestStatus};

const SMOKE_SUITE: &str = r#"
version: "1"
name: local smoke
defaults:
  timeout_ms: 5000
  max_concurrent: 2
checks:
  - id: shell-ok
    name: shell exits cleanly
    kind: command
    command: ["sh", "-c", "echo all good"]
  - id: shell-broken
    kind: command
    command: ["sh", "-c", "echo went wrong >&2; exit 7"]
    retries: 1
"#;

fn write_suite(content: &str, file_name: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join(file_name);
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

#[test]
fn load_yaml_suite() {
    let (_dir, path) = write_suite(SMOKE_SUITE, "smoke.yaml");
    let suite = SuiteFile::load(&path).unwrap();

    assert_eq!(suite.name.as_deref(), Some("local smoke"));
    assert_eq!(suite.checks.len(), 2);
    assert_eq!(suite.checks[0].display_name(), "shell exits cleanly");
    assert_eq!(suite.checks[1].display_name(), "shell-broken");
    assert_eq!(suite.runner_config().max_concurrency, 2);
}

#[test]
fn load_json_suite() {
    let json = r#"{
        "version": "1",
        "checks": [
            {"id": "web", "kind": "http", "url": "http://localhost/health"}
        ]
    }"#;
    let (_dir, path) = write_suite(json, "suite.json");
    let suite = SuiteFile::load(&path).unwrap();

    assert_eq!(suite.checks.len(), 1);
    assert_eq!(suite.checks[0].kind.label(), "http");
}

#[test]
fn load_rejects_invalid_url() {
    let bad = r#"
version: "1"
checks:
  - id: web
    kind: http
    url: not-a-url
"#;
    let (_dir, path) = write_suite(bad, "bad.yaml");
    let err = SuiteFile::load(&path).unwrap_err();
    let suite_err = err.downcast_ref::<SuiteError>().unwrap();
    assert!(matches!(suite_err, SuiteError::InvalidCheck { id, .. } if id == "web"));
}

#[test]
fn load_rejects_empty_command() {
    let bad = r#"
version: "1"
checks:
  - id: noop
    kind: command
    command: []
"#;
    let (_dir, path) = write_suite(bad, "bad.yaml");
    assert!(SuiteFile::load(&path).is_err());
}

#[tokio::test]
async fn run_command_suite_end_to_end() {
    let (_dir, path) = write_suite(SMOKE_SUITE, "smoke.yaml");
    let suite = SuiteFile::load(&path).unwrap();

    let runner = TestRunner::new(suite.runner_config());
    let cases = suite.into_cases().unwrap();
    let results = runner.run_tests(cases, None).await;

    assert_eq!(results.len(), 2);

    let ok = results.iter().find(|r| r.test_id == "shell-ok").unwrap();
    assert_eq!(ok.status, TestStatus::Passed);
    assert!(ok
        .logs
        .iter()
        .any(|e| e.message.contains("stdout: all good")));

    let broken = results.iter().find(|r| r.test_id == "shell-broken").unwrap();
    assert_eq!(broken.status, TestStatus::Failed);
    assert_eq!(broken.retry_count, 1);
    let error = broken.error.as_ref().unwrap();
    assert!(error.message.contains("exit code"));
    assert!(error.message.contains("went wrong"));
}

#[tokio::test]
async fn command_check_expected_exit_code() {
    let yaml = r#"
version: "1"
checks:
  - id: expected-failure
    kind: command
    command: ["sh", "-c", "exit 3"]
    expect_exit: 3
"#;
    let (_dir, path) = write_suite(yaml, "exit.yaml");
    let suite = SuiteFile::load(&path).unwrap();

    let results = TestRunner::default()
        .run_tests(suite.into_cases().unwrap(), None)
        .await;

    assert_eq!(results[0].status, TestStatus::Passed);
}
