//! CLI behavior tests: exit codes, artifacts, boundary inputs.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

const EVENTS_JSON: &str = r#"[
  {
    "testId": "auth-1",
    "title": "logs in with valid credentials",
    "titlePath": ["auth.spec.ts", "Authentication", "logs in with valid credentials"],
    "status": "passed",
    "duration": 1500,
    "annotations": [
      {"type": "epic", "description": "Auth"},
      {"type": "severity", "description": "critical"}
    ],
    "filePath": "tests/auth.spec.ts",
    "line": 12,
    "startTime": "2025-06-01T10:00:00Z"
  },
  {
    "testId": "auth-2",
    "title": "rejects a bad password",
    "titlePath": ["auth.spec.ts", "Authentication", "rejects a bad password"],
    "status": "failed",
    "duration": 900,
    "errors": [{"message": "expected 401, got 200", "stack": "at auth.spec.ts:30:5"}],
    "filePath": "tests/auth.spec.ts",
    "line": 28,
    "startTime": "2025-06-01T10:00:02Z",
    "retry": 1
  },
  {
    "testId": "ids-1",
    "title": "parses identifiers",
    "titlePath": ["ids.spec.ts", "parses identifiers"],
    "status": "passed",
    "duration": 40,
    "annotations": [{"type": "suite", "description": "Atomics"}],
    "filePath": "tests/ids.spec.ts",
    "line": 4,
    "startTime": "2025-06-01T10:00:03Z"
  }
]"#;

fn craft_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_craft-report"))
}

fn write_events(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("events.json");
    fs::write(&path, EVENTS_JSON).unwrap();
    path
}

fn generate_report(dir: &Path) {
    let events = write_events(dir);
    craft_cmd()
        .current_dir(dir)
        .arg("generate")
        .arg(&events)
        .assert()
        .success();
}

#[test]
fn no_args_shows_usage_error() {
    craft_cmd().assert().failure().code(2);
}

#[test]
fn generate_writes_html_and_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    generate_report(dir.path());

    let html_path = dir.path().join("craft-report").join("report.html");
    let json_path = dir.path().join("craft-report").join("report-data.json");
    assert!(html_path.exists());
    assert!(json_path.exists());

    let html = fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("logs in with valid credentials"));
    assert!(html.contains("Craft Test Report"));
    assert!(html.contains("const REPORT_DATA = {"));

    let snapshot: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(snapshot["totalTests"], 3);
    assert_eq!(snapshot["passed"], 2);
    assert_eq!(snapshot["failed"], 1);
    assert_eq!(snapshot["skipped"], 0);
    assert_eq!(snapshot["tests"][1]["retries"], 1);
}

#[test]
fn generate_honors_title_and_out_dir_flags() {
    let dir = tempfile::tempdir().unwrap();
    let events = write_events(dir.path());
    craft_cmd()
        .current_dir(dir.path())
        .arg("generate")
        .arg(&events)
        .arg("--out-dir")
        .arg("nightly")
        .arg("--title")
        .arg("Nightly Regression")
        .assert()
        .success();

    let html = fs::read_to_string(dir.path().join("nightly").join("report.html")).unwrap();
    assert!(html.contains("<title>Nightly Regression</title>"));
}

#[test]
fn generate_picks_up_persisted_comments() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("craft-report");
    fs::create_dir_all(&out_dir).unwrap();
    fs::write(
        out_dir.join("comments.json"),
        r#"{"auth-2": "flaky, see issue 812"}"#,
    )
    .unwrap();

    generate_report(dir.path());

    let snapshot: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out_dir.join("report-data.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(snapshot["comments"]["auth-2"], "flaky, see issue 812");
}

#[test]
fn generate_missing_events_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    craft_cmd()
        .current_dir(dir.path())
        .arg("generate")
        .arg("no-such-events.json")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn info_reports_counts_and_failed_tests() {
    let dir = tempfile::tempdir().unwrap();
    generate_report(dir.path());

    craft_cmd()
        .current_dir(dir.path())
        .arg("info")
        .arg("craft-report/report-data.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total:   3"))
        .stdout(predicate::str::contains("rejects a bad password"));
}

#[test]
fn info_unsupported_extension_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");
    fs::write(&path, "not a report").unwrap();
    craft_cmd()
        .arg("info")
        .arg(&path)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unsupported input"));
}

#[test]
fn merge_comments_overlays_patch() {
    let dir = tempfile::tempdir().unwrap();
    generate_report(dir.path());
    let report_path = dir.path().join("craft-report").join("report-data.json");
    let patch_path = dir.path().join("patch.json");
    fs::write(&patch_path, r#"{"auth-1": "verified manually"}"#).unwrap();

    craft_cmd()
        .arg("merge-comments")
        .arg(&report_path)
        .arg(&patch_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total comments: 1"));

    let merged: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(merged["comments"]["auth-1"], "verified manually");
}

#[test]
fn merge_comments_missing_patch_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    generate_report(dir.path());
    craft_cmd()
        .arg("merge-comments")
        .arg(dir.path().join("craft-report").join("report-data.json"))
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .code(2);
}

#[test]
fn pdf_without_surface_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    generate_report(dir.path());
    craft_cmd()
        .env_remove("CRAFT_REPORT_PRINT_CMD")
        .arg("pdf")
        .arg(dir.path().join("craft-report").join("report.html"))
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("CRAFT_REPORT_PRINT_CMD"));
}

#[test]
fn pdf_unsupported_extension_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.pdf");
    fs::write(&path, "binary").unwrap();
    craft_cmd()
        .env("CRAFT_REPORT_PRINT_CMD", "true")
        .arg("pdf")
        .arg(&path)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unsupported input"));
}

#[test]
fn pdf_runs_the_configured_surface_command() {
    let dir = tempfile::tempdir().unwrap();
    generate_report(dir.path());

    // `true` accepts the document/output/format/orientation arguments and
    // exits zero, which is the completion signal.
    craft_cmd()
        .env("CRAFT_REPORT_PRINT_CMD", "true")
        .arg("pdf")
        .arg(dir.path().join("craft-report").join("report-data.json"))
        .arg("--output")
        .arg(dir.path().join("out.pdf"))
        .assert()
        .success()
        .stdout(predicate::str::contains("PDF generated"));
}

#[test]
fn pdf_surface_failure_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    generate_report(dir.path());
    craft_cmd()
        .env("CRAFT_REPORT_PRINT_CMD", "false")
        .arg("pdf")
        .arg(dir.path().join("craft-report").join("report-data.json"))
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("printable surface"));
}
