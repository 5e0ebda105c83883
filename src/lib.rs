//! Craft Report: test report aggregation and presentation
//!
//! This library turns per-test completion events from an external test
//! runner into a durable report snapshot, an interactive review surface,
//! and a deterministic print/export rendering of the same data.

pub mod collector;
pub mod config;
pub mod export;
pub mod filter;
pub mod metadata;
pub mod render;
pub mod report;
pub mod template;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Outcome of a single test execution as reported by the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestStatus {
    Passed,
    Failed,
    TimedOut,
    Skipped,
    Interrupted,
}

impl TestStatus {
    /// Timeouts count as failures in every aggregate view
    pub fn is_failure(&self) -> bool {
        matches!(self, TestStatus::Failed | TestStatus::TimedOut)
    }

    /// Wire/CSS name for the status (camelCase, matching the snapshot format)
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::TimedOut => "timedOut",
            TestStatus::Skipped => "skipped",
            TestStatus::Interrupted => "interrupted",
        }
    }

    /// Parse a status filter value; `None` for unknown strings
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "passed" => Some(TestStatus::Passed),
            "failed" => Some(TestStatus::Failed),
            "timedOut" => Some(TestStatus::TimedOut),
            "skipped" => Some(TestStatus::Skipped),
            "interrupted" => Some(TestStatus::Interrupted),
            _ => None,
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Criticality label from the closed severity vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Blocker,
    Critical,
    Normal,
    Minor,
    Trivial,
}

impl Severity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "blocker" => Some(Severity::Blocker),
            "critical" => Some(Severity::Critical),
            "normal" => Some(Severity::Normal),
            "minor" => Some(Severity::Minor),
            "trivial" => Some(Severity::Trivial),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Blocker => "blocker",
            Severity::Critical => "critical",
            Severity::Normal => "normal",
            Severity::Minor => "minor",
            Severity::Trivial => "trivial",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured metadata extracted from a test's annotations and title path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_suite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_suite: Option<String>,
    /// Free-form tags in annotation order; duplicates preserved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unrecognized annotation types, last value wins
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

/// One test in the assembled report. Identity is `test_id`, unique within a
/// run after retry collapse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestEntry {
    pub test_id: String,
    pub name: String,
    pub full_title: String,
    pub status: TestStatus,
    /// Milliseconds
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_trace: Option<String>,
    pub metadata: TestMetadata,
    pub file_path: String,
    pub line: usize,
    /// RFC3339 instant of the (last) execution start
    pub start_time: String,
    pub retries: u32,
}

/// Mapping from test identifier to a non-empty comment
pub type CommentMap = BTreeMap<String, String>;

/// The assembled report snapshot. Immutable after assembly; the only
/// sanctioned mutation is the comment merge, which produces a new snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    /// RFC3339 creation instant
    pub timestamp: String,
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Wall-clock run duration in milliseconds (not the per-test sum)
    pub duration: u64,
    pub tests: Vec<TestEntry>,
    #[serde(default)]
    pub comments: CommentMap,
}

/// Failures the pipeline surfaces to callers. Cosmetic and optional inputs
/// (comments file, stylesheet, script, logo) never reach this type; they
/// degrade to defaults instead.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("file not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("unsupported input: {} (expected .html or .json)", .0.display())]
    UnsupportedInput(PathBuf),
    #[error("invalid report snapshot: {0}")]
    InvalidReport(String),
    #[error("malformed JSON in {}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("an export is already in progress")]
    ExportInProgress,
    #[error("no printable surface is configured (set CRAFT_REPORT_PRINT_CMD)")]
    NoSurface,
    #[error("printable surface failed: {0}")]
    Surface(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_camel_case() {
        assert_eq!(
            serde_json::to_string(&TestStatus::TimedOut).unwrap(),
            "\"timedOut\""
        );
        assert_eq!(
            serde_json::from_str::<TestStatus>("\"passed\"").unwrap(),
            TestStatus::Passed
        );
    }

    #[test]
    fn timed_out_is_a_failure() {
        assert!(TestStatus::TimedOut.is_failure());
        assert!(TestStatus::Failed.is_failure());
        assert!(!TestStatus::Passed.is_failure());
        assert!(!TestStatus::Skipped.is_failure());
    }

    #[test]
    fn severity_parse_is_case_insensitive() {
        assert_eq!(Severity::parse("Critical"), Some(Severity::Critical));
        assert_eq!(Severity::parse("BLOCKER"), Some(Severity::Blocker));
        assert_eq!(Severity::parse("urgent"), None);
        assert_eq!(Severity::parse(""), None);
    }

    #[test]
    fn metadata_skips_empty_fields_in_json() {
        let metadata = TestMetadata::default();
        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn entry_round_trips_through_json() {
        let entry = TestEntry {
            test_id: "t-1".into(),
            name: "logs in".into(),
            full_title: "auth.spec.ts > Authentication > logs in".into(),
            status: TestStatus::Passed,
            duration: 312,
            error_trace: None,
            metadata: TestMetadata {
                epic: Some("Auth".into()),
                ..TestMetadata::default()
            },
            file_path: "tests/auth.spec.ts".into(),
            line: 12,
            start_time: "2025-06-01T10:00:00Z".into(),
            retries: 0,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"testId\":\"t-1\""));
        assert!(json.contains("\"fullTitle\""));
        assert!(!json.contains("errorTrace"), "unset trace must be omitted");
        let back: TestEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
