//! Report assembly and the persisted snapshot/comment stores
//!
//! The snapshot is written once per run as `report-data.json`; comments
//! live beside it in `comments.json` so they survive re-runs. A missing or
//! corrupt comments file is never an error.

use crate::{CommentMap, ReportData, ReportError, TestEntry, TestStatus};
use std::fs;
use std::path::{Path, PathBuf};

pub const REPORT_DATA_FILENAME: &str = "report-data.json";
pub const COMMENTS_FILENAME: &str = "comments.json";

/// Assemble the immutable snapshot for one finished run.
///
/// `duration` is the run's wall-clock time; per-entry durations are summed
/// separately at presentation time. Skipped absorbs everything that neither
/// passed nor failed (including interrupted runs) so the three buckets
/// always add up to the total.
pub fn assemble(tests: Vec<TestEntry>, duration: u64, comments: CommentMap) -> ReportData {
    let passed = tests.iter().filter(|t| t.status == TestStatus::Passed).count();
    let failed = tests.iter().filter(|t| t.status.is_failure()).count();
    let skipped = tests.len() - passed - failed;

    ReportData {
        timestamp: chrono::Utc::now().to_rfc3339(),
        total_tests: tests.len(),
        passed,
        failed,
        skipped,
        duration,
        tests,
        comments,
    }
}

/// Pure, right-biased comment merge: returns a new snapshot whose comment
/// map is the shallow union of the report's map and the patch, with patch
/// values winning on collision. An empty patch value removes the key so the
/// "present only when non-empty" invariant holds. Idempotent.
pub fn merge_comments(report: &ReportData, patch: &CommentMap) -> ReportData {
    let mut merged = report.comments.clone();
    for (test_id, text) in patch {
        if text.is_empty() {
            merged.remove(test_id);
        } else {
            merged.insert(test_id.clone(), text.clone());
        }
    }
    ReportData {
        comments: merged,
        ..report.clone()
    }
}

/// Load the persisted comment map from the output directory. Absent or
/// unparsable storage recovers as an empty map; empty values are dropped.
pub fn load_comments(output_dir: &Path) -> CommentMap {
    let path = output_dir.join(COMMENTS_FILENAME);
    let mut comments: CommentMap = match fs::read_to_string(&path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => CommentMap::new(),
    };
    comments.retain(|_, text| !text.is_empty());
    comments
}

/// Write the comment map next to the report artifacts
pub fn save_comments(output_dir: &Path, comments: &CommentMap) -> std::io::Result<()> {
    let path = output_dir.join(COMMENTS_FILENAME);
    let content = serde_json::to_string_pretty(comments).unwrap_or_else(|_| "{}".to_string());
    fs::write(path, content)
}

/// Persist the snapshot as pretty JSON; returns the written path
pub fn save_report(output_dir: &Path, report: &ReportData) -> std::io::Result<PathBuf> {
    let path = output_dir.join(REPORT_DATA_FILENAME);
    let content = serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
    fs::write(&path, content)?;
    Ok(path)
}

/// Load and validate a persisted snapshot. Unlike the comments store this
/// is an explicitly requested input, so missing files, bad JSON, and count
/// mismatches are all reported to the caller.
pub fn load_report(path: &Path) -> Result<ReportData, ReportError> {
    if !path.exists() {
        return Err(ReportError::InputNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    let report: ReportData = serde_json::from_str(&content).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if report.total_tests != report.tests.len() {
        return Err(ReportError::InvalidReport(format!(
            "totalTests is {} but {} tests are present",
            report.total_tests,
            report.tests.len()
        )));
    }
    if report.passed + report.failed + report.skipped != report.total_tests {
        return Err(ReportError::InvalidReport(format!(
            "{} passed + {} failed + {} skipped does not equal {} total",
            report.passed, report.failed, report.skipped, report.total_tests
        )));
    }
    Ok(report)
}

/// Load a comment patch file (flat test id → text map). An explicit input:
/// parse failures are surfaced, not defaulted.
pub fn load_comment_patch(path: &Path) -> Result<CommentMap, ReportError> {
    if !path.exists() {
        return Err(ReportError::InputNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })
}
