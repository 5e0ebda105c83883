//! Run collection: one entry per test identity across a run
//!
//! Completion events arrive pre-sequenced from the external runner. Retried
//! executions collapse onto their first-appearance slot, so the final
//! sequence holds the latest content at the original position.

use crate::metadata::{self, Annotation};
use crate::report;
use crate::{CommentMap, ReportData, TestEntry, TestStatus};
use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Joins multiple failure records inside one error trace
const ERROR_SEPARATOR: &str = "\n---\n";

/// One failure record attached to a completion event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub stack: Option<String>,
}

/// A completion event for a single test execution, as emitted by the runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEvent {
    pub test_id: String,
    /// Test title (the last title-path segment)
    pub title: String,
    /// Outermost grouping first, test title last
    pub title_path: Vec<String>,
    pub status: TestStatus,
    pub duration: u64,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub errors: Vec<FailureRecord>,
    pub file_path: String,
    pub line: usize,
    pub start_time: String,
    #[serde(default)]
    pub retry: u32,
}

/// Concatenate failure records into one trace: message plus stack per
/// record, records joined by a fixed separator. No records, no trace.
pub fn format_error_trace(errors: &[FailureRecord]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    let trace = errors
        .iter()
        .map(|record| {
            let mut message = record.message.clone().unwrap_or_default();
            if let Some(stack) = &record.stack {
                message.push('\n');
                message.push_str(stack);
            }
            message
        })
        .collect::<Vec<_>>()
        .join(ERROR_SEPARATOR);
    Some(trace)
}

/// Accumulates test entries over one run and assembles the report at the
/// end. Single-writer: the runner delivers events sequentially.
pub struct RunCollector {
    tests: Vec<TestEntry>,
    started_at: chrono::DateTime<chrono::Utc>,
    echo: bool,
}

impl RunCollector {
    /// Collector that echoes per-test progress to the console
    pub fn new() -> Self {
        Self {
            tests: Vec::new(),
            started_at: chrono::Utc::now(),
            echo: true,
        }
    }

    /// Collector without console output
    pub fn silent() -> Self {
        Self {
            echo: false,
            ..Self::new()
        }
    }

    /// Mark the run start; resets the wall clock
    pub fn on_begin(&mut self, total_tests: usize) {
        self.started_at = chrono::Utc::now();
        if self.echo {
            println!(
                "\n{} Starting test run with {} tests",
                "[craft-report]".cyan(),
                total_tests
            );
        }
    }

    /// Record one completion event. A repeated identity replaces the
    /// existing entry in place, keeping the position of the test's first
    /// appearance while retaining only the most recent execution.
    pub fn on_test_end(&mut self, event: &CompletionEvent) {
        let entry = TestEntry {
            test_id: event.test_id.clone(),
            name: event.title.clone(),
            full_title: event.title_path.join(" > "),
            status: event.status,
            duration: event.duration,
            error_trace: format_error_trace(&event.errors),
            metadata: metadata::extract(&event.annotations, &event.title_path),
            file_path: event.file_path.clone(),
            line: event.line,
            start_time: event.start_time.clone(),
            retries: event.retry,
        };

        match self.tests.iter().position(|t| t.test_id == entry.test_id) {
            Some(index) => self.tests[index] = entry,
            None => self.tests.push(entry),
        }

        if self.echo {
            let symbol = match event.status {
                TestStatus::Passed => "✓".green(),
                s if s.is_failure() => "✗".red(),
                _ => "○".yellow(),
            };
            println!("  {} {}", symbol, event.title);
        }
    }

    /// Entries collected so far, in display order
    pub fn tests(&self) -> &[TestEntry] {
        &self.tests
    }

    /// Wall-clock milliseconds since the run began
    pub fn elapsed_ms(&self) -> u64 {
        (chrono::Utc::now() - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }

    /// Close the run: assemble the report snapshot with the given comment
    /// map (typically loaded from the output directory's persisted store).
    pub fn on_end(self, comments: CommentMap) -> ReportData {
        let duration = self.elapsed_ms();
        report::assemble(self.tests, duration, comments)
    }
}

impl Default for RunCollector {
    fn default() -> Self {
        Self::new()
    }
}
