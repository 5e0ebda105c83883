//! The interactive review surface
//!
//! All mutable review state lives in one `ReviewSession`: the active
//! partition, the filter selections, and the unsaved comment edits. Render
//! calls read from the session; nothing is closed over by free functions,
//! which keeps the export controller's save/restore cycle a plain state
//! copy.

use crate::filter::{self, FilterParams, Partition};
use crate::render::rows::{self, RowMode};
use crate::render::summary::{self, Summary};
use crate::{CommentMap, ReportData, TestEntry};
use std::time::{Duration, Instant};

/// Quiescence window for search keystrokes
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(200);

/// One review of a report: exactly one writer of the comment map and the
/// filter state at any instant.
pub struct ReviewSession {
    report: ReportData,
    comments: CommentMap,
    active_partition: Partition,
    filters: FilterParams,
    /// Latest keystroke not yet applied, with its arrival instant
    pending_search: Option<(String, Instant)>,
}

impl ReviewSession {
    /// Open a session on an assembled report. Comments start from the
    /// snapshot's persisted map.
    pub fn new(report: ReportData) -> Self {
        let comments = report.comments.clone();
        Self {
            report,
            comments,
            active_partition: Partition::E2e,
            filters: FilterParams::default(),
            pending_search: None,
        }
    }

    pub fn report(&self) -> &ReportData {
        &self.report
    }

    /// The in-memory comment map, including unsaved edits
    pub fn comments(&self) -> &CommentMap {
        &self.comments
    }

    pub fn active_partition(&self) -> Partition {
        self.active_partition
    }

    pub fn filters(&self) -> &FilterParams {
        &self.filters
    }

    /// Tests in the active partition, before filtering
    pub fn partition_tests(&self) -> Vec<&TestEntry> {
        filter::partition_tests(&self.report.tests, self.active_partition)
    }

    /// Tests currently visible: the active partition narrowed by the
    /// active filters
    pub fn visible_tests(&self) -> Vec<&TestEntry> {
        filter::apply(&self.partition_tests(), &self.filters)
    }

    /// Per-partition totals for the tab labels
    pub fn partition_counts(&self) -> (usize, usize) {
        let e2e = filter::partition_tests(&self.report.tests, Partition::E2e).len();
        let atomics = filter::partition_tests(&self.report.tests, Partition::Atomics).len();
        (e2e, atomics)
    }

    /// Switch the active partition. Filters reset to their defaults, as a
    /// fresh partition view starts unfiltered.
    pub fn switch_partition(&mut self, partition: Partition) {
        self.active_partition = partition;
        self.filters = FilterParams::default();
        self.pending_search = None;
    }

    /// Replace the whole filter state at once (used when replaying a saved
    /// view); pending keystrokes are discarded.
    pub fn set_filters(&mut self, filters: FilterParams) {
        self.filters = filters;
        self.pending_search = None;
    }

    pub fn set_status_filter(&mut self, status: Option<crate::TestStatus>) {
        self.filters.status = status;
    }

    pub fn set_severity_filter(&mut self, severity: Option<crate::Severity>) {
        self.filters.severity = severity;
    }

    pub fn set_epic_filter(&mut self, epic: Option<String>) {
        self.filters.epic = epic;
    }

    /// Record a search keystroke. The text only becomes the active search
    /// once input has quiesced for the debounce window; bursts coalesce
    /// into a single filter pass.
    pub fn search_input(&mut self, text: &str, now: Instant) {
        self.pending_search = Some((text.to_string(), now));
    }

    /// Apply a pending search if input has quiesced. Returns true when the
    /// active filters changed.
    pub fn poll_search(&mut self, now: Instant) -> bool {
        let quiesced = matches!(
            &self.pending_search,
            Some((_, at)) if now.duration_since(*at) >= SEARCH_DEBOUNCE
        );
        if !quiesced {
            return false;
        }
        if let Some((text, _)) = self.pending_search.take() {
            if text != self.filters.search {
                self.filters.search = text;
                return true;
            }
        }
        false
    }

    /// Distinct epic values in the active partition, first-seen order;
    /// populates the epic selection control.
    pub fn epic_options(&self) -> Vec<String> {
        let mut epics = Vec::new();
        for test in self.partition_tests() {
            if let Some(epic) = &test.metadata.epic {
                if !epics.iter().any(|known| known == epic) {
                    epics.push(epic.clone());
                }
            }
        }
        epics
    }

    /// Apply a comment edit synchronously: a trimmed non-empty value sets
    /// or overwrites the entry, an empty or whitespace-only value deletes
    /// it.
    pub fn edit_comment(&mut self, test_id: &str, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.comments.remove(test_id);
        } else {
            self.comments.insert(test_id.to_string(), trimmed.to_string());
        }
    }

    /// Summary over the currently visible tests
    pub fn summary(&self) -> Summary {
        Summary::over(self.visible_tests())
    }

    /// Table body for the currently visible tests
    pub fn render_rows(&self) -> String {
        rows::rows_html(self.visible_tests(), &self.comments, RowMode::Interactive)
    }

    /// Summary stat tiles plus the distribution visual for the visible set
    pub fn render_summary(&self) -> String {
        let summary = self.summary();
        format!(
            "{}{}",
            summary::summary_html(&summary),
            summary::chart_html(&summary)
        )
    }

    /// Full page body for the static report artifact: generation stamp,
    /// partition tabs, filter controls, summary, and the test table for
    /// the current view.
    pub fn render_page_body(&self) -> String {
        let (e2e_count, atomics_count) = self.partition_counts();
        let active = |partition| {
            if self.active_partition == partition { " active" } else { "" }
        };

        let mut body = String::new();
        body.push_str(&format!(
            "<div class=\"meta\">Generated {}</div>",
            rows::escape_html(&self.report.timestamp)
        ));

        body.push_str(&format!(
            "<div class=\"tabs\">\
<button class=\"tab-btn{}\" data-tab=\"E2E\">E2E <span class=\"tab-count\">({})</span></button>\
<button class=\"tab-btn{}\" data-tab=\"ATOMICS\">Atomics <span class=\"tab-count\">({})</span></button>\
</div>",
            active(Partition::E2e),
            e2e_count,
            active(Partition::Atomics),
            atomics_count,
        ));

        body.push_str("<div class=\"controls\">");
        body.push_str(&format!(
            "<input type=\"search\" id=\"search\" placeholder=\"Search tests...\" value=\"{}\">",
            rows::escape_html(&self.filters.search)
        ));
        body.push_str(&select_html(
            "status-filter",
            "All Statuses",
            &["passed", "failed", "timedOut", "skipped", "interrupted"],
            self.filters.status.map(|s| s.as_str()),
        ));
        body.push_str(&select_html(
            "severity-filter",
            "All Severities",
            &["blocker", "critical", "normal", "minor", "trivial"],
            self.filters.severity.map(|s| s.as_str()),
        ));
        let epics = self.epic_options();
        let epic_values: Vec<&str> = epics.iter().map(String::as_str).collect();
        body.push_str(&select_html(
            "epic-filter",
            "All Epics",
            &epic_values,
            self.filters.epic.as_deref(),
        ));
        body.push_str("<button id=\"download-comments\" class=\"tab-btn\">Download comments</button>");
        body.push_str("</div>");

        body.push_str(&self.render_summary());
        body.push_str(&rows::table_html(&self.render_rows()));
        body
    }
}

/// A filter `<select>` with an "all" sentinel first
fn select_html(id: &str, all_label: &str, values: &[&str], selected: Option<&str>) -> String {
    let mut html = format!(
        "<select id=\"{}\"><option value=\"all\">{}</option>",
        id, all_label
    );
    for value in values.iter().copied() {
        let marker = if selected == Some(value) { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            rows::escape_html(value),
            marker,
            rows::escape_html(value)
        ));
    }
    html.push_str("</select>");
    html
}
