//! Summary statistics and the status-distribution visual

use crate::TestEntry;

/// Aggregate counts over one rendered test sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Sum of the entries' durations in milliseconds
    pub duration: u64,
}

impl Summary {
    /// Compute counts and the duration sum over the given sequence
    pub fn over<'a, I>(tests: I) -> Self
    where
        I: IntoIterator<Item = &'a TestEntry>,
    {
        let mut summary = Summary::default();
        for test in tests {
            summary.total += 1;
            summary.duration += test.duration;
            if test.status == crate::TestStatus::Passed {
                summary.passed += 1;
            } else if test.status.is_failure() {
                summary.failed += 1;
            } else {
                summary.skipped += 1;
            }
        }
        summary
    }
}

/// One segment of the status doughnut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSegment {
    pub label: &'static str,
    pub count: usize,
    pub color: &'static str,
}

/// Fixed-order, fixed-color segments for the distribution visual
pub fn chart_segments(summary: &Summary) -> [ChartSegment; 3] {
    [
        ChartSegment { label: "Passed", count: summary.passed, color: "#10b981" },
        ChartSegment { label: "Failed", count: summary.failed, color: "#ef4444" },
        ChartSegment { label: "Skipped", count: summary.skipped, color: "#f59e0b" },
    ]
}

/// Doughnut markup for the distribution, drawn with a conic gradient so the
/// exported document needs no scripting to show it.
pub fn chart_html(summary: &Summary) -> String {
    let segments = chart_segments(summary);
    let total = summary.total.max(1);

    let mut stops = Vec::new();
    let mut start = 0.0f64;
    for segment in &segments {
        let sweep = segment.count as f64 / total as f64 * 360.0;
        stops.push(format!(
            "{} {:.2}deg {:.2}deg",
            segment.color,
            start,
            start + sweep
        ));
        start += sweep;
    }

    let mut html = format!(
        "<div class=\"chart\"><div class=\"doughnut\" style=\"background:conic-gradient({})\"></div><ul class=\"chart-legend\">",
        stops.join(",")
    );
    for segment in &segments {
        let percent = segment.count as f64 / total as f64 * 100.0;
        html.push_str(&format!(
            "<li><span class=\"dot\" style=\"background:{}\"></span>{}: {} ({:.1}%)</li>",
            segment.color, segment.label, segment.count, percent
        ));
    }
    html.push_str("</ul></div>");
    html
}

/// Stat tiles for a computed summary
pub fn summary_html(summary: &Summary) -> String {
    format!(
        "<div class=\"summary\">\
<div class=\"stat\"><span class=\"val\">{}</span><span class=\"lbl\">Total</span></div>\
<div class=\"stat\"><span class=\"val passed\">{}</span><span class=\"lbl\">Passed</span></div>\
<div class=\"stat\"><span class=\"val failed\">{}</span><span class=\"lbl\">Failed</span></div>\
<div class=\"stat\"><span class=\"val skipped\">{}</span><span class=\"lbl\">Skipped</span></div>\
<div class=\"stat\"><span class=\"val\">{}</span><span class=\"lbl\">Duration</span></div>\
</div>",
        summary.total,
        summary.passed,
        summary.failed,
        summary.skipped,
        format_duration(summary.duration),
    )
}

/// Human-readable duration. Values just under a minute render as "60.0s"
/// rather than carrying into minutes; consumers depend on the exact strings.
pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        return format!("{}ms", ms);
    }
    if ms < 60_000 {
        return format!("{:.1}s", ms as f64 / 1000.0);
    }
    let minutes = ms / 60_000;
    let seconds = ((ms % 60_000) as f64 / 1000.0).round() as u64;
    format!("{}m {}s", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TestMetadata, TestStatus};

    fn entry(status: TestStatus, duration: u64) -> TestEntry {
        TestEntry {
            test_id: "t".into(),
            name: "t".into(),
            full_title: "t".into(),
            status,
            duration,
            error_trace: None,
            metadata: TestMetadata::default(),
            file_path: "t.spec.ts".into(),
            line: 1,
            start_time: "2025-06-01T10:00:00Z".into(),
            retries: 0,
        }
    }

    #[test]
    fn summary_counts_and_duration_sum() {
        let tests = vec![
            entry(TestStatus::Passed, 100),
            entry(TestStatus::TimedOut, 250),
            entry(TestStatus::Skipped, 0),
            entry(TestStatus::Passed, 50),
        ];
        let summary = Summary::over(tests.iter());
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.duration, 400);
    }

    #[test]
    fn format_duration_millisecond_range() {
        assert_eq!(format_duration(0), "0ms");
        assert_eq!(format_duration(500), "500ms");
        assert_eq!(format_duration(999), "999ms");
    }

    #[test]
    fn format_duration_seconds_range() {
        assert_eq!(format_duration(1000), "1.0s");
        assert_eq!(format_duration(1500), "1.5s");
        assert_eq!(format_duration(59_499), "59.5s");
    }

    #[test]
    fn format_duration_minute_boundary_stays_in_seconds() {
        // Just-under-a-minute values round up to "60.0s" by design
        assert_eq!(format_duration(59_999), "60.0s");
        assert_eq!(format_duration(60_000), "1m 0s");
    }

    #[test]
    fn format_duration_minutes() {
        assert_eq!(format_duration(65_000), "1m 5s");
        assert_eq!(format_duration(125_000), "2m 5s");
        assert_eq!(format_duration(65_499), "1m 5s");
        assert_eq!(format_duration(65_500), "1m 6s");
    }

    #[test]
    fn chart_segments_follow_fixed_order() {
        let summary = Summary { total: 6, passed: 3, failed: 2, skipped: 1, duration: 0 };
        let segments = chart_segments(&summary);
        assert_eq!(segments[0].label, "Passed");
        assert_eq!(segments[0].count, 3);
        assert_eq!(segments[1].label, "Failed");
        assert_eq!(segments[2].label, "Skipped");
    }

    #[test]
    fn chart_html_handles_empty_set() {
        let html = chart_html(&Summary::default());
        assert!(html.contains("conic-gradient"));
        assert!(html.contains("Passed: 0"));
    }
}
