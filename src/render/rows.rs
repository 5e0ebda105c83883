//! Row-level view data for the test table

use crate::render::summary::format_duration;
use crate::{TestEntry, TestMetadata};
use std::sync::OnceLock;

/// Neutral placeholder shown where a cell has nothing to display
const PLACEHOLDER: &str = "<span class=\"muted\">-</span>";

/// How rows are rendered: the interactive table keeps error panels
/// collapsed behind a toggle; the print rendering expands every panel,
/// drops the toggles, and flags empty comment fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMode {
    Interactive,
    Print,
}

/// One display tag for the metadata cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTag {
    pub text: String,
    /// Extra CSS class; empty for plain tags
    pub class: String,
}

/// Metadata rendered as an ordered tag list: severity, owner, epic,
/// feature, then free tags.
pub fn display_tags(metadata: &TestMetadata) -> Vec<DisplayTag> {
    let mut tags = Vec::new();
    if let Some(severity) = metadata.severity {
        tags.push(DisplayTag {
            text: severity.to_string(),
            class: format!("severity-{}", severity),
        });
    }
    if let Some(owner) = &metadata.owner {
        tags.push(DisplayTag {
            text: format!("@{}", owner),
            class: "owner".to_string(),
        });
    }
    if let Some(epic) = &metadata.epic {
        tags.push(DisplayTag { text: epic.clone(), class: String::new() });
    }
    if let Some(feature) = &metadata.feature {
        tags.push(DisplayTag { text: feature.clone(), class: String::new() });
    }
    for tag in &metadata.tags {
        tags.push(DisplayTag { text: tag.clone(), class: String::new() });
    }
    tags
}

/// Short identifier derived from the source path: the file name without a
/// `.spec.ts` / `.test.js`-style suffix.
pub fn short_file_id(file_path: &str) -> String {
    let file_name = file_path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_path);
    for suffix in [".spec.ts", ".spec.js", ".test.ts", ".test.js"] {
        if let Some(stripped) = file_name.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    file_name.to_string()
}

/// Remove ANSI escape sequences so runner output reads cleanly in HTML
pub fn strip_ansi(text: &str) -> String {
    static ANSI: OnceLock<regex::Regex> = OnceLock::new();
    let ansi = ANSI.get_or_init(|| regex::Regex::new("\x1b\\[[0-9;]*m").unwrap());
    ansi.replace_all(text, "").into_owned()
}

/// Minimal HTML escaping for text nodes and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn metadata_cell(metadata: &TestMetadata) -> String {
    let tags = display_tags(metadata);
    if tags.is_empty() {
        return PLACEHOLDER.to_string();
    }
    tags.iter()
        .map(|tag| {
            if tag.class.is_empty() {
                format!("<span class=\"metadata-tag\">{}</span>", escape_html(&tag.text))
            } else {
                format!(
                    "<span class=\"metadata-tag {}\">{}</span>",
                    tag.class,
                    escape_html(&tag.text)
                )
            }
        })
        .collect()
}

fn error_cell(test: &TestEntry, mode: RowMode) -> String {
    let trace = match &test.error_trace {
        Some(trace) => strip_ansi(trace),
        None => return PLACEHOLDER.to_string(),
    };
    match mode {
        RowMode::Interactive => format!(
            "<div class=\"error-content\" hidden><pre>{}</pre></div><span class=\"error-toggle\">Show error</span>",
            escape_html(&trace)
        ),
        RowMode::Print => format!("<div class=\"error-content\"><pre>{}</pre></div>", escape_html(&trace)),
    }
}

fn comment_cell(test: &TestEntry, comment: Option<&str>, mode: RowMode) -> String {
    let text = comment.unwrap_or("");
    let empty_flag = if mode == RowMode::Print && text.trim().is_empty() {
        " empty-comment"
    } else {
        ""
    };
    format!(
        "<textarea class=\"comment-field{}\" data-test-id=\"{}\" placeholder=\"Add interpretation or notes...\">{}</textarea>",
        empty_flag,
        escape_html(&test.test_id),
        escape_html(text)
    )
}

/// Render one `<tr>` for the test table
pub fn row_html(test: &TestEntry, comment: Option<&str>, mode: RowMode) -> String {
    let retry_badge = if test.retries > 0 {
        let noun = if test.retries == 1 { "retry" } else { "retries" };
        format!(
            "<span class=\"retry-badge\">↻ {} {}</span>",
            test.retries, noun
        )
    } else {
        String::new()
    };

    let description = match &test.metadata.description {
        Some(description) => escape_html(description),
        None => PLACEHOLDER.to_string(),
    };

    format!(
        "<tr class=\"test-row\" data-test-id=\"{id}\">\
<td><span class=\"status-badge status-{status}\">{status}</span>{retry}</td>\
<td><div class=\"test-name\">{name}</div><div class=\"test-id\">{file_id}</div></td>\
<td>{description}</td>\
<td><div class=\"metadata-tags\">{tags}</div></td>\
<td>{duration}</td>\
<td class=\"error-cell\">{error}</td>\
<td class=\"comment-cell\">{comment}</td>\
</tr>",
        id = escape_html(&test.test_id),
        status = test.status,
        retry = retry_badge,
        name = escape_html(&test.name),
        file_id = escape_html(&short_file_id(&test.file_path)),
        description = description,
        tags = metadata_cell(&test.metadata),
        duration = format_duration(test.duration),
        error = error_cell(test, mode),
        comment = comment_cell(test, comment, mode),
    )
}

/// Test table shell around pre-rendered rows
pub fn table_html(rows: &str) -> String {
    format!(
        "<table class=\"tests-table\"><thead><tr><th>Status</th><th>Test</th><th>Description</th><th>Metadata</th><th>Duration</th><th>Error</th><th>Comment</th></tr></thead><tbody>{}</tbody></table>",
        rows
    )
}

/// Render the table body for a sequence of tests
pub fn rows_html<'a, I>(tests: I, comments: &crate::CommentMap, mode: RowMode) -> String
where
    I: IntoIterator<Item = &'a TestEntry>,
{
    tests
        .into_iter()
        .map(|test| row_html(test, comments.get(&test.test_id).map(String::as_str), mode))
        .collect()
}
