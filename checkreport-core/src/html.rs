//! HTML report generation
//!
//! Generates the two self-contained report pages with embedded CSS:
//! - the changelog index (one row per check run, most recent first)
//! - the current error listing (summary by check plus every open message)
//!
//! Global invariants enforced:
//! - Every message goes through the annotator; no raw message text is emitted
//! - Identical input yields byte-for-byte identical output

use crate::annotate::Annotator;
use crate::data::{Changelog, ChangelogEntry, ErrorReport, ErrorSummary};

const PAGE_TITLE: &str = "Firefox Error Checks";

/// Render the changelog index page
///
/// `errors_page` is the href used for the link to the current error listing.
pub fn render_index(changelog: &Changelog, annotator: &Annotator, errors_page: &str) -> String {
    let rows: String = changelog
        .iter_recent_first()
        .map(|(date, entry)| render_changelog_row(date, entry, annotator))
        .collect();

    let body = format!(
        r#"<p class="nav"><a href="{errors_page}">List of current errors</a></p>
        <table>
            <thead>
                <tr>
                    <th>Date</th>
                    <th>Message</th>
                    <th>Details</th>
                </tr>
            </thead>
            <tbody>
{rows}            </tbody>
        </table>"#,
        errors_page = html_escape(errors_page),
        rows = if rows.is_empty() {
            empty_row(3, "No runs recorded")
        } else {
            rows
        },
    );

    render_page(&body)
}

/// Render the current error listing page
///
/// `index_page` is the href used for the link back to the changelog index.
pub fn render_errors(report: &ErrorReport, annotator: &Annotator, index_page: &str) -> String {
    let body = format!(
        r#"<p class="nav"><a href="{index_page}">Back to main index</a></p>
        {summary}
        {errors}
        {compare_locales}"#,
        index_page = html_escape(index_page),
        summary = render_summary_table(&report.summary),
        errors = render_message_table("Current Errors", &report.errors, annotator),
        compare_locales =
            render_message_table("compare-locales", &report.compare_locales, annotator),
    );

    render_page(&body)
}

/// Wrap a page body with the shared document chrome
fn render_page(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en-US">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        {body}
        {footer}
    </div>
</body>
</html>
"#,
        title = PAGE_TITLE,
        css = inline_css(),
        body = body,
        footer = render_footer(),
    )
}

fn render_changelog_row(date: &str, entry: &ChangelogEntry, annotator: &Annotator) -> String {
    let message = match entry.message.as_deref() {
        Some(m) if !m.is_empty() => multiline(m),
        _ => "&nbsp;".to_string(),
    };

    let mut details = String::new();
    if let Some(new) = &entry.new {
        details.push_str(&render_message_list("New errors", "new_errors", new, annotator));
    }
    if let Some(fixed) = &entry.fixed {
        details.push_str(&render_message_list(
            "Fixed errors",
            "fixed_errors",
            fixed,
            annotator,
        ));
    }

    format!(
        r#"                <tr>
                    <td class="date">{date}</td>
                    <td>{message}</td>
                    <td>{details}</td>
                </tr>
"#,
        date = html_escape(date).replace(' ', "&nbsp;"),
        message = message,
        details = details,
    )
}

/// Render a titled `<ul>` of annotated messages
fn render_message_list(
    title: &str,
    class: &str,
    messages: &[String],
    annotator: &Annotator,
) -> String {
    let items: String = messages
        .iter()
        .map(|m| format!("<li>{}</li>\n", annotated(m, annotator)))
        .collect();

    format!(
        "<p class=\"{class}\">{title} ({count}):</p>\n<ul>\n{items}</ul>\n",
        class = class,
        title = title,
        count = messages.len(),
        items = items,
    )
}

/// Summary of error counts by check
fn render_summary_table(summary: &ErrorSummary) -> String {
    let rows: String = if summary.is_empty() {
        empty_row(3, "No errors")
    } else {
        summary
            .iter()
            .map(|(check, count)| {
                format!(
                    r#"                <tr>
                    <td class="monospace">{check}</td>
                    <td class="count{error_class}">{errors}</td>
                    <td class="count">{warnings}</td>
                </tr>
"#,
                    check = html_escape(check),
                    error_class = if count.errors() > 0 { " new_errors" } else { "" },
                    errors = count.errors(),
                    warnings = count.warnings(),
                )
            })
            .collect()
    };

    format!(
        r#"<section class="section" id="summary">
            <h2>Summary</h2>
            <table>
                <thead>
                    <tr>
                        <th>Check</th>
                        <th>Errors</th>
                        <th>Warnings</th>
                    </tr>
                </thead>
                <tbody>
{rows}                </tbody>
            </table>
        </section>"#,
        rows = rows,
    )
}

/// One-column table with an annotated message per row
fn render_message_table(title: &str, messages: &[String], annotator: &Annotator) -> String {
    let rows: String = if messages.is_empty() {
        empty_row(1, "No errors")
    } else {
        messages
            .iter()
            .map(|m| {
                format!(
                    "                <tr>\n                    <td>{}</td>\n                </tr>\n",
                    annotated(m, annotator)
                )
            })
            .collect()
    };

    format!(
        r#"<section class="section">
            <table>
                <thead>
                    <tr>
                        <th>{title} ({count})</th>
                    </tr>
                </thead>
                <tbody>
{rows}                </tbody>
            </table>
        </section>"#,
        title = html_escape(title),
        count = messages.len(),
        rows = rows,
    )
}

fn empty_row(columns: usize, text: &str) -> String {
    format!(
        "                <tr>\n                    <td class=\"empty\" colspan=\"{columns}\">{text}</td>\n                </tr>\n"
    )
}

/// Annotated message markup with line breaks kept
fn annotated(message: &str, annotator: &Annotator) -> String {
    annotator.annotate(message).html.replace('\n', "<br/>")
}

/// Escape a free-text message, keeping its line breaks
fn multiline(text: &str) -> String {
    html_escape(text).replace('\n', "<br/>")
}

/// Inline CSS styles
fn inline_css() -> &'static str {
    r#"
* {
    box-sizing: border-box;
}

body {
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    font-size: 13px;
    line-height: 1.5;
    color: #111827;
    background: #ffffff;
    margin: 0;
}

.container {
    max-width: 1400px;
    margin: 20px auto 0;
    padding: 0 2rem 2rem;
}

.nav {
    margin-bottom: 1rem;
}

a {
    color: #1d4ed8;
}

.section {
    margin-bottom: 2rem;
}

.section h2 {
    font-size: 1.25rem;
    margin-bottom: 0.75rem;
}

table {
    width: 100%;
    border-collapse: collapse;
    border: 1px solid #e5e7eb;
    margin-bottom: 1rem;
}

thead {
    background: #f9fafb;
}

th {
    padding: 0.6rem 0.75rem;
    text-align: left;
    font-weight: 600;
    border: 1px solid #e5e7eb;
}

td {
    padding: 0.6rem 0.75rem;
    border: 1px solid #e5e7eb;
    vertical-align: top;
    word-break: break-word;
}

tbody tr:nth-child(odd) {
    background: #f9fafb;
}

td.date {
    white-space: nowrap;
}

td.count {
    text-align: right;
    font-variant-numeric: tabular-nums;
}

td.empty {
    color: #6b7280;
    font-style: italic;
}

ul {
    margin: 0 0 0.75rem;
    padding-left: 1.25rem;
}

.new_errors {
    color: #dc2626;
}

.fixed_errors {
    color: #16a34a;
}

p.new_errors,
p.fixed_errors {
    margin: 0 0 0.25rem;
    font-weight: 600;
}

.monospace {
    font-family: 'Monaco', 'Courier New', monospace;
}

footer {
    margin-top: 2rem;
    padding-top: 1rem;
    border-top: 1px solid #e5e7eb;
    text-align: center;
    color: #6b7280;
}

@media (prefers-color-scheme: dark) {
    body {
        background: #111827;
        color: #f9fafb;
    }

    a {
        color: #93c5fd;
    }

    thead,
    tbody tr:nth-child(odd) {
        background: #1f2937;
    }

    table,
    th,
    td,
    footer {
        border-color: #374151;
    }

    .new_errors {
        color: #f87171;
    }

    .fixed_errors {
        color: #4ade80;
    }
}
"#
}

/// Render footer
fn render_footer() -> String {
    r#"<footer>
            <p>Generated by checkreport</p>
        </footer>"#
        .to_string()
}

/// Escape HTML special characters in a single pass
pub(crate) fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SummaryCount;

    fn sample_changelog() -> Changelog {
        Changelog::from_entries(vec![
            (
                "2024-01-01 08:00".to_string(),
                ChangelogEntry {
                    message: Some("Total errors: 1".to_string()),
                    new: Some(vec!["fr - empty: first.key".to_string()]),
                    fixed: None,
                },
            ),
            (
                "2024-01-02 08:00".to_string(),
                ChangelogEntry {
                    message: Some("Total errors: 0\nTotal compare-locale errors: 0".to_string()),
                    new: None,
                    fixed: Some(vec!["fr - empty: first.key".to_string()]),
                },
            ),
            (
                "2024-01-03 08:00".to_string(),
                ChangelogEntry::default(),
            ),
        ])
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert_eq!(html_escape("plain"), "plain");
        assert_eq!(html_escape("&amp;"), "&amp;amp;");
    }

    #[test]
    fn test_index_is_most_recent_first() {
        let html = render_index(&sample_changelog(), &Annotator::default(), "errors.html");
        let third = html.find("2024-01-03&nbsp;08:00").unwrap();
        let second = html.find("2024-01-02&nbsp;08:00").unwrap();
        let first = html.find("2024-01-01&nbsp;08:00").unwrap();
        assert!(third < second && second < first);
    }

    #[test]
    fn test_index_details() {
        let html = render_index(&sample_changelog(), &Annotator::default(), "errors.html");
        assert!(html.contains(r#"<p class="new_errors">New errors (1):</p>"#));
        assert!(html.contains(r#"<p class="fixed_errors">Fixed errors (1):</p>"#));
        assert_eq!(html.matches(">first.key</a></li>").count(), 2);
        assert!(html.contains("Total errors: 0<br/>Total compare-locale errors: 0"));
        assert!(html.contains("<td>&nbsp;</td>"));
        assert!(html.contains(r#"<a href="errors.html">List of current errors</a>"#));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_index_omits_absent_lists() {
        let changelog = Changelog::from_entries(vec![(
            "2024-02-01 10:00".to_string(),
            ChangelogEntry {
                message: Some("No changes (12).".to_string()),
                new: None,
                fixed: None,
            },
        )]);
        let html = render_index(&changelog, &Annotator::default(), "errors.html");
        assert!(!html.contains("New errors"));
        assert!(!html.contains("Fixed errors"));
        assert!(html.contains("No changes (12)."));
    }

    #[test]
    fn test_empty_changelog() {
        let html = render_index(&Changelog::default(), &Annotator::default(), "errors.html");
        assert!(html.contains("No runs recorded"));
    }

    #[test]
    fn test_errors_page() {
        let mut summary = ErrorSummary::new();
        summary.insert("variables".to_string(), SummaryCount::Count(2));
        summary.insert(
            "compare-locales".to_string(),
            SummaryCount::Split {
                errors: 1,
                warnings: 4,
            },
        );
        let report = ErrorReport {
            errors: vec![
                "de - Some message (some.key)".to_string(),
                "fr - variables: <script>alert(1)</script>".to_string(),
            ],
            compare_locales: vec![],
            summary,
        };
        let html = render_errors(&report, &Annotator::default(), "index.html");

        assert!(html.contains("<th>Current Errors (2)</th>"));
        assert!(html.contains("<th>compare-locales (0)</th>"));
        assert!(html.contains(">some.key</a>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(r#"<a href="index.html">Back to main index</a>"#));

        // Summary rows are sorted by check name
        let cl = html.find(r#"<td class="monospace">compare-locales</td>"#).unwrap();
        let vars = html.find(r#"<td class="monospace">variables</td>"#).unwrap();
        assert!(cl < vars);
        assert!(html.contains(r#"<td class="count">4</td>"#));
        assert!(html.contains(r#"<td class="count new_errors">2</td>"#));
    }

    #[test]
    fn test_multiline_messages_keep_line_breaks() {
        let report = ErrorReport {
            errors: vec![
                "it - Mismatched HTML elements in string (browser.ftl:a)\n  Translation tags (1): p\n  Reference: <p>x</p>".to_string(),
                "it - Fluent function mismatch\nSource text: {NUMBER($n)} (browser.ftl:b)".to_string(),
            ],
            ..ErrorReport::default()
        };
        let html = render_errors(&report, &Annotator::default(), "index.html");
        assert!(html.contains(
            "(browser.ftl:a)<br/>  Translation tags (1): p<br/>  Reference: &lt;p&gt;x&lt;/p&gt;</td>"
        ));
        assert!(html.contains("Fluent function mismatch<br/>Source text: "));
        assert!(html.contains(">browser.ftl:b</a>)</td>"));
        assert!(!html.contains("\n  Translation tags"));

        let changelog = Changelog::from_entries(vec![(
            "2024-02-01 10:00".to_string(),
            ChangelogEntry {
                message: None,
                new: Some(report.errors.clone()),
                fixed: None,
            },
        )]);
        let html = render_index(&changelog, &Annotator::default(), "errors.html");
        assert!(html.contains("Fluent function mismatch<br/>Source text: "));
        assert!(!html.contains("mismatch\nSource"));
    }

    #[test]
    fn test_errors_page_empty_report() {
        let html = render_errors(&ErrorReport::default(), &Annotator::default(), "index.html");
        assert_eq!(html.matches("No errors").count(), 3);
    }

    #[test]
    fn test_render_is_deterministic() {
        let changelog = sample_changelog();
        let annotator = Annotator::default();
        assert_eq!(
            render_index(&changelog, &annotator, "errors.html"),
            render_index(&changelog, &annotator, "errors.html")
        );
    }
}
