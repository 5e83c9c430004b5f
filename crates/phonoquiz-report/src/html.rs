//! HTML report renderer.
//!
//! Produces a self-contained HTML page with all CSS inlined.

use std::fmt::Write as _;

use phonoquiz_core::error::RenderError;
use phonoquiz_core::report::ReportDocument;
use phonoquiz_core::traits::{ReportFormat, ReportRenderer};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Renders reports as standalone HTML pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl ReportRenderer for HtmlRenderer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Html
    }

    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, RenderError> {
        document.validate()?;
        let html = generate_html(document);
        tracing::debug!(rows = document.rows.len(), bytes = html.len(), "rendered html report");
        Ok(html.into_bytes())
    }
}

/// Generate the HTML page for a report document.
pub fn generate_html(document: &ReportDocument) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", html_escape(&document.title));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    let _ = writeln!(html, "<h1>{}</h1>", html_escape(&document.title));
    let _ = writeln!(
        html,
        "<p class=\"meta\">Name: {}</p>",
        html_escape(&document.student)
    );
    let _ = writeln!(
        html,
        "<p class=\"meta\">Timestamp: {}</p>",
        html_escape(&document.timestamp_line())
    );
    html.push_str("</header>\n");

    html.push_str("<table>\n<thead><tr>");
    for column in &document.header {
        let _ = write!(html, "<th>{}</th>", html_escape(column));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for row in &document.rows {
        html.push_str("<tr>");
        for cell in &row.cells {
            if cell.highlight {
                let _ = write!(html, "<td class=\"wrong\">{}</td>", html_escape(&cell.text));
            } else {
                let _ = write!(html, "<td>{}</td>", html_escape(&cell.text));
            }
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n");
    html.push_str("</body>\n</html>\n");
    html
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --grid: #808080; --head: #add8e6; }
body { font-family: Helvetica, Arial, sans-serif; margin: 0 auto; padding: 2rem; max-width: 50rem; background: var(--bg); color: var(--fg); }
h1 { text-align: center; font-size: 1.5rem; }
.meta { margin: 0.25rem 0; }
table { border-collapse: collapse; margin: 1.5rem auto; }
th, td { border: 0.5px solid var(--grid); padding: 0.25rem 0.5rem; text-align: center; }
th { background: var(--head); font-weight: bold; }
td.wrong { background: #000; color: #fff; }
@media print { body { padding: 0; } thead { display: table-header-group; } }
"#;
