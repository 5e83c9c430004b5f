//! phonoquiz-report: PDF and HTML renderers for exercise reports.
//!
//! Both renderers implement [`ReportRenderer`] from `phonoquiz-core` and
//! return complete in-memory files; delivery is the caller's concern.

pub mod html;
pub mod pdf;

pub use html::HtmlRenderer;
pub use pdf::{PageLayout, PdfRenderer};

use phonoquiz_core::traits::{ReportFormat, ReportRenderer};

/// The renderer for `format`.
pub fn renderer_for(format: ReportFormat) -> Box<dyn ReportRenderer> {
    match format {
        ReportFormat::Pdf => Box::new(PdfRenderer::new()),
        ReportFormat::Html => Box::new(HtmlRenderer),
    }
}
