//! Core trait definitions for report renderers.
//!
//! Renderers are implemented by the `phonoquiz-report` crate; the page
//! controller only sees them through [`ReportRenderer`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::report::ReportDocument;

/// Output format of an exported report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Pdf,
    Html,
}

impl ReportFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Html => "html",
        }
    }

    /// Media type of the rendered bytes.
    pub fn mime_type(self) -> &'static str {
        match self {
            ReportFormat::Pdf => "application/pdf",
            ReportFormat::Html => "text/html; charset=utf-8",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(ReportFormat::Pdf),
            "html" | "htm" => Ok(ReportFormat::Html),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

/// Serializes a [`ReportDocument`] into a complete in-memory file.
///
/// Implementations never perform I/O and never mutate the document. On
/// failure they return an error and no bytes at all.
pub trait ReportRenderer {
    fn format(&self) -> ReportFormat;

    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, RenderError>;
}
