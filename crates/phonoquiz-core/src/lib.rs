//! phonoquiz-core: exercise model, answer comparison, and session handling.
//!
//! This crate defines the exercise data model, the normalizer and comparator
//! that grade student answers, the session state owned by one page load, and
//! the report document handed to the renderers in `phonoquiz-report`.

pub mod catalog;
pub mod comparator;
pub mod controller;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod report;
pub mod session;
pub mod traits;

pub use comparator::{evaluate, evaluate_exercise, verify_alignment};
pub use error::{ConfigError, ExportError, RenderError};
pub use normalize::normalize;
