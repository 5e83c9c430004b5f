//! Error types for exercise setup, report rendering, and export.
//!
//! A student leaving a field empty is never an error: it simply grades as
//! incorrect. The variants here cover the faults that must stop a page from
//! producing a misleading verdict or a corrupt report.

use thiserror::Error;

use crate::model::AnswerShape;
use crate::session::ExportReadiness;

/// Misalignment between questions, the answer key, and submitted answers.
///
/// Raised while loading exercise definitions or submissions, and by the
/// comparator when handed data that was never validated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A question has no entry in the answer key.
    #[error("exercise '{exercise}': question '{question}' has no answer key entry")]
    MissingKey { exercise: String, question: String },

    /// The answer key holds an entry for a question that does not exist.
    #[error("exercise '{exercise}': answer key references unknown question '{question}'")]
    UnknownKeyEntry { exercise: String, question: String },

    /// A submission references a question that does not exist.
    #[error("exercise '{exercise}': submission references unknown question '{question}'")]
    UnknownQuestion { exercise: String, question: String },

    /// Two questions share an identifier.
    #[error("exercise '{exercise}': duplicate question id '{question}'")]
    DuplicateQuestion { exercise: String, question: String },

    /// An answer value does not have the structure the shape requires.
    #[error("exercise '{exercise}': question '{question}' expects a {expected} answer, got {found}")]
    ShapeMismatch {
        exercise: String,
        question: String,
        expected: AnswerShape,
        found: String,
    },

    /// A row answer has the wrong number of cells.
    #[error(
        "exercise '{exercise}': question '{question}' has {found} cells but the exercise declares {expected} columns"
    )]
    ColumnCount {
        exercise: String,
        question: String,
        expected: usize,
        found: usize,
    },

    /// A row answer names a column the exercise does not declare.
    #[error("exercise '{exercise}': question '{question}' names unknown column '{column}'")]
    UnknownColumn {
        exercise: String,
        question: String,
        column: String,
    },

    /// A choice answer is not among the offered options.
    #[error("exercise '{exercise}': question '{question}': '{value}' is not one of the offered options")]
    NotAnOption {
        exercise: String,
        question: String,
        value: String,
    },

    /// Input was given for a locked example row.
    #[error("exercise '{exercise}': question '{question}' is a locked example")]
    LockedQuestion { exercise: String, question: String },

    /// Any other structural problem with an exercise definition.
    #[error("exercise '{exercise}': {message}")]
    Invalid { exercise: String, message: String },
}

/// Failures while serializing a report document.
///
/// A renderer that returns one of these has produced no bytes at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A character the report cannot carry at all, such as a control
    /// character.
    #[error("cannot encode {ch:?} in {location} with the report font")]
    Unencodable { location: String, ch: char },

    /// A row does not have one cell per header column.
    #[error("row {row} has {found} cells but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// The output document could not be written.
    #[error("failed to serialize report: {0}")]
    Serialize(String),
}

/// Reasons an export request did not produce a report.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A precondition is unmet; the action stays disabled.
    #[error("export blocked: {0}")]
    Blocked(ExportReadiness),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("report rendering failed: {0}")]
    Render(#[from] RenderError),
}
