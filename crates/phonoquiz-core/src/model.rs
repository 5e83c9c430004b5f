//! Core data model types for phonoquiz.
//!
//! An [`Exercise`] is one quiz page: its questions, the columns or options
//! students answer with, and the hidden [`AnswerKey`]. A [`Submission`] holds
//! what a student entered; a [`Verdict`] is the comparator's judgement of one
//! question.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How a question's expected answer is structured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnswerShape {
    /// A row of free-text cells, one per column.
    FreeTextRow,
    /// A row of cells, each picked from its column's fixed option list.
    FixedColumnsRow,
    /// Any subset of the offered words; order is irrelevant.
    MultiselectSet,
    /// Exactly one of the offered words.
    SingleChoiceText,
    /// Exactly one of the offered numbers.
    SingleChoiceNumeric,
}

impl AnswerShape {
    /// Whether answers of this shape are rows of per-column cells.
    pub fn is_row(self) -> bool {
        matches!(self, AnswerShape::FreeTextRow | AnswerShape::FixedColumnsRow)
    }

    /// Whether questions of this shape pick from an option list.
    pub fn is_choice(self) -> bool {
        !self.is_row()
    }
}

impl fmt::Display for AnswerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerShape::FreeTextRow => write!(f, "free-text-row"),
            AnswerShape::FixedColumnsRow => write!(f, "fixed-columns-row"),
            AnswerShape::MultiselectSet => write!(f, "multiselect-set"),
            AnswerShape::SingleChoiceText => write!(f, "single-choice-text"),
            AnswerShape::SingleChoiceNumeric => write!(f, "single-choice-numeric"),
        }
    }
}

impl FromStr for AnswerShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "free-text-row" | "free-text" => Ok(AnswerShape::FreeTextRow),
            "fixed-columns-row" | "fixed-columns" => Ok(AnswerShape::FixedColumnsRow),
            "multiselect-set" | "multiselect" => Ok(AnswerShape::MultiselectSet),
            "single-choice-text" | "single-choice" => Ok(AnswerShape::SingleChoiceText),
            "single-choice-numeric" | "numeric" => Ok(AnswerShape::SingleChoiceNumeric),
            other => Err(format!("unknown answer shape: {other}")),
        }
    }
}

/// A column of a row-shaped exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Header text, also the key students use in submission files.
    pub name: String,
    /// Whether the column counts towards the verdict.
    #[serde(default)]
    pub required: bool,
    /// Allowed values; empty for free text.
    #[serde(default)]
    pub options: Vec<String>,
}

/// The options offered by a choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Options {
    Numeric(Vec<i64>),
    Text(Vec<String>),
}

impl Options {
    pub fn len(&self) -> usize {
        match self {
            Options::Numeric(v) => v.len(),
            Options::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display labels in offered order.
    pub fn labels(&self) -> Vec<String> {
        match self {
            Options::Numeric(v) => v.iter().map(|n| n.to_string()).collect(),
            Options::Text(v) => v.clone(),
        }
    }

    pub fn contains_text(&self, value: &str) -> bool {
        matches!(self, Options::Text(v) if v.iter().any(|o| o == value))
    }

    pub fn contains_number(&self, value: i64) -> bool {
        matches!(self, Options::Numeric(v) if v.contains(&value))
    }
}

/// A single quiz item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the exercise.
    pub id: String,
    /// Display label (an IPA symbol, a word, a diagram letter).
    pub label: String,
    /// Prompt text; may be empty for row-shaped exercises.
    #[serde(default)]
    pub prompt: String,
    /// Offered options for choice shapes.
    #[serde(default)]
    pub options: Option<Options>,
    /// Externally hosted diagram for this item.
    #[serde(default)]
    pub image: Option<String>,
    /// Pre-filled demonstration row that students cannot edit.
    #[serde(default)]
    pub example: bool,
}

impl Question {
    /// Text shown for the question in feedback and reports.
    pub fn display_text(&self) -> &str {
        if self.prompt.trim().is_empty() {
            &self.label
        } else {
            &self.prompt
        }
    }
}

/// A student answer or a reference answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Answer {
    /// One cell per exercise column, in column order.
    Row(Vec<String>),
    Set(BTreeSet<String>),
    Text(String),
    Number(i64),
}

impl Answer {
    /// Short name of the answer's structure, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Answer::Row(_) => "row",
            Answer::Set(_) => "set",
            Answer::Text(_) => "text",
            Answer::Number(_) => "number",
        }
    }

    /// Whether this answer has the structure `shape` requires.
    pub fn fits(&self, shape: AnswerShape) -> bool {
        matches!(
            (self, shape),
            (Answer::Row(_), AnswerShape::FreeTextRow | AnswerShape::FixedColumnsRow)
                | (Answer::Set(_), AnswerShape::MultiselectSet)
                | (Answer::Text(_), AnswerShape::SingleChoiceText)
                | (Answer::Number(_), AnswerShape::SingleChoiceNumeric)
        )
    }
}

/// Reference answers, keyed by question id. Built by the exercise loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerKey {
    entries: HashMap<String, Answer>,
}

impl AnswerKey {
    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.entries.get(question_id)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.entries.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Answer)> for AnswerKey {
    fn from_iter<I: IntoIterator<Item = (String, Answer)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A student's current answers, keyed by question id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    answers: HashMap<String, Answer>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    pub fn insert(&mut self, question_id: impl Into<String>, answer: Answer) -> Option<Answer> {
        self.answers.insert(question_id.into(), answer)
    }

    pub fn remove(&mut self, question_id: &str) -> Option<Answer> {
        self.answers.remove(question_id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Answer)> {
        self.answers.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Answer)> for Submission {
    fn from_iter<I: IntoIterator<Item = (String, Answer)>>(iter: I) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

/// Judgement of one column of a row answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnVerdict {
    Correct,
    Incorrect,
    /// Optional column, excluded from grading.
    Unchecked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Row(Vec<ColumnVerdict>),
    Single(bool),
}

/// The comparator's judgement of one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub question_id: String,
    pub outcome: Outcome,
}

impl Verdict {
    /// True iff no graded part of the answer is wrong.
    pub fn is_correct(&self) -> bool {
        match &self.outcome {
            Outcome::Row(columns) => columns.iter().all(|c| *c != ColumnVerdict::Incorrect),
            Outcome::Single(correct) => *correct,
        }
    }

    /// Indices of incorrect columns; for single answers, `[0]` when wrong.
    pub fn incorrect_columns(&self) -> Vec<usize> {
        match &self.outcome {
            Outcome::Row(columns) => columns
                .iter()
                .enumerate()
                .filter(|(_, c)| **c == ColumnVerdict::Incorrect)
                .map(|(i, _)| i)
                .collect(),
            Outcome::Single(true) => Vec::new(),
            Outcome::Single(false) => vec![0],
        }
    }
}

/// One quiz page: questions, answer layout, and the hidden key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Unique identifier (e.g. "ch1-b").
    pub id: String,
    /// Filename prefix for reports (e.g. "ExerciseB").
    pub tag: String,
    /// Page title.
    pub title: String,
    /// Title printed at the top of the report.
    pub report_title: String,
    /// One-line task statement.
    #[serde(default)]
    pub heading: String,
    /// Longer instructions for students.
    #[serde(default)]
    pub instructions: String,
    pub shape: AnswerShape,
    /// Header of the first report column.
    pub label_header: String,
    /// Answer columns for row shapes; empty otherwise.
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Questions in display order.
    pub questions: Vec<Question>,
    pub key: AnswerKey,
}

impl Exercise {
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Whether any part of a submission is actually graded.
    pub fn is_graded(&self) -> bool {
        !self.shape.is_row() || self.columns.iter().any(|c| c.required)
    }

    /// Diagram URL for the question labelled `label`.
    pub fn image_url(&self, label: &str) -> Option<&str> {
        self.questions
            .iter()
            .find(|q| q.label == label)
            .and_then(|q| q.image.as_deref())
    }

    /// The answer an untouched form produces, if the shape has one.
    ///
    /// Numeric questions have no blank value; an unanswered one is simply
    /// absent from the submission.
    pub fn blank_answer(&self) -> Option<Answer> {
        match self.shape {
            AnswerShape::FreeTextRow | AnswerShape::FixedColumnsRow => {
                Some(Answer::Row(vec![String::new(); self.columns.len()]))
            }
            AnswerShape::MultiselectSet => Some(Answer::Set(BTreeSet::new())),
            AnswerShape::SingleChoiceText => Some(Answer::Text(String::new())),
            AnswerShape::SingleChoiceNumeric => None,
        }
    }

    /// Check that `answer` could have been produced by the question's widgets.
    ///
    /// Empty cells and empty text stand for "nothing selected" and are
    /// always accepted.
    pub fn check_answer(&self, question: &Question, answer: &Answer) -> Result<(), ConfigError> {
        if !answer.fits(self.shape) {
            return Err(ConfigError::ShapeMismatch {
                exercise: self.id.clone(),
                question: question.id.clone(),
                expected: self.shape,
                found: answer.kind().to_string(),
            });
        }

        let not_an_option = |value: String| ConfigError::NotAnOption {
            exercise: self.id.clone(),
            question: question.id.clone(),
            value,
        };

        match answer {
            Answer::Row(cells) => {
                if cells.len() != self.columns.len() {
                    return Err(ConfigError::ColumnCount {
                        exercise: self.id.clone(),
                        question: question.id.clone(),
                        expected: self.columns.len(),
                        found: cells.len(),
                    });
                }
                for (cell, column) in cells.iter().zip(&self.columns) {
                    if !column.options.is_empty()
                        && !cell.is_empty()
                        && !column.options.contains(cell)
                    {
                        return Err(not_an_option(cell.clone()));
                    }
                }
            }
            Answer::Set(items) => {
                if let Some(options) = &question.options {
                    if let Some(item) = items.iter().find(|i| !options.contains_text(i)) {
                        return Err(not_an_option(item.clone()));
                    }
                }
            }
            Answer::Text(text) => {
                if let Some(options) = &question.options {
                    if !text.is_empty() && !options.contains_text(text) {
                        return Err(not_an_option(text.clone()));
                    }
                }
            }
            Answer::Number(n) => {
                if let Some(options) = &question.options {
                    if !options.contains_number(*n) {
                        return Err(not_an_option(n.to_string()));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_display_and_parse() {
        assert_eq!(AnswerShape::FreeTextRow.to_string(), "free-text-row");
        assert_eq!(
            "multiselect".parse::<AnswerShape>().unwrap(),
            AnswerShape::MultiselectSet
        );
        assert_eq!(
            "Single_Choice_Numeric".parse::<AnswerShape>().unwrap(),
            AnswerShape::SingleChoiceNumeric
        );
        assert!("essay".parse::<AnswerShape>().is_err());
    }

    #[test]
    fn answer_fits_shape() {
        assert!(Answer::Row(vec![]).fits(AnswerShape::FixedColumnsRow));
        assert!(Answer::Number(3).fits(AnswerShape::SingleChoiceNumeric));
        assert!(!Answer::Text("3".into()).fits(AnswerShape::SingleChoiceNumeric));
        assert!(!Answer::Set(BTreeSet::new()).fits(AnswerShape::SingleChoiceText));
    }

    #[test]
    fn row_verdict_ignores_unchecked_columns() {
        let verdict = Verdict {
            question_id: "1".into(),
            outcome: Outcome::Row(vec![
                ColumnVerdict::Correct,
                ColumnVerdict::Unchecked,
                ColumnVerdict::Correct,
            ]),
        };
        assert!(verdict.is_correct());
        assert!(verdict.incorrect_columns().is_empty());

        let verdict = Verdict {
            question_id: "1".into(),
            outcome: Outcome::Row(vec![ColumnVerdict::Correct, ColumnVerdict::Incorrect]),
        };
        assert!(!verdict.is_correct());
        assert_eq!(verdict.incorrect_columns(), vec![1]);
    }

    #[test]
    fn display_text_prefers_prompt() {
        let q = Question {
            id: "1".into(),
            label: "1".into(),
            prompt: "Circle the words that end with a nasal.".into(),
            options: None,
            image: None,
            example: false,
        };
        assert_eq!(q.display_text(), "Circle the words that end with a nasal.");

        let q = Question {
            prompt: String::new(),
            label: "laugh".into(),
            ..q
        };
        assert_eq!(q.display_text(), "laugh");
    }

    #[test]
    fn options_membership() {
        let numeric = Options::Numeric(vec![1, 2, 3]);
        assert!(numeric.contains_number(2));
        assert!(!numeric.contains_text("2"));
        assert_eq!(numeric.labels(), vec!["1", "2", "3"]);

        let text = Options::Text(vec!["pen".into(), "mean".into()]);
        assert!(text.contains_text("mean"));
        assert!(!text.contains_number(1));
    }
}
