//! Report document model and filename builder.
//!
//! A [`ReportDocument`] is the renderer-neutral table built from one
//! [`CheckedSnapshot`]: title block, header row, and one row per question
//! with incorrect graded cells flagged for highlighting.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RenderError};
use crate::model::{Answer, AnswerShape, ColumnVerdict, Exercise, Options, Outcome, Question};
use crate::session::CheckedSnapshot;
use crate::traits::ReportFormat;

const NO_SELECTION: &str = "(No selection)";
const NO_ANSWER: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCell {
    pub text: String,
    /// Drawn with inverted colours.
    pub highlight: bool,
}

impl ReportCell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlight: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub cells: Vec<ReportCell>,
}

/// Everything a renderer needs, and nothing it may change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub title: String,
    pub student: String,
    pub generated_at: NaiveDateTime,
    pub header: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl ReportDocument {
    /// Lay out `snapshot` as a table, one row per question in exercise order.
    ///
    /// Graded exercises get a trailing `Result` column. Fails if the
    /// snapshot lacks a verdict for some question or a verdict does not
    /// match the exercise's columns.
    pub fn build(
        exercise: &Exercise,
        student: &str,
        generated_at: NaiveDateTime,
        snapshot: &CheckedSnapshot,
    ) -> Result<Self, ConfigError> {
        let graded = exercise.is_graded();

        let mut header = vec![exercise.label_header.clone()];
        if exercise.shape.is_row() {
            header.extend(exercise.columns.iter().map(|c| c.name.clone()));
        } else {
            header.push("Selected".to_string());
        }
        if graded {
            header.push("Result".to_string());
        }

        let mut rows = Vec::with_capacity(exercise.questions.len());
        for (index, question) in exercise.questions.iter().enumerate() {
            let verdict = snapshot
                .verdict(&question.id)
                .ok_or_else(|| ConfigError::Invalid {
                    exercise: exercise.id.clone(),
                    message: format!("no verdict for question '{}'", question.id),
                })?;
            let answer = snapshot.submission.get(&question.id);

            let mut cells = Vec::with_capacity(header.len());
            match (&verdict.outcome, exercise.shape.is_row()) {
                (Outcome::Row(columns), true) if columns.len() == exercise.columns.len() => {
                    cells.push(ReportCell::plain(question.label.clone()));
                    let submitted: &[String] = match answer {
                        Some(Answer::Row(values)) => values,
                        _ => &[],
                    };
                    for (i, column_verdict) in columns.iter().enumerate() {
                        cells.push(ReportCell {
                            text: submitted.get(i).cloned().unwrap_or_default(),
                            highlight: *column_verdict == ColumnVerdict::Incorrect,
                        });
                    }
                }
                (Outcome::Single(correct), false) => {
                    cells.push(ReportCell::plain(format!(
                        "{}. {}",
                        index + 1,
                        question.display_text()
                    )));
                    cells.push(ReportCell {
                        text: selection_text(exercise.shape, question, answer),
                        highlight: !correct,
                    });
                }
                _ => {
                    return Err(ConfigError::Invalid {
                        exercise: exercise.id.clone(),
                        message: format!(
                            "verdict for question '{}' does not match the exercise layout",
                            question.id
                        ),
                    });
                }
            }
            if graded {
                let result = if verdict.is_correct() { "Correct" } else { "Incorrect" };
                cells.push(ReportCell::plain(result));
            }
            rows.push(ReportRow { cells });
        }

        Ok(Self {
            title: exercise.report_title.clone(),
            student: student.trim().to_string(),
            generated_at,
            header,
            rows,
        })
    }

    /// Generation time as printed in the title block.
    pub fn timestamp_line(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M").to_string()
    }

    /// `(row, column)` positions of highlighted cells.
    pub fn highlighted_cells(&self) -> Vec<(usize, usize)> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.cells
                    .iter()
                    .enumerate()
                    .filter(|(_, cell)| cell.highlight)
                    .map(move |(c, _)| (r, c))
            })
            .collect()
    }

    /// Every row must have exactly one cell per header column.
    pub fn validate(&self) -> Result<(), RenderError> {
        for (row, r) in self.rows.iter().enumerate() {
            if r.cells.len() != self.header.len() {
                return Err(RenderError::RaggedRow {
                    row,
                    expected: self.header.len(),
                    found: r.cells.len(),
                });
            }
        }
        Ok(())
    }
}

fn selection_text(shape: AnswerShape, question: &Question, answer: Option<&Answer>) -> String {
    match (shape, answer) {
        (AnswerShape::MultiselectSet, Some(Answer::Set(items))) if !items.is_empty() => {
            // Option order, then anything the options do not list.
            let offered: &[String] = match &question.options {
                Some(Options::Text(words)) => words.as_slice(),
                _ => &[],
            };
            let mut picked: Vec<&str> = offered
                .iter()
                .filter(|w| items.contains(*w))
                .map(String::as_str)
                .collect();
            picked.extend(
                items
                    .iter()
                    .filter(|i| !offered.contains(*i))
                    .map(String::as_str),
            );
            picked.join(", ")
        }
        (AnswerShape::MultiselectSet, _) => NO_SELECTION.to_string(),
        (_, Some(Answer::Text(text))) if !text.trim().is_empty() => text.clone(),
        (_, Some(Answer::Number(n))) => n.to_string(),
        _ => NO_ANSWER.to_string(),
    }
}

/// Characters no common filesystem accepts in a file name.
const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Replace whitespace, control characters and reserved filename characters
/// in a student name.
pub fn sanitize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c.is_control() || RESERVED.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// `{tag}_Report_{name}_{YYYYMMDD_HHMM}.{ext}`
pub fn suggested_filename(
    tag: &str,
    name: &str,
    timestamp: NaiveDateTime,
    format: ReportFormat,
) -> String {
    format!(
        "{}_Report_{}_{}.{}",
        tag,
        sanitize_name(name),
        timestamp.format("%Y%m%d_%H%M"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::evaluate_exercise;
    use crate::model::{Column, Submission};
    use std::collections::BTreeSet;

    fn at() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 59)
            .unwrap()
    }

    fn snapshot(exercise: &Exercise, submission: Submission) -> CheckedSnapshot {
        let verdicts = evaluate_exercise(exercise, &submission).unwrap();
        CheckedSnapshot {
            submission,
            verdicts,
            checked_at: at(),
        }
    }

    fn row_exercise() -> Exercise {
        let column = |name: &str, required: bool| Column {
            name: name.into(),
            required,
            options: Vec::new(),
        };
        Exercise {
            id: "chart".into(),
            tag: "ExerciseChart".into(),
            title: "Chart".into(),
            report_title: "Chart Report".into(),
            heading: String::new(),
            instructions: String::new(),
            shape: AnswerShape::FreeTextRow,
            label_header: "Symbol".into(),
            columns: vec![column("Place", true), column("Manner", true), column("Other", false)],
            questions: vec![Question {
                id: "1".into(),
                label: "[s]".into(),
                prompt: String::new(),
                options: None,
                image: None,
                example: false,
            }],
            key: [(
                "1".to_string(),
                Answer::Row(vec!["alveolar".into(), "fricative".into(), String::new()]),
            )]
            .into_iter()
            .collect(),
        }
    }

    fn multiselect_exercise() -> Exercise {
        Exercise {
            id: "words".into(),
            tag: "ExerciseWords".into(),
            title: "Words".into(),
            report_title: "Words Report".into(),
            heading: String::new(),
            instructions: String::new(),
            shape: AnswerShape::MultiselectSet,
            label_header: "Question".into(),
            columns: Vec::new(),
            questions: vec![Question {
                id: "1".into(),
                label: "1".into(),
                prompt: "Words ending in a nasal".into(),
                options: Some(Options::Text(vec![
                    "pen".into(),
                    "bet".into(),
                    "ram".into(),
                ])),
                image: None,
                example: false,
            }],
            key: [(
                "1".to_string(),
                Answer::Set(["ram", "pen"].iter().map(|s| s.to_string()).collect()),
            )]
            .into_iter()
            .collect(),
        }
    }

    #[test]
    fn row_report_highlights_incorrect_required_columns() {
        let ex = row_exercise();
        let submission: Submission = [(
            "1".to_string(),
            Answer::Row(vec!["Alveolar".into(), "stop".into(), "sibilant".into()]),
        )]
        .into_iter()
        .collect();
        let doc = ReportDocument::build(&ex, " Ada ", at(), &snapshot(&ex, submission)).unwrap();

        assert_eq!(doc.header, vec!["Symbol", "Place", "Manner", "Other", "Result"]);
        assert_eq!(doc.student, "Ada");
        let texts: Vec<&str> = doc.rows[0].cells.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["[s]", "Alveolar", "stop", "sibilant", "Incorrect"]);
        assert_eq!(doc.highlighted_cells(), vec![(0, 2)]);
        doc.validate().unwrap();
    }

    #[test]
    fn unanswered_row_highlights_every_required_cell() {
        let ex = row_exercise();
        let doc = ReportDocument::build(&ex, "Ada", at(), &snapshot(&ex, Submission::new())).unwrap();
        assert_eq!(doc.highlighted_cells(), vec![(0, 1), (0, 2)]);
        assert_eq!(doc.rows[0].cells[1].text, "");
    }

    #[test]
    fn multiselect_shows_selection_in_option_order() {
        let ex = multiselect_exercise();
        let submission: Submission = [(
            "1".to_string(),
            Answer::Set(["ram", "pen"].iter().map(|s| s.to_string()).collect()),
        )]
        .into_iter()
        .collect();
        let doc = ReportDocument::build(&ex, "Ada", at(), &snapshot(&ex, submission)).unwrap();
        assert_eq!(doc.header, vec!["Question", "Selected", "Result"]);
        assert_eq!(doc.rows[0].cells[0].text, "1. Words ending in a nasal");
        assert_eq!(doc.rows[0].cells[1].text, "pen, ram");
        assert_eq!(doc.rows[0].cells[2].text, "Correct");
        assert!(doc.highlighted_cells().is_empty());
    }

    #[test]
    fn empty_multiselect_reads_no_selection() {
        let ex = multiselect_exercise();
        let submission: Submission = [("1".to_string(), Answer::Set(BTreeSet::new()))]
            .into_iter()
            .collect();
        let doc = ReportDocument::build(&ex, "Ada", at(), &snapshot(&ex, submission)).unwrap();
        assert_eq!(doc.rows[0].cells[1].text, "(No selection)");
        assert_eq!(doc.highlighted_cells(), vec![(0, 1)]);
    }

    #[test]
    fn ungraded_exercise_has_no_result_column() {
        let mut ex = row_exercise();
        for column in &mut ex.columns {
            column.required = false;
        }
        let doc = ReportDocument::build(&ex, "Ada", at(), &snapshot(&ex, Submission::new())).unwrap();
        assert_eq!(doc.header, vec!["Symbol", "Place", "Manner", "Other"]);
        assert!(doc.highlighted_cells().is_empty());
    }

    #[test]
    fn missing_verdict_is_a_config_error() {
        let ex = row_exercise();
        let snap = CheckedSnapshot {
            submission: Submission::new(),
            verdicts: Vec::new(),
            checked_at: at(),
        };
        assert!(ReportDocument::build(&ex, "Ada", at(), &snap).is_err());
    }

    #[test]
    fn ragged_rows_fail_validation() {
        let doc = ReportDocument {
            title: "T".into(),
            student: "S".into(),
            generated_at: at(),
            header: vec!["A".into(), "B".into()],
            rows: vec![ReportRow {
                cells: vec![ReportCell::plain("only one")],
            }],
        };
        assert_eq!(
            doc.validate(),
            Err(RenderError::RaggedRow {
                row: 0,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn filename_pattern() {
        assert_eq!(
            suggested_filename("ExerciseB", "  Ada  Lovelace ", at(), ReportFormat::Pdf),
            "ExerciseB_Report_Ada__Lovelace_20240305_1407.pdf"
        );
        assert_eq!(
            suggested_filename("ExerciseK", "a/b\\c", at(), ReportFormat::Html),
            "ExerciseK_Report_a_b_c_20240305_1407.html"
        );
    }

    #[test]
    fn filename_drops_reserved_characters() {
        assert_eq!(sanitize_name(r#"A:B*C?D"E<F>G|H"#), "A_B_C_D_E_F_G_H");
        assert_eq!(sanitize_name("Ada\u{7}"), "Ada_");
        assert_eq!(
            suggested_filename("ExerciseL", "김민수", at(), ReportFormat::Pdf),
            "ExerciseL_Report_김민수_20240305_1407.pdf"
        );
    }

    #[test]
    fn timestamp_line_has_minute_precision() {
        let ex = row_exercise();
        let doc = ReportDocument::build(&ex, "Ada", at(), &snapshot(&ex, Submission::new())).unwrap();
        assert_eq!(doc.timestamp_line(), "2024-03-05 14:07");
    }
}
