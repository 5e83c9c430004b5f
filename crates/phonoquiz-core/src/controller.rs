//! Page controller: wires an exercise, a session, and a renderer.
//!
//! Evaluation only happens on an explicit [`PageController::check`]; export
//! renders the snapshot that check captured.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::comparator::{evaluate_exercise, verify_alignment};
use crate::error::{ConfigError, ExportError};
use crate::model::{Exercise, Outcome};
use crate::report::{suggested_filename, ReportDocument};
use crate::session::{CheckedSnapshot, ExportReadiness, SessionState};
use crate::traits::{ReportFormat, ReportRenderer};

/// One line of on-page feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackLine {
    /// 1-based position on the page.
    pub number: usize,
    pub question_id: String,
    pub label: String,
    pub correct: bool,
    /// Names of the columns that need revision, for row shapes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wrong_columns: Vec<String>,
    #[serde(skip)]
    graded: bool,
}

impl fmt::Display for FeedbackLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match (self.graded, self.correct) {
            (false, _) => "Recorded",
            (true, true) => "Correct",
            (true, false) => "Needs revision",
        };
        write!(f, "{}. {} — {}", self.number, self.label, status)
    }
}

/// Feedback for a whole check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub exercise_id: String,
    pub graded: bool,
    pub correct: usize,
    pub total: usize,
    pub lines: Vec<FeedbackLine>,
}

impl Feedback {
    pub fn summary(&self) -> String {
        if self.graded {
            format!("Score: {} / {}", self.correct, self.total)
        } else {
            format!("Responses recorded for {} items.", self.total)
        }
    }

    pub fn all_correct(&self) -> bool {
        self.correct == self.total
    }
}

/// A rendered report, ready for delivery.
#[derive(Debug, Clone)]
pub struct ExportedReport {
    pub filename: String,
    pub format: ReportFormat,
    pub bytes: Vec<u8>,
    pub correct: usize,
    pub total: usize,
}

/// Drives one exercise page.
#[derive(Debug, Clone)]
pub struct PageController {
    exercise: Exercise,
}

impl PageController {
    /// Fails loudly if the exercise's questions and key do not line up.
    pub fn new(exercise: Exercise) -> Result<Self, ConfigError> {
        verify_alignment(&exercise)?;
        Ok(Self { exercise })
    }

    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    pub fn start_session(&self) -> SessionState {
        SessionState::new(&self.exercise)
    }

    /// Grade the working submission and store it with its verdicts.
    pub fn check<'s>(
        &self,
        session: &'s mut SessionState,
        now: NaiveDateTime,
    ) -> Result<&'s CheckedSnapshot, ConfigError> {
        let verdicts = evaluate_exercise(&self.exercise, session.submission())?;
        let session_id = session.id();
        let snapshot = session.record_check(verdicts, now);
        tracing::info!(
            session = %session_id,
            exercise = %self.exercise.id,
            correct = snapshot.correct(),
            total = snapshot.total(),
            "checked"
        );
        Ok(snapshot)
    }

    /// Per-question feedback lines for a snapshot.
    pub fn feedback(&self, snapshot: &CheckedSnapshot) -> Feedback {
        let graded = self.exercise.is_graded();
        let lines = self
            .exercise
            .questions
            .iter()
            .enumerate()
            .filter_map(|(i, q)| {
                let verdict = snapshot.verdict(&q.id)?;
                let wrong_columns = match verdict.outcome {
                    Outcome::Row(_) => verdict
                        .incorrect_columns()
                        .into_iter()
                        .filter_map(|c| self.exercise.columns.get(c).map(|col| col.name.clone()))
                        .collect(),
                    Outcome::Single(_) => Vec::new(),
                };
                let label = if self.exercise.shape.is_row() {
                    q.label.clone()
                } else {
                    q.display_text().to_string()
                };
                Some(FeedbackLine {
                    number: i + 1,
                    question_id: q.id.clone(),
                    label,
                    correct: verdict.is_correct(),
                    wrong_columns,
                    graded,
                })
            })
            .collect();

        Feedback {
            exercise_id: self.exercise.id.clone(),
            graded,
            correct: snapshot.correct(),
            total: snapshot.total(),
            lines,
        }
    }

    /// Render the last checked snapshot, then reset the session.
    ///
    /// Blocked until the student has entered a name and checked at least
    /// once. Inputs changed after the check are not reported.
    pub fn export(
        &self,
        session: &mut SessionState,
        renderer: &dyn ReportRenderer,
        now: NaiveDateTime,
    ) -> Result<ExportedReport, ExportError> {
        let readiness = session.export_readiness();
        if !readiness.is_ready() {
            return Err(ExportError::Blocked(readiness));
        }
        let Some(snapshot) = session.snapshot() else {
            return Err(ExportError::Blocked(ExportReadiness::NotChecked));
        };
        if session.is_dirty() {
            tracing::warn!(
                session = %session.id(),
                "inputs changed since the last check; exporting the checked answers"
            );
        }

        let document = ReportDocument::build(&self.exercise, session.name(), now, snapshot)?;
        let bytes = renderer.render(&document)?;
        let format = renderer.format();
        let report = ExportedReport {
            filename: suggested_filename(&self.exercise.tag, session.name(), now, format),
            format,
            bytes,
            correct: snapshot.correct(),
            total: snapshot.total(),
        };

        tracing::info!(
            session = %session.id(),
            exercise = %self.exercise.id,
            file = %report.filename,
            bytes = report.bytes.len(),
            "exported"
        );
        session.reset(&self.exercise);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::model::{Answer, AnswerShape, Column, Question};
    use std::cell::RefCell;

    /// Records the documents it is asked to render.
    #[derive(Default)]
    struct RecordingRenderer {
        seen: RefCell<Vec<ReportDocument>>,
        fail: bool,
    }

    impl ReportRenderer for RecordingRenderer {
        fn format(&self) -> ReportFormat {
            ReportFormat::Html
        }

        fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, RenderError> {
            if self.fail {
                return Err(RenderError::Serialize("disk full".into()));
            }
            self.seen.borrow_mut().push(document.clone());
            Ok(b"report".to_vec())
        }
    }

    fn exercise() -> Exercise {
        let column = |name: &str| Column {
            name: name.into(),
            required: true,
            options: Vec::new(),
        };
        let question = |id: &str, label: &str| Question {
            id: id.into(),
            label: label.into(),
            prompt: String::new(),
            options: None,
            image: None,
            example: false,
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
            columns: vec![column("Place"), column("Manner")],
            questions: vec![question("1", "[s]"), question("2", "[k]")],
            key: [
                ("1".to_string(), row(&["alveolar", "fricative"])),
                ("2".to_string(), row(&["velar", "stop"])),
            ]
            .into_iter()
            .collect(),
        }
    }

    fn row(cells: &[&str]) -> Answer {
        Answer::Row(cells.iter().map(|c| c.to_string()).collect())
    }

    fn now() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn misaligned_exercise_is_rejected() {
        let mut ex = exercise();
        ex.key = [("1".to_string(), row(&["alveolar", "fricative"]))]
            .into_iter()
            .collect();
        assert!(matches!(
            PageController::new(ex),
            Err(ConfigError::MissingKey { .. })
        ));
    }

    #[test]
    fn check_produces_feedback() {
        let page = PageController::new(exercise()).unwrap();
        let mut session = page.start_session();
        session
            .set_answer(page.exercise(), "1", row(&["Alveolar", "(fricative)"]))
            .unwrap();
        session
            .set_answer(page.exercise(), "2", row(&["velar", "nasal"]))
            .unwrap();

        let snapshot = page.check(&mut session, now()).unwrap().clone();
        let feedback = page.feedback(&snapshot);
        assert_eq!(feedback.correct, 1);
        assert_eq!(feedback.summary(), "Score: 1 / 2");
        assert_eq!(feedback.lines[0].to_string(), "1. [s] — Correct");
        assert_eq!(feedback.lines[1].to_string(), "2. [k] — Needs revision");
        assert_eq!(feedback.lines[1].wrong_columns, vec!["Manner"]);
    }

    #[test]
    fn export_is_gated_on_name_then_check() {
        let page = PageController::new(exercise()).unwrap();
        let renderer = RecordingRenderer::default();
        let mut session = page.start_session();

        let err = page.export(&mut session, &renderer, now()).unwrap_err();
        assert!(matches!(err, ExportError::Blocked(ExportReadiness::NameMissing)));

        session.set_name("Ada Lovelace");
        let err = page.export(&mut session, &renderer, now()).unwrap_err();
        assert!(matches!(err, ExportError::Blocked(ExportReadiness::NotChecked)));
        assert!(renderer.seen.borrow().is_empty());
    }

    #[test]
    fn export_reports_snapshot_taken_before_clear() {
        let page = PageController::new(exercise()).unwrap();
        let renderer = RecordingRenderer::default();
        let mut session = page.start_session();
        session.set_name("Ada Lovelace");
        session
            .set_answer(page.exercise(), "1", row(&["alveolar", "fricative"]))
            .unwrap();
        page.check(&mut session, now()).unwrap();
        session.clear_inputs(page.exercise());

        let report = page.export(&mut session, &renderer, now()).unwrap();
        assert_eq!(report.filename, "ExerciseChart_Report_Ada_Lovelace_20240305_0930.html");
        assert_eq!(report.bytes, b"report");
        assert_eq!((report.correct, report.total), (1, 2));

        let seen = renderer.seen.borrow();
        assert_eq!(seen[0].rows[0].cells[1].text, "alveolar");
        assert!(!seen[0].rows[0].cells[1].highlight);

        assert!(session.snapshot().is_none());
        assert_eq!(session.export_readiness(), ExportReadiness::NotChecked);
    }

    #[test]
    fn render_failure_keeps_session() {
        let page = PageController::new(exercise()).unwrap();
        let renderer = RecordingRenderer {
            fail: true,
            ..Default::default()
        };
        let mut session = page.start_session();
        session.set_name("Ada");
        page.check(&mut session, now()).unwrap();

        let err = page.export(&mut session, &renderer, now()).unwrap_err();
        assert!(matches!(err, ExportError::Render(_)));
        assert!(session.snapshot().is_some());
    }

    #[test]
    fn ungraded_feedback_records_responses() {
        let mut ex = exercise();
        for column in &mut ex.columns {
            column.required = false;
        }
        let page = PageController::new(ex).unwrap();
        let mut session = page.start_session();
        let snapshot = page.check(&mut session, now()).unwrap().clone();
        let feedback = page.feedback(&snapshot);
        assert!(!feedback.graded);
        assert!(feedback.all_correct());
        assert_eq!(feedback.summary(), "Responses recorded for 2 items.");
        assert_eq!(feedback.lines[0].to_string(), "1. [s] — Recorded");
    }
}
