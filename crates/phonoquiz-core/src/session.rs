//! Per-page session state.
//!
//! A [`SessionState`] is created for each page load and passed explicitly to
//! the [`PageController`](crate::controller::PageController). Its lifecycle:
//!
//! 1. `new` pre-fills locked example rows from the key;
//! 2. `set_name` / `set_answer` mutate the working submission;
//! 3. a check stores a [`CheckedSnapshot`] of the submission and its verdicts;
//! 4. `clear_inputs` starts a new attempt but keeps the snapshot;
//! 5. export renders the snapshot, then `reset` discards it.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConfigError;
use crate::model::{Answer, Exercise, Submission, Verdict};

/// Submission and verdicts captured together by one check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckedSnapshot {
    pub submission: Submission,
    /// One verdict per question, in exercise order.
    pub verdicts: Vec<Verdict>,
    pub checked_at: NaiveDateTime,
}

impl CheckedSnapshot {
    pub fn correct(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_correct()).count()
    }

    pub fn total(&self) -> usize {
        self.verdicts.len()
    }

    pub fn verdict(&self, question_id: &str) -> Option<&Verdict> {
        self.verdicts.iter().find(|v| v.question_id == question_id)
    }
}

/// Whether the export action is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportReadiness {
    Ready,
    NameMissing,
    NotChecked,
}

impl ExportReadiness {
    pub fn is_ready(self) -> bool {
        self == ExportReadiness::Ready
    }

    /// Inline warning shown next to the disabled export action.
    pub fn warning(self) -> Option<&'static str> {
        match self {
            ExportReadiness::Ready => None,
            ExportReadiness::NameMissing => Some("Please enter your name to enable PDF download."),
            ExportReadiness::NotChecked => Some("First check your work to generate a report."),
        }
    }
}

impl fmt::Display for ExportReadiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.warning().unwrap_or("ready to export"))
    }
}

/// Form state for one student working on one exercise.
#[derive(Debug, Clone)]
pub struct SessionState {
    id: Uuid,
    exercise_id: String,
    name: String,
    submission: Submission,
    /// Inputs changed since the last check.
    dirty: bool,
    snapshot: Option<CheckedSnapshot>,
}

impl SessionState {
    pub fn new(exercise: &Exercise) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            exercise_id: exercise.id.clone(),
            name: String::new(),
            submission: prefilled(exercise),
            dirty: false,
            snapshot: None,
        };
        tracing::debug!(session = %session.id, exercise = %exercise.id, "session started");
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn exercise_id(&self) -> &str {
        &self.exercise_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn snapshot(&self) -> Option<&CheckedSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record one widget value.
    ///
    /// Rejects unknown questions, locked example rows, and values the
    /// question's widgets could not have produced.
    pub fn set_answer(
        &mut self,
        exercise: &Exercise,
        question_id: &str,
        answer: Answer,
    ) -> Result<(), ConfigError> {
        self.ensure_exercise(exercise)?;
        admit(exercise, question_id, &answer)?;

        self.submission.insert(question_id, answer);
        self.dirty = true;
        Ok(())
    }

    /// Record every answer of `submission`, in question order.
    ///
    /// All or nothing: if any answer is rejected the working submission is
    /// left as it was.
    pub fn fill(&mut self, exercise: &Exercise, submission: &Submission) -> Result<(), ConfigError> {
        self.ensure_exercise(exercise)?;
        if let Some(id) = submission
            .iter()
            .map(|(id, _)| id)
            .filter(|id| exercise.question(id).is_none())
            .min()
        {
            return Err(ConfigError::UnknownQuestion {
                exercise: exercise.id.clone(),
                question: id.to_string(),
            });
        }

        let mut staged = self.submission.clone();
        let mut changed = false;
        for question in &exercise.questions {
            if let Some(answer) = submission.get(&question.id) {
                admit(exercise, &question.id, answer)?;
                staged.insert(question.id.as_str(), answer.clone());
                changed = true;
            }
        }
        if changed {
            self.submission = staged;
            self.dirty = true;
        }
        Ok(())
    }

    pub(crate) fn record_check(
        &mut self,
        verdicts: Vec<Verdict>,
        checked_at: NaiveDateTime,
    ) -> &CheckedSnapshot {
        self.dirty = false;
        self.snapshot.insert(CheckedSnapshot {
            submission: self.submission.clone(),
            verdicts,
            checked_at,
        })
    }

    /// Start a new attempt. The last check's snapshot is kept for export.
    pub fn clear_inputs(&mut self, exercise: &Exercise) {
        self.submission = prefilled(exercise);
        self.dirty = false;
    }

    /// Drop inputs and the snapshot; the student name is kept.
    pub fn reset(&mut self, exercise: &Exercise) {
        self.clear_inputs(exercise);
        self.snapshot = None;
        tracing::debug!(session = %self.id, "session reset");
    }

    pub fn export_readiness(&self) -> ExportReadiness {
        if self.name.trim().is_empty() {
            ExportReadiness::NameMissing
        } else if self.snapshot.is_none() {
            ExportReadiness::NotChecked
        } else {
            ExportReadiness::Ready
        }
    }

    fn ensure_exercise(&self, exercise: &Exercise) -> Result<(), ConfigError> {
        if exercise.id == self.exercise_id {
            Ok(())
        } else {
            Err(ConfigError::Invalid {
                exercise: exercise.id.clone(),
                message: format!("session belongs to exercise '{}'", self.exercise_id),
            })
        }
    }
}

/// Check that `answer` may be recorded for `question_id`: the question
/// exists, is not a locked example, and the value fits its widgets.
fn admit(exercise: &Exercise, question_id: &str, answer: &Answer) -> Result<(), ConfigError> {
    let question = exercise
        .question(question_id)
        .ok_or_else(|| ConfigError::UnknownQuestion {
            exercise: exercise.id.clone(),
            question: question_id.to_string(),
        })?;
    if question.example {
        return Err(ConfigError::LockedQuestion {
            exercise: exercise.id.clone(),
            question: question_id.to_string(),
        });
    }
    exercise.check_answer(question, answer)
}

/// A submission holding only the locked example rows.
fn prefilled(exercise: &Exercise) -> Submission {
    exercise
        .questions
        .iter()
        .filter(|q| q.example)
        .filter_map(|q| exercise.key.get(&q.id).map(|a| (q.id.clone(), a.clone())))
        .collect()
}
