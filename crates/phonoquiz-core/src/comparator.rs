//! Answer comparison.
//!
//! Every exercise is graded by the same routine, parameterized by the
//! exercise's [`AnswerShape`](crate::model::AnswerShape):
//!
//! - row shapes compare each required column after [`normalize`], optional
//!   columns are reported as [`ColumnVerdict::Unchecked`];
//! - multiselect questions compare normalized sets, so order and duplicates
//!   do not matter;
//! - single-choice text compares normalized strings;
//! - single-choice numeric compares integers.
//!
//! A missing answer grades as incorrect. Misaligned keys or submissions are
//! reported as [`ConfigError`]s instead of being graded either way.

use std::collections::{BTreeSet, HashSet};

use crate::error::ConfigError;
use crate::model::{
    Answer, AnswerKey, ColumnVerdict, Exercise, Outcome, Question, Submission, Verdict,
};
use crate::normalize::{normalize, normalize_set};

/// Grade one question of `exercise` against `key`.
///
/// Pure: the same inputs always give the same verdict.
pub fn evaluate(
    exercise: &Exercise,
    question: &Question,
    submission: &Submission,
    key: &AnswerKey,
) -> Result<Verdict, ConfigError> {
    let expected = key.get(&question.id).ok_or_else(|| ConfigError::MissingKey {
        exercise: exercise.id.clone(),
        question: question.id.clone(),
    })?;
    let shape_mismatch = |found: &Answer| ConfigError::ShapeMismatch {
        exercise: exercise.id.clone(),
        question: question.id.clone(),
        expected: exercise.shape,
        found: found.kind().to_string(),
    };
    if !expected.fits(exercise.shape) {
        return Err(shape_mismatch(expected));
    }

    let submitted = submission.get(&question.id);
    if let Some(answer) = submitted {
        if !answer.fits(exercise.shape) {
            return Err(shape_mismatch(answer));
        }
    }

    let outcome = match expected {
        Answer::Row(expected_cells) => {
            let column_count = |found: usize| ConfigError::ColumnCount {
                exercise: exercise.id.clone(),
                question: question.id.clone(),
                expected: exercise.columns.len(),
                found,
            };
            if expected_cells.len() != exercise.columns.len() {
                return Err(column_count(expected_cells.len()));
            }
            let cells: &[String] = match submitted {
                Some(Answer::Row(cells)) if cells.len() != exercise.columns.len() => {
                    return Err(column_count(cells.len()));
                }
                Some(Answer::Row(cells)) => cells,
                _ => &[],
            };

            let verdicts = exercise
                .columns
                .iter()
                .zip(expected_cells)
                .enumerate()
                .map(|(i, (column, want))| {
                    if !column.required {
                        return ColumnVerdict::Unchecked;
                    }
                    let got = cells.get(i).map(String::as_str).unwrap_or_default();
                    if normalize(got) == normalize(want) {
                        ColumnVerdict::Correct
                    } else {
                        ColumnVerdict::Incorrect
                    }
                })
                .collect();
            Outcome::Row(verdicts)
        }
        Answer::Set(expected_items) => {
            let got = match submitted {
                Some(Answer::Set(items)) => normalize_set(items),
                _ => BTreeSet::new(),
            };
            Outcome::Single(got == normalize_set(expected_items))
        }
        Answer::Text(expected_text) => {
            let got = match submitted {
                Some(Answer::Text(text)) => text.as_str(),
                _ => "",
            };
            Outcome::Single(normalize(got) == normalize(expected_text))
        }
        Answer::Number(expected_number) => {
            Outcome::Single(matches!(submitted, Some(Answer::Number(n)) if n == expected_number))
        }
    };

    let verdict = Verdict {
        question_id: question.id.clone(),
        outcome,
    };
    tracing::debug!(
        exercise = %exercise.id,
        question = %question.id,
        correct = verdict.is_correct(),
        "evaluated"
    );
    Ok(verdict)
}

/// Grade every question of `exercise`, in question order.
///
/// Fails if the submission references a question the exercise lacks.
pub fn evaluate_exercise(
    exercise: &Exercise,
    submission: &Submission,
) -> Result<Vec<Verdict>, ConfigError> {
    let mut unknown: Vec<&str> = submission
        .iter()
        .map(|(id, _)| id)
        .filter(|id| exercise.question(id).is_none())
        .collect();
    unknown.sort_unstable();
    if let Some(id) = unknown.first() {
        return Err(ConfigError::UnknownQuestion {
            exercise: exercise.id.clone(),
            question: (*id).to_string(),
        });
    }

    exercise
        .questions
        .iter()
        .map(|q| evaluate(exercise, q, submission, &exercise.key))
        .collect()
}

/// Check that questions and answer key line up one-to-one with the
/// structure the shape requires.
pub fn verify_alignment(exercise: &Exercise) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for question in &exercise.questions {
        if !seen.insert(question.id.as_str()) {
            return Err(ConfigError::DuplicateQuestion {
                exercise: exercise.id.clone(),
                question: question.id.clone(),
            });
        }

        let expected = exercise
            .key
            .get(&question.id)
            .ok_or_else(|| ConfigError::MissingKey {
                exercise: exercise.id.clone(),
                question: question.id.clone(),
            })?;
        exercise.check_answer(question, expected)?;
    }

    let mut orphans: Vec<&str> = exercise.key.ids().filter(|id| !seen.contains(id)).collect();
    orphans.sort_unstable();
    if let Some(id) = orphans.first() {
        return Err(ConfigError::UnknownKeyEntry {
            exercise: exercise.id.clone(),
            question: (*id).to_string(),
        });
    }

    if exercise.shape.is_row() && exercise.columns.is_empty() {
        return Err(ConfigError::Invalid {
            exercise: exercise.id.clone(),
            message: format!("a {} exercise needs at least one column", exercise.shape),
        });
    }
    if exercise.shape.is_choice() {
        if let Some(q) = exercise.questions.iter().find(|q| q.options.is_none()) {
            return Err(ConfigError::Invalid {
                exercise: exercise.id.clone(),
                message: format!("choice question '{}' has no option list", q.id),
            });
        }
    }

    Ok(())
}
