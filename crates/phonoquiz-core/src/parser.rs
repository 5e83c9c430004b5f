//! TOML exercise and submission parser.
//!
//! Loads exercise definitions from TOML files and directories, converts
//! every answer into the typed [`Answer`] its exercise's shape requires, and
//! reads student submission files against a loaded exercise.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::comparator::verify_alignment;
use crate::error::ConfigError;
use crate::model::{
    Answer, AnswerKey, AnswerShape, Column, Exercise, Options, Question, Submission,
};

/// Intermediate TOML structure for parsing exercise files.
#[derive(Debug, Deserialize)]
struct TomlExerciseFile {
    exercise: TomlExerciseHeader,
    #[serde(default)]
    columns: Vec<Column>,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlExerciseHeader {
    id: String,
    tag: String,
    title: String,
    #[serde(default)]
    report_title: Option<String>,
    #[serde(default)]
    heading: String,
    #[serde(default)]
    instructions: String,
    shape: String,
    #[serde(default = "default_label_header")]
    label_header: String,
    /// Options shared by every question that does not declare its own.
    #[serde(default)]
    options: Option<toml::Value>,
}

fn default_label_header() -> String {
    "Item".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    options: Option<toml::Value>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    example: bool,
    #[serde(default)]
    answer: Option<toml::Value>,
}

#[derive(Debug, Deserialize)]
struct TomlSubmission {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    answers: toml::Table,
}

/// Parse a single TOML file into an `Exercise`.
pub fn parse_exercise(path: &Path) -> Result<Exercise> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exercise file: {}", path.display()))?;

    parse_exercise_str(&content, path)
}

/// Parse a TOML string into an `Exercise` (useful for testing).
pub fn parse_exercise_str(content: &str, source_path: &Path) -> Result<Exercise> {
    let parsed: TomlExerciseFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let exercise = build_exercise(parsed)
        .with_context(|| format!("invalid exercise definition: {}", source_path.display()))?;
    Ok(exercise)
}

fn build_exercise(file: TomlExerciseFile) -> Result<Exercise, ConfigError> {
    let header = file.exercise;
    let exercise_id = header.id.clone();
    let invalid = |message: String| ConfigError::Invalid {
        exercise: exercise_id.clone(),
        message,
    };

    let shape: AnswerShape = header.shape.parse().map_err(invalid)?;
    let columns = file.columns;

    if shape.is_row() && columns.is_empty() {
        return Err(invalid(format!("a {shape} exercise needs at least one column")));
    }
    if shape.is_choice() && !columns.is_empty() {
        return Err(invalid(format!("a {shape} exercise takes no columns")));
    }
    let mut column_names = HashSet::new();
    for column in &columns {
        if !column_names.insert(column.name.as_str()) {
            return Err(invalid(format!("duplicate column '{}'", column.name)));
        }
        match shape {
            AnswerShape::FixedColumnsRow if column.options.is_empty() => {
                return Err(invalid(format!("column '{}' needs an option list", column.name)));
            }
            AnswerShape::FreeTextRow if !column.options.is_empty() => {
                return Err(invalid(format!(
                    "column '{}' is free text and takes no options",
                    column.name
                )));
            }
            _ => {}
        }
    }

    let default_options = header
        .options
        .as_ref()
        .map(|v| parse_options(&exercise_id, shape, v))
        .transpose()?;

    let mut questions = Vec::with_capacity(file.questions.len());
    let mut key = Vec::with_capacity(file.questions.len());
    for q in file.questions {
        let options = match (&q.options, shape.is_row()) {
            (Some(_), true) => {
                return Err(invalid(format!(
                    "question '{}': row questions take no options",
                    q.id
                )));
            }
            (Some(v), false) => Some(parse_options(&exercise_id, shape, v)?),
            (None, false) => Some(default_options.clone().ok_or_else(|| {
                invalid(format!("question '{}' has no options", q.id))
            })?),
            (None, true) => None,
        };
        if q.example && !shape.is_row() {
            return Err(invalid(format!(
                "question '{}': only row questions can be examples",
                q.id
            )));
        }

        let value = q.answer.as_ref().ok_or_else(|| ConfigError::MissingKey {
            exercise: exercise_id.clone(),
            question: q.id.clone(),
        })?;
        let answer = convert_answer(&exercise_id, shape, &columns, &q.id, value)?;
        if matches!(&answer, Answer::Text(t) if t.trim().is_empty()) {
            return Err(invalid(format!("question '{}' has an empty answer", q.id)));
        }

        key.push((q.id.clone(), answer));
        questions.push(Question {
            label: q.label.unwrap_or_else(|| q.id.clone()),
            id: q.id,
            prompt: q.prompt,
            options,
            image: q.image,
            example: q.example,
        });
    }

    let exercise = Exercise {
        report_title: header
            .report_title
            .unwrap_or_else(|| format!("{} Report", header.title)),
        id: header.id,
        tag: header.tag,
        title: header.title,
        heading: header.heading,
        instructions: header.instructions,
        shape,
        label_header: header.label_header,
        columns,
        questions,
        key: key.into_iter().collect::<AnswerKey>(),
    };
    verify_alignment(&exercise)?;
    Ok(exercise)
}

fn parse_options(
    exercise: &str,
    shape: AnswerShape,
    value: &toml::Value,
) -> Result<Options, ConfigError> {
    let invalid = |message: &str| ConfigError::Invalid {
        exercise: exercise.to_string(),
        message: message.to_string(),
    };
    let items = value
        .as_array()
        .ok_or_else(|| invalid("options must be an array"))?;
    if items.is_empty() {
        return Err(invalid("option list is empty"));
    }

    let options = if let Some(numbers) = items
        .iter()
        .map(toml::Value::as_integer)
        .collect::<Option<Vec<_>>>()
    {
        Options::Numeric(numbers)
    } else if let Some(words) = items
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
    {
        Options::Text(words)
    } else {
        return Err(invalid("options must be all strings or all integers"));
    };

    match (&options, shape) {
        (Options::Numeric(_), AnswerShape::SingleChoiceNumeric)
        | (Options::Text(_), AnswerShape::SingleChoiceText | AnswerShape::MultiselectSet) => {
            Ok(options)
        }
        _ => Err(invalid(&format!("option type does not suit a {shape} exercise"))),
    }
}

/// Convert a raw TOML value into the answer structure `shape` requires.
///
/// Row answers may be arrays (cells in column order) or tables keyed by
/// column name; missing columns in a table are empty.
fn convert_answer(
    exercise: &str,
    shape: AnswerShape,
    columns: &[Column],
    question: &str,
    value: &toml::Value,
) -> Result<Answer, ConfigError> {
    let mismatch = |found: &str| ConfigError::ShapeMismatch {
        exercise: exercise.to_string(),
        question: question.to_string(),
        expected: shape,
        found: found.to_string(),
    };
    let string_items = |items: &[toml::Value]| -> Result<Vec<String>, ConfigError> {
        items
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(|| mismatch(v.type_str())))
            .collect()
    };

    match (shape, value) {
        (AnswerShape::FreeTextRow | AnswerShape::FixedColumnsRow, toml::Value::Array(items)) => {
            Ok(Answer::Row(string_items(items)?))
        }
        (AnswerShape::FreeTextRow | AnswerShape::FixedColumnsRow, toml::Value::Table(table)) => {
            let mut cells = vec![String::new(); columns.len()];
            for (name, cell) in table {
                let index = columns.iter().position(|c| &c.name == name).ok_or_else(|| {
                    ConfigError::UnknownColumn {
                        exercise: exercise.to_string(),
                        question: question.to_string(),
                        column: name.clone(),
                    }
                })?;
                cells[index] = cell
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| mismatch(cell.type_str()))?;
            }
            Ok(Answer::Row(cells))
        }
        (AnswerShape::MultiselectSet, toml::Value::Array(items)) => {
            Ok(Answer::Set(string_items(items)?.into_iter().collect()))
        }
        (AnswerShape::SingleChoiceText, toml::Value::String(text)) => Ok(Answer::Text(text.clone())),
        (AnswerShape::SingleChoiceNumeric, toml::Value::Integer(n)) => Ok(Answer::Number(*n)),
        (_, other) => Err(mismatch(other.type_str())),
    }
}

/// Recursively load all `.toml` exercise files from a directory.
pub fn load_exercise_directory(dir: &Path) -> Result<Vec<Exercise>> {
    let mut exercises = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            exercises.extend(load_exercise_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_exercise(&path) {
                Ok(exercise) => exercises.push(exercise),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(exercises)
}

/// A warning from exercise validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a loaded exercise for issues that do not stop it from working.
pub fn validate_exercise(exercise: &Exercise) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if exercise.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "exercise has no questions".into(),
        });
    }

    if !exercise.is_graded() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "no column is required; answers are recorded but not graded".into(),
        });
    }

    for column in &exercise.columns {
        if has_duplicates(column.options.iter()) {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!("column '{}' lists an option twice", column.name),
            });
        }
    }

    for q in &exercise.questions {
        if let Some(options) = &q.options {
            if has_duplicates(options.labels().iter()) {
                warnings.push(ValidationWarning {
                    question_id: Some(q.id.clone()),
                    message: "an option is listed twice".into(),
                });
            }
        }

        if exercise.shape.is_choice() && q.prompt.trim().is_empty() && q.label == q.id {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "question has neither a prompt nor a label".into(),
            });
        }

        if q.image.is_some() && exercise.shape.is_choice() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "images are only shown for row questions".into(),
            });
        }
    }

    warnings
}

fn has_duplicates<'a>(items: impl Iterator<Item = &'a String>) -> bool {
    let mut seen = HashSet::new();
    items.into_iter().any(|item| !seen.insert(item))
}

/// A parsed submission file.
#[derive(Debug, Clone, Default)]
pub struct SubmissionFile {
    /// Student name given in the file, if any.
    pub name: Option<String>,
    pub submission: Submission,
}

/// Read a student's submission file for `exercise`.
pub fn parse_submission(exercise: &Exercise, path: &Path) -> Result<SubmissionFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read submission file: {}", path.display()))?;

    parse_submission_str(exercise, &content, path)
}

/// Parse submission TOML against `exercise`.
///
/// Answers for example rows are ignored; anything the exercise's widgets
/// could not have produced is rejected.
pub fn parse_submission_str(
    exercise: &Exercise,
    content: &str,
    source_path: &Path,
) -> Result<SubmissionFile> {
    let parsed: TomlSubmission = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut submission = Submission::new();
    for (id, value) in &parsed.answers {
        let question = exercise
            .question(id)
            .ok_or_else(|| ConfigError::UnknownQuestion {
                exercise: exercise.id.clone(),
                question: id.clone(),
            })
            .with_context(|| format!("invalid submission: {}", source_path.display()))?;
        if question.example {
            tracing::debug!(question = %id, "ignoring answer for example row");
            continue;
        }

        let answer = convert_answer(&exercise.id, exercise.shape, &exercise.columns, id, value)
            .and_then(|answer| exercise.check_answer(question, &answer).map(|()| answer))
            .with_context(|| format!("invalid submission: {}", source_path.display()))?;
        submission.insert(id.clone(), answer);
    }

    Ok(SubmissionFile {
        name: parsed.name.filter(|n| !n.trim().is_empty()),
        submission,
    })
}

/// A blank submission file for students to fill in.
pub fn submission_template(exercise: &Exercise) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# {}", exercise.title);
    if !exercise.heading.is_empty() {
        let _ = writeln!(out, "# {}", exercise.heading);
    }
    match exercise.shape {
        AnswerShape::FreeTextRow | AnswerShape::FixedColumnsRow => {
            out.push_str("#\n# Fill in one table per row. Columns:\n");
            for column in &exercise.columns {
                let optional = if column.required { "" } else { " (optional)" };
                if column.options.is_empty() {
                    let _ = writeln!(out, "#   {}{}", column.name, optional);
                } else {
                    let _ = writeln!(
                        out,
                        "#   {}{}: {}",
                        column.name,
                        optional,
                        column.options.join(" | ")
                    );
                }
            }
        }
        AnswerShape::MultiselectSet => {
            out.push_str("#\n# List every matching word; leave [] for none.\n");
        }
        AnswerShape::SingleChoiceText => {
            out.push_str("#\n# Pick one word per question.\n");
        }
        AnswerShape::SingleChoiceNumeric => {
            out.push_str("#\n# Uncomment each line and set the number you choose.\n");
        }
    }
    out.push_str("\nname = \"\"\n\n[answers]\n");

    for (n, q) in exercise.questions.iter().enumerate() {
        let id = toml_key(&q.id);
        match exercise.shape {
            AnswerShape::FreeTextRow | AnswerShape::FixedColumnsRow => {
                if q.example {
                    let _ = writeln!(out, "# {} (example, filled in for you)", q.label);
                    continue;
                }
                let _ = writeln!(out, "# {}", q.label);
                let cells: Vec<String> = exercise
                    .columns
                    .iter()
                    .map(|c| format!("{} = \"\"", toml_key(&c.name)))
                    .collect();
                let _ = writeln!(out, "{id} = {{ {} }}", cells.join(", "));
            }
            AnswerShape::MultiselectSet | AnswerShape::SingleChoiceText => {
                let options = q.options.as_ref().map(Options::labels).unwrap_or_default();
                let _ = writeln!(out, "# {}. {}", n + 1, q.display_text());
                let _ = writeln!(out, "#    options: {}", options.join(", "));
                let blank = if exercise.shape == AnswerShape::MultiselectSet {
                    "[]"
                } else {
                    "\"\""
                };
                let _ = writeln!(out, "{id} = {blank}");
            }
            AnswerShape::SingleChoiceNumeric => {
                let options = q.options.as_ref().map(Options::labels).unwrap_or_default();
                let first = options.first().cloned().unwrap_or_else(|| "0".into());
                let _ = writeln!(out, "# {}. {} ({})", n + 1, q.display_text(), options.join(", "));
                let _ = writeln!(out, "# {id} = {first}");
            }
        }
    }

    out
}

fn toml_key(key: &str) -> String {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        key.to_string()
    } else {
        toml::Value::String(key.to_string()).to_string()
    }
}
