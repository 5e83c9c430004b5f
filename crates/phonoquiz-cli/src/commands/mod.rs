//! Subcommands, plus exercise lookup shared between them.

pub mod check;
pub mod export;
pub mod init;
pub mod list;
pub mod show;
pub mod validate;

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use phonoquiz_core::catalog;
use phonoquiz_core::model::Exercise;
use phonoquiz_core::parser;

use crate::config::PhonoquizConfig;

/// Built-in exercises followed by those in the configured directories.
///
/// An extra definition whose id is already taken is skipped.
pub fn available_exercises(config: &PhonoquizConfig) -> Result<Vec<Exercise>> {
    let mut exercises = catalog::builtin_exercises()?;
    let mut seen: HashSet<String> = exercises.iter().map(|e| e.id.clone()).collect();

    for dir in &config.exercise_dirs {
        for exercise in parser::load_exercise_directory(dir)? {
            if seen.insert(exercise.id.clone()) {
                exercises.push(exercise);
            } else {
                tracing::warn!(
                    "skipping exercise '{}' in {}: id already defined",
                    exercise.id,
                    dir.display()
                );
            }
        }
    }
    Ok(exercises)
}

/// Resolve `--exercise`: a path to a definition file, a built-in id or
/// letter, or an id from a configured directory.
pub fn resolve_exercise(name: &str, config: &PhonoquizConfig) -> Result<Exercise> {
    let path = Path::new(name);
    if path.extension().is_some_and(|ext| ext == "toml") {
        return parser::parse_exercise(path);
    }

    if let Some(exercise) = catalog::find_builtin(name)? {
        return Ok(exercise);
    }
    let wanted = name.trim().to_lowercase();
    available_exercises(config)?
        .into_iter()
        .find(|e| e.id.to_lowercase() == wanted)
        .with_context(|| format!("unknown exercise '{name}'; run `phonoquiz list`"))
}

/// The wall clock, in local time.
pub fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}
