//! The `phonoquiz validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(exercise_path: PathBuf) -> Result<()> {
    let exercises = if exercise_path.is_dir() {
        phonoquiz_core::parser::load_exercise_directory(&exercise_path)?
    } else {
        vec![phonoquiz_core::parser::parse_exercise(&exercise_path)?]
    };

    let mut total_warnings = 0;

    for exercise in &exercises {
        println!(
            "Exercise: {} ({}, {} questions)",
            exercise.title,
            exercise.id,
            exercise.questions.len()
        );

        let warnings = phonoquiz_core::parser::validate_exercise(exercise);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if exercises.is_empty() {
        println!("No exercise definitions found.");
    } else if total_warnings == 0 {
        println!("All exercises valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
