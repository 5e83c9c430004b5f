//! The `phonoquiz list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use crate::config::load_config_from;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let exercises = super::available_exercises(&config)?;

    let mut table = Table::new();
    table.set_header(vec!["Id", "Title", "Answer shape", "Questions", "Graded"]);
    for exercise in &exercises {
        table.add_row(vec![
            Cell::new(&exercise.id),
            Cell::new(&exercise.title),
            Cell::new(exercise.shape),
            Cell::new(exercise.questions.len()),
            Cell::new(if exercise.is_graded() { "yes" } else { "no" }),
        ]);
    }

    println!("{table}");
    println!("{} exercise(s).", exercises.len());
    Ok(())
}
