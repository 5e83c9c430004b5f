//! The `phonoquiz check` command.

use std::path::PathBuf;

use anyhow::Result;

use phonoquiz_core::controller::{Feedback, PageController};
use phonoquiz_core::parser::parse_submission;

use crate::config::load_config_from;

pub fn execute(
    exercise: String,
    submission_path: PathBuf,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let page = PageController::new(super::resolve_exercise(&exercise, &config)?)?;
    let file = parse_submission(page.exercise(), &submission_path)?;

    let mut session = page.start_session();
    session.fill(page.exercise(), &file.submission)?;
    let snapshot = page.check(&mut session, super::now())?;
    let feedback = page.feedback(snapshot);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&feedback)?),
        "text" => print_feedback(&feedback),
        other => anyhow::bail!("unknown output format: {other} (expected text or json)"),
    }
    Ok(())
}

pub(crate) fn print_feedback(feedback: &Feedback) {
    for line in &feedback.lines {
        if line.wrong_columns.is_empty() {
            println!("{line}");
        } else {
            println!("{line} ({})", line.wrong_columns.join(", "));
        }
    }
    println!("\n{}", feedback.summary());
}
