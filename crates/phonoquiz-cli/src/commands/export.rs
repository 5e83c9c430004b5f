//! The `phonoquiz export` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use phonoquiz_core::controller::PageController;
use phonoquiz_core::parser::parse_submission;
use phonoquiz_core::traits::ReportFormat;
use phonoquiz_report::renderer_for;

use crate::config::load_config_from;

pub fn execute(
    exercise: String,
    submission_path: PathBuf,
    name: Option<String>,
    format: Option<String>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let format = match format {
        Some(f) => f.parse::<ReportFormat>().map_err(anyhow::Error::msg)?,
        None => config.default_format,
    };
    let output_dir = output.unwrap_or_else(|| config.output_dir.clone());

    let page = PageController::new(super::resolve_exercise(&exercise, &config)?)?;
    let file = parse_submission(page.exercise(), &submission_path)?;

    let mut session = page.start_session();
    if let Some(name) = name.or(file.name).or_else(|| config.student_name.clone()) {
        session.set_name(name);
    }
    session.fill(page.exercise(), &file.submission)?;

    let now = super::now();
    let snapshot = page.check(&mut session, now)?;
    let feedback = page.feedback(snapshot);
    super::check::print_feedback(&feedback);

    let report = page.export(&mut session, renderer_for(format).as_ref(), now)?;

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    let path = output_dir.join(&report.filename);
    std::fs::write(&path, &report.bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!(
        "\nReport written to {} ({})",
        path.display(),
        report.format.mime_type()
    );
    Ok(())
}
