//! The `phonoquiz init` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use phonoquiz_core::parser::submission_template;

use crate::config::load_config_from;

pub fn execute(exercise: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    write_if_absent(Path::new("phonoquiz.toml"), SAMPLE_CONFIG)?;

    let Some(exercise) = exercise else {
        println!("\nNext steps:");
        println!("  1. Run: phonoquiz list");
        println!("  2. Run: phonoquiz init --exercise <id>");
        return Ok(());
    };

    let config = load_config_from(config_path.as_deref())?;
    let exercise = super::resolve_exercise(&exercise, &config)?;
    let filename = format!("submission-{}.toml", exercise.id);
    write_if_absent(Path::new(&filename), &submission_template(&exercise))?;

    println!("\nNext steps:");
    println!("  1. Fill in your name and answers in {filename}");
    println!(
        "  2. Run: phonoquiz check --exercise {} --submission {filename}",
        exercise.id
    );
    println!(
        "  3. Run: phonoquiz export --exercise {} --submission {filename}",
        exercise.id
    );
    Ok(())
}

fn write_if_absent(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# phonoquiz configuration

# Where exported reports are written.
output_dir = "./phonoquiz-reports"

# Report format when --format is not given: "pdf" or "html".
default_format = "pdf"

# Name printed on reports when neither --name nor the submission gives one.
# student_name = "Your Name"

# Extra directories of exercise definitions.
exercise_dirs = []
"#;
