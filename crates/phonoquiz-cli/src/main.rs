//! phonoquiz CLI: check phonetics exercises and export graded reports.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "phonoquiz", version, about = "Phonetics exercise checker and report exporter")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available exercises
    List,

    /// Print an exercise page
    Show {
        /// Exercise id (e.g. "ch1-b" or "b") or path to a .toml definition
        #[arg(long)]
        exercise: String,
    },

    /// Create a starter config and a blank submission file
    Init {
        /// Exercise to create a submission template for
        #[arg(long)]
        exercise: Option<String>,
    },

    /// Validate exercise definition TOML files
    Validate {
        /// Path to an exercise file or directory
        #[arg(long)]
        exercise_file: PathBuf,
    },

    /// Check a submission and print feedback
    Check {
        /// Exercise id or path to a .toml definition
        #[arg(long)]
        exercise: String,

        /// Submission TOML file
        #[arg(long)]
        submission: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Check a submission and write the graded report
    Export {
        /// Exercise id or path to a .toml definition
        #[arg(long)]
        exercise: String,

        /// Submission TOML file
        #[arg(long)]
        submission: PathBuf,

        /// Student name (overrides the submission file and config)
        #[arg(long)]
        name: Option<String>,

        /// Report format: pdf, html
        #[arg(long)]
        format: Option<String>,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("phonoquiz=info,phonoquiz_core=info,phonoquiz_report=info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::List => commands::list::execute(config),
        Commands::Show { exercise } => commands::show::execute(exercise, config),
        Commands::Init { exercise } => commands::init::execute(exercise, config),
        Commands::Validate { exercise_file } => commands::validate::execute(exercise_file),
        Commands::Check {
            exercise,
            submission,
            format,
        } => commands::check::execute(exercise, submission, format, config),
        Commands::Export {
            exercise,
            submission,
            name,
            format,
            output,
        } => commands::export::execute(exercise, submission, name, format, output, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
