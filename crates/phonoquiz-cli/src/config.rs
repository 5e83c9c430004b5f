//! `phonoquiz.toml` configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use phonoquiz_core::traits::ReportFormat;

/// Top-level phonoquiz configuration. Every field has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhonoquizConfig {
    /// Where exported reports are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Report format used when `--format` is not given.
    #[serde(default)]
    pub default_format: ReportFormat,
    /// Name used when neither `--name` nor the submission file gives one.
    #[serde(default)]
    pub student_name: Option<String>,
    /// Extra exercise definition directories, loaded after the built-ins.
    #[serde(default)]
    pub exercise_dirs: Vec<PathBuf>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./phonoquiz-reports")
}

impl Default for PhonoquizConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            default_format: ReportFormat::default(),
            student_name: None,
            exercise_dirs: Vec::new(),
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `phonoquiz.toml` in the current directory
/// 2. `~/.config/phonoquiz/config.toml`
///
/// `PHONOQUIZ_STUDENT_NAME` overrides `student_name`.
pub fn load_config_from(path: Option<&Path>) -> Result<PhonoquizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("phonoquiz.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<PhonoquizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => PhonoquizConfig::default(),
    };

    if let Ok(name) = std::env::var("PHONOQUIZ_STUDENT_NAME") {
        if !name.trim().is_empty() {
            config.student_name = Some(name);
        }
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("phonoquiz"))
}
