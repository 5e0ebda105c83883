//! Reporter configuration
//!
//! Options only decide where and how output is written; the pipeline's
//! semantics never depend on them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = ".craftreportrc.json";
pub const DEFAULT_OUTPUT_DIR: &str = "craft-report";
pub const DEFAULT_OUTPUT_FILE: &str = "report.html";
pub const DEFAULT_TITLE: &str = "Craft Test Report";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReporterOptions {
    /// Directory receiving the HTML report, snapshot JSON, and comments
    pub output_dir: PathBuf,
    pub output_file: String,
    /// Open the report in a browser after generation
    pub open: bool,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<PathBuf>,
    /// Directory with template.html / styles.css / report.js overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<PathBuf>,
}

impl Default for ReporterOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            open: false,
            title: DEFAULT_TITLE.to_string(),
            logo: None,
            assets_dir: None,
        }
    }
}

impl ReporterOptions {
    /// Full path of the HTML artifact
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }

    /// CLI flags override config file values
    pub fn merge_with_cli(
        mut self,
        output_dir: Option<PathBuf>,
        title: Option<String>,
        open: bool,
        logo: Option<PathBuf>,
    ) -> Self {
        if let Some(dir) = output_dir {
            self.output_dir = dir;
        }
        if let Some(title) = title {
            self.title = title;
        }
        if open {
            self.open = true;
        }
        if let Some(logo) = logo {
            self.logo = Some(logo);
        }
        self
    }
}

/// Load options from `.craftreportrc.json`, searching the working directory
/// and its parents. No config file means defaults; an explicitly named file
/// must exist and parse.
pub fn load_options(work_dir: &Path, custom_path: Option<&Path>) -> Result<ReporterOptions> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() { p.to_path_buf() } else { work_dir.join(p) };
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        Some(path)
    } else {
        find_config_in_parents(work_dir)
    };

    match path {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON in config: {}", path.display()))
        }
        None => Ok(ReporterOptions::default()),
    }
}

fn find_config_in_parents(mut dir: &Path) -> Option<PathBuf> {
    loop {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}
