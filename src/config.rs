//! Configuration management for the filter language server.
//!
//! Handles:
//! - Command-line argument parsing
//! - Project configuration from `.filter-ls.toml`
//! - Vocabulary data directory resolution

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Project configuration file looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = ".filter-ls.toml";

/// Command-line arguments for the filter language server
#[derive(Debug, Default, Parser)]
#[command(name = "filter-ls")]
#[command(about = "Language server and checker for item filter files")]
#[command(version)]
pub struct Args {
    /// Directory holding vocabulary JSON files
    #[arg(long, help = "Directory containing items.json and sounds.json")]
    pub data_dir: Option<PathBuf>,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Extra item classes to accept (comma separated)"
    )]
    pub class_whitelist: Vec<String>,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Extra base types to accept (comma separated)"
    )]
    pub base_whitelist: Vec<String>,

    /// Log level for the language server
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,

    /// Validate a file and exit instead of serving
    #[arg(long, value_name = "FILE", help = "Check a filter file and print diagnostics")]
    pub check: Option<PathBuf>,
}

/// Values accepted on top of the vocabulary
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Whitelist {
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub bases: Vec<String>,
}

/// Contents of `.filter-ls.toml`
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ProjectConfig {
    #[serde(default)]
    pub whitelist: Whitelist,
}

impl ProjectConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse project configuration")
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory searched for vocabulary overrides
    pub data_dir: Option<PathBuf>,
    /// Project whitelist with command-line entries appended
    pub whitelist: Whitelist,
    pub log_level: String,
    /// File to check instead of running the server
    pub check_file: Option<PathBuf>,
    /// Path of the project config that was loaded, if any
    pub project_config_path: Option<PathBuf>,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments, reading the project
    /// config from the current directory
    pub fn from_args(args: Args) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        Self::from_args_in(args, &cwd)
    }

    /// Create configuration with the project config looked up in `project_root`
    pub fn from_args_in(args: Args, project_root: &Path) -> Result<Self> {
        let (project_config_path, project) = match Self::load_project_config(project_root)? {
            Some((path, project)) => (Some(path), project),
            None => (None, ProjectConfig::default()),
        };

        let mut whitelist = project.whitelist;
        whitelist.classes.extend(args.class_whitelist);
        whitelist.bases.extend(args.base_whitelist);

        let data_dir = args.data_dir.or_else(Self::default_data_dir);

        Ok(Config {
            data_dir,
            whitelist,
            log_level: args.log_level,
            check_file: args.check,
            project_config_path,
        })
    }

    /// `<config dir>/filter-ls/data`
    pub fn default_data_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("filter-ls").join("data"))
    }

    fn load_project_config(root: &Path) -> Result<Option<(PathBuf, ProjectConfig)>> {
        let path = root.join(PROJECT_CONFIG_FILE);
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let project = ProjectConfig::parse(&content)
            .with_context(|| format!("Invalid project configuration: {}", path.display()))?;
        Ok(Some((path, project)))
    }

    pub fn has_project_config(&self) -> bool {
        self.project_config_path.is_some()
    }
}
