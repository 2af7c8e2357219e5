//! Configuration management for the schema validator.
//!
//! Handles:
//! - Command-line argument parsing
//! - User configuration (`<config dir>/schema-validator/config.toml`)
//! - Project configuration (`.schema-validator.toml` or `--config`)
//!
//! Later sources win: user file, then project file, then command line.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::report::ReportFormat;

/// Name of the project configuration file looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = ".schema-validator.toml";

/// Command-line arguments for the schema validator
#[derive(Debug, Default, Parser)]
#[command(name = "schema-validate")]
#[command(about = "Validate entity records against a relational schema")]
#[command(version)]
pub struct Args {
    /// Schema file (YAML, JSON or TOML)
    #[arg(long, help = "Schema file describing entities and relationships")]
    pub schema: Option<PathBuf>,

    /// Data file (YAML, JSON or TOML)
    #[arg(long, help = "Data file mapping entity names to lists of records")]
    pub data: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, help = "Report format")]
    pub format: Option<ReportFormat>,

    /// Project configuration file
    #[arg(long, help = "Configuration file (defaults to ./.schema-validator.toml)")]
    pub config: Option<PathBuf>,

    /// Re-run validation whenever the schema or data file changes
    #[arg(long)]
    pub watch: bool,

    /// Print the dependency levels and exit
    #[arg(long)]
    pub print_order: bool,

    #[arg(long, help = "Log level (trace, debug, info, warn, error)")]
    pub log_level: Option<String>,
}

/// Settings read from a TOML configuration file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub schema: Option<PathBuf>,
    pub data: Option<PathBuf>,
    pub format: Option<ReportFormat>,
    pub log_level: Option<String>,
}

impl FileConfig {
    /// Load a configuration file. Relative paths inside it are resolved
    /// against the directory holding the file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        let base = path.parent().unwrap_or(Path::new(""));
        config.schema = config.schema.map(|p| base.join(p));
        config.data = config.data.map(|p| base.join(p));
        Ok(config)
    }

    /// Overlay `other` on top of `self`
    fn merge(self, other: FileConfig) -> FileConfig {
        FileConfig {
            schema: other.schema.or(self.schema),
            data: other.data.or(self.data),
            format: other.format.or(self.format),
            log_level: other.log_level.or(self.log_level),
        }
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub schema_path: Option<PathBuf>,
    pub data_path: Option<PathBuf>,
    pub format: ReportFormat,
    pub log_level: String,
    pub watch: bool,
    pub print_order: bool,
    /// Project configuration file that was applied, if any
    pub project_config_path: Option<PathBuf>,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments, reading configuration
    /// files relative to the current directory
    pub fn from_args(args: Args) -> Result<Self> {
        let working_dir = std::env::current_dir().context("Failed to read current directory")?;
        let user_config_dir = dirs::config_dir().map(|dir| dir.join("schema-validator"));
        Self::from_sources(args, &working_dir, user_config_dir.as_deref())
    }

    /// Create configuration from explicit sources (useful for testing)
    pub fn from_sources(
        args: Args,
        working_dir: &Path,
        user_config_dir: Option<&Path>,
    ) -> Result<Self> {
        let mut file_config = FileConfig::default();

        if let Some(dir) = user_config_dir {
            let user_file = dir.join("config.toml");
            if user_file.is_file() {
                log::debug!("Loading user config from {}", user_file.display());
                file_config = file_config.merge(FileConfig::load(&user_file)?);
            }
        }

        let project_config_path = match &args.config {
            // An explicit --config must exist
            Some(path) => Some(working_dir.join(path)),
            None => Some(working_dir.join(PROJECT_CONFIG_FILE)).filter(|p| p.is_file()),
        };
        if let Some(path) = &project_config_path {
            log::debug!("Loading project config from {}", path.display());
            file_config = file_config.merge(FileConfig::load(path)?);
        }

        Ok(Config {
            schema_path: args
                .schema
                .map(|p| working_dir.join(p))
                .or(file_config.schema),
            data_path: args.data.map(|p| working_dir.join(p)).or(file_config.data),
            format: args.format.or(file_config.format).unwrap_or_default(),
            log_level: args
                .log_level
                .or(file_config.log_level)
                .unwrap_or_else(|| "info".to_string()),
            watch: args.watch,
            print_order: args.print_order,
            project_config_path,
        })
    }

    pub fn has_project_config(&self) -> bool {
        self.project_config_path.is_some()
    }

    /// Schema path, or a hint on where to set it
    pub fn require_schema(&self) -> Result<&Path> {
        self.schema_path.as_deref().ok_or_else(|| {
            anyhow!("No schema file given: pass --schema or set `schema` in {PROJECT_CONFIG_FILE}")
        })
    }

    /// Schema and data paths, or a hint on where to set them
    pub fn require_paths(&self) -> Result<(&Path, &Path)> {
        let schema = self.require_schema()?;
        let data = self.data_path.as_deref().ok_or_else(|| {
            anyhow!("No data file given: pass --data or set `data` in {PROJECT_CONFIG_FILE}")
        })?;
        Ok((schema, data))
    }
}
