pub mod source;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::ports::{ColorChoice, OutputFormat};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::path::{Path, PathBuf};
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "bulk-fhir-log-summary")]
#[command(about = "Summarize statistics from bulk FHIR export logs", version)]
pub struct CliConfig {
    /// Log file, or a folder of log*.ndjson files
    #[arg(value_name = "/path/to/log/file-or-folder")]
    pub log_path: PathBuf,

    /// Merge similar exports (default)
    #[arg(long, overrides_with = "no_merge")]
    pub merge: bool,

    /// Show every export separately
    #[arg(long, overrides_with = "merge")]
    pub no_merge: bool,

    /// Show only the exports with errors
    #[arg(long)]
    pub only_errors: bool,

    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the summary to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub color: Option<ColorChoice>,

    /// TOML file with default settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log process CPU and memory usage per stage
    #[arg(long)]
    pub monitor: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    fn merge_override(&self) -> Option<bool> {
        if self.no_merge {
            Some(false)
        } else if self.merge {
            Some(true)
        } else {
            None
        }
    }

    /// 合併 TOML 預設值與命令列參數，命令列優先
    pub fn resolve(&self, file: Option<&TomlConfig>) -> SummaryOptions {
        let defaults = file.cloned().unwrap_or_default();
        SummaryOptions {
            log_path: self.log_path.clone(),
            merge: self
                .merge_override()
                .or(defaults.summary.merge)
                .unwrap_or(true),
            only_errors: self.only_errors || defaults.summary.only_errors.unwrap_or(false),
            file_pattern: defaults.file_pattern().to_string(),
            output_format: self
                .format
                .or_else(|| defaults.output_format())
                .unwrap_or_default(),
            color: self.color.or_else(|| defaults.color()).unwrap_or_default(),
            output_path: self
                .output
                .clone()
                .or_else(|| defaults.display.output.as_ref().map(PathBuf::from)),
        }
    }
}

/// 最終生效的設定
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOptions {
    pub log_path: PathBuf,
    pub merge: bool,
    pub only_errors: bool,
    pub file_pattern: String,
    pub output_format: OutputFormat,
    pub color: ColorChoice,
    pub output_path: Option<PathBuf>,
}

impl SummaryOptions {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            merge: true,
            only_errors: false,
            file_pattern: source::DEFAULT_FILE_PATTERN.to_string(),
            output_format: OutputFormat::Table,
            color: ColorChoice::Auto,
            output_path: None,
        }
    }
}

impl ConfigProvider for SummaryOptions {
    fn merge(&self) -> bool {
        self.merge
    }

    fn only_errors(&self) -> bool {
        self.only_errors
    }

    fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    fn color(&self) -> ColorChoice {
        self.color
    }

    fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }
}

impl Validate for SummaryOptions {
    fn validate(&self) -> Result<()> {
        validation::validate_path("log_path", &self.log_path.to_string_lossy())?;
        validation::validate_file_pattern("file_pattern", &self.file_pattern)?;
        if let Some(output) = &self.output_path {
            validation::validate_path("output", &output.to_string_lossy())?;
        }
        Ok(())
    }
}
