use crate::domain::model::{BulkRun, Summary};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncBufRead;

/// 逐行讀取的日誌串流
pub type LogReader = Box<dyn AsyncBufRead + Send + Unpin>;

/// 日誌來源：找出要讀的檔案並開啟成串流
pub trait LogSource: Send + Sync {
    fn log_files(&self) -> Result<Vec<PathBuf>>;
    fn open(&self, path: &Path) -> impl std::future::Future<Output = Result<LogReader>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    pub const NAMES: [&'static str; 3] = ["table", "csv", "json"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "table" => Some(OutputFormat::Table),
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub const NAMES: [&'static str; 3] = ["auto", "always", "never"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(ColorChoice::Auto),
            "always" => Some(ColorChoice::Always),
            "never" => Some(ColorChoice::Never),
            _ => None,
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn merge(&self) -> bool;
    fn only_errors(&self) -> bool;
    fn output_format(&self) -> OutputFormat;
    fn color(&self) -> ColorChoice;
    fn output_path(&self) -> Option<&Path>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<BulkRun>>;
    async fn transform(&self, runs: Vec<BulkRun>) -> Result<Summary>;
    async fn load(&self, summary: Summary) -> Result<String>;
}
