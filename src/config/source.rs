use crate::core::{LogReader, LogSource};
use crate::utils::error::{Result, SummaryError};
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::io::BufReader;

pub const DEFAULT_FILE_PATTERN: &str = r"^log.*\.ndjson$";

/// 本機檔案系統上的日誌：單一檔案或包含 log*.ndjson 的資料夾
#[derive(Debug, Clone)]
pub struct LocalLogSource {
    path: PathBuf,
    file_pattern: Regex,
}

impl LocalLogSource {
    pub fn new(path: impl Into<PathBuf>, file_pattern: Regex) -> Self {
        Self {
            path: path.into(),
            file_pattern,
        }
    }

    pub fn with_default_pattern(path: impl Into<PathBuf>) -> Result<Self> {
        let pattern =
            Regex::new(DEFAULT_FILE_PATTERN).map_err(|e| SummaryError::ConfigValidationError {
                field: "file_pattern".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::new(path, pattern))
    }
}

impl LogSource for LocalLogSource {
    fn log_files(&self) -> Result<Vec<PathBuf>> {
        if !self.path.is_dir() {
            return Ok(vec![self.path.clone()]);
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.path)? {
            let entry = entry?;
            let name = entry.file_name();
            let matches = name
                .to_str()
                .map(|n| self.file_pattern.is_match(n))
                .unwrap_or(false);
            if matches && entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }

        if files.is_empty() {
            return Err(SummaryError::NoLogFilesError {
                folder: self.path.clone(),
            });
        }

        // 反向排序，與匯出客戶端輪替日誌的命名一致
        files.sort_by(|a, b| b.cmp(a));
        Ok(files)
    }

    async fn open(&self, path: &Path) -> Result<LogReader> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Box::new(BufReader::new(file)))
    }
}
