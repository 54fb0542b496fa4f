use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Could not find log*.ndjson files in folder {}", folder.display())]
    NoLogFilesError { folder: PathBuf },

    #[error("Malformed log row at {}:{line}: {message}", file.display())]
    MalformedLogError {
        file: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Output error: {message}")]
    OutputError { message: String },
}

/// 錯誤分類，用於日誌與退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Parsing,
    Configuration,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SummaryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SummaryError::IoError(_) => ErrorCategory::System,
            SummaryError::NoLogFilesError { .. } => ErrorCategory::Input,
            SummaryError::SerializationError(_) | SummaryError::MalformedLogError { .. } => {
                ErrorCategory::Parsing
            }
            SummaryError::ConfigValidationError { .. }
            | SummaryError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            SummaryError::CsvError(_) | SummaryError::OutputError { .. } => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Parsing => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給使用者的修復建議
    pub fn recovery_suggestion(&self) -> String {
        match self {
            SummaryError::IoError(_) => {
                "Check that the path exists and is readable".to_string()
            }
            SummaryError::NoLogFilesError { .. } => {
                "Point at a single log file, or a folder containing log*.ndjson files".to_string()
            }
            SummaryError::MalformedLogError { .. } | SummaryError::SerializationError(_) => {
                "Make sure every line is a JSON object with exportId, eventId and timestamp"
                    .to_string()
            }
            SummaryError::ConfigValidationError { field, .. }
            | SummaryError::InvalidConfigValueError { field, .. } => {
                format!("Fix the '{}' setting in your config file or command line", field)
            }
            SummaryError::CsvError(_) | SummaryError::OutputError { .. } => {
                "Check that the output location is writable".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SummaryError::IoError(e) => format!("Could not read or write a file: {}", e),
            SummaryError::MalformedLogError {
                file,
                line,
                message,
            } => format!(
                "Could not parse line {} of {}: {}",
                line,
                file.display(),
                message
            ),
            other => other.to_string(),
        }
    }

    /// 依嚴重程度決定退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, SummaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_log_files_message_names_folder() {
        let err = SummaryError::NoLogFilesError {
            folder: PathBuf::from("/var/logs/bulk"),
        };
        assert_eq!(
            err.to_string(),
            "Could not find log*.ndjson files in folder /var/logs/bulk"
        );
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_io_error_is_critical() {
        let err = SummaryError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
        assert!(err.user_friendly_message().contains("missing"));
    }

    #[test]
    fn test_output_errors_are_medium() {
        let err = SummaryError::OutputError {
            message: "disk full".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.exit_code(), 2);
    }
}
