use crate::config::source::DEFAULT_FILE_PATTERN;
use crate::domain::ports::{ColorChoice, OutputFormat};
use crate::utils::error::{Result, SummaryError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 選用的 TOML 預設值檔案；命令列參數會覆蓋這裡的設定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub summary: SummarySection,
    #[serde(default)]
    pub display: DisplaySection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummarySection {
    pub merge: Option<bool>,
    pub only_errors: Option<bool>,
    pub file_pattern: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplaySection {
    pub format: Option<String>,
    pub color: Option<String>,
    pub output: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SummaryError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SummaryError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${LOG_DIR})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SummaryError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn file_pattern(&self) -> &str {
        self.summary
            .file_pattern
            .as_deref()
            .unwrap_or(DEFAULT_FILE_PATTERN)
    }

    pub fn output_format(&self) -> Option<OutputFormat> {
        self.display.format.as_deref().and_then(OutputFormat::parse)
    }

    pub fn color(&self) -> Option<ColorChoice> {
        self.display.color.as_deref().and_then(ColorChoice::parse)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_file_pattern("summary.file_pattern", self.file_pattern())?;

        if let Some(format) = &self.display.format {
            validation::validate_choice("display.format", format, &OutputFormat::NAMES)?;
        }
        if let Some(color) = &self.display.color {
            validation::validate_choice("display.color", color, &ColorChoice::NAMES)?;
        }
        if let Some(output) = &self.display.output {
            validation::validate_path("display.output", output)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[summary]
merge = false
only_errors = true
file_pattern = "^export.*\\.ndjson$"

[display]
format = "csv"
color = "never"
output = "./summary.csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.summary.merge, Some(false));
        assert_eq!(config.summary.only_errors, Some(true));
        assert_eq!(config.file_pattern(), r"^export.*\.ndjson$");
        assert_eq!(config.output_format(), Some(OutputFormat::Csv));
        assert_eq!(config.color(), Some(ColorChoice::Never));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.file_pattern(), DEFAULT_FILE_PATTERN);
        assert!(config.output_format().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("BULK_SUMMARY_TEST_OUTPUT", "/tmp/summary.json");

        let toml_content = r#"
[display]
output = "${BULK_SUMMARY_TEST_OUTPUT}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.display.output.as_deref(), Some("/tmp/summary.json"));

        std::env::remove_var("BULK_SUMMARY_TEST_OUTPUT");
    }

    #[test]
    fn test_config_validation() {
        let bad_format = TomlConfig::from_toml_str("[display]\nformat = \"xml\"\n").unwrap();
        assert!(bad_format.validate().is_err());

        let bad_pattern = TomlConfig::from_toml_str("[summary]\nfile_pattern = \"log(\"\n").unwrap();
        assert!(bad_pattern.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(TomlConfig::from_toml_str("[summary\nmerge = ").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[summary]\nmerge = true\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.summary.merge, Some(true));
    }
}
