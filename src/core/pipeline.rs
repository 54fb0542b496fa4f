use crate::core::collate::build_summary;
use crate::core::parser::RunTracker;
use crate::core::{BulkRun, ConfigProvider, LogEntry, LogReader, LogSource, Pipeline, Summary};
use crate::domain::ports::OutputFormat;
use crate::render;
use crate::utils::error::{Result, SummaryError};
use std::io::IsTerminal;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};

pub struct SummaryPipeline<S: LogSource, C: ConfigProvider> {
    source: S,
    config: C,
}

impl<S: LogSource, C: ConfigProvider> SummaryPipeline<S, C> {
    pub fn new(source: S, config: C) -> Self {
        Self { source, config }
    }
}

/// 逐行解析一個檔案；空白行略過，其他無法解析的行視為致命錯誤
pub async fn parse_reader(
    file: &Path,
    reader: LogReader,
    tracker: &mut RunTracker,
) -> Result<usize> {
    let mut lines = reader.lines();
    let mut line_number = 0;
    let mut rows = 0;
    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        let entry: LogEntry =
            serde_json::from_str(&line).map_err(|e| SummaryError::MalformedLogError {
                file: file.to_path_buf(),
                line: line_number,
                message: e.to_string(),
            })?;
        tracker.push(entry);
        rows += 1;
    }
    Ok(rows)
}

#[async_trait::async_trait]
impl<S: LogSource, C: ConfigProvider> Pipeline for SummaryPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<BulkRun>> {
        let files = self.source.log_files()?;
        tracing::debug!("Reading {} log file(s)", files.len());

        let mut tracker = RunTracker::new();
        for file in &files {
            let reader = self.source.open(file).await?;
            let rows = parse_reader(file, reader, &mut tracker).await?;
            tracing::debug!("Parsed {} rows from {}", rows, file.display());
        }

        if tracker.is_empty() {
            tracing::warn!("No export events found in {} log file(s)", files.len());
        }

        tracing::debug!("Found {} exports", tracker.len());
        Ok(tracker.into_runs())
    }

    async fn transform(&self, runs: Vec<BulkRun>) -> Result<Summary> {
        let summary = build_summary(&runs, self.config.merge(), self.config.only_errors());
        tracing::debug!(
            "Collated {} exports into {} summaries ({} rejected)",
            runs.len(),
            summary.stats.len(),
            summary.rejected.len()
        );
        Ok(summary)
    }

    async fn load(&self, summary: Summary) -> Result<String> {
        let format = self.config.output_format();

        if format != OutputFormat::Table {
            for rejected in &summary.rejected {
                tracing::warn!(
                    "Could not understand export {}: {}",
                    rejected.export_id,
                    rejected.reason
                );
            }
        }

        match self.config.output_path() {
            Some(path) => {
                let color = render::use_color(self.config.color(), false);
                let output = render::render_summary(&summary, format, None, color)?;

                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(path, output.as_bytes()).await?;
                tracing::debug!("Wrote {} bytes to {}", output.len(), path.display());
                Ok(path.display().to_string())
            }
            None => {
                let is_terminal = std::io::stdout().is_terminal();
                let color = render::use_color(self.config.color(), is_terminal);
                let width = is_terminal.then(render::terminal_width);
                let output = render::render_summary(&summary, format, width, color)?;

                let mut stdout = tokio::io::stdout();
                stdout.write_all(output.as_bytes()).await?;
                stdout.flush().await?;
                Ok("stdout".to_string())
            }
        }
    }
}
