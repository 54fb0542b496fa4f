use crate::domain::model::{RejectedExport, RunStats, Summary};
use crate::utils::error::{Result, SummaryError};
use serde::Serialize;

/// CSV / JSON 共用的一列：總數與每單位耗時（毫秒）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub group: String,
    pub params: String,
    pub start: Option<String>,
    pub runs: u64,
    pub resources: u64,
    pub bytes: u64,
    pub patients: u64,
    pub duration_ms: f64,
    pub errors: u64,
    pub ms_per_patient: Option<f64>,
    pub ms_per_resource: Option<f64>,
    pub ms_per_megabyte: Option<f64>,
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator > 0.0).then(|| numerator / denominator)
}

impl From<&RunStats> for SummaryRow {
    fn from(stats: &RunStats) -> Self {
        Self {
            group: stats.group.clone(),
            params: stats.params_text().replace('\n', "; "),
            start: stats.start.map(|s| s.to_rfc3339()),
            runs: stats.num_runs,
            resources: stats.count,
            bytes: stats.bytes,
            patients: stats.patient_count,
            duration_ms: stats.duration_ms,
            errors: stats.errors,
            ms_per_patient: ratio(stats.duration_ms, stats.patient_count as f64),
            ms_per_resource: ratio(stats.duration_ms, stats.count as f64),
            ms_per_megabyte: ratio(stats.duration_ms, stats.megabytes()),
        }
    }
}

pub fn to_csv(summary: &Summary) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for stats in &summary.stats {
        writer.serialize(SummaryRow::from(stats))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| SummaryError::OutputError {
            message: format!("Could not flush CSV output: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| SummaryError::OutputError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

#[derive(Serialize)]
struct JsonReport<'a> {
    exports: Vec<SummaryRow>,
    rejected: &'a [RejectedExport],
}

pub fn to_json(summary: &Summary) -> Result<String> {
    let report = JsonReport {
        exports: summary.stats.iter().map(SummaryRow::from).collect(),
        rejected: &summary.rejected,
    };
    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');
    Ok(json)
}
