use crate::domain::model::{BulkRun, LogEntry, RejectedExport, RunStats, Summary};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use std::collections::{BTreeMap, HashMap, HashSet};

const GROUP_MARKER: &str = "/Group/";

/// collate_run 的結果
#[derive(Debug, Clone, PartialEq)]
pub enum Collated {
    Stats(RunStats),
    /// 資訊不足以計算（續傳、中途停止、下載失敗）
    Skipped(&'static str),
    Rejected(RejectedExport),
}

/// 解析 ISO-8601 時間；沒有時區的時間視為 UTC
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp);
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

pub fn group_from_export_url(export_url: &str) -> String {
    let base = export_url.split("$export").next().unwrap_or_default();
    match base.rfind(GROUP_MARKER) {
        Some(position) => base[position + GROUP_MARKER.len()..]
            .trim_matches('/')
            .to_string(),
        None => String::new(),
    }
}

pub fn count_patients(run: &BulkRun) -> u64 {
    run.downloads
        .values()
        .filter(|d| d.resource_type() == Some("Patient"))
        .map(|d| d.completed_resource_count())
        .sum()
}

fn count_errors(run: &BulkRun) -> u64 {
    run.downloads
        .values()
        .filter(|d| d.item_type() == Some("error"))
        .map(|d| d.completed_resource_count())
        .sum()
}

fn param_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn event_time(entry: &LogEntry, name: &str) -> Result<DateTime<FixedOffset>, String> {
    let raw = entry
        .timestamp
        .as_deref()
        .ok_or_else(|| format!("Missing {} timestamp", name))?;
    parse_timestamp(raw).ok_or_else(|| format!("Invalid {} timestamp {}", name, raw))
}

fn build_stats(run: &BulkRun) -> Result<Option<RunStats>, String> {
    let (Some(kickoff), Some(_), Some(export_complete)) =
        (&run.kickoff, &run.status_complete, &run.export_complete)
    else {
        return Ok(None);
    };

    let export_url = kickoff
        .detail_str("exportUrl")
        .ok_or_else(|| "Missing exportUrl in kickoff".to_string())?;

    let start = event_time(kickoff, "kickoff")?;
    let end = event_time(export_complete, "export_complete")?;

    let mut params: BTreeMap<String, String> = kickoff
        .detail("requestParameters")
        .and_then(|v| v.as_object())
        .map(|obj| {
            obj.iter()
                .map(|(k, v)| (k.clone(), param_value(v)))
                .collect()
        })
        .unwrap_or_default();

    let count = export_complete
        .detail_u64("resources")
        .ok_or_else(|| "Missing resources in export_complete".to_string())?;
    let bytes = export_complete
        .detail_u64("bytes")
        .ok_or_else(|| "Missing bytes in export_complete".to_string())?;

    // 不採用 export_complete 自帶的 duration：那只涵蓋最後一次執行，
    // 中斷後續傳會得到過短的時間。
    let elapsed = end - start;
    let duration_ms = elapsed
        .num_microseconds()
        .map(|us| us as f64 / 1000.0)
        .unwrap_or(elapsed.num_milliseconds() as f64);

    let types: Vec<String> = params
        .get("_type")
        .filter(|t| !t.is_empty())
        .map(|t| t.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    if !types.is_empty() {
        let mut sorted = types.clone();
        sorted.sort();
        params.insert("_type".to_string(), sorted.join(","));
    }

    let has_patients = types.is_empty()
        || (types.len() > 1 && types.iter().any(|t| t == "Patient"));

    Ok(Some(RunStats {
        group: group_from_export_url(export_url),
        start: Some(start),
        params,
        count,
        patient_count: if has_patients { count_patients(run) } else { 0 },
        bytes,
        duration_ms,
        errors: count_errors(run),
        num_runs: 1,
    }))
}

pub fn collate_run(run: &BulkRun) -> Collated {
    if let Some(reason) = &run.parse_error {
        return Collated::Rejected(RejectedExport {
            export_id: run.export_id.clone(),
            reason: reason.clone(),
        });
    }

    if run.kickoff.is_none() {
        return Collated::Skipped("no kickoff event (resumed export)");
    }
    if run.status_complete.is_none() {
        return Collated::Skipped("stopped before the server finished");
    }
    if run.export_complete.is_none() {
        return Collated::Skipped("export never completed");
    }

    match build_stats(run) {
        Ok(Some(stats)) => Collated::Stats(stats),
        Ok(None) => Collated::Skipped("incomplete export"),
        Err(reason) => Collated::Rejected(RejectedExport {
            export_id: run.export_id.clone(),
            reason,
        }),
    }
}

/// 合併 group 與參數相同的統計；有錯誤的 run 無法合併，直接略過
pub fn merge_stats(stats: Vec<RunStats>) -> Vec<RunStats> {
    let mut merged: Vec<RunStats> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for run in stats {
        if run.errors != 0 {
            continue;
        }

        let key = (run.group.clone(), run.params_text());
        match index.get(&key) {
            Some(&position) => {
                let saved = &mut merged[position];
                saved.start = None;
                saved.count += run.count;
                saved.bytes += run.bytes;
                saved.duration_ms += run.duration_ms;
                saved.patient_count += run.patient_count;
                saved.num_runs += 1;
            }
            None => {
                index.insert(key, merged.len());
                merged.push(run);
            }
        }
    }

    merged
}

/// 依 `_type` 排序（穩定排序），讓相似的匯出排在一起
pub fn sort_stats(mut stats: Vec<RunStats>) -> Vec<RunStats> {
    stats.sort_by_key(RunStats::type_key);
    stats
}

pub fn spans_multiple_groups(stats: &[RunStats]) -> bool {
    stats
        .iter()
        .map(|s| s.group.as_str())
        .collect::<HashSet<_>>()
        .len()
        > 1
}

pub fn build_summary(runs: &[BulkRun], merge: bool, only_errors: bool) -> Summary {
    let mut stats = Vec::new();
    let mut rejected = Vec::new();

    for run in runs {
        match collate_run(run) {
            Collated::Stats(s) => stats.push(s),
            Collated::Skipped(reason) => {
                tracing::debug!("Skipping export {}: {}", run.export_id, reason);
            }
            Collated::Rejected(r) => {
                tracing::debug!("Rejecting export {}: {}", r.export_id, r.reason);
                rejected.push(r);
            }
        }
    }

    let show_group = spans_multiple_groups(&stats);

    let stats = if only_errors {
        stats.into_iter().filter(|s| s.errors > 0).collect()
    } else if merge {
        merge_stats(stats)
    } else {
        stats
    };

    Summary {
        stats: sort_stats(stats),
        show_group,
        rejected,
    }
}
