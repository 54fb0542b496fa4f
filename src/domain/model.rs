use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// NDJSON 日誌中的一行事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub export_id: String,
    pub event_id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub event_detail: serde_json::Value,
}

impl LogEntry {
    pub fn detail(&self, key: &str) -> Option<&serde_json::Value> {
        self.event_detail.get(key)
    }

    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.detail(key).and_then(|v| v.as_str())
    }

    pub fn detail_u64(&self, key: &str) -> Option<u64> {
        self.detail(key).and_then(|v| v.as_u64())
    }

    pub fn file_url(&self) -> Option<&str> {
        self.detail_str("fileUrl")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Kickoff,
    StatusComplete,
    DownloadRequest,
    DownloadComplete,
    DownloadError,
    ExportComplete,
    /// 已知但目前不需要的事件
    Ignored,
}

impl EventKind {
    pub fn from_event_id(event_id: &str) -> Option<Self> {
        match event_id {
            "kickoff" => Some(EventKind::Kickoff),
            "status_complete" => Some(EventKind::StatusComplete),
            "download_request" => Some(EventKind::DownloadRequest),
            "download_complete" => Some(EventKind::DownloadComplete),
            "download_error" => Some(EventKind::DownloadError),
            "export_complete" => Some(EventKind::ExportComplete),
            "manifest_complete" | "status_error" | "status_page_complete" | "status_progress" => {
                Some(EventKind::Ignored)
            }
            _ => None,
        }
    }
}

/// 一個檔案下載，以 fileUrl 為鍵
#[derive(Debug, Clone, PartialEq)]
pub struct BulkDownload {
    pub url: String,
    pub request: LogEntry,
    pub complete: Option<LogEntry>,
    pub error: Option<LogEntry>,
}

impl BulkDownload {
    pub fn new(url: String, request: LogEntry) -> Self {
        Self {
            url,
            request,
            complete: None,
            error: None,
        }
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.request.detail_str("resourceType")
    }

    pub fn item_type(&self) -> Option<&str> {
        self.request.detail_str("itemType")
    }

    /// 已完成下載的資源數；尚未完成則為 0
    pub fn completed_resource_count(&self) -> u64 {
        self.complete
            .as_ref()
            .and_then(|c| c.detail_u64("resourceCount"))
            .unwrap_or(0)
    }
}

/// 同一個 exportId 的所有事件
#[derive(Debug, Clone, PartialEq)]
pub struct BulkRun {
    pub export_id: String,
    pub kickoff: Option<LogEntry>,
    pub status_complete: Option<LogEntry>,
    pub downloads: BTreeMap<String, BulkDownload>,
    pub export_complete: Option<LogEntry>,
    pub parse_error: Option<String>,
}

impl BulkRun {
    pub fn new(export_id: impl Into<String>) -> Self {
        Self {
            export_id: export_id.into(),
            kickoff: None,
            status_complete: None,
            downloads: BTreeMap::new(),
            export_complete: None,
            parse_error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    pub group: String,
    /// 合併後的統計沒有單一開始時間
    pub start: Option<DateTime<FixedOffset>>,
    pub params: BTreeMap<String, String>,
    pub count: u64,
    pub patient_count: u64,
    pub bytes: u64,
    pub duration_ms: f64,
    pub errors: u64,
    pub num_runs: u64,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            group: String::new(),
            start: None,
            params: BTreeMap::new(),
            count: 0,
            patient_count: 0,
            bytes: 0,
            duration_ms: 0.0,
            errors: 0,
            num_runs: 1,
        }
    }
}

impl RunStats {
    pub fn megabytes(&self) -> f64 {
        self.bytes as f64 / 1024.0 / 1024.0
    }

    /// `key: value` 每行一個，鍵已排序
    pub fn params_text(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 排序用的 `_type` 鍵
    pub fn type_key(&self) -> String {
        let types = self.params.get("_type").map(String::as_str).unwrap_or("");
        let mut parts: Vec<&str> = types.split(',').collect();
        parts.sort_unstable();
        parts.join(",")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedExport {
    pub export_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    pub stats: Vec<RunStats>,
    pub show_group: bool,
    pub rejected: Vec<RejectedExport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry_deserializes_camel_case() {
        let entry: LogEntry = serde_json::from_str(
            r#"{"exportId":"abc","eventId":"kickoff","timestamp":"2024-01-01T00:00:00Z","eventDetail":{"exportUrl":"https://x/$export"},"extra":1}"#,
        )
        .unwrap();
        assert_eq!(entry.export_id, "abc");
        assert_eq!(entry.event_id, "kickoff");
        assert_eq!(entry.detail_str("exportUrl"), Some("https://x/$export"));
    }

    #[test]
    fn test_log_entry_without_detail() {
        let entry: LogEntry =
            serde_json::from_str(r#"{"exportId":"abc","eventId":"status_progress"}"#).unwrap();
        assert!(entry.timestamp.is_none());
        assert!(entry.file_url().is_none());
    }

    #[test]
    fn test_event_kind_lookup() {
        assert_eq!(EventKind::from_event_id("kickoff"), Some(EventKind::Kickoff));
        assert_eq!(
            EventKind::from_event_id("status_page_complete"),
            Some(EventKind::Ignored)
        );
        assert_eq!(EventKind::from_event_id("bogus"), None);
    }

    #[test]
    fn test_type_key_sorts_types() {
        let mut stats = RunStats::default();
        assert_eq!(stats.type_key(), "");
        stats
            .params
            .insert("_type".to_string(), "Patient,Condition".to_string());
        assert_eq!(stats.type_key(), "Condition,Patient");
    }
}
