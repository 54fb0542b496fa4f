use crate::domain::model::{BulkDownload, BulkRun, EventKind, LogEntry};
use std::collections::HashMap;

fn set_single_value(slot: &mut Option<LogEntry>, key: &str, entry: LogEntry) -> Option<String> {
    if slot.is_some() {
        Some(format!("Two {} events", key))
    } else {
        *slot = Some(entry);
        None
    }
}

/// 將一行事件併入所屬的 run。run 一旦出現 parse_error 就不再解析。
pub fn parse_log_row(run: &mut BulkRun, entry: LogEntry) {
    if run.parse_error.is_some() {
        return;
    }

    let Some(kind) = EventKind::from_event_id(&entry.event_id) else {
        run.parse_error = Some(format!("Unknown event ID {}", entry.event_id));
        return;
    };

    let error = match kind {
        EventKind::Kickoff => set_single_value(&mut run.kickoff, "kickoff", entry),
        EventKind::StatusComplete => {
            set_single_value(&mut run.status_complete, "status_complete", entry)
        }
        EventKind::ExportComplete => {
            set_single_value(&mut run.export_complete, "export_complete", entry)
        }
        EventKind::DownloadRequest => match entry.file_url().map(str::to_string) {
            Some(url) => {
                run.downloads
                    .insert(url.clone(), BulkDownload::new(url, entry));
                None
            }
            None => Some("Missing fileUrl".to_string()),
        },
        EventKind::DownloadComplete | EventKind::DownloadError => {
            let Some(url) = entry.file_url().map(str::to_string) else {
                run.parse_error = Some("Missing fileUrl".to_string());
                return;
            };
            match run.downloads.get_mut(&url) {
                None => Some("Missing download request".to_string()),
                Some(download) if kind == EventKind::DownloadComplete => {
                    set_single_value(&mut download.complete, "complete", entry)
                }
                Some(download) => set_single_value(&mut download.error, "error", entry),
            }
        }
        EventKind::Ignored => None,
    };

    if let Some(error) = error {
        run.parse_error = Some(error);
    }
}

/// 依 exportId 分組，保留第一次出現的順序
#[derive(Debug, Default)]
pub struct RunTracker {
    runs: Vec<BulkRun>,
    index: HashMap<String, usize>,
}

impl RunTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: LogEntry) {
        let position = match self.index.get(&entry.export_id) {
            Some(&position) => position,
            None => {
                self.runs.push(BulkRun::new(entry.export_id.clone()));
                self.index
                    .insert(entry.export_id.clone(), self.runs.len() - 1);
                self.runs.len() - 1
            }
        };
        parse_log_row(&mut self.runs[position], entry);
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn into_runs(self) -> Vec<BulkRun> {
        self.runs
    }
}
