#![allow(dead_code)]

use serde_json::json;
use std::path::Path;

/// 產生一個完整匯出的事件列
pub fn export_rows(
    export_id: &str,
    group: &str,
    types: Option<&str>,
    minutes: u32,
    error_count: Option<u64>,
) -> Vec<serde_json::Value> {
    let mut params = json!({});
    if let Some(types) = types {
        params["_type"] = json!(types);
    }
    let mut rows = vec![
        json!({
            "exportId": export_id,
            "eventId": "kickoff",
            "timestamp": "2024-03-01T10:00:00Z",
            "eventDetail": {
                "exportUrl": format!("https://fhir.example.com/Group/{}/$export", group),
                "requestParameters": params,
            }
        }),
        json!({
            "exportId": export_id,
            "eventId": "status_complete",
            "timestamp": "2024-03-01T10:01:00Z",
            "eventDetail": {}
        }),
        json!({
            "exportId": export_id,
            "eventId": "download_request",
            "timestamp": "2024-03-01T10:01:01Z",
            "eventDetail": {"fileUrl": format!("https://files/{}/Patient", export_id), "resourceType": "Patient", "itemType": "output"}
        }),
        json!({
            "exportId": export_id,
            "eventId": "download_complete",
            "timestamp": "2024-03-01T10:01:30Z",
            "eventDetail": {"fileUrl": format!("https://files/{}/Patient", export_id), "resourceCount": 50}
        }),
    ];
    if let Some(count) = error_count {
        rows.push(json!({
            "exportId": export_id,
            "eventId": "download_request",
            "timestamp": "2024-03-01T10:01:31Z",
            "eventDetail": {"fileUrl": format!("https://files/{}/errors", export_id), "resourceType": "OperationOutcome", "itemType": "error"}
        }));
        rows.push(json!({
            "exportId": export_id,
            "eventId": "download_complete",
            "timestamp": "2024-03-01T10:01:32Z",
            "eventDetail": {"fileUrl": format!("https://files/{}/errors", export_id), "resourceCount": count}
        }));
    }
    rows.push(json!({
        "exportId": export_id,
        "eventId": "export_complete",
        "timestamp": format!("2024-03-01T{:02}:{:02}:00Z", 10 + minutes / 60, minutes % 60),
        "eventDetail": {"resources": 1000, "bytes": 4 * 1024 * 1024, "duration": 1}
    }));
    rows
}

pub fn write_log(path: &Path, rows: &[serde_json::Value]) {
    let content: String = rows.iter().map(|r| format!("{}\n", r)).collect();
    std::fs::write(path, content).unwrap();
}
