use std::path::Path;

use crate::error::Result;
use crate::logging;
use crate::models::{ClearLogsData, LogEntry, LogsData, SuccessResponse};

/// Read the most recent turn log entries
pub fn logs(log_dir: &Path, n: usize, operation: Option<&str>) -> Result<serde_json::Value> {
    let entries: Vec<LogEntry> = logging::read_logs(log_dir, n, operation)?
        .into_iter()
        .map(|e| LogEntry {
            timestamp: e.timestamp.to_rfc3339(),
            level: if e.success { "info" } else { "error" }.to_string(),
            operation: e.operation,
            details: e
                .details
                .map(|d| serde_json::json!({ "message": d }))
                .unwrap_or_else(|| serde_json::json!({})),
        })
        .collect();

    Ok(serde_json::to_value(SuccessResponse::new(LogsData {
        count: entries.len(),
        entries,
    }))?)
}

/// Remove all turn log entries
pub fn clear_logs(log_dir: &Path) -> Result<serde_json::Value> {
    let cleared = logging::clear_logs(log_dir)?;
    Ok(serde_json::to_value(SuccessResponse::new(ClearLogsData {
        cleared,
    }))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_logs_envelope() {
        let dir = TempDir::new().unwrap();
        logging::log(dir.path(), "turn", Some("route=fallback".to_string()), true).unwrap();
        logging::log(dir.path(), "turn", None, false).unwrap();

        let json = logs(dir.path(), 10, None).unwrap();
        assert_eq!(json["count"], 2);
        assert_eq!(json["entries"][0]["level"], "error");
        assert_eq!(json["entries"][1]["level"], "info");
        assert_eq!(json["entries"][1]["message"], "route=fallback");
        assert_eq!(json["entries"][1]["operation"], "turn");
    }

    #[test]
    fn test_clear_logs_reports_count() {
        let dir = TempDir::new().unwrap();
        logging::log(dir.path(), "turn", None, true).unwrap();

        let json = clear_logs(dir.path()).unwrap();
        assert_eq!(json["cleared"], 1);
        assert_eq!(logs(dir.path(), 10, None).unwrap()["count"], 0);
    }
}
