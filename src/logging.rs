//! Logging.
//!
//! Two channels: `tracing` diagnostics on stderr, filtered by `-v` or
//! `RUST_LOG`, and a persistent turn log at `{log_dir}/turns.log` with 1MB
//! rotation that the `logs` command reads back.

use crate::error::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "turns.log";
const MAX_LOG_SIZE: u64 = 1_048_576; // 1MB
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Install the stderr subscriber. `RUST_LOG` overrides the verbosity count.
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// A single turn log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub details: Option<String>,
    pub success: bool,
}

impl LogEntry {
    pub fn new(operation: impl Into<String>, details: Option<String>, success: bool) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: operation.into(),
            details,
            success,
        }
    }

    /// Render as `[timestamp] OK|ERR operation details`, one line per entry.
    pub fn to_log_line(&self) -> String {
        let details = match self.details.as_deref() {
            Some(d) => d.replace(['\n', '\r'], " "),
            None => "-".to_string(),
        };
        format!(
            "[{}] {} {} {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            if self.success { "OK" } else { "ERR" },
            self.operation,
            details
        )
    }

    /// Inverse of [`LogEntry::to_log_line`]; None for anything malformed.
    pub fn from_log_line(line: &str) -> Option<Self> {
        let (stamp, rest) = line.strip_prefix('[')?.split_once(']')?;
        let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
            .ok()?
            .and_utc();

        let mut fields = rest.trim_start().splitn(3, ' ');
        let success = match fields.next()? {
            "OK" => true,
            "ERR" => false,
            _ => return None,
        };
        let operation = fields.next().filter(|op| !op.is_empty())?.to_string();
        let details = fields
            .next()
            .map(str::trim)
            .filter(|d| !d.is_empty() && *d != "-")
            .map(String::from);

        Some(Self {
            timestamp,
            operation,
            details,
            success,
        })
    }
}

/// Get the log file path inside `dir`, creating the directory.
pub fn log_path(dir: &Path) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(dir.join(LOG_FILE_NAME))
}

fn needs_rotation(path: &Path) -> bool {
    fs::metadata(path)
        .map(|metadata| metadata.len() >= MAX_LOG_SIZE)
        .unwrap_or(false)
}

/// Rotate log file (rename to .old, start fresh).
fn rotate_log(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let old_path = path.with_extension("log.old");
    if old_path.exists() {
        fs::remove_file(&old_path)?;
    }
    fs::rename(path, &old_path)?;

    Ok(())
}

/// Append an entry to the turn log in `dir`.
pub fn log(
    dir: &Path,
    operation: impl Into<String>,
    details: Option<String>,
    success: bool,
) -> Result<()> {
    let path = log_path(dir)?;

    if needs_rotation(&path) {
        rotate_log(&path)?;
    }

    let line = LogEntry::new(operation, details, success).to_log_line();

    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", line)?;
    writer.flush()?;

    Ok(())
}

/// Read log entries.
///
/// - `limit`: Maximum number of entries to return (most recent first)
/// - `operation`: Optional filter by operation name
pub fn read_logs(dir: &Path, limit: usize, operation: Option<&str>) -> Result<Vec<LogEntry>> {
    let path = dir.join(LOG_FILE_NAME);

    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(&path)?);
    let mut entries: Vec<LogEntry> = reader
        .lines()
        .map_while(|line| line.ok())
        .filter_map(|line| LogEntry::from_log_line(&line))
        .filter(|entry| operation.map_or(true, |op| entry.operation.eq_ignore_ascii_case(op)))
        .collect();

    entries.reverse();
    entries.truncate(limit);

    Ok(entries)
}

/// Clear all logs. Returns the number of lines removed from the live file.
pub fn clear_logs(dir: &Path) -> Result<usize> {
    let path = dir.join(LOG_FILE_NAME);

    if !path.exists() {
        return Ok(0);
    }

    let count = BufReader::new(File::open(&path)?).lines().count();
    File::create(&path)?;

    let old_path = path.with_extension("log.old");
    if old_path.exists() {
        fs::remove_file(&old_path)?;
    }

    Ok(count)
}
