//! Logging service - structured event logging to DuckDB
//!
//! Events are stored in `logs.duckdb` next to the ledger. Only event names,
//! the command that ran, and error messages are recorded: amounts, categories,
//! memos, and dates never reach the log.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use chrono::Utc;
use duckdb::Connection;
use serde::{Deserialize, Serialize};

use crate::log_migrations::LOG_MIGRATIONS;
use crate::services::MigrationService;

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Timestamp in the lower 48 bits, a wrapping counter in the upper 16
fn generate_id() -> u64 {
    let timestamp = now_ms() as u64;
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    (timestamp << 16) | counter
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// Which front end produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    /// Another application embedding the core library
    Library,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Library => "library",
        }
    }
}

/// A log event to be recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            command: None,
            error_message: None,
            error_details: None,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_error_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }
}

/// A log entry as stored in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub command: Option<String>,
    pub error_message: Option<String>,
    pub error_details: Option<String>,
}

/// Narrows a log query; unset fields match everything
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub event: Option<String>,
    pub command: Option<String>,
    pub errors_only: bool,
    /// Only entries at or after this unix timestamp in milliseconds
    pub since_ms: Option<i64>,
}

impl LogFilter {
    pub fn errors() -> Self {
        Self {
            errors_only: true,
            ..Self::default()
        }
    }
}

/// Number of entries recorded under one event name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventCount {
    pub event: String,
    pub count: u64,
    pub errors: u64,
}

const ENTRY_COLUMNS: &str = "id, timestamp, entry_point, app_version, platform, \
                             event, command, error_message, error_details";

/// Service for structured event logging
pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    entry_point: EntryPoint,
    app_version: String,
    platform: &'static str,
}

impl LoggingService {
    /// Open or create `logs.duckdb` in the data directory and migrate it
    pub fn new(
        data_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        let db_path = data_dir.join("logs.duckdb");
        let conn = Connection::open(&db_path)?;
        MigrationService::with_migrations(&conn, LOG_MIGRATIONS).run_pending()?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            entry_point,
            app_version: app_version.into(),
            platform: detect_platform(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))
    }

    /// Record an event, stamped with entry point, version, and platform
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO sys_logs ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                ENTRY_COLUMNS
            ),
            duckdb::params![
                generate_id(),
                now_ms(),
                self.entry_point.as_str(),
                &self.app_version,
                self.platform,
                &event.event,
                &event.command,
                &event.error_message,
                &event.error_details,
            ],
        )?;
        Ok(())
    }

    /// Record that a CLI command ran
    pub fn log_command(&self, command: &str) -> Result<()> {
        self.log(LogEvent::new("command_executed").with_command(command))
    }

    /// Record a failure: the outermost message, plus the full cause chain when there is one
    pub fn log_error(&self, event: &str, command: Option<&str>, error: &anyhow::Error) -> Result<()> {
        let message = error.to_string();
        let chain = format!("{:#}", error);

        let mut log_event = LogEvent::new(event).with_error(message.clone());
        if let Some(c) = command {
            log_event = log_event.with_command(c);
        }
        if chain != message {
            log_event = log_event.with_error_details(chain);
        }
        self.log(log_event)
    }

    /// Most recent entries carrying an error message
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.query(&LogFilter::errors(), limit)
    }

    /// Most recent entries matching every set field of `filter`
    pub fn query(&self, filter: &LogFilter, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sys_logs
             WHERE ($1::VARCHAR IS NULL OR event = $1)
               AND ($2::VARCHAR IS NULL OR command = $2)
               AND (NOT $3::BOOLEAN OR error_message IS NOT NULL)
               AND ($4::BIGINT IS NULL OR timestamp >= $4)
             ORDER BY timestamp DESC, id DESC
             LIMIT $5",
            ENTRY_COLUMNS
        ))?;

        let entries = stmt
            .query_map(
                duckdb::params![
                    filter.event,
                    filter.command,
                    filter.errors_only,
                    filter.since_ms,
                    limit as i64,
                ],
                |row| {
                    Ok(LogEntry {
                        id: row.get(0)?,
                        timestamp: row.get(1)?,
                        entry_point: row.get(2)?,
                        app_version: row.get(3)?,
                        platform: row.get(4)?,
                        event: row.get(5)?,
                        command: row.get(6)?,
                        error_message: row.get(7)?,
                        error_details: row.get(8)?,
                    })
                },
            )?
            .collect::<duckdb::Result<Vec<_>>>()?;

        Ok(entries)
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM sys_logs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Entry and error counts per event name, busiest first
    pub fn event_counts(&self) -> Result<Vec<EventCount>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT event, COUNT(*), COUNT(error_message) FROM sys_logs
             GROUP BY event ORDER BY COUNT(*) DESC, event",
        )?;

        let counts = stmt
            .query_map([], |row| {
                Ok(EventCount {
                    event: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                    errors: row.get::<_, i64>(2)? as u64,
                })
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;

        Ok(counts)
    }

    /// Timestamps of the oldest and newest entries
    pub fn time_span(&self) -> Result<Option<(i64, i64)>> {
        let conn = self.lock()?;
        let span: (Option<i64>, Option<i64>) = conn.query_row(
            "SELECT MIN(timestamp), MAX(timestamp) FROM sys_logs",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(span.0.zip(span.1))
    }

    pub fn count_errors(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sys_logs WHERE error_message IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Delete entries older than the given unix timestamp in milliseconds
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM sys_logs WHERE timestamp < ?", [timestamp_ms])?;
        Ok(deleted as u64)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
