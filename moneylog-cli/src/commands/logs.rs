//! Logs command - inspect the ledger's event log
//!
//! Entries record which command ran, which ledger change it made
//! (`transaction_added`, `backup_imported`, ...) and why it failed.
//! Record contents never reach the log.

use anyhow::{bail, Result};
use chrono::{Duration, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use comfy_table::Cell;
use dialoguer::Confirm;
use serde_json::json;

use moneylog_core::{EntryPoint, LogEntry, LogFilter, LoggingService};

use super::get_data_dir;
use crate::output::{create_table, format_size, success};

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent entries, newest first
    List {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
        /// Only this event, e.g. transaction_added or command_failed
        #[arg(long)]
        event: Option<String>,
        /// Only entries written by this command, e.g. import
        #[arg(long)]
        command: Option<String>,
        /// Only failures
        #[arg(long)]
        errors: bool,
        /// Only entries from the last N days
        #[arg(long)]
        days: Option<u32>,
        /// Print the full cause chain under each failure
        #[arg(long)]
        details: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete entries older than N days
    Clear {
        #[arg(long, default_value = "30")]
        older_than_days: u32,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Entry counts per event, time span and log database size
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn open_log() -> Result<LoggingService> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

/// Unix milliseconds `days` before `now_ms`
fn days_ago_ms(now_ms: i64, days: u32) -> i64 {
    now_ms - Duration::days(i64::from(days)).num_milliseconds()
}

fn format_timestamp(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

pub fn run(command: LogsCommands) -> Result<()> {
    match command {
        LogsCommands::List {
            limit,
            event,
            command,
            errors,
            days,
            details,
            json,
        } => {
            let filter = LogFilter {
                event,
                command,
                errors_only: errors,
                since_ms: days.map(|d| days_ago_ms(Utc::now().timestamp_millis(), d)),
            };
            list(&open_log()?, &filter, limit, details, json)
        }
        LogsCommands::Clear {
            older_than_days,
            force,
            json,
        } => clear(&open_log()?, older_than_days, force, json),
        LogsCommands::Stats { json } => stats(&open_log()?, json),
    }
}

fn list(service: &LoggingService, filter: &LogFilter, limit: usize, details: bool, json: bool) -> Result<()> {
    let entries = service.query(filter, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No matching log entries.".dimmed());
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Time", "Event", "Command", "Version", "Error"]);
    for entry in &entries {
        let event = if entry.error_message.is_some() {
            entry.event.red().to_string()
        } else {
            entry.event.clone()
        };
        table.add_row(vec![
            Cell::new(format_timestamp(entry.timestamp)),
            Cell::new(event),
            Cell::new(entry.command.as_deref().unwrap_or("")),
            Cell::new(&entry.app_version),
            Cell::new(entry.error_message.as_deref().unwrap_or("")),
        ]);
    }
    println!("{}", table);

    if details {
        print_details(&entries);
    }
    Ok(())
}

fn print_details(entries: &[LogEntry]) {
    let failures: Vec<&LogEntry> = entries.iter().filter(|e| e.error_details.is_some()).collect();
    if failures.is_empty() {
        return;
    }

    println!();
    println!("{}", "Cause chains".bold());
    for entry in failures {
        println!(
            "  {} {}: {}",
            format_timestamp(entry.timestamp).dimmed(),
            entry.command.as_deref().unwrap_or(&entry.event),
            entry.error_details.as_deref().unwrap_or_default()
        );
    }
}

fn clear(service: &LoggingService, older_than_days: u32, force: bool, json: bool) -> Result<()> {
    if !force {
        if json {
            bail!("Refusing to clear the log without confirmation. Re-run with --force.");
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete log entries older than {} days?", older_than_days))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let cutoff_ms = days_ago_ms(Utc::now().timestamp_millis(), older_than_days);
    let deleted = service.delete_before(cutoff_ms)?;

    if json {
        println!("{}", json!({ "deleted": deleted, "older_than_days": older_than_days }));
    } else {
        success(&format!("✓ Deleted {} log entries", deleted));
    }
    Ok(())
}

fn stats(service: &LoggingService, json: bool) -> Result<()> {
    let total = service.count()?;
    let errors = service.count_errors()?;
    let by_event = service.event_counts()?;
    let span = service.time_span()?;
    let db_path = service.db_path().to_path_buf();
    let size_bytes = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    if json {
        let output = json!({
            "total_entries": total,
            "error_count": errors,
            "oldest": span.map(|(oldest, _)| format_timestamp(oldest)),
            "newest": span.map(|(_, newest)| format_timestamp(newest)),
            "events": by_event,
            "database_path": db_path.to_string_lossy(),
            "database_size_bytes": size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Event log".bold());
    println!("  Entries:  {} ({} failed)", total, errors);
    if let Some((oldest, newest)) = span {
        println!("  Span:     {} .. {}", format_timestamp(oldest), format_timestamp(newest));
    }
    println!("  Database: {} ({})", db_path.display(), format_size(size_bytes));

    if !by_event.is_empty() {
        let mut table = create_table();
        table.set_header(vec!["Event", "Entries", "Failed"]);
        for count in &by_event {
            table.add_row(vec![
                Cell::new(&count.event),
                Cell::new(count.count),
                Cell::new(count.errors),
            ]);
        }
        println!();
        println!("{}", table);
    }

    let recent = service.get_errors(3)?;
    if !recent.is_empty() {
        println!();
        println!("{}", "Latest failures".red().bold());
        for entry in &recent {
            println!(
                "  {} [{}]: {}",
                format_timestamp(entry.timestamp).dimmed(),
                entry.command.as_deref().unwrap_or(&entry.event),
                entry.error_message.as_deref().unwrap_or_default()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_ago() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap().timestamp_millis();
        let expected = Utc.with_ymd_and_hms(2024, 3, 3, 12, 0, 0).unwrap().timestamp_millis();
        assert_eq!(days_ago_ms(now, 7), expected);
        assert_eq!(days_ago_ms(now, 0), now);
    }

    #[test]
    fn test_format_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 5, 8, 30, 0).unwrap().timestamp_millis();
        assert_eq!(format_timestamp(ts), "2024-01-05 08:30:00");
        assert_eq!(format_timestamp(i64::MAX), i64::MAX.to_string());
    }
}
