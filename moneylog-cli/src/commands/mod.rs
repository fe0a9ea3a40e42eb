//! CLI command implementations

pub mod add;
pub mod categories;
pub mod delete;
pub mod export;
pub mod import;
pub mod list;
pub mod logs;
pub mod status;
pub mod summary;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use moneylog_core::{EntryPoint, LogEvent, LoggingService, MoneyLogContext};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Record a successful ledger change for `command`
pub fn log_success(command: &str, event: &str) {
    log_event(&get_logger(), LogEvent::new(event).with_command(command));
}

/// Record that a command ran, and how it ended
pub fn log_outcome<T>(command: &str, result: &Result<T>) {
    let Some(logger) = get_logger() else {
        return;
    };
    let _ = logger.log_command(command);
    if let Err(e) = result {
        let _ = logger.log_error("command_failed", Some(command), e);
    }
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("MONEYLOG_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".moneylog"))
}

/// Get or create the money log context
pub fn get_context() -> Result<MoneyLogContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;

    MoneyLogContext::new(&data_dir).context("Failed to open money log")
}

/// Parse a `YYYY-MM` month argument
pub fn parse_month(value: &str) -> Result<(i32, u32)> {
    let first_day = NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", value))?;
    Ok((first_day.year(), first_day.month()))
}

/// Bail with a helpful message when a category is outside the configured vocabulary
pub fn check_category(ctx: &MoneyLogContext, category: &str) -> Result<()> {
    if !ctx.config.has_category(category) {
        bail!(
            "Unknown category '{}'. Configured categories: {}",
            category,
            ctx.config.categories.join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-03").unwrap(), (2024, 3));
        assert_eq!(parse_month(" 2023-12 ").unwrap(), (2023, 12));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("March").is_err());
    }
}
