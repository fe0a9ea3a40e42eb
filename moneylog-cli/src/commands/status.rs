//! Status command - show ledger status and database details

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::get_context;
use crate::output::format_size;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Money Log Status".bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec!["Transactions", &status.total_transactions.to_string()]);
    table.add_row(vec!["Income entries", &status.income_transactions.to_string()]);
    table.add_row(vec!["Expense entries", &status.expense_transactions.to_string()]);
    table.add_row(vec!["Database size", &format_size(status.database_size_bytes)]);

    println!("{}", table);
    println!();

    if let (Some(earliest), Some(latest)) = (&status.date_range.earliest, &status.date_range.latest) {
        println!("Date range: {} to {}", earliest, latest);
    }
    if let Some(path) = &status.database_path {
        println!("{}", format!("Database: {}", path.display()).dimmed());
    }

    Ok(())
}
