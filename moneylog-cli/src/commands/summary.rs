//! Summary command - balance, totals and category breakdown

use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment};
use serde::Serialize;

use moneylog_core::domain::summary::in_month;
use moneylog_core::{CategoryShare, LedgerSummary};

use super::{get_context, parse_month};
use crate::output::{create_table, format_amount};

#[derive(Serialize)]
struct SummaryOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    month: Option<String>,
    #[serde(flatten)]
    summary: LedgerSummary,
    categories: Vec<CategoryShare>,
}

pub fn run(month: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let snapshot = ctx.ledger_service.snapshot();

    let summary = match month.as_deref() {
        Some(m) => {
            let (year, month) = parse_month(m)?;
            LedgerSummary::from_records(&in_month(&snapshot.records, year, month))?
        }
        None => snapshot.summary()?,
    };
    let shares = summary.category_shares();

    if json {
        let output = SummaryOutput {
            month,
            summary,
            categories: shares,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let title = match &month {
        Some(m) => format!("Summary for {}", m),
        None => "Summary".to_string(),
    };
    println!("{}", title.bold());
    println!();

    let balance = format_amount(summary.balance);
    let balance = if summary.balance.is_sign_negative() && !summary.balance.is_zero() {
        balance.red()
    } else {
        balance.normal()
    };
    println!("  Balance:  {}", balance.bold());
    println!(
        "  Income:   {} ({} entries)",
        format!("+{}", format_amount(summary.total_income)).green(),
        summary.income_count
    );
    println!(
        "  Expense:  {} ({} entries)",
        format!("-{}", format_amount(summary.total_expense)).red(),
        summary.expense_count
    );
    println!();

    if shares.is_empty() {
        println!("{}", "No expenses recorded.".dimmed());
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Category", "Amount", "Share"]);
    for share in &shares {
        table.add_row(vec![
            Cell::new(&share.category),
            Cell::new(format_amount(share.amount)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{}%", share.percent)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{}", "Expenses by category".bold());
    println!("{}", table);

    Ok(())
}
