//! Add command - record an income or expense entry

use anyhow::Result;
use chrono::Local;

use moneylog_core::{TransactionInput, TransactionType};

use super::{check_category, get_context, log_success};
use crate::output::{format_signed, success};

pub fn run(
    amount: String,
    category: Option<String>,
    kind: String,
    date: Option<String>,
    memo: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;

    let is_income = kind.trim().eq_ignore_ascii_case("income");
    let category = category.unwrap_or_else(|| ctx.config.default_category(is_income));
    check_category(&ctx, category.trim())?;

    let input = TransactionInput {
        date: date.unwrap_or_else(|| Local::now().date_naive().format("%Y-%m-%d").to_string()),
        amount,
        category,
        kind: kind.to_lowercase(),
        memo,
    };

    let id = ctx.ledger_service.add(&input)?;
    log_success("add", "transaction_added");
    let tx = ctx
        .ledger_service
        .get(id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction {} vanished after insert", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tx)?);
        return Ok(());
    }

    let label = match tx.kind {
        TransactionType::Income => "Income",
        TransactionType::Expense => "Expense",
    };
    success(&format!(
        "✓ {} recorded: {} {} on {} (id {})",
        label,
        format_signed(tx.kind, tx.amount),
        tx.category,
        tx.date,
        tx.id
    ));

    Ok(())
}
