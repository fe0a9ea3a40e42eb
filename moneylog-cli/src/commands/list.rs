//! List command - show recent records

use anyhow::Result;
use colored::Colorize;

use moneylog_core::domain::summary::in_month;
use moneylog_core::ListOrder;

use super::{get_context, parse_month};
use crate::output::transactions_table;

/// Explicit flags win over the configured order
fn resolve_order(oldest_first: bool, newest_first: bool, configured: ListOrder) -> ListOrder {
    match (oldest_first, newest_first) {
        (true, _) => ListOrder::Oldest,
        (_, true) => ListOrder::Newest,
        _ => configured,
    }
}

pub fn run(
    oldest_first: bool,
    newest_first: bool,
    limit: Option<usize>,
    month: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let order = resolve_order(oldest_first, newest_first, ctx.config.list_order);

    let mut records = ctx.ledger_service.list_all(order)?;
    if let Some(month) = month.as_deref() {
        let (year, month) = parse_month(month)?;
        records = in_month(&records, year, month);
    }
    if let Some(limit) = limit {
        records.truncate(limit);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", "No transactions recorded yet.".dimmed());
        return Ok(());
    }

    println!("{}", transactions_table(&records));
    println!("{}", format!("{} transaction(s)", records.len()).dimmed());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_configured_order() {
        assert_eq!(resolve_order(false, true, ListOrder::Oldest), ListOrder::Newest);
        assert_eq!(resolve_order(true, false, ListOrder::Newest), ListOrder::Oldest);
        assert_eq!(resolve_order(false, false, ListOrder::Oldest), ListOrder::Oldest);
        assert_eq!(resolve_order(false, false, ListOrder::Newest), ListOrder::Newest);
    }
}
