//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};
use rust_decimal::Decimal;

use moneylog_core::{Transaction, TransactionType};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print a warning on stderr, keeping stdout clean for piped or JSON output
pub fn warning_stderr(msg: &str) {
    eprintln!("{}", msg.yellow());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Format an amount with thousands separators, e.g. `1234567.5` -> `1,234,567.5`
pub fn format_amount(amount: Decimal) -> String {
    let text = amount.abs().normalize().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    match fraction {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Amount prefixed with `+` for income and `-` for expense
pub fn format_signed(kind: TransactionType, amount: Decimal) -> String {
    match kind {
        TransactionType::Income => format!("+{}", format_amount(amount)),
        TransactionType::Expense => format!("-{}", format_amount(amount)),
    }
}

/// Table of records, one row per transaction
pub fn transactions_table(records: &[Transaction]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["ID", "Date", "Type", "Category", "Amount", "Memo"]);

    for tx in records {
        let amount = format_signed(tx.kind, tx.amount);
        let amount = if tx.is_income() {
            amount.green().to_string()
        } else {
            amount.red().to_string()
        };

        table.add_row(vec![
            Cell::new(tx.id),
            Cell::new(&tx.date),
            Cell::new(tx.kind),
            Cell::new(&tx.category),
            Cell::new(amount).set_alignment(CellAlignment::Right),
            Cell::new(&tx.memo),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_groups_thousands() {
        assert_eq!(format_amount(Decimal::from(485000)), "485,000");
        assert_eq!(format_amount(Decimal::from(1234567)), "1,234,567");
        assert_eq!(format_amount(Decimal::from(999)), "999");
        assert_eq!(format_amount(Decimal::new(12345675, 3)), "12,345.675");
        assert_eq!(format_amount(Decimal::from(-15000)), "-15,000");
        assert_eq!(format_amount(Decimal::ZERO), "0");
    }

    #[test]
    fn test_format_signed() {
        assert_eq!(format_signed(TransactionType::Income, Decimal::from(500000)), "+500,000");
        assert_eq!(format_signed(TransactionType::Expense, Decimal::from(15000)), "-15,000");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.0 KB");
    }
}
