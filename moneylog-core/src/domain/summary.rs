//! Ledger aggregates
//!
//! Pure functions over a snapshot of records. No storage access, no side effects.
//! An empty slice yields zero totals and an empty breakdown. Sums are checked,
//! so an out-of-range total is an `Overflow` error rather than a panic.

use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;

use super::result::{Error, Result};
use super::transaction::{Transaction, TransactionType};

/// Sum of amounts of all income records
pub fn total_income(records: &[Transaction]) -> Result<Decimal> {
    sum_of(records, TransactionType::Income)
}

/// Sum of amounts of all expense records
pub fn total_expense(records: &[Transaction]) -> Result<Decimal> {
    sum_of(records, TransactionType::Expense)
}

/// Income minus expense
pub fn balance(records: &[Transaction]) -> Result<Decimal> {
    difference(total_income(records)?, total_expense(records)?)
}

/// Summed expense per category
///
/// Income records are ignored. Categories whose expenses sum to zero are omitted.
pub fn expense_by_category(records: &[Transaction]) -> Result<BTreeMap<String, Decimal>> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for tx in records.iter().filter(|t| t.is_expense()) {
        let total = totals.entry(tx.category.clone()).or_insert(Decimal::ZERO);
        *total = total
            .checked_add(tx.amount)
            .ok_or_else(|| Error::overflow(format!("expense total for '{}'", tx.category)))?;
    }
    totals.retain(|_, amount| !amount.is_zero());
    Ok(totals)
}

/// Records whose date falls in the given calendar month
///
/// Records with an unparseable date never match.
pub fn in_month(records: &[Transaction], year: i32, month: u32) -> Vec<Transaction> {
    records
        .iter()
        .filter(|t| {
            t.calendar_date()
                .map(|d| d.year() == year && d.month() == month)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

fn sum_of(records: &[Transaction], kind: TransactionType) -> Result<Decimal> {
    records
        .iter()
        .filter(|t| t.kind == kind)
        .try_fold(Decimal::ZERO, |acc, t| {
            acc.checked_add(t.amount)
                .ok_or_else(|| Error::overflow(format!("{} total", kind)))
        })
}

fn difference(income: Decimal, expense: Decimal) -> Result<Decimal> {
    income
        .checked_sub(expense)
        .ok_or_else(|| Error::overflow("balance"))
}

/// One category's slice of total expense
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub amount: Decimal,
    /// Percentage of total expense, rounded to one decimal place
    pub percent: Decimal,
}

/// All derived values for a snapshot, bundled for rendering
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
    pub expense_by_category: BTreeMap<String, Decimal>,
    pub income_count: usize,
    pub expense_count: usize,
}

impl LedgerSummary {
    pub fn from_records(records: &[Transaction]) -> Result<Self> {
        let total_income = total_income(records)?;
        let total_expense = total_expense(records)?;
        Ok(Self {
            total_income,
            total_expense,
            balance: difference(total_income, total_expense)?,
            expense_by_category: expense_by_category(records)?,
            income_count: records.iter().filter(|t| t.is_income()).count(),
            expense_count: records.iter().filter(|t| t.is_expense()).count(),
        })
    }

    /// Category breakdown sorted by amount descending (ties by name)
    pub fn category_shares(&self) -> Vec<CategoryShare> {
        let mut shares: Vec<CategoryShare> = self
            .expense_by_category
            .iter()
            .map(|(category, amount)| CategoryShare {
                category: category.clone(),
                amount: *amount,
                // Divide first: the ratio is at most one, so scaling it cannot overflow
                percent: if self.total_expense.is_zero() {
                    Decimal::ZERO
                } else {
                    (*amount / self.total_expense * Decimal::ONE_HUNDRED).round_dp(1)
                },
            })
            .collect();
        shares.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));
        shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewTransaction;
    use std::str::FromStr;

    fn tx(id: i64, date: &str, amount: i64, category: &str, kind: TransactionType) -> Transaction {
        Transaction::from_new(id, NewTransaction::new(date, Decimal::from(amount), category, kind))
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx(1, "2024-01-05", 15000, "food", TransactionType::Expense),
            tx(2, "2024-01-06", 500000, "income", TransactionType::Income),
            tx(3, "2024-02-01", 3000, "transport", TransactionType::Expense),
            tx(4, "2024-02-03", 7000, "food", TransactionType::Expense),
        ]
    }

    #[test]
    fn test_empty_records() {
        let records: Vec<Transaction> = Vec::new();
        assert_eq!(total_income(&records).unwrap(), Decimal::ZERO);
        assert_eq!(total_expense(&records).unwrap(), Decimal::ZERO);
        assert_eq!(balance(&records).unwrap(), Decimal::ZERO);
        assert!(expense_by_category(&records).unwrap().is_empty());
    }

    #[test]
    fn test_lunch_and_salary_scenario() {
        let records = vec![
            tx(1, "2024-01-05", 15000, "food", TransactionType::Expense),
            tx(2, "2024-01-06", 500000, "income", TransactionType::Income),
        ];
        assert_eq!(total_income(&records).unwrap(), Decimal::from(500000));
        assert_eq!(total_expense(&records).unwrap(), Decimal::from(15000));
        assert_eq!(balance(&records).unwrap(), Decimal::from(485000));

        let by_category = expense_by_category(&records).unwrap();
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category["food"], Decimal::from(15000));
    }

    #[test]
    fn test_balance_identity() {
        let records = sample();
        assert_eq!(
            balance(&records).unwrap(),
            total_income(&records).unwrap() - total_expense(&records).unwrap()
        );
    }

    #[test]
    fn test_category_totals_sum_to_total_expense() {
        let records = sample();
        let by_category = expense_by_category(&records).unwrap();
        let sum: Decimal = by_category.values().copied().sum();
        assert_eq!(sum, total_expense(&records).unwrap());
        assert_eq!(by_category["food"], Decimal::from(22000));
    }

    #[test]
    fn test_zero_expense_category_omitted() {
        let records = vec![
            tx(1, "2024-01-05", 0, "medical", TransactionType::Expense),
            tx(2, "2024-01-05", 10, "food", TransactionType::Expense),
        ];
        let by_category = expense_by_category(&records).unwrap();
        assert!(!by_category.contains_key("medical"));
        assert!(by_category.values().all(|v| !v.is_zero()));
    }

    #[test]
    fn test_income_category_not_in_breakdown() {
        let records = sample();
        assert!(!expense_by_category(&records).unwrap().contains_key("income"));
    }

    #[test]
    fn test_in_month() {
        let records = sample();
        let february = in_month(&records, 2024, 2);
        assert_eq!(february.len(), 2);
        assert!(february.iter().all(|t| t.date.starts_with("2024-02")));
        assert!(in_month(&records, 2023, 2).is_empty());
    }

    #[test]
    fn test_overflowing_sum_is_an_error() {
        // Nine near-maximum amounts written around validation, e.g. by hand in the database
        let huge = Decimal::from_str("9000000000000000000000000000").unwrap();
        let records: Vec<Transaction> = (1..=9)
            .map(|id| {
                Transaction::from_new(
                    id,
                    NewTransaction::new("2024-01-05", huge, "food", TransactionType::Expense),
                )
            })
            .collect();

        assert!(matches!(total_expense(&records), Err(Error::Overflow(_))));
        assert!(matches!(expense_by_category(&records), Err(Error::Overflow(_))));
        assert!(balance(&records).is_err());
        assert!(LedgerSummary::from_records(&records).is_err());
    }

    #[test]
    fn test_largest_valid_amounts_sum_without_overflow() {
        let largest = Decimal::from_str("999999999999999.9999999999").unwrap();
        let records: Vec<Transaction> = (1..=1000)
            .map(|id| {
                let tx = NewTransaction::new("2024-01-05", largest, "food", TransactionType::Expense);
                tx.validate().unwrap();
                Transaction::from_new(id, tx)
            })
            .collect();

        let summary = LedgerSummary::from_records(&records).unwrap();
        assert_eq!(summary.total_expense, largest * Decimal::from(1000));
        assert_eq!(summary.balance, -summary.total_expense);
        assert_eq!(summary.category_shares()[0].percent, Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_summary_and_shares() {
        let summary = LedgerSummary::from_records(&sample()).unwrap();
        assert_eq!(summary.balance, Decimal::from(475000));
        assert_eq!(summary.income_count, 1);
        assert_eq!(summary.expense_count, 3);

        let shares = summary.category_shares();
        assert_eq!(shares[0].category, "food");
        assert_eq!(shares[0].percent, Decimal::new(880, 1));
        assert_eq!(shares[1].category, "transport");
        assert_eq!(shares[1].percent, Decimal::new(120, 1));
    }
}
