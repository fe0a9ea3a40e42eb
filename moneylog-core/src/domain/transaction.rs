//! Transaction domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Maximum number of fractional digits accepted for an amount
/// (matches the DECIMAL(38,10) storage column)
pub const MAX_AMOUNT_SCALE: u32 = 10;

/// Maximum number of integer digits accepted for an amount
///
/// Keeps single amounts far inside the DECIMAL(38,10) column and leaves
/// headroom for summing any realistic number of records without overflow.
pub const MAX_AMOUNT_INTEGER_DIGITS: u32 = 15;

/// Whether a transaction adds to or subtracts from the balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::validation(format!(
                "type must be 'income' or 'expense', got '{}'",
                other
            ))),
        }
    }
}

/// A transaction that has not been persisted yet (no identity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub date: String,
    #[serde(with = "amount_number")]
    pub amount: Decimal,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub memo: String,
}

impl NewTransaction {
    /// Create a new transaction with required fields and an empty memo
    pub fn new(
        date: impl Into<String>,
        amount: Decimal,
        category: impl Into<String>,
        kind: TransactionType,
    ) -> Self {
        Self {
            date: date.into(),
            amount,
            category: category.into(),
            kind,
            memo: String::new(),
        }
    }

    /// Set the memo
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Check structural constraints before the record reaches storage
    ///
    /// Negative amounts are rejected: the sign is carried by `kind` only.
    pub fn validate(&self) -> Result<()> {
        validate_amount(self.amount)?;

        if self.category.trim().is_empty() {
            return Err(Error::validation("category must not be empty"));
        }

        if parse_iso_date(&self.date).is_none() {
            return Err(Error::validation(format!(
                "date must be ISO 8601 (YYYY-MM-DD or date-time), got '{}'",
                self.date
            )));
        }

        Ok(())
    }
}

/// A persisted transaction with its store-assigned identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: String,
    #[serde(with = "amount_number")]
    pub amount: Decimal,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub memo: String,
}

impl Transaction {
    /// Attach an identity to a new transaction
    pub fn from_new(id: i64, tx: NewTransaction) -> Self {
        Self {
            id,
            date: tx.date,
            amount: tx.amount,
            category: tx.category,
            kind: tx.kind,
            memo: tx.memo,
        }
    }

    /// Strip the identity, producing an insertable record
    pub fn to_new(&self) -> NewTransaction {
        NewTransaction {
            date: self.date.clone(),
            amount: self.amount,
            category: self.category.clone(),
            kind: self.kind,
            memo: self.memo.clone(),
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// Calendar date the transaction occurred on, if the stored string parses
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        parse_iso_date(&self.date)
    }

    /// Chronological sort key: calendar date first, then the instant within it
    ///
    /// Offsets are normalized to UTC for the tie-break; plain dates sort at midnight.
    pub fn chronological_key(&self) -> Option<(NaiveDate, NaiveDateTime)> {
        let date = self.calendar_date()?;
        let s = self.date.trim();
        let instant = match DateTime::parse_from_rfc3339(s) {
            Ok(dt) => dt.naive_utc(),
            Err(_) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .unwrap_or_else(|_| date.and_time(NaiveTime::MIN)),
        };
        Some((date, instant))
    }
}

/// Raw user input, all fields as typed by the user
#[derive(Debug, Clone, Default)]
pub struct TransactionInput {
    pub date: String,
    pub amount: String,
    pub category: String,
    pub kind: String,
    pub memo: Option<String>,
}

impl TransactionInput {
    /// Parse and validate raw input into an insertable record
    pub fn parse(&self) -> Result<NewTransaction> {
        let amount = parse_amount(&self.amount)?;
        let kind: TransactionType = self.kind.parse()?;

        let tx = NewTransaction {
            date: self.date.trim().to_string(),
            amount,
            category: self.category.trim().to_string(),
            kind,
            memo: self.memo.as_deref().unwrap_or("").trim().to_string(),
        };
        tx.validate()?;
        Ok(tx)
    }
}

/// Parse a user-typed amount
///
/// Accepts plain decimals ("15000", "12.50") and scientific notation ("1.5e3").
/// Anything that is not a finite number is a validation error.
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("amount is required"));
    }

    let amount = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| Error::validation(format!("amount must be a number, got '{}'", trimmed)))?;

    validate_amount(amount)?;
    Ok(amount)
}

fn validate_amount(amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(Error::validation(format!(
            "amount must not be negative, got {}",
            amount
        )));
    }
    if amount >= Decimal::from(10i64.pow(MAX_AMOUNT_INTEGER_DIGITS)) {
        return Err(Error::validation(format!(
            "amount must have at most {} integer digits, got {}",
            MAX_AMOUNT_INTEGER_DIGITS, amount
        )));
    }
    if amount.normalize().scale() > MAX_AMOUNT_SCALE {
        return Err(Error::validation(format!(
            "amount has more than {} decimal places",
            MAX_AMOUNT_SCALE
        )));
    }
    Ok(())
}

/// Parse the calendar date out of an ISO 8601 date or date-time string
///
/// Accepted forms: `2024-01-05`, `2024-01-05T10:30:00`, `2024-01-05T10:30:00.123`,
/// and RFC 3339 (`2024-01-05T10:30:00.000Z`, `2024-01-05T10:30:00+09:00`).
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.date())
        .ok()
}

/// Amounts as JSON numbers written with their exact decimal digits
///
/// Relies on serde_json's `arbitrary_precision` so neither direction goes
/// through f64: `12345678901234.1234567891` is written and read back verbatim.
pub(crate) mod amount_number {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Number;

    pub fn serialize<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        let number = Number::from_str(&amount.normalize().to_string()).map_err(ser::Error::custom)?;
        number.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let number = Number::deserialize(deserializer)?;
        from_number(&number).map_err(de::Error::custom)
    }

    pub fn from_number(number: &Number) -> Result<Decimal, String> {
        let text = number.to_string();
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|_| format!("amount {} is not representable", text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(amount: &str, kind: &str) -> TransactionInput {
        TransactionInput {
            date: "2024-01-05".to_string(),
            amount: amount.to_string(),
            category: "food".to_string(),
            kind: kind.to_string(),
            memo: Some("lunch".to_string()),
        }
    }

    #[test]
    fn test_parse_valid_input() {
        let tx = input("15000", "expense").parse().unwrap();
        assert_eq!(tx.amount, Decimal::from(15000));
        assert_eq!(tx.kind, TransactionType::Expense);
        assert_eq!(tx.memo, "lunch");
    }

    #[test]
    fn test_non_numeric_amount_rejected() {
        let err = input("abc", "expense").parse().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = input("-5", "expense").parse().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_non_finite_amount_rejected() {
        assert!(parse_amount("NaN").unwrap_err().is_validation());
        assert!(parse_amount("inf").unwrap_err().is_validation());
        assert!(parse_amount("").unwrap_err().is_validation());
    }

    #[test]
    fn test_scientific_amount_accepted() {
        assert_eq!(parse_amount("1.5e3").unwrap(), Decimal::from(1500));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = input("10", "transfer").parse().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("transfer"));
    }

    #[test]
    fn test_empty_category_rejected() {
        let tx = NewTransaction::new("2024-01-05", Decimal::ONE, "  ", TransactionType::Expense);
        assert!(tx.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_date_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(parse_iso_date("2024-01-05"), Some(expected));
        assert_eq!(parse_iso_date("2024-01-05T10:30:00.000Z"), Some(expected));
        assert_eq!(parse_iso_date("2024-01-05T10:30:00"), Some(expected));
        assert_eq!(parse_iso_date("2024-01-05T23:30:00+09:00"), Some(expected));
        assert_eq!(parse_iso_date("05/01/2024"), None);
        assert_eq!(parse_iso_date("yesterday"), None);
    }

    #[test]
    fn test_bad_date_rejected() {
        let mut raw = input("10", "income");
        raw.date = "next tuesday".to_string();
        assert!(raw.parse().unwrap_err().is_validation());
    }

    #[test]
    fn test_amount_integer_digits_bounded() {
        assert!(parse_amount("999999999999999.9999999999").is_ok());
        assert!(parse_amount("1000000000000000").unwrap_err().is_validation());
        assert!(parse_amount("50000000000000000000000000000").unwrap_err().is_validation());

        let huge = NewTransaction::new(
            "2024-01-05",
            Decimal::from_str("9000000000000000000000000000").unwrap(),
            "food",
            TransactionType::Expense,
        );
        assert!(huge.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_amount_json_keeps_every_digit() {
        for text in ["123456789012345.1234567891", "999999999999999", "9007199254740.9935"] {
            let amount = Decimal::from_str(text).unwrap();
            let tx = NewTransaction::new("2024-01-05", amount, "food", TransactionType::Expense);
            tx.validate().unwrap();

            let json = serde_json::to_string(&tx).unwrap();
            assert!(json.contains(&format!("\"amount\":{}", text)), "{}", json);

            let back: NewTransaction = serde_json::from_str(&json).unwrap();
            assert_eq!(back.amount, amount);
            assert_eq!(back.amount.to_string(), text);
        }
    }

    #[test]
    fn test_amount_serializes_as_json_number() {
        let tx = Transaction::from_new(
            3,
            NewTransaction::new("2024-01-05", Decimal::new(1250, 2), "food", TransactionType::Expense),
        );
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["amount"], serde_json::json!(12.5));
        assert_eq!(value["type"], "expense");

        let whole = NewTransaction::new("2024-01-05", Decimal::from(15000), "food", TransactionType::Expense);
        let value = serde_json::to_value(&whole).unwrap();
        assert_eq!(value["amount"], serde_json::json!(15000));
    }

    #[test]
    fn test_amount_string_rejected_by_deserializer() {
        let json = r#"{"date":"2024-01-05","amount":"abc","category":"food","type":"expense"}"#;
        assert!(serde_json::from_str::<NewTransaction>(json).is_err());
    }

    #[test]
    fn test_amount_float_parses_exactly() {
        let json = r#"{"date":"2024-01-05","amount":0.1,"category":"food","type":"expense"}"#;
        let tx: NewTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.amount, Decimal::new(1, 1));
    }
}
