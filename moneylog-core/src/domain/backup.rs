//! Backup document codec
//!
//! The backup document is a pretty-printed JSON array of transaction objects:
//!
//! ```json
//! [
//!   { "id": 1, "date": "2024-01-05", "amount": 15000, "category": "food", "type": "expense", "memo": "lunch" }
//! ]
//! ```
//!
//! On import, `id` and any unknown fields are ignored so re-insertion assigns
//! fresh identities. Import never deduplicates.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::result::{Error, Result};
use super::transaction::{amount_number, NewTransaction, Transaction, TransactionType};

/// Metadata for a written backup file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupMetadata {
    /// Backup filename (e.g., "money-log-backup-2024-01-15.json")
    pub name: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub record_count: usize,
    pub size_bytes: u64,
}

impl BackupMetadata {
    /// Format size for human display
    pub fn size_display(&self) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;

        if self.size_bytes >= MB {
            format!("{:.1} MB", self.size_bytes as f64 / MB as f64)
        } else if self.size_bytes >= KB {
            format!("{:.1} KB", self.size_bytes as f64 / KB as f64)
        } else {
            format!("{} bytes", self.size_bytes)
        }
    }
}

/// Conventional export filename: `<app-name>-backup-<YYYY-MM-DD>.json`
pub fn backup_file_name(app_name: &str, date: NaiveDate) -> String {
    format!("{}-backup-{}.json", app_name, date.format("%Y-%m-%d"))
}

/// Encode records, in the order given, as an indented JSON array
pub fn export_document(records: &[Transaction]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Wire shape of one backup element; `id` and extra fields are dropped by serde
#[derive(Debug, Deserialize)]
struct BackupEntry {
    date: String,
    #[serde(with = "amount_number")]
    amount: rust_decimal::Decimal,
    category: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    memo: Option<String>,
}

/// Decode a backup document into insertable records
///
/// The whole document is rejected with a format error if it is not valid JSON,
/// not an array, or if any element is malformed. Nothing is returned partially.
pub fn import_document(document: &str) -> Result<Vec<NewTransaction>> {
    let value: JsonValue = serde_json::from_str(document)
        .map_err(|e| Error::format(format!("not valid JSON: {}", e)))?;

    let elements = match value {
        JsonValue::Array(elements) => elements,
        other => {
            return Err(Error::format(format!(
                "expected a JSON array at the top level, got {}",
                json_kind(&other)
            )))
        }
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| decode_entry(index, element))
        .collect()
}

fn decode_entry(index: usize, element: JsonValue) -> Result<NewTransaction> {
    if !element.is_object() {
        return Err(Error::format(format!(
            "element {} is {}, expected an object",
            index,
            json_kind(&element)
        )));
    }

    let entry: BackupEntry = serde_json::from_value(element)
        .map_err(|e| Error::format(format!("element {}: {}", index, e)))?;

    let kind: TransactionType = entry
        .kind
        .parse()
        .map_err(|e: Error| Error::format(format!("element {}: {}", index, inner_message(&e))))?;

    let tx = NewTransaction {
        date: entry.date,
        amount: entry.amount,
        category: entry.category,
        kind,
        memo: entry.memo.unwrap_or_default(),
    };
    tx.validate()
        .map_err(|e| Error::format(format!("element {}: {}", index, inner_message(&e))))?;

    Ok(tx)
}

fn inner_message(err: &Error) -> String {
    match err {
        Error::Validation(msg) | Error::Format(msg) => msg.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn records() -> Vec<Transaction> {
        vec![
            Transaction::from_new(
                1,
                NewTransaction::new("2024-01-05", Decimal::from(15000), "food", TransactionType::Expense)
                    .with_memo("lunch"),
            ),
            Transaction::from_new(
                2,
                NewTransaction::new("2024-01-06", Decimal::from(500000), "income", TransactionType::Income)
                    .with_memo("salary"),
            ),
        ]
    }

    #[test]
    fn test_backup_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(backup_file_name("money-log", date), "money-log-backup-2024-03-09.json");
    }

    #[test]
    fn test_export_is_indented_array_with_ids() {
        let doc = export_document(&records()).unwrap();
        assert!(doc.starts_with("[\n"));
        let value: JsonValue = serde_json::from_str(&doc).unwrap();
        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[0]["amount"], 15000);
        assert_eq!(value[1]["type"], "income");
        assert_eq!(value[1]["memo"], "salary");
    }

    #[test]
    fn test_round_trip_ignoring_ids() {
        let original = records();
        let doc = export_document(&original).unwrap();
        let imported = import_document(&doc).unwrap();
        let expected: Vec<NewTransaction> = original.iter().map(|t| t.to_new()).collect();
        assert_eq!(imported, expected);
    }

    #[test]
    fn test_import_rejects_non_json() {
        let err = import_document("{not an array}").unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_import_rejects_non_array() {
        let err = import_document(r#"{"date": "2024-01-05"}"#).unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("an object"));
    }

    #[test]
    fn test_import_strips_ids_and_extra_fields() {
        let doc = r#"[
            {"id": 7, "date": "2024-01-05", "amount": 10, "category": "food", "type": "expense", "color": "red"},
            {"id": 9, "date": "2024-01-06", "amount": 20.5, "category": "income", "type": "income", "memo": "bonus"}
        ]"#;
        let imported = import_document(doc).unwrap();
        assert_eq!(imported.len(), 2);
        assert_eq!(imported[0].memo, "");
        assert_eq!(imported[1].amount, Decimal::new(205, 1));
        assert_eq!(imported[1].memo, "bonus");
    }

    #[test]
    fn test_import_missing_required_field_fails_whole_document() {
        let doc = r#"[
            {"date": "2024-01-05", "amount": 10, "category": "food", "type": "expense"},
            {"date": "2024-01-06", "category": "food", "type": "expense"}
        ]"#;
        let err = import_document(doc).unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("element 1"));
    }

    #[test]
    fn test_import_rejects_bad_type_and_amount() {
        let bad_type = r#"[{"date": "2024-01-05", "amount": 10, "category": "food", "type": "transfer"}]"#;
        assert!(import_document(bad_type).unwrap_err().is_format());

        let bad_amount = r#"[{"date": "2024-01-05", "amount": "abc", "category": "food", "type": "expense"}]"#;
        assert!(import_document(bad_amount).unwrap_err().is_format());

        let negative = r#"[{"date": "2024-01-05", "amount": -3, "category": "food", "type": "expense"}]"#;
        assert!(import_document(negative).unwrap_err().is_format());
    }

    #[test]
    fn test_import_null_memo_defaults_to_empty() {
        let doc = r#"[{"date": "2024-01-05", "amount": 1, "category": "food", "type": "expense", "memo": null}]"#;
        assert_eq!(import_document(doc).unwrap()[0].memo, "");
    }

    #[test]
    fn test_import_empty_array() {
        assert!(import_document("[]").unwrap().is_empty());
    }

    #[test]
    fn test_size_display() {
        let meta = BackupMetadata {
            name: "money-log-backup-2024-01-15.json".to_string(),
            path: PathBuf::from("money-log-backup-2024-01-15.json"),
            created_at: Utc::now(),
            record_count: 3,
            size_bytes: 1536,
        };
        assert_eq!(meta.size_display(), "1.5 KB");
    }
}
