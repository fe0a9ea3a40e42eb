//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use duckdb::{params, Connection};
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{NewTransaction, Transaction, TransactionType};
use crate::ports::{ListOrder, TransactionRepository};
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Columns read back for every record; amount is read as text to keep full precision
const SELECT_COLUMNS: &str = "transaction_id, date, amount::VARCHAR, category, type, memo";

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
        || lower.contains("could not set lock on file")
}

/// Raw column values of one `sys_transactions` row
type StoredRow = (i64, String, String, String, String, Option<String>);

/// DuckDB repository implementation
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) the database file
    ///
    /// Includes retry logic with exponential backoff for file locking errors,
    /// which occur when another process (e.g. a second CLI invocation) holds
    /// the database open.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[moneylog] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::database(format!("Failed to open database after {} retries", MAX_RETRIES))
        }))
    }

    /// Open a throwaway in-memory database (nothing is written to disk)
    pub fn in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading is disabled: nothing here needs extensions and
        // cached ones in ~/.duckdb may fail to load.
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn)
            .run_pending()
            .map_err(|e| Error::database(format!("Migration failed: {:#}", e)))
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    /// Path of the database file, `None` for in-memory databases
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Size of the database file in bytes (0 for in-memory databases)
    pub fn get_db_size(&self) -> Result<u64> {
        match &self.db_path {
            Some(path) if path.exists() => Ok(std::fs::metadata(path)?.len()),
            _ => Ok(0),
        }
    }

    fn read_row(row: &duckdb::Row) -> duckdb::Result<StoredRow> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
        ))
    }

    fn row_to_transaction(stored: StoredRow) -> Result<Transaction> {
        let (id, date, amount_str, category, kind_str, memo) = stored;

        let amount = Decimal::from_str(&amount_str)
            .map_err(|e| {
                Error::database(format!("Corrupt amount '{}' in record {}: {}", amount_str, id, e))
            })?
            .normalize();
        let kind = TransactionType::from_str(&kind_str).map_err(|_| {
            Error::database(format!("Corrupt type '{}' in record {}", kind_str, id))
        })?;

        Ok(Transaction {
            id,
            date,
            amount,
            category,
            kind,
            memo: memo.unwrap_or_default(),
        })
    }
}

impl TransactionRepository for DuckDbRepository {
    fn insert(&self, tx: &NewTransaction) -> Result<i64> {
        let conn = self.lock()?;
        // Amount is bound as text and cast in SQL so no precision is lost through f64
        let id: i64 = conn.query_row(
            "INSERT INTO sys_transactions (date, amount, category, type, memo)
             VALUES (?, CAST(? AS DECIMAL(38, 10)), ?, ?, ?)
             RETURNING transaction_id",
            params![
                tx.date,
                tx.amount.to_string(),
                tx.category,
                tx.kind.as_str(),
                tx.memo,
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    fn delete(&self, id: i64) -> Result<()> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM sys_transactions WHERE transaction_id = ?",
            params![id],
        )?;
        if deleted == 0 {
            return Err(Error::not_found(format!("transaction {}", id)));
        }
        Ok(())
    }

    fn list_all(&self, order: ListOrder) -> Result<Vec<Transaction>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM sys_transactions ORDER BY transaction_id {}",
            SELECT_COLUMNS,
            order.as_sql()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], Self::read_row)?
            .collect::<duckdb::Result<Vec<_>>>()?;

        rows.into_iter().map(Self::row_to_transaction).collect()
    }

    fn get(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM sys_transactions WHERE transaction_id = ?",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt
            .query_map(params![id], Self::read_row)?
            .collect::<duckdb::Result<Vec<_>>>()?;

        match rows.pop() {
            Some(row) => Ok(Some(Self::row_to_transaction(row)?)),
            None => Ok(None),
        }
    }

    fn count(&self) -> Result<i64> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM sys_transactions", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> DuckDbRepository {
        let repo = DuckDbRepository::in_memory().unwrap();
        repo.ensure_schema().unwrap();
        repo
    }

    fn expense(amount: Decimal) -> NewTransaction {
        NewTransaction::new("2024-01-05", amount, "food", TransactionType::Expense).with_memo("lunch")
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let repo = repo();
        let first = repo.insert(&expense(Decimal::from(10))).unwrap();
        let second = repo.insert(&expense(Decimal::from(20))).unwrap();
        assert!(second > first);
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn test_amount_precision_preserved() {
        let repo = repo();
        let id = repo.insert(&expense(Decimal::new(123456789, 4))).unwrap();
        let tx = repo.get(id).unwrap().unwrap();
        assert_eq!(tx.amount, Decimal::new(123456789, 4));
        assert_eq!(tx.memo, "lunch");
        assert_eq!(tx.kind, TransactionType::Expense);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let repo = repo();
        let id = repo.insert(&expense(Decimal::ONE)).unwrap();
        repo.delete(id).unwrap();
        let err = repo.delete(id).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let repo = repo();
        let first = repo.insert(&expense(Decimal::ONE)).unwrap();
        repo.delete(first).unwrap();
        let second = repo.insert(&expense(Decimal::ONE)).unwrap();
        assert_ne!(first, second);
        assert!(second > first);
    }

    #[test]
    fn test_list_order() {
        let repo = repo();
        let a = repo.insert(&expense(Decimal::from(1))).unwrap();
        let b = repo.insert(&expense(Decimal::from(2))).unwrap();

        let oldest: Vec<i64> = repo.list_all(ListOrder::Oldest).unwrap().iter().map(|t| t.id).collect();
        let newest: Vec<i64> = repo.list_all(ListOrder::Newest).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(oldest, vec![a, b]);
        assert_eq!(newest, vec![b, a]);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let repo = repo();
        assert!(repo.get(42).unwrap().is_none());
    }

    #[test]
    fn test_schema_rejects_unknown_type() {
        let repo = repo();
        let conn = repo.lock().unwrap();
        let result = conn.execute(
            "INSERT INTO sys_transactions (date, amount, category, type) VALUES ('2024-01-01', 1, 'food', 'transfer')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_retryable_errors() {
        assert!(is_retryable_error("IO Error: Could not set lock on file"));
        assert!(is_retryable_error("The process cannot access the file because it is being used by another process"));
        assert!(!is_retryable_error("Catalog Error: Table does not exist"));
    }
}
