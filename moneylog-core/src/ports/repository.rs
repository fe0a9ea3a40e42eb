//! Repository port - record storage abstraction

use crate::domain::result::Result;
use crate::domain::{NewTransaction, Transaction};

/// Scan order for listing records, by identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    /// Insertion order
    #[default]
    Oldest,
    /// Reverse insertion order
    Newest,
}

impl ListOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ListOrder::Oldest => "ASC",
            ListOrder::Newest => "DESC",
        }
    }
}

/// Transaction storage abstraction
///
/// Implementations (adapters) provide durable or ephemeral storage. Callers are
/// expected to validate records before `insert`; repositories assign identities
/// that are unique and never reused for the lifetime of the store.
pub trait TransactionRepository: Send + Sync {
    /// Persist a record and return its freshly assigned identity
    fn insert(&self, tx: &NewTransaction) -> Result<i64>;

    /// Remove a record; `Error::NotFound` if no record has this identity
    fn delete(&self, id: i64) -> Result<()>;

    /// Point-in-time copy of every record
    fn list_all(&self, order: ListOrder) -> Result<Vec<Transaction>>;

    /// Look up a single record
    fn get(&self, id: i64) -> Result<Option<Transaction>>;

    /// Number of stored records
    fn count(&self) -> Result<i64>;
}
