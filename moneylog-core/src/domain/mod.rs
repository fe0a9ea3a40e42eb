//! Core domain entities
//!
//! All ledger entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod transaction;
pub mod backup;
pub mod result;
pub mod summary;

pub use backup::BackupMetadata;
pub use summary::{CategoryShare, LedgerSummary};
pub use transaction::{
    parse_amount, parse_iso_date, NewTransaction, Transaction, TransactionInput, TransactionType,
};
