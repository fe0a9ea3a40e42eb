//! Money Log Core - Business logic for personal expense tracking
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (Transaction, summaries, backup documents)
//! - **ports**: Trait definitions for external dependencies (TransactionRepository)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (DuckDB, in-memory)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;
pub mod migrations;
pub mod log_migrations;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use adapters::duckdb::DuckDbRepository;
use config::Config;
use services::*;

// Re-export commonly used types at crate root
pub use domain::{
    BackupMetadata, CategoryShare, LedgerSummary, NewTransaction, Transaction,
    TransactionInput, TransactionType,
};
pub use domain::result::Error;
pub use ports::ListOrder;
pub use services::{EntryPoint, EventCount, LogEntry, LogEvent, LogFilter, LoggingService};

/// Ledger database file name inside the data directory
pub const DB_FILENAME: &str = "moneylog.duckdb";

/// Main context for Money Log operations
///
/// This is the primary entry point for all business logic. It holds
/// the database connection, configuration, and all services.
pub struct MoneyLogContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub repository: Arc<DuckDbRepository>,
    pub ledger_service: Arc<LedgerService>,
    pub backup_service: BackupService,
    pub status_service: StatusService,
}

impl MoneyLogContext {
    /// Open the ledger in `data_dir`, creating the directory and database as needed
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let config = Config::load(data_dir)?;

        let repository = Arc::new(DuckDbRepository::new(&data_dir.join(DB_FILENAME))?);

        // Initialize schema
        repository.ensure_schema()?;

        // Create services
        let ledger_service = Arc::new(LedgerService::new(repository.clone())?);
        let backup_service = BackupService::new(Arc::clone(&ledger_service), config.app_name.clone());
        let status_service = StatusService::new(Arc::clone(&ledger_service), Arc::clone(&repository));

        Ok(Self {
            config,
            data_dir: data_dir.to_path_buf(),
            repository,
            ledger_service,
            backup_service,
            status_service,
        })
    }
}
