//! Status service - record counts and store details

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::adapters::duckdb::DuckDbRepository;
use crate::domain::result::Result;
use crate::services::LedgerService;

/// Status service for ledger summaries
pub struct StatusService {
    ledger: Arc<LedgerService>,
    repository: Arc<DuckDbRepository>,
}

impl StatusService {
    pub fn new(ledger: Arc<LedgerService>, repository: Arc<DuckDbRepository>) -> Self {
        Self { ledger, repository }
    }

    /// Get overall status summary
    pub fn get_status(&self) -> Result<StatusSummary> {
        let snapshot = self.ledger.snapshot();
        let records = &snapshot.records;

        let dated = || records.iter().filter_map(|t| t.chronological_key().map(|k| (k, t)));
        let earliest = dated().min_by_key(|(k, _)| *k).map(|(_, t)| t.date.as_str());
        let latest = dated().max_by_key(|(k, _)| *k).map(|(_, t)| t.date.as_str());

        Ok(StatusSummary {
            total_transactions: records.len(),
            income_transactions: records.iter().filter(|t| t.is_income()).count(),
            expense_transactions: records.iter().filter(|t| t.is_expense()).count(),
            date_range: DateRange {
                earliest: earliest.map(String::from),
                latest: latest.map(String::from),
            },
            database_path: self.repository.db_path().map(PathBuf::from),
            database_size_bytes: self.repository.get_db_size()?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub total_transactions: usize,
    pub income_transactions: usize,
    pub expense_transactions: usize,
    pub date_range: DateRange,
    pub database_path: Option<PathBuf>,
    pub database_size_bytes: u64,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}
