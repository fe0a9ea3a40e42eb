//! Backup service - JSON export and import of the ledger
//!
//! Writes the current snapshot as a backup document under the conventional
//! `<app-name>-backup-<date>.json` name, and reads such documents back into
//! the store. Imports decode the whole document before touching the store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::domain::backup::{backup_file_name, export_document, import_document};
use crate::domain::result::Result;
use crate::domain::{BackupMetadata, NewTransaction};
use crate::services::LedgerService;

/// Outcome of importing a backup document
#[derive(Debug, Clone, Serialize)]
pub struct ImportResult {
    /// Number of records the document contained
    pub total: usize,
    pub imported: usize,
    /// Identities assigned to the imported records, in document order
    pub ids: Vec<i64>,
    /// Set when the store rejected a record part way through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct BackupService {
    ledger: Arc<LedgerService>,
    app_name: String,
}

impl BackupService {
    pub fn new(ledger: Arc<LedgerService>, app_name: impl Into<String>) -> Self {
        Self {
            ledger,
            app_name: app_name.into(),
        }
    }

    /// Conventional file name for a backup taken on `date`
    pub fn file_name(&self, date: NaiveDate) -> String {
        backup_file_name(&self.app_name, date)
    }

    /// Write the current snapshot into `dir` under the conventional name
    pub fn export_to(&self, dir: &Path, today: NaiveDate) -> Result<BackupMetadata> {
        fs::create_dir_all(dir)?;
        self.export_to_path(&dir.join(self.file_name(today)))
    }

    /// Write the current snapshot to an explicit path, replacing any existing file
    pub fn export_to_path(&self, path: &Path) -> Result<BackupMetadata> {
        let snapshot = self.ledger.snapshot();
        let document = export_document(&snapshot.records)?;
        fs::write(path, document)?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(BackupMetadata {
            name,
            path: PathBuf::from(path),
            created_at: Utc::now(),
            record_count: snapshot.records.len(),
            size_bytes: fs::metadata(path)?.len(),
        })
    }

    /// Decode a backup file without touching the store
    pub fn read_document(&self, path: &Path) -> Result<Vec<NewTransaction>> {
        let document = fs::read_to_string(path)?;
        import_document(&document)
    }

    /// Import a backup file, appending its records with fresh identities
    pub fn import_file(&self, path: &Path) -> Result<ImportResult> {
        let records = self.read_document(path)?;
        self.import_records(records)
    }

    /// Import a backup document held in memory
    pub fn import_str(&self, document: &str) -> Result<ImportResult> {
        let records = import_document(document)?;
        self.import_records(records)
    }

    /// Import records that were already decoded, e.g. to inspect them first
    pub fn import_records(&self, records: Vec<NewTransaction>) -> Result<ImportResult> {
        let total = records.len();
        let result = self.ledger.bulk_insert(records)?;
        Ok(ImportResult {
            total,
            imported: result.inserted(),
            ids: result.inserted_ids,
            error: result.error,
        })
    }
}
