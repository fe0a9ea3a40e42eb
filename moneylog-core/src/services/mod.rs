//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod backup;
mod ledger;
pub mod logging;
pub mod migration;
mod status;

pub use backup::{BackupService, ImportResult};
pub use ledger::{BulkInsertResult, LedgerService, Snapshot};
pub use logging::{EntryPoint, EventCount, LogEntry, LogEvent, LogFilter, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use status::{DateRange, StatusService, StatusSummary};
