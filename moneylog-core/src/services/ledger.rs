//! Ledger service - the record store front door
//!
//! Validates records before they reach the repository and publishes a fresh
//! snapshot of the whole ledger after every mutation. Views subscribe to the
//! snapshot channel and recompute aggregates from it.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::domain::result::Result;
use crate::domain::{LedgerSummary, NewTransaction, Transaction, TransactionInput};
use crate::ports::{ListOrder, TransactionRepository};

/// Point-in-time copy of every record, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Incremented on every published change
    pub version: u64,
    pub records: Arc<Vec<Transaction>>,
}

impl Snapshot {
    pub fn summary(&self) -> Result<LedgerSummary> {
        LedgerSummary::from_records(&self.records)
    }
}

/// Outcome of a bulk insert
///
/// Bulk insert is a loop of single inserts. If one fails the loop stops and
/// the records already inserted stay in the store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkInsertResult {
    pub inserted_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BulkInsertResult {
    pub fn inserted(&self) -> usize {
        self.inserted_ids.len()
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

pub struct LedgerService {
    repository: Arc<dyn TransactionRepository>,
    sender: watch::Sender<Snapshot>,
}

impl LedgerService {
    /// Wrap a repository, loading its current contents as snapshot version 0
    pub fn new(repository: Arc<dyn TransactionRepository>) -> Result<Self> {
        let records = repository.list_all(ListOrder::Oldest)?;
        let (sender, _) = watch::channel(Snapshot {
            version: 0,
            records: Arc::new(records),
        });
        Ok(Self { repository, sender })
    }

    /// Validate and persist one record, returning its new identity
    pub fn insert(&self, tx: NewTransaction) -> Result<i64> {
        tx.validate()?;
        let id = self.repository.insert(&tx)?;
        let record = Transaction::from_new(id, tx);
        self.publish(|records| records.push(record));
        Ok(id)
    }

    /// Parse raw user input, then insert
    pub fn add(&self, input: &TransactionInput) -> Result<i64> {
        let tx = input.parse()?;
        self.insert(tx)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        self.repository.delete(id)?;
        self.publish(|records| records.retain(|t| t.id != id));
        Ok(())
    }

    pub fn list_all(&self, order: ListOrder) -> Result<Vec<Transaction>> {
        self.repository.list_all(order)
    }

    pub fn get(&self, id: i64) -> Result<Option<Transaction>> {
        self.repository.get(id)
    }

    /// Insert each record in turn with a fresh identity
    pub fn bulk_insert(&self, records: Vec<NewTransaction>) -> Result<BulkInsertResult> {
        let mut result = BulkInsertResult::default();
        let mut inserted = Vec::new();

        for (index, tx) in records.into_iter().enumerate() {
            let outcome = tx.validate().and_then(|_| self.repository.insert(&tx));
            match outcome {
                Ok(id) => {
                    result.inserted_ids.push(id);
                    inserted.push(Transaction::from_new(id, tx));
                }
                Err(e) => {
                    result.error = Some(format!("record {}: {}", index, e));
                    break;
                }
            }
        }

        if !inserted.is_empty() {
            self.publish(|records| records.extend(inserted));
        }
        Ok(result)
    }

    /// Receiver holding the current snapshot; it is notified of every later one
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.sender.subscribe()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.sender.borrow().clone()
    }

    /// Aggregates over the latest snapshot
    pub fn summary(&self) -> Result<LedgerSummary> {
        self.sender.borrow().summary()
    }

    /// Publish the store contents after a persisted write
    ///
    /// The write already succeeded, so a failed reload must not surface as an
    /// error. The previous snapshot is patched with `apply` instead.
    fn publish(&self, apply: impl FnOnce(&mut Vec<Transaction>)) {
        let reloaded = self.repository.list_all(ListOrder::Oldest);
        self.sender.send_modify(|snapshot| {
            snapshot.version += 1;
            match reloaded {
                Ok(records) => snapshot.records = Arc::new(records),
                Err(e) => {
                    eprintln!("[moneylog] Failed to reload ledger, patching last snapshot: {}", e);
                    apply(Arc::make_mut(&mut snapshot.records));
                }
            }
        });
    }
}
