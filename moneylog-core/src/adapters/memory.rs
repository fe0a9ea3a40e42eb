//! In-memory repository implementation
//!
//! Ephemeral storage with the same identity semantics as the DuckDB adapter:
//! ids come from a monotonically increasing counter and are never reused.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::result::{Error, Result};
use crate::domain::{NewTransaction, Transaction};
use crate::ports::{ListOrder, TransactionRepository};

struct MemoryState {
    next_id: i64,
    records: BTreeMap<i64, Transaction>,
}

pub struct MemoryRepository {
    state: RwLock<MemoryState>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                next_id: 1,
                records: BTreeMap::new(),
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }
}

impl TransactionRepository for MemoryRepository {
    fn insert(&self, tx: &NewTransaction) -> Result<i64> {
        let mut state = self.write()?;
        let id = state.next_id;
        state.next_id += 1;
        state.records.insert(id, Transaction::from_new(id, tx.clone()));
        Ok(id)
    }

    fn delete(&self, id: i64) -> Result<()> {
        let mut state = self.write()?;
        state
            .records
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("transaction {}", id)))
    }

    fn list_all(&self, order: ListOrder) -> Result<Vec<Transaction>> {
        let state = self.read()?;
        let records = state.records.values().cloned();
        Ok(match order {
            ListOrder::Oldest => records.collect(),
            ListOrder::Newest => records.rev().collect(),
        })
    }

    fn get(&self, id: i64) -> Result<Option<Transaction>> {
        Ok(self.read()?.records.get(&id).cloned())
    }

    fn count(&self) -> Result<i64> {
        Ok(self.read()?.records.len() as i64)
    }
}
