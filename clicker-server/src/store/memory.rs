//! In-process players table for offline play and tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::{PlayerPatch, PlayerRow, PlayerStore};
use crate::error::{Error, Result};

#[derive(Default)]
pub struct MemoryStore {
    rows: RefCell<HashMap<String, PlayerRow>>,
    fail_reads: RefCell<Option<String>>,
    fail_writes: RefCell<Option<String>>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every read with `message` until `heal` is called.
    pub fn fail_reads(&self, message: &str) {
        *self.fail_reads.borrow_mut() = Some(message.to_string());
    }

    /// Fail every write with `message` until `heal` is called.
    pub fn fail_writes(&self, message: &str) {
        *self.fail_writes.borrow_mut() = Some(message.to_string());
    }

    pub fn heal(&self) {
        self.fail_reads.borrow_mut().take();
        self.fail_writes.borrow_mut().take();
    }

    /// Snapshot of a stored row.
    pub fn row(&self, id: &str) -> Option<PlayerRow> {
        self.rows.borrow().get(id).cloned()
    }

    pub fn put(&self, row: PlayerRow) {
        self.rows.borrow_mut().insert(row.id.clone(), row);
    }

    /// Successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    fn check_read(&self) -> Result<()> {
        match self.fail_reads.borrow().as_ref() {
            Some(message) => Err(Error::Store(message.clone())),
            None => Ok(()),
        }
    }

    fn check_write(&self) -> Result<()> {
        match self.fail_writes.borrow().as_ref() {
            Some(message) => Err(Error::Store(message.clone())),
            None => Ok(()),
        }
    }

    fn record_write(&self) {
        self.writes.set(self.writes.get() + 1);
    }
}

impl PlayerStore for MemoryStore {
    async fn select_by_id(&self, id: &str) -> Result<Option<PlayerRow>> {
        self.check_read()?;
        Ok(self.row(id))
    }

    async fn insert(&self, row: &PlayerRow) -> Result<PlayerRow> {
        self.check_write()?;
        if self.rows.borrow().contains_key(&row.id) {
            return Err(Error::Store(
                "duplicate key value violates unique constraint \"players_pkey\"".to_string(),
            ));
        }
        self.put(row.clone());
        self.record_write();
        Ok(row.clone())
    }

    async fn update_by_id(&self, id: &str, patch: &PlayerPatch) -> Result<()> {
        self.check_write()?;
        if let Some(row) = self.rows.borrow_mut().get_mut(id) {
            row.apply(patch);
        }
        self.record_write();
        Ok(())
    }

    async fn upsert(&self, id: &str, patch: &PlayerPatch) -> Result<()> {
        self.check_write()?;
        self.rows
            .borrow_mut()
            .entry(id.to_string())
            .or_insert_with(|| PlayerRow::blank(id))
            .apply(patch);
        self.record_write();
        Ok(())
    }
}
