use super::{Storage, TableHandle};
use crate::core::{JsonDbError, Record, Result};

/// In-memory materialization of one table blob.
///
/// Entries are read lazily on first access and written back in full on
/// every persist; storage order is the table's canonical order.
#[derive(Debug, Clone)]
pub struct Table {
    handle: TableHandle,
    entries: Option<Vec<Record>>,
}

impl Table {
    pub fn new(handle: TableHandle) -> Self {
        Self {
            handle,
            entries: None,
        }
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    pub fn handle(&self) -> &TableHandle {
        &self.handle
    }

    pub fn is_loaded(&self) -> bool {
        self.entries.is_some()
    }

    /// Write an empty array blob for `handle`.
    pub fn create_empty(storage: &dyn Storage, handle: &TableHandle) -> Result<()> {
        storage.create(handle.blob())?;
        storage
            .write(handle.blob(), b"[]")
            .map_err(|e| persist_failure(handle, e))
    }

    /// Read and parse the blob, independently of any materialization.
    pub fn read_snapshot(storage: &dyn Storage, handle: &TableHandle) -> Result<Vec<Record>> {
        if !storage.exists(handle.blob()) {
            return Err(JsonDbError::TableNotFound(handle.name().to_string()));
        }
        let bytes = storage.read(handle.blob())?;
        // A freshly created blob has no bytes yet
        if bytes.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|e| JsonDbError::CorruptTable {
            table: handle.name().to_string(),
            reason: e.to_string(),
        })
    }

    /// Materialize entries unless already loaded.
    pub fn load(&mut self, storage: &dyn Storage) -> Result<&[Record]> {
        if self.entries.is_none() {
            self.entries = Some(Self::read_snapshot(storage, &self.handle)?);
        }
        Ok(self.entries.as_deref().unwrap_or_default())
    }

    pub fn entries(&self) -> &[Record] {
        self.entries.as_deref().unwrap_or_default()
    }

    /// Swap in new entries, handing back the previous ones.
    pub fn replace(&mut self, entries: Vec<Record>) -> Vec<Record> {
        self.entries.replace(entries).unwrap_or_default()
    }

    /// Serialize the current entries and overwrite the blob.
    pub fn persist(&self, storage: &dyn Storage) -> Result<()> {
        let bytes = serde_json::to_vec(self.entries()).map_err(|e| JsonDbError::PersistFailure {
            table: self.name().to_string(),
            reason: e.to_string(),
        })?;
        storage
            .write(self.handle.blob(), &bytes)
            .map_err(|e| persist_failure(&self.handle, e))
    }

    /// Replace the entries with nothing and persist.
    pub fn truncate(&mut self, storage: &dyn Storage) -> Result<()> {
        self.entries = Some(Vec::new());
        self.persist(storage)
    }
}

fn persist_failure(handle: &TableHandle, err: JsonDbError) -> JsonDbError {
    JsonDbError::PersistFailure {
        table: handle.name().to_string(),
        reason: err.to_string(),
    }
}
