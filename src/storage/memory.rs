use super::Storage;
use crate::core::{JsonDbError, Result};
use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Volatile storage, blobs live in a map for the lifetime of the value.
pub struct InMemoryStorage {
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
    /// Makes every `write` fail, to exercise persist failures
    fail_writes: AtomicBool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(BTreeMap::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Put raw bytes in place without going through `write`
    pub fn insert_raw(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.blobs.write()?.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for InMemoryStorage {
    fn exists(&self, name: &str) -> bool {
        self.blobs
            .read()
            .map(|blobs| blobs.contains_key(name))
            .unwrap_or(false)
    }

    fn create_dir_all(&self) -> Result<()> {
        Ok(())
    }

    fn create(&self, name: &str) -> Result<()> {
        self.blobs.write()?.insert(name.to_string(), Vec::new());
        Ok(())
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.blobs
            .read()?
            .get(name)
            .cloned()
            .ok_or_else(|| JsonDbError::Io(format!("Blob '{}' does not exist", name)))
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(JsonDbError::Io(format!("Write to '{}' rejected", name)));
        }
        self.blobs.write()?.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.blobs
            .write()?
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| JsonDbError::Io(format!("Blob '{}' does not exist", name)))
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.blobs.read()?.keys().cloned().collect())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
