use crate::core::Result;

/// Storage capability - byte-level access to named blobs under one root.
///
/// Blob names are plain file names (`users.json`), never paths.
pub trait Storage: Send + Sync {
    /// Check if a blob exists
    fn exists(&self, name: &str) -> bool;

    /// Make sure the root exists, creating it and its parents if needed
    fn create_dir_all(&self) -> Result<()>;

    /// Create an empty blob, truncating an existing one
    fn create(&self, name: &str) -> Result<()>;

    /// Read the full contents of a blob
    fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Replace the full contents of a blob
    fn write(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Delete a blob
    fn delete(&self, name: &str) -> Result<()>;

    /// List the names of all blobs under the root
    fn list(&self) -> Result<Vec<String>>;

    /// Human readable location of the root, for diagnostics
    fn location(&self) -> String;
}
