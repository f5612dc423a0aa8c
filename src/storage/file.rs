//! Directory-backed storage
//!
//! Every blob is a file directly below the root directory. Writes go to a
//! temporary file in the same directory which is then renamed over the
//! target, so readers observe either the old or the new contents.

use super::Storage;
use crate::core::{JsonDbError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Storage for FileStorage {
    fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    fn create_dir_all(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| JsonDbError::DirectoryInitFailure {
            path: self.root.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn create(&self, name: &str) -> Result<()> {
        fs::File::create(self.path(name))
            .map_err(|e| JsonDbError::Io(format!("Failed to create '{}': {}", name, e)))?;
        Ok(())
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        fs::read(self.path(name))
            .map_err(|e| JsonDbError::Io(format!("Failed to read '{}': {}", name, e)))
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let mut temp = NamedTempFile::new_in(&self.root)
            .map_err(|e| JsonDbError::Io(format!("Failed to create temp file: {}", e)))?;
        temp.write_all(bytes)
            .map_err(|e| JsonDbError::Io(format!("Failed to write '{}': {}", name, e)))?;
        temp.flush()
            .map_err(|e| JsonDbError::Io(format!("Failed to flush '{}': {}", name, e)))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| JsonDbError::Io(format!("Failed to sync '{}': {}", name, e)))?;
        temp.persist(self.path(name))
            .map_err(|e| JsonDbError::Io(format!("Failed to rename '{}': {}", name, e.error)))?;
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        fs::remove_file(self.path(name))
            .map_err(|e| JsonDbError::Io(format!("Failed to delete '{}': {}", name, e)))
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let dir = fs::read_dir(&self.root).map_err(|e| {
            JsonDbError::Io(format!("Failed to list '{}': {}", self.root.display(), e))
        })?;
        for entry in dir {
            let entry = entry?;
            if entry.file_type()?.is_file()
                && let Some(name) = entry.file_name().to_str()
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}
