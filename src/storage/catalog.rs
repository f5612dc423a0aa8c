use super::Storage;
use crate::core::{JsonDbError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

lazy_static::lazy_static! {
    static ref UNSAFE_NAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_]").unwrap();
}

/// Turn a user supplied table name into its storage form: every character
/// outside `[A-Za-z0-9_]` becomes `_`, the rest is lower-cased.
pub fn sanitize_table_name(name: &str) -> Result<String> {
    let cleaned = UNSAFE_NAME_CHARS.replace_all(name, "_").to_lowercase();
    if cleaned.is_empty() {
        return Err(JsonDbError::InvalidQuery("table name must not be empty".into()));
    }
    Ok(cleaned)
}

/// Where one table lives in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHandle {
    name: String,
    blob: String,
}

impl TableHandle {
    pub fn new(name: impl Into<String>, extension: &str) -> Self {
        let name = name.into();
        let blob = format!("{}.{}", name, extension);
        Self { name, blob }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blob(&self) -> &str {
        &self.blob
    }
}

/// Name -> handle mapping of every known table.
///
/// Immutable once built; changes produce a new Catalog (copy-on-write), so
/// clones are cheap and never observe a half-applied refresh.
#[derive(Debug, Clone)]
pub struct Catalog {
    tables: Arc<HashMap<String, TableHandle>>,
    extension: String,
}

impl Catalog {
    pub fn new(extension: &str) -> Self {
        Self {
            tables: Arc::new(HashMap::new()),
            extension: extension.to_string(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// List storage and (re)insert a handle for every blob with the table
    /// extension. Tables not seen in this listing are kept.
    pub fn refresh(self, storage: &dyn Storage) -> Result<Self> {
        let suffix = format!(".{}", self.extension);
        let mut new_tables = (*self.tables).clone();
        for blob in storage.list()? {
            if let Some(name) = blob.strip_suffix(&suffix)
                && !name.is_empty()
            {
                new_tables.insert(name.to_string(), TableHandle::new(name, &self.extension));
            }
        }

        Ok(Self {
            tables: Arc::new(new_tables),
            extension: self.extension,
        })
    }

    pub fn with_table(self, handle: TableHandle) -> Self {
        let mut new_tables = (*self.tables).clone();
        new_tables.insert(handle.name().to_string(), handle);
        Self {
            tables: Arc::new(new_tables),
            extension: self.extension,
        }
    }

    pub fn without_table(self, name: &str) -> Result<Self> {
        if !self.tables.contains_key(name) {
            return Err(JsonDbError::TableNotFound(name.to_string()));
        }

        let mut new_tables = (*self.tables).clone();
        new_tables.remove(name);

        Ok(Self {
            tables: Arc::new(new_tables),
            extension: self.extension,
        })
    }

    pub fn get_table(&self, name: &str) -> Result<&TableHandle> {
        self.tables
            .get(name)
            .ok_or_else(|| JsonDbError::TableNotFound(name.to_string()))
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn list_tables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Handle for `name`, whether or not it is registered yet.
    pub fn handle_for(&self, name: &str) -> TableHandle {
        TableHandle::new(name, &self.extension)
    }
}
