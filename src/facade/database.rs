use super::session::Session;
use crate::core::{DbConfig, JsonDbError, Result};
use crate::executor::QueryExecutor;
use crate::storage::{Catalog, FileStorage, InMemoryStorage, Storage, TableHandle, sanitize_table_name};
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{Level, event};

/// Database handle: one storage root, its catalog and the query settings.
///
/// # Examples
///
/// ```
/// use rustjsondb::{DbConfig, JsonDB, Operator, Record};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let db = JsonDB::in_memory(DbConfig::default())?;
///
/// let mut users = db.table("users")?;
/// users.insert(Record::new().with("name", "Alice").with("age", 30))?;
/// users.insert(Record::new().with("name", "Bob").with("age", 25))?;
///
/// let mut adults = db.table("users")?.filter("age", Operator::Gt, 26)?;
/// assert_eq!(adults.get()?.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct JsonDB {
    storage: Arc<dyn Storage>,
    /// Catalog - replaced wholesale on every change (copy-on-write)
    catalog: RwLock<Catalog>,
    executor: QueryExecutor,
    config: DbConfig,
}

impl JsonDB {
    /// Open (or create) a database directory.
    pub fn open<P: AsRef<Path>>(dir: P, config: DbConfig) -> Result<Self> {
        Self::with_storage(Arc::new(FileStorage::new(dir)), config)
    }

    /// Volatile database, gone when the handle is dropped.
    pub fn in_memory(config: DbConfig) -> Result<Self> {
        Self::with_storage(Arc::new(InMemoryStorage::new()), config)
    }

    /// Database over any storage backend. Fails with `DirectoryInitFailure`
    /// when the storage root cannot be created.
    pub fn with_storage(storage: Arc<dyn Storage>, config: DbConfig) -> Result<Self> {
        storage.create_dir_all().map_err(|e| match e {
            JsonDbError::DirectoryInitFailure { .. } => e,
            other => JsonDbError::DirectoryInitFailure {
                path: storage.location(),
                reason: other.to_string(),
            },
        })?;

        let catalog = Catalog::new(&config.extension).refresh(storage.as_ref())?;
        if config.debug {
            event!(
                Level::DEBUG,
                location = %storage.location(),
                tables = catalog.list_tables().len(),
                "database opened"
            );
        }

        Ok(Self {
            executor: QueryExecutor::new(config.case_sensitive),
            storage,
            catalog: RwLock::new(catalog),
            config,
        })
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub(crate) fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    /// A session with no table selected yet.
    pub fn session(&self) -> Session<'_> {
        Session::new(self)
    }

    /// Select `name`, creating the table when it does not exist.
    pub fn table(&self, name: &str) -> Result<Session<'_>> {
        self.session().table(name)
    }

    /// Names of all known tables, sorted.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let catalog = self.catalog.read()?;
        Ok(catalog.list_tables().into_iter().map(str::to_string).collect())
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let name = sanitize_table_name(name)?;
        Ok(self.catalog.read()?.table_exists(&name))
    }

    /// Re-read the storage listing, e.g. after tables were added externally.
    pub fn refresh_catalog(&self) -> Result<()> {
        let mut catalog = self.catalog.write()?;
        let refreshed = catalog.clone().refresh(self.storage())?;
        if self.config.debug {
            event!(Level::DEBUG, tables = refreshed.list_tables().len(), "catalog refreshed");
        }
        *catalog = refreshed;
        Ok(())
    }

    pub(crate) fn handle_for(&self, name: &str) -> Result<TableHandle> {
        Ok(self.catalog.read()?.handle_for(name))
    }

    pub(crate) fn lookup(&self, name: &str) -> Result<TableHandle> {
        self.catalog.read()?.get_table(name).cloned()
    }

    /// Create the blob for `handle` when missing, then refresh the catalog.
    pub(crate) fn ensure_table(&self, handle: &TableHandle) -> Result<()> {
        if !self.storage.exists(handle.blob()) {
            if self.config.debug {
                event!(
                    Level::DEBUG,
                    table = handle.name(),
                    "table does not exist and will be created"
                );
            }
            crate::storage::Table::create_empty(self.storage(), handle)?;
        }
        let mut catalog = self.catalog.write()?;
        let refreshed = catalog
            .clone()
            .with_table(handle.clone())
            .refresh(self.storage())?;
        *catalog = refreshed;
        Ok(())
    }

    /// Delete the blob of `name` and forget the table.
    pub(crate) fn drop_table(&self, name: &str) -> Result<()> {
        let mut catalog = self.catalog.write()?;
        let handle = catalog.get_table(name)?.clone();
        if self.storage.exists(handle.blob()) {
            self.storage.delete(handle.blob())?;
        }
        let refreshed = catalog.clone().without_table(name)?.refresh(self.storage())?;
        *catalog = refreshed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("jsondb");
        let db = JsonDB::open(&dir, DbConfig::default()).unwrap();
        assert!(dir.is_dir());
        assert!(db.list_tables().unwrap().is_empty());
    }

    #[test]
    fn test_open_discovers_existing_tables() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("users.json"), "[]").unwrap();
        std::fs::write(temp_dir.path().join("readme.txt"), "").unwrap();
        let db = JsonDB::open(temp_dir.path(), DbConfig::default()).unwrap();
        assert_eq!(db.list_tables().unwrap(), vec!["users"]);
        assert!(db.table_exists("Users").unwrap());
    }

    #[test]
    fn test_open_fails_when_root_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("occupied");
        std::fs::write(&file, "x").unwrap();
        let result = JsonDB::open(file.join("db"), DbConfig::default());
        assert!(matches!(result, Err(JsonDbError::DirectoryInitFailure { .. })));
    }

    #[test]
    fn test_refresh_picks_up_external_tables() {
        let temp_dir = TempDir::new().unwrap();
        let db = JsonDB::open(temp_dir.path(), DbConfig::default()).unwrap();
        std::fs::write(temp_dir.path().join("late.json"), "[]").unwrap();
        assert!(!db.table_exists("late").unwrap());
        db.refresh_catalog().unwrap();
        assert!(db.table_exists("late").unwrap());
    }
}
