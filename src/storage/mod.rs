pub mod catalog;
pub mod engine;
pub mod file;
pub mod memory;
pub mod table;

pub use catalog::{Catalog, TableHandle, sanitize_table_name};
pub use engine::Storage;
pub use file::FileStorage;
pub use memory::InMemoryStorage;
pub use table::Table;
