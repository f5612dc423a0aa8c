pub mod delete;
pub mod dml;
pub mod query;
pub mod sort;
pub mod update;

pub use query::QueryExecutor;
