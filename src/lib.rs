// ============================================================================
// RustJsonDB Library
// ============================================================================
//
// Embedded document store: every table is a JSON array of objects in its own
// blob, queried through a chainable builder.
//
//   JsonDB (catalog + storage) -> Session (table + QuerySpec)
//     -> QueryExecutor (where / or-where / order / limit / projection)
//     -> Table (load, replace, persist)
//
// ============================================================================

pub mod core;
pub mod storage;
pub mod planner;
pub mod result;
pub mod facade;
mod evaluator;
mod executor;

// Re-export main types for convenience
pub use facade::{JsonDB, Session};
pub use core::{DbConfig, ErrorKind, ErrorPayload, JsonDbError, Record, Result, generate_id};
pub use planner::{Join, Limit, Operator, Order, OrderBy, Predicate, Projection, QuerySpec};
pub use result::Routed;
pub use storage::{FileStorage, InMemoryStorage, Storage};
