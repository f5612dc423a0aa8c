pub mod config;
pub mod error;
pub mod record;

pub use config::DbConfig;
pub use error::{ErrorKind, ErrorPayload, JsonDbError, Result};
pub use record::{ID_FIELD, Record, generate_id};
