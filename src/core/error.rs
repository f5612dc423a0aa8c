use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JsonDbError {
    #[error("No table selected")]
    NoTableSelected,

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Entry with id '{0}' already exists")]
    DuplicateId(String),

    #[error("Operator '{operator}' not supported, expected one of: {allowed}")]
    UnsupportedOperator { operator: String, allowed: String },

    #[error("Invalid operand: {0}")]
    InvalidOperand(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Could not write table '{table}': {reason}")]
    PersistFailure { table: String, reason: String },

    #[error("Could not create database directory '{path}': {reason}")]
    DirectoryInitFailure { path: String, reason: String },

    #[error("Table '{table}' contains malformed JSON: {reason}")]
    CorruptTable { table: String, reason: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

pub type Result<T> = std::result::Result<T, JsonDbError>;

impl<T> From<std::sync::PoisonError<T>> for JsonDbError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<std::io::Error> for JsonDbError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Discriminant of [`JsonDbError`], stable across releases and used in
/// error payloads handed to callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NoTableSelected,
    TableNotFound,
    DuplicateId,
    UnsupportedOperator,
    InvalidOperand,
    InvalidQuery,
    InvalidRecord,
    PersistFailure,
    DirectoryInitFailure,
    CorruptTable,
    Io,
    Lock,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoTableSelected => "no_table_selected",
            Self::TableNotFound => "table_not_found",
            Self::DuplicateId => "duplicate_id",
            Self::UnsupportedOperator => "unsupported_operator",
            Self::InvalidOperand => "invalid_operand",
            Self::InvalidQuery => "invalid_query",
            Self::InvalidRecord => "invalid_record",
            Self::PersistFailure => "persist_failure",
            Self::DirectoryInitFailure => "directory_init_failure",
            Self::CorruptTable => "corrupt_table",
            Self::Io => "io",
            Self::Lock => "lock",
        };
        f.write_str(name)
    }
}

impl JsonDbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoTableSelected => ErrorKind::NoTableSelected,
            Self::TableNotFound(_) => ErrorKind::TableNotFound,
            Self::DuplicateId(_) => ErrorKind::DuplicateId,
            Self::UnsupportedOperator { .. } => ErrorKind::UnsupportedOperator,
            Self::InvalidOperand(_) => ErrorKind::InvalidOperand,
            Self::InvalidQuery(_) => ErrorKind::InvalidQuery,
            Self::InvalidRecord(_) => ErrorKind::InvalidRecord,
            Self::PersistFailure { .. } => ErrorKind::PersistFailure,
            Self::DirectoryInitFailure { .. } => ErrorKind::DirectoryInitFailure,
            Self::CorruptTable { .. } => ErrorKind::CorruptTable,
            Self::Io(_) => ErrorKind::Io,
            Self::LockError(_) => ErrorKind::Lock,
        }
    }

    /// Malformed storage and a missing database directory are never
    /// handed to an error callback.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DirectoryInitFailure { .. } | Self::CorruptTable { .. }
        )
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Structured error handed to error callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub kind: ErrorKind,
    pub message: String,
}
