//! Error types for the storage layer.

use fleetprov_model::{ModelError, RowError, SchemaError};
use fleetprov_types::ObjectId;
use std::fmt;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Coarse classification of a [`StorageError`], used by the HTTP boundary to
/// pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidInput,
    UnknownReference,
    CorruptRecord,
    StorageUnavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::UnknownReference => "UnknownReference",
            ErrorKind::CorruptRecord => "CorruptRecord",
            ErrorKind::StorageUnavailable => "StorageUnavailable",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No row matched.
    #[error("{table} not found: {key}")]
    NotFound { table: String, key: String },

    #[error("root entity already exists")]
    RootAlreadyExists,

    #[error("root entity has not been created yet")]
    RootNotYetCreated,

    #[error("parent entity not found: {0}")]
    ParentNotFound(ObjectId),

    #[error("the root entity cannot be deleted")]
    CannotDeleteRoot,

    /// An entity still has children, devices or venues, or a shared
    /// resource is still referenced.
    #[error("{0} is still in use")]
    StillInUse(ObjectId),

    /// A unique key was already taken.
    #[error("duplicate record in {table}: {detail}")]
    Duplicate { table: String, detail: String },

    /// A lookup named a field the table does not declare.
    #[error("table {table} has no field '{field}'")]
    UnknownField { table: String, field: String },

    #[error("no store registered for prefix '{0}'")]
    UnknownPrefix(String),

    #[error("invalid relation command: {0}")]
    InvalidRelationCommand(String),

    /// Client document failed validation.
    #[error(transparent)]
    Validation(#[from] ModelError),

    #[error("unacceptable device type '{0}'")]
    UnacceptableDeviceType(String),

    /// A `prefix:uuid` reference names a store whose row does not exist.
    #[error("unknown reference {prefix}:{id}")]
    UnknownReference { prefix: String, id: String },

    /// A stored row could not be converted back into an object.
    #[error("corrupt record in {table}: {source}")]
    CorruptRecord {
        table: String,
        #[source]
        source: RowError,
    },

    /// A table's schema declaration is inconsistent.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The database handle cannot be used (poisoned lock, closed file).
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StorageError {
    pub fn not_found(table: &str, key: impl fmt::Display) -> Self {
        StorageError::NotFound {
            table: table.to_string(),
            key: key.to_string(),
        }
    }

    pub fn unknown_reference(prefix: &str, id: impl fmt::Display) -> Self {
        StorageError::UnknownReference {
            prefix: prefix.to_string(),
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::NotFound { .. } => ErrorKind::NotFound,
            StorageError::RootAlreadyExists
            | StorageError::CannotDeleteRoot
            | StorageError::StillInUse(_)
            | StorageError::Duplicate { .. } => ErrorKind::Conflict,
            StorageError::RootNotYetCreated
            | StorageError::ParentNotFound(_)
            | StorageError::UnknownField { .. }
            | StorageError::UnknownPrefix(_)
            | StorageError::InvalidRelationCommand(_)
            | StorageError::Validation(_)
            | StorageError::UnacceptableDeviceType(_) => ErrorKind::InvalidInput,
            StorageError::UnknownReference { .. } => ErrorKind::UnknownReference,
            StorageError::CorruptRecord { .. } | StorageError::Schema(_) => {
                ErrorKind::CorruptRecord
            }
            StorageError::StorageUnavailable(_) | StorageError::Database(_) => {
                ErrorKind::StorageUnavailable
            }
        }
    }

    /// Stable machine-readable code. Validation errors report the model's code.
    pub fn code(&self) -> &'static str {
        match self {
            StorageError::NotFound { .. } => "NotFound",
            StorageError::RootAlreadyExists => "RootAlreadyExists",
            StorageError::RootNotYetCreated => "RootNotYetCreated",
            StorageError::ParentNotFound(_) => "ParentNotFound",
            StorageError::CannotDeleteRoot => "CannotDeleteRoot",
            StorageError::StillInUse(_) => "StillInUse",
            StorageError::Duplicate { .. } => "Duplicate",
            StorageError::UnknownField { .. } => "UnknownField",
            StorageError::UnknownPrefix(_) => "UnknownPrefix",
            StorageError::InvalidRelationCommand(_) => "InvalidCommand",
            StorageError::Validation(e) => e.code(),
            StorageError::UnacceptableDeviceType(_) => "UnacceptableDeviceType",
            StorageError::UnknownReference { .. } => "UnknownReference",
            StorageError::CorruptRecord { .. } => "CorruptRecord",
            StorageError::Schema(_) => "SchemaError",
            StorageError::StorageUnavailable(_) => "StorageUnavailable",
            StorageError::Database(_) => "DatabaseError",
        }
    }
}
