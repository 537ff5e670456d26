//! SQLite storage layer for the fleet provisioning store.
//!
//! # Architecture
//!
//! - [`Table<T>`] maps one [`Record`] kind onto one table, driven by the
//!   kind's `TableSchema`
//! - [`Stores`] holds a table per kind, all sharing one [`Database`] handle
//! - [`EntityHierarchy`] keeps the entity tree single-rooted and maintains
//!   back-references for everything an entity points at
//! - [`CrossReferences`] edits `inUse` sets by store prefix
//! - [`ReferenceValidator`] checks `prefix:uuid` tokens against the tables
//! - [`StorageService`] wires it all together and runs the device-type
//!   refresher
//!
//! Multi-row operations run inside one SQLite transaction, so a failed step
//! leaves nothing behind.

pub mod config;
mod database;
pub mod device_types;
mod error;
mod hierarchy;
mod in_use;
mod service;
mod stores;
mod table;
mod validator;

pub use config::{DatabaseConfig, FirmwareServiceConfig, StorageConfig};
pub use database::Database;
pub use device_types::{
    DeviceTypeCache, DeviceTypeRefresher, FirmwareClient, FirmwareError, RefreshIntervals,
};
pub use error::{ErrorKind, StorageError, StorageResult};
pub use hierarchy::{EntityHierarchy, EntityUpdate, ReassignField, DEFAULT_ROOT_NAME};
pub use in_use::{CrossReferences, CrossReferencesBuilder, InUseTracker};
pub use service::{StorageService, ROOT_DESCRIPTION};
pub use stores::Stores;
pub use table::{read_info, write_info, Record, Table};
pub use validator::{
    InUseExpansion, ReferenceInfo, ReferenceTarget, ReferenceValidator, ReferenceValidatorBuilder,
};
