//! Domain model for the fleet provisioning store.
//!
//! Defines the types every storage and API layer depends on:
//! - [`TableSchema`]: declares a table's columns, indexes and reference prefix
//! - [`Row`] / [`Value`]: the flat, name-keyed storage shape of an object
//! - [`Entity`]: a node of the single-rooted provisioning tree
//! - shared resources ([`ManagementPolicy`], [`DeviceConfiguration`], [`Location`],
//!   [`Contact`], [`InventoryTag`], [`ManagementRole`], [`RadiusEndpoint`]) that
//!   track their referrers in an `inUse` set
//! - [`Map`]: a saved map view, stored but never referenced
//! - [`RelationCommand`]: typed `add=con:<uuid>` entity update commands

mod command;
mod entity;
mod error;
mod object;
mod radius;
mod resources;
mod row;
mod schema;

pub use command::{RelationCommand, RelationKind, RelationVerb};
pub use entity::Entity;
pub use error::{ModelError, ModelResult};
pub use object::{DomainObject, NoteInfo, ObjectInfo, SharedResource};
pub use radius::{
    PoolStrategy, RadiusEndpoint, RadiusEndpointDocument, RadiusEndpointType, RadiusServer,
    RadsecServer,
};
pub use resources::{
    Contact, DeviceConfiguration, DeviceConfigurationElement, InventoryTag, Location,
    Map, ManagementPolicy, ManagementPolicyEntry, ManagementRole, Venue,
};
pub use row::{Row, RowError, Value};
pub use schema::{
    Field, FieldType, IndexEntry, IndexOrder, IndexSpec, SchemaError, TableSchema, PRIMARY_KEY,
};
