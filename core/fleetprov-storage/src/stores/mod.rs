//! Typed stores: one [`Record`](crate::Record) implementation and one
//! [`Table`] per stored kind.

mod configuration;
mod contact;
mod entity;
mod inventory;
mod location;
mod map;
mod policy;
mod radius;
mod role;
mod venue;

use crate::in_use::CrossReferences;
use crate::validator::{ReferenceValidator, ReferenceValidatorBuilder};
use crate::{Database, StorageResult, Table};
use fleetprov_model::{
    Contact, DeviceConfiguration, Entity, InventoryTag, Location, ManagementPolicy,
    ManagementRole, Map, RadiusEndpoint, Venue,
};
use std::sync::Arc;

/// Every table of the provisioning store, sharing one database handle.
#[derive(Clone)]
pub struct Stores {
    pub entities: Table<Entity>,
    pub policies: Table<ManagementPolicy>,
    pub venues: Table<Venue>,
    pub locations: Table<Location>,
    pub contacts: Table<Contact>,
    pub inventory: Table<InventoryTag>,
    pub roles: Table<ManagementRole>,
    pub configurations: Table<DeviceConfiguration>,
    pub radius_endpoints: Table<RadiusEndpoint>,
    pub maps: Table<Map>,
}

impl Stores {
    /// Registers every table on `db`. Nothing is created yet.
    pub fn new(db: &Database) -> StorageResult<Self> {
        Ok(Self {
            entities: Table::new(db.clone())?,
            policies: Table::new(db.clone())?,
            venues: Table::new(db.clone())?,
            locations: Table::new(db.clone())?,
            contacts: Table::new(db.clone())?,
            inventory: Table::new(db.clone())?,
            roles: Table::new(db.clone())?,
            configurations: Table::new(db.clone())?,
            radius_endpoints: Table::new(db.clone())?,
            maps: Table::new(db.clone())?,
        })
    }

    /// Creates every table and index that does not exist yet.
    pub fn create_tables(&self, db: &Database) -> StorageResult<()> {
        db.transaction(|conn| {
            self.entities.create_table_in(conn)?;
            self.policies.create_table_in(conn)?;
            self.venues.create_table_in(conn)?;
            self.locations.create_table_in(conn)?;
            self.contacts.create_table_in(conn)?;
            self.inventory.create_table_in(conn)?;
            self.roles.create_table_in(conn)?;
            self.configurations.create_table_in(conn)?;
            self.radius_endpoints.create_table_in(conn)?;
            self.maps.create_table_in(conn)?;
            Ok(())
        })
    }

    /// A validator that knows every table, keyed by its declared prefix.
    pub fn reference_validator(&self) -> ReferenceValidator {
        fn register<T: crate::Record>(
            builder: ReferenceValidatorBuilder,
            table: &Table<T>,
        ) -> ReferenceValidatorBuilder {
            builder.register(table.prefix(), Arc::new(table.clone()))
        }

        let mut builder = ReferenceValidator::builder();
        builder = register(builder, &self.entities);
        builder = register(builder, &self.policies);
        builder = register(builder, &self.venues);
        builder = register(builder, &self.locations);
        builder = register(builder, &self.contacts);
        builder = register(builder, &self.inventory);
        builder = register(builder, &self.roles);
        builder = register(builder, &self.configurations);
        builder = register(builder, &self.radius_endpoints);
        builder = register(builder, &self.maps);
        builder.build()
    }

    /// Back-reference registry over every shared-resource table.
    pub fn cross_references(&self, db: &Database) -> CrossReferences {
        CrossReferences::builder(db.clone())
            .track(self.policies.clone())
            .track(self.locations.clone())
            .track(self.contacts.clone())
            .track(self.inventory.clone())
            .track(self.roles.clone())
            .track(self.configurations.clone())
            .track(self.radius_endpoints.clone())
            .build()
    }
}
