//! Shared resources and the other catalog objects entities point at.

use crate::object::domain_object;
use crate::ObjectInfo;
use fleetprov_types::serde_helpers::optional_id;
use fleetprov_types::{ObjectId, Reference};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One access rule inside a management policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagementPolicyEntry {
    pub users: Vec<String>,
    pub resources: Vec<String>,
    pub access: Vec<String>,
    pub policy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagementPolicy {
    #[serde(flatten)]
    pub info: ObjectInfo,
    pub entries: Vec<ManagementPolicyEntry>,
    pub in_use: BTreeSet<Reference>,
    #[serde(with = "optional_id")]
    pub entity: Option<ObjectId>,
    #[serde(with = "optional_id")]
    pub venue: Option<ObjectId>,
}

domain_object!(ManagementPolicy, shared);

/// A physical site. Venues hang off entities but are not shared resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Venue {
    #[serde(flatten)]
    pub info: ObjectInfo,
    #[serde(with = "optional_id")]
    pub entity: Option<ObjectId>,
    #[serde(with = "optional_id")]
    pub parent: Option<ObjectId>,
    pub children: BTreeSet<ObjectId>,
    pub devices: BTreeSet<ObjectId>,
    #[serde(with = "optional_id")]
    pub contact: Option<ObjectId>,
    #[serde(with = "optional_id")]
    pub location: Option<ObjectId>,
    #[serde(with = "optional_id")]
    pub device_configuration: Option<ObjectId>,
    #[serde(with = "optional_id")]
    pub management_policy: Option<ObjectId>,
    pub rrm: String,
    pub topology: String,
    pub design: String,
}

domain_object!(Venue);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    #[serde(flatten)]
    pub info: ObjectInfo,
    #[serde(rename = "type")]
    pub location_type: String,
    pub building_name: String,
    pub address_lines: Vec<String>,
    pub city: String,
    pub state: String,
    pub postal: String,
    pub country: String,
    pub phones: Vec<String>,
    pub mobiles: Vec<String>,
    pub geo_code: String,
    pub in_use: BTreeSet<Reference>,
    #[serde(with = "optional_id")]
    pub entity: Option<ObjectId>,
}

domain_object!(Location, shared);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    #[serde(flatten)]
    pub info: ObjectInfo,
    #[serde(rename = "type")]
    pub contact_type: String,
    pub title: String,
    pub salutation: String,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    pub initials: String,
    pub visual: String,
    pub primary_email: String,
    pub secondary_email: String,
    pub mobiles: Vec<String>,
    pub phones: Vec<String>,
    #[serde(rename = "accessPIN")]
    pub access_pin: String,
    pub in_use: BTreeSet<Reference>,
    #[serde(with = "optional_id")]
    pub entity: Option<ObjectId>,
}

domain_object!(Contact, shared);

/// A provisioned device, keyed by serial number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryTag {
    #[serde(flatten)]
    pub info: ObjectInfo,
    pub serial_number: String,
    #[serde(with = "optional_id")]
    pub venue: Option<ObjectId>,
    #[serde(with = "optional_id")]
    pub entity: Option<ObjectId>,
    pub subscriber: String,
    pub device_type: String,
    pub qr_code: String,
    pub geo_code: String,
    #[serde(with = "optional_id")]
    pub location: Option<ObjectId>,
    #[serde(with = "optional_id")]
    pub contact: Option<ObjectId>,
    #[serde(with = "optional_id")]
    pub device_configuration: Option<ObjectId>,
    pub rrm: String,
    pub in_use: BTreeSet<Reference>,
}

domain_object!(InventoryTag, shared);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagementRole {
    #[serde(flatten)]
    pub info: ObjectInfo,
    #[serde(with = "optional_id")]
    pub management_policy: Option<ObjectId>,
    pub users: Vec<String>,
    pub in_use: BTreeSet<Reference>,
    #[serde(with = "optional_id")]
    pub entity: Option<ObjectId>,
}

domain_object!(ManagementRole, shared);

/// One named block of a device configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceConfigurationElement {
    pub name: String,
    pub description: String,
    pub weight: i64,
    pub configuration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceConfiguration {
    #[serde(flatten)]
    pub info: ObjectInfo,
    #[serde(with = "optional_id")]
    pub management_policy: Option<ObjectId>,
    pub device_types: Vec<String>,
    pub configuration: Vec<DeviceConfigurationElement>,
    pub in_use: BTreeSet<Reference>,
    pub firmware_upgrade: String,
    #[serde(rename = "firmwareRCOnly")]
    pub firmware_rc_only: bool,
}

domain_object!(DeviceConfiguration, shared);

/// A saved map view. `data` is opaque to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Map {
    #[serde(flatten)]
    pub info: ObjectInfo,
    pub data: String,
    #[serde(with = "optional_id")]
    pub entity: Option<ObjectId>,
    pub creator: String,
    pub visibility: String,
}

domain_object!(Map);
