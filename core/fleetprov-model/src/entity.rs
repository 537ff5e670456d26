use crate::object::domain_object;
use crate::ObjectInfo;
use fleetprov_types::serde_helpers::optional_id;
use fleetprov_types::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A node in the single-rooted provisioning tree.
///
/// `parent` is `None` only for the root. `children` mirrors the `parent`
/// links of other entities; the storage layer keeps both sides in step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Entity {
    #[serde(flatten)]
    pub info: ObjectInfo,
    #[serde(with = "optional_id")]
    pub parent: Option<ObjectId>,
    pub children: BTreeSet<ObjectId>,
    pub venues: BTreeSet<ObjectId>,
    pub devices: BTreeSet<ObjectId>,
    pub contacts: BTreeSet<ObjectId>,
    pub locations: BTreeSet<ObjectId>,
    #[serde(with = "optional_id")]
    pub device_configuration: Option<ObjectId>,
    #[serde(with = "optional_id")]
    pub management_policy: Option<ObjectId>,
    pub rrm: String,
}

domain_object!(Entity);

impl Entity {
    pub fn is_root(&self) -> bool {
        self.parent.is_none() && self.info.id.is_root()
    }

    /// True when something still hangs off this entity and it must not be
    /// deleted.
    pub fn has_dependents(&self) -> bool {
        !self.children.is_empty() || !self.devices.is_empty() || !self.venues.is_empty()
    }

    /// Drops every relation a client is not allowed to set on create.
    pub fn clear_relations(&mut self) {
        self.children.clear();
        self.venues.clear();
        self.devices.clear();
        self.contacts.clear();
        self.locations.clear();
    }
}
