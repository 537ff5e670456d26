use fleetprov_types::{now, ObjectId, Reference, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// The descriptive block every stored object carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectInfo {
    #[serde(deserialize_with = "id_or_new")]
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub notes: Vec<NoteInfo>,
    pub created: Timestamp,
    pub modified: Timestamp,
}

/// A free-text annotation, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoteInfo {
    pub created: Timestamp,
    pub created_by: String,
    pub note: String,
}

impl NoteInfo {
    pub fn new(note: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self {
            created: now(),
            created_by: created_by.into(),
            note: note.into(),
        }
    }
}

impl ObjectInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Assigns a fresh id and stamps `created`/`modified`.
    pub fn stamp_new(&mut self) {
        let ts = now();
        self.id = ObjectId::new();
        self.created = ts;
        self.modified = ts;
    }

    /// Marks the object as modified now.
    pub fn touch(&mut self) {
        self.modified = now();
    }

    /// Inserts `notes` ahead of the existing ones, preserving their order.
    pub fn prepend_notes(&mut self, notes: impl IntoIterator<Item = NoteInfo>) {
        let mut merged: Vec<NoteInfo> = notes.into_iter().collect();
        merged.append(&mut self.notes);
        self.notes = merged;
    }
}

/// Ids omitted or sent as `""` by clients get a fresh value; the store
/// overwrites it on create anyway.
fn id_or_new<'de, D>(deserializer: D) -> Result<ObjectId, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(ObjectId::new()),
        Some(s) => ObjectId::parse(s).map_err(serde::de::Error::custom),
    }
}

/// Anything stored with an [`ObjectInfo`] block.
pub trait DomainObject {
    fn info(&self) -> &ObjectInfo;
    fn info_mut(&mut self) -> &mut ObjectInfo;

    fn id(&self) -> ObjectId {
        self.info().id
    }
}

/// A reusable object that tracks who points at it.
pub trait SharedResource: DomainObject {
    fn in_use(&self) -> &BTreeSet<Reference>;
    fn in_use_mut(&mut self) -> &mut BTreeSet<Reference>;
}

macro_rules! domain_object {
    ($ty:ty) => {
        impl $crate::DomainObject for $ty {
            fn info(&self) -> &$crate::ObjectInfo {
                &self.info
            }

            fn info_mut(&mut self) -> &mut $crate::ObjectInfo {
                &mut self.info
            }
        }
    };
    ($ty:ty, shared) => {
        domain_object!($ty);

        impl $crate::SharedResource for $ty {
            fn in_use(&self) -> &std::collections::BTreeSet<fleetprov_types::Reference> {
                &self.in_use
            }

            fn in_use_mut(&mut self) -> &mut std::collections::BTreeSet<fleetprov_types::Reference> {
                &mut self.in_use
            }
        }
    };
}

pub(crate) use domain_object;
