//! Back-reference ("in use") tracking on shared resources.
//!
//! Every shared resource row carries an `inUse` set naming the objects that
//! point at it. The typed methods on [`Table`] edit that set for one kind;
//! [`CrossReferences`] dispatches the same edits by store prefix so callers
//! holding only a `prefix:uuid` pair can maintain it.
//!
//! Edits are idempotent. Adding to a missing target is `NotFound`, while
//! removing from one reports `false` so cleanup can walk past dangling ids.
//! Nothing here checks that the referencing object exists.

use crate::table::Record;
use crate::{Database, StorageError, StorageResult, Table};
use fleetprov_model::SharedResource;
use fleetprov_types::{ObjectId, Reference};
use rusqlite::Connection;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

impl<T: Record + SharedResource> Table<T> {
    pub fn add_in_use(&self, id: ObjectId, reference: &Reference) -> StorageResult<()> {
        self.database()
            .with_conn(|conn| self.add_in_use_in(conn, id, reference))
    }

    pub fn add_in_use_in(
        &self,
        conn: &Connection,
        id: ObjectId,
        reference: &Reference,
    ) -> StorageResult<()> {
        let mut record = self.require_in(conn, id)?;
        if record.in_use_mut().insert(reference.clone()) {
            self.rewrite_in(conn, &record)?;
            debug!(table = %self.name(), %id, %reference, "added back-reference");
        }
        Ok(())
    }

    /// Returns `false` only when the target row does not exist.
    pub fn remove_in_use(&self, id: ObjectId, reference: &Reference) -> StorageResult<bool> {
        self.database()
            .with_conn(|conn| self.remove_in_use_in(conn, id, reference))
    }

    pub fn remove_in_use_in(
        &self,
        conn: &Connection,
        id: ObjectId,
        reference: &Reference,
    ) -> StorageResult<bool> {
        let Some(mut record) = self.get_by_id_in(conn, id)? else {
            return Ok(false);
        };
        if record.in_use_mut().remove(reference) {
            self.rewrite_in(conn, &record)?;
            debug!(table = %self.name(), %id, %reference, "removed back-reference");
        }
        Ok(true)
    }

    /// The target's current in-use set, or `None` if it does not exist.
    pub fn in_use_of(&self, id: ObjectId) -> StorageResult<Option<BTreeSet<Reference>>> {
        Ok(self.get_by_id(id)?.map(|r| r.in_use().clone()))
    }

    /// Stores `record` as a new object. Clients never get to seed `inUse`.
    pub fn create_shared(&self, mut record: T) -> StorageResult<T> {
        record.info_mut().stamp_new();
        record.in_use_mut().clear();
        self.create(&record)?;
        Ok(record)
    }

    /// Deletes `id` unless something still references it.
    pub fn delete_shared(&self, id: ObjectId) -> StorageResult<()> {
        self.database().transaction(|conn| {
            let existing = self.require_in(conn, id)?;
            if !existing.in_use().is_empty() {
                return Err(StorageError::StillInUse(id));
            }
            self.delete_in(conn, fleetprov_model::PRIMARY_KEY, &id.to_string())?;
            debug!(table = %self.name(), %id, "deleted shared resource");
            Ok(())
        })
    }

    /// Replaces the client-editable content of `id` with `record`.
    ///
    /// The stored id, creation time and in-use set are kept. New notes are
    /// placed ahead of the stored ones.
    pub fn replace_shared(&self, id: ObjectId, mut record: T) -> StorageResult<T> {
        self.database().transaction(|conn| {
            let existing = self.require_in(conn, id)?;
            let incoming_notes = std::mem::take(&mut record.info_mut().notes);
            {
                let info = record.info_mut();
                info.id = id;
                info.created = existing.info().created;
                info.notes = existing.info().notes.clone();
                info.prepend_notes(incoming_notes);
                info.touch();
            }
            *record.in_use_mut() = existing.in_use().clone();
            self.rewrite_in(conn, &record)?;
            Ok(record)
        })
    }
}

/// Prefix-addressed view of a shared-resource table.
pub trait InUseTracker: Send + Sync {
    fn contains_in(&self, conn: &Connection, id: ObjectId) -> StorageResult<bool>;
    fn add_reference_in(
        &self,
        conn: &Connection,
        id: ObjectId,
        reference: &Reference,
    ) -> StorageResult<()>;
    fn remove_reference_in(
        &self,
        conn: &Connection,
        id: ObjectId,
        reference: &Reference,
    ) -> StorageResult<bool>;
    fn references_in(
        &self,
        conn: &Connection,
        id: ObjectId,
    ) -> StorageResult<Option<BTreeSet<Reference>>>;
}

impl<T: Record + SharedResource> InUseTracker for Table<T> {
    fn contains_in(&self, conn: &Connection, id: ObjectId) -> StorageResult<bool> {
        self.exists_in(conn, fleetprov_model::PRIMARY_KEY, &id.to_string())
    }

    fn add_reference_in(
        &self,
        conn: &Connection,
        id: ObjectId,
        reference: &Reference,
    ) -> StorageResult<()> {
        self.add_in_use_in(conn, id, reference)
    }

    fn remove_reference_in(
        &self,
        conn: &Connection,
        id: ObjectId,
        reference: &Reference,
    ) -> StorageResult<bool> {
        self.remove_in_use_in(conn, id, reference)
    }

    fn references_in(
        &self,
        conn: &Connection,
        id: ObjectId,
    ) -> StorageResult<Option<BTreeSet<Reference>>> {
        Ok(self.get_by_id_in(conn, id)?.map(|r| r.in_use().clone()))
    }
}

/// Registry of shared-resource tables keyed by store prefix.
#[derive(Clone)]
pub struct CrossReferences {
    db: Database,
    trackers: Arc<HashMap<String, Arc<dyn InUseTracker>>>,
}

pub struct CrossReferencesBuilder {
    db: Database,
    trackers: HashMap<String, Arc<dyn InUseTracker>>,
}

impl CrossReferencesBuilder {
    /// Tracks `table` under its declared prefix.
    pub fn track<T: Record + SharedResource>(mut self, table: Table<T>) -> Self {
        let prefix = table.prefix().to_string();
        self.trackers.insert(prefix, Arc::new(table));
        self
    }

    pub fn build(self) -> CrossReferences {
        CrossReferences {
            db: self.db,
            trackers: Arc::new(self.trackers),
        }
    }
}

impl CrossReferences {
    pub fn builder(db: Database) -> CrossReferencesBuilder {
        CrossReferencesBuilder {
            db,
            trackers: HashMap::new(),
        }
    }

    pub fn is_tracked(&self, prefix: &str) -> bool {
        self.trackers.contains_key(prefix)
    }

    fn tracker(&self, prefix: &str) -> StorageResult<&Arc<dyn InUseTracker>> {
        self.trackers
            .get(prefix)
            .ok_or_else(|| StorageError::UnknownPrefix(prefix.to_string()))
    }

    pub fn exists_in(&self, conn: &Connection, prefix: &str, id: ObjectId) -> StorageResult<bool> {
        self.tracker(prefix)?.contains_in(conn, id)
    }

    /// Records that `source_prefix:source_id` uses `store_prefix:target_id`.
    pub fn add_back_reference(
        &self,
        store_prefix: &str,
        target_id: ObjectId,
        source_prefix: &str,
        source_id: ObjectId,
    ) -> StorageResult<()> {
        self.db.with_conn(|conn| {
            self.add_back_reference_in(conn, store_prefix, target_id, source_prefix, source_id)
        })
    }

    pub fn add_back_reference_in(
        &self,
        conn: &Connection,
        store_prefix: &str,
        target_id: ObjectId,
        source_prefix: &str,
        source_id: ObjectId,
    ) -> StorageResult<()> {
        let reference = Reference::new(source_prefix, source_id);
        self.tracker(store_prefix)?
            .add_reference_in(conn, target_id, &reference)
    }

    /// Returns `false` when the target does not exist.
    pub fn remove_back_reference(
        &self,
        store_prefix: &str,
        target_id: ObjectId,
        source_prefix: &str,
        source_id: ObjectId,
    ) -> StorageResult<bool> {
        self.db.with_conn(|conn| {
            self.remove_back_reference_in(conn, store_prefix, target_id, source_prefix, source_id)
        })
    }

    pub fn remove_back_reference_in(
        &self,
        conn: &Connection,
        store_prefix: &str,
        target_id: ObjectId,
        source_prefix: &str,
        source_id: ObjectId,
    ) -> StorageResult<bool> {
        let reference = Reference::new(source_prefix, source_id);
        self.tracker(store_prefix)?
            .remove_reference_in(conn, target_id, &reference)
    }

    pub fn in_use(
        &self,
        store_prefix: &str,
        target_id: ObjectId,
    ) -> StorageResult<Option<BTreeSet<Reference>>> {
        let tracker = self.tracker(store_prefix)?;
        self.db.with_conn(|conn| tracker.references_in(conn, target_id))
    }
}
