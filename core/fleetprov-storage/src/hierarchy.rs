//! The single-rooted entity tree.
//!
//! [`EntityHierarchy`] owns every mutation that touches more than one row on
//! behalf of an entity: parent/child links, back-references on the
//! configuration, policy, contacts and locations it points at, and the
//! delete guard. Each operation runs in one transaction.

use crate::in_use::CrossReferences;
use crate::{Database, StorageError, StorageResult, Table};
use fleetprov_model::{
    DomainObject, Entity, NoteInfo, RelationCommand, RelationKind, RelationVerb, PRIMARY_KEY,
};
use fleetprov_types::{now, ObjectId, Reference, ROOT_ENTITY_ID};
use rusqlite::Connection;
use tracing::{debug, info, warn};

/// Name given to a root created without one.
pub const DEFAULT_ROOT_NAME: &str = "Root";

/// The single-valued links of an entity that can be reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReassignField {
    DeviceConfiguration,
    ManagementPolicy,
}

impl ReassignField {
    pub const ALL: [ReassignField; 2] = [Self::DeviceConfiguration, Self::ManagementPolicy];

    /// Store prefix of the link's target.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::DeviceConfiguration => "cfg",
            Self::ManagementPolicy => "pol",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeviceConfiguration => "deviceConfiguration",
            Self::ManagementPolicy => "managementPolicy",
        }
    }

    pub fn get(&self, entity: &Entity) -> Option<ObjectId> {
        match self {
            Self::DeviceConfiguration => entity.device_configuration,
            Self::ManagementPolicy => entity.management_policy,
        }
    }

    fn slot<'a>(&self, entity: &'a mut Entity) -> &'a mut Option<ObjectId> {
        match self {
            Self::DeviceConfiguration => &mut entity.device_configuration,
            Self::ManagementPolicy => &mut entity.management_policy,
        }
    }
}

/// A partial update of an entity, as sent by a PUT.
///
/// `None` leaves a field alone. For the two links, `Some(None)` unsets the
/// link and `Some(Some(id))` points it at `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub rrm: Option<String>,
    pub notes: Vec<NoteInfo>,
    pub device_configuration: Option<Option<ObjectId>>,
    pub management_policy: Option<Option<ObjectId>>,
    pub commands: Vec<RelationCommand>,
}

impl EntityUpdate {
    fn reassignments(&self) -> impl Iterator<Item = (ReassignField, Option<ObjectId>)> + '_ {
        [
            (ReassignField::DeviceConfiguration, self.device_configuration),
            (ReassignField::ManagementPolicy, self.management_policy),
        ]
        .into_iter()
        .filter_map(|(field, change)| change.map(|target| (field, target)))
    }
}

#[derive(Clone)]
pub struct EntityHierarchy {
    db: Database,
    entities: Table<Entity>,
    refs: CrossReferences,
}

impl EntityHierarchy {
    pub fn new(entities: Table<Entity>, refs: CrossReferences) -> Self {
        Self {
            db: entities.database().clone(),
            entities,
            refs,
        }
    }

    pub fn entities(&self) -> &Table<Entity> {
        &self.entities
    }

    fn source_prefix(&self) -> &str {
        self.entities.prefix()
    }

    fn root_exists_in(&self, conn: &Connection) -> StorageResult<bool> {
        self.entities
            .exists_in(conn, PRIMARY_KEY, &ROOT_ENTITY_ID.to_string())
    }

    fn require_target_in(&self, conn: &Connection, prefix: &str, id: ObjectId) -> StorageResult<()> {
        if self.refs.exists_in(conn, prefix, id)? {
            Ok(())
        } else {
            Err(StorageError::unknown_reference(prefix, id))
        }
    }

    fn check_links_in(&self, conn: &Connection, entity: &Entity) -> StorageResult<()> {
        for field in ReassignField::ALL {
            if let Some(target) = field.get(entity) {
                self.require_target_in(conn, field.prefix(), target)?;
            }
        }
        Ok(())
    }

    fn link_in(&self, conn: &Connection, entity: &Entity) -> StorageResult<()> {
        for field in ReassignField::ALL {
            if let Some(target) = field.get(entity) {
                self.refs.add_back_reference_in(
                    conn,
                    field.prefix(),
                    target,
                    self.source_prefix(),
                    entity.id(),
                )?;
            }
        }
        Ok(())
    }

    fn unlink_in(&self, conn: &Connection, prefix: &str, target: ObjectId, source: ObjectId) -> StorageResult<()> {
        if !self
            .refs
            .remove_back_reference_in(conn, prefix, target, self.source_prefix(), source)?
        {
            warn!(%source, target = %Reference::new(prefix, target), "skipping dangling reference");
        }
        Ok(())
    }

    // ── Creation ─────────────────────────────────────────────────

    /// Creates the root entity. Fails if one already exists.
    pub fn create_root(&self, entity: Entity) -> StorageResult<Entity> {
        self.db.transaction(|conn| {
            if self.root_exists_in(conn)? {
                return Err(StorageError::RootAlreadyExists);
            }
            self.check_links_in(conn, &entity)?;

            let mut root = entity;
            let ts = now();
            root.clear_relations();
            root.info.id = ROOT_ENTITY_ID;
            root.info.created = ts;
            root.info.modified = ts;
            root.parent = None;
            if root.info.name.is_empty() {
                root.info.name = DEFAULT_ROOT_NAME.to_string();
            }

            self.entities.create_in(conn, &root)?;
            self.link_in(conn, &root)?;
            info!(name = %root.info.name, "created root entity");
            Ok(root)
        })
    }

    /// Creates `entity` under `parent_id` with a fresh id.
    pub fn create_child(&self, parent_id: ObjectId, entity: Entity) -> StorageResult<Entity> {
        self.db.transaction(|conn| {
            if !self.root_exists_in(conn)? {
                return Err(StorageError::RootNotYetCreated);
            }
            let mut parent = self
                .entities
                .get_by_id_in(conn, parent_id)?
                .ok_or(StorageError::ParentNotFound(parent_id))?;
            self.check_links_in(conn, &entity)?;

            let mut child = entity;
            child.clear_relations();
            child.info.stamp_new();
            child.parent = Some(parent_id);
            self.entities.create_in(conn, &child)?;

            parent.children.insert(child.id());
            parent.info.touch();
            self.entities.rewrite_in(conn, &parent)?;

            self.link_in(conn, &child)?;
            debug!(id = %child.id(), parent = %parent_id, "created entity");
            Ok(child)
        })
    }

    // ── Deletion ─────────────────────────────────────────────────

    /// Deletes a leaf entity and every back-reference it holds.
    pub fn delete(&self, id: ObjectId) -> StorageResult<()> {
        self.db.transaction(|conn| {
            let entity = self.entities.require_in(conn, id)?;
            if id.is_root() {
                return Err(StorageError::CannotDeleteRoot);
            }
            if entity.has_dependents() {
                return Err(StorageError::StillInUse(id));
            }

            for field in ReassignField::ALL {
                if let Some(target) = field.get(&entity) {
                    self.unlink_in(conn, field.prefix(), target, id)?;
                }
            }
            for location in &entity.locations {
                self.unlink_in(conn, RelationKind::Location.prefix(), *location, id)?;
            }
            for contact in &entity.contacts {
                self.unlink_in(conn, RelationKind::Contact.prefix(), *contact, id)?;
            }

            self.entities.delete_in(conn, PRIMARY_KEY, &id.to_string())?;

            if let Some(parent_id) = entity.parent {
                match self.entities.get_by_id_in(conn, parent_id)? {
                    Some(mut parent) => {
                        parent.children.remove(&id);
                        parent.info.touch();
                        self.entities.rewrite_in(conn, &parent)?;
                    }
                    None => warn!(%id, parent = %parent_id, "parent of deleted entity is missing"),
                }
            }
            debug!(%id, "deleted entity");
            Ok(())
        })
    }

    // ── Links and relations ──────────────────────────────────────

    /// Points `field` at `target`, or unsets it when `target` is `None`.
    pub fn reassign(
        &self,
        id: ObjectId,
        field: ReassignField,
        target: Option<ObjectId>,
    ) -> StorageResult<Entity> {
        self.db.transaction(|conn| {
            let mut entity = self.entities.require_in(conn, id)?;
            if self.reassign_in(conn, &mut entity, field, target)? {
                entity.info.touch();
                self.entities.rewrite_in(conn, &entity)?;
            }
            Ok(entity)
        })
    }

    fn reassign_in(
        &self,
        conn: &Connection,
        entity: &mut Entity,
        field: ReassignField,
        target: Option<ObjectId>,
    ) -> StorageResult<bool> {
        let current = field.get(entity);
        if current == target {
            return Ok(false);
        }
        if let Some(new) = target {
            self.require_target_in(conn, field.prefix(), new)?;
        }
        let id = entity.id();
        if let Some(old) = current {
            self.unlink_in(conn, field.prefix(), old, id)?;
        }
        if let Some(new) = target {
            self.refs
                .add_back_reference_in(conn, field.prefix(), new, self.source_prefix(), id)?;
        }
        *field.slot(entity) = target;
        debug!(%id, field = field.as_str(), "reassigned entity link");
        Ok(true)
    }

    /// Adds or removes one contact or location, keeping the target's in-use
    /// set in step. A missing target is `NotFound`.
    pub fn apply_relation_command(
        &self,
        id: ObjectId,
        command: RelationCommand,
    ) -> StorageResult<Entity> {
        self.db.transaction(|conn| {
            let mut entity = self.entities.require_in(conn, id)?;
            if self.apply_command_in(conn, &mut entity, command)? {
                entity.info.touch();
                self.entities.rewrite_in(conn, &entity)?;
            }
            Ok(entity)
        })
    }

    fn apply_command_in(
        &self,
        conn: &Connection,
        entity: &mut Entity,
        command: RelationCommand,
    ) -> StorageResult<bool> {
        let id = entity.id();
        let prefix = command.kind.prefix();
        let relations = match command.kind {
            RelationKind::Contact => &mut entity.contacts,
            RelationKind::Location => &mut entity.locations,
        };
        match command.verb {
            RelationVerb::Add => {
                if relations.contains(&command.target) {
                    return Ok(false);
                }
                self.refs.add_back_reference_in(
                    conn,
                    prefix,
                    command.target,
                    self.source_prefix(),
                    id,
                )?;
                relations.insert(command.target);
            }
            RelationVerb::Del => {
                if !relations.remove(&command.target) {
                    return Ok(false);
                }
                self.unlink_in(conn, prefix, command.target, id)?;
            }
        }
        debug!(%id, %command, "applied relation command");
        Ok(true)
    }

    /// Applies a PUT: field merges, notes, relation commands and link
    /// reassignments. Every referenced target is checked before anything is
    /// written.
    pub fn update(&self, id: ObjectId, update: EntityUpdate) -> StorageResult<Entity> {
        self.db.transaction(|conn| {
            let mut entity = self.entities.require_in(conn, id)?;

            for (field, target) in update.reassignments() {
                if let Some(target) = target {
                    self.require_target_in(conn, field.prefix(), target)?;
                }
            }
            for command in &update.commands {
                let conflicting = update.commands.iter().any(|other| {
                    other.kind == command.kind
                        && other.target == command.target
                        && other.verb != command.verb
                });
                if conflicting {
                    return Err(StorageError::InvalidRelationCommand(format!(
                        "{command} conflicts with another command for the same target"
                    )));
                }
                if command.verb == RelationVerb::Add {
                    self.require_target_in(conn, command.kind.prefix(), command.target)?;
                }
            }

            let reassignments: Vec<_> = update.reassignments().collect();
            if let Some(name) = update.name {
                entity.info.name = name;
            }
            if let Some(description) = update.description {
                entity.info.description = description;
            }
            if let Some(rrm) = update.rrm {
                entity.rrm = rrm;
            }
            entity.info.prepend_notes(update.notes);

            for command in update.commands {
                self.apply_command_in(conn, &mut entity, command)?;
            }
            for (field, target) in reassignments {
                self.reassign_in(conn, &mut entity, field, target)?;
            }

            entity.info.touch();
            self.entities.rewrite_in(conn, &entity)?;
            Ok(entity)
        })
    }

    // ── Reads ────────────────────────────────────────────────────

    pub fn get(&self, id: ObjectId) -> StorageResult<Option<Entity>> {
        self.entities.get_by_id(id)
    }

    pub fn root(&self) -> StorageResult<Option<Entity>> {
        self.entities.get_by_id(ROOT_ENTITY_ID)
    }

    pub fn root_exists(&self) -> StorageResult<bool> {
        self.db.with_conn(|conn| self.root_exists_in(conn))
    }

    /// Direct children of `id`. Children whose rows are gone are skipped.
    pub fn children_of(&self, id: ObjectId) -> StorageResult<Vec<Entity>> {
        self.db.with_conn(|conn| {
            let entity = self.entities.require_in(conn, id)?;
            let mut children = Vec::with_capacity(entity.children.len());
            for child_id in &entity.children {
                match self.entities.get_by_id_in(conn, *child_id)? {
                    Some(child) => children.push(child),
                    None => warn!(%id, child = %child_id, "child entity is missing"),
                }
            }
            Ok(children)
        })
    }
}
