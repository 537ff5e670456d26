use fleetprov_model::{
    Contact, DeviceConfiguration, Entity, Location, ManagementPolicy, NoteInfo, ObjectInfo,
    RelationCommand, RelationKind,
};
use fleetprov_storage::{
    Database, DatabaseConfig, EntityHierarchy, EntityUpdate, ErrorKind, ReassignField,
    StorageError, StorageService, Stores,
};
use fleetprov_types::{ObjectId, Reference, ROOT_ENTITY_ID};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::sync::Arc;

fn service() -> StorageService {
    StorageService::open(&DatabaseConfig::default()).unwrap()
}

fn entity(name: &str) -> Entity {
    Entity {
        info: ObjectInfo::named(name),
        ..Default::default()
    }
}

fn policy(svc: &StorageService, name: &str) -> ManagementPolicy {
    svc.stores()
        .policies
        .create_shared(ManagementPolicy {
            info: ObjectInfo::named(name),
            ..Default::default()
        })
        .unwrap()
}

fn contact(svc: &StorageService, name: &str) -> Contact {
    svc.stores()
        .contacts
        .create_shared(Contact {
            info: ObjectInfo::named(name),
            ..Default::default()
        })
        .unwrap()
}

fn location(svc: &StorageService, name: &str) -> Location {
    svc.stores()
        .locations
        .create_shared(Location {
            info: ObjectInfo::named(name),
            ..Default::default()
        })
        .unwrap()
}

fn ent_ref(id: ObjectId) -> Reference {
    Reference::new("ent", id)
}

fn policy_in_use(svc: &StorageService, id: ObjectId) -> BTreeSet<Reference> {
    svc.stores().policies.in_use_of(id).unwrap().unwrap()
}

// ── Root ─────────────────────────────────────────────────────────

#[test]
fn open_creates_exactly_one_root() {
    let svc = service();
    let root = svc.hierarchy().root().unwrap().unwrap();
    assert_eq!(root.info.id, ROOT_ENTITY_ID);
    assert!(root.is_root());
    assert_eq!(svc.stores().entities.count().unwrap(), 1);

    let err = svc.hierarchy().create_root(entity("another")).unwrap_err();
    assert!(matches!(err, StorageError::RootAlreadyExists));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(svc.stores().entities.count().unwrap(), 1);
}

fn bare_hierarchy() -> (Stores, EntityHierarchy) {
    let db = Database::open_in_memory().unwrap();
    let stores = Stores::new(&db).unwrap();
    stores.create_tables(&db).unwrap();
    let refs = stores.cross_references(&db);
    let hierarchy = EntityHierarchy::new(stores.entities.clone(), refs);
    (stores, hierarchy)
}

#[test]
fn child_before_root_is_rejected() {
    let (stores, hierarchy) = bare_hierarchy();
    let err = hierarchy
        .create_child(ROOT_ENTITY_ID, entity("early"))
        .unwrap_err();
    assert!(matches!(err, StorageError::RootNotYetCreated));
    assert_eq!(err.code(), "RootNotYetCreated");
    assert_eq!(stores.entities.count().unwrap(), 0);
}

#[test]
fn create_root_fills_in_defaults_and_drops_relations() {
    let (_stores, hierarchy) = bare_hierarchy();
    let mut input = entity("");
    input.info.id = ObjectId::new();
    input.children.insert(ObjectId::new());
    input.parent = Some(ObjectId::new());

    let root = hierarchy.create_root(input).unwrap();
    assert_eq!(root.info.id, ROOT_ENTITY_ID);
    assert_eq!(root.info.name, "Root");
    assert_eq!(root.parent, None);
    assert!(root.children.is_empty());
    assert!(root.info.created > 0);
    assert_eq!(hierarchy.root().unwrap(), Some(root));
}

#[test]
fn create_root_links_its_policy() {
    let (stores, hierarchy) = bare_hierarchy();
    let mut input = entity("root");
    input.management_policy = Some(ObjectId::new());
    let err = hierarchy.create_root(input.clone()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownReference);
    assert!(!hierarchy.root_exists().unwrap());

    let pol = stores
        .policies
        .create_shared(ManagementPolicy::default())
        .unwrap();
    input.management_policy = Some(pol.info.id);
    hierarchy.create_root(input).unwrap();
    assert_eq!(
        stores.policies.in_use_of(pol.info.id).unwrap().unwrap(),
        [ent_ref(ROOT_ENTITY_ID)].into_iter().collect()
    );
}

// ── Children ─────────────────────────────────────────────────────

#[test]
fn child_gets_fresh_id_and_parent_lists_it() {
    let svc = service();
    let h = svc.hierarchy();
    let mut input = entity("campus");
    let client_id = ObjectId::new();
    input.info.id = client_id;
    input.venues.insert(ObjectId::new());

    let child = h.create_child(ROOT_ENTITY_ID, input).unwrap();
    assert_ne!(child.info.id, client_id);
    assert_eq!(child.parent, Some(ROOT_ENTITY_ID));
    assert!(child.venues.is_empty());

    let root = h.root().unwrap().unwrap();
    assert_eq!(root.children, [child.info.id].into_iter().collect());
    assert_eq!(h.children_of(ROOT_ENTITY_ID).unwrap(), vec![child]);
}

#[test]
fn missing_parent_is_rejected() {
    let svc = service();
    let missing = ObjectId::new();
    let err = svc
        .hierarchy()
        .create_child(missing, entity("orphan"))
        .unwrap_err();
    assert!(matches!(err, StorageError::ParentNotFound(id) if id == missing));
    assert_eq!(svc.stores().entities.count().unwrap(), 1);
}

#[test]
fn child_with_unknown_policy_is_rejected_without_writes() {
    let svc = service();
    let mut input = entity("campus");
    input.management_policy = Some(ObjectId::new());
    let err = svc.hierarchy().create_child(ROOT_ENTITY_ID, input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownReference);
    assert_eq!(svc.stores().entities.count().unwrap(), 1);
    assert!(svc.hierarchy().root().unwrap().unwrap().children.is_empty());
}

#[test]
fn parent_and_children_stay_inverse() {
    let svc = service();
    let h = svc.hierarchy();
    let a = h.create_child(ROOT_ENTITY_ID, entity("a")).unwrap();
    let b = h.create_child(ROOT_ENTITY_ID, entity("b")).unwrap();
    let a1 = h.create_child(a.info.id, entity("a1")).unwrap();

    for e in svc.stores().entities.list(0, 100).unwrap() {
        if let Some(parent) = e.parent {
            let parent = h.get(parent).unwrap().unwrap();
            assert!(parent.children.contains(&e.info.id), "{}", e.info.name);
        }
        for child in &e.children {
            assert_eq!(h.get(*child).unwrap().unwrap().parent, Some(e.info.id));
        }
    }

    h.delete(a1.info.id).unwrap();
    assert!(h.get(a.info.id).unwrap().unwrap().children.is_empty());
    h.delete(a.info.id).unwrap();
    assert_eq!(
        h.root().unwrap().unwrap().children,
        [b.info.id].into_iter().collect()
    );
}

// ── Deletion ─────────────────────────────────────────────────────

#[test]
fn root_cannot_be_deleted() {
    let svc = service();
    let err = svc.hierarchy().delete(ROOT_ENTITY_ID).unwrap_err();
    assert!(matches!(err, StorageError::CannotDeleteRoot));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(svc.hierarchy().root_exists().unwrap());
}

#[test]
fn deleting_missing_entity_is_not_found() {
    let svc = service();
    let err = svc.hierarchy().delete(ObjectId::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn entity_with_dependents_is_not_deleted() {
    let svc = service();
    let h = svc.hierarchy();
    let parent = h.create_child(ROOT_ENTITY_ID, entity("parent")).unwrap();
    let child = h.create_child(parent.info.id, entity("child")).unwrap();

    let before = h.get(parent.info.id).unwrap();
    let err = h.delete(parent.info.id).unwrap_err();
    assert!(matches!(err, StorageError::StillInUse(id) if id == parent.info.id));
    assert_eq!(h.get(parent.info.id).unwrap(), before);
    assert!(h.get(child.info.id).unwrap().is_some());

    // A venue hanging off the entity blocks deletion too.
    let mut leaf = h.get(child.info.id).unwrap().unwrap();
    leaf.venues.insert(ObjectId::new());
    assert!(svc
        .stores()
        .entities
        .update("id", &leaf.info.id.to_string(), &leaf)
        .unwrap());
    assert!(matches!(
        h.delete(child.info.id),
        Err(StorageError::StillInUse(_))
    ));
}

#[test]
fn delete_releases_every_back_reference() {
    let svc = service();
    let h = svc.hierarchy();
    let pol = policy(&svc, "ops");
    let con = contact(&svc, "jane");
    let loc = location(&svc, "hq");

    let mut input = entity("campus");
    input.management_policy = Some(pol.info.id);
    let campus = h.create_child(ROOT_ENTITY_ID, input).unwrap();
    h.apply_relation_command(campus.info.id, RelationCommand::add(RelationKind::Contact, con.info.id))
        .unwrap();
    h.apply_relation_command(campus.info.id, RelationCommand::add(RelationKind::Location, loc.info.id))
        .unwrap();

    let used_by = [ent_ref(campus.info.id)].into_iter().collect::<BTreeSet<_>>();
    assert_eq!(policy_in_use(&svc, pol.info.id), used_by);
    assert_eq!(svc.stores().contacts.in_use_of(con.info.id).unwrap().unwrap(), used_by);
    assert_eq!(svc.stores().locations.in_use_of(loc.info.id).unwrap().unwrap(), used_by);

    h.delete(campus.info.id).unwrap();
    assert!(h.get(campus.info.id).unwrap().is_none());
    assert!(policy_in_use(&svc, pol.info.id).is_empty());
    assert!(svc.stores().contacts.in_use_of(con.info.id).unwrap().unwrap().is_empty());
    assert!(svc.stores().locations.in_use_of(loc.info.id).unwrap().unwrap().is_empty());
}

#[test]
fn delete_skips_dangling_links() {
    let svc = service();
    let h = svc.hierarchy();
    let pol = policy(&svc, "ops");
    let mut input = entity("campus");
    input.management_policy = Some(pol.info.id);
    let campus = h.create_child(ROOT_ENTITY_ID, input).unwrap();

    svc.stores().policies.delete_by_id(pol.info.id).unwrap();
    h.delete(campus.info.id).unwrap();
    assert!(h.get(campus.info.id).unwrap().is_none());
}

#[test]
fn root_child_delete_scenario() {
    let svc = service();
    let h = svc.hierarchy();
    let child = h.create_child(ROOT_ENTITY_ID, entity("site")).unwrap();
    assert_eq!(svc.stores().entities.count().unwrap(), 2);

    assert!(matches!(
        h.delete(ROOT_ENTITY_ID),
        Err(StorageError::CannotDeleteRoot)
    ));
    h.delete(child.info.id).unwrap();

    assert_eq!(svc.stores().entities.count().unwrap(), 1);
    assert!(h.root().unwrap().unwrap().children.is_empty());
    assert_eq!(h.delete(child.info.id).unwrap_err().kind(), ErrorKind::NotFound);
}

// ── Reassignment ─────────────────────────────────────────────────

#[test]
fn policy_reassignment_moves_back_reference() {
    let svc = service();
    let h = svc.hierarchy();
    let p1 = policy(&svc, "p1");
    let p2 = policy(&svc, "p2");
    let site = h.create_child(ROOT_ENTITY_ID, entity("site")).unwrap();

    let site = h
        .reassign(site.info.id, ReassignField::ManagementPolicy, Some(p1.info.id))
        .unwrap();
    assert_eq!(site.management_policy, Some(p1.info.id));
    assert_eq!(
        policy_in_use(&svc, p1.info.id),
        [ent_ref(site.info.id)].into_iter().collect()
    );

    let site = h
        .reassign(site.info.id, ReassignField::ManagementPolicy, Some(p2.info.id))
        .unwrap();
    assert_eq!(site.management_policy, Some(p2.info.id));
    assert!(policy_in_use(&svc, p1.info.id).is_empty());
    assert_eq!(
        policy_in_use(&svc, p2.info.id),
        [ent_ref(site.info.id)].into_iter().collect()
    );

    let site = h
        .reassign(site.info.id, ReassignField::ManagementPolicy, None)
        .unwrap();
    assert_eq!(site.management_policy, None);
    assert!(policy_in_use(&svc, p2.info.id).is_empty());
    assert_eq!(h.get(site.info.id).unwrap(), Some(site));
}

#[test]
fn reassigning_to_same_target_changes_nothing() {
    let svc = service();
    let h = svc.hierarchy();
    let p1 = policy(&svc, "p1");
    let site = h.create_child(ROOT_ENTITY_ID, entity("site")).unwrap();
    let first = h
        .reassign(site.info.id, ReassignField::ManagementPolicy, Some(p1.info.id))
        .unwrap();
    let second = h
        .reassign(site.info.id, ReassignField::ManagementPolicy, Some(p1.info.id))
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(policy_in_use(&svc, p1.info.id).len(), 1);
}

#[test]
fn reassigning_to_missing_target_leaves_entity_alone() {
    let svc = service();
    let h = svc.hierarchy();
    let p1 = policy(&svc, "p1");
    let mut input = entity("site");
    input.management_policy = Some(p1.info.id);
    let site = h.create_child(ROOT_ENTITY_ID, input).unwrap();

    let err = h
        .reassign(site.info.id, ReassignField::ManagementPolicy, Some(ObjectId::new()))
        .unwrap_err();
    assert!(matches!(err, StorageError::UnknownReference { ref prefix, .. } if prefix == "pol"));
    assert_eq!(h.get(site.info.id).unwrap(), Some(site.clone()));
    assert_eq!(
        policy_in_use(&svc, p1.info.id),
        [ent_ref(site.info.id)].into_iter().collect()
    );
}

#[test]
fn configuration_reassignment_tracks_configuration_in_use() {
    let svc = service();
    let h = svc.hierarchy();
    let cfg = svc
        .create_configuration(DeviceConfiguration {
            info: ObjectInfo::named("indoor"),
            ..Default::default()
        })
        .unwrap();
    let site = h.create_child(ROOT_ENTITY_ID, entity("site")).unwrap();
    h.reassign(site.info.id, ReassignField::DeviceConfiguration, Some(cfg.info.id))
        .unwrap();
    assert_eq!(
        svc.stores().configurations.in_use_of(cfg.info.id).unwrap().unwrap(),
        [ent_ref(site.info.id)].into_iter().collect()
    );
}

// ── Relation commands ────────────────────────────────────────────

#[test]
fn relation_commands_are_idempotent() {
    let svc = service();
    let h = svc.hierarchy();
    let con = contact(&svc, "jane");
    let site = h.create_child(ROOT_ENTITY_ID, entity("site")).unwrap();
    let add = RelationCommand::add(RelationKind::Contact, con.info.id);
    let del = RelationCommand::del(RelationKind::Contact, con.info.id);

    h.apply_relation_command(site.info.id, add).unwrap();
    let twice = h.apply_relation_command(site.info.id, add).unwrap();
    assert_eq!(twice.contacts, [con.info.id].into_iter().collect());
    assert_eq!(svc.stores().contacts.in_use_of(con.info.id).unwrap().unwrap().len(), 1);

    h.apply_relation_command(site.info.id, del).unwrap();
    let twice = h.apply_relation_command(site.info.id, del).unwrap();
    assert!(twice.contacts.is_empty());
    assert!(svc.stores().contacts.in_use_of(con.info.id).unwrap().unwrap().is_empty());
}

#[test]
fn relation_command_on_missing_target_is_not_found() {
    let svc = service();
    let h = svc.hierarchy();
    let site = h.create_child(ROOT_ENTITY_ID, entity("site")).unwrap();
    let err = h
        .apply_relation_command(
            site.info.id,
            RelationCommand::add(RelationKind::Location, ObjectId::new()),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(h.get(site.info.id).unwrap(), Some(site));
}

#[test]
fn relation_command_on_missing_entity_is_not_found() {
    let svc = service();
    let con = contact(&svc, "jane");
    let err = svc
        .hierarchy()
        .apply_relation_command(
            ObjectId::new(),
            RelationCommand::add(RelationKind::Contact, con.info.id),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(svc.stores().contacts.in_use_of(con.info.id).unwrap().unwrap().is_empty());
}

// ── Update ───────────────────────────────────────────────────────

#[test]
fn update_merges_fields_notes_commands_and_links() {
    let svc = service();
    let h = svc.hierarchy();
    let pol = policy(&svc, "ops");
    let con = contact(&svc, "jane");
    let loc = location(&svc, "hq");

    let mut input = entity("site");
    input.info.description = "old".into();
    input.info.notes = vec![NoteInfo::new("created", "ops")];
    let site = h.create_child(ROOT_ENTITY_ID, input).unwrap();
    h.apply_relation_command(site.info.id, RelationCommand::add(RelationKind::Location, loc.info.id))
        .unwrap();

    let updated = h
        .update(
            site.info.id,
            EntityUpdate {
                name: Some("renamed".into()),
                rrm: Some("off".into()),
                notes: vec![NoteInfo::new("moved", "ops")],
                management_policy: Some(Some(pol.info.id)),
                commands: vec![
                    RelationCommand::add(RelationKind::Contact, con.info.id),
                    RelationCommand::del(RelationKind::Location, loc.info.id),
                ],
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.info.name, "renamed");
    assert_eq!(updated.info.description, "old");
    assert_eq!(updated.rrm, "off");
    let notes: Vec<&str> = updated.info.notes.iter().map(|n| n.note.as_str()).collect();
    assert_eq!(notes, vec!["moved", "created"]);
    assert_eq!(updated.contacts, [con.info.id].into_iter().collect());
    assert!(updated.locations.is_empty());
    assert_eq!(updated.management_policy, Some(pol.info.id));
    assert_eq!(updated.info.created, site.info.created);
    assert!(updated.info.modified >= site.info.modified);
    assert_eq!(h.get(site.info.id).unwrap(), Some(updated));

    let used_by = [ent_ref(site.info.id)].into_iter().collect::<BTreeSet<_>>();
    assert_eq!(policy_in_use(&svc, pol.info.id), used_by);
    assert_eq!(svc.stores().contacts.in_use_of(con.info.id).unwrap().unwrap(), used_by);
    assert!(svc.stores().locations.in_use_of(loc.info.id).unwrap().unwrap().is_empty());
}

#[test]
fn update_with_unknown_target_writes_nothing() {
    let svc = service();
    let h = svc.hierarchy();
    let con = contact(&svc, "jane");
    let site = h.create_child(ROOT_ENTITY_ID, entity("site")).unwrap();

    let err = h
        .update(
            site.info.id,
            EntityUpdate {
                name: Some("renamed".into()),
                commands: vec![
                    RelationCommand::add(RelationKind::Contact, con.info.id),
                    RelationCommand::add(RelationKind::Location, ObjectId::new()),
                ],
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StorageError::UnknownReference { ref prefix, .. } if prefix == "loc"));
    assert_eq!(h.get(site.info.id).unwrap(), Some(site));
    assert!(svc.stores().contacts.in_use_of(con.info.id).unwrap().unwrap().is_empty());
}

#[test]
fn update_rejects_add_and_del_of_same_target() {
    let svc = service();
    let h = svc.hierarchy();
    let con = contact(&svc, "jane");
    let site = h.create_child(ROOT_ENTITY_ID, entity("site")).unwrap();

    let err = h
        .update(
            site.info.id,
            EntityUpdate {
                commands: vec![
                    RelationCommand::add(RelationKind::Contact, con.info.id),
                    RelationCommand::del(RelationKind::Contact, con.info.id),
                ],
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidRelationCommand(_)));
    assert_eq!(err.code(), "InvalidCommand");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(h.get(site.info.id).unwrap(), Some(site));
}

#[test]
fn update_can_unset_a_link() {
    let svc = service();
    let h = svc.hierarchy();
    let pol = policy(&svc, "ops");
    let mut input = entity("site");
    input.management_policy = Some(pol.info.id);
    let site = h.create_child(ROOT_ENTITY_ID, input).unwrap();

    let updated = h
        .update(
            site.info.id,
            EntityUpdate {
                management_policy: Some(None),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.management_policy, None);
    assert!(policy_in_use(&svc, pol.info.id).is_empty());
}

// ── Concurrency ──────────────────────────────────────────────────

#[test]
fn concurrent_children_are_all_recorded() {
    let svc = Arc::new(service());
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let svc = Arc::clone(&svc);
            std::thread::spawn(move || {
                (0..10)
                    .map(|i| {
                        svc.hierarchy()
                            .create_child(ROOT_ENTITY_ID, entity(&format!("e{t}-{i}")))
                            .unwrap()
                            .info
                            .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let created: BTreeSet<ObjectId> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    assert_eq!(created.len(), 80);
    assert_eq!(svc.hierarchy().root().unwrap().unwrap().children, created);
}

#[test]
fn concurrent_reassignments_keep_in_use_consistent() {
    let svc = Arc::new(service());
    let p1 = policy(&svc, "p1");
    let p2 = policy(&svc, "p2");
    let sites: Vec<ObjectId> = (0..6)
        .map(|i| {
            svc.hierarchy()
                .create_child(ROOT_ENTITY_ID, entity(&format!("s{i}")))
                .unwrap()
                .info
                .id
        })
        .collect();

    let handles: Vec<_> = sites
        .iter()
        .copied()
        .map(|site| {
            let svc = Arc::clone(&svc);
            let (p1, p2) = (p1.info.id, p2.info.id);
            std::thread::spawn(move || {
                for round in 0..10 {
                    let target = if round % 2 == 0 { p1 } else { p2 };
                    svc.hierarchy()
                        .reassign(site, ReassignField::ManagementPolicy, Some(target))
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    // Every site ends on p2 after an even number of rounds.
    let expected: BTreeSet<Reference> = sites.iter().map(|id| ent_ref(*id)).collect();
    assert!(policy_in_use(&svc, p1.info.id).is_empty());
    assert_eq!(policy_in_use(&svc, p2.info.id), expected);
}

#[test]
fn concurrent_relation_commands_on_one_entity_lose_nothing() {
    let svc = Arc::new(service());
    let site = svc
        .hierarchy()
        .create_child(ROOT_ENTITY_ID, entity("site"))
        .unwrap()
        .info
        .id;
    let kept: Vec<ObjectId> = (0..8)
        .map(|i| contact(&svc, &format!("kept{i}")).info.id)
        .collect();
    let churned: Vec<ObjectId> = (0..8)
        .map(|i| contact(&svc, &format!("churned{i}")).info.id)
        .collect();

    let handles: Vec<_> = kept
        .iter()
        .copied()
        .zip(churned.iter().copied())
        .map(|(keep, churn)| {
            let svc = Arc::clone(&svc);
            std::thread::spawn(move || {
                let h = svc.hierarchy();
                for _ in 0..5 {
                    h.apply_relation_command(site, RelationCommand::add(RelationKind::Contact, churn))
                        .unwrap();
                    h.apply_relation_command(site, RelationCommand::del(RelationKind::Contact, churn))
                        .unwrap();
                }
                h.apply_relation_command(site, RelationCommand::add(RelationKind::Contact, keep))
                    .unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let entity = svc.hierarchy().get(site).unwrap().unwrap();
    assert_eq!(entity.contacts, kept.iter().copied().collect::<BTreeSet<_>>());
    let contacts = &svc.stores().contacts;
    for id in &kept {
        assert_eq!(
            contacts.in_use_of(*id).unwrap().unwrap(),
            BTreeSet::from([ent_ref(site)]),
            "kept contact {id}"
        );
    }
    for id in &churned {
        assert!(contacts.in_use_of(*id).unwrap().unwrap().is_empty(), "churned contact {id}");
    }
}
