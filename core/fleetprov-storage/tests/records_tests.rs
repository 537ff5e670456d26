//! Every stored kind survives `to_row`/`from_row` and a trip through SQLite,
//! both with default contents and fully populated.

use fleetprov_model::{
    Contact, DeviceConfiguration, DeviceConfigurationElement, DomainObject, Entity, InventoryTag,
    Location, ManagementPolicy, ManagementPolicyEntry, ManagementRole, Map, NoteInfo, ObjectInfo,
    PoolStrategy, RadiusEndpoint, RadiusEndpointType, RadiusServer, RadsecServer, Venue,
};
use fleetprov_storage::{Database, Record, Stores, Table};
use fleetprov_types::{ObjectId, Reference};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::fmt::Debug;

fn info(name: &str) -> ObjectInfo {
    ObjectInfo {
        id: ObjectId::new(),
        name: name.into(),
        description: format!("{name} description"),
        notes: vec![NoteInfo {
            created: 1_700_000_000,
            created_by: "ops@example.com".into(),
            note: "first note".into(),
        }],
        created: 1_700_000_000,
        modified: 1_700_000_100,
    }
}

fn ids(n: usize) -> BTreeSet<ObjectId> {
    (0..n).map(|_| ObjectId::new()).collect()
}

fn in_use() -> BTreeSet<Reference> {
    [
        Reference::new("ent", ObjectId::new()),
        Reference::new("ven", ObjectId::new()),
    ]
    .into_iter()
    .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn assert_roundtrip<T>(table: &Table<T>, record: T)
where
    T: Record + PartialEq + Debug,
{
    let row = record.to_row().unwrap();
    assert_eq!(T::from_row(&row).unwrap(), record, "row roundtrip");

    table.create(&record).unwrap();
    assert_eq!(table.get_by_id(record.info().id).unwrap(), Some(record), "database roundtrip");
}

fn assert_default_roundtrip<T>(table: &Table<T>)
where
    T: Record + PartialEq + Debug,
{
    assert_roundtrip(table, T::default());
}

fn stores() -> Stores {
    let db = Database::open_in_memory().unwrap();
    let stores = Stores::new(&db).unwrap();
    stores.create_tables(&db).unwrap();
    stores
}

#[test]
fn default_records_roundtrip() {
    let s = stores();
    assert_default_roundtrip(&s.entities);
    assert_default_roundtrip(&s.policies);
    assert_default_roundtrip(&s.venues);
    assert_default_roundtrip(&s.locations);
    assert_default_roundtrip(&s.contacts);
    assert_default_roundtrip(&s.inventory);
    assert_default_roundtrip(&s.roles);
    assert_default_roundtrip(&s.configurations);
    assert_default_roundtrip(&s.radius_endpoints);
    assert_default_roundtrip(&s.maps);
}

#[test]
fn populated_entity_roundtrips() {
    let s = stores();
    assert_roundtrip(
        &s.entities,
        Entity {
            info: info("campus"),
            parent: Some(ObjectId::new()),
            children: ids(3),
            venues: ids(2),
            devices: ids(1),
            contacts: ids(2),
            locations: ids(1),
            device_configuration: Some(ObjectId::new()),
            management_policy: Some(ObjectId::new()),
            rrm: "inherit".into(),
        },
    );
}

#[test]
fn populated_policy_roundtrips() {
    let s = stores();
    assert_roundtrip(
        &s.policies,
        ManagementPolicy {
            info: info("ops policy"),
            entries: vec![ManagementPolicyEntry {
                users: strings(&["alice", "bob"]),
                resources: strings(&["entity", "venue"]),
                access: strings(&["read", "modify"]),
                policy: "allow".into(),
            }],
            in_use: in_use(),
            entity: Some(ObjectId::new()),
            venue: None,
        },
    );
}

#[test]
fn populated_venue_roundtrips() {
    let s = stores();
    assert_roundtrip(
        &s.venues,
        Venue {
            info: info("hall"),
            entity: Some(ObjectId::new()),
            parent: Some(ObjectId::new()),
            children: ids(2),
            devices: ids(4),
            contact: Some(ObjectId::new()),
            location: Some(ObjectId::new()),
            device_configuration: None,
            management_policy: Some(ObjectId::new()),
            rrm: "off".into(),
            topology: "{\"nodes\":[]}".into(),
            design: "floorplan".into(),
        },
    );
}

#[test]
fn populated_location_roundtrips() {
    let s = stores();
    assert_roundtrip(
        &s.locations,
        Location {
            info: info("hq"),
            location_type: "SERVICE".into(),
            building_name: "Tower A".into(),
            address_lines: strings(&["1 Main St", "Floor 3"]),
            city: "Springfield".into(),
            state: "IL".into(),
            postal: "62701".into(),
            country: "US".into(),
            phones: strings(&["+1 555 0100"]),
            mobiles: strings(&["+1 555 0199"]),
            geo_code: "39.78,-89.65".into(),
            in_use: in_use(),
            entity: Some(ObjectId::new()),
        },
    );
}

#[test]
fn populated_contact_roundtrips() {
    let s = stores();
    assert_roundtrip(
        &s.contacts,
        Contact {
            info: info("jane"),
            contact_type: "TECHNICAL".into(),
            title: "Network lead".into(),
            salutation: "Dr".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            initials: "JD".into(),
            visual: "avatar.png".into(),
            primary_email: "jane@example.com".into(),
            secondary_email: "jd@example.org".into(),
            mobiles: strings(&["+1 555 0101"]),
            phones: vec![],
            access_pin: "4321".into(),
            in_use: in_use(),
            entity: None,
        },
    );
}

#[test]
fn populated_inventory_tag_roundtrips() {
    let s = stores();
    assert_roundtrip(
        &s.inventory,
        InventoryTag {
            info: info("ap-1"),
            serial_number: "aabbccddeeff".into(),
            venue: Some(ObjectId::new()),
            entity: Some(ObjectId::new()),
            subscriber: "sub-1".into(),
            device_type: "edgecore_eap101".into(),
            qr_code: "qr".into(),
            geo_code: "0,0".into(),
            location: Some(ObjectId::new()),
            contact: None,
            device_configuration: Some(ObjectId::new()),
            rrm: "inherit".into(),
            in_use: in_use(),
        },
    );
}

#[test]
fn populated_role_roundtrips() {
    let s = stores();
    assert_roundtrip(
        &s.roles,
        ManagementRole {
            info: info("admins"),
            management_policy: Some(ObjectId::new()),
            users: strings(&["alice"]),
            in_use: in_use(),
            entity: Some(ObjectId::new()),
        },
    );
}

#[test]
fn populated_configuration_roundtrips() {
    let s = stores();
    assert_roundtrip(
        &s.configurations,
        DeviceConfiguration {
            info: info("indoor"),
            management_policy: Some(ObjectId::new()),
            device_types: strings(&["edgecore_eap101", "*"]),
            configuration: vec![DeviceConfigurationElement {
                name: "radios".into(),
                description: "2g and 5g".into(),
                weight: 10,
                configuration: "{\"radios\":[]}".into(),
            }],
            in_use: in_use(),
            firmware_upgrade: "yes".into(),
            firmware_rc_only: true,
        },
    );
}

#[test]
fn populated_radius_endpoint_roundtrips() {
    let s = stores();
    assert_roundtrip(
        &s.radius_endpoints,
        RadiusEndpoint {
            info: info("corp radius"),
            endpoint_type: RadiusEndpointType::Radius,
            pool_strategy: PoolStrategy::Weighted,
            radius_servers: vec![RadiusServer {
                hostname: "radius1".into(),
                ip: "10.0.0.1".into(),
                port: 1812,
                secret: "s3cret".into(),
            }],
            radsec_servers: vec![],
            index: "0.0.1.1".into(),
            use_gw_proxy: true,
            in_use: in_use(),
        },
    );

    assert_roundtrip(
        &s.radius_endpoints,
        RadiusEndpoint {
            info: info("radsec"),
            endpoint_type: RadiusEndpointType::Radsec,
            pool_strategy: PoolStrategy::Random,
            radius_servers: vec![],
            radsec_servers: vec![RadsecServer {
                hostname: "radsec1".into(),
                ip: "10.0.0.2".into(),
                port: 2083,
                certificate: "cert".into(),
                private_key: "key".into(),
                ca_certs: strings(&["ca1", "ca2"]),
            }],
            index: "0.0.1.2".into(),
            use_gw_proxy: false,
            in_use: BTreeSet::new(),
        },
    );
}

#[test]
fn populated_map_roundtrips() {
    let s = stores();
    assert_roundtrip(
        &s.maps,
        Map {
            info: info("floor 2"),
            data: r#"{"nodes":[{"id":"ap-1","x":10,"y":20}]}"#.into(),
            entity: Some(ObjectId::new()),
            creator: "ops@example.com".into(),
            visibility: "public".into(),
        },
    );
}

#[test]
fn tables_use_their_declared_names_and_prefixes() {
    let s = stores();
    let pairs = [
        (s.entities.name(), s.entities.prefix()),
        (s.policies.name(), s.policies.prefix()),
        (s.venues.name(), s.venues.prefix()),
        (s.locations.name(), s.locations.prefix()),
        (s.contacts.name(), s.contacts.prefix()),
        (s.inventory.name(), s.inventory.prefix()),
        (s.roles.name(), s.roles.prefix()),
        (s.configurations.name(), s.configurations.prefix()),
        (s.radius_endpoints.name(), s.radius_endpoints.prefix()),
        (s.maps.name(), s.maps.prefix()),
    ];
    assert_eq!(
        pairs,
        [
            ("entities", "ent"),
            ("policies", "pol"),
            ("venues", "ven"),
            ("locations", "loc"),
            ("contacts", "con"),
            ("inventory", "inv"),
            ("roles", "rol"),
            ("configurations", "cfg"),
            ("radius_endpoints", "rep"),
            ("maps", "map"),
        ]
    );
}
