use fleetprov_model::{Field, FieldType, IndexOrder, SchemaError, TableSchema};

fn policies() -> TableSchema {
    TableSchema::with_object_info("policies", "pol")
        .text("entries")
        .in_use()
        .index("policy_name_index", &[("name", IndexOrder::Asc)])
}

// ── Field constructors ───────────────────────────────────────────

#[test]
fn id_field_is_sized_text_primary_key() {
    let f = Field::id();
    assert_eq!(f.name, "id");
    assert_eq!(f.field_type, FieldType::Text);
    assert_eq!(f.max_size, Some(64));
    assert!(f.primary_key);
}

#[test]
fn shorthand_fields_are_not_keys() {
    for f in [Field::text("a"), Field::bigint("b"), Field::boolean("c"), Field::text_sized("d", 12)] {
        assert!(!f.primary_key, "{} should not be a key", f.name);
    }
    assert_eq!(Field::bigint("b").field_type, FieldType::BigInt);
    assert_eq!(Field::boolean("c").field_type, FieldType::Boolean);
    assert_eq!(Field::text_sized("d", 12).max_size, Some(12));
}

// ── Object info columns ──────────────────────────────────────────

#[test]
fn object_info_columns_come_first_in_order() {
    let schema = policies();
    let names: Vec<&str> = schema.column_names().collect();
    assert_eq!(
        names,
        vec!["id", "name", "description", "notes", "created", "modified", "entries", "inUse"]
    );
    assert_eq!(schema.table, "policies");
    assert_eq!(schema.prefix, "pol");
}

#[test]
fn get_finds_declared_fields_only() {
    let schema = policies();
    assert_eq!(schema.get("created").unwrap().field_type, FieldType::BigInt);
    assert!(schema.has_field("inUse"));
    assert!(!schema.has_field("nope"));
}

// ── validate ─────────────────────────────────────────────────────

#[test]
fn valid_schema_passes() {
    assert_eq!(policies().validate(), Ok(()));
}

#[test]
fn missing_primary_key_is_rejected() {
    let schema = TableSchema::new("t", "t").text("name");
    assert_eq!(
        schema.validate(),
        Err(SchemaError::PrimaryKeyCount {
            table: "t".into(),
            found: 0
        })
    );
}

#[test]
fn two_primary_keys_are_rejected() {
    let mut other = Field::text("serial");
    other.primary_key = true;
    let schema = TableSchema::with_object_info("t", "t").field(other);
    assert!(matches!(
        schema.validate(),
        Err(SchemaError::PrimaryKeyCount { found: 2, .. })
    ));
}

#[test]
fn primary_key_must_be_named_id() {
    let mut key = Field::text("uuid");
    key.primary_key = true;
    let schema = TableSchema::new("t", "t").field(key);
    assert!(matches!(schema.validate(), Err(SchemaError::PrimaryKeyName { .. })));
}

#[test]
fn duplicate_fields_are_rejected() {
    let schema = TableSchema::with_object_info("t", "t").text("name");
    assert!(matches!(
        schema.validate(),
        Err(SchemaError::DuplicateField { field, .. }) if field == "name"
    ));
}

#[test]
fn index_on_unknown_field_is_rejected() {
    let schema =
        TableSchema::with_object_info("t", "t").index("bad", &[("serialNumber", IndexOrder::Desc)]);
    assert!(matches!(
        schema.validate(),
        Err(SchemaError::UnknownIndexField { field, .. }) if field == "serialNumber"
    ));
}

#[test]
fn empty_index_is_rejected() {
    let schema = TableSchema::with_object_info("t", "t").index("empty", &[]);
    assert!(matches!(schema.validate(), Err(SchemaError::EmptyIndex { .. })));
}

// ── Serialization ────────────────────────────────────────────────

#[test]
fn schema_serde_roundtrip() {
    let schema = policies();
    let json = serde_json::to_string(&schema).unwrap();
    assert!(json.contains("\"field_type\":\"big_int\""));
    let back: TableSchema = serde_json::from_str(&json).unwrap();
    assert_eq!(back, schema);
}
