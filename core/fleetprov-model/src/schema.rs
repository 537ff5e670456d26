use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Name of the primary-key column every table carries.
pub const PRIMARY_KEY: &str = "id";

/// Describes one table: its columns, its indexes, and the short prefix used in
/// `prefix:uuid` references to its rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table: String,
    pub prefix: String,
    pub fields: Vec<Field>,
    pub indexes: Vec<IndexSpec>,
}

/// A single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    /// Maximum size hint. Only meaningful for text columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u32>,
    #[serde(default)]
    pub primary_key: bool,
}

impl Field {
    fn simple(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            max_size: None,
            primary_key: false,
        }
    }

    /// The `id` primary-key column (a 64-character UUID string).
    pub fn id() -> Self {
        Self {
            name: PRIMARY_KEY.into(),
            field_type: FieldType::Text,
            max_size: Some(64),
            primary_key: true,
        }
    }

    /// Shorthand for an unbounded text column.
    pub fn text(name: &str) -> Self {
        Self::simple(name, FieldType::Text)
    }

    /// Shorthand for a text column with a size hint.
    pub fn text_sized(name: &str, max_size: u32) -> Self {
        Self {
            max_size: Some(max_size),
            ..Self::simple(name, FieldType::Text)
        }
    }

    /// Shorthand for a 64-bit integer column.
    pub fn bigint(name: &str) -> Self {
        Self::simple(name, FieldType::BigInt)
    }

    /// Shorthand for a boolean column.
    pub fn boolean(name: &str) -> Self {
        Self::simple(name, FieldType::Boolean)
    }
}

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    BigInt,
    Boolean,
}

/// A named, ordered multi-column index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub name: String,
    pub entries: Vec<IndexEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub field: String,
    pub order: IndexOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexOrder {
    Asc,
    Desc,
}

/// Ways a schema declaration can be inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("table {table}: expected exactly one primary key, found {found}")]
    PrimaryKeyCount { table: String, found: usize },

    #[error("table {table}: primary key must be named 'id', found '{found}'")]
    PrimaryKeyName { table: String, found: String },

    #[error("table {table}: duplicate field '{field}'")]
    DuplicateField { table: String, field: String },

    #[error("table {table}: index '{index}' refers to unknown field '{field}'")]
    UnknownIndexField {
        table: String,
        index: String,
        field: String,
    },

    #[error("table {table}: index '{index}' has no entries")]
    EmptyIndex { table: String, index: String },

    #[error("table {table}: column set does not match record conversion: {detail}")]
    ColumnMismatch { table: String, detail: String },
}

impl TableSchema {
    /// An empty schema for `table`, referenced with `prefix`.
    pub fn new(table: &str, prefix: &str) -> Self {
        Self {
            table: table.into(),
            prefix: prefix.into(),
            fields: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// A schema pre-populated with the columns shared by every stored object:
    /// `id`, `name`, `description`, `notes`, `created`, `modified`.
    pub fn with_object_info(table: &str, prefix: &str) -> Self {
        Self::new(table, prefix)
            .field(Field::id())
            .field(Field::text("name"))
            .field(Field::text("description"))
            .field(Field::text("notes"))
            .field(Field::bigint("created"))
            .field(Field::bigint("modified"))
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn text(self, name: &str) -> Self {
        self.field(Field::text(name))
    }

    pub fn bigint(self, name: &str) -> Self {
        self.field(Field::bigint(name))
    }

    pub fn boolean(self, name: &str) -> Self {
        self.field(Field::boolean(name))
    }

    /// Adds the serialized `inUse` back-reference column.
    pub fn in_use(self) -> Self {
        self.text("inUse")
    }

    /// Adds an index over `entries` (field name, direction).
    pub fn index(mut self, name: &str, entries: &[(&str, IndexOrder)]) -> Self {
        self.indexes.push(IndexSpec {
            name: name.into(),
            entries: entries
                .iter()
                .map(|(field, order)| IndexEntry {
                    field: (*field).into(),
                    order: *order,
                })
                .collect(),
        });
        self
    }

    /// Looks up a declared field by name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Checks the structural invariants: one primary key named `id`, unique
    /// field names, and indexes that only mention declared fields.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let keys: Vec<&Field> = self.fields.iter().filter(|f| f.primary_key).collect();
        if keys.len() != 1 {
            return Err(SchemaError::PrimaryKeyCount {
                table: self.table.clone(),
                found: keys.len(),
            });
        }
        if keys[0].name != PRIMARY_KEY {
            return Err(SchemaError::PrimaryKeyName {
                table: self.table.clone(),
                found: keys[0].name.clone(),
            });
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    table: self.table.clone(),
                    field: field.name.clone(),
                });
            }
        }

        for index in &self.indexes {
            if index.entries.is_empty() {
                return Err(SchemaError::EmptyIndex {
                    table: self.table.clone(),
                    index: index.name.clone(),
                });
            }
            if let Some(entry) = index.entries.iter().find(|e| !seen.contains(e.field.as_str())) {
                return Err(SchemaError::UnknownIndexField {
                    table: self.table.clone(),
                    index: index.name.clone(),
                    field: entry.field.clone(),
                });
            }
        }
        Ok(())
    }
}
