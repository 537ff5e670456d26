//! The flat storage shape of a domain object.
//!
//! A [`Row`] maps column names to scalar [`Value`]s. Collections and nested
//! structures are stored as JSON text. Conversion code reads and writes
//! columns by name, never by position.

use crate::FieldType;
use fleetprov_types::serde_helpers::optional_id;
use fleetprov_types::ObjectId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// A scalar column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    BigInt(i64),
    Boolean(bool),
}

impl Value {
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Text(_) => FieldType::Text,
            Value::BigInt(_) => FieldType::BigInt,
            Value::Boolean(_) => FieldType::Boolean,
        }
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<ObjectId> for Value {
    fn from(v: ObjectId) -> Self {
        Value::Text(v.to_string())
    }
}

/// Why a row could not be turned back into an object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("column '{column}' is not of type {expected:?}")]
    TypeMismatch { column: String, expected: FieldType },

    #[error("column '{column}' is malformed: {reason}")]
    Malformed { column: String, reason: String },
}

/// Name-keyed column values of one stored object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.values.insert(column.to_string(), value.into());
        self
    }

    pub fn put_optional_id(&mut self, column: &str, value: &Option<ObjectId>) -> &mut Self {
        self.put(column, optional_id::format(value))
    }

    /// Stores `value` as a JSON text column.
    pub fn put_json<T: Serialize + ?Sized>(
        &mut self,
        column: &str,
        value: &T,
    ) -> Result<&mut Self, RowError> {
        let json = serde_json::to_string(value).map_err(|e| RowError::Malformed {
            column: column.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.put(column, json))
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    fn require(&self, column: &str) -> Result<&Value, RowError> {
        self.values
            .get(column)
            .ok_or_else(|| RowError::MissingColumn(column.to_string()))
    }

    pub fn text(&self, column: &str) -> Result<&str, RowError> {
        match self.require(column)? {
            Value::Text(s) => Ok(s),
            _ => Err(RowError::TypeMismatch {
                column: column.to_string(),
                expected: FieldType::Text,
            }),
        }
    }

    pub fn string(&self, column: &str) -> Result<String, RowError> {
        self.text(column).map(str::to_string)
    }

    pub fn bigint(&self, column: &str) -> Result<i64, RowError> {
        match self.require(column)? {
            Value::BigInt(v) => Ok(*v),
            _ => Err(RowError::TypeMismatch {
                column: column.to_string(),
                expected: FieldType::BigInt,
            }),
        }
    }

    pub fn boolean(&self, column: &str) -> Result<bool, RowError> {
        match self.require(column)? {
            Value::Boolean(v) => Ok(*v),
            _ => Err(RowError::TypeMismatch {
                column: column.to_string(),
                expected: FieldType::Boolean,
            }),
        }
    }

    pub fn id(&self, column: &str) -> Result<ObjectId, RowError> {
        let raw = self.text(column)?;
        ObjectId::parse(raw).map_err(|e| RowError::Malformed {
            column: column.to_string(),
            reason: e.to_string(),
        })
    }

    /// Reads a link column where the empty string means "unset".
    pub fn optional_id(&self, column: &str) -> Result<Option<ObjectId>, RowError> {
        let raw = self.text(column)?;
        optional_id::parse(raw).map_err(|e| RowError::Malformed {
            column: column.to_string(),
            reason: e.to_string(),
        })
    }

    /// Parses a JSON text column. An empty string reads as the type's default,
    /// which tolerates rows written before a column was populated.
    pub fn json<T: DeserializeOwned + Default>(&self, column: &str) -> Result<T, RowError> {
        let raw = self.text(column)?;
        if raw.is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(raw).map_err(|e| RowError::Malformed {
            column: column.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
