//! Generic record mapper.
//!
//! A [`Table<T>`] persists one kind of [`Record`] in one SQLite table. The
//! record's [`TableSchema`] drives everything: DDL, the column list of every
//! statement, which fields may be used as lookup keys, and how raw SQLite
//! values are read back into a typed [`Row`].
//!
//! Every operation exists twice. The plain form locks the shared connection
//! for the duration of the call; the `*_in` form runs on a connection the
//! caller already holds, typically inside [`Database::transaction`].

use crate::validator::ReferenceTarget;
use crate::{Database, StorageError, StorageResult};
use fleetprov_model::{
    DomainObject, Field, FieldType, ObjectInfo, Row, RowError, SchemaError, TableSchema, Value,
    PRIMARY_KEY,
};
use fleetprov_types::ObjectId;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, OptionalExtension, Params};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// A domain object that can be stored through a [`Table`].
///
/// Conversion is an explicit, named-field mapping. `from_row(&to_row(x)?)`
/// must give back `x`, and `to_row` must write exactly the schema's columns
/// with their declared types; [`Table::new`] checks the latter.
pub trait Record: DomainObject + Clone + Default + Send + Sync + 'static {
    fn schema() -> TableSchema;
    fn to_row(&self) -> Result<Row, RowError>;
    fn from_row(row: &Row) -> Result<Self, RowError>;
}

/// Writes the columns shared by every stored object.
pub fn write_info(row: &mut Row, info: &ObjectInfo) -> Result<(), RowError> {
    row.put("id", info.id)
        .put("name", info.name.as_str())
        .put("description", info.description.as_str())
        .put_json("notes", &info.notes)?
        .put("created", info.created)
        .put("modified", info.modified);
    Ok(())
}

/// Reads the columns written by [`write_info`].
pub fn read_info(row: &Row) -> Result<ObjectInfo, RowError> {
    Ok(ObjectInfo {
        id: row.id("id")?,
        name: row.string("name")?,
        description: row.string("description")?,
        notes: row.json("notes")?,
        created: row.bigint("created")?,
        modified: row.bigint("modified")?,
    })
}

fn quote(ident: &str) -> String {
    format!("\"{ident}\"")
}

fn column_definition(field: &Field) -> String {
    let sql_type = match (field.field_type, field.max_size) {
        (FieldType::Text, Some(size)) => format!("VARCHAR({size})"),
        (FieldType::Text, None) => "TEXT".to_string(),
        (FieldType::BigInt, _) => "BIGINT".to_string(),
        (FieldType::Boolean, _) => "BOOLEAN".to_string(),
    };
    let mut def = format!("{} {sql_type}", quote(&field.name));
    if field.primary_key {
        def.push_str(" PRIMARY KEY");
    }
    def
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::BigInt(v) => SqlValue::Integer(*v),
        Value::Boolean(b) => SqlValue::Integer(i64::from(*b)),
    }
}

fn read_value(field: &Field, raw: ValueRef<'_>) -> Result<Value, RowError> {
    match (field.field_type, raw) {
        (FieldType::Text, ValueRef::Text(bytes)) => std::str::from_utf8(bytes)
            .map(|s| Value::Text(s.to_string()))
            .map_err(|e| RowError::Malformed {
                column: field.name.clone(),
                reason: e.to_string(),
            }),
        (FieldType::BigInt, ValueRef::Integer(v)) => Ok(Value::BigInt(v)),
        (FieldType::Boolean, ValueRef::Integer(v)) => Ok(Value::Boolean(v != 0)),
        (_, ValueRef::Null) => Err(RowError::MissingColumn(field.name.clone())),
        (expected, _) => Err(RowError::TypeMismatch {
            column: field.name.clone(),
            expected,
        }),
    }
}

/// Checks that `T::to_row` writes exactly the declared columns.
fn check_conversion<T: Record>(schema: &TableSchema) -> Result<(), SchemaError> {
    let mismatch = |detail: String| SchemaError::ColumnMismatch {
        table: schema.table.clone(),
        detail,
    };
    let row = T::default().to_row().map_err(|e| mismatch(e.to_string()))?;
    for field in &schema.fields {
        match row.get(&field.name) {
            None => return Err(mismatch(format!("'{}' is never written", field.name))),
            Some(v) if v.field_type() != field.field_type => {
                return Err(mismatch(format!(
                    "'{}' is written as {:?} but declared {:?}",
                    field.name,
                    v.field_type(),
                    field.field_type
                )));
            }
            Some(_) => {}
        }
    }
    if let Some((name, _)) = row.columns().find(|(name, _)| !schema.has_field(name)) {
        return Err(mismatch(format!("'{name}' is written but not declared")));
    }
    Ok(())
}

/// Typed access to one table.
pub struct Table<T> {
    db: Database,
    schema: Arc<TableSchema>,
    column_list: Arc<str>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            schema: Arc::clone(&self.schema),
            column_list: Arc::clone(&self.column_list),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Table<T> {
    /// Registers `T`'s table on `db`. Validates the schema and the record's
    /// conversion, but does not touch the database; see [`Table::create_table`].
    pub fn new(db: Database) -> StorageResult<Self> {
        let schema = T::schema();
        schema.validate()?;
        check_conversion::<T>(&schema)?;
        let column_list = schema
            .column_names()
            .map(quote)
            .collect::<Vec<_>>()
            .join(", ");
        Ok(Self {
            db,
            schema: Arc::new(schema),
            column_list: column_list.into(),
            _record: PhantomData,
        })
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.schema.table
    }

    /// Short prefix identifying this table in `prefix:uuid` references.
    pub fn prefix(&self) -> &str {
        &self.schema.prefix
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// `CREATE TABLE` and `CREATE INDEX` statements for this table.
    pub fn ddl(&self) -> String {
        let table = quote(&self.schema.table);
        let columns = self
            .schema
            .fields
            .iter()
            .map(column_definition)
            .collect::<Vec<_>>()
            .join(",\n    ");
        let mut sql = format!("CREATE TABLE IF NOT EXISTS {table} (\n    {columns}\n);\n");
        for index in &self.schema.indexes {
            let entries = index
                .entries
                .iter()
                .map(|e| {
                    let dir = match e.order {
                        fleetprov_model::IndexOrder::Asc => "ASC",
                        fleetprov_model::IndexOrder::Desc => "DESC",
                    };
                    format!("{} {dir}", quote(&e.field))
                })
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(
                "CREATE INDEX IF NOT EXISTS {} ON {table} ({entries});\n",
                quote(&index.name)
            ));
        }
        sql
    }

    pub fn create_table(&self) -> StorageResult<()> {
        self.db.with_conn(|conn| self.create_table_in(conn))
    }

    pub fn create_table_in(&self, conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(&self.ddl())?;
        debug!(table = %self.schema.table, "table ready");
        Ok(())
    }

    // ── Helpers ──────────────────────────────────────────────────

    /// Quoted column name for `field`, rejecting undeclared fields.
    fn key_column(&self, field: &str) -> StorageResult<String> {
        if self.schema.has_field(field) {
            Ok(quote(field))
        } else {
            Err(StorageError::UnknownField {
                table: self.schema.table.clone(),
                field: field.to_string(),
            })
        }
    }

    fn corrupt(&self, source: RowError) -> StorageError {
        StorageError::CorruptRecord {
            table: self.schema.table.clone(),
            source,
        }
    }

    fn bind_values(&self, record: &T) -> StorageResult<Vec<(String, SqlValue)>> {
        let row = record.to_row().map_err(|e| self.corrupt(e))?;
        self.schema
            .fields
            .iter()
            .map(|field| {
                row.get(&field.name)
                    .map(|v| (field.name.clone(), to_sql(v)))
                    .ok_or_else(|| {
                        StorageError::Schema(SchemaError::ColumnMismatch {
                            table: self.schema.table.clone(),
                            detail: format!("'{}' is never written", field.name),
                        })
                    })
            })
            .collect()
    }

    fn read_row(&self, raw: &rusqlite::Row<'_>) -> Result<Row, RowError> {
        let mut row = Row::new();
        for (i, field) in self.schema.fields.iter().enumerate() {
            let value = raw.get_ref(i).map_err(|e| RowError::Malformed {
                column: field.name.clone(),
                reason: e.to_string(),
            })?;
            row.put(&field.name, read_value(field, value)?);
        }
        Ok(row)
    }

    fn query(&self, conn: &Connection, sql: &str, params: impl Params) -> StorageResult<Vec<T>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, |raw| Ok(self.read_row(raw)))?;
        let mut records = Vec::new();
        for row in rows {
            let row = row?.map_err(|e| self.corrupt(e))?;
            records.push(T::from_row(&row).map_err(|e| self.corrupt(e))?);
        }
        Ok(records)
    }

    fn map_insert_error(&self, err: rusqlite::Error) -> StorageError {
        match err {
            rusqlite::Error::SqliteFailure(failure, detail)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StorageError::Duplicate {
                    table: self.schema.table.clone(),
                    detail: detail.unwrap_or_else(|| failure.to_string()),
                }
            }
            other => other.into(),
        }
    }

    // ── Create ───────────────────────────────────────────────────

    pub fn create(&self, record: &T) -> StorageResult<()> {
        self.db.with_conn(|conn| self.create_in(conn, record))
    }

    pub fn create_in(&self, conn: &Connection, record: &T) -> StorageResult<()> {
        let values = self.bind_values(record)?;
        let placeholders = (1..=values.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            quote(&self.schema.table),
            self.column_list
        );
        conn.execute(&sql, params_from_iter(values.iter().map(|(_, v)| v)))
            .map_err(|e| self.map_insert_error(e))?;
        debug!(table = %self.schema.table, id = %record.id(), "created record");
        Ok(())
    }

    // ── Read ─────────────────────────────────────────────────────

    pub fn get(&self, field: &str, value: &str) -> StorageResult<Option<T>> {
        self.db.with_conn(|conn| self.get_in(conn, field, value))
    }

    pub fn get_in(&self, conn: &Connection, field: &str, value: &str) -> StorageResult<Option<T>> {
        let key = self.key_column(field)?;
        let sql = format!(
            "SELECT {} FROM {} WHERE {key} = ?1 LIMIT 1",
            self.column_list,
            quote(&self.schema.table)
        );
        Ok(self.query(conn, &sql, [value])?.into_iter().next())
    }

    pub fn get_by_id(&self, id: ObjectId) -> StorageResult<Option<T>> {
        self.get(PRIMARY_KEY, &id.to_string())
    }

    pub fn get_by_id_in(&self, conn: &Connection, id: ObjectId) -> StorageResult<Option<T>> {
        self.get_in(conn, PRIMARY_KEY, &id.to_string())
    }

    /// Like [`Table::get_by_id_in`], but a missing row is `NotFound`.
    pub fn require_in(&self, conn: &Connection, id: ObjectId) -> StorageResult<T> {
        self.get_by_id_in(conn, id)?
            .ok_or_else(|| StorageError::not_found(&self.schema.table, id))
    }

    pub fn exists(&self, field: &str, value: &str) -> StorageResult<bool> {
        self.db.with_conn(|conn| self.exists_in(conn, field, value))
    }

    pub fn exists_in(&self, conn: &Connection, field: &str, value: &str) -> StorageResult<bool> {
        let key = self.key_column(field)?;
        let sql = format!(
            "SELECT 1 FROM {} WHERE {key} = ?1 LIMIT 1",
            quote(&self.schema.table)
        );
        let found: Option<i64> = conn.query_row(&sql, [value], |r| r.get(0)).optional()?;
        Ok(found.is_some())
    }

    /// Records ordered by creation time, then id.
    pub fn list(&self, offset: u64, limit: u64) -> StorageResult<Vec<T>> {
        self.db.with_conn(|conn| self.list_in(conn, offset, limit))
    }

    pub fn list_in(&self, conn: &Connection, offset: u64, limit: u64) -> StorageResult<Vec<T>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY \"created\" ASC, \"id\" ASC LIMIT ?1 OFFSET ?2",
            self.column_list,
            quote(&self.schema.table)
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        self.query(conn, &sql, [limit, offset])
    }

    pub fn count(&self) -> StorageResult<u64> {
        self.db.with_conn(|conn| self.count_in(conn))
    }

    pub fn count_in(&self, conn: &Connection) -> StorageResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote(&self.schema.table));
        let count: i64 = conn.query_row(&sql, [], |r| r.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    // ── Update ───────────────────────────────────────────────────

    /// Rewrites every non-key column of the rows matching `field = value`.
    /// Returns `false` when nothing matched.
    pub fn update(&self, field: &str, value: &str, record: &T) -> StorageResult<bool> {
        self.db
            .with_conn(|conn| self.update_in(conn, field, value, record))
    }

    pub fn update_in(
        &self,
        conn: &Connection,
        field: &str,
        value: &str,
        record: &T,
    ) -> StorageResult<bool> {
        let key = self.key_column(field)?;
        let mut values: Vec<SqlValue> = Vec::new();
        let mut assignments = Vec::new();
        for (name, v) in self.bind_values(record)? {
            if name == PRIMARY_KEY {
                continue;
            }
            values.push(v);
            assignments.push(format!("{} = ?{}", quote(&name), values.len()));
        }
        values.push(SqlValue::Text(value.to_string()));
        let sql = format!(
            "UPDATE {} SET {} WHERE {key} = ?{}",
            quote(&self.schema.table),
            assignments.join(", "),
            values.len()
        );
        let changed = conn.execute(&sql, params_from_iter(values.iter()))?;
        debug!(table = %self.schema.table, field, value, changed, "updated record");
        Ok(changed > 0)
    }

    /// Rewrites `record` under its own id. A vanished row is `NotFound`.
    pub fn rewrite_in(&self, conn: &Connection, record: &T) -> StorageResult<()> {
        let id = record.id();
        if self.update_in(conn, PRIMARY_KEY, &id.to_string(), record)? {
            Ok(())
        } else {
            Err(StorageError::not_found(&self.schema.table, id))
        }
    }

    // ── Delete ───────────────────────────────────────────────────

    pub fn delete(&self, field: &str, value: &str) -> StorageResult<bool> {
        self.db.with_conn(|conn| self.delete_in(conn, field, value))
    }

    pub fn delete_in(&self, conn: &Connection, field: &str, value: &str) -> StorageResult<bool> {
        let key = self.key_column(field)?;
        let sql = format!("DELETE FROM {} WHERE {key} = ?1", quote(&self.schema.table));
        let changed = conn.execute(&sql, [value])?;
        debug!(table = %self.schema.table, field, value, changed, "deleted record");
        Ok(changed > 0)
    }

    /// Deletes the row with `id`. A missing row is `NotFound`.
    pub fn delete_by_id(&self, id: ObjectId) -> StorageResult<()> {
        if self.delete(PRIMARY_KEY, &id.to_string())? {
            Ok(())
        } else {
            Err(StorageError::not_found(&self.schema.table, id))
        }
    }
}

impl<T: Record> ReferenceTarget for Table<T> {
    fn exists(&self, field: &str, value: &str) -> StorageResult<bool> {
        Table::exists(self, field, value)
    }

    fn describe(&self, id: ObjectId) -> StorageResult<Option<(String, String)>> {
        Ok(self.get_by_id(id)?.map(|record| {
            let info = record.info();
            (info.name.clone(), info.description.clone())
        }))
    }
}
