//! Database session
//!
//! A `DatabaseSession` owns one SQLite connection and the registry of schemas
//! it manages. It creates missing tables and offers row-level reads and inserts
//! using a schema as the table handle.

use anyhow::{anyhow, Result};
use rusqlite::{params_from_iter, OptionalExtension};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::database::core::{DatabaseConn, Row, SchemaRegistry, TableSchema, Value};
use crate::database::session::query;

/// Outcome of [`DatabaseSession::sync`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Every table a `CREATE TABLE IF NOT EXISTS` was issued for
    pub synced: Vec<String>,
    /// Tables that did not exist before the sync
    pub created: Vec<String>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.synced.is_empty()
    }
}

/// Session over one SQLite database file
///
/// The connection is not `Sync`, so a session cannot be shared between
/// threads; open one session per thread instead.
pub struct DatabaseSession {
    db: DatabaseConn,
    registry: SchemaRegistry,
}

impl DatabaseSession {
    /// Open or create the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P, registry: SchemaRegistry) -> Result<Self> {
        let db = DatabaseConn::open_path(path)?;
        Ok(Self::from_conn(db, registry))
    }

    /// Open a session over a fresh in-memory database
    pub fn open_in_memory(registry: SchemaRegistry) -> Result<Self> {
        let db = DatabaseConn::open_in_memory()?;
        Ok(Self::from_conn(db, registry))
    }

    /// Wrap an already configured connection
    pub fn from_conn(db: DatabaseConn, registry: SchemaRegistry) -> Self {
        Self { db, registry }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Find a registered schema by declared or table name, ignoring case
    pub fn schema(&self, name: &str) -> Option<&TableSchema> {
        self.registry.get(name)
    }

    /// Get access to the underlying database connection for custom queries
    pub fn connection(&self) -> &rusqlite::Connection {
        &self.db.conn
    }

    /// Create a table for every registered schema that does not have one yet
    ///
    /// All statements run in one transaction that is committed once at the
    /// end. Existing tables are never altered, even when their columns differ
    /// from the declaration. With no registered schemas nothing is executed.
    pub fn sync(&self) -> Result<SyncReport> {
        if self.registry.is_empty() {
            info!("No tables found.");
            return Ok(SyncReport::default());
        }

        let tx = self.db.transaction()?;
        let mut report = SyncReport::default();

        for schema in self.registry.iter() {
            let table = schema.table_name();
            let existed = self.db.table_exists(table)?;

            let sql = query::create_table(schema);
            debug!(%sql, "creating table");
            tx.execute(&sql, [])
                .map_err(|e| anyhow!("Failed to create {} table: {}", table, e))?;

            report.synced.push(table.to_string());
            if !existed {
                report.created.push(table.to_string());
            }
        }

        tx.commit()
            .map_err(|e| anyhow!("Failed to commit transaction: {}", e))?;

        info!(
            "Synchronized {} tables ({} created).",
            report.synced.len(),
            report.created.len()
        );
        Ok(report)
    }

    /// All rows of the schema's table, mapped onto the declared columns
    pub fn select_all(&self, schema: &TableSchema) -> Result<Vec<Row>> {
        let sql = query::select_all(schema);
        debug!(%sql, "selecting rows");

        let mut stmt = self
            .db
            .conn
            .prepare(&sql)
            .map_err(|e| anyhow!("Failed to prepare statement: {}", e))?;

        let keys = schema.keys();
        let rows = stmt
            .query_map([], |row| map_row(row, &keys))
            .map_err(|e| anyhow!("Failed to select from {}: {}", schema.table_name(), e))?
            .collect::<rusqlite::Result<Vec<Row>>>()
            .map_err(|e| anyhow!("Failed to read rows from {}: {}", schema.table_name(), e))?;

        Ok(rows)
    }

    /// First row whose columns equal all the given criteria
    ///
    /// Returns `Ok(None)` when nothing matches. Empty criteria match any row.
    pub fn select_one<K: AsRef<str>>(
        &self,
        schema: &TableSchema,
        criteria: &[(K, Value)],
    ) -> Result<Option<Row>> {
        let columns: Vec<&str> = criteria.iter().map(|(k, _)| k.as_ref()).collect();
        schema.ensure_columns(&columns)?;

        let sql = query::select_one(schema, &columns);
        debug!(%sql, "selecting one row");

        let keys = schema.keys();
        self.db
            .conn
            .query_row(
                &sql,
                params_from_iter(criteria.iter().map(|(_, v)| v)),
                |row| map_row(row, &keys),
            )
            .optional()
            .map_err(|e| anyhow!("Failed to select from {}: {}", schema.table_name(), e))
    }

    /// Insert one row and commit it, returning the new identity value
    ///
    /// Columns that are not given take their default (NULL).
    pub fn insert<K: AsRef<str>>(&self, schema: &TableSchema, data: &[(K, Value)]) -> Result<i64> {
        let columns: Vec<&str> = data.iter().map(|(k, _)| k.as_ref()).collect();
        schema.ensure_columns(&columns)?;

        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.eq_ignore_ascii_case(column)) {
                return Err(anyhow!(
                    "Column '{}' is given more than once for table '{}'",
                    column,
                    schema.table_name()
                ));
            }
        }

        let sql = query::insert(schema, &columns);
        debug!(%sql, "inserting row");

        // autocommit: the row is committed when execute returns
        self.db
            .conn
            .execute(&sql, params_from_iter(data.iter().map(|(_, v)| v)))
            .map_err(|e| anyhow!("Failed to insert into {}: {}", schema.table_name(), e))?;

        Ok(self.db.conn.last_insert_rowid())
    }

    /// Number of rows in the schema's table
    pub fn count(&self, schema: &TableSchema) -> Result<u64> {
        self.db.table_count(schema.table_name())
    }

    pub fn table_exists(&self, schema: &TableSchema) -> Result<bool> {
        self.db.table_exists(schema.table_name())
    }

    /// Physical `(name, type)` columns of the schema's table, identity included
    pub fn table_columns(&self, schema: &TableSchema) -> Result<Vec<(String, String)>> {
        self.db.table_columns(schema.table_name())
    }
}

fn map_row(row: &rusqlite::Row<'_>, keys: &[&str]) -> rusqlite::Result<Row> {
    let mut mapped = Row::with_capacity(keys.len());
    for key in keys {
        mapped.push(key, row.get::<_, Value>(*key)?);
    }
    Ok(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::core::ColumnType;

    fn teacher() -> TableSchema {
        TableSchema::builder("Teacher")
            .column("name", ColumnType::Text)
            .column("age", ColumnType::Integer)
            .build()
            .unwrap()
    }

    fn student() -> TableSchema {
        TableSchema::builder("Student")
            .column("name", ColumnType::Text)
            .column("age", ColumnType::Integer)
            .build()
            .unwrap()
    }

    fn school_session() -> DatabaseSession {
        let registry = SchemaRegistry::new()
            .with(teacher())
            .unwrap()
            .with(student())
            .unwrap();
        let session = DatabaseSession::open_in_memory(registry).unwrap();
        session.sync().unwrap();
        session
    }

    fn peter() -> Vec<(&'static str, Value)> {
        vec![("name", Value::from("Peter")), ("age", Value::from("28"))]
    }

    #[test]
    fn test_sync_creates_columns_in_order() {
        let session = school_session();

        let columns = session.table_columns(&teacher()).unwrap();
        let names: Vec<&str> = columns.iter().map(|(n, _)| n.as_str()).collect();
        let types: Vec<&str> = columns.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "age"]);
        assert_eq!(types, vec!["INTEGER", "TEXT", "INTEGER"]);
    }

    #[test]
    fn test_sync_is_idempotent() {
        let registry = SchemaRegistry::new().with(teacher()).unwrap();
        let session = DatabaseSession::open_in_memory(registry).unwrap();

        let first = session.sync().unwrap();
        assert_eq!(first.synced, vec!["teacher"]);
        assert_eq!(first.created, vec!["teacher"]);

        let second = session.sync().unwrap();
        assert_eq!(second.synced, vec!["teacher"]);
        assert!(second.created.is_empty());

        let tables: u32 = session
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='teacher'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn test_sync_with_empty_registry() {
        let session = DatabaseSession::open_in_memory(SchemaRegistry::new()).unwrap();
        let report = session.sync().unwrap();

        assert!(report.is_empty());
        assert!(report.created.is_empty());
        assert!(session.db.table_names().unwrap().is_empty());
    }

    #[test]
    fn test_failed_sync_rolls_back_every_table() {
        let registry = SchemaRegistry::new()
            .with(teacher())
            .unwrap()
            .with(student())
            .unwrap();
        let session = DatabaseSession::open_in_memory(registry).unwrap();

        // an index already owns the name of the second table
        session.db.execute("CREATE TABLE other (x INTEGER)").unwrap();
        session
            .db
            .execute("CREATE INDEX student ON other(x)")
            .unwrap();

        let err = session.sync().unwrap_err();
        assert!(err.to_string().contains("student"));

        assert!(!session.table_exists(&teacher()).unwrap());
        assert_eq!(session.db.table_names().unwrap(), vec!["other"]);
    }

    #[test]
    fn test_sync_leaves_drifted_table_alone() {
        let session = DatabaseSession::open_in_memory(
            SchemaRegistry::new().with(teacher()).unwrap(),
        )
        .unwrap();
        session
            .db
            .execute("CREATE TABLE teacher (id INTEGER PRIMARY KEY, name TEXT, salary REAL)")
            .unwrap();

        let report = session.sync().unwrap();
        assert!(report.created.is_empty());

        let columns = session.table_columns(&teacher()).unwrap();
        let names: Vec<&str> = columns.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "salary"]);
    }

    #[test]
    fn test_insert_then_select_all() {
        let session = school_session();
        let schema = teacher();

        let id = session.insert(&schema, &peter()).unwrap();
        assert_eq!(id, 1);

        let rows = session.select_all(&schema).unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["name", "age"]);
        assert_eq!(row.get("name"), Some(&Value::from("Peter")));
        // INTEGER affinity stores the text "28" as an integer
        assert_eq!(row.get("age"), Some(&Value::Integer(28)));
        assert_eq!(row.get("age").map(ToString::to_string).as_deref(), Some("28"));
        assert!(!row.contains_key("id"));

        assert!(session.select_all(&student()).unwrap().is_empty());
    }

    #[test]
    fn test_select_one() {
        let session = school_session();
        let schema = teacher();
        session.insert(&schema, &peter()).unwrap();
        session
            .insert(
                &schema,
                &[("name", Value::from("Anna")), ("age", Value::from(41))],
            )
            .unwrap();

        let row = session
            .select_one(&schema, &[("name", Value::from("Peter"))])
            .unwrap()
            .unwrap();
        let expected: Row = vec![("name", Value::from("Peter")), ("age", Value::from(28))]
            .into_iter()
            .collect();
        assert_eq!(row, expected);

        let both = session
            .select_one(
                &schema,
                &[("name", Value::from("Anna")), ("age", Value::from(41))],
            )
            .unwrap();
        assert!(both.is_some());

        let first = session
            .select_one::<&str>(&schema, &[])
            .unwrap()
            .unwrap();
        assert_eq!(first.get("name"), Some(&Value::from("Peter")));
    }

    #[test]
    fn test_select_one_not_found() {
        let session = school_session();
        let result = session
            .select_one(&teacher(), &[("name", Value::from("Nobody"))])
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_quotes_are_bound_not_interpolated() {
        let session = school_session();
        let schema = teacher();
        session.insert(&schema, &peter()).unwrap();

        let tricky = "O'Brien' or '1'='1";
        session
            .insert(
                &schema,
                &[("name", Value::from(tricky)), ("age", Value::from(50))],
            )
            .unwrap();

        let row = session
            .select_one(&schema, &[("name", Value::from(tricky))])
            .unwrap()
            .unwrap();
        assert_eq!(row.get("name"), Some(&Value::from(tricky)));
        assert_eq!(row.get("age"), Some(&Value::Integer(50)));

        let injected = session
            .select_one(&schema, &[("name", Value::from("x' or '1'='1"))])
            .unwrap();
        assert!(injected.is_none());
        assert_eq!(session.count(&schema).unwrap(), 2);
    }

    #[test]
    fn test_mixed_case_declaration_uses_lowercase_table() {
        let schema = TableSchema::builder("CourseRoom")
            .column("label", ColumnType::Text)
            .build()
            .unwrap();
        let session =
            DatabaseSession::open_in_memory(SchemaRegistry::new().with(schema.clone()).unwrap())
                .unwrap();

        let report = session.sync().unwrap();
        assert_eq!(report.synced, vec!["courseroom"]);

        session
            .insert(&schema, &[("label", Value::from("B12"))])
            .unwrap();
        assert_eq!(session.select_all(&schema).unwrap().len(), 1);
        assert!(session
            .select_one(&schema, &[("label", Value::from("B12"))])
            .unwrap()
            .is_some());
        assert_eq!(session.db.table_names().unwrap(), vec!["courseroom"]);
    }

    #[test]
    fn test_insert_rejects_unknown_and_repeated_columns() {
        let session = school_session();
        let schema = teacher();

        let unknown = session.insert(&schema, &[("salary", Value::from(1.5))]);
        assert!(unknown.is_err());

        let repeated = session.insert(
            &schema,
            &[("name", Value::from("a")), ("NAME", Value::from("b"))],
        );
        assert!(repeated.is_err());

        let lookup = session.select_one(&schema, &[("salary", Value::from(1.5))]);
        assert!(lookup.is_err());

        assert_eq!(session.count(&schema).unwrap(), 0);
    }

    #[test]
    fn test_insert_partial_and_empty_rows() {
        let session = school_session();
        let schema = teacher();

        session
            .insert(&schema, &[("name", Value::from("Solo"))])
            .unwrap();
        session.insert::<&str>(&schema, &[]).unwrap();

        let rows = session.select_all(&schema).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("age"), Some(&Value::Null));
        assert_eq!(rows[1].get("name"), Some(&Value::Null));
    }

    #[test]
    fn test_select_before_sync_fails() {
        let session =
            DatabaseSession::open_in_memory(SchemaRegistry::new().with(teacher()).unwrap())
                .unwrap();
        assert!(!session.table_exists(&teacher()).unwrap());
        assert!(session.select_all(&teacher()).is_err());
    }

    #[test]
    fn test_rows_persist_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("school.db");
        let registry = SchemaRegistry::new().with(teacher()).unwrap();

        {
            let session = DatabaseSession::open(&path, registry.clone()).unwrap();
            session.sync().unwrap();
            session.insert(&teacher(), &peter()).unwrap();
        }

        let session = DatabaseSession::open(&path, registry).unwrap();
        let report = session.sync().unwrap();
        assert!(report.created.is_empty());

        let rows = session.select_all(&teacher()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&Value::from("Peter")));
    }
}
