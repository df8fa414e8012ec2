//! Database connection management
//!
//! This module provides the SQLite connection wrapper used by sessions.

use anyhow::{anyhow, Result};
use rusqlite::Connection;
use std::path::Path;

/// Core database connection wrapper
///
/// `DatabaseConn` provides a thin wrapper around SQLite connections,
/// handling both file-based and in-memory databases with consistent
/// configuration and error handling.
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open a database at the specified path
    ///
    /// If the path is `None`, an in-memory database is created.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let conn = match path {
            Some(p) => Connection::open(p)
                .map_err(|e| anyhow!("Failed to open database at '{}': {}", p.display(), e))?,
            None => Connection::open_in_memory()
                .map_err(|e| anyhow!("Failed to create in-memory database: {}", e))?,
        };

        let db = DatabaseConn { conn };
        db.configure()?;
        Ok(db)
    }

    /// Open a database at the specified path (convenience method)
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(Some(path.as_ref()))
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(None)
    }

    /// Configure the connection
    ///
    /// Reading the schema here makes a corrupted or non-database file fail at
    /// open time instead of on the first statement.
    fn configure(&self) -> Result<()> {
        self.conn
            .execute("PRAGMA foreign_keys=ON", [])
            .map_err(|e| anyhow!("Failed to enable foreign keys: {}", e))?;

        let _: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to read database schema: {}", e))?;

        Ok(())
    }

    /// Switch the journal to write-ahead logging
    ///
    /// In-memory databases silently keep their `memory` journal.
    pub fn enable_wal(&self) -> Result<String> {
        self.conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to set journal mode: {}", e))
    }

    /// Execute a SQL statement
    pub fn execute(&self, sql: &str) -> Result<usize> {
        self.conn
            .execute(sql, [])
            .map_err(|e| anyhow!("Failed to execute SQL: {}", e))
    }

    /// Begin an unchecked transaction
    ///
    /// This is useful for batch operations where we want to commit
    /// multiple statements atomically.
    pub fn transaction(&self) -> Result<rusqlite::Transaction<'_>> {
        self.conn
            .unchecked_transaction()
            .map_err(|e| anyhow!("Failed to begin transaction: {}", e))
    }

    /// Check if a table exists in the database
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let count: i32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [table_name],
                |row| row.get(0),
            )
            .map_err(|e| anyhow!("Failed to check table existence: {}", e))?;
        Ok(count > 0)
    }

    /// Get the row count for a table
    ///
    /// The table name is placed in the SQL text, callers pass validated names only.
    pub fn table_count(&self, table_name: &str) -> Result<u64> {
        let query = format!("SELECT COUNT(*) FROM {}", table_name);
        let count: u64 = self
            .conn
            .query_row(&query, [], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to get table count: {}", e))?;
        Ok(count)
    }

    /// Get the physical `(name, declared type)` columns of a table, in order
    ///
    /// Returns an empty list for a table that does not exist.
    pub fn table_columns(&self, table_name: &str) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")
            .map_err(|e| anyhow!("Failed to prepare table info query: {}", e))?;

        let columns = stmt
            .query_map([table_name], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|e| anyhow!("Failed to read table info: {}", e))?
            .collect::<rusqlite::Result<Vec<(String, String)>>>()
            .map_err(|e| anyhow!("Failed to read table info: {}", e))?;

        Ok(columns)
    }

    /// Names of all user tables, sorted
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type='table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .map_err(|e| anyhow!("Failed to prepare table listing: {}", e))?;

        let names = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to list tables: {}", e))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(|e| anyhow!("Failed to list tables: {}", e))?;

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = DatabaseConn::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_open_file_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("school.db");

        let db = DatabaseConn::open_path(&path).unwrap();
        db.execute("CREATE TABLE test (id INTEGER PRIMARY KEY)")
            .unwrap();
        drop(db);

        assert!(path.exists());
        let reopened = DatabaseConn::open_path(&path).unwrap();
        assert!(reopened.table_exists("test").unwrap());
    }

    #[test]
    fn test_open_invalid_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("school.db");
        assert!(DatabaseConn::open_path(&path).is_err());
    }

    #[test]
    fn test_open_non_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.db");
        std::fs::write(&path, vec![0x42u8; 4096]).unwrap();
        assert!(DatabaseConn::open_path(&path).is_err());
    }

    #[test]
    fn test_enable_wal() {
        let dir = tempfile::tempdir().unwrap();
        let db = DatabaseConn::open_path(dir.path().join("wal.db")).unwrap();
        assert_eq!(db.enable_wal().unwrap().to_lowercase(), "wal");
    }

    #[test]
    fn test_table_exists() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();

        assert!(db.table_exists("test_table").unwrap());
        assert!(!db.table_exists("nonexistent_table").unwrap());
    }

    #[test]
    fn test_table_count() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)")
            .unwrap();
        db.execute("INSERT INTO test_table (id) VALUES (1), (2), (3)")
            .unwrap();

        assert_eq!(db.table_count("test_table").unwrap(), 3);
    }

    #[test]
    fn test_table_columns() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.execute("CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)")
            .unwrap();

        let columns = db.table_columns("people").unwrap();
        assert_eq!(
            columns,
            vec![
                ("id".to_string(), "INTEGER".to_string()),
                ("name".to_string(), "TEXT".to_string()),
                ("age".to_string(), "INTEGER".to_string()),
            ]
        );
        assert!(db.table_columns("missing").unwrap().is_empty());
    }

    #[test]
    fn test_table_names() {
        let db = DatabaseConn::open_in_memory().unwrap();
        assert!(db.table_names().unwrap().is_empty());

        db.execute("CREATE TABLE b_table (id INTEGER PRIMARY KEY AUTOINCREMENT)")
            .unwrap();
        db.execute("CREATE TABLE a_table (id INTEGER PRIMARY KEY)")
            .unwrap();

        // sqlite_sequence (created by AUTOINCREMENT) is internal
        assert_eq!(db.table_names().unwrap(), vec!["a_table", "b_table"]);
    }
}
