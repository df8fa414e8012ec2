//! Database module
//!
//! This module provides all database functionality for schemalite, organized into:
//!
//! - **core**: Core database infrastructure (SQLite connection, schema declarations, values)
//! - **session**: The database session that synchronizes schemas and reads/writes rows
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/           # Foundation
//! │   ├── connection  # SQLite DatabaseConn wrapper
//! │   ├── schema      # TableSchema, ColumnType, SchemaRegistry
//! │   └── value       # Value and Row
//! │
//! └── session/        # CRUD over one database file
//!     ├── database    # DatabaseSession, SyncReport
//!     └── query       # SQL text builders
//! ```
//!
//! # Usage
//!
//! ```rust
//! use schemalite::database::{ColumnType, DatabaseSession, SchemaRegistry, TableSchema, Value};
//!
//! # fn main() -> anyhow::Result<()> {
//! let teacher = TableSchema::builder("Teacher")
//!     .column("name", ColumnType::Text)
//!     .column("age", ColumnType::Integer)
//!     .build()?;
//!
//! let registry = SchemaRegistry::new().with(teacher.clone())?;
//! let session = DatabaseSession::open_in_memory(registry)?;
//! session.sync()?;
//!
//! session.insert(&teacher, &[("name", Value::from("Peter")), ("age", Value::from("28"))])?;
//! let peter = session.select_one(&teacher, &[("name", Value::from("Peter"))])?;
//! assert_eq!(peter.and_then(|row| row.get("age").cloned()), Some(Value::Integer(28)));
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod session;

pub use self::core::{
    Column, ColumnDeclaration, ColumnType, DatabaseConn, Row, SchemaRegistry, TableDeclaration,
    TableSchema, TableSchemaBuilder, Value, IDENTITY_COLUMN, PRIVATE_PREFIX,
};

pub use session::{DatabaseSession, SyncReport};

/// Ensure the directory that will hold a database file exists
pub fn ensure_parent_dir(db_path: &str) -> anyhow::Result<()> {
    match std::path::Path::new(db_path).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir).map_err(|e| {
            anyhow::anyhow!("Failed to create data directory '{}': {}", dir.display(), e)
        }),
        _ => Ok(()),
    }
}
