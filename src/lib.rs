#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Schemalite - schema declarations and row-level CRUD over SQLite
//!
//! Schemalite lets you declare tables as explicit schema descriptors (a name
//! and an ordered list of typed columns), create the matching tables in a
//! SQLite file, and read or insert rows using the schema as the table handle.
//! It can be used as both a command-line application and a library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | (none) | Schemas, sessions, configuration | `rusqlite`, `config` |
//! | `display` | Table formatting with `tabled` | `tabled` |
//! | `cli` | Command-line binary | All above + `clap`, `tracing-subscriber` |
//!
//! # Architecture
//!
//! - **[`database`]**: All database functionality
//!   - `core`: SQLite connection, schema declarations, values and rows
//!   - `session`: `DatabaseSession` with `sync`, `select_all`, `select_one`, `insert`
//! - **[`config`]**: Configuration file with database path and table declarations
//! - **[`output`]**: Output formats for rows
//!
//! # Quick Start
//!
//! ```rust
//! use schemalite::{ColumnType, DatabaseSession, SchemaRegistry, TableSchema, Value};
//!
//! # fn main() -> anyhow::Result<()> {
//! let teacher = TableSchema::builder("Teacher")
//!     .column("name", ColumnType::Text)
//!     .column("age", ColumnType::Integer)
//!     .build()?;
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register(teacher.clone())?;
//!
//! let session = DatabaseSession::open_in_memory(registry)?;
//! let report = session.sync()?;
//! assert_eq!(report.created, vec!["teacher"]);
//!
//! session.insert(&teacher, &[("name", Value::from("Peter")), ("age", Value::from(28))])?;
//!
//! for row in session.select_all(&teacher)? {
//!     println!("{}", serde_json::to_string(&row)?);
//! }
//!
//! let missing = session.select_one(&teacher, &[("name", Value::from("Nobody"))])?;
//! assert!(missing.is_none());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod database;
pub mod output;

// =============================================================================
// Configuration
// =============================================================================

pub use self::config::SchemaliteConfig;

pub use self::config::{format_size, get_database_info, DatabaseInfo, TableInfo};

// =============================================================================
// Database Module - Re-export commonly used types
// =============================================================================

pub use self::database::{
    Column, ColumnType, DatabaseConn, DatabaseSession, Row, SchemaRegistry, SyncReport,
    TableDeclaration, TableSchema, TableSchemaBuilder, Value,
};

// =============================================================================
// Output
// =============================================================================

pub use self::output::{format_rows, OutputFormat};
