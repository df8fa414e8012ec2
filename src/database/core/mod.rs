//! Core database infrastructure
//!
//! This module provides the foundational components used by sessions:
//! - `DatabaseConn`: Core SQLite connection wrapper with configuration
//! - `TableSchema` / `SchemaRegistry`: Explicit schema declarations
//! - `Value` / `Row`: Stored values and retrieved records

mod connection;
mod schema;
mod value;

pub use connection::DatabaseConn;
pub use schema::{
    Column, ColumnDeclaration, ColumnType, SchemaRegistry, TableDeclaration, TableSchema,
    TableSchemaBuilder, IDENTITY_COLUMN, PRIVATE_PREFIX,
};
pub use value::{Row, Value};
