//! SQL text for session operations
//!
//! Only validated identifiers (table and column names) are placed in the SQL
//! text. Values are always passed as numbered `?N` parameters.

use crate::database::core::{TableSchema, IDENTITY_COLUMN};

/// `CREATE TABLE IF NOT EXISTS <table> (id INTEGER PRIMARY KEY AUTOINCREMENT, <fields>);`
pub fn create_table(schema: &TableSchema) -> String {
    let mut columns = vec![format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", IDENTITY_COLUMN)];
    columns.extend(schema.fields());

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({});",
        schema.table_name(),
        columns.join(", ")
    )
}

/// `select * from <table>`
pub fn select_all(schema: &TableSchema) -> String {
    format!("select * from {}", schema.table_name())
}

/// `select * from <table> where <k1> = ?1 and <k2> = ?2 ...`
///
/// Without criteria the WHERE clause is omitted.
pub fn select_one(schema: &TableSchema, columns: &[&str]) -> String {
    if columns.is_empty() {
        return select_all(schema);
    }

    let conditions = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ?{}", column, i + 1))
        .collect::<Vec<_>>()
        .join(" and ");

    format!("{} where {}", select_all(schema), conditions)
}

/// `INSERT INTO {table_name} ({fields}) VALUES ({values});`
///
/// Without columns the row is inserted with `DEFAULT VALUES`.
pub fn insert(schema: &TableSchema, columns: &[&str]) -> String {
    if columns.is_empty() {
        return format!("INSERT INTO {} DEFAULT VALUES;", schema.table_name());
    }

    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        schema.table_name(),
        columns.join(", "),
        placeholders
    )
}
