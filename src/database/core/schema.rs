//! Schema declarations
//!
//! This module provides the explicit schema descriptors used to declare tables:
//! - `ColumnType`: the storage type keyword of a column
//! - `TableSchema`: a named, ordered list of columns (built via `TableSchemaBuilder`)
//! - `SchemaRegistry`: the set of schemas a session synchronizes
//!
//! Type keywords only feed table creation. They are never checked against the
//! values that are inserted or read back.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Names starting with this marker are private and never become columns
pub const PRIVATE_PREFIX: char = '_';

/// Implicit auto-incrementing primary key prepended to every table
pub const IDENTITY_COLUMN: &str = "id";

/// Storage type keyword of a declared column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColumnType {
    Integer,
    Text,
    Real,
    Blob,
    Null,
}

impl ColumnType {
    /// The SQL keyword used in `CREATE TABLE`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
            Self::Real => "REAL",
            Self::Blob => "BLOB",
            Self::Null => "NULL",
        }
    }

    /// Get a list of all keywords for help text
    pub fn all_names() -> &'static [&'static str] {
        &["INTEGER", "TEXT", "REAL", "BLOB", "NULL"]
    }

    /// The Rust type a value of this column naturally maps to
    ///
    /// Informational only, inserted values are never checked against it.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Integer => "i64",
            Self::Text => "String",
            Self::Real => "f64",
            Self::Blob => "Vec<u8>",
            Self::Null => "()",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "INTEGER" | "INT" => Ok(Self::Integer),
            "TEXT" => Ok(Self::Text),
            "REAL" => Ok(Self::Real),
            "BLOB" => Ok(Self::Blob),
            "NULL" => Ok(Self::Null),
            _ => Err(anyhow!(
                "Unknown column type '{}'. Valid types: {}",
                s,
                Self::all_names().join(", ")
            )),
        }
    }
}

impl TryFrom<String> for ColumnType {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.as_str().to_string()
    }
}

/// A single declared column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// Schema definition for one table
///
/// The physical table is named after the lowercased declared name and holds an
/// implicit `id INTEGER PRIMARY KEY AUTOINCREMENT` column followed by the
/// declared columns in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    name: String,
    table_name: String,
    columns: Vec<Column>,
}

impl TableSchema {
    /// Start declaring a schema with the given name
    pub fn builder(name: &str) -> TableSchemaBuilder {
        TableSchemaBuilder::new(name)
    }

    /// The name the schema was declared with
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The physical table name (the declared name in lowercase)
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// `"name TYPE"` strings for every declared column, in declaration order
    ///
    /// # Example
    ///
    /// ```
    /// use schemalite::database::{ColumnType, TableSchema};
    ///
    /// let person = TableSchema::builder("Person")
    ///     .column("name", ColumnType::Text)
    ///     .column("age", ColumnType::Integer)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(person.fields(), vec!["name TEXT", "age INTEGER"]);
    /// ```
    pub fn fields(&self) -> Vec<String> {
        self.public_columns()
            .map(|c| format!("{} {}", c.name, c.column_type))
            .collect()
    }

    /// Declared column names, in declaration order
    ///
    /// # Example
    ///
    /// ```
    /// use schemalite::database::{ColumnType, TableSchema};
    ///
    /// let person = TableSchema::builder("Person")
    ///     .column("name", ColumnType::Text)
    ///     .column("age", ColumnType::Integer)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(person.keys(), vec!["name", "age"]);
    /// ```
    pub fn keys(&self) -> Vec<&str> {
        self.public_columns().map(|c| c.name.as_str()).collect()
    }

    /// Look up a declared column, ignoring ASCII case like SQLite does
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.public_columns()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Check that every name refers to a declared column
    pub fn ensure_columns(&self, names: &[&str]) -> Result<()> {
        for name in names {
            if self.column(name).is_none() {
                return Err(anyhow!(
                    "Unknown column '{}' for table '{}'",
                    name,
                    self.table_name
                ));
            }
        }
        Ok(())
    }

    fn public_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|c| !c.name.starts_with(PRIVATE_PREFIX))
    }
}

/// Declarative builder for [`TableSchema`]
///
/// Validation is deferred to [`TableSchemaBuilder::build`].
#[derive(Debug, Clone)]
pub struct TableSchemaBuilder {
    name: String,
    columns: Vec<Column>,
}

impl TableSchemaBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
        }
    }

    /// Append a column
    pub fn column(mut self, name: &str, column_type: ColumnType) -> Self {
        self.columns.push(Column {
            name: name.to_string(),
            column_type,
        });
        self
    }

    /// Validate the declaration and produce the schema
    pub fn build(self) -> Result<TableSchema> {
        validate_identifier("table", &self.name)?;

        for (i, column) in self.columns.iter().enumerate() {
            validate_identifier("column", &column.name)?;

            if column.name.starts_with(PRIVATE_PREFIX) {
                return Err(anyhow!(
                    "Column name '{}' in '{}' is reserved: names starting with '{}' are private",
                    column.name,
                    self.name,
                    PRIVATE_PREFIX
                ));
            }

            if column.name.eq_ignore_ascii_case(IDENTITY_COLUMN) {
                return Err(anyhow!(
                    "Column name '{}' in '{}' collides with the implicit identity column",
                    column.name,
                    self.name
                ));
            }

            if self.columns[..i]
                .iter()
                .any(|c| c.name.eq_ignore_ascii_case(&column.name))
            {
                return Err(anyhow!(
                    "Column '{}' is declared more than once in '{}'",
                    column.name,
                    self.name
                ));
            }
        }

        Ok(TableSchema {
            table_name: self.name.to_lowercase(),
            name: self.name,
            columns: self.columns,
        })
    }
}

/// Names end up in SQL text unquoted, so only plain identifiers are accepted
fn validate_identifier(kind: &str, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if !valid {
        return Err(anyhow!(
            "Invalid {} name '{}': expected letters, digits and underscores, not starting with a digit",
            kind,
            name
        ));
    }

    if name.to_ascii_lowercase().starts_with(SQLITE_RESERVED_PREFIX) {
        return Err(anyhow!(
            "Invalid {} name '{}': names starting with '{}' are reserved by SQLite",
            kind,
            name,
            SQLITE_RESERVED_PREFIX
        ));
    }

    let upper = name.to_ascii_uppercase();
    if SQLITE_KEYWORDS.contains(&upper.as_str()) {
        return Err(anyhow!(
            "Invalid {} name '{}': '{}' is an SQL keyword",
            kind,
            name,
            upper
        ));
    }

    Ok(())
}

/// Prefix of SQLite's internal object names
const SQLITE_RESERVED_PREFIX: &str = "sqlite_";

/// Keywords recognized by SQLite (https://sqlite.org/lang_keywords.html)
const SQLITE_KEYWORDS: &[&str] = &[
    "ABORT", "ACTION", "ADD", "AFTER", "ALL", "ALTER", "ALWAYS", "ANALYZE", "AND", "AS", "ASC",
    "ATTACH", "AUTOINCREMENT", "BEFORE", "BEGIN", "BETWEEN", "BY", "CASCADE", "CASE", "CAST",
    "CHECK", "COLLATE", "COLUMN", "COMMIT", "CONFLICT", "CONSTRAINT", "CREATE", "CROSS",
    "CURRENT", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "DATABASE", "DEFAULT",
    "DEFERRABLE", "DEFERRED", "DELETE", "DESC", "DETACH", "DISTINCT", "DO", "DROP", "EACH",
    "ELSE", "END", "ESCAPE", "EXCEPT", "EXCLUDE", "EXCLUSIVE", "EXISTS", "EXPLAIN", "FAIL",
    "FILTER", "FIRST", "FOLLOWING", "FOR", "FOREIGN", "FROM", "FULL", "GENERATED", "GLOB",
    "GROUP", "GROUPS", "HAVING", "IF", "IGNORE", "IMMEDIATE", "IN", "INDEX", "INDEXED",
    "INITIALLY", "INNER", "INSERT", "INSTEAD", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN",
    "KEY", "LAST", "LEFT", "LIKE", "LIMIT", "MATCH", "MATERIALIZED", "NATURAL", "NO", "NOT",
    "NOTHING", "NOTNULL", "NULL", "NULLS", "OF", "OFFSET", "ON", "OR", "ORDER", "OTHERS",
    "OUTER", "OVER", "PARTITION", "PLAN", "PRAGMA", "PRECEDING", "PRIMARY", "QUERY", "RAISE",
    "RANGE", "RECURSIVE", "REFERENCES", "REGEXP", "REINDEX", "RELEASE", "RENAME", "REPLACE",
    "RESTRICT", "RETURNING", "RIGHT", "ROLLBACK", "ROW", "ROWS", "SAVEPOINT", "SELECT", "SET",
    "TABLE", "TEMP", "TEMPORARY", "THEN", "TIES", "TO", "TRANSACTION", "TRIGGER", "UNBOUNDED",
    "UNION", "UNIQUE", "UPDATE", "USING", "VACUUM", "VALUES", "VIEW", "VIRTUAL", "WHEN", "WHERE",
    "WINDOW", "WITH", "WITHOUT",
];

/// A table declaration as written in a configuration file
///
/// ```toml
/// [[tables]]
/// name = "Teacher"
/// columns = [
///     { name = "name", type = "TEXT" },
///     { name = "age", type = "INTEGER" },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableDeclaration {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnDeclaration {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl TableDeclaration {
    pub fn to_schema(&self) -> Result<TableSchema> {
        self.columns
            .iter()
            .fold(TableSchema::builder(&self.name), |builder, c| {
                builder.column(&c.name, c.column_type)
            })
            .build()
    }
}

/// The set of schemas synchronized by a session
///
/// Schemas are kept in registration order. Table names are unique.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Vec<TableSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configuration file declarations
    pub fn from_declarations(declarations: &[TableDeclaration]) -> Result<Self> {
        let mut registry = Self::new();
        for declaration in declarations {
            registry.register(declaration.to_schema()?)?;
        }
        Ok(registry)
    }

    /// Register a schema, rejecting a second schema for the same table
    pub fn register(&mut self, schema: TableSchema) -> Result<()> {
        if self.get(schema.table_name()).is_some() {
            return Err(anyhow!(
                "A schema for table '{}' is already registered",
                schema.table_name()
            ));
        }
        self.schemas.push(schema);
        Ok(())
    }

    /// Register a schema and return the registry (builder style)
    pub fn with(mut self, schema: TableSchema) -> Result<Self> {
        self.register(schema)?;
        Ok(self)
    }

    /// Find a schema by declared or table name, ignoring case
    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        let table_name = name.to_lowercase();
        self.schemas.iter().find(|s| s.table_name == table_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableSchema> {
        self.schemas.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.schemas.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
