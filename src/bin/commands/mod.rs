pub mod config;
pub mod insert;
pub mod select;
pub mod sync;
pub mod tables;

use schemalite::{DatabaseSession, SchemaliteConfig, TableSchema, Value};

/// Open the configured session, exiting on failure
pub(crate) fn open_session(config: &SchemaliteConfig) -> DatabaseSession {
    match config.open_session() {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    }
}

/// Look up a declared table, exiting with the list of known tables if missing
pub(crate) fn require_schema<'a>(session: &'a DatabaseSession, table: &str) -> &'a TableSchema {
    match session.schema(table) {
        Some(schema) => schema,
        None => {
            let declared = session.registry().names();
            if declared.is_empty() {
                eprintln!("ERROR: table '{}' is not declared, no tables are declared", table);
            } else {
                eprintln!(
                    "ERROR: table '{}' is not declared. Declared tables: {}",
                    table,
                    declared.join(", ")
                );
            }
            std::process::exit(1);
        }
    }
}

/// Parse a single `KEY=VALUE` argument
pub(crate) fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{}`", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{}`", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Command line values are bound as text; column affinity converts them
pub(crate) fn to_values(pairs: Vec<(String, String)>) -> Vec<(String, Value)> {
    pairs
        .into_iter()
        .map(|(key, value)| (key, Value::from(value)))
        .collect()
}
