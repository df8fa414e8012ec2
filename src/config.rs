use anyhow::{anyhow, Result};
use config::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::database::{DatabaseConn, DatabaseSession, SchemaRegistry, TableDeclaration};

pub struct SchemaliteConfig {
    /// Path to the configuration file the settings were loaded from
    pub config_path: String,

    /// Path to the SQLite database file
    pub database: String,

    /// Use write-ahead logging for the database file
    pub wal: bool,

    /// Declared tables, in file order
    pub tables: Vec<TableDeclaration>,
}

const EMPTY_CONFIG: &str = r#"### schemalite configuration file

### path to the SQLite database file
# database = "~/.schemalite/schemalite.db"

### use write-ahead logging
# wal = false

### table declarations; every table also gets an implicit `id` primary key
# [[tables]]
# name = "Teacher"
# columns = [
#     { name = "name", type = "TEXT" },
#     { name = "age", type = "INTEGER" },
# ]
"#;

/// On-disk layout of the configuration file
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    database: Option<String>,
    #[serde(default)]
    wal: bool,
    #[serde(default)]
    tables: Vec<TableDeclaration>,
}

impl Default for SchemaliteConfig {
    fn default() -> Self {
        Self {
            config_path: SchemaliteConfig::config_file_path(),
            database: default_database_path(),
            wal: false,
            tables: Vec::new(),
        }
    }
}

fn schemalite_dir() -> String {
    let home_dir = dirs::home_dir()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string());
    format!("{}/.schemalite", home_dir)
}

fn default_database_path() -> String {
    format!("{}/schemalite.db", schemalite_dir())
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().to_string(),
        _ => path.to_string(),
    }
}

impl SchemaliteConfig {
    /// Function to create and initialize a new configuration
    ///
    /// A missing configuration file is created from a commented template and
    /// the defaults are used.
    pub fn new(path: &Option<String>) -> Result<SchemaliteConfig> {
        let mut builder = Config::builder();
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::config_file_path(),
        };

        // Add in toml configuration file
        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                let dir = schemalite_dir();
                std::fs::create_dir_all(dir.as_str())
                    .map_err(|e| anyhow!("Unable to create schemalite directory: {}", e))?;
                let p = Self::config_file_path();
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // Add in settings from the environment (with a prefix of SCHEMALITE)
        // E.g., `SCHEMALITE_DATABASE=school.db schemalite sync` would set the database path
        builder = builder.add_source(config::Environment::with_prefix("SCHEMALITE"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let file = settings
            .try_deserialize::<ConfigFile>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let database = match file.database {
            Some(p) => expand_home(p.as_str()),
            None => default_database_path(),
        };

        Ok(SchemaliteConfig {
            config_path,
            database,
            wal: file.wal,
            tables: file.tables,
        })
    }

    /// Build the schema registry from the declared tables
    pub fn registry(&self) -> Result<SchemaRegistry> {
        SchemaRegistry::from_declarations(&self.tables)
    }

    /// Open a session on the configured database with the declared tables
    pub fn open_session(&self) -> Result<DatabaseSession> {
        let registry = self.registry()?;
        crate::database::ensure_parent_dir(&self.database)?;

        let db = DatabaseConn::open_path(&self.database)?;
        if self.wal {
            db.enable_wal()?;
        }
        Ok(DatabaseSession::from_conn(db, registry))
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Config File:        {}", self.config_path),
            format!("Database Path:      {}", self.database),
            format!("WAL Mode:           {}", self.wal),
            format!("Declared Tables:    {}", self.tables.len()),
        ];

        for table in &self.tables {
            lines.push(format!("  - {}", table.name));
        }

        lines.join("\n")
    }

    /// Get the default config file path
    pub fn config_file_path() -> String {
        format!("{}/schemalite.toml", schemalite_dir())
    }
}

// =============================================================================
// Database Info Types
// =============================================================================

/// Information about one declared table
#[derive(Debug, Serialize, Clone)]
pub struct TableInfo {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
}

/// Information about the SQLite database and its declared tables
#[derive(Debug, Serialize, Clone)]
pub struct DatabaseInfo {
    pub path: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub tables: Vec<TableInfo>,
}

/// Get database information without creating the database file
pub fn get_database_info(config: &SchemaliteConfig) -> Result<DatabaseInfo> {
    let registry = config.registry()?;
    let exists = Path::new(&config.database).exists();
    let size_bytes = if exists {
        std::fs::metadata(&config.database).ok().map(|m| m.len())
    } else {
        None
    };

    let db = if exists {
        Some(DatabaseConn::open_path(&config.database)?)
    } else {
        None
    };

    let mut tables = Vec::with_capacity(registry.len());
    for schema in registry.iter() {
        let table_exists = match &db {
            Some(db) => db.table_exists(schema.table_name())?,
            None => false,
        };
        let row_count = match &db {
            Some(db) if table_exists => Some(db.table_count(schema.table_name())?),
            _ => None,
        };

        tables.push(TableInfo {
            name: schema.name().to_string(),
            table: schema.table_name().to_string(),
            columns: schema.fields(),
            exists: table_exists,
            row_count,
        });
    }

    Ok(DatabaseInfo {
        path: config.database.clone(),
        exists,
        size_bytes,
        tables,
    })
}

/// Format a byte size in human-readable form
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
