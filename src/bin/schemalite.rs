use clap::{Parser, Subcommand};
use schemalite::*;
use tracing::Level;

mod commands;

use commands::config::ConfigArgs;
use commands::insert::InsertArgs;
use commands::select::{GetArgs, SelectArgs};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.schemalite/schemalite.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// SQLite database file, overrides the configured path
    #[clap(long, global = true)]
    db: Option<String>,

    /// Output format: table, markdown, json, json-pretty, json-line, psv
    #[clap(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    /// Print debug information
    #[clap(long, global = true)]
    debug: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing tables for all declared schemas.
    Sync,

    /// List declared tables and their state in the database.
    Tables,

    /// Print all rows of a table.
    Select(SelectArgs),

    /// Print the first row matching all KEY=VALUE criteria.
    Get(GetArgs),

    /// Insert one row given as KEY=VALUE pairs.
    Insert(InsertArgs),

    /// Show the active configuration.
    Config(ConfigArgs),
}

fn main() {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            // filter spans/events with level DEBUG or higher.
            .with_max_level(Level::DEBUG)
            .init();
    }

    let mut config = match SchemaliteConfig::new(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(db) = cli.db {
        config.database = db;
    }

    let output_format = cli.format;

    match cli.command {
        Commands::Sync => commands::sync::run(&config, output_format),
        Commands::Tables => commands::tables::run(&config, output_format),
        Commands::Select(args) => commands::select::run_select(&config, args, output_format),
        Commands::Get(args) => commands::select::run_get(&config, args, output_format),
        Commands::Insert(args) => commands::insert::run(&config, args, output_format),
        Commands::Config(args) => commands::config::run(&config, args, output_format),
    }
}
