use clap::Args;
use schemalite::{OutputFormat, SchemaliteConfig};
use serde::Serialize;

/// Arguments for the Config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Also list the columns of every declared table
    #[clap(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Serialize)]
struct ConfigInfo {
    config_file: String,
    database: String,
    wal: bool,
    tables: Vec<TableSummary>,
}

#[derive(Debug, Serialize)]
struct TableSummary {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<Vec<String>>,
}

pub fn run(config: &SchemaliteConfig, args: ConfigArgs, output_format: OutputFormat) {
    let ConfigArgs { verbose } = args;

    let registry = match config.registry() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Invalid table declarations: {}", e);
            std::process::exit(1);
        }
    };

    if !output_format.is_json() {
        println!("{}", config.summary());
        if verbose {
            for schema in registry.iter() {
                println!("\n{} ({}):", schema.name(), schema.table_name());
                for column in schema.columns() {
                    println!(
                        "    {} {} ({})",
                        column.name,
                        column.column_type,
                        column.column_type.describe()
                    );
                }
            }
        }
        return;
    }

    let info = ConfigInfo {
        config_file: config.config_path.clone(),
        database: config.database.clone(),
        wal: config.wal,
        tables: registry
            .iter()
            .map(|schema| TableSummary {
                name: schema.name().to_string(),
                columns: verbose.then(|| schema.fields()),
            })
            .collect(),
    };

    let out = match output_format {
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&info),
        _ => serde_json::to_string(&info),
    };
    match out {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
}
