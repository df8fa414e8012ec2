use clap::Args;
use schemalite::{OutputFormat, SchemaliteConfig};
use serde::Serialize;

use super::{open_session, parse_key_value, require_schema, to_values};

/// Arguments for the Insert command
#[derive(Args)]
pub struct InsertArgs {
    /// Declared table name (case-insensitive)
    pub table: String,

    /// Column values, e.g. name=Peter age=28
    #[clap(value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub values: Vec<(String, String)>,
}

#[derive(Debug, Serialize)]
struct Inserted<'a> {
    table: &'a str,
    id: i64,
}

pub fn run(config: &SchemaliteConfig, args: InsertArgs, output_format: OutputFormat) {
    let InsertArgs { table, values } = args;

    let session = open_session(config);
    let schema = require_schema(&session, &table);

    let id = match session.insert(schema, &to_values(values)) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Failed to insert row: {}", e);
            std::process::exit(1);
        }
    };

    if output_format.is_json() {
        let inserted = Inserted {
            table: schema.table_name(),
            id,
        };
        match serde_json::to_string(&inserted) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing result: {}", e),
        }
    } else {
        println!("Inserted row {} into {}", id, schema.table_name());
    }
}
