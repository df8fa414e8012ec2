use clap::Args;
use schemalite::{format_rows, OutputFormat, Row, SchemaliteConfig};

use super::{open_session, parse_key_value, require_schema, to_values};

/// Arguments for the Select command
#[derive(Args)]
pub struct SelectArgs {
    /// Declared table name (case-insensitive)
    pub table: String,
}

/// Arguments for the Get command
#[derive(Args)]
pub struct GetArgs {
    /// Declared table name (case-insensitive)
    pub table: String,

    /// Equality criteria, e.g. name=Peter
    #[clap(value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub criteria: Vec<(String, String)>,
}

pub fn run_select(config: &SchemaliteConfig, args: SelectArgs, output_format: OutputFormat) {
    let session = open_session(config);
    let schema = require_schema(&session, &args.table);

    let rows = match session.select_all(schema) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Failed to select rows: {}", e);
            std::process::exit(1);
        }
    };

    print_rows(&rows, &schema.keys(), output_format);
}

pub fn run_get(config: &SchemaliteConfig, args: GetArgs, output_format: OutputFormat) {
    let GetArgs { table, criteria } = args;

    let session = open_session(config);
    let schema = require_schema(&session, &table);

    let row = match session.select_one(schema, &to_values(criteria)) {
        Ok(row) => row,
        Err(e) => {
            eprintln!("Failed to select row: {}", e);
            std::process::exit(1);
        }
    };

    match row {
        Some(row) => print_rows(&[row], &schema.keys(), output_format),
        None if output_format.is_json() => println!("null"),
        None => println!("No matching row in {}", schema.table_name()),
    }
}

fn print_rows(rows: &[Row], columns: &[&str], output_format: OutputFormat) {
    match format_rows(rows, columns, output_format) {
        Ok(out) => {
            if !out.is_empty() {
                println!("{}", out);
            }
        }
        Err(e) => {
            eprintln!("Error formatting rows: {}", e);
            std::process::exit(1);
        }
    }
}
