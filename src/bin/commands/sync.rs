use schemalite::{OutputFormat, SchemaliteConfig};

use super::open_session;

pub fn run(config: &SchemaliteConfig, output_format: OutputFormat) {
    let session = open_session(config);

    let report = match session.sync() {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Failed to synchronize tables: {}", e);
            std::process::exit(1);
        }
    };

    if output_format.is_json() {
        let out = match output_format {
            OutputFormat::JsonPretty => serde_json::to_string_pretty(&report),
            _ => serde_json::to_string(&report),
        };
        match out {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing sync report: {}", e),
        }
        return;
    }

    if report.is_empty() {
        println!("No tables found.");
        return;
    }

    println!(
        "Synchronized {} tables ({} created).",
        report.synced.len(),
        report.created.len()
    );
    for table in &report.synced {
        let state = if report.created.contains(table) {
            "created"
        } else {
            "exists"
        };
        println!("  {:<24} {}", table, state);
    }
}
