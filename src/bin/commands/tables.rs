use schemalite::{format_size, get_database_info, OutputFormat, SchemaliteConfig, TableInfo};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct TableRow {
    name: String,
    table: String,
    columns: String,
    exists: bool,
    rows: String,
}

impl From<&TableInfo> for TableRow {
    fn from(info: &TableInfo) -> Self {
        TableRow {
            name: info.name.clone(),
            table: info.table.clone(),
            columns: info.columns.join(", "),
            exists: info.exists,
            rows: info
                .row_count
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub fn run(config: &SchemaliteConfig, output_format: OutputFormat) {
    let info = match get_database_info(config) {
        Ok(info) => info,
        Err(e) => {
            eprintln!("Failed to inspect database: {}", e);
            std::process::exit(1);
        }
    };

    match output_format {
        OutputFormat::Json | OutputFormat::JsonLine => match serde_json::to_string(&info) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing database info: {}", e),
        },
        OutputFormat::JsonPretty => match serde_json::to_string_pretty(&info) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing database info: {}", e),
        },
        OutputFormat::Psv => {
            println!("name|table|columns|exists|rows");
            for row in info.tables.iter().map(TableRow::from) {
                println!(
                    "{}|{}|{}|{}|{}",
                    row.name, row.table, row.columns, row.exists, row.rows
                );
            }
        }
        OutputFormat::Table | OutputFormat::Markdown => {
            println!("Database: {}", info.path);
            match info.size_bytes {
                Some(size) => println!("Size:     {}", format_size(size)),
                None => println!("Status:   not created"),
            }

            if info.tables.is_empty() {
                println!("\nNo tables declared.");
                return;
            }

            let rows: Vec<TableRow> = info.tables.iter().map(TableRow::from).collect();
            let mut table = Table::new(rows);
            if output_format == OutputFormat::Markdown {
                table.with(Style::markdown());
            } else {
                table.with(Style::rounded());
            }
            println!("\n{}", table);
        }
    }
}
