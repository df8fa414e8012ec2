//! School Example
//!
//! This example declares two tables, synchronizes them into a SQLite file and
//! reads back the rows it inserted.
//!
//! # Running
//!
//! ```bash
//! cargo run --example school -- /tmp/school.db
//! ```

use schemalite::{ColumnType, DatabaseSession, SchemaRegistry, TableSchema, Value};

fn main() -> anyhow::Result<()> {
    println!("=== Schemalite School Example ===\n");

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "school.db".to_string());

    // Example 1: Declare schemas
    println!("1. Declaring schemas:");
    let teacher = TableSchema::builder("Teacher")
        .column("name", ColumnType::Text)
        .column("age", ColumnType::Integer)
        .build()?;
    let student = TableSchema::builder("Student")
        .column("name", ColumnType::Text)
        .column("age", ColumnType::Integer)
        .build()?;
    for schema in [&teacher, &student] {
        println!("   {} -> {}", schema.name(), schema.fields().join(", "));
    }

    let registry = SchemaRegistry::new()
        .with(teacher.clone())?
        .with(student.clone())?;

    // Example 2: Open the database and create missing tables
    println!("\n2. Synchronizing tables in {}:", path);
    let session = DatabaseSession::open(&path, registry)?;
    let report = session.sync()?;
    println!(
        "   Synced: {:?}, newly created: {:?}",
        report.synced, report.created
    );

    // Example 3: Insert a row
    println!("\n3. Inserting a teacher:");
    let id = session.insert(
        &teacher,
        &[("name", Value::from("Peter")), ("age", Value::from("28"))],
    )?;
    println!("   Inserted row {}", id);

    // Example 4: Read rows back
    println!("\n4. All teachers:");
    for row in session.select_all(&teacher)? {
        println!("   {}", serde_json::to_string(&row)?);
    }

    println!("\n5. Looking up Peter:");
    match session.select_one(&teacher, &[("name", Value::from("Peter"))])? {
        Some(row) => println!("   Found: {}", serde_json::to_string(&row)?),
        None => println!("   Not found"),
    }

    println!("\n6. Students so far: {}", session.count(&student)?);

    println!("\n=== Example completed successfully ===");
    Ok(())
}
