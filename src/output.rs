//! Output formatting for rows
//!
//! This module renders query results in the formats offered by the command
//! line: tables, JSON variants and pipe-separated values.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::database::Row;

/// Unified output format for all commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty table with borders (default)
    #[default]
    Table,
    /// Markdown table format
    Markdown,
    /// Compact JSON (single line)
    Json,
    /// Pretty-printed JSON with indentation
    JsonPretty,
    /// JSON Lines format (one JSON object per line, for streaming)
    JsonLine,
    /// Pipe-separated values with header
    Psv,
}

impl OutputFormat {
    /// Check if this is a JSON variant
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty | Self::JsonLine)
    }

    /// Get a list of all format names for help text
    pub fn all_names() -> &'static [&'static str] {
        &[
            "table",
            "markdown",
            "json",
            "json-pretty",
            "json-line",
            "psv",
        ]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
            Self::JsonPretty => write!(f, "json-pretty"),
            Self::JsonLine => write!(f, "json-line"),
            Self::Psv => write!(f, "psv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "pretty" => Ok(Self::Table),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "json-pretty" | "jsonpretty" => Ok(Self::JsonPretty),
            "json-line" | "jsonline" | "jsonl" | "ndjson" => Ok(Self::JsonLine),
            "psv" | "pipe" => Ok(Self::Psv),
            _ => Err(format!(
                "Unknown output format '{}'. Valid formats: {}",
                s,
                Self::all_names().join(", ")
            )),
        }
    }
}

/// Render rows under the given column headers
///
/// `columns` fixes the header order so an empty result still prints a header.
pub fn format_rows(rows: &[Row], columns: &[&str], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(rows)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::JsonLine => rows
            .iter()
            .map(|row| serde_json::to_string(row).map_err(|e| anyhow!(e)))
            .collect::<Result<Vec<_>>>()
            .map(|lines| lines.join("\n")),
        OutputFormat::Psv => {
            let mut lines = vec![columns.join("|")];
            lines.extend(rows.iter().map(|row| cells(row, columns).join("|")));
            Ok(lines.join("\n"))
        }
        OutputFormat::Table | OutputFormat::Markdown => format_table(rows, columns, format),
    }
}

#[cfg(feature = "display")]
fn format_table(rows: &[Row], columns: &[&str], format: OutputFormat) -> Result<String> {
    use tabled::builder::Builder;
    use tabled::settings::Style;

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.to_string()));
    for row in rows {
        builder.push_record(cells(row, columns));
    }

    let mut table = builder.build();
    match format {
        OutputFormat::Markdown => table.with(Style::markdown()),
        _ => table.with(Style::rounded()),
    };
    Ok(table.to_string())
}

#[cfg(not(feature = "display"))]
fn format_table(_rows: &[Row], _columns: &[&str], format: OutputFormat) -> Result<String> {
    Err(anyhow!(
        "Output format '{}' requires the `display` feature",
        format
    ))
}

fn cells(row: &Row, columns: &[&str]) -> Vec<String> {
    columns
        .iter()
        .map(|c| row.get(c).map(ToString::to_string).unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Value;

    fn rows() -> Vec<Row> {
        vec![
            vec![("name", Value::from("Peter")), ("age", Value::from(28))]
                .into_iter()
                .collect(),
            vec![("name", Value::from("Anna")), ("age", Value::Null)]
                .into_iter()
                .collect(),
        ]
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("ndjson".parse::<OutputFormat>().unwrap(), OutputFormat::JsonLine);
        assert!("xml".parse::<OutputFormat>().is_err());
        assert!(OutputFormat::JsonPretty.is_json());
        assert!(!OutputFormat::Psv.is_json());
    }

    #[test]
    fn test_format_json() {
        let out = format_rows(&rows(), &["name", "age"], OutputFormat::Json).unwrap();
        assert_eq!(
            out,
            r#"[{"name":"Peter","age":28},{"name":"Anna","age":null}]"#
        );

        let lines = format_rows(&rows(), &["name", "age"], OutputFormat::JsonLine).unwrap();
        assert_eq!(lines.lines().count(), 2);
    }

    #[test]
    fn test_format_psv() {
        let out = format_rows(&rows(), &["name", "age"], OutputFormat::Psv).unwrap();
        assert_eq!(out, "name|age\nPeter|28\nAnna|NULL");

        let empty = format_rows(&[], &["name", "age"], OutputFormat::Psv).unwrap();
        assert_eq!(empty, "name|age");
    }

    #[cfg(feature = "display")]
    #[test]
    fn test_format_markdown() {
        let out = format_rows(&rows(), &["name", "age"], OutputFormat::Markdown).unwrap();
        assert!(out.contains("| Peter"));
        assert!(out.lines().count() >= 4);
    }
}
