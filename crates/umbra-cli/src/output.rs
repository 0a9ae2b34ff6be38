use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::commands::{CommandResult, Table};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    command: &'a str,
    warnings: &'a [String],
    failures: usize,
    data: &'a Value,
}

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let envelope = Envelope {
                command: result.command,
                warnings: &result.warnings,
                failures: result.failures,
                data: &result.data,
            };
            let payload = if pretty {
                serde_json::to_string_pretty(&envelope)?
            } else {
                serde_json::to_string(&envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => render_table(result)?,
    }

    Ok(())
}

fn render_table(result: &CommandResult) -> Result<(), CliError> {
    println!("command : {}", result.command);
    println!("failures: {}", result.failures);

    if !result.warnings.is_empty() {
        println!("warnings:");
        for warning in &result.warnings {
            println!("  - {warning}");
        }
    }

    match &result.table {
        Some(table) => {
            for line in table_lines(table) {
                println!("{line}");
            }
        }
        None => {
            println!("data:");
            let pretty_data = serde_json::to_string_pretty(&result.data)?;
            for line in pretty_data.lines() {
                println!("  {line}");
            }
        }
    }

    Ok(())
}

/// Left-aligned columns separated by two spaces.
fn table_lines(table: &Table) -> Vec<String> {
    let mut widths: Vec<usize> = table.headers.iter().map(|header| header.len()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_owned()
    };

    let mut lines = vec![format_row(table.headers.clone())];
    lines.extend(
        table
            .rows
            .iter()
            .map(|row| format_row(row.iter().map(String::as_str).collect())),
    );
    lines
}
