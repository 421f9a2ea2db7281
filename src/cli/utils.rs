use serde_json::{json, Map, Value};
use std::future::Future;

use crate::cli::OutputFormat;
use crate::hooks::ResultSet;
use crate::types::StudentRow;

/// Run one program: any error is logged with its cause chain and swallowed,
/// and "Goodbye!" is printed whatever the outcome
pub async fn run_script<F>(name: &str, output_format: &OutputFormat, script: F)
where
    F: Future<Output = anyhow::Result<()>>,
{
    if let Err(e) = script.await {
        tracing::error!("{} failed: {:?}", name, e);
    }
    output_progress(output_format, "Goodbye!");
}

/// Progress line. JSON output keeps stdout for data, so progress goes to stderr.
pub fn output_progress(output_format: &OutputFormat, message: &str) {
    match output_format {
        OutputFormat::Text => println!("{}", message),
        OutputFormat::Json => eprintln!("{}", message),
    }
}

/// Print student rows in the appropriate format
pub fn output_students(output_format: &OutputFormat, students: &[StudentRow]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "students": students }))?);
        }
        OutputFormat::Text => {
            for student in students {
                println!("{}", student);
            }
        }
    }
    Ok(())
}

/// One JSON document for several fetches of the same table, keyed by ORDER BY clause
pub fn sorted_students_json(fetches: &[(&str, Vec<StudentRow>)]) -> anyhow::Result<Value> {
    let mut by_order = Map::new();
    for (order_by, students) in fetches {
        by_order.insert(order_by.to_string(), serde_json::to_value(students)?);
    }
    Ok(json!({ "students": by_order }))
}

/// Print an arbitrary result set in the appropriate format
pub fn output_result_set(output_format: &OutputFormat, result_set: &ResultSet) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "rows": result_set.rows }))?);
        }
        OutputFormat::Text => {
            for row in &result_set.rows {
                let line = result_set
                    .columns
                    .iter()
                    .map(|column| match row.get(column) {
                        Some(Value::String(s)) => format!("{}: {}", column, s),
                        Some(v) => format!("{}: {}", column, v),
                        None => format!("{}: null", column),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("{}", line);
            }
        }
    }
    Ok(())
}
