use crate::cli::utils::{output_progress, output_students, sorted_students_json};
use crate::cli::OutputFormat;
use crate::config::DataSourceConfig;
use crate::datasource::DataSource;
use crate::types::StudentRow;

/// (description, ORDER BY clause) for each fetch, in the order they run
pub const SORT_ORDERS: [(&str, &str); 3] = [
    ("ascending order by first field", "first ASC"),
    ("descending order by first field", "first DESC"),
    ("descending order by ID field", "id DESC"),
];

pub fn sorted_query(order_by: &str) -> String {
    format!("SELECT id, first, last, age FROM student ORDER BY {}", order_by)
}

pub async fn handle(config: &DataSourceConfig, output_format: &OutputFormat) -> anyhow::Result<()> {
    let mut ds = DataSource::new(config.clone());
    let result = select_sorted(&mut ds, output_format).await;
    ds.close().await;
    result
}

async fn select_sorted(ds: &mut DataSource, output_format: &OutputFormat) -> anyhow::Result<()> {
    output_progress(output_format, "Connecting to a selected database...");
    ds.start().await?;
    let mut conn = ds.get_connection().await?;
    output_progress(output_format, "Connected database successfully...");

    output_progress(output_format, "Creating statement...");
    let mut stmt = conn.create_statement();

    // JSON output holds all three fetches in a single document
    let mut fetched = Vec::new();
    for (description, order_by) in SORT_ORDERS {
        output_progress(output_format, &format!("Fetching records in {}...", description));
        let students: Vec<StudentRow> = stmt.execute_query(&sorted_query(order_by)).await?.records()?;
        match output_format {
            OutputFormat::Text => output_students(output_format, &students)?,
            OutputFormat::Json => fetched.push((order_by, students)),
        }
    }

    if *output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&sorted_students_json(&fetched)?)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_sorted_queries() {
        let queries: Vec<String> = SORT_ORDERS.iter().map(|(_, order)| sorted_query(order)).collect();
        assert_eq!(
            queries,
            vec![
                "SELECT id, first, last, age FROM student ORDER BY first ASC",
                "SELECT id, first, last, age FROM student ORDER BY first DESC",
                "SELECT id, first, last, age FROM student ORDER BY id DESC",
            ]
        );
    }
}
