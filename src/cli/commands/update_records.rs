use clap::Args;

use crate::cli::utils::{output_progress, output_students};
use crate::cli::OutputFormat;
use crate::config::DataSourceConfig;
use crate::datasource::DataSource;
use crate::types::StudentRow;

pub const SELECT_ALL: &str = "SELECT id, first, last, age FROM student";

#[derive(Args, Debug)]
pub struct UpdateRecordsArgs {
    #[arg(long, default_value_t = 22, help = "Age to set")]
    pub age: i64,

    #[arg(long, value_delimiter = ',', default_values_t = [100, 101], help = "Comma-separated student ids")]
    pub ids: Vec<i64>,
}

pub fn update_query(age: i64, ids: &[i64]) -> anyhow::Result<String> {
    if ids.is_empty() {
        anyhow::bail!("at least one student id is required");
    }
    let ids = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ");
    Ok(format!("UPDATE student SET age = {} WHERE id in ({})", age, ids))
}

pub async fn handle(
    args: UpdateRecordsArgs,
    config: &DataSourceConfig,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let sql = update_query(args.age, &args.ids)?;

    let mut ds = DataSource::new(config.clone());
    let result = update_records(&mut ds, &sql, output_format).await;
    ds.close().await;
    result
}

async fn update_records(ds: &mut DataSource, sql: &str, output_format: &OutputFormat) -> anyhow::Result<()> {
    output_progress(output_format, "Connecting to a selected database...");
    ds.start().await?;
    let mut conn = ds.get_connection().await?;
    output_progress(output_format, "Connected database successfully...");

    output_progress(output_format, "Creating statement...");
    let mut stmt = conn.create_statement();
    let updated = stmt.execute_update(sql).await?;
    tracing::info!("Updated {} student records", updated);

    // read everything back to show the updated rows
    let students: Vec<StudentRow> = stmt.execute_query(SELECT_ALL).await?.records()?;
    output_students(output_format, &students)?;

    Ok(())
}
