use clap::Args;

use crate::cli::utils::output_progress;
use crate::cli::OutputFormat;
use crate::config::DataSourceConfig;
use crate::datasource::{DataSource, Target};
use crate::error::DataSourceError;

#[derive(Args, Debug)]
pub struct CreateDatabaseArgs {
    #[arg(long, default_value = "jdbc_db", help = "Name of the database to create")]
    pub name: String,
}

pub async fn handle(
    args: CreateDatabaseArgs,
    config: &DataSourceConfig,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    validate_database_name(&args.name)?;

    let mut ds = DataSource::with_target(config.clone(), Target::Admin);
    let result = create_database(&mut ds, &args.name, output_format).await;
    ds.close().await;
    result
}

async fn create_database(ds: &mut DataSource, name: &str, output_format: &OutputFormat) -> anyhow::Result<()> {
    output_progress(output_format, "Connecting to database...");
    ds.start().await?;
    let mut conn = ds.get_connection().await?;

    output_progress(output_format, "Creating database...");
    let mut stmt = conn.create_statement();
    stmt.execute_update(&format!("CREATE DATABASE {}", name)).await?;
    output_progress(output_format, "Database created successfully...");

    Ok(())
}

/// Database names are interpolated into DDL, so only [A-Za-z0-9_] is accepted
/// and the name may not start with a digit
pub fn validate_database_name(name: &str) -> Result<(), DataSourceError> {
    let valid = name
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(DataSourceError::InvalidDatabaseName(name.to_string()))
    }
}
