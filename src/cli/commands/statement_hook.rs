use clap::Args;

use crate::cli::utils::{output_progress, output_result_set};
use crate::cli::OutputFormat;
use crate::config::DataSourceConfig;
use crate::datasource::DataSource;
use crate::error::DataSourceError;
use crate::hooks::{ExecutionLog, LabelInterceptor};

// Only columns the Any driver can decode; sakila's actor.last_update is a TIMESTAMP
pub const DEFAULT_QUERY: &str =
    "select actor_id, first_name, last_name from actor where first_name = 'CHRISTIAN'";

pub const EXPECTED_ORDER: [&str; 4] = ["aa", "cc", "dd", "bb"];

#[derive(Args, Debug)]
pub struct StatementHookArgs {
    #[arg(long, default_value = DEFAULT_QUERY, help = "Query to run through the hooks")]
    pub sql: String,
}

/// Register the outer (aa/bb) and inner (cc/dd) label hooks
pub fn register_label_hooks(ds: &mut DataSource, log: &ExecutionLog) -> Result<(), DataSourceError> {
    ds.invocation_hooks_mut()?
        .add_interceptor(LabelInterceptor::new("first hook", "aa", "bb", log.clone()))
        .add_interceptor(LabelInterceptor::new("second hook", "cc", "dd", log.clone()));
    Ok(())
}

pub fn verify_order(events: &[String]) -> anyhow::Result<()> {
    if events.iter().map(String::as_str).ne(EXPECTED_ORDER) {
        anyhow::bail!("unexpected hook execution order: {:?}, expected {:?}", events, EXPECTED_ORDER);
    }
    Ok(())
}

pub async fn handle(
    args: StatementHookArgs,
    config: &DataSourceConfig,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let log = ExecutionLog::new();
    let mut ds = DataSource::new(config.clone());
    register_label_hooks(&mut ds, &log)?;

    let result = run_query(&mut ds, &args.sql, output_format).await;
    ds.close().await;
    result?;

    let events = log.snapshot();
    verify_order(&events)?;
    output_progress(output_format, &format!("Hook execution order: {}", events.join(", ")));
    Ok(())
}

async fn run_query(ds: &mut DataSource, sql: &str, output_format: &OutputFormat) -> anyhow::Result<()> {
    ds.start().await?;
    let mut conn = ds.get_connection().await?;
    let mut stmt = conn.create_statement();

    let result_set = stmt.execute_query(sql).await?;
    if result_set.is_empty() {
        anyhow::bail!("query returned no rows: {}", sql);
    }
    output_result_set(output_format, &result_set)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn accepts_only_the_nested_order() {
        let ok: Vec<String> = EXPECTED_ORDER.iter().map(|s| s.to_string()).collect();
        assert!(verify_order(&ok).is_ok());

        let flat: Vec<String> = ["aa", "bb", "cc", "dd"].iter().map(|s| s.to_string()).collect();
        assert!(verify_order(&flat).is_err());
        assert!(verify_order(&ok[..3]).is_err());
    }

    #[test]
    fn registers_two_hooks_outermost_first() {
        let mut ds = DataSource::new(AppConfig::from_env().datasource);
        let log = ExecutionLog::new();
        register_label_hooks(&mut ds, &log).unwrap();

        let names = ds.invocation_hooks_mut().unwrap().names();
        assert_eq!(names, vec!["first hook", "second hook"]);
    }
}
