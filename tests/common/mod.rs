#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;

use quickstart_datasource::config::{AppConfig, DataSourceConfig};
use quickstart_datasource::hooks::{ExecutionLog, ExecutionOutcome, HookResult, ResultSet, StatementCall, Terminal};
use quickstart_datasource::DataSourceError;

/// In-memory terminal: logs "T" and returns one row, or fails when asked to
pub struct FakeTerminal {
    pub log: ExecutionLog,
    pub fail: bool,
    pub calls: usize,
}

impl FakeTerminal {
    pub fn succeeding(log: &ExecutionLog) -> Self {
        Self { log: log.clone(), fail: false, calls: 0 }
    }

    pub fn failing(log: &ExecutionLog) -> Self {
        Self { log: log.clone(), fail: true, calls: 0 }
    }
}

#[async_trait]
impl Terminal for FakeTerminal {
    async fn execute(&mut self, call: &StatementCall) -> HookResult {
        self.calls += 1;
        self.log.push("T");
        if self.fail {
            return Err(DataSourceError::hook("terminal", format!("table missing for: {}", call.sql)));
        }
        let row = json!({"actor_id": 1, "first_name": "CHRISTIAN"});
        Ok(ExecutionOutcome::ResultSet(ResultSet::new(
            vec!["actor_id".into(), "first_name".into()],
            row.as_object().into_iter().cloned().collect(),
        )))
    }
}

/// Data source settings for the live database tests, if a database is available
pub fn live_config() -> Option<DataSourceConfig> {
    let url = std::env::var("QUICKSTART_TEST_DATABASE_URL").ok()?;
    let mut config = AppConfig::from_env().datasource;
    config.database_url = url;
    // credentials come from the URL itself
    config.username = None;
    config.password = None;
    config.pool_initial_size = 1;
    config.pool_max_size = 2;
    Some(config)
}

pub fn strings(events: &[&str]) -> Vec<String> {
    events.iter().map(|s| s.to_string()).collect()
}
