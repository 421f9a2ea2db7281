// Logging hooks installed by DataSource::start()

use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::hooks::context::StatementCall;
use crate::hooks::traits::{HookResult, Interceptor, Proceed, StatementHook};

/// Warns when a statement takes longer than the threshold. A zero threshold logs every statement.
pub struct SlowQueryLogger {
    threshold: Duration,
}

impl SlowQueryLogger {
    pub fn new(threshold_ms: u64) -> Self {
        Self {
            threshold: Duration::from_millis(threshold_ms),
        }
    }
}

#[async_trait]
impl StatementHook for SlowQueryLogger {
    fn name(&self) -> &'static str {
        "SlowQueryLogger"
    }

    async fn on_execution(&self, next: Proceed<'_>) -> HookResult {
        let sql = next.call().sql.clone();
        let start = Instant::now();
        let result = next.proceed().await;
        let elapsed = start.elapsed();

        if elapsed >= self.threshold {
            match &result {
                Ok(_) => tracing::warn!(elapsed_ms = elapsed.as_millis() as u64, "SQL query execution took {:?}: {}", elapsed, sql),
                Err(e) => tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "SQL query execution took {:?} and failed: {}: {}",
                    elapsed,
                    sql,
                    e
                ),
            }
        }

        result
    }
}

/// Warns when a query returns more rows than the threshold
pub struct LargeResultSetLogger {
    threshold: usize,
}

impl LargeResultSetLogger {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }
}

#[async_trait]
impl Interceptor for LargeResultSetLogger {
    fn name(&self) -> &'static str {
        "LargeResultSetLogger"
    }

    async fn after(&self, call: &StatementCall, outcome: &HookResult) {
        if let Ok(outcome) = outcome {
            if let Some(rows) = outcome.row_count() {
                if rows > self.threshold {
                    tracing::warn!(rows, threshold = self.threshold, "SQL query returned a large result set: {}", call.sql);
                }
            }
        }
    }
}
