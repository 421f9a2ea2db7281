use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::hooks::context::StatementCall;
use crate::hooks::traits::{HookResult, Interceptor};

/// Shared, append-only record of hook events
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.lock().push(event.into());
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        // a panic while holding the lock leaves the Vec intact
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Records one label on the way in and another on the way out
pub struct LabelInterceptor {
    name: &'static str,
    before: String,
    after: String,
    log: ExecutionLog,
}

impl LabelInterceptor {
    pub fn new(name: &'static str, before: impl Into<String>, after: impl Into<String>, log: ExecutionLog) -> Self {
        Self {
            name,
            before: before.into(),
            after: after.into(),
            log,
        }
    }
}

#[async_trait]
impl Interceptor for LabelInterceptor {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn before(&self, _call: &StatementCall) -> Result<(), crate::error::DataSourceError> {
        self.log.push(self.before.clone());
        Ok(())
    }

    async fn after(&self, _call: &StatementCall, _outcome: &HookResult) {
        self.log.push(self.after.clone());
    }
}
