// Ordered registry of statement-execution hooks

use std::sync::Arc;
use std::time::Instant;

use crate::hooks::context::StatementCall;
use crate::hooks::traits::{Bracketed, HookRef, HookResult, Interceptor, Proceed, StatementHook, Terminal};

/// Statement-execution hooks in registration order.
/// The first registered hook is the outermost one.
#[derive(Clone, Default)]
pub struct InvocationHooks {
    on_statement_execution: Vec<HookRef>,
}

impl InvocationHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an around-hook
    pub fn add_on_statement_execution<H: StatementHook + 'static>(&mut self, hook: H) -> &mut Self {
        tracing::debug!(
            "Registered statement hook '{}' at position {}",
            hook.name(),
            self.on_statement_execution.len()
        );
        self.on_statement_execution.push(Arc::new(hook));
        self
    }

    /// Register a before/after interceptor
    pub fn add_interceptor<I: Interceptor + 'static>(&mut self, interceptor: I) -> &mut Self {
        self.add_on_statement_execution(Bracketed(interceptor))
    }

    pub fn len(&self) -> usize {
        self.on_statement_execution.len()
    }

    pub fn is_empty(&self) -> bool {
        self.on_statement_execution.is_empty()
    }

    /// Hook names, outermost first
    pub fn names(&self) -> Vec<&'static str> {
        self.on_statement_execution.iter().map(|h| h.name()).collect()
    }

    /// Run `call` through every hook, then `terminal`
    pub async fn execute(&self, call: &StatementCall, terminal: &mut dyn Terminal) -> HookResult {
        let start = Instant::now();
        let result = Proceed::new(call, &self.on_statement_execution, terminal).proceed().await;

        match &result {
            Ok(_) => tracing::debug!("Statement chain completed in {:?}: {}", start.elapsed(), call.sql),
            Err(e) => tracing::debug!("Statement chain failed in {:?}: {}: {}", start.elapsed(), call.sql, e),
        }

        result
    }
}

impl std::fmt::Debug for InvocationHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationHooks")
            .field("on_statement_execution", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataSourceError;
    use crate::hooks::context::{ExecutionOutcome, ResultSet};
    use async_trait::async_trait;
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    fn push(log: &Log, entry: &str) {
        log.lock().unwrap().push(entry.to_string());
    }

    struct Around {
        log: Log,
        before: &'static str,
        after: &'static str,
    }

    #[async_trait]
    impl StatementHook for Around {
        fn name(&self) -> &'static str {
            self.before
        }

        async fn on_execution(&self, next: Proceed<'_>) -> HookResult {
            push(&self.log, self.before);
            let result = next.proceed().await;
            push(&self.log, self.after);
            result
        }
    }

    struct Rejecting;

    #[async_trait]
    impl Interceptor for Rejecting {
        fn name(&self) -> &'static str {
            "rejecting"
        }

        async fn before(&self, _call: &StatementCall) -> Result<(), DataSourceError> {
            Err(DataSourceError::hook("rejecting", "not allowed"))
        }

        async fn after(&self, _call: &StatementCall, _outcome: &HookResult) {
            panic!("after() must not run when before() failed");
        }
    }

    struct Recording {
        log: Log,
        fail: bool,
        calls: usize,
    }

    #[async_trait]
    impl Terminal for Recording {
        async fn execute(&mut self, call: &StatementCall) -> HookResult {
            self.calls += 1;
            push(&self.log, "T");
            if self.fail {
                Err(DataSourceError::hook("terminal", format!("cannot run {}", call.sql)))
            } else {
                Ok(ExecutionOutcome::ResultSet(ResultSet::default()))
            }
        }
    }

    fn two_hooks(log: &Log) -> InvocationHooks {
        let mut hooks = InvocationHooks::new();
        hooks
            .add_on_statement_execution(Around { log: log.clone(), before: "aa", after: "bb" })
            .add_on_statement_execution(Around { log: log.clone(), before: "cc", after: "dd" });
        hooks
    }

    #[tokio::test]
    async fn hooks_nest_around_terminal() {
        let log = Log::default();
        let hooks = two_hooks(&log);
        let mut terminal = Recording { log: log.clone(), fail: false, calls: 0 };

        let outcome = hooks.execute(&StatementCall::query("select 1"), &mut terminal).await;

        assert!(outcome.is_ok());
        assert_eq!(terminal.calls, 1);
        assert_eq!(*log.lock().unwrap(), vec!["aa", "cc", "T", "dd", "bb"]);
    }

    #[tokio::test]
    async fn terminal_failure_unwinds_every_hook() {
        let log = Log::default();
        let hooks = two_hooks(&log);
        let mut terminal = Recording { log: log.clone(), fail: true, calls: 0 };

        let err = hooks
            .execute(&StatementCall::update("delete from t"), &mut terminal)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("cannot run delete from t"));
        assert_eq!(*log.lock().unwrap(), vec!["aa", "cc", "T", "dd", "bb"]);
    }

    #[tokio::test]
    async fn failing_before_skips_inner_chain() {
        let log = Log::default();
        let mut hooks = InvocationHooks::new();
        hooks
            .add_on_statement_execution(Around { log: log.clone(), before: "aa", after: "bb" })
            .add_interceptor(Rejecting)
            .add_on_statement_execution(Around { log: log.clone(), before: "cc", after: "dd" });
        let mut terminal = Recording { log: log.clone(), fail: false, calls: 0 };

        let result = hooks.execute(&StatementCall::query("select 1"), &mut terminal).await;

        assert!(matches!(result, Err(DataSourceError::Hook { .. })));
        assert_eq!(terminal.calls, 0);
        assert_eq!(*log.lock().unwrap(), vec!["aa", "bb"]);
    }

    #[tokio::test]
    async fn empty_chain_runs_terminal_directly() {
        let log = Log::default();
        let hooks = InvocationHooks::new();
        let mut terminal = Recording { log: log.clone(), fail: false, calls: 0 };

        hooks.execute(&StatementCall::query("select 1"), &mut terminal).await.unwrap();

        assert!(hooks.is_empty());
        assert_eq!(*log.lock().unwrap(), vec!["T"]);
    }

    #[test]
    fn names_are_in_registration_order() {
        let log = Log::default();
        let hooks = two_hooks(&log);
        assert_eq!(hooks.names(), vec!["aa", "cc"]);
        assert_eq!(hooks.len(), 2);
    }
}
