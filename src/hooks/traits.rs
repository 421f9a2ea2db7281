use async_trait::async_trait;
use std::sync::Arc;

use crate::error::DataSourceError;
use crate::hooks::context::{ExecutionOutcome, StatementCall};

pub type HookResult = Result<ExecutionOutcome, DataSourceError>;

/// Shared handle to a registered hook
pub type HookRef = Arc<dyn StatementHook>;

/// Around-hook for statement execution.
///
/// A hook does its "before" work, continues the chain through `next.proceed()`,
/// then does its "after" work on the way out. Hooks run in registration order
/// on the way in and in reverse order on the way out.
#[async_trait]
pub trait StatementHook: Send + Sync {
    /// Hook name for logging and debugging
    fn name(&self) -> &'static str;

    async fn on_execution(&self, next: Proceed<'_>) -> HookResult;
}

/// Innermost operation of the chain
#[async_trait]
pub trait Terminal: Send {
    async fn execute(&mut self, call: &StatementCall) -> HookResult;
}

/// Before/after interceptor. Wrapped in `Bracketed`, `after` runs exactly once
/// whenever `before` succeeded, whatever the rest of the chain returned.
#[async_trait]
pub trait Interceptor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn before(&self, _call: &StatementCall) -> Result<(), DataSourceError> {
        Ok(())
    }

    async fn after(&self, _call: &StatementCall, _outcome: &HookResult) {}
}

/// The remainder of the chain, handed to each hook.
///
/// Consumed by `proceed`, so a hook continues the chain at most once.
pub struct Proceed<'a> {
    call: &'a StatementCall,
    hooks: &'a [HookRef],
    terminal: &'a mut (dyn Terminal + 'a),
}

impl<'a> Proceed<'a> {
    pub(crate) fn new(call: &'a StatementCall, hooks: &'a [HookRef], terminal: &'a mut (dyn Terminal + 'a)) -> Self {
        Self { call, hooks, terminal }
    }

    /// The statement being executed
    pub fn call(&self) -> &StatementCall {
        self.call
    }

    /// Number of hooks still to run before the terminal operation
    pub fn remaining(&self) -> usize {
        self.hooks.len()
    }

    /// Run the next hook, or the terminal operation once all hooks are entered
    pub async fn proceed(self) -> HookResult {
        match self.hooks.split_first() {
            Some((hook, rest)) => {
                tracing::trace!("Entering hook '{}' ({} remaining)", hook.name(), rest.len());
                hook.on_execution(Proceed::new(self.call, rest, self.terminal)).await
            }
            None => self.terminal.execute(self.call).await,
        }
    }
}

/// Adapts an `Interceptor` into a `StatementHook`
pub struct Bracketed<I>(pub I);

#[async_trait]
impl<I: Interceptor> StatementHook for Bracketed<I> {
    fn name(&self) -> &'static str {
        self.0.name()
    }

    async fn on_execution(&self, next: Proceed<'_>) -> HookResult {
        let call = next.call;
        // not entered when before() fails, so no after()
        self.0.before(call).await?;
        let outcome = next.proceed().await;
        self.0.after(call, &outcome).await;
        outcome
    }
}
