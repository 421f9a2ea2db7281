// Statement-execution hook chain: ordered around-hooks wrapping a terminal operation

pub mod builtin;
pub mod chain;
pub mod context;
pub mod order;
pub mod traits;

// Re-export core types
pub use builtin::{LargeResultSetLogger, SlowQueryLogger};
pub use chain::InvocationHooks;
pub use context::{ExecutionOutcome, ResultSet, StatementCall, StatementKind};
pub use order::{ExecutionLog, LabelInterceptor};
pub use traits::{Bracketed, HookRef, HookResult, Interceptor, Proceed, StatementHook, Terminal};
