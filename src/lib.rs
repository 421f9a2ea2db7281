pub mod cli;
pub mod config;
pub mod datasource;
pub mod error;
pub mod hooks;
pub mod types;

pub use datasource::{Connection, DataSource, Statement};
pub use error::DataSourceError;
pub use hooks::{InvocationHooks, StatementHook};
