use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use crate::config::DataSourceConfig;
use crate::datasource::connection::Connection;
use crate::error::DataSourceError;
use crate::hooks::{InvocationHooks, LargeResultSetLogger, SlowQueryLogger};

/// Which database a data source connects to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The database named in the URL
    Database,
    /// The server itself, for statements such as CREATE DATABASE
    Admin,
}

enum State {
    New,
    Started { pool: AnyPool, hooks: Arc<InvocationHooks> },
    Closed,
}

/// Pooled data source with statement-execution hooks.
///
/// Hooks are registered between `new()` and `start()`; after that the chain is frozen.
pub struct DataSource {
    config: DataSourceConfig,
    target: Target,
    hooks: InvocationHooks,
    state: State,
}

impl DataSource {
    pub fn new(config: DataSourceConfig) -> Self {
        Self::with_target(config, Target::Database)
    }

    pub fn with_target(config: DataSourceConfig, target: Target) -> Self {
        Self {
            config,
            target,
            hooks: InvocationHooks::new(),
            state: State::New,
        }
    }

    pub fn config(&self) -> &DataSourceConfig {
        &self.config
    }

    pub fn is_started(&self) -> bool {
        matches!(self.state, State::Started { .. })
    }

    /// Hook registry; only available before `start()`
    pub fn invocation_hooks_mut(&mut self) -> Result<&mut InvocationHooks, DataSourceError> {
        match self.state {
            State::New => Ok(&mut self.hooks),
            State::Started { .. } => Err(DataSourceError::AlreadyStarted),
            State::Closed => Err(DataSourceError::Closed),
        }
    }

    /// Create the pool and freeze the hook chain
    pub async fn start(&mut self) -> Result<(), DataSourceError> {
        match self.state {
            State::New => {}
            State::Started { .. } => return Err(DataSourceError::AlreadyStarted),
            State::Closed => return Err(DataSourceError::Closed),
        }

        let connection_string = match self.target {
            Target::Database => self.config.connection_string()?,
            Target::Admin => self.config.admin_connection_string()?,
        };

        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .min_connections(self.config.pool_initial_size)
            .max_connections(self.config.pool_max_size)
            .acquire_timeout(self.config.connection_timeout())
            .idle_timeout(self.config.idle_limit())
            .test_before_acquire(self.config.validate_on_acquire)
            .connect(&connection_string)
            .await?;

        // Built-in hooks run innermost, closest to the statement itself
        let mut hooks = std::mem::take(&mut self.hooks);
        if let Some(ms) = self.config.log_query_execution_longer_than_ms {
            hooks.add_on_statement_execution(SlowQueryLogger::new(ms));
        }
        if let Some(rows) = self.config.log_large_result_set {
            hooks.add_interceptor(LargeResultSetLogger::new(rows));
        }

        info!(
            "Started data source for {} (pool {}..{}, hooks {:?})",
            redact(&connection_string),
            self.config.pool_initial_size,
            self.config.pool_max_size,
            hooks.names()
        );

        self.state = State::Started {
            pool,
            hooks: Arc::new(hooks),
        };
        Ok(())
    }

    /// Borrow a connection from the pool
    pub async fn get_connection(&self) -> Result<Connection, DataSourceError> {
        let (pool, hooks) = match &self.state {
            State::Started { pool, hooks } => (pool, hooks),
            State::New => return Err(DataSourceError::NotStarted),
            State::Closed => return Err(DataSourceError::Closed),
        };

        let start = Instant::now();
        let conn = pool.acquire().await?;
        let elapsed = start.elapsed();

        if exceeds_threshold(elapsed, self.config.log_connection_longer_than_ms) {
            tracing::warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                "Getting a connection took {:?} (pool size {}, idle {})",
                elapsed,
                pool.size(),
                pool.num_idle()
            );
        }

        Ok(Connection::new(conn, hooks.clone()))
    }

    /// Close the pool; outstanding connections are closed as they are returned
    pub async fn close(&mut self) {
        if let State::Started { pool, .. } = std::mem::replace(&mut self.state, State::Closed) {
            pool.close().await;
            info!("Closed data source pool");
        }
    }
}

/// True when a threshold is set and `elapsed` reached it; zero matches everything
fn exceeds_threshold(elapsed: Duration, threshold_ms: Option<u64>) -> bool {
    threshold_ms.map_or(false, |ms| elapsed >= Duration::from_millis(ms))
}

/// Connection string without the password, for logs
fn redact(connection_string: &str) -> String {
    match url::Url::parse(connection_string) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.into()
        }
        Err(_) => "<unparseable url>".to_string(),
    }
}
