use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::any::AnyRow;
use sqlx::pool::PoolConnection;
use sqlx::{Any, AnyConnection, Column, Executor, Row};
use std::sync::Arc;
use std::time::Instant;

use crate::datasource::resource::{Release, ReleasePolicy, Scoped};
use crate::error::DataSourceError;
use crate::hooks::{ExecutionOutcome, HookResult, InvocationHooks, ResultSet, StatementCall, StatementKind, Terminal};

/// Pool connection checked out by a `Connection`; releasing returns it to the pool
pub struct PooledHandle {
    conn: Option<PoolConnection<Any>>,
    acquired_at: Instant,
}

impl PooledHandle {
    fn connection_mut(&mut self) -> Result<&mut AnyConnection, DataSourceError> {
        self.conn.as_deref_mut().ok_or(DataSourceError::Closed)
    }
}

impl Release for PooledHandle {
    type Error = DataSourceError;

    fn kind(&self) -> &'static str {
        "connection"
    }

    fn release(&mut self) -> Result<(), DataSourceError> {
        // dropping a PoolConnection hands it back to the pool
        match self.conn.take() {
            Some(conn) => {
                drop(conn);
                tracing::debug!("Connection returned to pool after {:?}", self.acquired_at.elapsed());
                Ok(())
            }
            None => Err(DataSourceError::Closed),
        }
    }
}

/// A connection borrowed from a `DataSource`, returned to the pool when dropped
pub struct Connection {
    handle: Scoped<PooledHandle>,
    hooks: Arc<InvocationHooks>,
}

impl Connection {
    pub(crate) fn new(conn: PoolConnection<Any>, hooks: Arc<InvocationHooks>) -> Self {
        let handle = PooledHandle {
            conn: Some(conn),
            acquired_at: Instant::now(),
        };
        Self {
            handle: Scoped::new(handle, ReleasePolicy::Log),
            hooks,
        }
    }

    pub fn create_statement(&mut self) -> Statement<'_> {
        Statement {
            connection: self,
            handle: Scoped::new(StatementHandle { executions: 0 }, ReleasePolicy::Discard),
        }
    }

    /// Return the connection to the pool now
    pub fn close(self) -> Result<(), DataSourceError> {
        self.handle.close()
    }
}

struct StatementHandle {
    executions: usize,
}

impl Release for StatementHandle {
    type Error = DataSourceError;

    fn kind(&self) -> &'static str {
        "statement"
    }

    fn release(&mut self) -> Result<(), DataSourceError> {
        tracing::trace!("Statement closed after {} executions", self.executions);
        Ok(())
    }
}

/// Plain (unprepared) SQL statement on a borrowed connection
pub struct Statement<'c> {
    connection: &'c mut Connection,
    handle: Scoped<StatementHandle>,
}

impl Statement<'_> {
    /// Run a query and return its rows
    pub async fn execute_query(&mut self, sql: &str) -> Result<ResultSet, DataSourceError> {
        self.execute(StatementCall::query(sql)).await?.into_result_set()
    }

    /// Run an update or DDL statement and return the affected row count
    pub async fn execute_update(&mut self, sql: &str) -> Result<u64, DataSourceError> {
        self.execute(StatementCall::update(sql)).await?.into_update_count()
    }

    async fn execute(&mut self, call: StatementCall) -> HookResult {
        self.handle.get_mut().executions += 1;

        let hooks = self.connection.hooks.clone();
        let conn = self.connection.handle.get_mut().connection_mut()?;
        let mut terminal = ConnectionTerminal { conn };

        hooks.execute(&call, &mut terminal).await
    }

    pub fn close(self) -> Result<(), DataSourceError> {
        self.handle.close()
    }
}

/// Executes the statement on the underlying sqlx connection
struct ConnectionTerminal<'c> {
    conn: &'c mut AnyConnection,
}

#[async_trait]
impl Terminal for ConnectionTerminal<'_> {
    async fn execute(&mut self, call: &StatementCall) -> HookResult {
        match call.kind {
            StatementKind::Query => {
                let rows = Executor::fetch_all(&mut *self.conn, call.sql.as_str()).await?;
                Ok(ExecutionOutcome::ResultSet(to_result_set(&rows)))
            }
            StatementKind::Update => {
                let done = Executor::execute(&mut *self.conn, call.sql.as_str()).await?;
                Ok(ExecutionOutcome::UpdateCount(done.rows_affected()))
            }
        }
    }
}

fn to_result_set(rows: &[AnyRow]) -> ResultSet {
    let columns = rows
        .first()
        .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();

    let rows = rows
        .iter()
        .map(|row| {
            let mut record = Map::new();
            for (i, column) in row.columns().iter().enumerate() {
                record.insert(column.name().to_string(), column_value(row, i));
            }
            record
        })
        .collect();

    ResultSet::new(columns, rows)
}

/// Decode a column as the first type that fits; NULL and unsupported types become Null
fn column_value(row: &AnyRow, index: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    Value::Null
}
