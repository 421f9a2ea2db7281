use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DataSourceError;

/// Whether a statement produces rows or an update count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Query,
    Update,
}

/// The statement execution seen by every hook in the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementCall {
    pub sql: String,
    pub kind: StatementKind,
}

impl StatementCall {
    pub fn query(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            kind: StatementKind::Query,
        }
    }

    pub fn update(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            kind: StatementKind::Update,
        }
    }
}

/// Rows returned by a query, each row keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Map<String, Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Deserialize every row into `T`
    pub fn records<T: DeserializeOwned>(&self) -> Result<Vec<T>, DataSourceError> {
        self.rows
            .iter()
            .map(|row| Ok(serde_json::from_value(Value::Object(row.clone()))?))
            .collect()
    }
}

/// What the terminal operation produced
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    ResultSet(ResultSet),
    UpdateCount(u64),
}

impl ExecutionOutcome {
    pub fn into_result_set(self) -> Result<ResultSet, DataSourceError> {
        match self {
            ExecutionOutcome::ResultSet(rs) => Ok(rs),
            ExecutionOutcome::UpdateCount(_) => Err(DataSourceError::UnexpectedOutcome { expected: "result set" }),
        }
    }

    pub fn into_update_count(self) -> Result<u64, DataSourceError> {
        match self {
            ExecutionOutcome::UpdateCount(n) => Ok(n),
            ExecutionOutcome::ResultSet(_) => Err(DataSourceError::UnexpectedOutcome { expected: "update count" }),
        }
    }

    /// Number of rows in a result set, None for updates
    pub fn row_count(&self) -> Option<usize> {
        match self {
            ExecutionOutcome::ResultSet(rs) => Some(rs.len()),
            ExecutionOutcome::UpdateCount(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Actor {
        id: i64,
        first_name: String,
    }

    #[test]
    fn decodes_rows_into_records() {
        let row = json!({"id": 7, "first_name": "CHRISTIAN"});
        let rs = ResultSet::new(
            vec!["id".into(), "first_name".into()],
            vec![row.as_object().unwrap().clone()],
        );

        let actors: Vec<Actor> = rs.records().unwrap();
        assert_eq!(actors, vec![Actor { id: 7, first_name: "CHRISTIAN".into() }]);
    }

    #[test]
    fn outcome_kind_mismatch_is_an_error() {
        let outcome = ExecutionOutcome::UpdateCount(2);
        assert_eq!(outcome.row_count(), None);
        assert!(matches!(
            outcome.into_result_set(),
            Err(DataSourceError::UnexpectedOutcome { expected: "result set" })
        ));

        let outcome = ExecutionOutcome::ResultSet(ResultSet::default());
        assert_eq!(outcome.row_count(), Some(0));
        assert!(outcome.into_update_count().is_err());
    }
}
