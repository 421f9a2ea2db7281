use thiserror::Error;

/// Errors from the data source, its hooks and the quickstart scripts
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Invalid database name: {0}")]
    InvalidDatabaseName(String),

    #[error("Data source has not been started")]
    NotStarted,

    #[error("Data source already started; hooks must be registered before start()")]
    AlreadyStarted,

    #[error("Data source is closed")]
    Closed,

    #[error("Hook '{hook}' failed: {message}")]
    Hook { hook: String, message: String },

    #[error("Unexpected statement outcome: expected {expected}")]
    UnexpectedOutcome { expected: &'static str },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DataSourceError {
    pub fn hook(hook: impl Into<String>, message: impl Into<String>) -> Self {
        DataSourceError::Hook {
            hook: hook.into(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = DataSourceError> = std::result::Result<T, E>;
