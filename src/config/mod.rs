use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::error::DataSourceError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub datasource: DataSourceConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceConfig {
    pub database_url: String,
    /// Database used for server-level statements such as CREATE DATABASE.
    /// None connects without selecting a database (MySQL style).
    pub admin_database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,

    pub pool_initial_size: u32,
    pub pool_max_size: u32,
    pub connection_timeout_ms: u64,
    pub connection_idle_limit_secs: u64,
    pub validate_on_acquire: bool,

    // None disables the corresponding warning
    pub log_query_execution_longer_than_ms: Option<u64>,
    pub log_connection_longer_than_ms: Option<u64>,
    pub log_large_result_set: Option<usize>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        let ds = &mut self.datasource;

        if let Ok(v) = env::var("DATABASE_URL") {
            ds.database_url = v;
        }
        if let Ok(v) = env::var("DATASOURCE_ADMIN_DATABASE") {
            ds.admin_database = if v.is_empty() { None } else { Some(v) };
        }
        if let Ok(v) = env::var("DATASOURCE_USERNAME") {
            ds.username = Some(v);
        }
        if let Ok(v) = env::var("DATASOURCE_PASSWORD") {
            ds.password = Some(v);
        }

        // Pool overrides
        if let Ok(v) = env::var("DATASOURCE_POOL_INITIAL_SIZE") {
            ds.pool_initial_size = v.parse().unwrap_or(ds.pool_initial_size);
        }
        if let Ok(v) = env::var("DATASOURCE_POOL_MAX_SIZE") {
            ds.pool_max_size = v.parse().unwrap_or(ds.pool_max_size);
        }
        if let Ok(v) = env::var("DATASOURCE_CONNECTION_TIMEOUT_MS") {
            ds.connection_timeout_ms = v.parse().unwrap_or(ds.connection_timeout_ms);
        }
        if let Ok(v) = env::var("DATASOURCE_CONNECTION_IDLE_LIMIT_SECS") {
            ds.connection_idle_limit_secs = v.parse().unwrap_or(ds.connection_idle_limit_secs);
        }
        if let Ok(v) = env::var("DATASOURCE_VALIDATE_ON_ACQUIRE") {
            ds.validate_on_acquire = v.parse().unwrap_or(ds.validate_on_acquire);
        }

        // Logging thresholds
        if let Ok(v) = env::var("DATASOURCE_LOG_QUERY_EXECUTION_LONGER_THAN_MS") {
            ds.log_query_execution_longer_than_ms =
                parse_threshold(&v).unwrap_or(ds.log_query_execution_longer_than_ms);
        }
        if let Ok(v) = env::var("DATASOURCE_LOG_CONNECTION_LONGER_THAN_MS") {
            ds.log_connection_longer_than_ms =
                parse_threshold(&v).unwrap_or(ds.log_connection_longer_than_ms);
        }
        if let Ok(v) = env::var("DATASOURCE_LOG_LARGE_RESULT_SET") {
            ds.log_large_result_set = parse_threshold(&v)
                .map(|t| t.map(|n| n as usize))
                .unwrap_or(ds.log_large_result_set);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            datasource: DataSourceConfig {
                database_url: "mysql://localhost:3306/jdbc_db".to_string(),
                admin_database: None,
                username: Some("root".to_string()),
                password: Some("123456".to_string()),
                pool_initial_size: 2,
                pool_max_size: 10,
                connection_timeout_ms: 5000,
                connection_idle_limit_secs: 120,
                validate_on_acquire: true,
                log_query_execution_longer_than_ms: Some(0),
                log_connection_longer_than_ms: Some(0),
                log_large_result_set: Some(2),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            datasource: DataSourceConfig {
                database_url: "mysql://localhost:3306/jdbc_db".to_string(),
                admin_database: None,
                username: None,
                password: None,
                pool_initial_size: 2,
                pool_max_size: 20,
                connection_timeout_ms: 10_000,
                connection_idle_limit_secs: 300,
                validate_on_acquire: true,
                log_query_execution_longer_than_ms: Some(500),
                log_connection_longer_than_ms: Some(1000),
                log_large_result_set: Some(500),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            datasource: DataSourceConfig {
                database_url: "mysql://localhost:3306/jdbc_db".to_string(),
                admin_database: None,
                username: None,
                password: None,
                pool_initial_size: 5,
                pool_max_size: 50,
                connection_timeout_ms: 5000,
                connection_idle_limit_secs: 600,
                validate_on_acquire: false,
                log_query_execution_longer_than_ms: Some(3000),
                log_connection_longer_than_ms: Some(3000),
                log_large_result_set: Some(500),
            },
        }
    }
}

impl DataSourceConfig {
    /// Connection string for the configured database, with credentials applied
    pub fn connection_string(&self) -> Result<String, DataSourceError> {
        let url = self.base_url()?;
        Ok(url.into())
    }

    /// Connection string for server-level statements: the path is swapped for
    /// `admin_database`, or emptied when none is configured
    pub fn admin_connection_string(&self) -> Result<String, DataSourceError> {
        let mut url = self.base_url()?;
        match &self.admin_database {
            Some(name) => url.set_path(&format!("/{}", name)),
            None => url.set_path(""),
        }
        Ok(url.into())
    }

    fn base_url(&self) -> Result<url::Url, DataSourceError> {
        if self.database_url.is_empty() {
            return Err(DataSourceError::ConfigMissing("DATABASE_URL"));
        }

        let mut url = url::Url::parse(&self.database_url)
            .map_err(|e| DataSourceError::InvalidDatabaseUrl(e.to_string()))?;

        if let Some(username) = &self.username {
            url.set_username(username)
                .map_err(|_| DataSourceError::InvalidDatabaseUrl("URL cannot carry a username".to_string()))?;
        }
        if let Some(password) = &self.password {
            url.set_password(Some(password))
                .map_err(|_| DataSourceError::InvalidDatabaseUrl("URL cannot carry a password".to_string()))?;
        }

        Ok(url)
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.connection_timeout_ms)
    }

    pub fn idle_limit(&self) -> Duration {
        Duration::from_secs(self.connection_idle_limit_secs)
    }
}

/// Parse an optional threshold: "off" or a negative number disables it.
/// Returns None when the value is not understood so the caller keeps its default.
fn parse_threshold(value: &str) -> Option<Option<u64>> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("off") || value.eq_ignore_ascii_case("none") {
        return Some(None);
    }
    match value.parse::<i64>() {
        Ok(n) if n < 0 => Some(None),
        Ok(n) => Some(Some(n as u64)),
        Err(_) => None,
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
