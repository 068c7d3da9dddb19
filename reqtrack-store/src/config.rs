//! Database target configuration.
//!
//! Targets are declared up front as a static list; the pool registry creates
//! one pool per target on first use and unknown names never connect.

use std::time::Duration;

use sqlx::postgres::PgConnectOptions;

use crate::error::{StoreError, StoreResult};

/// Pool name for the project-request database. Wire constant shared with
/// every caller that resolves this target.
pub const PROJECT_REQUEST_POOL: &str = "projectRequest";

/// Default maximum connections per pool.
/// Kept low; the workload is many short procedure calls, not fan-out scans.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Statement timeout applied to service (non-interactive) targets.
const SERVICE_STATEMENT_TIMEOUT: Duration = Duration::from_secs(360);

/// One logical database target and its credentials.
#[derive(Debug, Clone)]
pub struct DbTarget {
    pub pool_name: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    /// Server-side statement timeout; None leaves the server default.
    pub statement_timeout: Option<Duration>,
}

impl DbTarget {
    /// Target reached with end-user credentials. Runaway statements are
    /// bounded by server policy, not by this client.
    pub fn authenticated(
        pool_name: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            pool_name: pool_name.into(),
            host: host.into(),
            port,
            database: database.into(),
            user: user.into(),
            password: password.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            statement_timeout: None,
        }
    }

    /// Target reached with a service account; gets the fixed statement
    /// timeout so an unattended query cannot hold a connection forever.
    pub fn service(
        pool_name: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            statement_timeout: Some(SERVICE_STATEMENT_TIMEOUT),
            ..Self::authenticated(pool_name, host, port, database, user, password)
        }
    }

    pub(crate) fn pg_options(&self) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password);
        if let Some(timeout) = self.statement_timeout {
            let millis = timeout.as_millis().to_string();
            options = options.options([("statement_timeout", millis.as_str())]);
        }
        options
    }
}

/// The static per-target configuration list.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub targets: Vec<DbTarget>,
}

impl DbConfig {
    pub fn new(targets: Vec<DbTarget>) -> Self {
        Self { targets }
    }

    /// Load the project-request target from the environment.
    ///
    /// Reads DB_SERVER, DB_DATABASE, DB_USER, DB_PASSWORD, and optionally
    /// DB_PORT (default 5432). A `.env` file is honored when present.
    pub fn from_env() -> StoreResult<Self> {
        dotenvy::dotenv().ok();

        let host = require_env("DB_SERVER")?;
        let database = require_env("DB_DATABASE")?;
        let user = require_env("DB_USER")?;
        let password = require_env("DB_PASSWORD")?;
        let port = match std::env::var("DB_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| StoreError::config(format!("DB_PORT is not a port: '{raw}'")))?,
            Err(_) => 5432,
        };

        Ok(Self::new(vec![DbTarget::authenticated(
            PROJECT_REQUEST_POOL,
            host,
            port,
            database,
            user,
            password,
        )]))
    }
}

fn require_env(key: &str) -> StoreResult<String> {
    std::env::var(key).map_err(|_| StoreError::config(format!("{key} not set")))
}
