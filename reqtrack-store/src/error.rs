//! Error types for reqtrack-store

use reqtrack_core::CoreError;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("pool '{pool}' unavailable: {reason}")]
    PoolUnavailable { pool: String, reason: String },

    #[error("query failed ({description}): {source}")]
    QueryFailed {
        description: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("procedure {procedure} failed: {source}")]
    ProcedureFailed {
        procedure: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("transaction on {procedure} rolled back: {source}")]
    TransactionFailed {
        procedure: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Rollback itself failed; the rollback error wins over the original.
    #[error("rollback failed for {procedure}: {source}")]
    RollbackFailed {
        procedure: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("no transition for action {action} from status {status} as role {role}")]
    NoTransitionAvailable { action: i32, status: i32, role: i32 },

    #[error("procedure {procedure} parameter shape mismatch: {detail}")]
    ParameterShape {
        procedure: &'static str,
        detail: String,
    },

    #[error("procedure {procedure} returned no rows")]
    EmptyResult { procedure: &'static str },

    #[error("decoding {procedure} result: {source}")]
    Decode {
        procedure: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("configuration error: {reason}")]
    Config { reason: String },

    #[error(transparent)]
    Codec(#[from] CoreError),
}

impl StoreError {
    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config { reason: reason.into() }
    }

    pub(crate) fn pool_unavailable(pool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PoolUnavailable { pool: pool.into(), reason: reason.into() }
    }
}
