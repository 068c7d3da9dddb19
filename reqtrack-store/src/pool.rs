//! Named connection-pool registry.
//!
//! One pool per configured target, created on first use and shared for the
//! process lifetime. Creation is single-flight: the first caller publishes an
//! in-flight handle and concurrent callers await it. A failed connect leaves
//! the slot empty so the next caller retries; a successful connect is final.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::config::{DbConfig, DbTarget};
use crate::error::{StoreError, StoreResult};

/// Establishes the pool for one target.
///
/// Separated behind a trait so registry behavior is testable without a
/// server.
#[async_trait]
pub trait PoolConnector: Send + Sync {
    async fn connect(&self, target: &DbTarget) -> Result<PgPool, sqlx::Error>;
}

/// Production connector. Connects eagerly so credential and network
/// failures surface on the call that triggered creation.
pub struct PgConnector;

#[async_trait]
impl PoolConnector for PgConnector {
    async fn connect(&self, target: &DbTarget) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(target.max_connections)
            .connect_with(target.pg_options())
            .await
    }
}

struct PoolSlot {
    target: DbTarget,
    cell: OnceCell<PgPool>,
}

/// Registry of named pools. Owned explicitly and shared by reference;
/// tolerates concurrent `get` calls for the same or different names.
pub struct PoolRegistry {
    slots: HashMap<String, PoolSlot>,
    connector: Arc<dyn PoolConnector>,
}

impl PoolRegistry {
    pub fn new(config: DbConfig) -> Self {
        Self::with_connector(config, Arc::new(PgConnector))
    }

    pub fn with_connector(config: DbConfig, connector: Arc<dyn PoolConnector>) -> Self {
        let slots = config
            .targets
            .into_iter()
            .map(|target| {
                (target.pool_name.clone(), PoolSlot { target, cell: OnceCell::new() })
            })
            .collect();
        Self { slots, connector }
    }

    /// Resolve the pool for `name`, creating it on first use.
    ///
    /// A name outside the configured target list fails immediately; it is
    /// not a condition that retrying can fix.
    pub async fn get(&self, name: &str) -> StoreResult<PgPool> {
        let slot = self
            .slots
            .get(name)
            .ok_or_else(|| StoreError::pool_unavailable(name, "not in configuration"))?;

        let pool = slot
            .cell
            .get_or_try_init(|| async {
                match self.connector.connect(&slot.target).await {
                    Ok(pool) => {
                        info!(pool = %slot.target.pool_name, "database pool connected");
                        Ok(pool)
                    }
                    Err(err) => {
                        error!(
                            pool = %slot.target.pool_name,
                            error = %err,
                            "database pool connection failed"
                        );
                        Err(err)
                    }
                }
            })
            .await
            .map_err(|err| StoreError::pool_unavailable(name, err.to_string()))?;

        Ok(pool.clone())
    }

    /// Names this registry can resolve.
    pub fn pool_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }
}
