//! Statement execution against named pools.
//!
//! Three operations: ad hoc queries, single stored-procedure calls, and
//! multi-statement transactions. Writes only go through stored procedures,
//! which keeps the SQL surface centralized and auditable. The transaction
//! primitive takes one procedure and many input sets because every write
//! batch in this domain is homogeneous (N stakeholder rows, N objective
//! rows, N task rows).

use std::sync::Arc;

use sqlx::postgres::PgRow;
use tracing::error;

use crate::catalog::Procedure;
use crate::error::{StoreError, StoreResult};
use crate::params::{bind_value, ProcParam};
use crate::pool::PoolRegistry;

/// One result set, in server row order.
pub type RowSet = Vec<PgRow>;

/// Ordered result sets of one procedure call.
#[derive(Debug)]
pub struct ProcedureOutput {
    sets: Vec<RowSet>,
}

impl ProcedureOutput {
    pub fn sets(&self) -> &[RowSet] {
        &self.sets
    }

    pub fn into_sets(self) -> Vec<RowSet> {
        self.sets
    }

    /// Result set by position. Positions are a fixed per-procedure contract.
    pub fn set(&self, index: usize) -> Option<&RowSet> {
        self.sets.get(index)
    }

    /// First row of the first result set.
    pub fn first_row(&self) -> Option<&PgRow> {
        self.sets.first().and_then(|rows| rows.first())
    }
}

/// Executes requests against pools resolved from the shared registry.
#[derive(Clone)]
pub struct Executor {
    registry: Arc<PoolRegistry>,
}

impl Executor {
    pub fn new(registry: Arc<PoolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    /// Run one literal statement and return its rows.
    pub async fn query(
        &self,
        pool_name: &str,
        description: &str,
        statement: &str,
    ) -> StoreResult<RowSet> {
        let pool = self.registry.get(pool_name).await?;
        sqlx::query(statement).fetch_all(&pool).await.map_err(|source| {
            error!(description, error = %source, "query failed");
            StoreError::QueryFailed { description: description.to_string(), source }
        })
    }

    /// Call one stored procedure and return its ordered result sets.
    ///
    /// Parameters are checked against the catalog shape first, then every
    /// one is bound in declared order, NULLs included. Multi-set routines
    /// hand back cursors which are drained in return order; cursors only
    /// live inside a transaction, so the call runs in one either way.
    pub async fn call(
        &self,
        pool_name: &str,
        procedure: Procedure,
        params: &[ProcParam],
    ) -> StoreResult<ProcedureOutput> {
        check_shape(procedure, params)?;
        let pool = self.registry.get(pool_name).await?;

        let mut tx = pool
            .begin()
            .await
            .map_err(|source| procedure_failed(procedure, source))?;

        let rows = run_call(&mut *tx, procedure, params)
            .await
            .map_err(|source| procedure_failed(procedure, source))?;

        let sets = if procedure.returns_cursors() {
            let mut sets = Vec::with_capacity(rows.len());
            for row in &rows {
                let cursor: String = sqlx::Row::try_get(row, 0)
                    .map_err(|source| StoreError::Decode { procedure: procedure.name(), source })?;
                let fetch = format!("FETCH ALL FROM \"{}\"", cursor.replace('"', "\"\""));
                let set = sqlx::query(&fetch)
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(|source| procedure_failed(procedure, source))?;
                sets.push(set);
            }
            sets
        } else {
            vec![rows]
        };

        tx.commit()
            .await
            .map_err(|source| procedure_failed(procedure, source))?;

        Ok(ProcedureOutput { sets })
    }

    /// Call `procedure` once per input batch, all inside one transaction on
    /// one connection, in batch order. All-or-nothing: any failure rolls
    /// the whole batch back, and a rollback failure wins over the original
    /// error. An empty batch list commits trivially.
    pub async fn transact(
        &self,
        pool_name: &str,
        procedure: Procedure,
        batches: &[Vec<ProcParam>],
    ) -> StoreResult<()> {
        for batch in batches {
            check_shape(procedure, batch)?;
        }
        let pool = self.registry.get(pool_name).await?;

        let mut tx = pool
            .begin()
            .await
            .map_err(|source| transaction_failed(procedure, source))?;

        for batch in batches {
            if let Err(source) = run_call(&mut *tx, procedure, batch).await {
                error!(
                    procedure = procedure.name(),
                    error = %source,
                    "transaction batch failed, rolling back"
                );
                return Err(match tx.rollback().await {
                    Ok(()) => transaction_failed(procedure, source),
                    Err(rollback) => {
                        error!(
                            procedure = procedure.name(),
                            error = %rollback,
                            "rollback failed"
                        );
                        StoreError::RollbackFailed { procedure: procedure.name(), source: rollback }
                    }
                });
            }
        }

        tx.commit()
            .await
            .map_err(|source| transaction_failed(procedure, source))
    }
}

fn procedure_failed(procedure: Procedure, source: sqlx::Error) -> StoreError {
    error!(procedure = procedure.name(), error = %source, "procedure failed");
    StoreError::ProcedureFailed { procedure: procedure.name(), source }
}

fn transaction_failed(procedure: Procedure, source: sqlx::Error) -> StoreError {
    StoreError::TransactionFailed { procedure: procedure.name(), source }
}

fn check_shape(procedure: Procedure, params: &[ProcParam]) -> StoreResult<()> {
    let expected = procedure.params();
    if params.len() != expected.len() {
        return Err(StoreError::ParameterShape {
            procedure: procedure.name(),
            detail: format!("expected {} parameters, got {}", expected.len(), params.len()),
        });
    }
    for (param, want) in params.iter().zip(expected) {
        if param.name != *want {
            return Err(StoreError::ParameterShape {
                procedure: procedure.name(),
                detail: format!("expected parameter '{}', got '{}'", want, param.name),
            });
        }
    }
    Ok(())
}

async fn run_call<'e, E>(
    executor: E,
    procedure: Procedure,
    params: &[ProcParam],
) -> Result<Vec<PgRow>, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    let sql = call_sql(procedure, params.len());
    let mut query = sqlx::query(&sql);
    for param in params {
        query = bind_value(query, &param.value);
    }
    query.fetch_all(executor).await
}

/// Routines are invoked as set-returning functions. Names keep their exact
/// legacy spelling, hence the quoting. Cursor-returning routines get their
/// cursor names cast to text so decoding does not depend on the refcursor
/// type mapping.
fn call_sql(procedure: Procedure, param_count: usize) -> String {
    let placeholders: Vec<String> = (1..=param_count).map(|i| format!("${i}")).collect();
    let args = placeholders.join(", ");
    if procedure.returns_cursors() {
        format!("SELECT x::text FROM \"{}\"({}) AS x", procedure.name(), args)
    } else {
        format!("SELECT * FROM \"{}\"({})", procedure.name(), args)
    }
}
