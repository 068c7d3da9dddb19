//! reqtrack-store: pooled stored-procedure access for project requests
//!
//! Turns application intents (create a project, assign members, record a
//! status, persist a schedule) into stored-procedure calls against named
//! connection pools, with uniform error translation and all-or-nothing
//! transaction batches. The HTTP surface is an external consumer.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod params;
pub mod pool;
pub mod projects;

pub use catalog::Procedure;
pub use config::{DbConfig, DbTarget};
pub use engine::{Executor, ProcedureOutput, RowSet};
pub use error::{StoreError, StoreResult};
pub use params::{ParamDirection, ProcParam, SqlKind, SqlValue};
pub use pool::{PgConnector, PoolConnector, PoolRegistry};
pub use projects::{PgProjectsDao, ProjectsDao, ProjectsService};
