//! Typed parameter values for stored-procedure calls.
//!
//! Every declared parameter is always bound, absent values included: a
//! skipped binding would shift the remaining positional slots server-side,
//! so absence travels as a typed NULL.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

/// Postgres type a parameter carries when its value is NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlKind {
    BigInt,
    Int,
    Float,
    Text,
    Bool,
    Timestamp,
}

/// One typed parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    BigInt(i64),
    Int(i32),
    Float(f64),
    Text(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Null(SqlKind),
}

impl SqlValue {
    pub fn opt_text(value: Option<&str>) -> Self {
        match value {
            Some(text) => Self::Text(text.to_string()),
            None => Self::Null(SqlKind::Text),
        }
    }

    pub fn opt_bigint(value: Option<i64>) -> Self {
        match value {
            Some(n) => Self::BigInt(n),
            None => Self::Null(SqlKind::BigInt),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::BigInt(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// Direction of a procedure parameter.
///
/// Outputs are bound INOUT style: the declared type and initial value still
/// occupy their positional slot, and the final value comes back in the
/// first result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDirection {
    Input,
    Output,
}

/// A named, directed parameter for one procedure call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcParam {
    pub name: &'static str,
    pub value: SqlValue,
    pub direction: ParamDirection,
}

impl ProcParam {
    pub fn input(name: &'static str, value: impl Into<SqlValue>) -> Self {
        Self { name, value: value.into(), direction: ParamDirection::Input }
    }

    pub fn output(name: &'static str, value: impl Into<SqlValue>) -> Self {
        Self { name, value: value.into(), direction: ParamDirection::Output }
    }
}

/// Bind one value onto a query, NULLs with their declared type.
pub(crate) fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::BigInt(v) => query.bind(*v),
        SqlValue::Int(v) => query.bind(*v),
        SqlValue::Float(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.clone()),
        SqlValue::Bool(v) => query.bind(*v),
        SqlValue::Timestamp(v) => query.bind(*v),
        SqlValue::Null(SqlKind::BigInt) => query.bind(None::<i64>),
        SqlValue::Null(SqlKind::Int) => query.bind(None::<i32>),
        SqlValue::Null(SqlKind::Float) => query.bind(None::<f64>),
        SqlValue::Null(SqlKind::Text) => query.bind(None::<String>),
        SqlValue::Null(SqlKind::Bool) => query.bind(None::<bool>),
        SqlValue::Null(SqlKind::Timestamp) => query.bind(None::<DateTime<Utc>>),
    }
}
