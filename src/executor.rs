//! Count round-trip execution.
//!
//! The interceptor issues exactly one scalar query per counted page. The
//! round trip goes through [`ScalarExecutor`] so the pipeline stays testable
//! against a stub; the sqlx pool implementations below are what production
//! callers hand in. Connection acquisition, release and cancellation are the
//! pool's concern; the rewrite layer never holds a connection across a
//! statement.

use std::future::Future;

use crate::error::RewriteResult;

/// A parameter carried from the caller's statement into the count query.
///
/// The count SQL shares the original statement's WHERE clause, so it binds
/// the same parameters in the same order.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    String(String),
    I32(i32),
    I64(i64),
    F64(f64),
    Bool(bool),
}

/// Executes a single-row, single-column `i64` query.
///
/// Used solely for the count round trip. Implementations acquire and release
/// their connection within the call; a cancelled caller drops the returned
/// future and with it the in-flight acquisition.
pub trait ScalarExecutor {
    /// Runs `sql` with `params` bound in order and returns the first column
    /// of the first row.
    fn fetch_scalar(
        &self,
        sql: &str,
        params: &[BindValue],
    ) -> impl Future<Output = RewriteResult<i64>> + Send;
}

#[cfg(feature = "postgres")]
impl ScalarExecutor for sqlx::PgPool {
    async fn fetch_scalar(&self, sql: &str, params: &[BindValue]) -> RewriteResult<i64> {
        let mut query = sqlx::query_scalar::<_, i64>(sql);
        for param in params {
            query = match param {
                BindValue::String(s) => query.bind(s.clone()),
                BindValue::I32(v) => query.bind(*v),
                BindValue::I64(v) => query.bind(*v),
                BindValue::F64(v) => query.bind(*v),
                BindValue::Bool(v) => query.bind(*v),
            };
        }
        Ok(query.fetch_one(self).await?)
    }
}

#[cfg(feature = "mysql")]
impl ScalarExecutor for sqlx::MySqlPool {
    async fn fetch_scalar(&self, sql: &str, params: &[BindValue]) -> RewriteResult<i64> {
        let mut query = sqlx::query_scalar::<_, i64>(sql);
        for param in params {
            query = match param {
                BindValue::String(s) => query.bind(s.clone()),
                BindValue::I32(v) => query.bind(*v),
                BindValue::I64(v) => query.bind(*v),
                BindValue::F64(v) => query.bind(*v),
                BindValue::Bool(v) => query.bind(*v),
            };
        }
        Ok(query.fetch_one(self).await?)
    }
}

#[cfg(feature = "sqlite")]
impl ScalarExecutor for sqlx::SqlitePool {
    async fn fetch_scalar(&self, sql: &str, params: &[BindValue]) -> RewriteResult<i64> {
        let mut query = sqlx::query_scalar::<_, i64>(sql);
        for param in params {
            query = match param {
                BindValue::String(s) => query.bind(s.clone()),
                BindValue::I32(v) => query.bind(*v),
                BindValue::I64(v) => query.bind(*v),
                BindValue::F64(v) => query.bind(*v),
                BindValue::Bool(v) => query.bind(*v),
            };
        }
        Ok(query.fetch_one(self).await?)
    }
}
