//! # sqlx_query_rewrite
//!
//! A query-rewriting layer that sits between an application's logical
//! data-access calls and the SQL actually sent through sqlx:
//!
//! - **Pagination**: paginated SELECTs get dialect-native LIMIT/OFFSET
//!   syntax, with an optional optimized `COUNT(*)` round trip executed
//!   first. A zero total short-circuits the main query; a failed count
//!   degrades to an unknown total instead of failing the call.
//! - **Soft delete**: DELETEs against tables with logical-delete flag
//!   columns are rewritten into tombstoning UPDATEs with the identical
//!   WHERE predicate.
//! - **Trace footer**: final SQL carries an idempotent single-line comment
//!   correlating the statement with the originating request in DB logs.
//!
//! [`QueryInterceptor::intercept`](interceptor::QueryInterceptor::intercept)
//! is the single integration surface; see its docs for the pipeline.

pub mod comment;
pub mod config;
pub mod count;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod interceptor;
pub mod page;
pub mod schema;
pub mod soft_delete;
pub mod trace;

pub use comment::strip_comments;
pub use config::{CountOptimization, RewriteConfig};
pub use count::{build_count_sql, CountOutcome};
pub use dialect::{register_dialect, PaginationDialect};
pub use error::{RewriteError, RewriteResult};
pub use executor::{BindValue, ScalarExecutor};
pub use interceptor::{
    BoundStatement, InterceptedStatement, Interception, QueryInterceptor, StatementKind,
};
pub use page::{PageRequest, PageResult};
pub use schema::{ColumnDescriptor, ColumnKind, TableDescriptor, TableRegistry};
pub use soft_delete::{delete_sql, DeleteOperation, SqlValue};
pub use trace::{append_trace_footer, ProcessIdentity, TraceInfo};
