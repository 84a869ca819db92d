//! The statement interception point.
//!
//! [`QueryInterceptor::intercept`] is the single surface collaborators call,
//! once per executed statement. Paginated SELECTs run the full pipeline:
//! comment strip, dialect resolution, optional count round trip, LIMIT
//! synthesis, trace footer. Deletes against registered tables are rewritten
//! through the soft-delete generator. Everything else passes through
//! unchanged.
//!
//! The count step is ordered strictly before the main SQL is built: both the
//! zero-total short-circuit and the overflow reset depend on its result. A
//! failed count is fail-open — the total stays unknown and the statement
//! still goes out with its pagination clause, because the count is advisory
//! for display, not load-bearing for correctness.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::comment::strip_comments;
use crate::config::{CountOptimization, RewriteConfig};
use crate::count::build_count_sql;
use crate::dialect::{resolve_dialect, PaginationDialect};
use crate::error::RewriteResult;
use crate::executor::{BindValue, ScalarExecutor};
use crate::page::{PageRequest, PageResult};
use crate::schema::TableRegistry;
use crate::soft_delete::{delete_sql, DeleteOperation};
use crate::trace::{append_trace_footer, TraceInfo};

/// What kind of statement is being intercepted, with the delete predicate
/// for delete statements.
#[derive(Debug, Clone)]
pub enum StatementKind<'a> {
    Select,
    Delete {
        /// Entity kind used to look up table metadata. Unknown entities are
        /// a fatal metadata error.
        entity: &'a str,
        operation: DeleteOperation<'a>,
    },
    Other,
}

/// A statement about to be sent to the database.
///
/// This is the explicit-accessor seam over whatever statement abstraction
/// the runtime provides: the interceptor reads the bound SQL and the
/// attached page request through it and writes the rewritten SQL back,
/// clearing the page request so the runtime's own row-bounds mechanism
/// cannot limit a second time.
pub trait InterceptedStatement {
    fn bound_sql(&self) -> &str;
    fn set_bound_sql(&mut self, sql: String);
    /// The pagination marker. `None` means the SELECT is not paginated.
    fn page_request(&self) -> Option<&PageRequest>;
    /// Disables the statement's original row-bounds after clause pagination
    /// has been applied.
    fn clear_page_request(&mut self);
    /// Parameters bound to the statement, reused by the count query.
    fn bind_params(&self) -> &[BindValue];
}

/// Plain owned implementation of [`InterceptedStatement`], suitable as an
/// adapter target for runtimes that expose statements as raw SQL plus
/// parameters.
#[derive(Debug, Clone, Default)]
pub struct BoundStatement {
    sql: String,
    page: Option<PageRequest>,
    params: Vec<BindValue>,
}

impl BoundStatement {
    pub fn new(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            ..Self::default()
        }
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_params(mut self, params: Vec<BindValue>) -> Self {
        self.params = params;
        self
    }
}

impl InterceptedStatement for BoundStatement {
    fn bound_sql(&self) -> &str {
        &self.sql
    }

    fn set_bound_sql(&mut self, sql: String) {
        self.sql = sql;
    }

    fn page_request(&self) -> Option<&PageRequest> {
        self.page.as_ref()
    }

    fn clear_page_request(&mut self) {
        self.page = None;
    }

    fn bind_params(&self) -> &[BindValue] {
        &self.params
    }
}

/// Outcome of one interception.
#[derive(Debug, Clone)]
pub enum Interception {
    /// Execute `sql` (already written back to the statement). `page` carries
    /// the count outcome for paginated SELECTs.
    Proceed {
        sql: String,
        page: Option<PageResult>,
    },
    /// The count came back zero: skip execution entirely and answer with an
    /// empty result. `page.total()` is 0.
    ShortCircuit { page: PageResult },
}

/// The statement interception point.
///
/// One interceptor is built per configured data source and shared across
/// requests; per-statement state stays on the caller's stack. The resolved
/// dialect is cached after the first paginated statement.
///
/// # Example
///
/// ```ignore
/// use sqlx_query_rewrite::{
///     BoundStatement, PageRequest, QueryInterceptor, RewriteConfig, StatementKind, TableRegistry,
///     TraceInfo,
/// };
///
/// let config = RewriteConfig {
///     dialect: Some("postgresql".to_string()),
///     ..RewriteConfig::default()
/// };
/// let interceptor = QueryInterceptor::new(config, TableRegistry::new());
///
/// let mut stmt = BoundStatement::new("SELECT id, name FROM users ORDER BY id")
///     .with_page(PageRequest::new(2, 50));
/// let outcome = interceptor
///     .intercept(StatementKind::Select, &mut stmt, &pool, &TraceInfo::new("req-9", "3", "appdb"))
///     .await?;
/// ```
pub struct QueryInterceptor {
    config: RewriteConfig,
    tables: TableRegistry,
    dialect: OnceCell<Arc<dyn PaginationDialect>>,
}

impl QueryInterceptor {
    pub fn new(config: RewriteConfig, tables: TableRegistry) -> Self {
        Self {
            config,
            tables,
            dialect: OnceCell::new(),
        }
    }

    /// Intercepts one statement, rewriting its bound SQL in place.
    ///
    /// # Errors
    ///
    /// [`RewriteError::Configuration`](crate::error::RewriteError::Configuration)
    /// when a paginated SELECT arrives and no dialect resolves;
    /// [`RewriteError::Metadata`](crate::error::RewriteError::Metadata) when
    /// a delete names an unregistered entity. Count failures are not errors.
    pub async fn intercept<S, E>(
        &self,
        kind: StatementKind<'_>,
        statement: &mut S,
        executor: &E,
        trace: &TraceInfo,
    ) -> RewriteResult<Interception>
    where
        S: InterceptedStatement,
        E: ScalarExecutor,
    {
        match kind {
            StatementKind::Select => match statement.page_request().cloned() {
                Some(page) => self.paginate(page, statement, executor, trace).await,
                None => Ok(Interception::Proceed {
                    sql: statement.bound_sql().to_string(),
                    page: None,
                }),
            },
            StatementKind::Delete { entity, operation } => {
                let table = self.tables.table_descriptor(entity)?;
                let rewritten = delete_sql(table, &operation);
                let final_sql = append_trace_footer(&rewritten, trace);
                statement.set_bound_sql(final_sql.clone());
                Ok(Interception::Proceed {
                    sql: final_sql,
                    page: None,
                })
            }
            StatementKind::Other => Ok(Interception::Proceed {
                sql: statement.bound_sql().to_string(),
                page: None,
            }),
        }
    }

    /// The pagination pipeline: count first, then clause synthesis.
    async fn paginate<S, E>(
        &self,
        page: PageRequest,
        statement: &mut S,
        executor: &E,
        trace: &TraceInfo,
    ) -> RewriteResult<Interception>
    where
        S: InterceptedStatement,
        E: ScalarExecutor,
    {
        let dialect = self.dialect()?;
        let base_sql = strip_comments(statement.bound_sql()).into_owned();

        let mut result = PageResult::new(page.clone());
        if page.search_count {
            let optimize =
                page.optimize_count && self.config.count_optimization == CountOptimization::Default;
            let outcome = build_count_sql(&base_sql, optimize);
            match executor
                .fetch_scalar(&outcome.count_sql, statement.bind_params())
                .await
            {
                Ok(total) => {
                    result.record_total(total, self.config.overflow_reset_to_first_page);
                    if total == 0 {
                        return Ok(Interception::ShortCircuit { page: result });
                    }
                }
                Err(err) => {
                    // Fail-open: the count sizes a result set for display,
                    // it does not gate the caller's query.
                    tracing::warn!(error = %err, sql = %outcome.count_sql, "count query failed, total unknown");
                }
            }
        }

        // Overflow reset may have moved the request back to page 1.
        let request = result.request().clone();
        let paginated = dialect.build_paginated_sql(&base_sql, request.offset(), request.limit());
        statement.clear_page_request();

        let final_sql = append_trace_footer(&paginated, trace);
        statement.set_bound_sql(final_sql.clone());
        Ok(Interception::Proceed {
            sql: final_sql,
            page: Some(result),
        })
    }

    fn dialect(&self) -> RewriteResult<Arc<dyn PaginationDialect>> {
        if let Some(dialect) = self.dialect.get() {
            return Ok(dialect.clone());
        }
        let resolved = resolve_dialect(&self.config)?;
        Ok(self.dialect.get_or_init(|| resolved).clone())
    }
}
