//! Configuration surface recognized by the interceptor.

use serde::Deserialize;

/// How the count query is derived from the caller's SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountOptimization {
    /// Try the optimized `SELECT COUNT(*) FROM ...` rewrite, falling back to
    /// subquery wrapping when the rewrite would change the count.
    #[default]
    Default,
    /// Always wrap the original statement as a counted subquery.
    Off,
}

/// Options consumed by [`QueryInterceptor`](crate::interceptor::QueryInterceptor).
///
/// `dialect` names a built-in pagination dialect; when it is unset,
/// `dialect_impl` names a pluggable implementation registered through
/// [`register_dialect`](crate::dialect::register_dialect). If neither
/// resolves, interception of paginated statements fails with
/// [`RewriteError::Configuration`](crate::error::RewriteError::Configuration).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Built-in dialect identifier: "mysql", "postgresql", "sqlite",
    /// "oracle" or "sqlserver".
    pub dialect: Option<String>,
    /// Name of a registered pluggable dialect, consulted when `dialect`
    /// is unset.
    pub dialect_impl: Option<String>,
    /// When the requested page lies beyond the last page, restart from
    /// page 1 instead of returning an empty tail page.
    pub overflow_reset_to_first_page: bool,
    /// Count derivation strategy.
    pub count_optimization: CountOptimization,
}
