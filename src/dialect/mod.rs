//! Pagination dialects and their resolution.
//!
//! A [`PaginationDialect`] turns a base SELECT plus an offset/limit pair into
//! the database's native row-limiting syntax. Built-in dialects cover the
//! common databases; anything else is plugged in through the process-wide
//! registry and selected by name via
//! [`RewriteConfig::dialect_impl`](crate::config::RewriteConfig).
//!
//! Resolution is strict: when neither a built-in identifier nor a registered
//! implementation matches, the call fails with
//! [`RewriteError::Configuration`](crate::error::RewriteError::Configuration).
//! Guessing a dialect would paginate with the wrong syntax and silently
//! corrupt result sets, which is worse than failing loudly.

mod builtin;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

pub use builtin::{MySqlDialect, OracleDialect, PostgresDialect, SqlServerDialect, SqliteDialect};

use crate::config::RewriteConfig;
use crate::error::{RewriteError, RewriteResult};

/// Builds database-native pagination SQL from a base statement.
///
/// Implementations must be pure: same inputs, same SQL, no side effects.
/// A resolved dialect instance is cached and shared across concurrent
/// statement rewrites.
pub trait PaginationDialect: Send + Sync {
    /// Wraps or extends `base_sql` so that at most `limit` rows starting at
    /// `offset` are returned.
    fn build_paginated_sql(&self, base_sql: &str, offset: i64, limit: i64) -> String;
}

impl std::fmt::Debug for dyn PaginationDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PaginationDialect")
    }
}

// Pluggable implementations, registered once at startup and looked up by
// name at resolve time.
static DIALECT_REGISTRY: Lazy<RwLock<HashMap<String, Arc<dyn PaginationDialect>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Registers a pluggable dialect under `name` for resolution through
/// [`RewriteConfig::dialect_impl`](crate::config::RewriteConfig).
///
/// Later registrations under the same name replace earlier ones.
pub fn register_dialect(name: &str, dialect: Arc<dyn PaginationDialect>) {
    DIALECT_REGISTRY
        .write()
        .expect("dialect registry poisoned")
        .insert(name.to_string(), dialect);
}

/// Resolves the dialect named by `config`.
///
/// The built-in `dialect` identifier wins; `dialect_impl` is consulted only
/// when no identifier is set. Unknown names and an empty configuration are
/// both fatal.
///
/// # Errors
///
/// Returns [`RewriteError::Configuration`] when nothing resolves.
pub fn resolve_dialect(config: &RewriteConfig) -> RewriteResult<Arc<dyn PaginationDialect>> {
    if let Some(id) = config.dialect.as_deref() {
        return match id.to_ascii_lowercase().as_str() {
            "mysql" => Ok(Arc::new(MySqlDialect)),
            "postgresql" | "postgres" => Ok(Arc::new(PostgresDialect)),
            "sqlite" => Ok(Arc::new(SqliteDialect)),
            "oracle" => Ok(Arc::new(OracleDialect)),
            "sqlserver" => Ok(Arc::new(SqlServerDialect)),
            other => Err(RewriteError::Configuration(format!(
                "unknown dialect identifier '{other}'"
            ))),
        };
    }
    if let Some(name) = config.dialect_impl.as_deref() {
        return DIALECT_REGISTRY
            .read()
            .expect("dialect registry poisoned")
            .get(name)
            .cloned()
            .ok_or_else(|| {
                RewriteError::Configuration(format!("dialect implementation '{name}' is not registered"))
            });
    }
    Err(RewriteError::Configuration(
        "neither dialect nor dialect_impl is set".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ReverseLimit;

    impl PaginationDialect for ReverseLimit {
        fn build_paginated_sql(&self, base_sql: &str, offset: i64, limit: i64) -> String {
            format!("{base_sql} FETCH {limit} SKIP {offset}")
        }
    }

    fn config_with_dialect(id: &str) -> RewriteConfig {
        RewriteConfig {
            dialect: Some(id.to_string()),
            ..RewriteConfig::default()
        }
    }

    #[test]
    fn test_builtin_resolution() {
        let dialect = resolve_dialect(&config_with_dialect("mysql")).unwrap();
        assert_eq!(
            dialect.build_paginated_sql("SELECT * FROM t", 20, 10),
            "SELECT * FROM t LIMIT 20,10"
        );
    }

    #[test]
    fn test_identifier_is_case_insensitive() {
        assert!(resolve_dialect(&config_with_dialect("PostgreSQL")).is_ok());
    }

    #[test]
    fn test_unknown_identifier_is_fatal() {
        let err = resolve_dialect(&config_with_dialect("dbase")).unwrap_err();
        assert!(matches!(err, RewriteError::Configuration(_)));
    }

    #[test]
    fn test_empty_config_is_fatal() {
        let err = resolve_dialect(&RewriteConfig::default()).unwrap_err();
        assert!(matches!(err, RewriteError::Configuration(_)));
    }

    #[test]
    fn test_registered_implementation_resolution() {
        register_dialect("reverse-limit", Arc::new(ReverseLimit));
        let config = RewriteConfig {
            dialect_impl: Some("reverse-limit".to_string()),
            ..RewriteConfig::default()
        };
        let dialect = resolve_dialect(&config).unwrap();
        assert_eq!(
            dialect.build_paginated_sql("SELECT 1", 5, 5),
            "SELECT 1 FETCH 5 SKIP 5"
        );
    }

    #[test]
    fn test_unregistered_implementation_is_fatal() {
        let config = RewriteConfig {
            dialect_impl: Some("nope".to_string()),
            ..RewriteConfig::default()
        };
        assert!(matches!(
            resolve_dialect(&config),
            Err(RewriteError::Configuration(_))
        ));
    }
}
