//! Built-in pagination dialects.
//!
//! Each builder takes the already-rewritten base statement and appends or
//! wraps with the database's native row-limiting syntax. Offsets and limits
//! are always rendered as literals; they are derived from
//! [`PageRequest`](crate::page::PageRequest) arithmetic, never from caller
//! text.

use super::PaginationDialect;

/// `LIMIT offset,limit` form.
pub struct MySqlDialect;

impl PaginationDialect for MySqlDialect {
    fn build_paginated_sql(&self, base_sql: &str, offset: i64, limit: i64) -> String {
        if offset == 0 {
            format!("{base_sql} LIMIT {limit}")
        } else {
            format!("{base_sql} LIMIT {offset},{limit}")
        }
    }
}

/// `LIMIT limit OFFSET offset` form.
pub struct PostgresDialect;

impl PaginationDialect for PostgresDialect {
    fn build_paginated_sql(&self, base_sql: &str, offset: i64, limit: i64) -> String {
        format!("{base_sql} LIMIT {limit} OFFSET {offset}")
    }
}

/// SQLite accepts the same `LIMIT ... OFFSET ...` form as PostgreSQL.
pub struct SqliteDialect;

impl PaginationDialect for SqliteDialect {
    fn build_paginated_sql(&self, base_sql: &str, offset: i64, limit: i64) -> String {
        format!("{base_sql} LIMIT {limit} OFFSET {offset}")
    }
}

/// Classic ROWNUM double wrap for Oracle versions without OFFSET/FETCH.
pub struct OracleDialect;

impl PaginationDialect for OracleDialect {
    fn build_paginated_sql(&self, base_sql: &str, offset: i64, limit: i64) -> String {
        format!(
            "SELECT * FROM (SELECT TMP.*, ROWNUM ROW_ID FROM ({base_sql}) TMP WHERE ROWNUM <= {}) WHERE ROW_ID > {offset}",
            offset + limit
        )
    }
}

/// `OFFSET ... ROWS FETCH NEXT ... ROWS ONLY` (SQL Server 2012+). The
/// statement must carry an ORDER BY for this syntax to be accepted; that is
/// the caller's contract with SQL Server, not something the rewriter checks.
pub struct SqlServerDialect;

impl PaginationDialect for SqlServerDialect {
    fn build_paginated_sql(&self, base_sql: &str, offset: i64, limit: i64) -> String {
        format!("{base_sql} OFFSET {offset} ROWS FETCH NEXT {limit} ROWS ONLY")
    }
}
