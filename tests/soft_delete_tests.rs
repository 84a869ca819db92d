// Delete interception: soft-delete rewriting for tables carrying
// logical-delete flags, physical delete for tables without, fatal metadata
// error for unknown entities.

use std::sync::atomic::{AtomicUsize, Ordering};

use sqlx_query_rewrite::{
    BindValue, BoundStatement, ColumnDescriptor, ColumnKind, Interception, InterceptedStatement,
    DeleteOperation, QueryInterceptor, RewriteConfig, RewriteError, RewriteResult, ScalarExecutor,
    SqlValue, StatementKind, TableDescriptor, TableRegistry, TraceInfo,
};

#[derive(Default)]
struct NeverCalledExecutor {
    calls: AtomicUsize,
}

impl ScalarExecutor for NeverCalledExecutor {
    async fn fetch_scalar(&self, _sql: &str, _params: &[BindValue]) -> RewriteResult<i64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(0)
    }
}

fn registry() -> TableRegistry {
    let mut registry = TableRegistry::new();
    registry.register(
        "user",
        TableDescriptor::new(
            "users",
            "id",
            vec![
                ColumnDescriptor::new("id", ColumnKind::Numeric),
                ColumnDescriptor::new("name", ColumnKind::Text),
                ColumnDescriptor::logical_delete("deleted", ColumnKind::Text, "1"),
            ],
        ),
    );
    registry.register(
        "event",
        TableDescriptor::new(
            "events",
            "id",
            vec![ColumnDescriptor::new("id", ColumnKind::Numeric)],
        ),
    );
    registry
}

fn interceptor() -> QueryInterceptor {
    let config = RewriteConfig {
        dialect: Some("mysql".to_string()),
        ..RewriteConfig::default()
    };
    QueryInterceptor::new(config, registry())
}

fn trace() -> TraceInfo {
    TraceInfo::with_process_id("req-7", "100@10.0.0.1", "2", "appdb")
}

async fn intercept_delete(entity: &str, operation: DeleteOperation<'_>) -> Result<String, RewriteError> {
    let executor = NeverCalledExecutor::default();
    let mut stmt = BoundStatement::new("DELETE FROM placeholder");
    let outcome = interceptor()
        .intercept(
            StatementKind::Delete { entity, operation },
            &mut stmt,
            &executor,
            &trace(),
        )
        .await?;
    assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    match outcome {
        Interception::Proceed { sql, page } => {
            assert!(page.is_none());
            assert_eq!(stmt.bound_sql(), sql);
            Ok(sql)
        }
        Interception::ShortCircuit { .. } => panic!("deletes never short-circuit"),
    }
}

#[tokio::test]
async fn soft_delete_by_id_becomes_update() {
    let sql = intercept_delete("user", DeleteOperation::ById(SqlValue::Number(42)))
        .await
        .unwrap();
    assert!(sql
        .to_lowercase()
        .starts_with("update users set deleted='1' where id=42"));
    assert!(sql.contains("/*from_api:req-7100@10.0.0.1 spid=2 dbname=appdb*/"));
}

#[tokio::test]
async fn table_without_flags_takes_physical_delete() {
    let sql = intercept_delete("event", DeleteOperation::ById(SqlValue::Number(8)))
        .await
        .unwrap();
    assert!(sql.starts_with("DELETE FROM events WHERE id=8"));
}

#[tokio::test]
async fn batch_delete_uses_in_list() {
    let ids = [SqlValue::Number(1), SqlValue::Number(2)];
    let sql = intercept_delete("user", DeleteOperation::ByIdBatch(&ids))
        .await
        .unwrap();
    assert!(sql.starts_with("UPDATE users SET deleted='1' WHERE id IN (1,2)"));
}

#[tokio::test]
async fn map_delete_keeps_conjunction_order() {
    let pairs = [
        ("name".to_string(), SqlValue::text("ada")),
        ("id".to_string(), SqlValue::Number(3)),
    ];
    let sql = intercept_delete("user", DeleteOperation::ByMap(&pairs))
        .await
        .unwrap();
    assert!(sql.starts_with("UPDATE users SET deleted='1' WHERE name='ada' AND id=3"));
}

#[tokio::test]
async fn condition_delete_passes_predicate_through() {
    let sql = intercept_delete("user", DeleteOperation::ByCondition("last_seen < '2019-01-01'"))
        .await
        .unwrap();
    assert!(sql.starts_with("UPDATE users SET deleted='1' WHERE last_seen < '2019-01-01'"));
}

#[tokio::test]
async fn unknown_entity_is_fatal_metadata_error() {
    let err = intercept_delete("ghost", DeleteOperation::ById(SqlValue::Number(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, RewriteError::Metadata(_)));
}

#[tokio::test]
async fn delete_footer_is_idempotent_across_interceptions() {
    let sql = intercept_delete("user", DeleteOperation::ById(SqlValue::Number(42)))
        .await
        .unwrap();
    let again = sqlx_query_rewrite::append_trace_footer(&sql, &trace());
    assert_eq!(sql, again);
}
