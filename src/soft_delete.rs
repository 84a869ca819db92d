//! Soft-delete SQL generation.
//!
//! Tables carrying logical-delete flag columns never receive a physical
//! DELETE: the statement is rewritten into an UPDATE that writes each flag's
//! tombstone value, keeping the identifying predicate of the physical delete
//! intact. Tables without any flag column take the physical path unchanged.

use crate::schema::{ColumnKind, TableDescriptor};

/// A literal value rendered into generated delete SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Number(i64),
}

impl SqlValue {
    pub fn text(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }

    fn render(&self) -> String {
        match self {
            // Interior quotes are doubled so a value can never terminate
            // the literal early.
            SqlValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
            SqlValue::Number(n) => n.to_string(),
        }
    }
}

/// The identifying predicate of a delete, shared by the physical and the
/// soft variant.
#[derive(Debug, Clone)]
pub enum DeleteOperation<'a> {
    /// Primary-key equality.
    ById(SqlValue),
    /// Primary-key IN list. An empty list generates `WHERE 1=0`.
    ByIdBatch(&'a [SqlValue]),
    /// Equality conjunction over the given column/value pairs, in the
    /// caller's order.
    ByMap(&'a [(String, SqlValue)]),
    /// Arbitrary caller condition, passed through verbatim.
    ByCondition(&'a str),
}

/// Generates the delete SQL for `table`.
///
/// Soft and physical variants differ only in verb and SET clause; the WHERE
/// clause is identical, so rewriting never alters which rows a delete
/// touches.
pub fn delete_sql(table: &TableDescriptor, op: &DeleteOperation<'_>) -> String {
    let predicate = where_clause(table, op);
    if table.has_logical_delete() {
        format!(
            "UPDATE {} SET {} WHERE {}",
            table.table_name,
            tombstone_set_clause(table),
            predicate
        )
    } else {
        format!("DELETE FROM {} WHERE {}", table.table_name, predicate)
    }
}

/// SET clause writing every logical-delete flag, in table-declaration order.
/// Text-like tombstones are quoted; numeric ones are bare literals.
fn tombstone_set_clause(table: &TableDescriptor) -> String {
    table
        .logical_delete_columns()
        .map(|col| {
            let tombstone = col.tombstone.as_deref().unwrap_or_default();
            match col.kind {
                ColumnKind::Text => format!("{}='{}'", col.name, tombstone.replace('\'', "''")),
                ColumnKind::Numeric => format!("{}={}", col.name, tombstone),
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn where_clause(table: &TableDescriptor, op: &DeleteOperation<'_>) -> String {
    match op {
        DeleteOperation::ById(id) => format!("{}={}", table.key_column, id.render()),
        DeleteOperation::ByIdBatch(ids) => {
            if ids.is_empty() {
                // Empty id list: match nothing rather than everything.
                "1=0".to_string()
            } else {
                let list = ids.iter().map(SqlValue::render).collect::<Vec<_>>().join(",");
                format!("{} IN ({})", table.key_column, list)
            }
        }
        DeleteOperation::ByMap(pairs) => pairs
            .iter()
            .map(|(column, value)| format!("{}={}", column, value.render()))
            .collect::<Vec<_>>()
            .join(" AND "),
        DeleteOperation::ByCondition(condition) => (*condition).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDescriptor;

    fn soft_table() -> TableDescriptor {
        TableDescriptor::new(
            "users",
            "id",
            vec![
                ColumnDescriptor::new("id", ColumnKind::Numeric),
                ColumnDescriptor::new("name", ColumnKind::Text),
                ColumnDescriptor::logical_delete("deleted", ColumnKind::Text, "1"),
            ],
        )
    }

    fn plain_table() -> TableDescriptor {
        TableDescriptor::new(
            "events",
            "id",
            vec![ColumnDescriptor::new("id", ColumnKind::Numeric)],
        )
    }

    #[test]
    fn test_soft_delete_by_id() {
        let sql = delete_sql(&soft_table(), &DeleteOperation::ById(SqlValue::Number(42)));
        assert_eq!(sql.to_lowercase(), "update users set deleted='1' where id=42");
    }

    #[test]
    fn test_physical_delete_when_no_flag_column() {
        let sql = delete_sql(&plain_table(), &DeleteOperation::ById(SqlValue::Number(7)));
        assert_eq!(sql, "DELETE FROM events WHERE id=7");
    }

    #[test]
    fn test_by_id_batch() {
        let ids = [SqlValue::Number(1), SqlValue::Number(2), SqlValue::Number(3)];
        let sql = delete_sql(&soft_table(), &DeleteOperation::ByIdBatch(&ids));
        assert_eq!(sql, "UPDATE users SET deleted='1' WHERE id IN (1,2,3)");
    }

    #[test]
    fn test_empty_batch_matches_nothing() {
        let sql = delete_sql(&soft_table(), &DeleteOperation::ByIdBatch(&[]));
        assert_eq!(sql, "UPDATE users SET deleted='1' WHERE 1=0");

        let sql = delete_sql(&plain_table(), &DeleteOperation::ByIdBatch(&[]));
        assert_eq!(sql, "DELETE FROM events WHERE 1=0");
    }

    #[test]
    fn test_by_map_conjunction() {
        let pairs = [
            ("name".to_string(), SqlValue::text("ada")),
            ("id".to_string(), SqlValue::Number(9)),
        ];
        let sql = delete_sql(&soft_table(), &DeleteOperation::ByMap(&pairs));
        assert_eq!(sql, "UPDATE users SET deleted='1' WHERE name='ada' AND id=9");
    }

    #[test]
    fn test_by_condition_passthrough() {
        let sql = delete_sql(&soft_table(), &DeleteOperation::ByCondition("created < '2020-01-01'"));
        assert_eq!(
            sql,
            "UPDATE users SET deleted='1' WHERE created < '2020-01-01'"
        );
    }

    #[test]
    fn test_numeric_tombstone_unquoted() {
        let table = TableDescriptor::new(
            "orders",
            "id",
            vec![
                ColumnDescriptor::new("id", ColumnKind::Numeric),
                ColumnDescriptor::logical_delete("state", ColumnKind::Numeric, "-1"),
            ],
        );
        let sql = delete_sql(&table, &DeleteOperation::ById(SqlValue::Number(5)));
        assert_eq!(sql, "UPDATE orders SET state=-1 WHERE id=5");
    }

    #[test]
    fn test_multiple_flags_in_declaration_order() {
        let table = TableDescriptor::new(
            "docs",
            "id",
            vec![
                ColumnDescriptor::logical_delete("deleted", ColumnKind::Text, "y"),
                ColumnDescriptor::logical_delete("gone", ColumnKind::Numeric, "1"),
            ],
        );
        let sql = delete_sql(&table, &DeleteOperation::ById(SqlValue::Number(1)));
        assert_eq!(sql, "UPDATE docs SET deleted='y',gone=1 WHERE id=1");
    }

    #[test]
    fn test_text_value_quote_escaping() {
        let pairs = [("name".to_string(), SqlValue::text("o'hara"))];
        let sql = delete_sql(&plain_table(), &DeleteOperation::ByMap(&pairs));
        assert_eq!(sql, "DELETE FROM events WHERE name='o''hara'");
    }
}
