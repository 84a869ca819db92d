//! Table metadata consumed by the delete-rewriting path.
//!
//! Descriptors are loaded once by the owning application (from its ORM
//! mapping, migrations, or hand-written registration) and referenced by the
//! rewrite layer; the layer never mutates them.

use std::collections::HashMap;

use crate::error::{RewriteError, RewriteResult};

/// Value category of a column, which decides how literals are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Rendered single-quoted.
    Text,
    /// Rendered as a bare literal.
    Numeric,
}

/// One column of a described table.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub name: String,
    pub kind: ColumnKind,
    /// When set, this column is a logical-delete flag and the value is the
    /// tombstone written on delete.
    pub tombstone: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(name: &str, kind: ColumnKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            tombstone: None,
        }
    }

    /// Marks this column as a logical-delete flag with the given tombstone.
    pub fn logical_delete(name: &str, kind: ColumnKind, tombstone: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            tombstone: Some(tombstone.to_string()),
        }
    }

    pub fn is_logical_delete(&self) -> bool {
        self.tombstone.is_some()
    }
}

/// Immutable description of one table: name, primary key, declared columns
/// in declaration order.
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    pub table_name: String,
    pub key_column: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    pub fn new(table_name: &str, key_column: &str, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            table_name: table_name.to_string(),
            key_column: key_column.to_string(),
            columns,
        }
    }

    /// Logical-delete columns in declaration order.
    pub fn logical_delete_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.is_logical_delete())
    }

    /// Whether any column is a logical-delete flag.
    pub fn has_logical_delete(&self) -> bool {
        self.columns.iter().any(|c| c.is_logical_delete())
    }
}

/// Registry of table descriptors keyed by entity kind.
///
/// This is the metadata collaborator interface the rewrite layer consumes:
/// lookups for unknown entities are fatal, because generating delete SQL
/// against an unknown shape is unsafe.
#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: HashMap<String, TableDescriptor>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `table` under `entity`. Later registrations replace earlier
    /// ones.
    pub fn register(&mut self, entity: &str, table: TableDescriptor) {
        self.tables.insert(entity.to_string(), table);
    }

    /// Looks up the descriptor for `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Metadata`] when the entity is unknown.
    pub fn table_descriptor(&self, entity: &str) -> RewriteResult<&TableDescriptor> {
        self.tables
            .get(entity)
            .ok_or_else(|| RewriteError::Metadata(format!("no table registered for entity '{entity}'")))
    }

    /// Non-failing lookup used by the interceptor's pass-through decision.
    pub fn get(&self, entity: &str) -> Option<&TableDescriptor> {
        self.tables.get(entity)
    }
}
