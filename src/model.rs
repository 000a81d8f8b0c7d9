//! Schema and statement models produced by the extractors.

use serde::Serialize;

use crate::types::SqlType;

/// A table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnModel {
    pub name: String,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub auto_increment: bool,
}

/// The resolved primary key of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimaryKeyModel {
    pub columns: Vec<String>,
    pub auto_generate: bool,
}

impl PrimaryKeyModel {
    /// An entity-level key. These never auto-generate.
    pub fn explicit(columns: Vec<String>) -> Self {
        Self {
            columns,
            auto_generate: false,
        }
    }

    /// A key assembled from per-property annotations.
    pub fn from_properties(columns: Vec<String>, auto_generate: bool) -> Self {
        Self {
            columns,
            auto_generate,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.columns.len() > 1
    }
}

/// A secondary index. Unnamed indices are named at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexModel {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// One table, as extracted from an entity declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityModel {
    pub table_name: String,
    pub columns: Vec<ColumnModel>,
    pub primary_key: Option<PrimaryKeyModel>,
    pub indices: Vec<IndexModel>,
}

impl EntityModel {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }
}

/// A named statement for a data-access method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SqlStatement {
    Query {
        name: String,
        sql: String,
    },
    Insert {
        name: String,
        table: String,
        columns: Vec<String>,
        replace: bool,
    },
    Delete {
        name: String,
        sql: String,
    },
    Update {
        name: String,
        sql: String,
    },
    Upsert {
        name: String,
        sql: String,
    },
}

impl SqlStatement {
    /// The statement label, i.e. the originating method name.
    pub fn name(&self) -> &str {
        match self {
            Self::Query { name, .. }
            | Self::Insert { name, .. }
            | Self::Delete { name, .. }
            | Self::Update { name, .. }
            | Self::Upsert { name, .. } => name,
        }
    }
}
