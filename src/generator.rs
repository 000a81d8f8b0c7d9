//! SQL generation for extracted models.
//!
//! Converts table models into DDL and statement lists into labelled `.sq`
//! statement blocks.

use crate::model::*;

/// Trait for converting models to SQL.
pub trait ToSql {
    /// Convert this model to SQL text.
    fn to_sql(&self) -> String;
}

impl ToSql for EntityModel {
    /// `CREATE TABLE` followed by one `CREATE INDEX` per index.
    ///
    /// Only composite keys get a table constraint; a single auto-generated key
    /// is declared inline on its column.
    fn to_sql(&self) -> String {
        let mut sql = format!("CREATE TABLE {} (\n", self.table_name);

        let defs: Vec<String> = self
            .columns
            .iter()
            .map(|col| {
                let mut line = format!("    {} {}", col.name, col.sql_type);
                if !col.nullable {
                    line.push_str(" NOT NULL");
                }
                if col.auto_increment {
                    line.push_str(" PRIMARY KEY AUTOINCREMENT");
                }
                line
            })
            .collect();
        sql.push_str(&defs.join(",\n"));

        if let Some(pk) = self.primary_key.as_ref().filter(|pk| pk.is_composite()) {
            sql.push_str(&format!(",\n    PRIMARY KEY ({})", pk.columns.join(", ")));
        }

        sql.push_str("\n);\n");

        for index in &self.indices {
            sql.push_str(&index.create_sql(&self.table_name));
            sql.push('\n');
        }

        sql
    }
}

impl IndexModel {
    /// The explicit name, or `idx_<table>_<columns>`.
    pub fn resolved_name(&self, table: &str) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("idx_{}_{}", table, self.columns.join("_")),
        }
    }

    /// Generate CREATE INDEX SQL.
    pub fn create_sql(&self, table: &str) -> String {
        let unique = if self.unique { "UNIQUE " } else { "" };
        format!(
            "CREATE {}INDEX {} ON {}({});",
            unique,
            self.resolved_name(table),
            table,
            self.columns.join(", ")
        )
    }
}

impl ToSql for SqlStatement {
    /// `<label>:` on its own line, then the statement terminated by `;`.
    fn to_sql(&self) -> String {
        let body = match self {
            Self::Query { sql, .. }
            | Self::Delete { sql, .. }
            | Self::Update { sql, .. }
            | Self::Upsert { sql, .. } => sql.clone(),
            Self::Insert {
                table,
                columns,
                replace,
                ..
            } => insert_sql(table, columns, *replace),
        };
        format!("{}:\n{};", self.name(), body)
    }
}

impl ToSql for [SqlStatement] {
    fn to_sql(&self) -> String {
        let mut sql = String::new();
        for statement in self {
            sql.push_str(&statement.to_sql());
            sql.push_str("\n\n");
        }
        sql
    }
}

/// Generate INSERT SQL with one positional placeholder per column.
fn insert_sql(table: &str, columns: &[String], replace: bool) -> String {
    let mut sql = String::from("INSERT ");
    if replace {
        sql.push_str("OR REPLACE ");
    }
    sql.push_str(&format!("INTO {}(\n  ", table));
    sql.push_str(&columns.join(",\n  "));
    sql.push_str("\n) VALUES (");
    sql.push_str(&vec!["?"; columns.len()].join(", "));
    sql.push(')');
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlType;

    fn column(name: &str, sql_type: SqlType, nullable: bool, auto_increment: bool) -> ColumnModel {
        ColumnModel {
            name: name.to_string(),
            sql_type,
            nullable,
            auto_increment,
        }
    }

    fn user() -> EntityModel {
        EntityModel {
            table_name: "user".to_string(),
            columns: vec![
                column("id", SqlType::Integer, true, true),
                column("name", SqlType::Text, false, false),
            ],
            primary_key: Some(PrimaryKeyModel::from_properties(vec!["id".to_string()], true)),
            indices: Vec::new(),
        }
    }

    #[test]
    fn test_simple_table() {
        assert_eq!(
            user().to_sql(),
            "CREATE TABLE user (\n    id INTEGER PRIMARY KEY AUTOINCREMENT,\n    name TEXT NOT NULL\n);\n"
        );
    }

    #[test]
    fn test_not_null_auto_increment() {
        let mut model = user();
        model.columns[0].nullable = false;
        assert!(model
            .to_sql()
            .contains("    id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,\n"));
    }

    #[test]
    fn test_composite_key() {
        let model = EntityModel {
            table_name: "membership".to_string(),
            columns: vec![
                column("user_id", SqlType::Integer, false, false),
                column("group_id", SqlType::Integer, false, false),
            ],
            primary_key: Some(PrimaryKeyModel::explicit(vec![
                "user_id".to_string(),
                "group_id".to_string(),
            ])),
            indices: Vec::new(),
        };
        assert_eq!(
            model.to_sql(),
            "CREATE TABLE membership (\n    user_id INTEGER NOT NULL,\n    group_id INTEGER NOT NULL,\n    PRIMARY KEY (user_id, group_id)\n);\n"
        );
    }

    #[test]
    fn test_single_manual_key_has_no_clause() {
        let model = EntityModel {
            table_name: "tag".to_string(),
            columns: vec![column("label", SqlType::Text, false, false)],
            primary_key: Some(PrimaryKeyModel::from_properties(vec!["label".to_string()], false)),
            indices: Vec::new(),
        };
        assert_eq!(model.to_sql(), "CREATE TABLE tag (\n    label TEXT NOT NULL\n);\n");
    }

    #[test]
    fn test_indices() {
        let mut model = user();
        model.indices = vec![
            IndexModel {
                name: None,
                columns: vec!["name".to_string(), "email".to_string()],
                unique: false,
            },
            IndexModel {
                name: Some("user_name_unique".to_string()),
                columns: vec!["name".to_string()],
                unique: true,
            },
        ];
        let sql = model.to_sql();
        assert!(sql.ends_with(
            ");\nCREATE INDEX idx_user_name_email ON user(name, email);\nCREATE UNIQUE INDEX user_name_unique ON user(name);\n"
        ));
    }

    #[test]
    fn test_query_block() {
        let statement = SqlStatement::Query {
            name: "findAll".to_string(),
            sql: "SELECT * FROM user".to_string(),
        };
        assert_eq!(statement.to_sql(), "findAll:\nSELECT * FROM user;");
    }

    #[test]
    fn test_insert_block() {
        let statement = SqlStatement::Insert {
            name: "insertAll".to_string(),
            table: "user".to_string(),
            columns: vec!["id".to_string(), "name".to_string()],
            replace: true,
        };
        assert_eq!(
            statement.to_sql(),
            "insertAll:\nINSERT OR REPLACE INTO user(\n  id,\n  name\n) VALUES (?, ?);"
        );
    }

    #[test]
    fn test_plain_insert() {
        let statement = SqlStatement::Insert {
            name: "insert".to_string(),
            table: "tag".to_string(),
            columns: vec!["label".to_string()],
            replace: false,
        };
        assert_eq!(statement.to_sql(), "insert:\nINSERT INTO tag(\n  label\n) VALUES (?);");
    }

    #[test]
    fn test_statement_list() {
        let statements = vec![
            SqlStatement::Query {
                name: "count".to_string(),
                sql: "SELECT COUNT(*) FROM user".to_string(),
            },
            SqlStatement::Delete {
                name: "clear".to_string(),
                sql: "DELETE FROM user".to_string(),
            },
        ];
        assert_eq!(
            statements.to_sql(),
            "count:\nSELECT COUNT(*) FROM user;\n\nclear:\nDELETE FROM user;\n\n"
        );
    }

    #[test]
    fn test_empty_statement_list() {
        let statements: Vec<SqlStatement> = Vec::new();
        assert_eq!(statements.to_sql(), "");
    }
}
