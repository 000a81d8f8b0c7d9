//! Schema verification against SQLite.
//!
//! Applies generated DDL to a throwaway in-memory database using sqlx, so a
//! broken table or index definition is caught before the embedded-SQL
//! toolchain sees it.

use sqlx::sqlite::SqlitePoolOptions;

use crate::error::{SqError, SqResult};
use crate::writer::{SqFile, UnitKind};

const MEMORY_URL: &str = "sqlite::memory:";

/// Apply every entity file's DDL to a fresh in-memory SQLite database.
///
/// Data-access files are skipped; their placeholders need bindings.
///
/// # Example
///
/// ```rust,ignore
/// let outcome = Processor::default().process(&catalog);
/// verify_schema(&outcome.files).await?;
/// ```
pub async fn verify_schema(files: &[SqFile]) -> SqResult<()> {
    // A single connection: every in-memory connection is its own database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(MEMORY_URL)
        .await
        .map_err(|e| SqError::Verify {
            file: MEMORY_URL.to_string(),
            message: e.to_string(),
        })?;

    for file in files.iter().filter(|f| f.kind == UnitKind::Entity) {
        for statement in split_statements(&file.text) {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| SqError::Verify {
                    file: file.output_name.clone(),
                    message: format!("{} in `{}`", e, statement),
                })?;
        }
        tracing::debug!("Verified {}", file.output_name);
    }

    pool.close().await;
    Ok(())
}

fn split_statements(sql: &str) -> impl Iterator<Item = &str> {
    sql.split(';').map(str::trim).filter(|s| !s.is_empty())
}
