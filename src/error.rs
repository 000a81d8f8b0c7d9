//! Error types for sqforge.

use thiserror::Error;

/// The main error type for sqforge operations.
#[derive(Debug, Error)]
pub enum SqError {
    /// A property type has no SQL storage class.
    #[error("Unsupported type: {ty}")]
    UnsupportedType { ty: String },

    /// An insert method's parameter does not name an entity class.
    #[error("Unsupported @Insert parameter type on '{method}': {ty}")]
    UnsupportedInsertParameter { method: String, ty: String },

    /// A referenced class is not part of the manifest.
    #[error("Unresolved declaration: '{0}' is not an entity in the manifest")]
    UnresolvedDeclaration(String),

    /// A directive lacks an argument it cannot do without.
    #[error("Missing argument '{argument}' on @{directive} of '{method}'")]
    MissingArgument {
        method: String,
        directive: &'static str,
        argument: &'static str,
    },

    /// A recognized directive that has no statement synthesis.
    #[error("@{directive} on '{method}' is not supported")]
    UnimplementedDirective {
        method: String,
        directive: &'static str,
    },

    /// A primary key or index names a column the entity does not declare.
    #[error("Unknown column '{column}' in {context} of table '{table}'")]
    UnknownColumn {
        table: String,
        column: String,
        context: &'static str,
    },

    /// A declaration name or package segment cannot be used as a path component.
    #[error("Invalid output path component '{0}'")]
    InvalidPathComponent(String),

    /// The declaration manifest could not be read.
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generated DDL was rejected by SQLite.
    #[error("Verification failed for {file}: {message}")]
    Verify { file: String, message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SqError {
    /// Create an unsupported type error from anything displayable.
    pub fn unsupported_type(ty: impl ToString) -> Self {
        Self::UnsupportedType { ty: ty.to_string() }
    }

    /// Create an unsupported insert parameter error.
    pub fn unsupported_insert(method: impl Into<String>, ty: impl ToString) -> Self {
        Self::UnsupportedInsertParameter {
            method: method.into(),
            ty: ty.to_string(),
        }
    }

    /// Create a missing argument error.
    pub fn missing_argument(
        method: impl Into<String>,
        directive: &'static str,
        argument: &'static str,
    ) -> Self {
        Self::MissingArgument {
            method: method.into(),
            directive,
            argument,
        }
    }
}

/// Result type alias for sqforge operations.
pub type SqResult<T> = Result<T, SqError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SqError::unsupported_type("java.util.Date");
        assert_eq!(err.to_string(), "Unsupported type: java.util.Date");
    }

    #[test]
    fn test_insert_error_display() {
        let err = SqError::unsupported_insert("insertAll", "kotlin.Int");
        assert_eq!(
            err.to_string(),
            "Unsupported @Insert parameter type on 'insertAll': kotlin.Int"
        );
    }

    #[test]
    fn test_missing_argument_display() {
        let err = SqError::missing_argument("findAll", "Query", "value");
        assert_eq!(
            err.to_string(),
            "Missing argument 'value' on @Query of 'findAll'"
        );
    }
}
