//! Storage classes and the primitive type mapping.
//!
//! | Type                                   | Storage class |
//! |----------------------------------------|---------------|
//! | `Int`, `Long`, `Short`, `Byte`, `Boolean` | `INTEGER`  |
//! | `Float`, `Double`                      | `REAL`        |
//! | `String`                               | `TEXT`        |
//! | any enumeration                        | `TEXT`        |
//!
//! Everything else is rejected.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::decl::{TypeKind, TypeRef};
use crate::error::{SqError, SqResult};

/// The SQL column types sqforge emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqlType {
    Integer,
    Real,
    Text,
}

impl SqlType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const BUILTIN_PRIMITIVES: &[(&str, SqlType)] = &[
    ("kotlin.Int", SqlType::Integer),
    ("kotlin.Long", SqlType::Integer),
    ("kotlin.Short", SqlType::Integer),
    ("kotlin.Byte", SqlType::Integer),
    ("kotlin.Boolean", SqlType::Integer),
    ("kotlin.Float", SqlType::Real),
    ("kotlin.Double", SqlType::Real),
    ("kotlin.String", SqlType::Text),
];

/// Maps resolved property types to storage classes.
#[derive(Debug, Clone)]
pub struct TypeMapper {
    builtins: HashMap<String, SqlType>,
    registered: HashMap<String, SqlType>,
}

impl TypeMapper {
    /// A mapper that knows the builtin primitives only.
    pub fn new() -> Self {
        let builtins = BUILTIN_PRIMITIVES
            .iter()
            .map(|(name, ty)| (name.to_string(), *ty))
            .collect();
        Self {
            builtins,
            registered: HashMap::new(),
        }
    }

    /// Teach the mapper another primitive, e.g. a platform alias.
    ///
    /// Registered names never apply to enumerations.
    pub fn register(&mut self, name: impl Into<String>, ty: SqlType) {
        self.registered.insert(name.into(), ty);
    }

    pub fn map(&self, ty: &TypeRef) -> SqResult<SqlType> {
        if let Some(sql_type) = self.builtins.get(&ty.name) {
            return Ok(*sql_type);
        }
        // Enums are stored by name.
        if ty.kind == TypeKind::Enum {
            return Ok(SqlType::Text);
        }
        self.registered
            .get(&ty.name)
            .copied()
            .ok_or_else(|| SqError::unsupported_type(ty))
    }
}

impl Default for TypeMapper {
    fn default() -> Self {
        Self::new()
    }
}
