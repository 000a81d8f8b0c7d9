//! Generator configuration.
//!
//! ```toml
//! annotation_package = "androidx.room"
//! output_root = "sqldelight"
//! strict_directives = true
//!
//! [types]
//! "java.lang.Integer" = "INTEGER"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{SqError, SqResult};
use crate::types::{SqlType, TypeMapper};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG: &str = "sqforge.toml";

/// Sequence and array types unwrapped when resolving insert targets.
pub const DEFAULT_WRAPPERS: &[&str] = &[
    "kotlin.collections.List",
    "kotlin.collections.MutableList",
    "kotlin.Array",
];

/// Main generator configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Package of the schema annotations (`<package>.Entity`, `<package>.Query`, ...)
    pub annotation_package: String,

    /// Directory under the output directory that receives the `.sq` tree
    pub output_root: String,

    /// Prefix of every generated file name
    pub file_prefix: String,

    /// Extension of every generated file
    pub extension: String,

    /// Fail on recognized directives that have no statement synthesis
    pub strict_directives: bool,

    /// Check that key and index columns exist among the declared columns
    pub validate_references: bool,

    /// Extra primitive types and their storage class
    pub types: BTreeMap<String, SqlType>,

    /// Extra wrapper types unwrapped for insert parameters
    pub wrappers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            annotation_package: "androidx.room".to_string(),
            output_root: "sqldelight".to_string(),
            file_prefix: "SQ".to_string(),
            extension: "sq".to_string(),
            strict_directives: false,
            validate_references: false,
            types: BTreeMap::new(),
            wrappers: Vec::new(),
        }
    }
}

impl Config {
    /// Create a new configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn from_toml(input: &str) -> SqResult<Self> {
        toml::from_str(input).map_err(|e| SqError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> SqResult<Self> {
        tracing::info!("Loading configuration from: {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| SqError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// `./sqforge.toml`, then the user config directory, then defaults.
    pub fn discover() -> SqResult<Self> {
        match Self::candidates().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load(&path),
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("sqforge").join("config.toml"));
        }
        paths
    }

    pub fn annotation_names(&self) -> AnnotationNames {
        AnnotationNames::new(&self.annotation_package)
    }

    /// Builtin primitives plus the configured `[types]`.
    pub fn type_mapper(&self) -> TypeMapper {
        let mut mapper = TypeMapper::new();
        for (name, ty) in &self.types {
            mapper.register(name.clone(), *ty);
        }
        mapper
    }

    /// Builtin wrappers plus the configured ones.
    pub fn wrapper_types(&self) -> Vec<String> {
        DEFAULT_WRAPPERS
            .iter()
            .map(|w| w.to_string())
            .chain(self.wrappers.iter().cloned())
            .collect()
    }
}

/// Builder for Config
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn annotation_package(mut self, package: impl Into<String>) -> Self {
        self.config.annotation_package = package.into();
        self
    }

    pub fn output_root(mut self, root: impl Into<String>) -> Self {
        self.config.output_root = root.into();
        self
    }

    pub fn strict_directives(mut self, strict: bool) -> Self {
        self.config.strict_directives = strict;
        self
    }

    pub fn validate_references(mut self, validate: bool) -> Self {
        self.config.validate_references = validate;
        self
    }

    pub fn primitive(mut self, name: impl Into<String>, ty: SqlType) -> Self {
        self.config.types.insert(name.into(), ty);
        self
    }

    pub fn wrapper(mut self, name: impl Into<String>) -> Self {
        self.config.wrappers.push(name.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}

/// Fully-qualified names of the annotations the extractors understand.
#[derive(Debug, Clone)]
pub struct AnnotationNames {
    pub entity: String,
    pub column_info: String,
    pub primary_key: String,
    pub query: String,
    pub insert: String,
    pub delete: String,
    pub update: String,
    pub upsert: String,
}

impl AnnotationNames {
    pub fn new(package: &str) -> Self {
        let qualify = |short: &str| format!("{}.{}", package, short);
        Self {
            entity: qualify("Entity"),
            column_info: qualify("ColumnInfo"),
            primary_key: qualify("PrimaryKey"),
            query: qualify("Query"),
            insert: qualify("Insert"),
            delete: qualify("Delete"),
            update: qualify("Update"),
            upsert: qualify("Upsert"),
        }
    }
}

impl Default for AnnotationNames {
    fn default() -> Self {
        Config::default().annotation_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{TypeKind, TypeRef};

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.output_root, "sqldelight");
        assert_eq!(config.file_prefix, "SQ");
        assert!(!config.strict_directives);
        assert_eq!(config.annotation_names().entity, "androidx.room.Entity");
    }

    #[test]
    fn test_from_toml_partial() {
        let config = Config::from_toml(
            r#"
            annotation_package = "com.example.schema"
            validate_references = true
            wrappers = ["kotlin.collections.Set"]

            [types]
            "java.lang.Integer" = "INTEGER"
            "#,
        )
        .unwrap();

        assert_eq!(config.annotation_names().query, "com.example.schema.Query");
        assert!(config.validate_references);
        assert_eq!(config.extension, "sq");
        assert_eq!(config.wrapper_types().len(), DEFAULT_WRAPPERS.len() + 1);

        let integer = TypeRef {
            name: "java.lang.Integer".to_string(),
            nullable: true,
            kind: TypeKind::Class,
            arguments: Vec::new(),
        };
        assert_eq!(config.type_mapper().map(&integer).unwrap(), SqlType::Integer);
    }

    #[test]
    fn test_invalid_storage_class() {
        let err = Config::from_toml("[types]\n\"x.Y\" = \"BLOB\"\n").unwrap_err();
        assert!(matches!(err, SqError::Config(_)));
    }

    #[test]
    fn test_builder() {
        let config = Config::builder()
            .output_root("db")
            .strict_directives(true)
            .wrapper("kotlin.collections.Collection")
            .build();
        assert_eq!(config.output_root, "db");
        assert!(config.strict_directives);
        assert!(config
            .wrapper_types()
            .contains(&"kotlin.collections.Collection".to_string()));
    }

    #[test]
    fn test_configured_type_keeps_enum_as_text() {
        let config = Config::builder()
            .primitive("app.db.Status", SqlType::Integer)
            .build();
        let status = TypeRef {
            name: "app.db.Status".to_string(),
            nullable: false,
            kind: TypeKind::Enum,
            arguments: Vec::new(),
        };
        assert_eq!(config.type_mapper().map(&status).unwrap(), SqlType::Text);
    }
}
