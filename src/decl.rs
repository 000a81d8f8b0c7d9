//! Resolved declaration facts.
//!
//! A manifest describes annotated declarations the way a type resolver sees
//! them: simple names, packages, ordered members, resolved types and the
//! annotations attached to each of them. Nothing here is interpreted; the
//! extractors give meaning to the annotations.
//!
//! # Example
//! ```
//! use sqforge::decl::Catalog;
//!
//! let json = r#"{
//!     "entities": [{
//!         "name": "User",
//!         "package": "app.db",
//!         "annotations": [{ "name": "androidx.room.Entity", "arguments": { "tableName": "user" } }],
//!         "properties": [
//!             { "name": "id", "type": { "name": "kotlin.Long" } }
//!         ]
//!     }]
//! }"#;
//!
//! let catalog = Catalog::from_json(json).unwrap();
//! assert!(catalog.find_entity("app.db.User").is_some());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SqError, SqResult};

/// Every declaration handed over by the resolver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Declarations carrying the entity annotation.
    #[serde(default)]
    pub entities: Vec<Declaration>,
    /// Declarations carrying the data-access annotation.
    #[serde(default)]
    pub daos: Vec<Declaration>,
}

impl Catalog {
    /// Load a catalog from a JSON string.
    pub fn from_json(json: &str) -> SqResult<Self> {
        serde_json::from_str(json).map_err(|e| SqError::Manifest(e.to_string()))
    }

    /// Load a catalog from a TOML string.
    pub fn from_toml(input: &str) -> SqResult<Self> {
        toml::from_str(input).map_err(|e| SqError::Manifest(e.to_string()))
    }

    /// Load a catalog from a file; `.toml` files are read as TOML, anything
    /// else as JSON.
    pub fn load(path: &Path) -> SqResult<Self> {
        tracing::debug!("Loading manifest from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::from_toml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Find an entity declaration by its fully-qualified name.
    pub fn find_entity(&self, qualified_name: &str) -> Option<&Declaration> {
        self.entities
            .iter()
            .find(|decl| decl.qualified_name() == qualified_name)
    }
}

/// A class-like declaration: an entity or a data-access object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub methods: Vec<Method>,
}

impl Declaration {
    /// `package.Name`, or just `Name` for the root package.
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }

    /// The first annotation with the given qualified name.
    pub fn annotation(&self, qualified_name: &str) -> Option<&Annotation> {
        find_annotation(&self.annotations, qualified_name)
    }
}

/// A member property of a declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl Property {
    pub fn annotation(&self, qualified_name: &str) -> Option<&Annotation> {
        find_annotation(&self.annotations, qualified_name)
    }
}

/// A member method of a declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

/// A resolved type reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    /// Fully-qualified name of the referenced declaration.
    pub name: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub kind: TypeKind,
    /// Resolved type arguments, in order.
    #[serde(default)]
    pub arguments: Vec<TypeRef>,
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.arguments.is_empty() {
            let args: Vec<String> = self.arguments.iter().map(|a| a.to_string()).collect();
            write!(f, "<{}>", args.join(", "))?;
        }
        if self.nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}

/// What kind of declaration a type refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Enum,
    Interface,
    Object,
    Primitive,
    TypeParameter,
}

/// An annotation with its named arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Fully-qualified annotation name.
    pub name: String,
    #[serde(default)]
    pub arguments: BTreeMap<String, AnnotationValue>,
}

impl Annotation {
    pub fn argument(&self, name: &str) -> Option<&AnnotationValue> {
        self.arguments.get(name)
    }

    pub fn str_arg(&self, name: &str) -> Option<&str> {
        self.argument(name).and_then(AnnotationValue::as_str)
    }

    pub fn bool_arg(&self, name: &str) -> Option<bool> {
        self.argument(name).and_then(AnnotationValue::as_bool)
    }

    pub fn list_arg(&self, name: &str) -> Option<&[AnnotationValue]> {
        self.argument(name).and_then(AnnotationValue::as_list)
    }
}

/// An annotation argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<AnnotationValue>),
    Annotation(Annotation),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AnnotationValue]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&Annotation> {
        match self {
            Self::Annotation(a) => Some(a),
            _ => None,
        }
    }
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Str(s) => write!(f, "{}", s),
            Self::List(values) => {
                let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Self::Annotation(a) => write!(f, "@{}", a.name),
        }
    }
}

fn find_annotation<'a>(
    annotations: &'a [Annotation],
    qualified_name: &str,
) -> Option<&'a Annotation> {
    annotations.iter().find(|a| a.name == qualified_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_values_from_json() {
        let anno: Annotation = serde_json::from_str(
            r#"{
                "name": "androidx.room.Entity",
                "arguments": {
                    "tableName": "user",
                    "primaryKeys": ["a", "b"],
                    "indices": [{ "name": "androidx.room.Index", "arguments": { "unique": true } }]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(anno.str_arg("tableName"), Some("user"));
        assert_eq!(anno.list_arg("primaryKeys").map(|l| l.len()), Some(2));

        let index = anno.list_arg("indices").unwrap()[0].as_annotation().unwrap();
        assert_eq!(index.name, "androidx.room.Index");
        assert_eq!(index.bool_arg("unique"), Some(true));
    }

    #[test]
    fn test_type_ref_display() {
        let ty: TypeRef = serde_json::from_str(
            r#"{ "name": "kotlin.collections.List", "arguments": [{ "name": "app.User", "nullable": true }] }"#,
        )
        .unwrap();
        assert_eq!(ty.to_string(), "kotlin.collections.List<app.User?>");
        assert_eq!(ty.kind, TypeKind::Class);
    }

    #[test]
    fn test_catalog_from_toml() {
        let catalog = Catalog::from_toml(
            r#"
            [[entities]]
            name = "Tag"
            package = "app.db"

            [[entities.properties]]
            name = "label"
            type = { name = "kotlin.String" }
            "#,
        )
        .unwrap();

        let tag = catalog.find_entity("app.db.Tag").unwrap();
        assert_eq!(tag.properties[0].ty.name, "kotlin.String");
        assert!(catalog.daos.is_empty());
    }

    #[test]
    fn test_qualified_name_root_package() {
        let catalog = Catalog::from_json(r#"{ "entities": [{ "name": "Note" }] }"#).unwrap();
        assert!(catalog.find_entity("Note").is_some());
        assert!(catalog.find_entity(".Note").is_none());
    }

    #[test]
    fn test_malformed_manifest() {
        let err = Catalog::from_json("{ \"entities\": 3 }").unwrap_err();
        assert!(matches!(err, SqError::Manifest(_)));
    }

    #[test]
    fn test_load_toml_extension_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.TOML");
        std::fs::write(
            &path,
            r#"
            [[entities]]
            name = "Note"
            package = "app.db"

            [[entities.properties]]
            name = "body"
            type = { name = "kotlin.String" }
            "#,
        )
        .unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert!(catalog.find_entity("app.db.Note").is_some());
    }
}
