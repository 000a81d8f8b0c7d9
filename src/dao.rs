//! Data-access declarations to named statements.
//!
//! Each method yields at most one statement. The first annotation naming a
//! known directive decides what is generated:
//!
//! | Directive | Statement                                   |
//! |-----------|---------------------------------------------|
//! | `Query`   | normalized `value` text                     |
//! | `Insert`  | `INSERT [OR REPLACE] INTO` the target table |
//! | `Delete`, `Update`, `Upsert` | not synthesized          |

use crate::config::AnnotationNames;
use crate::decl::{Annotation, Catalog, Declaration, Method, TypeKind, TypeRef};
use crate::error::{SqError, SqResult};
use crate::model::SqlStatement;
use crate::parser::normalize_sql;
use crate::schema::EntityExtractor;

/// Conflict strategy that turns an insert into `INSERT OR REPLACE`.
const REPLACE_STRATEGY: &str = "REPLACE";

/// Statement-producing method annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Query,
    Insert,
    Delete,
    Update,
    Upsert,
}

impl Directive {
    /// Recognize an annotation by its qualified name.
    pub fn resolve(annotation: &Annotation, names: &AnnotationNames) -> Option<Self> {
        let name = annotation.name.as_str();
        if name == names.query {
            Some(Self::Query)
        } else if name == names.insert {
            Some(Self::Insert)
        } else if name == names.delete {
            Some(Self::Delete)
        } else if name == names.update {
            Some(Self::Update)
        } else if name == names.upsert {
            Some(Self::Upsert)
        } else {
            None
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "Query",
            Self::Insert => "Insert",
            Self::Delete => "Delete",
            Self::Update => "Update",
            Self::Upsert => "Upsert",
        }
    }
}

/// The structure of a type as far as insert targets are concerned.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape<'a> {
    /// Cannot name an entity: primitives, enums, type parameters, bare wrappers.
    Primitive(&'a TypeRef),
    /// A sequence or array of the inner shape.
    Wrapper(Box<TypeShape<'a>>),
    /// A class, interface or object that may be an entity.
    Nominal(&'a TypeRef),
}

impl<'a> TypeShape<'a> {
    pub fn of(ty: &'a TypeRef, wrappers: &[String]) -> Self {
        if wrappers.iter().any(|w| *w == ty.name) {
            return match ty.arguments.first() {
                Some(element) => Self::Wrapper(Box::new(Self::of(element, wrappers))),
                None => Self::Primitive(ty),
            };
        }
        match ty.kind {
            TypeKind::Class | TypeKind::Interface | TypeKind::Object => Self::Nominal(ty),
            TypeKind::Enum | TypeKind::Primitive | TypeKind::TypeParameter => Self::Primitive(ty),
        }
    }

    /// Unwrap sequences and arrays down to the element class.
    pub fn entity(&self) -> Option<&'a TypeRef> {
        match self {
            Self::Wrapper(inner) => inner.entity(),
            Self::Nominal(ty) => Some(ty),
            Self::Primitive(_) => None,
        }
    }
}

/// Extracts [`SqlStatement`]s from data-access declarations.
pub struct StatementExtractor<'a> {
    catalog: &'a Catalog,
    entities: EntityExtractor<'a>,
    names: &'a AnnotationNames,
    wrappers: &'a [String],
    strict: bool,
}

impl<'a> StatementExtractor<'a> {
    pub fn new(
        catalog: &'a Catalog,
        entities: EntityExtractor<'a>,
        names: &'a AnnotationNames,
        wrappers: &'a [String],
    ) -> Self {
        Self {
            catalog,
            entities,
            names,
            wrappers,
            strict: false,
        }
    }

    /// Fail instead of skipping directives without statement synthesis.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// One statement per method with a supported directive, in method order.
    pub fn extract(&self, decl: &Declaration) -> SqResult<Vec<SqlStatement>> {
        let mut statements = Vec::new();
        for method in &decl.methods {
            if let Some(statement) = self.extract_method(method)? {
                statements.push(statement);
            }
        }
        tracing::debug!(
            "Extracted {} statements from {}",
            statements.len(),
            decl.qualified_name()
        );
        Ok(statements)
    }

    fn extract_method(&self, method: &Method) -> SqResult<Option<SqlStatement>> {
        let Some((directive, annotation)) = method
            .annotations
            .iter()
            .find_map(|a| Directive::resolve(a, self.names).map(|d| (d, a)))
        else {
            return Ok(None);
        };

        match directive {
            Directive::Query => {
                let sql = annotation
                    .str_arg("value")
                    .ok_or_else(|| SqError::missing_argument(&method.name, "Query", "value"))?;
                Ok(Some(SqlStatement::Query {
                    name: method.name.clone(),
                    sql: normalize_sql(sql),
                }))
            }
            Directive::Insert => self.build_insert(method, annotation).map(Some),
            Directive::Delete | Directive::Update | Directive::Upsert => {
                if self.strict {
                    return Err(SqError::UnimplementedDirective {
                        method: method.name.clone(),
                        directive: directive.as_str(),
                    });
                }
                tracing::warn!(
                    "Skipping '{}': @{} statements are not generated",
                    method.name,
                    directive.as_str()
                );
                Ok(None)
            }
        }
    }

    fn build_insert(&self, method: &Method, annotation: &Annotation) -> SqResult<SqlStatement> {
        let param = method
            .parameters
            .first()
            .ok_or_else(|| SqError::unsupported_insert(&method.name, "no parameter"))?;

        let target = TypeShape::of(&param.ty, self.wrappers)
            .entity()
            .ok_or_else(|| SqError::unsupported_insert(&method.name, &param.ty))?;

        let decl = self
            .catalog
            .find_entity(&target.name)
            .ok_or_else(|| SqError::UnresolvedDeclaration(target.name.clone()))?;
        let entity = self.entities.extract(decl)?;

        let replace = annotation
            .argument("onConflict")
            .is_some_and(|strategy| strategy.to_string() == REPLACE_STRATEGY);

        Ok(SqlStatement::Insert {
            name: method.name.clone(),
            columns: entity.column_names(),
            table: entity.table_name,
            replace,
        })
    }
}
