//! Entity declarations to table models.
//!
//! Primary keys resolve in a fixed order: an explicit entity-level
//! `primaryKeys` list wins and never auto-generates; otherwise every property
//! annotated as a primary key contributes, in declaration order.

use crate::config::AnnotationNames;
use crate::decl::{AnnotationValue, Declaration, Property};
use crate::error::{SqError, SqResult};
use crate::model::{ColumnModel, EntityModel, IndexModel, PrimaryKeyModel};
use crate::types::TypeMapper;

/// Column name value meaning "use the property name".
const INHERIT_FIELD_NAME: &str = "[field-name]";

/// Extracts [`EntityModel`]s from entity declarations.
pub struct EntityExtractor<'a> {
    mapper: &'a TypeMapper,
    names: &'a AnnotationNames,
}

impl<'a> EntityExtractor<'a> {
    pub fn new(mapper: &'a TypeMapper, names: &'a AnnotationNames) -> Self {
        Self { mapper, names }
    }

    /// Build the table model for an entity.
    ///
    /// Fails when any property type has no storage class.
    pub fn extract(&self, decl: &Declaration) -> SqResult<EntityModel> {
        let columns = decl
            .properties
            .iter()
            .map(|prop| self.extract_column(prop))
            .collect::<SqResult<Vec<_>>>()?;

        let model = EntityModel {
            table_name: self.table_name(decl),
            columns,
            primary_key: self.extract_primary_key(decl),
            indices: self.extract_indices(decl),
        };
        tracing::debug!(
            "Extracted table '{}' with {} columns from {}",
            model.table_name,
            model.columns.len(),
            decl.qualified_name()
        );
        Ok(model)
    }

    fn table_name(&self, decl: &Declaration) -> String {
        decl.annotation(&self.names.entity)
            .and_then(|a| a.str_arg("tableName"))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| decl.name.clone())
    }

    fn column_name(&self, prop: &Property) -> String {
        prop.annotation(&self.names.column_info)
            .and_then(|a| a.str_arg("name"))
            .filter(|name| !name.is_empty() && *name != INHERIT_FIELD_NAME)
            .map(str::to_string)
            .unwrap_or_else(|| prop.name.clone())
    }

    /// `autoGenerate` of the property's primary-key annotation, if any.
    fn auto_generate(&self, prop: &Property) -> Option<bool> {
        prop.annotation(&self.names.primary_key)
            .map(|a| a.bool_arg("autoGenerate").unwrap_or(false))
    }

    fn extract_column(&self, prop: &Property) -> SqResult<ColumnModel> {
        let sql_type = self.mapper.map(&prop.ty).inspect_err(|_| {
            tracing::debug!("Property '{}' has no storage class", prop.name);
        })?;

        // Read straight off the annotation, whatever the key resolves to.
        let auto_increment = self.auto_generate(prop).unwrap_or(false);

        Ok(ColumnModel {
            name: self.column_name(prop),
            sql_type,
            nullable: prop.ty.nullable,
            auto_increment,
        })
    }

    pub fn extract_primary_key(&self, decl: &Declaration) -> Option<PrimaryKeyModel> {
        let explicit: Vec<String> = decl
            .annotation(&self.names.entity)
            .and_then(|a| a.list_arg("primaryKeys"))
            .map(|keys| {
                keys.iter()
                    .filter_map(AnnotationValue::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if !explicit.is_empty() {
            return Some(PrimaryKeyModel::explicit(explicit));
        }

        let key_props: Vec<(&Property, bool)> = decl
            .properties
            .iter()
            .filter_map(|prop| self.auto_generate(prop).map(|auto| (prop, auto)))
            .collect();

        if key_props.is_empty() {
            return None;
        }

        Some(PrimaryKeyModel::from_properties(
            key_props.iter().map(|(prop, _)| self.column_name(prop)).collect(),
            key_props.iter().any(|(_, auto)| *auto),
        ))
    }

    pub fn extract_indices(&self, decl: &Declaration) -> Vec<IndexModel> {
        let Some(indices) = decl
            .annotation(&self.names.entity)
            .and_then(|a| a.list_arg("indices"))
        else {
            return Vec::new();
        };

        indices
            .iter()
            .filter_map(AnnotationValue::as_annotation)
            .map(|index| IndexModel {
                name: index
                    .str_arg("name")
                    .filter(|name| !name.trim().is_empty())
                    .map(str::to_string),
                columns: index
                    .list_arg("value")
                    .unwrap_or_default()
                    .iter()
                    .filter_map(AnnotationValue::as_str)
                    .map(str::to_string)
                    .collect(),
                unique: index.bool_arg("unique").unwrap_or(false),
            })
            .collect()
    }
}

impl EntityModel {
    /// Check that every key and index column is a declared column.
    pub fn validate(&self) -> SqResult<()> {
        let key_columns = self
            .primary_key
            .iter()
            .flat_map(|pk| pk.columns.iter().map(|c| (c, "primary key")));
        let index_columns = self
            .indices
            .iter()
            .flat_map(|idx| idx.columns.iter().map(|c| (c, "index")));

        for (column, context) in key_columns.chain(index_columns) {
            if !self.has_column(column) {
                return Err(SqError::UnknownColumn {
                    table: self.table_name.clone(),
                    column: column.clone(),
                    context,
                });
            }
        }
        Ok(())
    }
}
