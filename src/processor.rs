//! Manifest processing.
//!
//! Every entity, then every data-access declaration, is extracted and
//! rendered independently. A failing declaration produces no file and does
//! not stop the others.

use crate::config::{AnnotationNames, Config};
use crate::dao::StatementExtractor;
use crate::decl::{Catalog, Declaration};
use crate::error::{SqError, SqResult};
use crate::generator::ToSql;
use crate::model::{EntityModel, SqlStatement};
use crate::schema::EntityExtractor;
use crate::types::TypeMapper;
use crate::writer::{SqFile, UnitKind};

/// A declaration that produced no output.
#[derive(Debug)]
pub struct UnitFailure {
    /// Qualified name of the declaration
    pub declaration: String,
    pub error: SqError,
}

/// Everything one processing pass produced.
#[derive(Debug, Default)]
pub struct ProcessOutcome {
    pub files: Vec<SqFile>,
    pub failures: Vec<UnitFailure>,
}

impl ProcessOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The extracted models of a catalog, for inspection.
#[derive(Debug, Default)]
pub struct Explanation {
    /// Qualified name and table model, in manifest order
    pub entities: Vec<(String, EntityModel)>,
    /// Qualified name and statements, in manifest order
    pub daos: Vec<(String, Vec<SqlStatement>)>,
    pub failures: Vec<UnitFailure>,
}

impl Explanation {
    /// `{"entities": {..}, "daos": {..}, "failures": {name: message}}`
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        let mut entities = serde_json::Map::new();
        for (name, model) in &self.entities {
            entities.insert(name.clone(), serde_json::to_value(model)?);
        }
        let mut daos = serde_json::Map::new();
        for (name, statements) in &self.daos {
            daos.insert(name.clone(), serde_json::to_value(statements)?);
        }
        let failures: serde_json::Map<String, serde_json::Value> = self
            .failures
            .iter()
            .map(|f| (f.declaration.clone(), f.error.to_string().into()))
            .collect();

        Ok(serde_json::json!({
            "entities": entities,
            "daos": daos,
            "failures": failures,
        }))
    }
}

/// Turns a [`Catalog`] into `.sq` files.
pub struct Processor {
    config: Config,
    mapper: TypeMapper,
    names: AnnotationNames,
    wrappers: Vec<String>,
}

impl Processor {
    pub fn new(config: Config) -> Self {
        Self {
            mapper: config.type_mapper(),
            names: config.annotation_names(),
            wrappers: config.wrapper_types(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn entity_extractor(&self) -> EntityExtractor<'_> {
        EntityExtractor::new(&self.mapper, &self.names)
    }

    /// Extract the table model of an entity declaration.
    pub fn entity_model(&self, decl: &Declaration) -> SqResult<EntityModel> {
        let model = self.entity_extractor().extract(decl)?;
        if self.config.validate_references {
            model.validate()?;
        }
        Ok(model)
    }

    /// Extract the statements of a data-access declaration.
    pub fn statements(&self, catalog: &Catalog, decl: &Declaration) -> SqResult<Vec<SqlStatement>> {
        StatementExtractor::new(catalog, self.entity_extractor(), &self.names, &self.wrappers)
            .strict(self.config.strict_directives)
            .extract(decl)
    }

    pub fn render_entity(&self, decl: &Declaration) -> SqResult<SqFile> {
        let sql = self.entity_model(decl)?.to_sql();
        SqFile::new(decl, sql, UnitKind::Entity, &self.config)
    }

    pub fn render_dao(&self, catalog: &Catalog, decl: &Declaration) -> SqResult<SqFile> {
        let sql = self.statements(catalog, decl)?.to_sql();
        SqFile::new(decl, sql, UnitKind::Dao, &self.config)
    }

    /// Process every declaration in the catalog.
    pub fn process(&self, catalog: &Catalog) -> ProcessOutcome {
        tracing::info!(
            "Processing {} entities and {} DAOs",
            catalog.entities.len(),
            catalog.daos.len()
        );

        let mut outcome = ProcessOutcome::default();

        let entity_results = catalog
            .entities
            .iter()
            .map(|decl| (decl, self.render_entity(decl)));
        let dao_results = catalog
            .daos
            .iter()
            .map(|decl| (decl, self.render_dao(catalog, decl)));

        for (decl, result) in entity_results.chain(dao_results) {
            match result {
                Ok(file) => outcome.files.push(file),
                Err(error) => {
                    tracing::warn!("Skipping {}: {}", decl.qualified_name(), error);
                    outcome.failures.push(UnitFailure {
                        declaration: decl.qualified_name(),
                        error,
                    });
                }
            }
        }

        outcome
    }
}

impl Processor {
    /// Extract every model without rendering, keeping failures per declaration.
    pub fn explain(&self, catalog: &Catalog) -> Explanation {
        let mut explanation = Explanation::default();

        for decl in &catalog.entities {
            match self.entity_model(decl) {
                Ok(model) => explanation.entities.push((decl.qualified_name(), model)),
                Err(error) => explanation.failures.push(UnitFailure {
                    declaration: decl.qualified_name(),
                    error,
                }),
            }
        }
        for decl in &catalog.daos {
            match self.statements(catalog, decl) {
                Ok(statements) => explanation.daos.push((decl.qualified_name(), statements)),
                Err(error) => explanation.failures.push(UnitFailure {
                    declaration: decl.qualified_name(),
                    error,
                }),
            }
        }

        explanation
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Catalog {
        serde_json::from_value(json!({
            "entities": [{
                "name": "Note",
                "package": "app.db",
                "properties": [
                    {
                        "name": "id",
                        "type": { "name": "kotlin.Long" },
                        "annotations": [{ "name": "androidx.room.PrimaryKey", "arguments": { "autoGenerate": true } }]
                    },
                    { "name": "body", "type": { "name": "kotlin.String" } }
                ]
            }, {
                "name": "Attachment",
                "package": "app.db",
                "properties": [{ "name": "data", "type": { "name": "kotlin.ByteArray" } }]
            }],
            "daos": [{
                "name": "NoteDao",
                "package": "app.db",
                "methods": [{
                    "name": "add",
                    "parameters": [{ "name": "note", "type": { "name": "app.db.Note" } }],
                    "annotations": [{ "name": "androidx.room.Insert" }]
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_failures_are_isolated() {
        let outcome = Processor::default().process(&catalog());

        assert!(!outcome.is_success());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].declaration, "app.db.Attachment");

        let names: Vec<&str> = outcome.files.iter().map(|f| f.output_name.as_str()).collect();
        assert_eq!(names, vec!["SQNote", "SQNoteDao"]);
        assert_eq!(outcome.files[0].kind, UnitKind::Entity);
        assert_eq!(outcome.files[1].kind, UnitKind::Dao);
    }

    #[test]
    fn test_dao_text() {
        let catalog = catalog();
        let processor = Processor::default();
        let file = processor.render_dao(&catalog, &catalog.daos[0]).unwrap();
        assert_eq!(
            file.text,
            "add:\nINSERT INTO Note(\n  id,\n  body\n) VALUES (?, ?);\n\n"
        );
    }

    #[test]
    fn test_reference_validation_is_opt_in() {
        let decl: Declaration = serde_json::from_value(json!({
            "name": "Link",
            "annotations": [{
                "name": "androidx.room.Entity",
                "arguments": { "primaryKeys": ["from", "to"] }
            }],
            "properties": [{ "name": "from", "type": { "name": "kotlin.Long" } }]
        }))
        .unwrap();

        assert!(Processor::default().render_entity(&decl).is_ok());

        let strict = Processor::new(Config::builder().validate_references(true).build());
        assert!(matches!(
            strict.render_entity(&decl).unwrap_err(),
            SqError::UnknownColumn { ref column, .. } if column == "to"
        ));
    }

    #[test]
    fn test_explain_keeps_going_after_failure() {
        let explanation = Processor::default().explain(&catalog());

        assert_eq!(explanation.entities.len(), 1);
        assert_eq!(explanation.entities[0].0, "app.db.Note");
        assert_eq!(explanation.daos.len(), 1);
        assert_eq!(explanation.failures.len(), 1);

        let report = explanation.to_json().unwrap();
        assert_eq!(report["entities"]["app.db.Note"]["table_name"], "Note");
        assert_eq!(report["daos"]["app.db.NoteDao"][0]["kind"], "insert");
        assert_eq!(
            report["failures"]["app.db.Attachment"],
            "Unsupported type: kotlin.ByteArray"
        );
    }
}
