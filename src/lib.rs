//! # sqforge: annotated schemas to SQLDelight
//!
//! sqforge turns annotated entity and data-access declarations into `.sq`
//! files: table and index DDL for entities, labelled statements for DAOs.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use sqforge::prelude::*;
//!
//! let catalog = Catalog::load(Path::new("schema.json"))?;
//! let outcome = Processor::default().process(&catalog);
//!
//! for file in &outcome.files {
//!     println!("{}", file.text);
//! }
//! // => CREATE TABLE user (
//! //        id INTEGER PRIMARY KEY AUTOINCREMENT,
//! //        name TEXT NOT NULL
//! //    );
//! ```
//!
//! ## Pipeline
//!
//! | Stage               | Input                | Output            |
//! |---------------------|----------------------|-------------------|
//! | [`types`]           | resolved type        | storage class     |
//! | [`schema`]          | entity declaration   | [`model::EntityModel`] |
//! | [`dao`]             | DAO declaration      | [`model::SqlStatement`]s |
//! | [`generator`]       | models               | SQL text          |

pub mod config;
pub mod dao;
pub mod decl;
pub mod error;
pub mod generator;
pub mod model;
pub mod parser;
pub mod processor;
pub mod schema;
pub mod types;
pub mod verify;
pub mod writer;

pub use parser::normalize_sql;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::decl::{Catalog, Declaration};
    pub use crate::error::*;
    pub use crate::generator::ToSql;
    pub use crate::model::*;
    pub use crate::parser::normalize_sql;
    pub use crate::processor::{Explanation, ProcessOutcome, Processor};
    pub use crate::types::{SqlType, TypeMapper};
    pub use crate::verify::verify_schema;
    pub use crate::writer::{SqFile, UnitKind, write_all};
}

/// Render the DDL of one entity declaration with the default configuration.
///
/// # Example
///
/// ```
/// use sqforge::decl::Declaration;
///
/// let decl: Declaration = serde_json::from_str(r#"{
///     "name": "Tag",
///     "properties": [{ "name": "label", "type": { "name": "kotlin.String" } }]
/// }"#).unwrap();
///
/// let sql = sqforge::entity_sql(&decl).unwrap();
/// assert_eq!(sql, "CREATE TABLE Tag (\n    label TEXT NOT NULL\n);\n");
/// ```
pub fn entity_sql(decl: &decl::Declaration) -> Result<String, error::SqError> {
    processor::Processor::default()
        .render_entity(decl)
        .map(|file| file.text)
}

/// Render the statements of one DAO declaration with the default configuration.
pub fn dao_sql(
    catalog: &decl::Catalog,
    decl: &decl::Declaration,
) -> Result<String, error::SqError> {
    processor::Processor::default()
        .render_dao(catalog, decl)
        .map(|file| file.text)
}
