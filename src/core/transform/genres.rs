//! Genre documents

use super::fields::{optional_str, required_str};
use super::Transformer;
use crate::domain::entity::EntityKind;
use crate::domain::row::{RelatedRows, SourceRow};
use crate::domain::Result;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
struct GenreDocument {
    id: String,
    name: String,
    description: Option<String>,
}

/// Builds `genres` documents
#[derive(Debug, Clone, Copy, Default)]
pub struct GenreTransformer;

impl Transformer for GenreTransformer {
    fn kind(&self) -> EntityKind {
        EntityKind::Genres
    }

    fn build_body(&self, row: &SourceRow, _related: &RelatedRows) -> Result<Value> {
        let doc = GenreDocument {
            id: row.id.as_str().to_string(),
            name: required_str(&row.id, &row.columns, "name")?,
            description: optional_str(&row.id, &row.columns, "description")?,
        };
        Ok(serde_json::to_value(doc)?)
    }
}
