//! Person documents

use super::fields::{required_str, resolve};
use super::Transformer;
use crate::domain::entity::{EntityKind, Relation};
use crate::domain::ids::RowId;
use crate::domain::row::{RelatedRows, SourceRow};
use crate::domain::Result;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Serialize)]
struct FilmCredit {
    id: String,
    roles: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PersonDocument {
    id: String,
    full_name: String,
    films: Vec<FilmCredit>,
}

/// Builds `persons` documents
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonTransformer;

impl Transformer for PersonTransformer {
    fn kind(&self) -> EntityKind {
        EntityKind::Persons
    }

    fn build_body(&self, row: &SourceRow, related: &RelatedRows) -> Result<Value> {
        let full_name = required_str(&row.id, &row.columns, "full_name")?;

        let mut films: BTreeMap<RowId, BTreeSet<String>> = BTreeMap::new();
        for reference in row
            .references
            .iter()
            .filter(|r| r.relation == Relation::FilmWork)
        {
            resolve(related, &row.id, Relation::FilmWork, &reference.id)?;
            let roles = films.entry(reference.id.clone()).or_default();
            if let Some(role) = &reference.role {
                roles.insert(role.clone());
            }
        }

        let doc = PersonDocument {
            id: row.id.as_str().to_string(),
            full_name,
            films: films
                .into_iter()
                .map(|(id, roles)| FilmCredit {
                    id: id.into_inner(),
                    roles: roles.into_iter().collect(),
                })
                .collect(),
        };
        Ok(serde_json::to_value(doc)?)
    }
}
