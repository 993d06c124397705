//! Source rows and their joined relations

use super::entity::Relation;
use super::ids::RowId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Foreign key from a source row to a related row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRef {
    pub relation: Relation,
    pub id: RowId,
    /// Link qualifier such as `actor` or `director`
    #[serde(default)]
    pub role: Option<String>,
}

impl RowRef {
    pub fn new(relation: Relation, id: RowId) -> Self {
        Self {
            relation,
            id,
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// A changed row fetched from the source
///
/// Immutable once fetched. `modified_at` is the value the cursor is compared
/// against, so for joined kinds it already folds in the related rows' times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    pub id: RowId,
    pub modified_at: DateTime<Utc>,
    #[serde(default)]
    pub references: Vec<RowRef>,
    #[serde(default)]
    pub columns: Map<String, Value>,
    /// Set when the row was fetched but its columns could not be decoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decode_error: Option<String>,
}

impl SourceRow {
    pub fn new(id: RowId, modified_at: DateTime<Utc>) -> Self {
        Self {
            id,
            modified_at,
            references: Vec::new(),
            columns: Map::new(),
            decode_error: None,
        }
    }

    /// A fetched row that keeps its position but carries no usable data
    pub fn undecodable(id: RowId, modified_at: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self {
            decode_error: Some(reason.into()),
            ..Self::new(id, modified_at)
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, value: Value) -> Self {
        self.columns.insert(name.into(), value);
        self
    }

    pub fn with_reference(mut self, reference: RowRef) -> Self {
        self.references.push(reference);
        self
    }

    /// Compound ordering key
    pub fn position(&self) -> (DateTime<Utc>, &RowId) {
        (self.modified_at, &self.id)
    }
}

/// A row looked up by key to complete a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedRow {
    pub relation: Relation,
    pub id: RowId,
    #[serde(default)]
    pub columns: Map<String, Value>,
}

impl RelatedRow {
    pub fn new(relation: Relation, id: RowId) -> Self {
        Self {
            relation,
            id,
            columns: Map::new(),
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, value: Value) -> Self {
        self.columns.insert(name.into(), value);
        self
    }
}

/// Related rows resolved for a batch, keyed by relation and id
#[derive(Debug, Clone, Default)]
pub struct RelatedRows {
    rows: HashMap<(Relation, RowId), RelatedRow>,
}

impl RelatedRows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, row: RelatedRow) {
        self.rows.insert((row.relation, row.id.clone()), row);
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = RelatedRow>) {
        for row in rows {
            self.insert(row);
        }
    }

    pub fn get(&self, relation: Relation, id: &RowId) -> Option<&RelatedRow> {
        self.rows.get(&(relation, id.clone()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Collect the distinct keys a batch references, grouped by relation
pub fn requested_relations(rows: &[SourceRow]) -> BTreeMap<Relation, BTreeSet<RowId>> {
    let mut requested: BTreeMap<Relation, BTreeSet<RowId>> = BTreeMap::new();
    for reference in rows.iter().flat_map(|row| row.references.iter()) {
        requested
            .entry(reference.relation)
            .or_default()
            .insert(reference.id.clone());
    }
    requested
}
