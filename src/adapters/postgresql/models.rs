//! Row decoding for PostgreSQL results
//!
//! Decoding goes through [`RawChangedRow`] so that the conversion into domain
//! rows can be tested without a database.

use crate::domain::entity::Relation;
use crate::domain::ids::RowId;
use crate::domain::row::{RelatedRow, RowRef, SourceRow};
use crate::domain::{Result, SourceError};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio_postgres::Row;

/// Columns of one change-query row, before validation
///
/// Only `modified_at` is required to read the row. Anything else that fails to
/// read is kept in `unreadable` so the row can still be placed in the batch.
#[derive(Debug, Clone)]
pub struct RawChangedRow {
    pub id: Option<String>,
    pub modified_at: DateTime<Utc>,
    pub columns: Option<Value>,
    pub refs: Option<Value>,
    pub unreadable: Option<String>,
}

impl RawChangedRow {
    /// Read the four change-query columns from a result row
    ///
    /// # Errors
    ///
    /// Fails only when `modified_at` cannot be read, since such a row has no
    /// position to advance past.
    pub fn from_row(row: &Row) -> Result<Self> {
        let modified_at = get(row, "modified_at")?;
        let mut unreadable = None;
        let mut read = |column: &str| -> Option<Value> {
            match get::<Option<Value>>(row, column) {
                Ok(value) => value,
                Err(e) => {
                    unreadable.get_or_insert_with(|| e.to_string());
                    None
                }
            }
        };
        let columns = read("columns");
        let refs = read("refs");

        let id = match get::<Option<String>>(row, "id") {
            Ok(id) => id,
            Err(e) => {
                unreadable.get_or_insert_with(|| e.to_string());
                None
            }
        };

        Ok(Self {
            id,
            modified_at,
            columns,
            refs,
            unreadable,
        })
    }

    /// Convert into a domain row
    ///
    /// A row that fails validation is returned flagged undecodable, keyed by its
    /// id when it has one, so the batch can skip it and move past it.
    pub fn into_source_row(self) -> SourceRow {
        let id = self
            .id
            .clone()
            .and_then(|id| RowId::new(id).ok())
            .unwrap_or_else(RowId::min);
        let modified_at = self.modified_at;

        match self.validate() {
            Ok(row) => row,
            Err(reason) => {
                tracing::warn!(row_id = %id, reason = %reason, "Undecodable source row");
                SourceRow::undecodable(id, modified_at, reason)
            }
        }
    }

    fn validate(self) -> std::result::Result<SourceRow, String> {
        if let Some(reason) = self.unreadable {
            return Err(reason);
        }

        let id = RowId::new(self.id.unwrap_or_default())?;

        let columns = match self.columns {
            Some(Value::Object(map)) => map,
            None | Some(Value::Null) => serde_json::Map::new(),
            Some(other) => {
                return Err(format!(
                    "row {id}: columns must be a JSON object, got {other}"
                ))
            }
        };

        let references: Vec<RowRef> = match self.refs {
            None | Some(Value::Null) => Vec::new(),
            Some(refs) => serde_json::from_value(refs)
                .map_err(|e| format!("row {id}: malformed references: {e}"))?,
        };

        let mut row = SourceRow::new(id, self.modified_at);
        row.references = references;
        row.columns = columns;
        Ok(row)
    }
}

/// Decode a related-row lookup result
pub fn related_from_row(relation: Relation, row: &Row) -> Result<RelatedRow> {
    let id: String = get(row, "id")?;
    let columns: Value = get(row, "columns")?;

    let id = RowId::new(id).map_err(SourceError::InvalidRow)?;
    let columns = match columns {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    Ok(RelatedRow {
        relation,
        id,
        columns,
    })
}

fn get<'a, T>(row: &'a Row, column: &str) -> Result<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(column).map_err(|e| {
        SourceError::InvalidRow(format!("failed to read column '{column}': {e}")).into()
    })
}
