//! Column access helpers for transformers
//!
//! Each helper turns a missing or mistyped value into a `DataShape` error
//! naming the row, so the row is skipped with a readable reason.

use crate::domain::entity::Relation;
use crate::domain::ids::RowId;
use crate::domain::row::{RelatedRow, RelatedRows};
use crate::domain::{Result, SyncError};
use serde_json::{Map, Value};

/// A non-empty string column
pub fn required_str(row_id: &RowId, columns: &Map<String, Value>, name: &str) -> Result<String> {
    match columns.get(name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(SyncError::data_shape(
            row_id.as_str(),
            format!("column '{name}' is empty"),
        )),
        Some(Value::Null) | None => Err(SyncError::data_shape(
            row_id.as_str(),
            format!("column '{name}' is missing"),
        )),
        Some(other) => Err(SyncError::data_shape(
            row_id.as_str(),
            format!("column '{name}' must be a string, got {other}"),
        )),
    }
}

/// A nullable string column
pub fn optional_str(
    row_id: &RowId,
    columns: &Map<String, Value>,
    name: &str,
) -> Result<Option<String>> {
    match columns.get(name) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Null) | None => Ok(None),
        Some(other) => Err(SyncError::data_shape(
            row_id.as_str(),
            format!("column '{name}' must be a string, got {other}"),
        )),
    }
}

/// A nullable numeric column
///
/// Numeric columns may arrive as JSON strings when the source type is
/// `numeric`, so those are parsed too.
pub fn optional_f64(
    row_id: &RowId,
    columns: &Map<String, Value>,
    name: &str,
) -> Result<Option<f64>> {
    match columns.get(name) {
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| {
            SyncError::data_shape(
                row_id.as_str(),
                format!("column '{name}' is not a number: '{s}'"),
            )
        }),
        Some(Value::Null) | None => Ok(None),
        Some(other) => Err(SyncError::data_shape(
            row_id.as_str(),
            format!("column '{name}' must be a number, got {other}"),
        )),
    }
}

/// Resolve a referenced row, failing the referencing row if it is absent
pub fn resolve<'a>(
    related: &'a RelatedRows,
    row_id: &RowId,
    relation: Relation,
    id: &RowId,
) -> Result<&'a RelatedRow> {
    related.get(relation, id).ok_or_else(|| {
        SyncError::data_shape(
            row_id.as_str(),
            format!("referenced {relation} {id} not found"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn id() -> RowId {
        RowId::new("r1").unwrap()
    }

    #[test]
    fn test_required_str() {
        let cols = columns(json!({"title": "Dune", "empty": " ", "num": 3}));
        assert_eq!(required_str(&id(), &cols, "title").unwrap(), "Dune");
        assert!(required_str(&id(), &cols, "empty").is_err());
        assert!(required_str(&id(), &cols, "num").is_err());
        assert!(required_str(&id(), &cols, "missing").is_err());
    }

    #[test]
    fn test_optional_f64_accepts_numeric_strings() {
        let cols = columns(json!({"a": 7.5, "b": "8.1", "c": null, "d": "n/a"}));
        assert_eq!(optional_f64(&id(), &cols, "a").unwrap(), Some(7.5));
        assert_eq!(optional_f64(&id(), &cols, "b").unwrap(), Some(8.1));
        assert_eq!(optional_f64(&id(), &cols, "c").unwrap(), None);
        assert!(optional_f64(&id(), &cols, "d").is_err());
    }

    #[test]
    fn test_resolve_missing_is_data_shape() {
        let related = RelatedRows::new();
        let err = resolve(&related, &id(), Relation::Person, &RowId::new("p9").unwrap())
            .unwrap_err();
        assert!(matches!(err, SyncError::DataShape { .. }));
        assert!(err.to_string().contains("person p9"));
    }
}
