//! Ordered change batches

use crate::core::checkpoint::SyncCursor;
use crate::domain::row::SourceRow;
use crate::domain::{Result, SourceError};

/// Rows changed after a cursor, in ascending `(modified_at, id)` order
///
/// Construction checks the source's half of the contract: no more than `limit`
/// rows, strictly ascending, all strictly after the cursor. A batch built from
/// a cursor therefore never overlaps the batch that produced that cursor.
#[derive(Debug, Clone)]
pub struct ChangeBatch {
    cursor: SyncCursor,
    rows: Vec<SourceRow>,
}

impl ChangeBatch {
    /// Validate rows fetched from `cursor`
    ///
    /// # Errors
    ///
    /// Returns a `ContractViolation` source error if the rows are over the
    /// limit, out of order, duplicated, or not after the cursor.
    pub fn new(cursor: SyncCursor, rows: Vec<SourceRow>, limit: usize) -> Result<Self> {
        if rows.len() > limit {
            return Err(SourceError::ContractViolation(format!(
                "{} rows returned for a page limit of {}",
                rows.len(),
                limit
            ))
            .into());
        }

        if let Some(first) = rows.first() {
            if !cursor.admits(first) {
                return Err(SourceError::ContractViolation(format!(
                    "row {} at {} is not after cursor {}",
                    first.id,
                    first.modified_at.to_rfc3339(),
                    cursor
                ))
                .into());
            }
        }

        if let Some(pair) = rows
            .windows(2)
            .find(|pair| pair[0].position() >= pair[1].position())
        {
            return Err(SourceError::ContractViolation(format!(
                "rows out of order: {} at {} followed by {} at {}",
                pair[0].id,
                pair[0].modified_at.to_rfc3339(),
                pair[1].id,
                pair[1].modified_at.to_rfc3339()
            ))
            .into());
        }

        Ok(Self { cursor, rows })
    }

    /// Cursor the batch was polled from
    pub fn cursor(&self) -> &SyncCursor {
        &self.cursor
    }

    pub fn rows(&self) -> &[SourceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cursor positioned on the last row, or the polled cursor for an empty batch
    pub fn advanced_cursor(&self) -> SyncCursor {
        match self.rows.last() {
            Some(last) => self.cursor.advanced_to(last),
            None => self.cursor.clone(),
        }
    }

    /// Find a row by id
    pub fn row(&self, id: &crate::domain::ids::RowId) -> Option<&SourceRow> {
        self.rows.iter().find(|row| &row.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{EntityName, RowId};
    use chrono::{TimeZone, Utc};

    fn cursor() -> SyncCursor {
        SyncCursor::epoch_zero(EntityName::new("genres").unwrap())
    }

    fn row(id: &str, secs: i64) -> SourceRow {
        SourceRow::new(RowId::new(id).unwrap(), Utc.timestamp_opt(secs, 0).unwrap())
    }

    #[test]
    fn test_valid_batch_advances_to_last_row() {
        let batch = ChangeBatch::new(
            cursor(),
            vec![row("b", 10), row("a", 20), row("c", 20)],
            3,
        )
        .unwrap();

        let advanced = batch.advanced_cursor();
        assert_eq!(advanced.watermark_id.as_str(), "c");
        assert_eq!(advanced.watermark_timestamp.timestamp(), 20);
        assert!(batch.row(&RowId::new("a").unwrap()).is_some());
    }

    #[test]
    fn test_over_limit_rejected() {
        let err = ChangeBatch::new(cursor(), vec![row("a", 1), row("b", 2)], 1).unwrap_err();
        assert!(err.to_string().contains("page limit"));
    }

    #[test]
    fn test_out_of_order_rejected() {
        let result = ChangeBatch::new(cursor(), vec![row("b", 20), row("a", 20)], 10);
        assert!(result.is_err());

        let result = ChangeBatch::new(cursor(), vec![row("a", 20), row("a", 20)], 10);
        assert!(result.is_err());
    }

    #[test]
    fn test_overlap_with_cursor_rejected() {
        let at_boundary = cursor().advanced_to(&row("b", 20));
        let result = ChangeBatch::new(at_boundary, vec![row("b", 20)], 10);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_batch_keeps_cursor() {
        let batch = ChangeBatch::new(cursor(), Vec::new(), 10).unwrap();
        assert!(batch.is_empty());
        assert!(batch.advanced_cursor().is_epoch_zero());
    }
}
