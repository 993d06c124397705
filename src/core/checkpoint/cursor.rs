//! Sync cursor model
//!
//! A cursor marks the last row an entity has fully processed. Rows are ordered
//! by `(modified_at, id)`, so rows sharing a timestamp are still totally ordered.

use crate::domain::ids::{EntityName, RowId};
use crate::domain::row::SourceRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// 0001-01-01T00:00:00Z in Unix seconds
///
/// Earlier than any real modification time and still inside the range
/// PostgreSQL `timestamptz` accepts as a bind parameter.
const EPOCH_ZERO_SECS: i64 = -62_135_596_800;

fn epoch_zero_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp(EPOCH_ZERO_SECS, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Per-entity position in the source change stream
///
/// # Examples
///
/// ```
/// use searchsync::core::checkpoint::SyncCursor;
/// use searchsync::domain::{EntityName, RowId, SourceRow};
/// use chrono::{TimeZone, Utc};
///
/// let entity = EntityName::new("movies").unwrap();
/// let cursor = SyncCursor::epoch_zero(entity);
///
/// let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
/// let row = SourceRow::new(RowId::new("a").unwrap(), ts);
/// assert!(cursor.admits(&row));
///
/// let advanced = cursor.advanced_to(&row);
/// assert!(!advanced.admits(&row));
/// assert!(cursor.precedes(&advanced));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCursor {
    pub entity: EntityName,
    pub watermark_timestamp: DateTime<Utc>,
    pub watermark_id: RowId,
}

impl SyncCursor {
    /// Cursor for an entity that has never been synced
    pub fn epoch_zero(entity: EntityName) -> Self {
        Self {
            entity,
            watermark_timestamp: epoch_zero_timestamp(),
            watermark_id: RowId::min(),
        }
    }

    pub fn new(entity: EntityName, watermark_timestamp: DateTime<Utc>, watermark_id: RowId) -> Self {
        Self {
            entity,
            watermark_timestamp,
            watermark_id,
        }
    }

    /// Compound position compared by the change query
    pub fn position(&self) -> (DateTime<Utc>, &RowId) {
        (self.watermark_timestamp, &self.watermark_id)
    }

    pub fn is_epoch_zero(&self) -> bool {
        self.watermark_timestamp == epoch_zero_timestamp() && self.watermark_id.is_min()
    }

    /// Compare positions, ignoring the entity
    pub fn compare(&self, other: &SyncCursor) -> Ordering {
        self.position().cmp(&other.position())
    }

    /// Whether this cursor sits strictly before `other`
    pub fn precedes(&self, other: &SyncCursor) -> bool {
        self.compare(other) == Ordering::Less
    }

    /// Whether `row` lies strictly after this cursor
    pub fn admits(&self, row: &SourceRow) -> bool {
        row.position() > self.position()
    }

    /// Cursor positioned on `row`
    pub fn advanced_to(&self, row: &SourceRow) -> Self {
        Self {
            entity: self.entity.clone(),
            watermark_timestamp: row.modified_at,
            watermark_id: row.id.clone(),
        }
    }
}

impl fmt::Display for SyncCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, '{}')",
            self.watermark_timestamp.to_rfc3339(),
            self.watermark_id
        )
    }
}
