//! PostgreSQL adapter implementing the source trait

use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{related_from_row, RawChangedRow};
use crate::adapters::postgresql::queries;
use crate::adapters::source::SourceClient;
use crate::core::checkpoint::SyncCursor;
use crate::domain::entity::{EntityKind, Relation};
use crate::domain::ids::RowId;
use crate::domain::row::{RelatedRow, SourceRow};
use crate::domain::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// PostgreSQL implementation of [`SourceClient`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

#[async_trait]
impl SourceClient for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn fetch_changed(
        &self,
        kind: EntityKind,
        cursor: &SyncCursor,
        limit: usize,
    ) -> Result<Vec<SourceRow>> {
        let sql = queries::changed_rows(kind, self.client.schema());
        let limit = limit as i64;

        let rows = self
            .client
            .query(
                &sql,
                &[
                    &cursor.watermark_timestamp,
                    &cursor.watermark_id.as_str(),
                    &limit,
                ],
            )
            .await?;

        tracing::debug!(
            entity = %cursor.entity,
            kind = %kind,
            cursor = %cursor,
            fetched = rows.len(),
            "Fetched changed rows"
        );

        rows.iter()
            .map(|row| RawChangedRow::from_row(row).map(RawChangedRow::into_source_row))
            .collect()
    }

    async fn fetch_related(&self, relation: Relation, ids: &[RowId]) -> Result<Vec<RelatedRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = queries::related_rows(relation, self.client.schema());
        let keys: Vec<&str> = ids.iter().map(RowId::as_str).collect();

        let rows = self.client.query(&sql, &[&keys]).await?;

        tracing::debug!(
            relation = %relation,
            requested = ids.len(),
            found = rows.len(),
            "Fetched related rows"
        );

        rows.iter()
            .map(|row| related_from_row(relation, row))
            .collect()
    }

    fn describe(&self) -> String {
        self.client.connection_string_safe()
    }
}
