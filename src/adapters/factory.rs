//! Adapter factory
//!
//! Builds the source and index clients from configuration.

use crate::adapters::elasticsearch::ElasticsearchClient;
use crate::adapters::index::IndexClient;
use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::adapters::source::SourceClient;
use crate::config::schema::SearchSyncConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the relational source client
///
/// # Errors
///
/// Returns an error if the connection settings are invalid
pub fn create_source_client(config: &SearchSyncConfig) -> Result<Arc<dyn SourceClient>> {
    let client = PostgreSQLClient::new(config.source.clone())?;
    tracing::info!(
        source = %client.connection_string_safe(),
        schema = %config.source.schema,
        max_connections = config.source.max_connections,
        "Creating PostgreSQL source client"
    );
    Ok(Arc::new(PostgreSQLAdapter::new(client)))
}

/// Create the search index client
///
/// # Errors
///
/// Returns an error if the index URL is invalid or the HTTP client cannot be built
pub fn create_index_client(config: &SearchSyncConfig) -> Result<Arc<dyn IndexClient>> {
    let client = ElasticsearchClient::new(&config.index)?;
    tracing::info!(endpoint = %client.endpoint(), "Creating Elasticsearch index client");
    Ok(Arc::new(client))
}
