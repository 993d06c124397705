//! Sync coordinator
//!
//! Connects the shared clients, builds one [`EntityPipeline`] per configured
//! entity and runs them as independent tasks. Entities share only the source
//! pool, the index client and the checkpoint directory; one entity halting
//! never stops the others.

use super::pipeline::EntityPipeline;
use super::summary::{EntityReport, SyncSummary};
use crate::adapters::factory::{create_index_client, create_source_client};
use crate::adapters::index::IndexClient;
use crate::adapters::source::SourceClient;
use crate::config::{EntityConfig, SearchSyncConfig};
use crate::core::backoff::ExponentialBackoff;
use crate::core::checkpoint::{
    CheckpointManager, CheckpointStore, DeadLetterSink, FileCheckpointStore, FileDeadLetterLedger,
};
use crate::domain::{Result, SyncError};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Shared collaborators handed to every pipeline
#[derive(Clone)]
pub struct SyncComponents {
    pub source: Arc<dyn SourceClient>,
    pub index: Arc<dyn IndexClient>,
    pub checkpoints: Arc<dyn CheckpointStore>,
    pub dead_letters: Option<Arc<dyn DeadLetterSink>>,
}

impl SyncComponents {
    /// Wait until the source answers, and the index too unless `dry_run`
    ///
    /// Transient failures are retried on `backoff` for as long as it takes.
    /// Returns `Ok(false)` if shutdown was signalled before both answered.
    ///
    /// # Errors
    ///
    /// Returns the first failure that retrying cannot clear, such as rejected
    /// credentials.
    pub async fn wait_until_reachable(
        &self,
        dry_run: bool,
        mut backoff: ExponentialBackoff,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<bool> {
        let source = &self.source;
        if !retry_until_ready("source", &mut backoff, shutdown, || source.test_connection()).await? {
            return Ok(false);
        }
        tracing::info!(source = %source.describe(), "Connected to source");

        if dry_run {
            tracing::info!("DRY RUN: index will not be contacted");
            return Ok(true);
        }

        backoff.reset();
        let index = &self.index;
        if !retry_until_ready("index", &mut backoff, shutdown, || index.ping()).await? {
            return Ok(false);
        }
        tracing::info!(endpoint = %index.endpoint(), "Connected to index");
        Ok(true)
    }
}

async fn retry_until_ready<F, Fut>(
    target: &str,
    backoff: &mut ExponentialBackoff,
    shutdown: &mut watch::Receiver<bool>,
    mut check: F,
) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut attempts: u32 = 0;
    loop {
        if *shutdown.borrow() {
            return Ok(false);
        }

        attempts += 1;
        let error = match check().await {
            Ok(()) => return Ok(true),
            Err(e) if e.is_transient() => e,
            Err(e) => return Err(e),
        };

        let delay = backoff.next_delay();
        tracing::warn!(
            target_system = target,
            attempts,
            error = %error,
            retry_in_ms = delay.as_millis() as u64,
            "Not reachable yet"
        );

        let signalled = tokio::select! {
            _ = tokio::time::sleep(delay) => None,
            changed = shutdown.changed() => Some(changed.is_ok()),
        };
        // Sender dropped: nobody can request shutdown any more, finish the sleep
        if signalled == Some(false) {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Runs every configured entity pipeline
pub struct SyncCoordinator {
    config: SearchSyncConfig,
    components: SyncComponents,
    shutdown: watch::Receiver<bool>,
    only: Option<String>,
}

impl SyncCoordinator {
    /// Connect to the source, index and checkpoint directory from configuration
    ///
    /// Waits for PostgreSQL and Elasticsearch to come up, backing off on the
    /// idle schedule. The index is not contacted in dry-run mode. Returns
    /// `Ok(None)` if shutdown is signalled while waiting.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot produce clients, either
    /// system fails in a way retrying cannot clear, or the checkpoint directory
    /// cannot be created.
    pub async fn connect(
        config: SearchSyncConfig,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<Option<Self>> {
        let source = create_source_client(&config)?;
        let index = create_index_client(&config)?;

        let checkpoints: Arc<dyn CheckpointStore> =
            Arc::new(FileCheckpointStore::open(&config.checkpoint.path).await?);
        let dead_letters: Option<Arc<dyn DeadLetterSink>> = if config.checkpoint.dead_letter {
            Some(Arc::new(FileDeadLetterLedger::new(&config.checkpoint.path)))
        } else {
            None
        };

        let components = SyncComponents {
            source,
            index,
            checkpoints,
            dead_letters,
        };

        let reachable = components
            .wait_until_reachable(
                config.application.dry_run,
                config.sync.idle_backoff.backoff(),
                &mut shutdown,
            )
            .await?;
        if !reachable {
            tracing::info!("Shutdown requested before the source and index were reachable");
            return Ok(None);
        }

        Ok(Some(Self::with_components(config, components, shutdown)))
    }

    /// Build a coordinator around existing collaborators
    pub fn with_components(
        config: SearchSyncConfig,
        components: SyncComponents,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            components,
            shutdown,
            only: None,
        }
    }

    /// Restrict the run to a single entity
    pub fn only_entity(mut self, entity: Option<String>) -> Self {
        self.only = entity;
        self
    }

    fn selected_entities(&self) -> Result<Vec<EntityConfig>> {
        match &self.only {
            Some(name) => self
                .config
                .entity(name)
                .cloned()
                .map(|e| vec![e])
                .ok_or_else(|| {
                    SyncError::Configuration(format!("Entity '{name}' is not configured"))
                }),
            None => Ok(self.config.entities.clone()),
        }
    }

    /// Run every selected pipeline until shutdown or halt
    ///
    /// # Errors
    ///
    /// Returns an error only if the entity selection is invalid; per-entity
    /// failures are reported in the summary.
    pub async fn run(self) -> Result<SyncSummary> {
        let start = Instant::now();
        let entities = self.selected_entities()?;
        let checkpoints = Arc::new(CheckpointManager::new(
            self.components.checkpoints.clone(),
            self.config.application.dry_run,
        ));

        let mut reports = Vec::new();
        let mut names = Vec::new();
        let mut handles = Vec::new();

        for entity in &entities {
            match EntityPipeline::build(
                entity,
                &self.config,
                &self.components,
                checkpoints.clone(),
                self.shutdown.clone(),
            ) {
                Ok(pipeline) => {
                    names.push(entity.name.clone());
                    handles.push(tokio::spawn(pipeline.run()));
                }
                Err(e) => {
                    crate::log_error_with_context!(&e, format!("entity '{}' not started", entity.name));
                    reports.push(EntityReport::fatal(entity.name.clone(), e.to_string()));
                }
            }
        }

        tracing::info!(
            started = handles.len(),
            halted = reports.len(),
            dry_run = self.config.application.dry_run,
            "Sync pipelines running"
        );

        let results = futures::future::join_all(handles).await;
        for (name, result) in names.into_iter().zip(results) {
            match result {
                Ok(report) => reports.push(report),
                Err(e) => {
                    tracing::error!(entity = %name, error = %e, "Entity pipeline task failed");
                    reports.push(EntityReport::fatal(name, format!("pipeline task failed: {e}")));
                }
            }
        }

        Ok(SyncSummary::new(reports).with_duration(start.elapsed()))
    }
}
