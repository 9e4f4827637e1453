// ── Workspace facade ──
//
// Owns the backend, the collection store, the mutation coordinator,
// the enricher, and the current resume document. Cheaply cloneable;
// all state lives behind one `Arc`.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future::join_all;
use taskdeck_api::{RemoteClient, UploadFile};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::backend::Backend;
use crate::command::{Mutation, MutationCoordinator, MutationOutcome};
use crate::config::ClientConfig;
use crate::enricher::{EnricherConfig, FanOutEnricher};
use crate::error::CoreError;
use crate::model::{EnrichmentBatch, ItemId, ParentKey, ParentUnit};
use crate::store::{CollectionSnapshot, CollectionStore, RefreshOutcome};
use crate::stream::SnapshotStream;

/// The parent units of the most recently uploaded document.
pub type Document = Arc<Vec<ParentUnit>>;

#[derive(Clone)]
pub struct Workspace {
    inner: Arc<WorkspaceInner>,
}

struct WorkspaceInner {
    config: ClientConfig,
    backend: Arc<dyn Backend>,
    store: Arc<CollectionStore>,
    mutations: MutationCoordinator,
    enricher: FanOutEnricher,
    document: watch::Sender<Document>,
    uploads_issued: AtomicU64,
    /// Sequence of the upload whose result is currently published.
    upload_applied: AtomicU64,
}

impl Workspace {
    /// Build a workspace talking HTTP to `config.server`.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let client = RemoteClient::new(config.server.as_str(), &config.transport())?;
        info!(server = %config.server, "workspace created");
        Ok(Self::with_backend(Arc::new(client), config))
    }

    /// Build a workspace over any backend.
    pub fn with_backend(backend: Arc<dyn Backend>, config: ClientConfig) -> Self {
        let store = Arc::new(CollectionStore::new(Arc::clone(&backend)));
        let mutations = MutationCoordinator::new(Arc::clone(&backend), Arc::clone(&store));
        let enricher = FanOutEnricher::new(
            Arc::clone(&backend),
            EnricherConfig {
                max_concurrency: config.max_concurrent_enrichments,
            },
        );
        let (document, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            inner: Arc::new(WorkspaceInner {
                config,
                backend,
                store,
                mutations,
                enricher,
                document,
                uploads_issued: AtomicU64::new(0),
                upload_applied: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<CollectionStore> {
        &self.inner.store
    }

    pub fn mutations(&self) -> &MutationCoordinator {
        &self.inner.mutations
    }

    pub fn enricher(&self) -> &FanOutEnricher {
        &self.inner.enricher
    }

    // ── Collection ───────────────────────────────────────────────────

    pub async fn refresh(&self) -> Result<RefreshOutcome, CoreError> {
        self.inner.store.refresh().await
    }

    pub fn snapshot(&self) -> Arc<CollectionSnapshot> {
        self.inner.store.snapshot()
    }

    pub fn subscribe_items(&self) -> SnapshotStream<Arc<CollectionSnapshot>> {
        self.inner.store.subscribe()
    }

    pub async fn execute(&self, mutation: Mutation) -> Result<MutationOutcome, CoreError> {
        self.inner.mutations.execute(mutation).await
    }

    pub async fn create_item(&self, text: impl Into<String>) -> Result<MutationOutcome, CoreError> {
        self.inner.mutations.create_item(text).await
    }

    pub async fn update_item(
        &self,
        id: &ItemId,
        text: impl Into<String>,
    ) -> Result<MutationOutcome, CoreError> {
        self.inner.mutations.update_item(id, text).await
    }

    pub async fn delete_item(&self, id: &ItemId) -> Result<MutationOutcome, CoreError> {
        self.inner.mutations.delete_item(id).await
    }

    // ── Resume document ──────────────────────────────────────────────

    /// Upload a resume and publish its positions.
    ///
    /// On failure the previously published document stays. If a newer
    /// upload was issued meanwhile, this result is returned but not
    /// published. Enrichment state for positions absent from the new
    /// document is dropped.
    pub async fn upload_resume(&self, file: &UploadFile) -> Result<Document, CoreError> {
        let seq = self.inner.uploads_issued.fetch_add(1, Ordering::SeqCst) + 1;
        info!(file = %file.file_name, bytes = file.content.len(), "uploading resume");

        let units: Document = Arc::new(
            self.inner
                .backend
                .upload_document(file)
                .await?
                .into_iter()
                .enumerate()
                .map(|(index, unit)| unit.with_index(index))
                .collect(),
        );

        let published = self.inner.document.send_if_modified(|current| {
            if seq != self.inner.uploads_issued.load(Ordering::SeqCst)
                || seq <= self.inner.upload_applied.load(Ordering::SeqCst)
            {
                return false;
            }
            self.inner.upload_applied.store(seq, Ordering::SeqCst);
            *current = Arc::clone(&units);
            true
        });

        if published {
            let keys: HashSet<ParentKey> = units.iter().map(ParentUnit::key).collect();
            self.inner.enricher.retain(|key| keys.contains(key));
            info!(positions = units.len(), "resume parsed");
        } else {
            debug!(seq, "stale upload discarded");
        }
        Ok(units)
    }

    pub fn document(&self) -> Document {
        self.inner.document.borrow().clone()
    }

    pub fn subscribe_document(&self) -> SnapshotStream<Document> {
        SnapshotStream::new(self.inner.document.subscribe())
    }

    /// Enrich one position of the current document by index.
    pub async fn improve(&self, index: usize) -> Result<EnrichmentBatch, CoreError> {
        let document = self.document();
        let parent = document
            .get(index)
            .ok_or_else(|| CoreError::ValidationFailed {
                message: format!(
                    "position {index} out of range (document has {})",
                    document.len()
                ),
            })?;
        self.inner.enricher.enrich(parent).await
    }

    /// Enrich every position concurrently. Results come back in
    /// document order; the shared limit still bounds total calls.
    pub async fn improve_all(&self) -> Vec<(ParentUnit, Result<EnrichmentBatch, CoreError>)> {
        let document = self.document();
        let runs = document.iter().map(|parent| async move {
            (parent.clone(), self.inner.enricher.enrich(parent).await)
        });
        join_all(runs).await
    }
}
