// ── Mutation coordinator ──
//
// write → await ack → refresh → complete. Mutations share one lane,
// so the resync after mutation N always observes N's effect and no
// later write can slip in between.

use std::sync::Arc;

use taskdeck_api::Ack;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{Mutation, MutationOutcome};
use crate::backend::Backend;
use crate::error::CoreError;
use crate::model::ItemId;
use crate::store::{CollectionStore, RefreshOutcome};

/// How many times a superseded resync is re-issued before giving up.
const MAX_RESYNC_ATTEMPTS: usize = 3;

pub struct MutationCoordinator {
    backend: Arc<dyn Backend>,
    store: Arc<CollectionStore>,
    lane: Mutex<()>,
}

impl MutationCoordinator {
    pub fn new(backend: Arc<dyn Backend>, store: Arc<CollectionStore>) -> Self {
        Self {
            backend,
            store,
            lane: Mutex::new(()),
        }
    }

    pub async fn create_item(&self, text: impl Into<String>) -> Result<MutationOutcome, CoreError> {
        self.execute(Mutation::Create { text: text.into() }).await
    }

    pub async fn update_item(
        &self,
        id: &ItemId,
        text: impl Into<String>,
    ) -> Result<MutationOutcome, CoreError> {
        self.execute(Mutation::Update {
            id: id.clone(),
            text: text.into(),
        })
        .await
    }

    pub async fn delete_item(&self, id: &ItemId) -> Result<MutationOutcome, CoreError> {
        self.execute(Mutation::Delete { id: id.clone() }).await
    }

    pub async fn execute(&self, mutation: Mutation) -> Result<MutationOutcome, CoreError> {
        self.execute_with_cancel(mutation, &CancellationToken::new())
            .await
    }

    /// Run a mutation; if `cancel` fires first, the pending write or
    /// resync is abandoned and nothing is applied locally.
    pub async fn execute_with_cancel(
        &self,
        mutation: Mutation,
        cancel: &CancellationToken,
    ) -> Result<MutationOutcome, CoreError> {
        mutation.validate()?;

        let _lane = self.lane.lock().await;
        debug!(kind = mutation.kind(), "mutation started");

        let ack = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(kind = mutation.kind(), "mutation cancelled before ack");
                return Err(CoreError::Cancelled);
            }
            ack = self.write(&mutation) => ack,
        };
        let ack = match ack {
            Ok(ack) => ack,
            Err(e) => {
                warn!(kind = mutation.kind(), error = %e, "mutation rejected");
                return Err(e);
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(CoreError::Cancelled),
            synced = self.resync() => {
                synced?;
                info!(kind = mutation.kind(), "mutation applied");
                Ok(MutationOutcome {
                    message: ack.message,
                    snapshot: self.store.snapshot(),
                })
            }
        }
    }

    async fn write(&self, mutation: &Mutation) -> Result<Ack, CoreError> {
        match mutation {
            Mutation::Create { text } => self.backend.create(text).await,
            Mutation::Update { id, text } => self.backend.update(id, text).await,
            Mutation::Delete { id } => self.backend.delete(id).await,
        }
    }

    /// Refresh until a response from *after* the write is published.
    ///
    /// A superseding refresh may have been issued before the write was
    /// acknowledged, so being superseded is not proof the new state
    /// landed; re-issue a bounded number of times.
    async fn resync(&self) -> Result<(), CoreError> {
        for attempt in 1..=MAX_RESYNC_ATTEMPTS {
            match self.store.refresh().await? {
                RefreshOutcome::Applied { .. } => return Ok(()),
                RefreshOutcome::Superseded { generation, latest } => {
                    debug!(attempt, generation, latest, "resync superseded, re-issuing");
                }
            }
        }
        warn!(
            attempts = MAX_RESYNC_ATTEMPTS,
            "resync kept being superseded; snapshot left to the newest refresh"
        );
        Ok(())
    }
}
