// ── Authoritative collection store ──
//
// Every refresh takes a sequence number when issued. A response is
// applied only if no later refresh has been issued since, so an older
// list that arrives late can never overwrite a newer one.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, warn};

use super::snapshot::CollectionSnapshot;
use crate::backend::Backend;
use crate::error::CoreError;
use crate::model::{Item, ItemId};
use crate::stream::SnapshotStream;

/// Outcome of a single refresh call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response became the published snapshot.
    Applied { generation: u64, len: usize },
    /// A later refresh was issued while this one was in flight.
    Superseded { generation: u64, latest: u64 },
}

impl RefreshOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

pub struct CollectionStore {
    backend: Arc<dyn Backend>,
    issued: AtomicU64,
    snapshot: watch::Sender<Arc<CollectionSnapshot>>,
}

impl CollectionStore {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(CollectionSnapshot::default()));
        Self {
            backend,
            issued: AtomicU64::new(0),
            snapshot,
        }
    }

    /// Fetch the full collection and publish it unless superseded.
    ///
    /// Safe to call concurrently with itself. On error the published
    /// snapshot is left untouched.
    pub async fn refresh(&self) -> Result<RefreshOutcome, CoreError> {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "refresh issued");

        let items = match self.backend.list().await {
            Ok(items) => items,
            Err(e) => {
                warn!(generation, error = %e, "refresh failed");
                return Err(e);
            }
        };

        Ok(self.apply(generation, items))
    }

    fn apply(&self, generation: u64, items: Vec<Item>) -> RefreshOutcome {
        let len = items.len();
        let mut latest = self.issued.load(Ordering::SeqCst);

        let applied = self.snapshot.send_if_modified(|current| {
            // Re-read under the channel lock so two responses racing to
            // publish cannot interleave.
            latest = self.issued.load(Ordering::SeqCst);
            if generation != latest || generation <= current.generation() {
                return false;
            }
            *current = Arc::new(CollectionSnapshot::new(generation, items));
            true
        });

        if applied {
            debug!(generation, len, "snapshot applied");
            RefreshOutcome::Applied { generation, len }
        } else {
            debug!(generation, latest, "stale refresh discarded");
            RefreshOutcome::Superseded { generation, latest }
        }
    }

    // ── Read access ──────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<CollectionSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> SnapshotStream<Arc<CollectionSnapshot>> {
        SnapshotStream::new(self.snapshot.subscribe())
    }

    pub fn get(&self, id: &ItemId) -> Option<Arc<Item>> {
        self.snapshot.borrow().get(id).cloned()
    }

    /// Highest sequence number handed out so far.
    pub fn latest_issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}
