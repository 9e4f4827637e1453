// ── Fan-out enrichment ──
//
// One enrichment = one backend call per sub-unit of a parent, issued
// concurrently under a shared limit and merged back into an index-keyed
// result. Each parent has its own `watch` slot; a second invocation for
// a parent that is still loading is refused rather than queued.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use futures_util::future::join_all;
use tokio::sync::{Semaphore, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::config::DEFAULT_MAX_CONCURRENT_ENRICHMENTS;
use crate::error::CoreError;
use crate::model::{EnrichmentBatch, EnrichmentFailure, ParentKey, ParentUnit};
use crate::stream::SnapshotStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnricherConfig {
    /// Simultaneous enrichment calls, across all parents. Minimum 1.
    pub max_concurrency: usize,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENT_ENRICHMENTS,
        }
    }
}

type Slot = Arc<watch::Sender<EnrichmentBatch>>;

pub struct FanOutEnricher {
    backend: Arc<dyn Backend>,
    limiter: Semaphore,
    max_concurrency: usize,
    slots: DashMap<ParentKey, Slot>,
    invocations: AtomicU64,
}

impl FanOutEnricher {
    pub fn new(backend: Arc<dyn Backend>, config: EnricherConfig) -> Self {
        let max_concurrency = config.max_concurrency.max(1);
        Self {
            backend,
            limiter: Semaphore::new(max_concurrency),
            max_concurrency,
            slots: DashMap::new(),
            invocations: AtomicU64::new(0),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub async fn enrich(&self, parent: &ParentUnit) -> Result<EnrichmentBatch, CoreError> {
        self.enrich_with_cancel(parent, &CancellationToken::new())
            .await
    }

    /// Enrich every sub-unit of `parent`.
    ///
    /// Returns the batch this invocation produced (`Ready` or `Failed`).
    /// Fails fast with `EnrichmentInProgress` if the parent is already
    /// loading. On cancellation the parent's batch reverts to what it
    /// was before the call.
    pub async fn enrich_with_cancel(
        &self,
        parent: &ParentUnit,
        cancel: &CancellationToken,
    ) -> Result<EnrichmentBatch, CoreError> {
        let key = parent.key();
        let slot = self.slot(&key);
        let invocation = self.invocations.fetch_add(1, Ordering::SeqCst) + 1;

        // Check-and-set under the channel lock.
        let mut prior = None;
        slot.send_if_modified(|batch| {
            if batch.is_loading() {
                return false;
            }
            let loading = EnrichmentBatch::loading(batch.retained(), invocation);
            prior = Some(std::mem::replace(batch, loading));
            true
        });
        let Some(prior) = prior else {
            debug!(parent = %key, "enrichment already in progress");
            return Err(CoreError::EnrichmentInProgress {
                parent: key.to_string(),
            });
        };

        info!(
            parent = %key,
            sub_units = parent.sub_units.len(),
            invocation,
            "enrichment started"
        );

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            outcome = self.fan_out(&parent.sub_units) => Some(outcome),
        };

        let batch = match outcome {
            None => {
                info!(parent = %key, invocation, "enrichment cancelled");
                self.publish(&key, &slot, invocation, prior);
                return Err(CoreError::Cancelled);
            }
            Some(Ok(result)) => {
                info!(parent = %key, invocation, "enrichment ready");
                EnrichmentBatch::ready(result, invocation)
            }
            Some(Err(failure)) => {
                warn!(
                    parent = %key,
                    invocation,
                    sub_unit = failure.sub_unit,
                    error = %failure.message,
                    "enrichment failed"
                );
                EnrichmentBatch::failed(failure, prior.retained(), invocation)
            }
        };

        self.publish(&key, &slot, invocation, batch.clone());
        Ok(batch)
    }

    /// Issue one call per sub-unit and merge by index.
    ///
    /// All-or-nothing: any failure discards the whole batch. The failure
    /// reported is the first one to *complete*, not the lowest index.
    async fn fan_out(&self, sub_units: &[String]) -> Result<Vec<Vec<String>>, EnrichmentFailure> {
        let first_failure = OnceLock::new();

        let calls = sub_units.iter().enumerate().map(|(index, text)| {
            let first_failure = &first_failure;
            async move {
                let result = match self.limiter.acquire().await {
                    Ok(_permit) => {
                        debug!(sub_unit = index, "enrichment call issued");
                        self.backend.enrich(text).await
                    }
                    Err(_) => Err(CoreError::Internal("enrichment limiter closed".into())),
                };
                if let Err(e) = &result {
                    let _ = first_failure.set(EnrichmentFailure {
                        sub_unit: index,
                        message: e.to_string(),
                    });
                }
                result
            }
        });
        let results = join_all(calls).await;

        match first_failure.into_inner() {
            Some(failure) => Err(failure),
            None => Ok(results.into_iter().flatten().collect()),
        }
    }

    /// Publish `batch` if this invocation still owns the slot and the
    /// parent has not been forgotten meanwhile.
    fn publish(&self, key: &ParentKey, slot: &Slot, invocation: u64, batch: EnrichmentBatch) {
        let attached = self
            .slots
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current.value(), slot));
        if !attached {
            debug!(parent = %key, invocation, "parent forgotten, result discarded");
            return;
        }
        slot.send_if_modified(|current| {
            if current.invocation() != invocation {
                return false;
            }
            *current = batch;
            true
        });
    }

    fn slot(&self, key: &ParentKey) -> Slot {
        Arc::clone(
            self.slots
                .entry(key.clone())
                .or_insert_with(|| Arc::new(watch::channel(EnrichmentBatch::default()).0))
                .value(),
        )
    }

    // ── Read access ──────────────────────────────────────────────────

    /// Current batch for a parent; `Idle` if never enriched.
    pub fn batch(&self, key: &ParentKey) -> EnrichmentBatch {
        self.slots
            .get(key)
            .map(|slot| slot.borrow().clone())
            .unwrap_or_default()
    }

    pub fn subscribe(&self, key: &ParentKey) -> SnapshotStream<EnrichmentBatch> {
        SnapshotStream::new(self.slot(key).subscribe())
    }

    /// Drop all state for a parent. In-flight results for it are
    /// discarded when they arrive.
    pub fn forget(&self, key: &ParentKey) -> bool {
        self.slots.remove(key).is_some()
    }

    /// Forget every parent not matched by `keep`.
    pub fn retain(&self, mut keep: impl FnMut(&ParentKey) -> bool) {
        self.slots.retain(|key, _| keep(key));
    }
}
