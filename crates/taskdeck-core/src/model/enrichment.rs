// ── Enrichment batch state ──
//
// One `EnrichmentBatch` per parent unit, replaced wholesale on every
// invocation. `result` is present only while `Ready`; the last ready
// result is carried forward in `previous` so a failed or in-flight
// re-run never blanks suggestions a user is already looking at.

use std::sync::Arc;

use serde::Serialize;
use strum::Display;

/// Lifecycle of a fan-out enrichment for one parent unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// The first sub-unit failure observed during a fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichmentFailure {
    /// Index of the failing sub-unit within the parent.
    pub sub_unit: usize,
    pub message: String,
}

/// Suggestions per sub-unit, indexed like `ParentUnit::sub_units`.
pub type Suggestions = Arc<Vec<Vec<String>>>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct EnrichmentBatch {
    status: EnrichmentStatus,
    result: Option<Suggestions>,
    previous: Option<Suggestions>,
    failure: Option<EnrichmentFailure>,
    /// Invocation that produced this state (0 = never invoked).
    #[serde(skip)]
    invocation: u64,
}

impl EnrichmentBatch {
    pub(crate) fn loading(previous: Option<Suggestions>, invocation: u64) -> Self {
        Self {
            status: EnrichmentStatus::Loading,
            result: None,
            previous,
            failure: None,
            invocation,
        }
    }

    pub(crate) fn ready(result: Vec<Vec<String>>, invocation: u64) -> Self {
        let result = Arc::new(result);
        Self {
            status: EnrichmentStatus::Ready,
            result: Some(Arc::clone(&result)),
            previous: Some(result),
            failure: None,
            invocation,
        }
    }

    pub(crate) fn failed(
        failure: EnrichmentFailure,
        previous: Option<Suggestions>,
        invocation: u64,
    ) -> Self {
        Self {
            status: EnrichmentStatus::Failed,
            result: None,
            previous,
            failure: Some(failure),
            invocation,
        }
    }

    pub fn status(&self) -> EnrichmentStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == EnrichmentStatus::Loading
    }

    /// Full result; `Some` only when `Ready`.
    pub fn result(&self) -> Option<&[Vec<String>]> {
        self.result.as_deref().map(Vec::as_slice)
    }

    /// Most recent `Ready` result, including the current one.
    pub fn previous(&self) -> Option<&[Vec<String>]> {
        self.previous.as_deref().map(Vec::as_slice)
    }

    pub fn failure(&self) -> Option<&EnrichmentFailure> {
        self.failure.as_ref()
    }

    /// What a view should render: the fresh result, or the retained one.
    pub fn displayed(&self) -> Option<&[Vec<String>]> {
        self.result().or_else(|| self.previous())
    }

    pub fn suggestions_for(&self, sub_unit: usize) -> Option<&[String]> {
        self.result()
            .and_then(|r| r.get(sub_unit))
            .map(Vec::as_slice)
    }

    pub(crate) fn retained(&self) -> Option<Suggestions> {
        self.previous.clone()
    }

    pub(crate) fn invocation(&self) -> u64 {
        self.invocation
    }
}
