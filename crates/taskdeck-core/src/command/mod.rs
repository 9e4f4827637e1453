// ── Mutation API ──
//
// All writes flow through a single `Mutation` enum. The coordinator
// runs each one to acknowledgment, then re-fetches the collection so
// the published snapshot reflects server truth.

mod coordinator;

use std::sync::Arc;

use crate::error::CoreError;
use crate::model::ItemId;
use crate::store::CollectionSnapshot;

pub use coordinator::MutationCoordinator;

/// A write against the remote collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create { text: String },
    Update { id: ItemId, text: String },
    Delete { id: ItemId },
}

impl Mutation {
    /// Reject mutations that would never be accepted, before any
    /// network traffic happens.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Create { text } | Self::Update { text, .. } if text.trim().is_empty() => {
                Err(CoreError::ValidationFailed {
                    message: "item text must not be blank".into(),
                })
            }
            _ => Ok(()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Result of a completed mutation.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    /// Server acknowledgment text, if any.
    pub message: Option<String>,
    /// The snapshot published after the follow-up refresh.
    pub snapshot: Arc<CollectionSnapshot>,
}
