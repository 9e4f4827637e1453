//! Synchronization layer between `taskdeck-api` and its consumers.
//!
//! - **[`Workspace`]**: facade owning every component below plus the
//!   current resume document. Build it with [`Workspace::new`] for HTTP, or
//!   [`Workspace::with_backend`] to plug in another [`Backend`].
//!
//! - **[`CollectionStore`]**: the authoritative todo snapshot. Every
//!   refresh is sequenced; a response that arrives after a newer refresh
//!   was issued is discarded instead of applied.
//!
//! - **[`MutationCoordinator`]**: runs [`Mutation`]s one at a time, each
//!   followed by a refresh, so the snapshot always reflects server truth.
//!
//! - **[`FanOutEnricher`]**: per-parent fan-out of enrichment calls under a
//!   shared concurrency limit, merged into an index-ordered
//!   [`EnrichmentBatch`].
//!
//! - **[`SnapshotStream`]**: `watch`-backed subscription handle vended by
//!   all of the above.

pub mod backend;
pub mod command;
pub mod config;
pub mod enricher;
pub mod error;
pub mod model;
pub mod store;
pub mod stream;
pub mod workspace;

#[cfg(test)]
mod test_support;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::Backend;
pub use command::{Mutation, MutationCoordinator, MutationOutcome};
pub use config::ClientConfig;
pub use enricher::{EnricherConfig, FanOutEnricher};
pub use error::CoreError;
pub use store::{CollectionSnapshot, CollectionStore, RefreshOutcome};
pub use stream::{SnapshotStream, SnapshotWatchStream};
pub use workspace::{Document, Workspace};

// ── Model re-exports ────────────────────────────────────────────────
pub use model::{
    EnrichmentBatch, EnrichmentFailure, EnrichmentStatus, Item, ItemId, ParentKey, ParentUnit,
};

pub use taskdeck_api::UploadFile;
pub use tokio_util::sync::CancellationToken;
