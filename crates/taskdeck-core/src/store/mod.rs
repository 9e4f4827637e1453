// ── Collection storage ──

mod collection;
mod snapshot;

pub use collection::{CollectionStore, RefreshOutcome};
pub use snapshot::CollectionSnapshot;
