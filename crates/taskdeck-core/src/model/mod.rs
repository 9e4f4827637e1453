// ── Domain model ──

pub mod enrichment;
pub mod item;
pub mod position;

pub use enrichment::{EnrichmentBatch, EnrichmentFailure, EnrichmentStatus, Suggestions};
pub use item::{Item, ItemId};
pub use position::{ParentKey, ParentUnit};
