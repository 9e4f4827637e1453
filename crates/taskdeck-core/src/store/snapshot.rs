// ── Immutable collection snapshot ──

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::model::{Item, ItemId};

/// The collection as of one applied refresh.
///
/// Replaced atomically; never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct CollectionSnapshot {
    generation: u64,
    fetched_at: Option<DateTime<Utc>>,
    items: Vec<Arc<Item>>,
}

impl CollectionSnapshot {
    pub(crate) fn new(generation: u64, items: Vec<Item>) -> Self {
        Self {
            generation,
            fetched_at: Some(Utc::now()),
            items: items.into_iter().map(Arc::new).collect(),
        }
    }

    /// Sequence number of the refresh that produced this snapshot.
    /// Zero before the first successful refresh.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Items in server order.
    pub fn items(&self) -> &[Arc<Item>] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().map(AsRef::as_ref)
    }

    pub fn get(&self, id: &ItemId) -> Option<&Arc<Item>> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
