// ── Collection item ──

use serde::{Deserialize, Serialize};
use taskdeck_api::TodoItem;

pub use taskdeck_api::ItemId;

/// One element of the server-owned todo collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub text: String,
}

impl From<TodoItem> for Item {
    fn from(todo: TodoItem) -> Self {
        Self {
            id: todo.id,
            text: todo.item,
        }
    }
}
