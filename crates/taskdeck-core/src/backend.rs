// ── Backend seam ──
//
// Everything above this trait speaks domain types and `CoreError`.
// `RemoteClient` is the production implementation; tests plug in a
// scripted in-memory backend to force completion order.

use async_trait::async_trait;
use taskdeck_api::{Ack, RemoteClient, UploadFile};

use crate::error::CoreError;
use crate::model::{Item, ItemId, ParentUnit};

#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetch the full collection in server order.
    async fn list(&self) -> Result<Vec<Item>, CoreError>;

    /// Create an item. The server assigns its identifier.
    async fn create(&self, text: &str) -> Result<Ack, CoreError>;

    async fn update(&self, id: &ItemId, text: &str) -> Result<Ack, CoreError>;

    async fn delete(&self, id: &ItemId) -> Result<Ack, CoreError>;

    /// Upload a document and return its parent units.
    async fn upload_document(&self, file: &UploadFile) -> Result<Vec<ParentUnit>, CoreError>;

    /// Suggestions for a single sub-unit.
    async fn enrich(&self, sub_unit: &str) -> Result<Vec<String>, CoreError>;
}

#[async_trait]
impl Backend for RemoteClient {
    async fn list(&self) -> Result<Vec<Item>, CoreError> {
        let todos = self.list_todos().await?;
        Ok(todos.into_iter().map(Item::from).collect())
    }

    async fn create(&self, text: &str) -> Result<Ack, CoreError> {
        Ok(self.create_todo(text).await?)
    }

    async fn update(&self, id: &ItemId, text: &str) -> Result<Ack, CoreError> {
        Ok(self.update_todo(id, text).await?)
    }

    async fn delete(&self, id: &ItemId) -> Result<Ack, CoreError> {
        Ok(self.delete_todo(id).await?)
    }

    async fn upload_document(&self, file: &UploadFile) -> Result<Vec<ParentUnit>, CoreError> {
        let positions = self.upload_resume(file).await?;
        Ok(positions.into_iter().map(ParentUnit::from).collect())
    }

    async fn enrich(&self, sub_unit: &str) -> Result<Vec<String>, CoreError> {
        Ok(self.improve_highlight(sub_unit).await?)
    }
}
