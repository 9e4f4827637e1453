// taskdeck-api: Async Rust client for the taskdeck todo + resume backend

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::RemoteClient;
pub use error::Error;
pub use models::{Ack, ItemId, Position, TodoItem, UploadFile};
pub use transport::TransportConfig;
