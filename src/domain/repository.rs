use crate::domain::records::Record;
use anyhow::Result;
use async_trait::async_trait;

/// Durable string-keyed storage. Each key holds one JSON document.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;
    async fn set_item(&self, key: &str, value: String) -> Result<()>;
    async fn remove_item(&self, key: &str) -> Result<()>;
}

#[async_trait]
pub trait RecordRepository<T: Record>: Send + Sync {
    /// All records in insertion order.
    async fn list(&self) -> Result<Vec<T>>;
    async fn append(&self, record: T) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Stores the file and returns the name it can be fetched back under.
    async fn save(&self, upload: Upload) -> Result<String>;
    async fn load(&self, name: &str) -> Result<Option<Upload>>;
}
