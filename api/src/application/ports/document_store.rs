use async_trait::async_trait;

use crate::domain::documents::document::DocumentRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub size: u64,
    pub sha256: String,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, id: &str) -> anyhow::Result<Option<DocumentRecord>>;
    async fn list(&self) -> anyhow::Result<Vec<DocumentRecord>>;
    async fn put(&self, record: &DocumentRecord) -> anyhow::Result<()>;
    // Ok(None) when the blob does not exist
    async fn read_blob(&self, id: &str, ext: &str) -> anyhow::Result<Option<Vec<u8>>>;
    async fn write_blob(&self, id: &str, ext: &str, bytes: &[u8]) -> anyhow::Result<StoredBlob>;
    // Removing a missing blob is not an error
    async fn remove_blob(&self, id: &str, ext: &str) -> anyhow::Result<()>;
    async fn check_writable(&self) -> anyhow::Result<()>;
}
