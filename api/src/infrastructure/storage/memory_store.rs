use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::document_store::{DocumentStore, StoredBlob};
use crate::domain::documents::document::{DocumentRecord, blob_name};

/// Process-local store, for tests and ephemeral deployments.
#[derive(Default)]
pub struct MemoryDocumentStore {
    records: RwLock<HashMap<String, DocumentRecord>>,
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn blob_count(&self) -> usize {
        self.blobs.read().await.len()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, id: &str) -> anyhow::Result<Option<DocumentRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<DocumentRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn put(&self, record: &DocumentRecord) -> anyhow::Result<()> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn read_blob(&self, id: &str, ext: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.blobs.read().await.get(&blob_name(id, ext)).cloned())
    }

    async fn write_blob(&self, id: &str, ext: &str, bytes: &[u8]) -> anyhow::Result<StoredBlob> {
        self.blobs
            .write()
            .await
            .insert(blob_name(id, ext), bytes.to_vec());
        Ok(StoredBlob {
            size: bytes.len() as u64,
            sha256: super::sha256_hex(bytes),
        })
    }

    async fn remove_blob(&self, id: &str, ext: &str) -> anyhow::Result<()> {
        self.blobs.write().await.remove(&blob_name(id, ext));
        Ok(())
    }

    async fn check_writable(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
