use async_trait::async_trait;

#[async_trait]
pub trait EditorProbe: Send + Sync {
    /// Returns Ok(true) when the document server answered its healthcheck.
    async fn healthcheck(&self, server_url: &str) -> anyhow::Result<bool>;
}
