use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::blob_fetcher::BlobFetcher;

/// Pulls edited documents from the URL the document server hands out in its callback.
pub struct ReqwestBlobFetcher {
    client: reqwest::Client,
}

impl ReqwestBlobFetcher {
    pub fn new(timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl BlobFetcher for ReqwestBlobFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("request failed: {e}"))?;
        if !resp.status().is_success() {
            anyhow::bail!("upstream returned status {}", resp.status());
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| anyhow::anyhow!("failed to read body: {e}"))?;
        Ok(bytes.to_vec())
    }
}
