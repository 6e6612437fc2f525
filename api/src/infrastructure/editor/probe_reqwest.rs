use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::editor_probe::EditorProbe;

pub struct ReqwestEditorProbe {
    client: reqwest::Client,
}

impl ReqwestEditorProbe {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl EditorProbe for ReqwestEditorProbe {
    async fn healthcheck(&self, server_url: &str) -> anyhow::Result<bool> {
        let url = format!("{}/healthcheck", server_url.trim_end_matches('/'));
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Ok(false);
        }
        // the document server answers a bare `true`
        let body = resp.text().await?;
        Ok(body.trim() != "false")
    }
}
