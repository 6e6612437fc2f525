use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ports::document_store::{DocumentStore, StoredBlob};
use crate::domain::documents::document::{DocumentRecord, blob_name, is_valid_document_id};

/// Directory-backed store: `<root>/<id>.json` for metadata and `<root>/<id>.<ext>` for bytes.
pub struct FsDocumentStore {
    root: PathBuf,
}

// On-disk metadata layout. Key names are shared with files written by earlier
// deployments, so renames here are breaking.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredMeta {
    id: String,
    name: String,
    #[serde(rename = "type")]
    mime_type: String,
    ext: String,
    updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sha256: Option<String>,
}

impl From<StoredMeta> for DocumentRecord {
    fn from(m: StoredMeta) -> Self {
        DocumentRecord {
            id: m.id,
            name: m.name,
            mime_type: m.mime_type,
            ext: m.ext,
            updated_at: m.updated_at,
            external_url: m.file_url,
            size: m.size,
            sha256: m.sha256,
        }
    }
}

impl From<&DocumentRecord> for StoredMeta {
    fn from(r: &DocumentRecord) -> Self {
        StoredMeta {
            id: r.id.clone(),
            name: r.name.clone(),
            mime_type: r.mime_type.clone(),
            ext: r.ext.clone(),
            updated_at: r.updated_at,
            file_url: r.external_url.clone(),
            size: r.size,
            sha256: r.sha256.clone(),
        }
    }
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("create storage dir {}", self.root.display()))
    }

    fn meta_path(&self, id: &str) -> anyhow::Result<PathBuf> {
        if !is_valid_document_id(id) {
            anyhow::bail!("invalid document id");
        }
        Ok(self.root.join(format!("{}.json", id)))
    }

    fn blob_path(&self, id: &str, ext: &str) -> anyhow::Result<PathBuf> {
        if !is_valid_document_id(id) {
            anyhow::bail!("invalid document id");
        }
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) || ext == "json" {
            anyhow::bail!("invalid blob extension");
        }
        Ok(self.root.join(blob_name(id, ext)))
    }

    async fn read_meta(&self, path: &Path) -> anyhow::Result<Option<DocumentRecord>> {
        match tokio::fs::read(path).await {
            Ok(raw) => {
                let meta: StoredMeta = serde_json::from_slice(&raw)
                    .with_context(|| format!("parse metadata {}", path.display()))?;
                Ok(Some(meta.into()))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

// Write to a sibling temp file and rename over the target so readers never see a partial file.
async fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow::anyhow!("invalid target path"))?;
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));
    tokio::fs::write(&tmp, data)
        .await
        .with_context(|| format!("write {}", tmp.display()))?;
    if let Err(err) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(err).with_context(|| format!("rename into {}", path.display()));
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn get(&self, id: &str) -> anyhow::Result<Option<DocumentRecord>> {
        if !is_valid_document_id(id) {
            return Ok(None);
        }
        let path = self.meta_path(id)?;
        self.read_meta(&path).await
    }

    async fn list(&self) -> anyhow::Result<Vec<DocumentRecord>> {
        let mut out = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(out),
            Err(err) => return Err(err.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_meta = path.extension().and_then(|e| e.to_str()) == Some("json");
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(true);
            if !is_meta || hidden {
                continue;
            }
            match self.read_meta(&path).await {
                Ok(Some(record)) => out.push(record),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(error = ?err, path = %path.display(), "skip_unreadable_metadata")
                }
            }
        }
        Ok(out)
    }

    async fn put(&self, record: &DocumentRecord) -> anyhow::Result<()> {
        let path = self.meta_path(&record.id)?;
        let json = serde_json::to_vec_pretty(&StoredMeta::from(record))?;
        write_atomic(&path, &json).await
    }

    async fn read_blob(&self, id: &str, ext: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let path = self.blob_path(id, ext)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_blob(&self, id: &str, ext: &str, bytes: &[u8]) -> anyhow::Result<StoredBlob> {
        let path = self.blob_path(id, ext)?;
        write_atomic(&path, bytes).await?;
        Ok(StoredBlob {
            size: bytes.len() as u64,
            sha256: super::sha256_hex(bytes),
        })
    }

    async fn remove_blob(&self, id: &str, ext: &str) -> anyhow::Result<()> {
        let path = self.blob_path(id, ext)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn check_writable(&self) -> anyhow::Result<()> {
        self.ensure_root().await?;
        let probe = self.root.join(format!(".probe-{}", Uuid::new_v4()));
        tokio::fs::write(&probe, b"ok").await?;
        tokio::fs::remove_file(&probe).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str) -> DocumentRecord {
        DocumentRecord {
            id: id.into(),
            name: "a.docx".into(),
            mime_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                .into(),
            ext: "docx".into(),
            updated_at: 1_700_000_000_000,
            external_url: None,
            size: Some(3),
            sha256: None,
        }
    }

    #[tokio::test]
    async fn metadata_uses_shared_key_names() {
        let tmp = TempDir::new().unwrap();
        let store = FsDocumentStore::new(tmp.path());
        let mut r = record("d1");
        r.external_url = Some("https://ext/file.pdf".into());
        store.put(&r).await.unwrap();

        let raw = std::fs::read_to_string(tmp.path().join("d1.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["type"], r.mime_type.as_str());
        assert_eq!(json["ext"], "docx");
        assert_eq!(json["updatedAt"], 1_700_000_000_000_i64);
        assert_eq!(json["fileUrl"], "https://ext/file.pdf");

        assert_eq!(store.get("d1").await.unwrap(), Some(r));
    }

    #[tokio::test]
    async fn reads_metadata_without_optional_fields() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("legacy.json"),
            r#"{"id":"legacy","name":"x.odt","type":"application/vnd.oasis.opendocument.text","ext":"odt","updatedAt":12}"#,
        )
        .unwrap();
        let store = FsDocumentStore::new(tmp.path());
        let got = store.get("legacy").await.unwrap().unwrap();
        assert_eq!(got.ext, "odt");
        assert_eq!(got.updated_at, 12);
        assert!(got.external_url.is_none());
    }

    #[tokio::test]
    async fn blob_write_read_remove() {
        let tmp = TempDir::new().unwrap();
        let store = FsDocumentStore::new(tmp.path());
        let stored = store.write_blob("d1", "docx", b"abc").await.unwrap();
        assert_eq!(stored.size, 3);
        assert_eq!(
            stored.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(tmp.path().join("d1.docx").exists());
        assert_eq!(store.read_blob("d1", "docx").await.unwrap().unwrap(), b"abc");

        store.remove_blob("d1", "docx").await.unwrap();
        assert!(store.read_blob("d1", "docx").await.unwrap().is_none());
        store.remove_blob("d1", "docx").await.unwrap();
    }

    #[tokio::test]
    async fn rejects_paths_outside_root() {
        let tmp = TempDir::new().unwrap();
        let store = FsDocumentStore::new(tmp.path());
        assert!(store.get("../secret").await.unwrap().is_none());
        assert!(store.write_blob("../x", "docx", b"a").await.is_err());
        assert!(store.write_blob("d1", "../x", b"a").await.is_err());
        assert!(store.write_blob("d1", "json", b"a").await.is_err());
    }

    #[tokio::test]
    async fn list_skips_corrupt_and_foreign_files() {
        let tmp = TempDir::new().unwrap();
        let store = FsDocumentStore::new(tmp.path());
        store.put(&record("a")).await.unwrap();
        store.put(&record("b")).await.unwrap();
        store.write_blob("a", "docx", b"x").await.unwrap();
        std::fs::write(tmp.path().join("broken.json"), b"{not json").unwrap();

        let mut ids: Vec<String> = store.list().await.unwrap().into_iter().map(|r| r.id).collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn list_of_missing_root_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = FsDocumentStore::new(tmp.path().join("nope"));
        assert!(store.list().await.unwrap().is_empty());
        store.check_writable().await.unwrap();
        assert!(tmp.path().join("nope").is_dir());
    }
}
