use crate::application::dto::documents::{CallbackInput, CallbackOutcome};
use crate::application::ports::blob_fetcher::BlobFetcher;
use crate::application::ports::document_store::DocumentStore;
use crate::application::services::document_locks::DocumentLocks;
use crate::application::services::editor_token::EditorTokenSigner;
use crate::application::use_cases::documents::error::DocumentError;
use crate::domain::documents::callback::CallbackStatus;
use crate::domain::documents::document::is_valid_document_id;

/// Applies a save notification from the document server.
///
/// Only statuses 2 and 6 touch storage. The edited bytes are fetched before the
/// per-document lock is taken, and a failed fetch leaves the stored document untouched.
pub struct HandleCallback<'a, S, F>
where
    S: DocumentStore + ?Sized,
    F: BlobFetcher + ?Sized,
{
    pub store: &'a S,
    pub fetcher: &'a F,
    pub signer: &'a EditorTokenSigner,
    pub locks: &'a DocumentLocks,
    pub require_token: bool,
}

impl<'a, S, F> HandleCallback<'a, S, F>
where
    S: DocumentStore + ?Sized,
    F: BlobFetcher + ?Sized,
{
    pub async fn execute(
        &self,
        id: &str,
        header_token: Option<&str>,
        input: CallbackInput,
    ) -> Result<CallbackOutcome, DocumentError> {
        let token = header_token
            .map(str::to_string)
            .or_else(|| input.token.clone())
            .filter(|t| !t.trim().is_empty());
        let claims = match token {
            Some(t) => Some(self.signer.verify(t.trim()).map_err(|err| {
                tracing::warn!(doc_id = %id, error = %err, "callback_token_rejected");
                DocumentError::TokenInvalid(err)
            })?),
            None if self.require_token => {
                tracing::warn!(doc_id = %id, "callback_token_missing");
                return Err(DocumentError::TokenMissing);
            }
            None => None,
        };

        let (status, url) = resolve_body(input, claims.as_ref());
        let Some(code) = status else {
            tracing::debug!(doc_id = %id, "callback_without_status");
            return Ok(CallbackOutcome::Acknowledged);
        };
        let status = CallbackStatus::from_code(code);
        tracing::info!(doc_id = %id, status = code, "editor_callback");

        if let CallbackStatus::Unknown(code) = status {
            tracing::warn!(doc_id = %id, status = code, "unknown_callback_status");
        }
        if !status.requires_save() {
            return Ok(CallbackOutcome::Acknowledged);
        }
        let Some(url) = url else {
            return Ok(CallbackOutcome::Acknowledged);
        };

        if !is_valid_document_id(id) {
            return Err(DocumentError::NotFound);
        }
        if self
            .store
            .get(id)
            .await
            .map_err(DocumentError::Storage)?
            .is_none()
        {
            return Err(DocumentError::NotFound);
        }

        let bytes = self.fetcher.fetch(&url).await.map_err(|err| {
            tracing::error!(doc_id = %id, error = ?err, "fetch_edited_document_failed");
            DocumentError::UpstreamFetch(err)
        })?;

        let _guard = self.locks.acquire(id).await;
        let mut record = self
            .store
            .get(id)
            .await
            .map_err(DocumentError::Storage)?
            .ok_or(DocumentError::NotFound)?;
        let stored = self
            .store
            .write_blob(&record.id, &record.ext, &bytes)
            .await
            .map_err(|err| {
                tracing::error!(doc_id = %id, error = ?err, "write_blob_failed");
                DocumentError::Storage(err)
            })?;
        record.updated_at = record.next_revision_at(chrono::Utc::now().timestamp_millis());
        record.size = Some(stored.size);
        record.sha256 = Some(stored.sha256);
        // once saved by the editor the local copy is authoritative
        record.external_url = None;
        self.store.put(&record).await.map_err(|err| {
            tracing::error!(doc_id = %id, error = ?err, "write_metadata_failed");
            DocumentError::Storage(err)
        })?;

        tracing::info!(doc_id = %id, size = stored.size, key = %record.document_key(), "document_saved_from_editor");
        Ok(CallbackOutcome::Saved {
            updated_at: record.updated_at,
        })
    }
}

// In "token in body" mode the request carries only the token; the callback body
// is then the verified claims (or their `payload` object).
fn resolve_body(
    input: CallbackInput,
    claims: Option<&serde_json::Value>,
) -> (Option<i64>, Option<String>) {
    if input.status.is_some() {
        return (input.status, input.url);
    }
    let Some(claims) = claims else {
        return (None, input.url);
    };
    let body = claims
        .get("payload")
        .filter(|p| p.is_object())
        .unwrap_or(claims);
    let status = body.get("status").and_then(|s| s.as_i64());
    let url = body
        .get("url")
        .and_then(|u| u.as_str())
        .map(str::to_string)
        .or(input.url);
    (status, url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::documents::document::DocumentRecord;
    use crate::infrastructure::storage::MemoryDocumentStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct FakeFetcher {
        body: Option<Vec<u8>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn serving(body: &[u8]) -> Self {
            Self {
                body: Some(body.to_vec()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn unreachable() -> Self {
            Self {
                body: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BlobFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
            self.calls.lock().unwrap().push(url.to_string());
            self.body
                .clone()
                .ok_or_else(|| anyhow::anyhow!("connection refused"))
        }
    }

    async fn seeded_store() -> MemoryDocumentStore {
        let store = MemoryDocumentStore::new();
        store
            .put(&DocumentRecord {
                id: "d1".into(),
                name: "a.docx".into(),
                mime_type: "application/msword".into(),
                ext: "docx".into(),
                updated_at: 1_000,
                external_url: None,
                size: Some(3),
                sha256: None,
            })
            .await
            .unwrap();
        store.write_blob("d1", "docx", b"old").await.unwrap();
        store
    }

    fn input(status: i64, url: Option<&str>) -> CallbackInput {
        CallbackInput {
            status: Some(status),
            url: url.map(Into::into),
            ..CallbackInput::default()
        }
    }

    struct Harness {
        store: MemoryDocumentStore,
        fetcher: FakeFetcher,
        signer: EditorTokenSigner,
        locks: DocumentLocks,
    }

    impl Harness {
        async fn new(fetcher: FakeFetcher) -> Self {
            Self {
                store: seeded_store().await,
                fetcher,
                signer: EditorTokenSigner::new("secret", 600),
                locks: DocumentLocks::new(),
            }
        }

        fn uc(&self, require_token: bool) -> HandleCallback<'_, MemoryDocumentStore, FakeFetcher> {
            HandleCallback {
                store: &self.store,
                fetcher: &self.fetcher,
                signer: &self.signer,
                locks: &self.locks,
                require_token,
            }
        }
    }

    #[tokio::test]
    async fn ready_for_save_persists_and_bumps_revision() {
        let h = Harness::new(FakeFetcher::serving(b"new bytes")).await;
        let out = h
            .uc(false)
            .execute("d1", None, input(2, Some("http://ds/cache/d1")))
            .await
            .unwrap();

        let rec = h.store.get("d1").await.unwrap().unwrap();
        assert_eq!(out, CallbackOutcome::Saved { updated_at: rec.updated_at });
        assert!(rec.updated_at > 1_000);
        assert_eq!(rec.size, Some(9));
        assert_eq!(
            h.store.read_blob("d1", "docx").await.unwrap().unwrap(),
            b"new bytes"
        );
        assert_eq!(h.fetcher.calls(), vec!["http://ds/cache/d1"]);
    }

    #[tokio::test]
    async fn force_save_also_persists() {
        let h = Harness::new(FakeFetcher::serving(b"forced")).await;
        h.uc(false)
            .execute("d1", None, input(6, Some("http://ds/x")))
            .await
            .unwrap();
        assert_eq!(h.store.read_blob("d1", "docx").await.unwrap().unwrap(), b"forced");
    }

    #[tokio::test]
    async fn non_saving_statuses_never_touch_storage() {
        let h = Harness::new(FakeFetcher::serving(b"new")).await;
        for status in [0, 1, 3, 4, 7, 99] {
            let out = h
                .uc(false)
                .execute("d1", None, input(status, Some("http://ds/x")))
                .await
                .unwrap();
            assert_eq!(out, CallbackOutcome::Acknowledged, "status {status}");
        }
        assert!(h.fetcher.calls().is_empty());
        assert_eq!(h.store.read_blob("d1", "docx").await.unwrap().unwrap(), b"old");
        assert_eq!(h.store.get("d1").await.unwrap().unwrap().updated_at, 1_000);
    }

    #[tokio::test]
    async fn unreachable_upstream_leaves_document_untouched() {
        let h = Harness::new(FakeFetcher::unreachable()).await;
        let err = h
            .uc(false)
            .execute("d1", None, input(2, Some("http://127.0.0.1:9/gone")))
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::UpstreamFetch(_)));
        assert_eq!(h.store.read_blob("d1", "docx").await.unwrap().unwrap(), b"old");
        assert_eq!(h.store.get("d1").await.unwrap().unwrap().updated_at, 1_000);
    }

    #[tokio::test]
    async fn save_for_unknown_document_skips_fetch() {
        let h = Harness::new(FakeFetcher::serving(b"x")).await;
        let err = h
            .uc(false)
            .execute("other", None, input(2, Some("http://ds/x")))
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::NotFound));
        assert!(h.fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn bad_token_is_rejected_before_anything_else() {
        let h = Harness::new(FakeFetcher::serving(b"x")).await;
        let forged = EditorTokenSigner::new("other", 600)
            .sign(&json!({"status": 2}))
            .unwrap();
        let err = h
            .uc(false)
            .execute("d1", Some(&forged), input(2, Some("http://ds/x")))
            .await
            .unwrap_err();
        assert!(matches!(err, DocumentError::TokenInvalid(_)));
        assert!(h.fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_token_depends_on_policy() {
        let h = Harness::new(FakeFetcher::serving(b"x")).await;
        assert!(h.uc(false).execute("d1", None, input(1, None)).await.is_ok());
        assert!(matches!(
            h.uc(true).execute("d1", None, input(1, None)).await,
            Err(DocumentError::TokenMissing)
        ));
    }

    #[tokio::test]
    async fn body_token_supplies_callback_fields() {
        let h = Harness::new(FakeFetcher::serving(b"from token")).await;
        let token = h
            .signer
            .sign(&json!({"payload": {"status": 2, "url": "http://ds/tok"}}))
            .unwrap();
        let body = CallbackInput {
            token: Some(token),
            ..CallbackInput::default()
        };
        let out = h.uc(true).execute("d1", None, body).await.unwrap();
        assert!(matches!(out, CallbackOutcome::Saved { .. }));
        assert_eq!(h.fetcher.calls(), vec!["http://ds/tok"]);
    }

    #[tokio::test]
    async fn saving_external_document_makes_it_local() {
        let h = Harness::new(FakeFetcher::serving(b"edited")).await;
        let mut rec = h.store.get("d1").await.unwrap().unwrap();
        rec.external_url = Some("https://ext/a.docx".into());
        h.store.put(&rec).await.unwrap();
        h.store.remove_blob("d1", "docx").await.unwrap();

        h.uc(false)
            .execute("d1", None, input(2, Some("http://ds/x")))
            .await
            .unwrap();
        let rec = h.store.get("d1").await.unwrap().unwrap();
        assert!(rec.external_url.is_none());
        assert_eq!(h.store.read_blob("d1", "docx").await.unwrap().unwrap(), b"edited");
    }
}
