use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::application::dto::documents::{UploadInput, UploadedDocument};
use crate::application::ports::document_store::DocumentStore;
use crate::application::services::document_locks::DocumentLocks;
use crate::application::services::links;
use crate::application::use_cases::documents::error::DocumentError;
use crate::domain::documents::document::{
    DocumentRecord, DocumentSource, derive_extension, is_valid_document_id,
};

// Browsers emit padded base64, hand-built clients sometimes don't.
const PAYLOAD_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Upload after validation: every field present, payload resolved to one source.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub ext: String,
    pub source: DocumentSource,
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl NewDocument {
    pub fn from_input(input: UploadInput) -> Result<Self, DocumentError> {
        let (Some(id), Some(name), Some(mime_type)) = (
            required(input.id),
            required(input.name),
            required(input.mime_type),
        ) else {
            return Err(DocumentError::validation("Missing required fields"));
        };
        if !is_valid_document_id(&id) {
            return Err(DocumentError::validation("Invalid document id"));
        }

        // An external reference takes precedence over an embedded payload.
        let source = match (required(input.file_url), required(input.base64)) {
            (Some(url), _) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(DocumentError::validation("fileUrl must be an http(s) URL"));
                }
                DocumentSource::External(url)
            }
            (None, Some(payload)) => DocumentSource::Embedded(decode_payload(&payload)?),
            (None, None) => return Err(DocumentError::validation("Missing required fields")),
        };

        let ext = derive_extension(&name, &mime_type);
        Ok(Self {
            id,
            name,
            mime_type,
            ext,
            source,
        })
    }
}

/// Accepts a bare base64 string or a `data:<mime>;base64,<payload>` URL.
pub fn decode_payload(raw: &str) -> Result<Vec<u8>, DocumentError> {
    let data = raw.split_once(',').map(|(_, d)| d).unwrap_or(raw);
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    PAYLOAD_BASE64
        .decode(compact.as_bytes())
        .map_err(|_| DocumentError::validation("base64 payload is not valid"))
}

pub struct UploadDocument<'a, S>
where
    S: DocumentStore + ?Sized,
{
    pub store: &'a S,
    pub locks: &'a DocumentLocks,
}

impl<'a, S> UploadDocument<'a, S>
where
    S: DocumentStore + ?Sized,
{
    pub async fn execute(
        &self,
        doc: NewDocument,
        base_url: &str,
    ) -> Result<UploadedDocument, DocumentError> {
        let _guard = self.locks.acquire(&doc.id).await;

        let previous = self
            .store
            .get(&doc.id)
            .await
            .map_err(DocumentError::Storage)?;
        let now = chrono::Utc::now().timestamp_millis();
        let updated_at = previous
            .as_ref()
            .map(|p| p.next_revision_at(now))
            .unwrap_or(now);

        let mut record = DocumentRecord {
            id: doc.id.clone(),
            name: doc.name,
            mime_type: doc.mime_type,
            ext: doc.ext,
            updated_at,
            external_url: None,
            size: None,
            sha256: None,
        };
        match doc.source {
            DocumentSource::Embedded(bytes) => {
                let stored = self
                    .store
                    .write_blob(&record.id, &record.ext, &bytes)
                    .await
                    .map_err(|err| {
                        tracing::error!(error = ?err, doc_id = %record.id, "write_blob_failed");
                        DocumentError::Storage(err)
                    })?;
                record.size = Some(stored.size);
                record.sha256 = Some(stored.sha256);
            }
            DocumentSource::External(url) => record.external_url = Some(url),
        }
        self.store.put(&record).await.map_err(|err| {
            tracing::error!(error = ?err, doc_id = %record.id, "write_metadata_failed");
            DocumentError::Storage(err)
        })?;

        if let Some(prev) = previous.as_ref() {
            let stale_blob = !prev.is_external() && (record.is_external() || prev.ext != record.ext);
            if stale_blob {
                if let Err(err) = self.store.remove_blob(&prev.id, &prev.ext).await {
                    tracing::warn!(error = ?err, doc_id = %prev.id, ext = %prev.ext, "remove_stale_blob_failed");
                }
            }
        }

        tracing::info!(
            doc_id = %record.id,
            ext = %record.ext,
            external = record.is_external(),
            size = record.size.unwrap_or(0),
            "document_uploaded"
        );

        let download_url = match record.external_url.as_deref() {
            Some(url) => url.to_string(),
            None => links::download_url(base_url, &record.id),
        };
        Ok(UploadedDocument {
            id: record.id,
            download_url,
            external_url: record.external_url,
            created: previous.is_none(),
        })
    }
}
