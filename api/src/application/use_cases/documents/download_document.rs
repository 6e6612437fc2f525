use crate::application::ports::document_store::DocumentStore;
use crate::application::use_cases::documents::error::DocumentError;
use crate::domain::documents::document::is_valid_document_id;

pub enum DocumentPayload {
    /// Hosted elsewhere; the client is sent to this URL.
    Redirect(String),
    Bytes {
        filename: String,
        content_type: String,
        blob_name: String,
        bytes: Vec<u8>,
    },
}

pub struct DownloadDocument<'a, S>
where
    S: DocumentStore + ?Sized,
{
    pub store: &'a S,
}

impl<'a, S> DownloadDocument<'a, S>
where
    S: DocumentStore + ?Sized,
{
    pub async fn execute(&self, id: &str) -> Result<DocumentPayload, DocumentError> {
        if !is_valid_document_id(id) {
            return Err(DocumentError::NotFound);
        }
        let record = self
            .store
            .get(id)
            .await
            .map_err(DocumentError::Storage)?
            .ok_or(DocumentError::NotFound)?;

        if let Some(url) = record.external_url.clone() {
            return Ok(DocumentPayload::Redirect(url));
        }

        let bytes = self
            .store
            .read_blob(&record.id, &record.ext)
            .await
            .map_err(DocumentError::Storage)?
            .ok_or_else(|| {
                tracing::warn!(doc_id = %record.id, ext = %record.ext, "blob_missing_for_record");
                DocumentError::NotFound
            })?;
        Ok(DocumentPayload::Bytes {
            blob_name: record.blob_name(),
            filename: record.name,
            content_type: record.mime_type,
            bytes,
        })
    }
}
