use crate::application::ports::document_store::DocumentStore;
use crate::application::use_cases::documents::error::DocumentError;
use crate::domain::documents::document::{DocumentRecord, is_valid_document_id};

pub struct GetDocument<'a, S>
where
    S: DocumentStore + ?Sized,
{
    pub store: &'a S,
}

impl<'a, S> GetDocument<'a, S>
where
    S: DocumentStore + ?Sized,
{
    pub async fn execute(&self, id: &str) -> Result<DocumentRecord, DocumentError> {
        if !is_valid_document_id(id) {
            return Err(DocumentError::NotFound);
        }
        self.store
            .get(id)
            .await
            .map_err(DocumentError::Storage)?
            .ok_or(DocumentError::NotFound)
    }
}
