use crate::application::ports::document_store::DocumentStore;
use crate::domain::documents::document::DocumentRecord;

pub struct ListDocuments<'a, S>
where
    S: DocumentStore + ?Sized,
{
    pub store: &'a S,
}

impl<'a, S> ListDocuments<'a, S>
where
    S: DocumentStore + ?Sized,
{
    // Most recently updated first
    pub async fn execute(&self) -> anyhow::Result<Vec<DocumentRecord>> {
        let mut docs = self.store.list().await?;
        docs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(docs)
    }
}
