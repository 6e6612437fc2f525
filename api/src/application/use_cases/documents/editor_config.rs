use crate::application::dto::editor::{
    EditorConfig, EditorCustomization, EditorDocument, EditorMode, EditorOptions,
    EditorPermissions, EditorSettings, SignedEditorConfig,
};
use crate::application::ports::document_store::DocumentStore;
use crate::application::services::editor_token::EditorTokenSigner;
use crate::application::services::links;
use crate::application::use_cases::documents::error::DocumentError;
use crate::domain::documents::document::{DocumentRecord, is_valid_document_id};

pub fn build_editor_config(
    record: &DocumentRecord,
    base_url: &str,
    options: &EditorOptions,
) -> EditorConfig {
    let url = record
        .external_url
        .clone()
        .unwrap_or_else(|| links::download_url(base_url, &record.id));
    EditorConfig {
        document: EditorDocument {
            file_type: record.ext.clone(),
            key: record.document_key(),
            title: record.name.clone(),
            url,
            permissions: EditorPermissions {
                edit: options.mode == EditorMode::Edit,
                download: true,
                print: true,
                review: true,
                comment: true,
            },
        },
        document_type: record.editor_type().as_str().to_string(),
        editor_config: EditorSettings {
            mode: options.mode,
            lang: options.lang.clone(),
            callback_url: links::callback_url(base_url, &record.id),
            user: options.user.clone(),
            customization: EditorCustomization {
                autosave: true,
                forcesave: true,
            },
        },
        height: "100%".into(),
        width: "100%".into(),
    }
}

pub struct GetEditorConfig<'a, S>
where
    S: DocumentStore + ?Sized,
{
    pub store: &'a S,
    pub signer: &'a EditorTokenSigner,
}

impl<'a, S> GetEditorConfig<'a, S>
where
    S: DocumentStore + ?Sized,
{
    pub async fn execute(
        &self,
        id: &str,
        base_url: &str,
        options: &EditorOptions,
    ) -> Result<SignedEditorConfig, DocumentError> {
        if !is_valid_document_id(id) {
            return Err(DocumentError::NotFound);
        }
        let record = self
            .store
            .get(id)
            .await
            .map_err(DocumentError::Storage)?
            .ok_or(DocumentError::NotFound)?;
        let config = build_editor_config(&record, base_url, options);
        let token = self.signer.sign(&config).map_err(|err| {
            tracing::error!(error = ?err, doc_id = %id, "sign_editor_config_failed");
            DocumentError::Signing(err)
        })?;
        Ok(SignedEditorConfig { config, token })
    }
}
