use std::sync::Arc;

use crate::application::ports::blob_fetcher::BlobFetcher;
use crate::application::ports::document_store::DocumentStore;
use crate::application::ports::editor_probe::EditorProbe;
use crate::application::services::document_locks::DocumentLocks;
use crate::application::services::editor_token::EditorTokenSigner;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

pub struct AppServices {
    document_store: Arc<dyn DocumentStore>,
    blob_fetcher: Arc<dyn BlobFetcher>,
    editor_probe: Arc<dyn EditorProbe>,
    token_signer: EditorTokenSigner,
    locks: DocumentLocks,
}

impl AppServices {
    pub fn new(
        document_store: Arc<dyn DocumentStore>,
        blob_fetcher: Arc<dyn BlobFetcher>,
        editor_probe: Arc<dyn EditorProbe>,
        token_signer: EditorTokenSigner,
    ) -> Self {
        Self {
            document_store,
            blob_fetcher,
            editor_probe,
            token_signer,
            locks: DocumentLocks::new(),
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn document_store(&self) -> Arc<dyn DocumentStore> {
        self.services.document_store.clone()
    }

    pub fn blob_fetcher(&self) -> Arc<dyn BlobFetcher> {
        self.services.blob_fetcher.clone()
    }

    pub fn editor_probe(&self) -> Arc<dyn EditorProbe> {
        self.services.editor_probe.clone()
    }

    pub fn token_signer(&self) -> &EditorTokenSigner {
        &self.services.token_signer
    }

    pub fn locks(&self) -> &DocumentLocks {
        &self.services.locks
    }
}
