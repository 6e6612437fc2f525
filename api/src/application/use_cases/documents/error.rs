#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error("{0}")]
    Validation(String),
    #[error("document not found")]
    NotFound,
    #[error("failed to fetch edited document")]
    UpstreamFetch(#[source] anyhow::Error),
    #[error("editor token rejected")]
    TokenInvalid(#[source] jsonwebtoken::errors::Error),
    #[error("editor token missing")]
    TokenMissing,
    #[error("failed to sign editor token")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("storage failure")]
    Storage(#[source] anyhow::Error),
}

impl DocumentError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
