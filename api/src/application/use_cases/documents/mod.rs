pub mod download_document;
pub mod editor_config;
pub mod error;
pub mod get_document;
pub mod handle_callback;
pub mod list_documents;
pub mod upload_document;
