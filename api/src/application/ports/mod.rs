pub mod blob_fetcher;
pub mod document_store;
pub mod editor_probe;
