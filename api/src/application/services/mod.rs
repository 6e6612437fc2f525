pub mod document_locks;
pub mod editor_token;
pub mod links;
