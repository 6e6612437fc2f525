pub mod callback;
pub mod document;
