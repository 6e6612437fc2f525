pub mod documents;
pub mod editor;
