pub mod editor;
pub mod storage;
