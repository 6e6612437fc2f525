use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    #[default]
    Edit,
    View,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorUser {
    pub id: String,
    pub name: String,
}

impl Default for EditorUser {
    fn default() -> Self {
        Self {
            id: "user1".into(),
            name: "User".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorPermissions {
    pub edit: bool,
    pub download: bool,
    pub print: bool,
    pub review: bool,
    pub comment: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorDocument {
    pub file_type: String,
    pub key: String,
    pub title: String,
    pub url: String,
    pub permissions: EditorPermissions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorCustomization {
    pub autosave: bool,
    pub forcesave: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    pub mode: EditorMode,
    pub lang: String,
    pub callback_url: String,
    pub user: EditorUser,
    pub customization: EditorCustomization,
}

/// Configuration object consumed by the embedded editor widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    pub document: EditorDocument,
    pub document_type: String,
    pub editor_config: EditorSettings,
    pub height: String,
    pub width: String,
}

#[derive(Debug, Clone)]
pub struct EditorOptions {
    pub mode: EditorMode,
    pub lang: String,
    pub user: EditorUser,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            mode: EditorMode::Edit,
            lang: "en".into(),
            user: EditorUser::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignedEditorConfig {
    pub config: EditorConfig,
    pub token: String,
}
