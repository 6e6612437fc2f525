/// Raw upload fields as received; resolved into a `NewDocument` by the upload use case.
#[derive(Debug, Clone, Default)]
pub struct UploadInput {
    pub id: Option<String>,
    pub name: Option<String>,
    pub mime_type: Option<String>,
    pub base64: Option<String>,
    pub file_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub id: String,
    pub download_url: String,
    pub external_url: Option<String>,
    pub created: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CallbackInput {
    pub status: Option<i64>,
    pub url: Option<String>,
    pub key: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    Acknowledged,
    Saved { updated_at: i64 },
}
