use once_cell::sync::Lazy;
use regex::Regex;

static DOCUMENT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,128}$").expect("valid regex"));

/// Extension used when neither the filename nor the MIME type identifies the format.
pub const DEFAULT_EXTENSION: &str = "docx";

/// Metadata for one stored document.
///
/// Exactly one of the following holds: a local blob named [`DocumentRecord::blob_name`]
/// exists in the store, or `external_url` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub ext: String,
    /// Milliseconds since the Unix epoch.
    pub updated_at: i64,
    pub external_url: Option<String>,
    pub size: Option<u64>,
    pub sha256: Option<String>,
}

impl DocumentRecord {
    /// Cache key handed to the editor. It changes whenever `updated_at` does.
    pub fn document_key(&self) -> String {
        format!("{}_{}", self.id, self.updated_at)
    }

    pub fn blob_name(&self) -> String {
        blob_name(&self.id, &self.ext)
    }

    pub fn is_external(&self) -> bool {
        self.external_url.is_some()
    }

    pub fn editor_type(&self) -> EditorDocumentType {
        EditorDocumentType::from_extension(&self.ext)
    }

    /// Timestamp for the next revision; strictly greater than the current one.
    pub fn next_revision_at(&self, now_ms: i64) -> i64 {
        now_ms.max(self.updated_at.saturating_add(1))
    }
}

/// Where the bytes of an uploaded document come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Embedded(Vec<u8>),
    External(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorDocumentType {
    Word,
    Cell,
    Slide,
}

impl EditorDocumentType {
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "xls" | "xlsx" | "ods" => Self::Cell,
            "ppt" | "pptx" | "odp" => Self::Slide,
            _ => Self::Word,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Cell => "cell",
            Self::Slide => "slide",
        }
    }
}

pub fn blob_name(id: &str, ext: &str) -> String {
    format!("{}.{}", id, ext)
}

pub fn is_valid_document_id(id: &str) -> bool {
    DOCUMENT_ID_RE.is_match(id)
}

pub fn extension_from_mime(mime: &str) -> &'static str {
    match mime {
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        "application/vnd.oasis.opendocument.text" => "odt",
        "application/msword" => "doc",
        "application/pdf" => "pdf",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => "xlsx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => "pptx",
        _ => DEFAULT_EXTENSION,
    }
}

/// Filename suffix (lower-cased) when it is a plain alphanumeric token, else the MIME mapping.
pub fn derive_extension(name: &str, mime: &str) -> String {
    let suffix = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 16)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()));
    suffix.unwrap_or_else(|| extension_from_mime(mime).to_string())
}
