use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::dto::documents::UploadInput;
use crate::application::dto::editor::{EditorConfig, EditorMode, EditorOptions, EditorUser};
use crate::application::services::links;
use crate::application::use_cases::documents::download_document::{
    DocumentPayload, DownloadDocument,
};
use crate::application::use_cases::documents::editor_config::GetEditorConfig;
use crate::application::use_cases::documents::get_document::GetDocument;
use crate::application::use_cases::documents::list_documents::ListDocuments;
use crate::application::use_cases::documents::upload_document::{NewDocument, UploadDocument};
use crate::bootstrap::app_context::AppContext;
use crate::domain::documents::document::DocumentRecord;
use crate::presentation::http::error::{ApiError, ErrorBody};
use crate::presentation::http::origin::BaseUrl;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub id: Option<String>,
    pub name: Option<String>,
    /// MIME type of the file.
    #[serde(rename = "type")]
    pub r#type: Option<String>,
    /// Bare base64 or a `data:` URL.
    pub base64: Option<String>,
    /// Externally hosted copy; takes precedence over `base64`.
    pub file_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub ok: bool,
    pub id: String,
    pub download_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    pub r#type: String,
    pub ext: String,
    /// Revision timestamp in milliseconds.
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub document_key: String,
    pub download_url: String,
}

impl Document {
    fn from_record(record: DocumentRecord, base_url: &str) -> Self {
        let download_url = record
            .external_url
            .clone()
            .unwrap_or_else(|| links::download_url(base_url, &record.id));
        Document {
            document_key: record.document_key(),
            download_url,
            id: record.id,
            name: record.name,
            r#type: record.mime_type,
            ext: record.ext,
            updated_at: record.updated_at,
            file_url: record.external_url,
            size: record.size,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentListResponse {
    pub items: Vec<Document>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfigQuery {
    pub mode: Option<String>,
    pub lang: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
}

impl EditorConfigQuery {
    fn into_options(self) -> EditorOptions {
        let defaults = EditorOptions::default();
        let non_empty = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let mode = match self.mode.as_deref() {
            Some("view") => EditorMode::View,
            _ => EditorMode::Edit,
        };
        EditorOptions {
            mode,
            lang: non_empty(self.lang).unwrap_or(defaults.lang),
            user: EditorUser {
                id: non_empty(self.user_id).unwrap_or(defaults.user.id),
                name: non_empty(self.user_name).unwrap_or(defaults.user.name),
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfigResponse {
    #[schema(value_type = Object)]
    pub config: EditorConfig,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_server_url: Option<String>,
}

#[utoipa::path(post, path = "/api/documents", tag = "Documents", request_body = UploadRequest,
    responses(
        (status = 201, body = UploadResponse, description = "Created"),
        (status = 200, body = UploadResponse, description = "Replaced an existing document"),
        (status = 400, body = ErrorBody)
    ))]
pub async fn upload_document(
    State(ctx): State<AppContext>,
    BaseUrl(base_url): BaseUrl,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let Json(req) = payload?;
    let doc = NewDocument::from_input(UploadInput {
        id: req.id,
        name: req.name,
        mime_type: req.r#type,
        base64: req.base64,
        file_url: req.file_url,
    })?;

    let store = ctx.document_store();
    let uc = UploadDocument {
        store: store.as_ref(),
        locks: ctx.locks(),
    };
    let out = uc.execute(doc, &base_url).await?;
    let status = if out.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(UploadResponse {
            ok: true,
            id: out.id,
            download_url: out.download_url,
            file_url: out.external_url,
        }),
    ))
}

#[utoipa::path(get, path = "/api/documents", tag = "Documents",
    responses((status = 200, body = DocumentListResponse)))]
pub async fn list_documents(
    State(ctx): State<AppContext>,
    BaseUrl(base_url): BaseUrl,
) -> Result<Json<DocumentListResponse>, ApiError> {
    let store = ctx.document_store();
    let uc = ListDocuments {
        store: store.as_ref(),
    };
    let records = uc.execute().await.map_err(|e| {
        tracing::error!(error = ?e, "list_documents_failed");
        ApiError::internal()
    })?;
    let items = records
        .into_iter()
        .map(|r| Document::from_record(r, &base_url))
        .collect();
    Ok(Json(DocumentListResponse { items }))
}

#[utoipa::path(get, path = "/api/documents/{id}", tag = "Documents",
    params(("id" = String, Path, description = "Document ID")),
    responses((status = 200, body = Document), (status = 404, body = ErrorBody)))]
pub async fn get_document(
    State(ctx): State<AppContext>,
    BaseUrl(base_url): BaseUrl,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let store = ctx.document_store();
    let uc = GetDocument {
        store: store.as_ref(),
    };
    let record = uc.execute(&id).await?;
    Ok(Json(Document::from_record(record, &base_url)))
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct DocumentBinary(#[schema(value_type = String, format = Binary)] Vec<u8>);

fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "inline; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}/download",
    tag = "Documents",
    operation_id = "download_document",
    params(("id" = String, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document bytes", content_type = "application/octet-stream", body = DocumentBinary),
        (status = 302, description = "Externally hosted document"),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn download_document(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let store = ctx.document_store();
    let uc = DownloadDocument {
        store: store.as_ref(),
    };
    match uc.execute(&id).await? {
        // 302 rather than Redirect::to, which answers 303
        DocumentPayload::Redirect(url) => {
            let location = HeaderValue::from_str(&url).map_err(|_| {
                tracing::error!(doc_id = %id, "external_url_not_a_header_value");
                ApiError::internal()
            })?;
            Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
        }
        DocumentPayload::Bytes {
            filename,
            content_type,
            blob_name,
            bytes,
        } => {
            let mut headers = HeaderMap::new();
            let content_type = HeaderValue::from_str(&content_type)
                .ok()
                .filter(|_| !content_type.is_empty())
                .unwrap_or_else(|| {
                    let guessed = mime_guess::from_path(&blob_name).first_or_octet_stream();
                    HeaderValue::from_str(guessed.as_ref())
                        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
                });
            headers.insert(header::CONTENT_TYPE, content_type);
            headers.insert(
                header::HeaderName::from_static("x-content-type-options"),
                HeaderValue::from_static("nosniff"),
            );
            let disposition = HeaderValue::from_str(&content_disposition(&filename))
                .unwrap_or_else(|_| HeaderValue::from_static("inline"));
            headers.insert(header::CONTENT_DISPOSITION, disposition);
            Ok((headers, bytes).into_response())
        }
    }
}

#[utoipa::path(get, path = "/api/documents/{id}/onlyoffice-config", tag = "Editor",
    params(
        ("id" = String, Path, description = "Document ID"),
        ("mode" = Option<String>, Query, description = "`view` for read-only"),
        ("lang" = Option<String>, Query, description = "Editor UI language"),
        ("userId" = Option<String>, Query, description = "Editing user id"),
        ("userName" = Option<String>, Query, description = "Editing user display name")
    ),
    responses((status = 200, body = EditorConfigResponse), (status = 404, body = ErrorBody)))]
pub async fn editor_config(
    State(ctx): State<AppContext>,
    BaseUrl(base_url): BaseUrl,
    Path(id): Path<String>,
    q: Option<Query<EditorConfigQuery>>,
) -> Result<Json<EditorConfigResponse>, ApiError> {
    let options = q
        .map(|Query(q)| q.into_options())
        .unwrap_or_default();
    let store = ctx.document_store();
    let uc = GetEditorConfig {
        store: store.as_ref(),
        signer: ctx.token_signer(),
    };
    let signed = uc.execute(&id, &base_url, &options).await?;
    Ok(Json(EditorConfigResponse {
        config: signed.config,
        token: signed.token,
        document_server_url: ctx.cfg.document_server_url.clone(),
    }))
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/documents", get(list_documents).post(upload_document))
        .route("/documents/:id", get(get_document))
        .route("/documents/:id/download", get(download_document))
        .route("/documents/:id/onlyoffice-config", get(editor_config))
        .route("/documents/:id/config", get(editor_config))
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_keeps_ascii_and_encodes_utf8() {
        assert_eq!(
            content_disposition("report.docx"),
            "inline; filename=\"report.docx\"; filename*=UTF-8''report.docx"
        );
        assert_eq!(
            content_disposition("déjà \"vu\".pdf"),
            "inline; filename=\"d_j_ _vu_.pdf\"; filename*=UTF-8''d%C3%A9j%C3%A0%20%22vu%22.pdf"
        );
    }

    #[test]
    fn query_maps_to_editor_options() {
        let opts = EditorConfigQuery {
            mode: Some("view".into()),
            lang: Some("de".into()),
            user_id: Some("u9".into()),
            user_name: Some("  ".into()),
        }
        .into_options();
        assert_eq!(opts.mode, EditorMode::View);
        assert_eq!(opts.lang, "de");
        assert_eq!(opts.user.id, "u9");
        assert_eq!(opts.user.name, "User");

        let opts = EditorConfigQuery {
            mode: Some("bogus".into()),
            ..EditorConfigQuery::default()
        }
        .into_options();
        assert_eq!(opts.mode, EditorMode::Edit);
        assert_eq!(opts.lang, "en");
    }
}
