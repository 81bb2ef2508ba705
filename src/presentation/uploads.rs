use crate::domain::repository::Upload;
use crate::presentation::handlers::{ApiError, AppState};
use actix_multipart::Multipart;
use actix_web::http::header::{CONTENT_DISPOSITION, X_CONTENT_TYPE_OPTIONS};
use actix_web::{HttpResponse, web};
use futures_util::TryStreamExt;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

const FILE_FIELD: &str = "file";
const DEFAULT_FILE_NAME: &str = "upload";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Serialize)]
struct UploadResponse {
    url: String,
}

/// `POST /api/upload`: stores the multipart field named `file`.
#[instrument(skip(state, payload))]
pub async fn upload(
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let mut upload: Option<Upload> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) || upload.is_some() {
            // Drain fields we do not keep so the stream can advance
            while field
                .try_next()
                .await
                .map_err(|e| ApiError::Validation(format!("Invalid multipart payload: {}", e)))?
                .is_some()
            {}
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        let content_type = field
            .content_type()
            .map(|mime| mime.to_string())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| ApiError::Validation(format!("Invalid multipart payload: {}", e)))?
        {
            if bytes.len() + chunk.len() > state.max_upload_bytes {
                warn!(limit = state.max_upload_bytes, "Upload rejected: too large");
                return Err(ApiError::Validation(format!(
                    "File too large: limit is {} bytes",
                    state.max_upload_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        upload = Some(Upload {
            file_name,
            content_type,
            bytes,
        });
    }

    let upload =
        upload.ok_or_else(|| ApiError::Validation("No file uploaded".to_string()))?;
    let size = upload.bytes.len();

    let name = state.uploads.save(upload).await.map_err(|e| {
        error!(error = %e, "Failed to store upload");
        ApiError::from(e)
    })?;

    info!(name = %name, size, "File uploaded");
    Ok(HttpResponse::Ok().json(UploadResponse {
        url: format!("/api/uploads/{}", name),
    }))
}

/// Raster images are the only uploads rendered inline; SVG can carry script.
fn is_inline_safe(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence.starts_with("image/") && essence != "image/svg+xml"
}

/// `GET /api/uploads/{name}`: serves a stored file with its original content type.
/// Anything but a raster image is sent as a download.
#[instrument(skip(state), fields(name = %*path))]
pub async fn fetch_upload(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let name = path.into_inner();
    let upload = state
        .uploads
        .load(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Upload not found: {}", name)))?;

    let disposition = if is_inline_safe(&upload.content_type) {
        "inline".to_string()
    } else {
        format!("attachment; filename=\"{}\"", name)
    };

    Ok(HttpResponse::Ok()
        .content_type(upload.content_type)
        .insert_header((X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .insert_header((CONTENT_DISPOSITION, disposition))
        .body(upload.bytes))
}
