//! # Attachment Upload
//!
//! Handles `POST /api/v1/achievements/{id}/attachments`. The request is
//! `multipart/form-data` with a single `file` part; other parts are drained
//! and ignored. The payload is buffered up to the configured size limit and
//! handed to the orchestrator, which stores it and appends the attachment
//! record to the draft.

use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use log::debug;
use serde_json::json;

use crate::access::Caller;
use crate::error::{parse_id, AppError};
use crate::state::AppState;
use crate::uploads::FileUpload;

const FILE_FIELD: &str = "file";

pub async fn process(
    caller: Caller,
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "achievement")?;
    let upload = read_file(payload, state.max_upload_bytes).await?;
    debug!(
        "Received attachment {} ({} bytes) for achievement {}",
        upload.file_name,
        upload.bytes.len(),
        id
    );

    let attachment = state.orchestrator.add_attachment(&caller, id, &upload).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "File uploaded successfully",
        "data": attachment,
    })))
}

/// Pulls the `file` part out of the multipart stream.
async fn read_file(mut payload: Multipart, limit: usize) -> Result<FileUpload, AppError> {
    let mut upload: Option<FileUpload> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::bad_request(format!("Invalid multipart body: {e}")))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        if name.as_deref() != Some(FILE_FIELD) || upload.is_some() {
            drain(&mut field).await?;
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| AppError::bad_request("Uploaded file has no name"))?;
        let content_type = field.content_type().map(|mime| mime.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::bad_request(format!("Invalid multipart body: {e}")))?;
            if bytes.len() + chunk.len() > limit {
                return Err(AppError::bad_request(format!(
                    "File exceeds the maximum size of {limit} bytes"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        upload = Some(FileUpload {
            file_name,
            content_type,
            bytes,
        });
    }

    upload.ok_or_else(|| AppError::bad_request("No file uploaded"))
}

async fn drain(field: &mut Field) -> Result<(), AppError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| AppError::bad_request(format!("Invalid multipart body: {e}")))?;
    }
    Ok(())
}
