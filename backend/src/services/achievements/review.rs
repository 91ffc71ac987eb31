//! Lecturer decisions on submitted achievements.

use actix_web::{web, HttpResponse};
use common::requests::RejectRequest;

use super::TransitionResponse;
use crate::access::Caller;
use crate::error::{parse_id, AppError};
use crate::state::AppState;

/// `POST /api/v1/achievements/{id}/verify`
pub async fn verify(
    caller: Caller,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "achievement")?;
    let status = state.orchestrator.verify(&caller, id).await?;
    Ok(HttpResponse::Ok().json(TransitionResponse {
        message: "Achievement verified",
        id,
        status,
    }))
}

/// `POST /api/v1/achievements/{id}/reject`
///
/// A missing or malformed body is treated as an empty note, which the
/// orchestrator refuses with `400`.
pub async fn reject(
    caller: Caller,
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: Option<web::Json<RejectRequest>>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "achievement")?;
    let note = payload.map(|body| body.into_inner().note).unwrap_or_default();
    let status = state.orchestrator.reject(&caller, id, &note).await?;
    Ok(HttpResponse::Ok().json(TransitionResponse {
        message: "Achievement rejected",
        id,
        status,
    }))
}
