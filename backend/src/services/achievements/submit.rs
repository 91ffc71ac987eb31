use actix_web::{web, HttpResponse};

use super::TransitionResponse;
use crate::access::Caller;
use crate::error::{parse_id, AppError};
use crate::state::AppState;

/// `POST /api/v1/achievements/{id}/submit`
pub async fn process(
    caller: Caller,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "achievement")?;
    let status = state.orchestrator.submit(&caller, id).await?;
    Ok(HttpResponse::Ok().json(TransitionResponse {
        message: "Achievement submitted for verification",
        id,
        status,
    }))
}
