use actix_web::{web, HttpResponse};

use crate::access::Caller;
use crate::error::{parse_id, AppError};
use crate::state::AppState;

/// `GET /api/v1/achievements/{id}/history`
pub async fn process(
    caller: Caller,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "achievement")?;
    let entries = state.orchestrator.history(&caller, id).await?;
    Ok(HttpResponse::Ok().json(entries))
}
