use actix_web::{web, HttpResponse};

use crate::access::Caller;
use crate::error::{parse_id, AppError};
use crate::state::AppState;

/// `GET /api/v1/achievements/{id}`
pub async fn process(
    caller: Caller,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "achievement")?;
    let detail = state.orchestrator.detail(&caller, id).await?;
    Ok(HttpResponse::Ok().json(detail))
}
