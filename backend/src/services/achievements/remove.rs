use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::access::Caller;
use crate::error::{parse_id, AppError};
use crate::state::AppState;

/// `DELETE /api/v1/achievements/{id}`
pub async fn process(
    caller: Caller,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "achievement")?;
    state.orchestrator.delete(&caller, id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Achievement deleted successfully" })))
}
