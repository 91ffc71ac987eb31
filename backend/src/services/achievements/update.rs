use actix_web::{web, HttpResponse};
use common::model::achievement::AchievementContent;
use serde_json::json;

use crate::access::Caller;
use crate::error::{parse_id, AppError};
use crate::state::AppState;

/// `PUT /api/v1/achievements/{id}`
///
/// Replaces the document content of a draft. Attachments are kept.
pub async fn process(
    caller: Caller,
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<AchievementContent>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "achievement")?;
    state.orchestrator.update(&caller, id, &payload).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Achievement updated successfully" })))
}
