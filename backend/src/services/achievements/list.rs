use actix_web::{web, HttpResponse};
use common::requests::AchievementQuery;

use crate::access::Caller;
use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/v1/achievements[?status=]`
///
/// Always answers with a JSON array, `[]` when nothing is visible.
pub async fn process(
    caller: Caller,
    state: web::Data<AppState>,
    query: web::Query<AchievementQuery>,
) -> Result<HttpResponse, AppError> {
    let summaries = state.orchestrator.list(&caller, query.status).await?;
    Ok(HttpResponse::Ok().json(summaries))
}
