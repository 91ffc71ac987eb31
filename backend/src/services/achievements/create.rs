use actix_web::{web, HttpResponse};
use common::model::achievement::AchievementContent;
use common::model::views::Created;

use crate::access::Caller;
use crate::error::AppError;
use crate::state::AppState;

/// `POST /api/v1/achievements`
///
/// Returns `201 Created` with the new id and its `draft` status.
pub async fn process(
    caller: Caller,
    state: web::Data<AppState>,
    payload: web::Json<AchievementContent>,
) -> Result<HttpResponse, AppError> {
    let reference = state.orchestrator.create(&caller, &payload).await?;
    Ok(HttpResponse::Created().json(Created {
        message: "Achievement created successfully".to_string(),
        id: reference.id,
        status: reference.status,
    }))
}
