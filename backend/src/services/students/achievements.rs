use actix_web::{web, HttpResponse};

use crate::access::Caller;
use crate::error::{parse_id, AppError};
use crate::state::AppState;

/// `GET /api/v1/students/{id}/achievements`
///
/// Same visibility as a single achievement: the student, their advisor, or
/// an admin.
pub async fn process(
    caller: Caller,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "student")?;
    let summaries = state.orchestrator.student_achievements(&caller, id).await?;
    Ok(HttpResponse::Ok().json(summaries))
}
