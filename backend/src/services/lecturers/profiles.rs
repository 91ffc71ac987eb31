use actix_web::{web, HttpResponse};
use common::requests::CreateLecturerRequest;
use log::info;

use crate::access::{AccessContext, Caller, MANAGE_USERS};
use crate::error::{parse_id, AppError};
use crate::state::AppState;

/// `GET /api/v1/lecturers`
pub async fn list(_caller: Caller, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let lecturers = state.directory.list_lecturers().await?;
    Ok(HttpResponse::Ok().json(lecturers))
}

/// `POST /api/v1/lecturers`
pub async fn create(
    caller: Caller,
    state: web::Data<AppState>,
    payload: web::Json<CreateLecturerRequest>,
) -> Result<HttpResponse, AppError> {
    caller.require_permission(MANAGE_USERS)?;
    if payload.lecturer_id.trim().is_empty() {
        return Err(AppError::bad_request("Lecturer ID is required"));
    }
    let lecturer = state.directory.create_lecturer(&payload).await?;
    info!("Lecturer profile {} created for user {}", lecturer.lecturer_id, lecturer.user_id);
    Ok(HttpResponse::Created().json(lecturer))
}

/// `GET /api/v1/lecturers/{id}/advisees`
pub async fn advisees(
    _caller: Caller,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "lecturer")?;
    if state.directory.lecturer(id).await?.is_none() {
        return Err(AppError::not_found("Lecturer not found"));
    }
    let students = state.directory.advisees(id).await?;
    Ok(HttpResponse::Ok().json(students))
}
