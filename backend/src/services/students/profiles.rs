use actix_web::{web, HttpResponse};
use common::requests::{CreateStudentRequest, UpdateAdvisorRequest};
use log::info;
use serde_json::json;

use crate::access::{AccessContext, Caller, MANAGE_USERS};
use crate::error::{parse_id, AppError};
use crate::state::AppState;

/// `GET /api/v1/students`
pub async fn list(_caller: Caller, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let students = state.directory.list_students().await?;
    Ok(HttpResponse::Ok().json(students))
}

/// `GET /api/v1/students/{id}`
pub async fn get(
    _caller: Caller,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "student")?;
    let student = state
        .directory
        .student(id)
        .await?
        .ok_or_else(|| AppError::not_found("Student not found"))?;
    Ok(HttpResponse::Ok().json(student))
}

/// `POST /api/v1/students`
///
/// Links an existing user account to a student profile.
pub async fn create(
    caller: Caller,
    state: web::Data<AppState>,
    payload: web::Json<CreateStudentRequest>,
) -> Result<HttpResponse, AppError> {
    caller.require_permission(MANAGE_USERS)?;
    if payload.student_id.trim().is_empty() {
        return Err(AppError::bad_request("Student ID is required"));
    }
    let student = state.directory.create_student(&payload).await?;
    info!("Student profile {} created for user {}", student.student_id, student.user_id);
    Ok(HttpResponse::Created().json(student))
}

/// `PUT /api/v1/students/{id}/advisor`
pub async fn set_advisor(
    caller: Caller,
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<UpdateAdvisorRequest>,
) -> Result<HttpResponse, AppError> {
    caller.require_permission(MANAGE_USERS)?;
    let id = parse_id(&id, "student")?;
    state.directory.set_advisor(id, payload.lecturer_id).await?;
    info!("Student {} now advised by lecturer {}", id, payload.lecturer_id);
    Ok(HttpResponse::Ok().json(json!({ "message": "Advisor updated successfully" })))
}
