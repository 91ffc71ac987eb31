use actix_web::{web, HttpResponse};
use common::requests::{CreateUserRequest, UpdateUserRequest};
use log::info;
use serde_json::json;

use crate::access::{AccessContext, Caller, MANAGE_USERS};
use crate::error::{parse_id, AppError};
use crate::state::AppState;

fn require_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::bad_request(format!("{field} is required")));
    }
    Ok(())
}

/// `GET /api/v1/users`
pub async fn list(caller: Caller, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    caller.require_permission(MANAGE_USERS)?;
    let users = state.directory.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// `GET /api/v1/users/{id}`
pub async fn get(
    caller: Caller,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "user")?;
    caller.require_admin_or_self(id)?;
    let user = state
        .directory
        .user(id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(HttpResponse::Ok().json(user))
}

/// `POST /api/v1/users`
///
/// The password must already be hashed; this service never sees plain text.
pub async fn create(
    caller: Caller,
    state: web::Data<AppState>,
    payload: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    caller.require_permission(MANAGE_USERS)?;
    require_text(&payload.username, "Username")?;
    require_text(&payload.email, "Email")?;
    require_text(&payload.full_name, "Full name")?;
    require_text(&payload.password_hash, "Password hash")?;

    let user = state.directory.create_user(&payload).await?;
    info!("User {} created with role {}", user.username, user.role_name);
    Ok(HttpResponse::Created().json(user))
}

/// `PUT /api/v1/users/{id}`
pub async fn update(
    caller: Caller,
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "user")?;
    caller.require_admin_or_self(id)?;
    let user = state.directory.update_user(id, &payload).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// `DELETE /api/v1/users/{id}`
///
/// Soft delete: the account is deactivated and keeps its history.
pub async fn deactivate(
    caller: Caller,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&id, "user")?;
    caller.require_admin_or_self(id)?;
    state.directory.deactivate_user(id).await?;
    info!("User {} deactivated by {}", id, caller.current_user_id());
    Ok(HttpResponse::Ok().json(json!({ "message": "User deactivated successfully" })))
}
