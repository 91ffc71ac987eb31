use actix_web::{web, HttpResponse};
use common::requests::AssignRoleRequest;
use log::info;
use serde_json::json;

use crate::access::{AccessContext, Caller, MANAGE_USERS};
use crate::error::{parse_id, AppError};
use crate::state::AppState;

/// `GET /api/v1/roles`
pub async fn list(caller: Caller, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    caller.require_permission(MANAGE_USERS)?;
    let roles = state.directory.list_roles().await?;
    Ok(HttpResponse::Ok().json(roles))
}

/// `PUT /api/v1/users/{id}/role`
pub async fn assign(
    caller: Caller,
    state: web::Data<AppState>,
    id: web::Path<String>,
    payload: web::Json<AssignRoleRequest>,
) -> Result<HttpResponse, AppError> {
    caller.require_permission(MANAGE_USERS)?;
    let id = parse_id(&id, "user")?;
    state.directory.assign_role(id, payload.role_id).await?;
    info!("User {} moved to role {}", id, payload.role_id);
    Ok(HttpResponse::Ok().json(json!({ "message": "Role assigned successfully" })))
}
