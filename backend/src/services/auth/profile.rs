use actix_web::{web, HttpResponse};
use common::model::directory::Profile;

use crate::access::{AccessContext, Caller};
use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/v1/auth/profile`
///
/// Permissions are read back from the directory rather than the token, so a
/// role change shows up here before the token expires.
pub async fn process(caller: Caller, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let user = state
        .directory
        .user(caller.current_user_id())
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let permissions = state.directory.role_permissions(user.role_id).await?;

    Ok(HttpResponse::Ok().json(Profile {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
        role: user.role_name,
        permissions,
    }))
}
