//! # User Service Module
//!
//! Account administration under `/api/v1/users` and the role catalogue under
//! `/api/v1/roles`. Listing, creating and re-assigning roles need the
//! `user:manage` permission; reading, editing and deactivating an account is
//! also open to the account's owner.

mod accounts;
mod roles;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/v1/users";
const ROLES_PATH: &str = "/api/v1/roles";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(accounts::list))
        .route("", post().to(accounts::create))
        .route("/{id}", get().to(accounts::get))
        .route("/{id}", put().to(accounts::update))
        .route("/{id}", delete().to(accounts::deactivate))
        .route("/{id}/role", put().to(roles::assign))
}

pub fn configure_role_routes() -> Scope {
    scope(ROLES_PATH).route("", get().to(roles::list))
}
