//! Student profiles under `/api/v1/students`.

mod achievements;
mod profiles;

use actix_web::web::{get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/v1/students";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(profiles::list))
        .route("", post().to(profiles::create))
        .route("/{id}", get().to(profiles::get))
        .route("/{id}/achievements", get().to(achievements::process))
        .route("/{id}/advisor", put().to(profiles::set_advisor))
}
