//! Lecturer profiles and their advisees under `/api/v1/lecturers`.

mod profiles;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/v1/lecturers";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(profiles::list))
        .route("", post().to(profiles::create))
        .route("/{id}/advisees", get().to(profiles::advisees))
}
