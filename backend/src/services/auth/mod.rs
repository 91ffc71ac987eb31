//! Identity of the current caller. Token issuance lives outside this service;
//! only the profile behind an already-issued token is exposed here.

mod profile;

use actix_web::web::{get, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/v1/auth";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/profile", get().to(profile::process))
}
