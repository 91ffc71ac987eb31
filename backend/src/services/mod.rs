//! HTTP surface, one module per resource under `/api/v1`.

pub mod achievements;
pub mod auth;
pub mod lecturers;
pub mod students;
pub mod users;

use actix_web::web;

use crate::error::AppError;

/// Largest JSON body accepted.
const JSON_LIMIT: usize = 1024 * 1024;

/// Registers every scope. Used by the server and by the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(auth::configure_routes())
        .service(users::configure_routes())
        .service(users::configure_role_routes())
        .service(students::configure_routes())
        .service(lecturers::configure_routes())
        .service(achievements::configure_routes());
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _| AppError::bad_request(format!("Invalid request body: {err}")).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _| AppError::bad_request(format!("Invalid query: {err}")).into())
}
