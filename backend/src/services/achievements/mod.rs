//! # Achievement Service Module
//!
//! Routes every achievement request under `/api/v1/achievements` to its
//! handler. Handlers only translate HTTP to orchestrator calls; ownership,
//! role and lifecycle rules are enforced by the orchestrator.
//!
//! ## Sub-modules:
//! - `create`: stores a new draft for the calling student.
//! - `list`: summaries visible to the caller, optionally filtered by status.
//! - `detail`: reference row merged with its document.
//! - `update` / `remove`: draft-only edits by the owner.
//! - `submit` / `review`: lifecycle transitions.
//! - `attachments`: multipart upload appended to a draft.
//! - `history`: status timeline.

mod attachments;
mod create;
mod detail;
mod history;
mod list;
mod remove;
mod review;
mod submit;
mod update;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;
use common::model::reference::AchievementStatus;
use serde::Serialize;
use uuid::Uuid;

const API_PATH: &str = "/api/v1/achievements";

/// Configures and returns the Actix `Scope` for achievement routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(create::process))
        .route("", get().to(list::process))
        .route("/{id}", get().to(detail::process))
        .route("/{id}", put().to(update::process))
        .route("/{id}", delete().to(remove::process))
        .route("/{id}/submit", post().to(submit::process))
        .route("/{id}/verify", post().to(review::verify))
        .route("/{id}/reject", post().to(review::reject))
        .route("/{id}/attachments", post().to(attachments::process))
        .route("/{id}/history", get().to(history::process))
}

/// Body returned by the lifecycle endpoints.
#[derive(Debug, Serialize)]
struct TransitionResponse {
    message: &'static str,
    id: Uuid,
    status: AchievementStatus,
}
