//! Request payloads accepted by the HTTP surface.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::reference::AchievementStatus;

/// Body of `POST /achievements/{id}/reject`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub note: String,
}

/// Query string of `GET /achievements`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AchievementQuery {
    #[serde(default)]
    pub status: Option<AchievementStatus>,
}

/// Body of `POST /users`. The password arrives already hashed by the
/// credential service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub role_id: Uuid,
}

/// Body of `PUT /users/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    pub role_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    pub user_id: Uuid,
    pub student_id: String,
    pub program_study: String,
    pub academic_year: String,
    #[serde(default)]
    pub advisor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLecturerRequest {
    pub user_id: Uuid,
    pub lecturer_id: String,
    pub department: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdvisorRequest {
    pub lecturer_id: Uuid,
}
