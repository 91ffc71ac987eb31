//! Repositories the backend persists through.
//!
//! The relational side (reference rows and the identity directory) and the
//! document side (achievement content) are separate traits with separate
//! implementations. Nothing here spans both stores; the orchestrator is the
//! only place where they meet.

pub mod memory;
pub mod mongo;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::model::achievement::{Achievement, AchievementContent, Attachment};
use common::model::directory::{Lecturer, Role, Student, User};
use common::model::reference::{AchievementReference, AchievementStatus};
use common::requests::{CreateLecturerRequest, CreateStudentRequest, CreateUserRequest, UpdateUserRequest};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0} already exists")]
    Conflict(&'static str),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("BSON encoding error: {0}")]
    BsonEncode(#[from] bson::ser::Error),

    #[error("BSON decoding error: {0}")]
    BsonDecode(#[from] bson::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Which reference rows a listing returns.
#[derive(Debug, Clone, Default)]
pub struct ReferenceFilter {
    /// `None` lists every student; `Some(vec![])` matches nothing.
    pub students: Option<Vec<Uuid>>,
    pub status: Option<AchievementStatus>,
}

/// A status change together with the stamps it writes.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Submit { at: DateTime<Utc> },
    Verify { by: Uuid, at: DateTime<Utc> },
    Reject { by: Uuid, note: String, at: DateTime<Utc> },
}

impl Transition {
    /// Status the row must currently hold for the change to apply.
    pub fn from(&self) -> AchievementStatus {
        match self {
            Transition::Submit { .. } => AchievementStatus::Draft,
            Transition::Verify { .. } | Transition::Reject { .. } => AchievementStatus::Submitted,
        }
    }

    pub fn to(&self) -> AchievementStatus {
        match self {
            Transition::Submit { .. } => AchievementStatus::Submitted,
            Transition::Verify { .. } => AchievementStatus::Verified,
            Transition::Reject { .. } => AchievementStatus::Rejected,
        }
    }
}

/// Relational rows tracking each achievement's owner and lifecycle.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// Inserts a new draft row pointing at `document_id`.
    async fn create(&self, student_id: Uuid, document_id: &str) -> StoreResult<AchievementReference>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<AchievementReference>>;

    /// Rows matching `filter`, newest first.
    async fn list(&self, filter: &ReferenceFilter) -> StoreResult<Vec<AchievementReference>>;

    /// Applies `transition` only if the row still holds `transition.from()`.
    /// Returns `false` when the row is missing or in another status.
    async fn transition(&self, id: Uuid, transition: &Transition) -> StoreResult<bool>;

    /// Deletes the row only while it is a draft. Returns whether a row went away.
    async fn delete_draft(&self, id: Uuid) -> StoreResult<bool>;
}

/// Flexible achievement documents, keyed by a store-assigned string id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores `content` for `student_id` with an empty attachment list and
    /// returns the new document id.
    async fn insert(&self, student_id: &str, content: &AchievementContent) -> StoreResult<String>;

    async fn find(&self, id: &str) -> StoreResult<Option<Achievement>>;

    /// Documents for the given ids. Unknown ids are skipped.
    async fn find_many(&self, ids: &[String]) -> StoreResult<Vec<Achievement>>;

    /// Replaces the student-written content, keeping ownership and attachments.
    async fn replace_content(&self, id: &str, content: &AchievementContent) -> StoreResult<()>;

    async fn delete(&self, id: &str) -> StoreResult<()>;

    async fn push_attachment(&self, id: &str, attachment: &Attachment) -> StoreResult<()>;
}

/// Users, roles, and the student/lecturer profiles linked to them.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn create_user(&self, request: &CreateUserRequest) -> StoreResult<User>;
    async fn update_user(&self, id: Uuid, request: &UpdateUserRequest) -> StoreResult<User>;
    /// Marks the account inactive; rows are never removed.
    async fn deactivate_user(&self, id: Uuid) -> StoreResult<()>;
    async fn assign_role(&self, user_id: Uuid, role_id: Uuid) -> StoreResult<()>;
    async fn list_roles(&self) -> StoreResult<Vec<Role>>;
    async fn role(&self, id: Uuid) -> StoreResult<Option<Role>>;
    async fn role_permissions(&self, role_id: Uuid) -> StoreResult<Vec<String>>;

    async fn list_students(&self) -> StoreResult<Vec<Student>>;
    async fn student(&self, id: Uuid) -> StoreResult<Option<Student>>;
    async fn student_by_user(&self, user_id: Uuid) -> StoreResult<Option<Student>>;
    async fn create_student(&self, request: &CreateStudentRequest) -> StoreResult<Student>;
    async fn set_advisor(&self, student_id: Uuid, lecturer_id: Uuid) -> StoreResult<()>;

    async fn list_lecturers(&self) -> StoreResult<Vec<Lecturer>>;
    async fn lecturer(&self, id: Uuid) -> StoreResult<Option<Lecturer>>;
    async fn lecturer_by_user(&self, user_id: Uuid) -> StoreResult<Option<Lecturer>>;
    async fn create_lecturer(&self, request: &CreateLecturerRequest) -> StoreResult<Lecturer>;
    async fn advisees(&self, lecturer_id: Uuid) -> StoreResult<Vec<Student>>;
}
