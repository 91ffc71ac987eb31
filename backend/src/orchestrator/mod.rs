//! # Achievement Orchestrator
//!
//! The single place where the relational store and the document store meet.
//! An achievement is a reference row (owner, status, audit stamps) plus a
//! document (everything the student wrote). Every operation here:
//!
//! 1. resolves the caller into a student or lecturer profile,
//! 2. loads the reference row and checks ownership or read access,
//! 3. checks the lifecycle status the operation requires,
//! 4. only then touches either store.
//!
//! ## Cross-store writes
//!
//! There is no transaction spanning both stores. Creation writes the document
//! first and the reference second; a failed reference write deletes the
//! document again. Deletion removes the reference first and the document
//! second. In both cases the compensating or trailing document delete is
//! best effort: its failure is logged and swallowed, so an orphaned document
//! can survive a rare partial failure.
//!
//! ## Races
//!
//! Status changes are conditional writes in the relational store, so when two
//! requests race on one achievement exactly one transition lands and the other
//! reports an invalid state.

mod history;
pub mod lifecycle;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use common::model::achievement::{AchievementContent, Attachment};
use common::model::directory::{Lecturer, Student};
use common::model::reference::{AchievementReference, AchievementStatus};
use common::model::views::{AchievementDetail, AchievementSummary, HistoryEntry};
use log::{error, info, warn};
use uuid::Uuid;

use crate::access::{AccessContext, Role};
use crate::error::AppError;
use crate::store::{DirectoryStore, DocumentStore, ReferenceFilter, ReferenceStore, Transition};
use crate::uploads::{FileUpload, UploadStore};
use lifecycle::{ensure, Action};

#[derive(Clone)]
pub struct Orchestrator {
    references: Arc<dyn ReferenceStore>,
    documents: Arc<dyn DocumentStore>,
    directory: Arc<dyn DirectoryStore>,
    uploads: Arc<dyn UploadStore>,
}

fn validate(content: &AchievementContent) -> Result<(), AppError> {
    if content.title.trim().is_empty() {
        return Err(AppError::bad_request("Title is required"));
    }
    Ok(())
}

impl Orchestrator {
    pub fn new(
        references: Arc<dyn ReferenceStore>,
        documents: Arc<dyn DocumentStore>,
        directory: Arc<dyn DirectoryStore>,
        uploads: Arc<dyn UploadStore>,
    ) -> Self {
        Self {
            references,
            documents,
            directory,
            uploads,
        }
    }

    async fn student_profile(&self, caller: &dyn AccessContext) -> Result<Student, AppError> {
        caller.require_role(Role::Student)?;
        self.directory
            .student_by_user(caller.current_user_id())
            .await?
            .ok_or_else(|| AppError::not_found("Student profile not found"))
    }

    async fn lecturer_profile(&self, caller: &dyn AccessContext) -> Result<Lecturer, AppError> {
        caller.require_role(Role::Lecturer)?;
        self.directory
            .lecturer_by_user(caller.current_user_id())
            .await?
            .ok_or_else(|| AppError::forbidden("User is not a lecturer"))
    }

    async fn reference(&self, id: Uuid) -> Result<AchievementReference, AppError> {
        self.references
            .get(id)
            .await?
            .ok_or_else(|| AppError::not_found("Achievement not found"))
    }

    /// The reference, provided the caller is the student who owns it.
    async fn owned_reference(
        &self,
        caller: &dyn AccessContext,
        id: Uuid,
    ) -> Result<AchievementReference, AppError> {
        let student = self.student_profile(caller).await?;
        let reference = self.reference(id).await?;
        if reference.student_id != student.id {
            return Err(AppError::forbidden("Forbidden: you do not own this achievement"));
        }
        Ok(reference)
    }

    /// Admins read everything, students their own records, lecturers the
    /// records of the students they advise.
    async fn ensure_can_read(&self, caller: &dyn AccessContext, student_id: Uuid) -> Result<(), AppError> {
        match caller.current_role() {
            Role::Admin => Ok(()),
            Role::Student => {
                let me = self.student_profile(caller).await?;
                if me.id == student_id {
                    Ok(())
                } else {
                    Err(AppError::forbidden("Forbidden: you cannot view this achievement"))
                }
            }
            Role::Lecturer => {
                let lecturer = self.lecturer_profile(caller).await?;
                let student = self
                    .directory
                    .student(student_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Student not found"))?;
                if student.advisor_id == Some(lecturer.id) {
                    Ok(())
                } else {
                    Err(AppError::forbidden("Forbidden: student is not your advisee"))
                }
            }
            Role::Other(_) => Err(AppError::forbidden("Forbidden")),
        }
    }

    async fn readable_reference(
        &self,
        caller: &dyn AccessContext,
        id: Uuid,
    ) -> Result<AchievementReference, AppError> {
        let reference = self.reference(id).await?;
        self.ensure_can_read(caller, reference.student_id).await?;
        Ok(reference)
    }

    /// Stores a new draft for the calling student.
    pub async fn create(
        &self,
        caller: &dyn AccessContext,
        content: &AchievementContent,
    ) -> Result<AchievementReference, AppError> {
        validate(content)?;
        let student = self.student_profile(caller).await?;

        let document_id = self.documents.insert(&student.id.to_string(), content).await?;

        match self.references.create(student.id, &document_id).await {
            Ok(reference) => {
                info!("Achievement {} created by student {}", reference.id, student.id);
                Ok(reference)
            }
            Err(err) => {
                error!("Reference write failed for document {document_id}: {err}");
                if let Err(cleanup) = self.documents.delete(&document_id).await {
                    warn!("Orphaned achievement document {document_id} left behind: {cleanup}");
                }
                Err(err.into())
            }
        }
    }

    /// Achievements visible to the caller, newest first.
    pub async fn list(
        &self,
        caller: &dyn AccessContext,
        status: Option<AchievementStatus>,
    ) -> Result<Vec<AchievementSummary>, AppError> {
        let students = match caller.current_role() {
            Role::Admin => None,
            Role::Student => Some(vec![self.student_profile(caller).await?.id]),
            Role::Lecturer => {
                let lecturer = self.lecturer_profile(caller).await?;
                let advisees = self.directory.advisees(lecturer.id).await?;
                Some(advisees.into_iter().map(|s| s.id).collect())
            }
            Role::Other(_) => return Err(AppError::forbidden("Forbidden")),
        };

        self.summaries(&ReferenceFilter { students, status }).await
    }

    /// Achievements of one student, for the student, their advisor or an admin.
    ///
    /// Access is checked before existence, so a student asking about any id
    /// other than their own gets 403 whether or not it exists.
    pub async fn student_achievements(
        &self,
        caller: &dyn AccessContext,
        student_id: Uuid,
    ) -> Result<Vec<AchievementSummary>, AppError> {
        self.ensure_can_read(caller, student_id).await?;
        if self.directory.student(student_id).await?.is_none() {
            return Err(AppError::not_found("Student not found"));
        }

        let filter = ReferenceFilter {
            students: Some(vec![student_id]),
            status: None,
        };
        self.summaries(&filter).await
    }

    async fn summaries(&self, filter: &ReferenceFilter) -> Result<Vec<AchievementSummary>, AppError> {
        let references = self.references.list(filter).await?;
        if references.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = references.iter().map(|r| r.mongo_achievement_id.clone()).collect();
        let documents: HashMap<String, _> = self
            .documents
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|d| (d.id.clone(), d))
            .collect();

        let summaries = references
            .into_iter()
            .filter_map(|reference| match documents.get(&reference.mongo_achievement_id) {
                Some(document) => Some(AchievementSummary {
                    id: reference.id,
                    student_id: reference.student_id,
                    status: reference.status,
                    title: document.content.title.clone(),
                    achievement_type: document.content.achievement_type,
                    points: document.content.points,
                    submitted_at: reference.submitted_at,
                    created_at: reference.created_at,
                }),
                None => {
                    warn!(
                        "Achievement {} points at missing document {}",
                        reference.id, reference.mongo_achievement_id
                    );
                    None
                }
            })
            .collect();

        Ok(summaries)
    }

    pub async fn detail(&self, caller: &dyn AccessContext, id: Uuid) -> Result<AchievementDetail, AppError> {
        let reference = self.readable_reference(caller, id).await?;
        let document = self
            .documents
            .find(&reference.mongo_achievement_id)
            .await?
            .ok_or_else(|| AppError::not_found("Achievement details not found"))?;

        Ok(AchievementDetail {
            id: reference.id,
            student_id: reference.student_id,
            status: reference.status,
            submitted_at: reference.submitted_at,
            verified_at: reference.verified_at,
            verified_by: reference.verified_by,
            rejection_note: reference.rejection_note,
            details: document,
            created_at: reference.created_at,
        })
    }

    /// Replaces the content of a draft the caller owns.
    pub async fn update(
        &self,
        caller: &dyn AccessContext,
        id: Uuid,
        content: &AchievementContent,
    ) -> Result<(), AppError> {
        validate(content)?;
        let reference = self.owned_reference(caller, id).await?;
        ensure(reference.status, Action::Update)?;

        self.documents
            .replace_content(&reference.mongo_achievement_id, content)
            .await?;
        info!("Achievement {id} updated");
        Ok(())
    }

    /// Removes a draft the caller owns: reference first, then the document.
    pub async fn delete(&self, caller: &dyn AccessContext, id: Uuid) -> Result<(), AppError> {
        let reference = self.owned_reference(caller, id).await?;
        ensure(reference.status, Action::Delete)?;

        if !self.references.delete_draft(id).await? {
            return Err(Action::Delete.refused());
        }

        if let Err(err) = self.documents.delete(&reference.mongo_achievement_id).await {
            warn!(
                "Achievement {id} deleted but its document {} could not be removed: {err}",
                reference.mongo_achievement_id
            );
        }
        info!("Achievement {id} deleted");
        Ok(())
    }

    pub async fn submit(&self, caller: &dyn AccessContext, id: Uuid) -> Result<AchievementStatus, AppError> {
        let reference = self.owned_reference(caller, id).await?;
        ensure(reference.status, Action::Submit)?;

        self.apply(id, Action::Submit, Transition::Submit { at: Utc::now() })
            .await
    }

    pub async fn verify(&self, caller: &dyn AccessContext, id: Uuid) -> Result<AchievementStatus, AppError> {
        self.lecturer_profile(caller).await?;
        let reference = self.reference(id).await?;
        ensure(reference.status, Action::Verify)?;

        let transition = Transition::Verify {
            by: caller.current_user_id(),
            at: Utc::now(),
        };
        self.apply(id, Action::Verify, transition).await
    }

    pub async fn reject(
        &self,
        caller: &dyn AccessContext,
        id: Uuid,
        note: &str,
    ) -> Result<AchievementStatus, AppError> {
        self.lecturer_profile(caller).await?;
        let note = note.trim();
        if note.is_empty() {
            return Err(AppError::bad_request("Rejection note is required"));
        }
        let reference = self.reference(id).await?;
        ensure(reference.status, Action::Reject)?;

        let transition = Transition::Reject {
            by: caller.current_user_id(),
            note: note.to_string(),
            at: Utc::now(),
        };
        self.apply(id, Action::Reject, transition).await
    }

    async fn apply(&self, id: Uuid, action: Action, transition: Transition) -> Result<AchievementStatus, AppError> {
        if !self.references.transition(id, &transition).await? {
            return Err(action.refused());
        }
        info!("Achievement {id} moved to {}", transition.to());
        Ok(transition.to())
    }

    pub async fn history(&self, caller: &dyn AccessContext, id: Uuid) -> Result<Vec<HistoryEntry>, AppError> {
        let reference = self.readable_reference(caller, id).await?;
        Ok(history::timeline(&reference))
    }

    /// Stores the payload, then appends its record to a draft the caller owns.
    pub async fn add_attachment(
        &self,
        caller: &dyn AccessContext,
        id: Uuid,
        upload: &FileUpload,
    ) -> Result<Attachment, AppError> {
        let reference = self.owned_reference(caller, id).await?;
        ensure(reference.status, Action::Attach)?;

        let url = self.uploads.put(upload).await?;
        let attachment = Attachment {
            file_name: upload.file_name.clone(),
            file_url: url,
            file_type: upload.file_type(),
            uploaded_at: Utc::now(),
        };

        // The status may have moved while the payload was being written.
        let still_draft = self.reference(id).await.map(|r| r.status == AchievementStatus::Draft);
        let appended = match still_draft {
            Ok(true) => self
                .documents
                .push_attachment(&reference.mongo_achievement_id, &attachment)
                .await
                .map_err(AppError::from),
            Ok(false) => Err(Action::Attach.refused()),
            Err(err) => Err(err),
        };

        if let Err(err) = appended {
            if let Err(cleanup) = self.uploads.remove(&attachment.file_url).await {
                warn!("Stored upload {} left behind: {cleanup}", attachment.file_url);
            }
            return Err(err);
        }

        info!("Attachment {} added to achievement {id}", attachment.file_name);
        Ok(attachment)
    }
}
