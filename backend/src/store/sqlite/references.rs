use async_trait::async_trait;
use chrono::Utc;
use common::model::reference::{AchievementReference, AchievementStatus};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use uuid::Uuid;

use super::{opt_uuid_at, status_at, time_at, uuid_at, SqliteStore};
use crate::store::{ReferenceFilter, ReferenceStore, StoreResult, Transition};

const COLUMNS: &str = "id, student_id, mongo_achievement_id, status, submitted_at, verified_at, \
                       verified_by, rejection_note, created_at, updated_at";

fn reference_from_row(row: &Row<'_>) -> rusqlite::Result<AchievementReference> {
    Ok(AchievementReference {
        id: uuid_at(row, 0)?,
        student_id: uuid_at(row, 1)?,
        mongo_achievement_id: row.get(2)?,
        status: status_at(row, 3)?,
        submitted_at: row.get(4)?,
        verified_at: row.get(5)?,
        verified_by: opt_uuid_at(row, 6)?,
        rejection_note: row.get(7)?,
        created_at: time_at(row, 8)?,
        updated_at: time_at(row, 9)?,
    })
}

#[async_trait]
impl ReferenceStore for SqliteStore {
    async fn create(&self, student_id: Uuid, document_id: &str) -> StoreResult<AchievementReference> {
        let now = Utc::now();
        let reference = AchievementReference {
            id: Uuid::new_v4(),
            student_id,
            mongo_achievement_id: document_id.to_string(),
            status: AchievementStatus::Draft,
            submitted_at: None,
            verified_at: None,
            verified_by: None,
            rejection_note: None,
            created_at: now,
            updated_at: now,
        };

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO achievement_references
                 (id, student_id, mongo_achievement_id, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                reference.id.to_string(),
                reference.student_id.to_string(),
                reference.mongo_achievement_id,
                reference.status.as_str(),
                reference.created_at,
                reference.updated_at,
            ],
        )?;

        Ok(reference)
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<AchievementReference>> {
        let conn = self.conn.lock().await;
        let reference = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM achievement_references WHERE id = ?1"),
                params![id.to_string()],
                reference_from_row,
            )
            .optional()?;
        Ok(reference)
    }

    async fn list(&self, filter: &ReferenceFilter) -> StoreResult<Vec<AchievementReference>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(students) = &filter.students {
            if students.is_empty() {
                return Ok(Vec::new());
            }
            let marks = vec!["?"; students.len()].join(", ");
            clauses.push(format!("student_id IN ({marks})"));
            values.extend(students.iter().map(Uuid::to_string));
        }
        if let Some(status) = filter.status {
            clauses.push("status = ?".to_string());
            values.push(status.as_str().to_string());
        }

        let mut sql = format!("SELECT {COLUMNS} FROM achievement_references");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, id");

        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&sql)?;
        let references = stmt
            .query_map(params_from_iter(values.iter()), reference_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(references)
    }

    async fn transition(&self, id: Uuid, transition: &Transition) -> StoreResult<bool> {
        let to = transition.to().as_str();
        let from = transition.from().as_str();
        let id = id.to_string();

        let conn = self.conn.lock().await;
        let changed = match transition {
            Transition::Submit { at } => conn.execute(
                "UPDATE achievement_references
                 SET status = ?1, submitted_at = ?2, updated_at = ?2
                 WHERE id = ?3 AND status = ?4",
                params![to, at, id, from],
            )?,
            Transition::Verify { by, at } => conn.execute(
                "UPDATE achievement_references
                 SET status = ?1, verified_at = ?2, verified_by = ?3, updated_at = ?2
                 WHERE id = ?4 AND status = ?5",
                params![to, at, by.to_string(), id, from],
            )?,
            Transition::Reject { by, note, at } => conn.execute(
                "UPDATE achievement_references
                 SET status = ?1, verified_at = ?2, verified_by = ?3, rejection_note = ?4, updated_at = ?2
                 WHERE id = ?5 AND status = ?6",
                params![to, at, by.to_string(), note, id, from],
            )?,
        };

        Ok(changed == 1)
    }

    async fn delete_draft(&self, id: Uuid) -> StoreResult<bool> {
        let conn = self.conn.lock().await;
        let removed = conn.execute(
            "DELETE FROM achievement_references WHERE id = ?1 AND status = ?2",
            params![id.to_string(), AchievementStatus::Draft.as_str()],
        )?;
        Ok(removed == 1)
    }
}
