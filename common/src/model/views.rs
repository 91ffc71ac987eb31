//! Output shapes that merge a reference row with its document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::achievement::{Achievement, AchievementType};
use crate::model::reference::AchievementStatus;

/// One entry of an achievement list, keyed by the relational id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementSummary {
    pub id: Uuid,
    pub student_id: Uuid,
    pub status: AchievementStatus,
    pub title: String,
    #[serde(rename = "type")]
    pub achievement_type: AchievementType,
    pub points: u32,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Full view of one achievement: lifecycle fields plus the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementDetail {
    pub id: Uuid,
    pub student_id: Uuid,
    pub status: AchievementStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<Uuid>,
    pub rejection_note: Option<String>,
    pub details: Achievement,
    pub created_at: DateTime<Utc>,
}

/// Stage reached on the timeline. `Created` is synthetic; the others mirror
/// the status values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStage {
    Created,
    Submitted,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub status: HistoryStage,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<Uuid>,
}

/// Response to a successful creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Created {
    pub message: String,
    pub id: Uuid,
    pub status: AchievementStatus,
}
