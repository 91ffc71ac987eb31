use common::model::reference::{AchievementReference, AchievementStatus};
use common::model::views::{HistoryEntry, HistoryStage};

/// Rebuilds the timeline of an achievement from the stamps on its reference
/// row: creation, then submission, then the review outcome.
pub fn timeline(reference: &AchievementReference) -> Vec<HistoryEntry> {
    let mut entries = vec![HistoryEntry {
        status: HistoryStage::Created,
        timestamp: reference.created_at,
        note: None,
        by: None,
    }];

    if let Some(submitted_at) = reference.submitted_at {
        entries.push(HistoryEntry {
            status: HistoryStage::Submitted,
            timestamp: submitted_at,
            note: None,
            by: None,
        });
    }

    if let Some(reviewed_at) = reference.verified_at {
        let stage = match reference.status {
            AchievementStatus::Rejected => HistoryStage::Rejected,
            _ => HistoryStage::Verified,
        };
        entries.push(HistoryEntry {
            status: stage,
            timestamp: reviewed_at,
            note: reference.rejection_note.clone().filter(|n| !n.is_empty()),
            by: reference.verified_by,
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn draft() -> AchievementReference {
        let now = Utc::now();
        AchievementReference {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            mongo_achievement_id: "doc".into(),
            status: AchievementStatus::Draft,
            submitted_at: None,
            verified_at: None,
            verified_by: None,
            rejection_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn draft_has_only_creation() {
        let entries = timeline(&draft());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, HistoryStage::Created);
    }

    #[test]
    fn rejection_carries_note_and_reviewer() {
        let lecturer = Uuid::new_v4();
        let mut reference = draft();
        reference.status = AchievementStatus::Rejected;
        reference.submitted_at = Some(reference.created_at + Duration::minutes(5));
        reference.verified_at = Some(reference.created_at + Duration::hours(2));
        reference.verified_by = Some(lecturer);
        reference.rejection_note = Some("incomplete evidence".into());

        let entries = timeline(&reference);
        let stages: Vec<_> = entries.iter().map(|e| e.status).collect();
        assert_eq!(
            stages,
            vec![HistoryStage::Created, HistoryStage::Submitted, HistoryStage::Rejected]
        );
        assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(entries[2].note.as_deref(), Some("incomplete evidence"));
        assert_eq!(entries[2].by, Some(lecturer));
    }

    #[test]
    fn verification_has_no_note() {
        let mut reference = draft();
        reference.status = AchievementStatus::Verified;
        reference.submitted_at = Some(reference.created_at);
        reference.verified_at = Some(reference.created_at + Duration::hours(1));
        reference.verified_by = Some(Uuid::new_v4());

        let last = timeline(&reference).pop().unwrap();
        assert_eq!(last.status, HistoryStage::Verified);
        assert!(last.note.is_none());
    }
}
