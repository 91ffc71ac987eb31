//! MongoDB-backed achievement documents.
//!
//! Documents are stored in one collection with an `ObjectId` primary key; the
//! hex form of that id is what reference rows carry. Timestamps are stored as
//! native BSON dates.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime, Document};
use chrono::{DateTime, Utc};
use common::model::achievement::{
    Achievement, AchievementContent, AchievementDetails, AchievementType, Attachment,
};
use futures_util::TryStreamExt;
use log::info;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::{DocumentStore, StoreError, StoreResult};

const COLLECTION: &str = "achievements";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentRecord {
    file_name: String,
    file_url: String,
    file_type: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    uploaded_at: DateTime<Utc>,
}

impl From<&Attachment> for AttachmentRecord {
    fn from(a: &Attachment) -> Self {
        Self {
            file_name: a.file_name.clone(),
            file_url: a.file_url.clone(),
            file_type: a.file_type.clone(),
            uploaded_at: a.uploaded_at,
        }
    }
}

impl From<AttachmentRecord> for Attachment {
    fn from(a: AttachmentRecord) -> Self {
        Self {
            file_name: a.file_name,
            file_url: a.file_url,
            file_type: a.file_type,
            uploaded_at: a.uploaded_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AchievementRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    student_id: String,
    achievement_type: AchievementType,
    title: String,
    description: String,
    details: AchievementDetails,
    #[serde(default)]
    custom_fields: Map<String, Value>,
    #[serde(default)]
    attachments: Vec<AttachmentRecord>,
    #[serde(default)]
    tags: Vec<String>,
    points: u32,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    updated_at: DateTime<Utc>,
}

impl AchievementRecord {
    fn new(student_id: &str, content: &AchievementContent, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            student_id: student_id.to_string(),
            achievement_type: content.achievement_type,
            title: content.title.clone(),
            description: content.description.clone(),
            details: content.details.clone(),
            custom_fields: content.custom_fields.clone(),
            attachments: Vec::new(),
            tags: content.tags.clone(),
            points: content.points,
            created_at: now,
            updated_at: now,
        }
    }

    fn into_achievement(self) -> StoreResult<Achievement> {
        let id = self
            .id
            .ok_or_else(|| StoreError::Corrupt("achievement document without _id".into()))?;
        Ok(Achievement {
            id: id.to_hex(),
            student_id: self.student_id,
            content: AchievementContent {
                achievement_type: self.achievement_type,
                title: self.title,
                description: self.description,
                details: self.details,
                custom_fields: self.custom_fields,
                tags: self.tags,
                points: self.points,
            },
            attachments: self.attachments.into_iter().map(Attachment::from).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// `$set` for a content replacement. Keys must match the record's serde names.
fn content_update(content: &AchievementContent, now: DateTime<Utc>) -> StoreResult<Document> {
    Ok(doc! {
        "$set": {
            "achievementType": bson::to_bson(&content.achievement_type)?,
            "title": content.title.clone(),
            "description": content.description.clone(),
            "details": bson::to_bson(&content.details)?,
            "customFields": bson::to_bson(&content.custom_fields)?,
            "tags": content.tags.clone(),
            "points": i64::from(content.points),
            "updatedAt": bson::DateTime::from_chrono(now),
        }
    })
}

fn attachment_push(attachment: &Attachment, now: DateTime<Utc>) -> StoreResult<Document> {
    let record = bson::to_bson(&AttachmentRecord::from(attachment))?;
    Ok(doc! {
        "$push": { "attachments": record },
        "$set": { "updatedAt": bson::DateTime::from_chrono(now) },
    })
}

fn object_id(id: &str) -> StoreResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| StoreError::NotFound("achievement document"))
}

#[derive(Clone)]
pub struct MongoDocuments {
    collection: Collection<AchievementRecord>,
}

impl MongoDocuments {
    /// Connects and pings the database so a bad URI fails at startup.
    pub async fn connect(uri: &str, db_name: &str) -> StoreResult<Self> {
        info!("Connecting to MongoDB database '{db_name}'");
        let client = Client::with_uri_str(uri).await?;
        let database = client.database(db_name);
        database.run_command(doc! { "ping": 1 }).await?;
        info!("Connected to MongoDB database '{db_name}'");

        Ok(Self {
            collection: database.collection(COLLECTION),
        })
    }
}

#[async_trait]
impl DocumentStore for MongoDocuments {
    async fn insert(&self, student_id: &str, content: &AchievementContent) -> StoreResult<String> {
        let record = AchievementRecord::new(student_id, content, Utc::now());
        let result = self.collection.insert_one(record).await?;
        result
            .inserted_id
            .as_object_id()
            .map(|oid| oid.to_hex())
            .ok_or_else(|| StoreError::Corrupt("insert returned a non-ObjectId key".into()))
    }

    async fn find(&self, id: &str) -> StoreResult<Option<Achievement>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        match self.collection.find_one(doc! { "_id": oid }).await? {
            Some(record) => Ok(Some(record.into_achievement()?)),
            None => Ok(None),
        }
    }

    async fn find_many(&self, ids: &[String]) -> StoreResult<Vec<Achievement>> {
        let oids: Vec<ObjectId> = ids.iter().filter_map(|id| ObjectId::parse_str(id).ok()).collect();
        if oids.is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<AchievementRecord> = self
            .collection
            .find(doc! { "_id": { "$in": oids } })
            .await?
            .try_collect()
            .await?;

        records.into_iter().map(AchievementRecord::into_achievement).collect()
    }

    async fn replace_content(&self, id: &str, content: &AchievementContent) -> StoreResult<()> {
        let oid = object_id(id)?;
        let update = content_update(content, Utc::now())?;

        let result = self.collection.update_one(doc! { "_id": oid }, update).await?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound("achievement document"));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let oid = object_id(id)?;
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        if result.deleted_count == 0 {
            return Err(StoreError::NotFound("achievement document"));
        }
        Ok(())
    }

    async fn push_attachment(&self, id: &str, attachment: &Attachment) -> StoreResult<()> {
        let oid = object_id(id)?;
        let update = attachment_push(attachment, Utc::now())?;

        let result = self.collection.update_one(doc! { "_id": oid }, update).await?;
        if result.matched_count == 0 {
            return Err(StoreError::NotFound("achievement document"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::Bson;
    use chrono::TimeZone;
    use serde_json::json;

    // BSON dates keep milliseconds only, so fixtures use whole seconds.
    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    fn contest() -> AchievementContent {
        let mut custom_fields = Map::new();
        custom_fields.insert("team".into(), json!("Kodok"));
        AchievementContent {
            achievement_type: AchievementType::Competition,
            title: "National Programming Contest".into(),
            description: "Team finals".into(),
            details: AchievementDetails {
                competition_name: Some("NPC".into()),
                rank: Some(2),
                ..Default::default()
            },
            custom_fields,
            tags: vec!["programming".into()],
            points: 40,
        }
    }

    fn certificate() -> Attachment {
        Attachment {
            file_name: "certificate.pdf".into(),
            file_url: "/uploads/abc.pdf".into(),
            file_type: "application/pdf".into(),
            uploaded_at: at(9),
        }
    }

    #[test]
    fn records_round_trip_through_bson() {
        let oid = ObjectId::new();
        let mut record = AchievementRecord::new("student-1", &contest(), at(8));
        record.id = Some(oid);
        record.attachments.push(AttachmentRecord::from(&certificate()));

        let stored = bson::to_document(&record).unwrap();
        assert_eq!(stored.get_object_id("_id").unwrap(), oid);
        assert!(matches!(stored.get("createdAt"), Some(Bson::DateTime(_))));

        let restored: AchievementRecord = bson::from_document(stored).unwrap();
        let achievement = restored.into_achievement().unwrap();
        assert_eq!(achievement.id, oid.to_hex());
        assert_eq!(achievement.student_id, "student-1");
        assert_eq!(achievement.content, contest());
        assert_eq!(achievement.attachments, vec![certificate()]);
        assert_eq!(achievement.created_at, at(8));
    }

    #[test]
    fn records_without_an_id_are_corrupt() {
        let record = AchievementRecord::new("student-1", &contest(), at(8));
        assert!(matches!(record.into_achievement(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn content_update_only_sets_existing_fields() {
        let record = bson::to_document(&AchievementRecord::new("student-1", &contest(), at(8))).unwrap();
        let update = content_update(&contest(), at(10)).unwrap();
        let set = update.get_document("$set").unwrap();

        for key in set.keys() {
            assert!(record.contains_key(key), "$set writes unknown field {key}");
        }
        for key in ["achievementType", "title", "details", "customFields", "tags", "points"] {
            assert!(set.contains_key(key), "$set misses {key}");
        }
        assert_eq!(set.get_str("achievementType").unwrap(), "competition");
        assert_eq!(
            set.get_document("details").unwrap().get_str("competitionName").unwrap(),
            "NPC"
        );
    }

    #[test]
    fn attachment_push_matches_the_record_shape() {
        let update = attachment_push(&certificate(), at(10)).unwrap();
        let pushed = update
            .get_document("$push")
            .unwrap()
            .get_document("attachments")
            .unwrap()
            .clone();

        let expected = bson::to_document(&AttachmentRecord::from(&certificate())).unwrap();
        let mut keys: Vec<&String> = pushed.keys().collect();
        keys.sort();
        let mut expected_keys: Vec<&String> = expected.keys().collect();
        expected_keys.sort();
        assert_eq!(keys, expected_keys);
        assert!(matches!(pushed.get("uploadedAt"), Some(Bson::DateTime(_))));

        let restored: AttachmentRecord = bson::from_document(pushed).unwrap();
        assert_eq!(Attachment::from(restored), certificate());

        let set = update.get_document("$set").unwrap();
        assert!(set.contains_key("updatedAt"));
    }
}
