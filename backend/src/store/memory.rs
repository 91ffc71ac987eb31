//! In-process document store.
//!
//! Used when no MongoDB URI is configured and by the test suites. Documents
//! are lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::model::achievement::{Achievement, AchievementContent, Attachment};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{DocumentStore, StoreError, StoreResult};

#[derive(Clone, Default)]
pub struct MemoryDocuments {
    documents: Arc<RwLock<HashMap<String, Achievement>>>,
}

impl MemoryDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocuments {
    async fn insert(&self, student_id: &str, content: &AchievementContent) -> StoreResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let document = Achievement {
            id: id.clone(),
            student_id: student_id.to_string(),
            content: content.clone(),
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.documents.write().await.insert(id.clone(), document);
        Ok(id)
    }

    async fn find(&self, id: &str) -> StoreResult<Option<Achievement>> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn find_many(&self, ids: &[String]) -> StoreResult<Vec<Achievement>> {
        let documents = self.documents.read().await;
        Ok(ids.iter().filter_map(|id| documents.get(id).cloned()).collect())
    }

    async fn replace_content(&self, id: &str, content: &AchievementContent) -> StoreResult<()> {
        let mut documents = self.documents.write().await;
        let document = documents.get_mut(id).ok_or(StoreError::NotFound("achievement document"))?;
        document.content = content.clone();
        document.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.documents
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("achievement document"))
    }

    async fn push_attachment(&self, id: &str, attachment: &Attachment) -> StoreResult<()> {
        let mut documents = self.documents.write().await;
        let document = documents.get_mut(id).ok_or(StoreError::NotFound("achievement document"))?;
        document.attachments.push(attachment.clone());
        document.updated_at = Utc::now();
        Ok(())
    }
}
