//! Resume persistence, consumed as an opaque store keyed by resume id and
//! owner id. The pipeline itself never touches storage; handlers fetch a
//! document, optimize it, and write it back.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::resume::ResumeDocument;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("resume not found")]
    NotFound,

    /// The resume exists but belongs to a different owner.
    #[error("access denied")]
    Forbidden,
}

/// A stored resume row.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub document: ResumeDocument,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn create(&self, owner_id: Uuid, document: ResumeDocument)
        -> Result<ResumeRecord, StoreError>;

    /// Owner-checked read: the owner id acts as the authorization check.
    async fn get(&self, id: Uuid, owner_id: Uuid) -> Result<ResumeRecord, StoreError>;

    async fn update_document(
        &self,
        id: Uuid,
        owner_id: Uuid,
        document: ResumeDocument,
    ) -> Result<ResumeRecord, StoreError>;
}

/// In-memory store. Suitable for local development and tests; the trait is
/// the seam where a database-backed implementation plugs in.
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<Uuid, ResumeRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResumeStore for InMemoryStore {
    async fn create(
        &self,
        owner_id: Uuid,
        document: ResumeDocument,
    ) -> Result<ResumeRecord, StoreError> {
        let now = Utc::now();
        let record = ResumeRecord {
            id: Uuid::new_v4(),
            owner_id,
            document,
            created_at: now,
            updated_at: now,
        };
        self.records
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid, owner_id: Uuid) -> Result<ResumeRecord, StoreError> {
        let records = self.records.read().await;
        let record = records.get(&id).ok_or(StoreError::NotFound)?;
        if record.owner_id != owner_id {
            return Err(StoreError::Forbidden);
        }
        Ok(record.clone())
    }

    async fn update_document(
        &self,
        id: Uuid,
        owner_id: Uuid,
        document: ResumeDocument,
    ) -> Result<ResumeRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records.get_mut(&id).ok_or(StoreError::NotFound)?;
        if record.owner_id != owner_id {
            return Err(StoreError::Forbidden);
        }
        record.document = document;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }
}
