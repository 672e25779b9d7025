//! Persistent key-value store for the session: resume, job list and rankings.
//!
//! The matching pipeline only sees `SessionStore`; the backing `KvStore` is
//! Redis in deployments and an in-process map otherwise.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::models::job::{JobPosting, MatchResult};
use crate::models::resume::ResumeProfile;

pub mod memory;
pub mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

pub const RESUME_KEY: &str = "resumeData";
pub const JOBS_KEY: &str = "jobListings";
pub const REVEALED_RANKINGS_KEY: &str = "jobRankings";
pub const ALL_RANKINGS_KEY: &str = "allJobRankings";
pub const DISPLAY_INDEX_KEY: &str = "currentDisplayIndex";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Minimal get/set collaborator. Values are JSON strings.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Everything needed to rebuild a session after a restart.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PersistedSession {
    pub resume: Option<ResumeProfile>,
    pub jobs: Vec<JobPosting>,
    pub snapshot: Vec<MatchResult>,
    pub display_cursor: usize,
}

/// Typed access to the session keys.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KvStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    pub async fn load(&self) -> Result<PersistedSession, StoreError> {
        Ok(PersistedSession {
            resume: self.get_json(RESUME_KEY).await?,
            jobs: self.get_json(JOBS_KEY).await?.unwrap_or_default(),
            snapshot: self.get_json(ALL_RANKINGS_KEY).await?.unwrap_or_default(),
            display_cursor: self.get_json(DISPLAY_INDEX_KEY).await?.unwrap_or_default(),
        })
    }

    pub async fn save_resume(&self, resume: Option<&ResumeProfile>) -> Result<(), StoreError> {
        match resume {
            Some(profile) => self.set_json(RESUME_KEY, profile).await,
            None => self.kv.delete(RESUME_KEY).await,
        }
    }

    pub async fn save_jobs(&self, jobs: &[JobPosting]) -> Result<(), StoreError> {
        self.set_json(JOBS_KEY, jobs).await
    }

    /// Writes the full snapshot, the revealed prefix and the cursor.
    pub async fn save_rankings(
        &self,
        snapshot: &[MatchResult],
        display_cursor: usize,
    ) -> Result<(), StoreError> {
        let cursor = display_cursor.min(snapshot.len());
        self.set_json(ALL_RANKINGS_KEY, snapshot).await?;
        self.set_json(REVEALED_RANKINGS_KEY, &snapshot[..cursor]).await?;
        self.set_json(DISPLAY_INDEX_KEY, &cursor).await
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.kv.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.kv.set(key, serde_json::to_string(value)?).await
    }
}
