//! In-memory article store and settings store.
//!
//! Used as the test collaborator for the pipeline and as a lightweight
//! backend for demos. Real deployments point the pipeline at their own
//! [`ArticleStore`] / [`SettingsStore`] implementations.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use ni_core::{ArticleRecord, ArticleStore, Result, SettingsStore};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Vec-backed article store behind an async RwLock.
#[derive(Default)]
pub struct MemoryStorage {
    records: RwLock<Vec<ArticleRecord>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, replacing any existing record with the same URL.
    pub async fn insert(&self, record: ArticleRecord) {
        let mut records = self.records.write().await;
        if let Some(existing) = records.iter_mut().find(|r| r.url == record.url) {
            *existing = record;
        } else {
            records.push(record);
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ArticleStore for MemoryStorage {
    async fn find_by_url(&self, url: &str) -> Result<Option<ArticleRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.url == url).cloned())
    }

    async fn find_by_normalized_url(&self, url: &str) -> Result<Option<ArticleRecord>> {
        // Stored URLs are already normalized, so this is a plain equality scan.
        self.find_by_url(url).await
    }

    async fn find_recent_within(&self, days: i64) -> Result<Vec<ArticleRecord>> {
        let cutoff = Utc::now() - Duration::days(days);
        let records = self.records.read().await;
        let mut recent: Vec<ArticleRecord> = records
            .iter()
            .filter(|r| r.created_at >= cutoff)
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(recent)
    }

    async fn find_by_content_hash(&self, hash: &str) -> Result<Option<ArticleRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.content_hash == hash).cloned())
    }
}

/// HashMap-backed settings store with builder-style seeding for tests.
#[derive(Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = self.values.into_inner();
        values.insert(key.into(), value.into());
        Self {
            values: RwLock::new(values),
        }
    }

    pub async fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut values = self.values.write().await;
        values.insert(key.into(), value.into());
    }

    pub async fn remove(&self, key: &str) {
        let mut values = self.values.write().await;
        values.remove(key);
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.read().await;
        Ok(values.get(key).cloned())
    }
}
