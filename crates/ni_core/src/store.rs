use crate::types::ArticleRecord;
use crate::Result;
use async_trait::async_trait;

/// Read-side view of the article store. The pipeline never writes through
/// this trait; new records are proposed to the caller instead.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Find a record whose stored URL matches exactly
    async fn find_by_url(&self, url: &str) -> Result<Option<ArticleRecord>>;

    /// Find a record whose normalized URL matches exactly
    async fn find_by_normalized_url(&self, url: &str) -> Result<Option<ArticleRecord>>;

    /// All records created within the last `days` days, newest first
    async fn find_recent_within(&self, days: i64) -> Result<Vec<ArticleRecord>>;

    /// Find a record by its content fingerprint
    async fn find_by_content_hash(&self, hash: &str) -> Result<Option<ArticleRecord>>;
}

/// Key/value settings lookup backing provider credentials and feature flags.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
}
