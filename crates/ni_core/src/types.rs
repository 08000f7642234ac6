use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A freshly scraped article as handed over by the scraper, before any
/// duplicate checking or rewriting has happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArticle {
    pub url: String,
    pub title: String,
    pub content: String,
    pub source_id: Option<String>,
}

impl RawArticle {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            content: content.into(),
            source_id: None,
        }
    }

    pub fn with_source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }
}

/// A persisted article as stored by the article store. The pipeline only ever
/// reads these for comparison; writing new records is the caller's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: String,
    pub url: String,
    pub title: String,
    pub content: String,
    pub content_hash: String,
    pub source_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ArticleRecord {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        content_hash: impl Into<String>,
        source_id: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url: url.into(),
            title: title.into(),
            content: content.into(),
            content_hash: content_hash.into(),
            source_id,
            created_at: Utc::now(),
        }
    }
}

/// Which strategy flagged an article as a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateKind {
    Url,
    Title,
    Hash,
    Content,
}

impl DuplicateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateKind::Url => "url",
            DuplicateKind::Title => "title",
            DuplicateKind::Hash => "hash",
            DuplicateKind::Content => "content",
        }
    }
}

impl fmt::Display for DuplicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single duplicate check. Created once per check and never
/// mutated afterwards. A positive result always carries a kind and a
/// confidence above zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateCheckResult {
    pub is_duplicate: bool,
    pub confidence: f64,
    pub kind: Option<DuplicateKind>,
    pub matched_id: Option<String>,
    pub matched_title: Option<String>,
    pub reason: Option<String>,
}

impl DuplicateCheckResult {
    /// No duplicate found.
    pub fn unique() -> Self {
        Self {
            is_duplicate: false,
            confidence: 0.0,
            kind: None,
            matched_id: None,
            matched_title: None,
            reason: None,
        }
    }

    /// A positive match against `record`. Confidence must be above zero.
    pub fn duplicate(
        kind: DuplicateKind,
        confidence: f64,
        record: &ArticleRecord,
        reason: impl Into<String>,
    ) -> Self {
        debug_assert!(confidence > 0.0);
        Self {
            is_duplicate: true,
            confidence: confidence.clamp(0.0, 1.0),
            kind: Some(kind),
            matched_id: Some(record.id.clone()),
            matched_title: Some(record.title.clone()),
            reason: Some(reason.into()),
        }
    }
}

/// Whether a rewrite call targets the title or the body of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteKind {
    Title,
    Body,
}

impl fmt::Display for RewriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteKind::Title => f.write_str("title"),
            RewriteKind::Body => f.write_str("body"),
        }
    }
}

/// A successful rewrite, naming the provider that produced it and how many
/// attempts the failover loop needed to get there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteOutcome {
    pub content: String,
    pub provider: String,
    pub attempts: u32,
}

/// The finished article the pipeline hands back for persistence. The content
/// hash is computed over the original scraped content, not the rewritten one,
/// so future duplicate checks keep matching the source material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedArticle {
    pub url: String,
    pub title: String,
    pub content: String,
    pub content_hash: String,
    pub provider: String,
    pub source_id: Option<String>,
}

/// Terminal outcome of running one article through the pipeline.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// The article duplicates a stored record; nothing was written.
    Duplicate(DuplicateCheckResult),
    /// The article is novel and was rewritten; the caller persists it.
    Rewritten(ProcessedArticle),
}
