//! Multi-strategy duplicate detection against the article store.
//!
//! Strategies run in a fixed order (URL, title, content hash, content
//! similarity) and the first positive match wins. The detector only ever
//! reads from the store.

use crate::canonical::{fingerprint, normalize_url};
use crate::similarity::{char_similarity, extract_keyword_profile, profile_similarity};
use futures::future::join_all;
use ni_core::{ArticleStore, DuplicateCheckResult, DuplicateKind, Error, RawArticle, Result};
use std::sync::Arc;
use tracing::debug;

/// Title similarity threshold for articles from unrelated sources.
pub const TITLE_THRESHOLD: f64 = 0.85;
/// Relaxed title threshold when both articles come from the same source.
/// Same-source near-duplicates are more likely, so they are caught more
/// aggressively. The relaxation applies to titles only.
pub const SAME_SOURCE_TITLE_THRESHOLD: f64 = 0.75;
/// Keyword-profile similarity threshold for body comparison.
pub const CONTENT_THRESHOLD: f64 = 0.80;
/// Title comparison looks at records created within this many days.
pub const TITLE_WINDOW_DAYS: i64 = 7;
/// Content comparison looks at records created within this many days.
pub const CONTENT_WINDOW_DAYS: i64 = 3;
/// Content comparison scans at most this many recent records.
pub const CONTENT_SCAN_LIMIT: usize = 100;
/// Batch detection runs this many concurrent lookups per group.
pub const BATCH_CONCURRENCY: usize = 5;

pub struct DuplicateDetector {
    store: Arc<dyn ArticleStore>,
}

impl DuplicateDetector {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    /// Runs all strategies against the store and returns the first positive
    /// match. Blank titles or bodies are rejected up front rather than being
    /// allowed to mis-score.
    pub async fn detect(&self, article: &RawArticle) -> Result<DuplicateCheckResult> {
        if article.title.trim().is_empty() {
            return Err(Error::InvalidInput("article title is empty".to_string()));
        }
        if article.content.trim().is_empty() {
            return Err(Error::InvalidInput("article content is empty".to_string()));
        }

        if let Some(result) = self.check_url(article).await? {
            return Ok(result);
        }
        if let Some(result) = self.check_title(article).await? {
            return Ok(result);
        }
        if let Some(result) = self.check_hash(article).await? {
            return Ok(result);
        }
        if let Some(result) = self.check_content(article).await? {
            return Ok(result);
        }

        debug!(url = %article.url, "no duplicate found");
        Ok(DuplicateCheckResult::unique())
    }

    /// Checks a batch of articles in groups of [`BATCH_CONCURRENCY`]
    /// concurrent lookups. Results come back in input order regardless of
    /// completion order inside a group.
    pub async fn detect_batch(&self, articles: &[RawArticle]) -> Result<Vec<DuplicateCheckResult>> {
        let mut results = Vec::with_capacity(articles.len());
        for group in articles.chunks(BATCH_CONCURRENCY) {
            let checks = join_all(group.iter().map(|article| self.detect(article))).await;
            for check in checks {
                results.push(check?);
            }
        }
        Ok(results)
    }

    async fn check_url(&self, article: &RawArticle) -> Result<Option<DuplicateCheckResult>> {
        if let Some(record) = self.store.find_by_url(&article.url).await? {
            debug!(url = %article.url, matched = %record.id, "exact URL match");
            return Ok(Some(DuplicateCheckResult::duplicate(
                DuplicateKind::Url,
                1.0,
                &record,
                "exact URL match",
            )));
        }

        let normalized = normalize_url(&article.url);
        if let Some(record) = self.store.find_by_normalized_url(&normalized).await? {
            debug!(url = %normalized, matched = %record.id, "normalized URL match");
            return Ok(Some(DuplicateCheckResult::duplicate(
                DuplicateKind::Url,
                1.0,
                &record,
                "normalized URL match",
            )));
        }

        Ok(None)
    }

    async fn check_title(&self, article: &RawArticle) -> Result<Option<DuplicateCheckResult>> {
        let recent = self.store.find_recent_within(TITLE_WINDOW_DAYS).await?;
        for record in &recent {
            if record.title.trim().is_empty() {
                continue;
            }
            let threshold = match (&article.source_id, &record.source_id) {
                (Some(a), Some(b)) if a == b => SAME_SOURCE_TITLE_THRESHOLD,
                _ => TITLE_THRESHOLD,
            };
            let score = char_similarity(&article.title, &record.title);
            if score >= threshold {
                debug!(matched = %record.id, score, threshold, "title similarity match");
                return Ok(Some(DuplicateCheckResult::duplicate(
                    DuplicateKind::Title,
                    score,
                    record,
                    format!("title similarity {score:.2} within {TITLE_WINDOW_DAYS} days"),
                )));
            }
        }
        Ok(None)
    }

    async fn check_hash(&self, article: &RawArticle) -> Result<Option<DuplicateCheckResult>> {
        let hash = fingerprint(&article.content);
        if let Some(record) = self.store.find_by_content_hash(&hash).await? {
            debug!(matched = %record.id, "content hash match");
            return Ok(Some(DuplicateCheckResult::duplicate(
                DuplicateKind::Hash,
                1.0,
                &record,
                "content hash match",
            )));
        }
        Ok(None)
    }

    async fn check_content(&self, article: &RawArticle) -> Result<Option<DuplicateCheckResult>> {
        let recent = self.store.find_recent_within(CONTENT_WINDOW_DAYS).await?;
        let profile = extract_keyword_profile(&article.content);
        for record in recent.iter().take(CONTENT_SCAN_LIMIT) {
            if record.content.trim().is_empty() {
                continue;
            }
            let candidate = extract_keyword_profile(&record.content);
            let score = profile_similarity(&profile, &candidate);
            if score >= CONTENT_THRESHOLD {
                debug!(matched = %record.id, score, "keyword profile match");
                return Ok(Some(DuplicateCheckResult::duplicate(
                    DuplicateKind::Content,
                    score,
                    record,
                    format!("keyword profile similarity {score:.2} within {CONTENT_WINDOW_DAYS} days"),
                )));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::{fingerprint, normalize_url};
    use chrono::{Duration, Utc};
    use ni_core::ArticleRecord;
    use ni_storage::MemoryStorage;

    fn record(url: &str, title: &str, content: &str, source_id: Option<&str>) -> ArticleRecord {
        ArticleRecord::new(
            normalize_url(url),
            title,
            content,
            fingerprint(content),
            source_id.map(str::to_string),
        )
    }

    async fn detector_with(records: Vec<ArticleRecord>) -> DuplicateDetector {
        let storage = MemoryStorage::new();
        for r in records {
            storage.insert(r).await;
        }
        DuplicateDetector::new(Arc::new(storage))
    }

    #[tokio::test]
    async fn test_url_match_ignores_query_string() {
        let detector = detector_with(vec![record(
            "https://x.com/a?ref=1",
            "Stored title",
            "Stored body content about something",
            None,
        )])
        .await;

        let article = RawArticle::new(
            "https://x.com/a?ref=2",
            "Completely different title",
            "Completely different body text here",
        );
        let result = detector.detect(&article).await.unwrap();
        assert!(result.is_duplicate);
        assert_eq!(result.kind, Some(DuplicateKind::Url));
        assert_eq!(result.confidence, 1.0);
    }

    #[tokio::test]
    async fn test_hash_match_catches_identical_content() {
        let body = "The exact same body text, shared verbatim between two scrapes.";
        let detector = detector_with(vec![record(
            "https://site-one.com/original",
            "Mnbvcxz",
            body,
            None,
        )])
        .await;

        let article = RawArticle::new("https://site-two.com/copy", "Qwerty dupl", body);
        let result = detector.detect(&article).await.unwrap();
        assert!(result.is_duplicate);
        assert_eq!(result.kind, Some(DuplicateKind::Hash));
        assert_eq!(result.confidence, 1.0);
    }

    #[tokio::test]
    async fn test_cjk_title_one_character_apart_is_flagged() {
        let detector = detector_with(vec![record(
            "https://cars.example.com/1",
            "汽車冷媒系統檢查與保養",
            "冷媒系統壓力檢測與更換流程完整說明",
            None,
        )])
        .await;

        let article = RawArticle::new(
            "https://cars.example.com/2",
            "汽車冷媒系統檢查保養",
            "全新內容主題完全無關引擎機油更換知識",
        );
        let result = detector.detect(&article).await.unwrap();
        assert!(result.is_duplicate);
        assert_eq!(result.kind, Some(DuplicateKind::Title));
        assert!(result.confidence > 0.85);
    }

    #[tokio::test]
    async fn test_same_source_gets_relaxed_title_threshold() {
        // Char-set similarity of these two titles is 8/10 = 0.80: below the
        // base 0.85 threshold, above the same-source 0.75 threshold.
        let stored_title = "abcdefghij";
        let incoming_title = "abcdefgh";
        assert_eq!(char_similarity(incoming_title, stored_title), 0.8);

        let stored = record(
            "https://feed.example.com/1",
            stored_title,
            "stored body keywords alpha bravo charlie",
            Some("feed-7"),
        );

        let same_source = detector_with(vec![stored.clone()]).await;
        let article = RawArticle::new(
            "https://feed.example.com/2",
            incoming_title,
            "incoming body keywords delta echo foxtrot",
        )
        .with_source("feed-7");
        let result = same_source.detect(&article).await.unwrap();
        assert!(result.is_duplicate);
        assert_eq!(result.kind, Some(DuplicateKind::Title));

        let other_source = detector_with(vec![stored]).await;
        let article = RawArticle::new(
            "https://feed.example.com/2",
            incoming_title,
            "incoming body keywords delta echo foxtrot",
        )
        .with_source("feed-8");
        let result = other_source.detect(&article).await.unwrap();
        assert!(!result.is_duplicate);
    }

    #[tokio::test]
    async fn test_keyword_profile_match_catches_reordered_body() {
        let detector = detector_with(vec![record(
            "https://news.example.com/a",
            "Zxcvbnm asdf",
            "tokio runtime scheduler performance tuning guide",
            None,
        )])
        .await;

        // Same keyword set, different ordering and punctuation: the hash
        // differs but the profile matches.
        let article = RawArticle::new(
            "https://news.example.com/b",
            "Qwertyuiop",
            "guide: performance tuning, scheduler runtime (tokio)",
        );
        let result = detector.detect(&article).await.unwrap();
        assert!(result.is_duplicate);
        assert_eq!(result.kind, Some(DuplicateKind::Content));
        assert!(result.confidence >= 0.80);
    }

    #[tokio::test]
    async fn test_records_outside_window_are_ignored() {
        let mut stale = record(
            "https://old.example.com/1",
            "汽車冷媒系統檢查與保養",
            "冷媒系統壓力檢測與更換流程完整說明",
            None,
        );
        stale.created_at = Utc::now() - Duration::days(8);
        let detector = detector_with(vec![stale]).await;

        let article = RawArticle::new(
            "https://old.example.com/2",
            "汽車冷媒系統檢查保養",
            "完全不同的新內容講述輪胎更換注意事項",
        );
        let result = detector.detect(&article).await.unwrap();
        assert!(!result.is_duplicate);
        assert_eq!(result.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_batch_results_keep_input_order() {
        let body = "Shared body text used to trigger a hash match in the batch.";
        let detector = detector_with(vec![record(
            "https://batch.example.com/stored",
            "Mnbvcx stored",
            body,
            None,
        )])
        .await;

        let items = vec![
            RawArticle::new("https://batch.example.com/1", "Qazwsx one", body),
            RawArticle::new(
                "https://batch.example.com/2",
                "Edcrfv two",
                "novel content that matches nothing else at all",
            ),
            RawArticle::new("https://batch.example.com/3", "Tgbyhn three", body),
        ];
        let results = detector.detect_batch(&items).await.unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_duplicate);
        assert!(!results[1].is_duplicate);
        assert!(results[2].is_duplicate);
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected() {
        let detector = detector_with(vec![]).await;
        let article = RawArticle::new("https://x.com/a", "  ", "some body");
        let err = detector.detect(&article).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let article = RawArticle::new("https://x.com/a", "A title", "");
        let err = detector.detect(&article).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
