//! End-to-end per-article flow: duplicate check, then rewrite with failover.
//!
//! Each article moves through a small state machine: it is checked first, a
//! duplicate terminates early with the match info, otherwise the title and
//! body are rewritten against the same keyword set and the finished record is
//! handed back for the caller to persist. Rewrite exhaustion and store errors
//! surface as errors; an article is never dropped silently.

use ni_core::{IngestOutcome, ProcessedArticle, RawArticle, Result, RewriteKind};
use ni_dedup::{extract_keyword_profile, fingerprint, normalize_url, DuplicateDetector};
use ni_rewrite::FailoverOrchestrator;
use tracing::info;

pub struct IngestPipeline {
    detector: DuplicateDetector,
    orchestrator: FailoverOrchestrator,
}

impl IngestPipeline {
    pub fn new(detector: DuplicateDetector, orchestrator: FailoverOrchestrator) -> Self {
        Self {
            detector,
            orchestrator,
        }
    }

    /// Runs one article through the pipeline.
    pub async fn process(&self, article: &RawArticle) -> Result<IngestOutcome> {
        let check = self.detector.detect(article).await?;
        if check.is_duplicate {
            info!(
                url = %article.url,
                kind = ?check.kind,
                confidence = check.confidence,
                "skipping duplicate article"
            );
            return Ok(IngestOutcome::Duplicate(check));
        }

        // Title and body go through the orchestrator against the same
        // keyword set, extracted once from the raw content.
        let keywords = extract_keyword_profile(&article.content);
        let title = self
            .orchestrator
            .rewrite(RewriteKind::Title, &article.title, &keywords)
            .await?;
        let body = self
            .orchestrator
            .rewrite(RewriteKind::Body, &article.content, &keywords)
            .await?;

        info!(url = %article.url, provider = %body.provider, "article rewritten");
        Ok(IngestOutcome::Rewritten(ProcessedArticle {
            url: normalize_url(&article.url),
            title: title.content,
            content: body.content,
            // Hash of the original scraped content, so future duplicate
            // checks keep matching the source material.
            content_hash: fingerprint(&article.content),
            provider: body.provider,
            source_id: article.source_id.clone(),
        }))
    }

    /// Runs a batch of articles one at a time, returning per-article outcomes
    /// in input order. A failed article does not stop the rest.
    pub async fn process_batch(&self, articles: &[RawArticle]) -> Vec<Result<IngestOutcome>> {
        let mut outcomes = Vec::with_capacity(articles.len());
        for article in articles {
            outcomes.push(self.process(article).await);
        }
        outcomes
    }
}
