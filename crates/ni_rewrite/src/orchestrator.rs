//! Failover across rewrite providers.
//!
//! Attempts are strictly sequential in priority order, so a successful free
//! provider always wins before any quota is spent on a fallback. Each failed
//! provider is excluded for the remainder of the call; the registry's health
//! counters decide whether it stays out of rotation across calls.

use crate::registry::ProviderRegistry;
use ni_core::{Error, Result, RewriteKind, RewriteOutcome, SettingsStore};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

/// Settings keys read by [`OrchestratorConfig::from_settings`].
const AUTO_FALLBACK_KEY: &str = "auto_fallback_enabled";
const TIMEOUT_SECS_KEY: &str = "rewrite_timeout_secs";
const RETRY_DELAY_MS_KEY: &str = "rewrite_retry_delay_ms";

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// When false, only the preferred provider is tried.
    pub auto_fallback: bool,
    /// Deadline for a single provider attempt, so a hung capability cannot
    /// stall the pipeline.
    pub attempt_timeout: Duration,
    /// Pause between attempts when another candidate remains.
    pub retry_delay: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            auto_fallback: true,
            attempt_timeout: Duration::from_secs(30),
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl OrchestratorConfig {
    /// Loads the config from the settings store, falling back to defaults
    /// for anything unset or unparsable.
    pub async fn from_settings(settings: &dyn SettingsStore) -> Result<Self> {
        let mut config = Self::default();
        if let Some(value) = settings.get(AUTO_FALLBACK_KEY).await? {
            config.auto_fallback = matches!(value.trim(), "true" | "1" | "yes");
        }
        if let Some(value) = settings.get(TIMEOUT_SECS_KEY).await? {
            if let Ok(secs) = value.trim().parse::<u64>() {
                config.attempt_timeout = Duration::from_secs(secs);
            }
        }
        if let Some(value) = settings.get(RETRY_DELAY_MS_KEY).await? {
            if let Ok(ms) = value.trim().parse::<u64>() {
                config.retry_delay = Duration::from_millis(ms);
            }
        }
        Ok(config)
    }
}

pub struct FailoverOrchestrator {
    registry: Arc<ProviderRegistry>,
    config: OrchestratorConfig,
}

impl FailoverOrchestrator {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_config(registry: Arc<ProviderRegistry>, config: OrchestratorConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Rewrites `text` through the first provider that succeeds. The loop is
    /// bounded by the number of enabled providers; exhaustion surfaces the
    /// most recent underlying error.
    pub async fn rewrite(
        &self,
        kind: RewriteKind,
        text: &str,
        keywords: &[String],
    ) -> Result<RewriteOutcome> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput(format!("{kind} text is empty")));
        }

        let mut excluding: HashSet<String> = HashSet::new();
        let mut attempts: u32 = 0;
        let mut last_error = "no rewrite providers configured".to_string();

        while let Some(entry) = self.registry.next(&excluding) {
            attempts += 1;
            let name = entry.name;

            let attempt = async {
                match kind {
                    RewriteKind::Title => entry.capability.rewrite_title(text, keywords).await,
                    RewriteKind::Body => entry.capability.rewrite_body(text, keywords).await,
                }
            };
            let result = match timeout(self.config.attempt_timeout, attempt).await {
                Ok(result) => result,
                Err(_) => Err(Error::Provider {
                    name: name.to_string(),
                    message: format!("timed out after {:?}", self.config.attempt_timeout),
                }),
            };

            match result {
                Ok(content) => {
                    self.registry.record_success(name);
                    info!(provider = name, %kind, attempts, "rewrite succeeded");
                    return Ok(RewriteOutcome {
                        content,
                        provider: name.to_string(),
                        attempts,
                    });
                }
                Err(err) => {
                    warn!(provider = name, %kind, error = %err, "rewrite attempt failed");
                    self.registry.record_failure(name, &err);
                    last_error = err.to_string();
                    excluding.insert(name.to_string());
                    if !self.config.auto_fallback {
                        break;
                    }
                    if self.registry.next(&excluding).is_some() {
                        sleep(self.config.retry_delay).await;
                    }
                }
            }
        }

        Err(Error::ProvidersExhausted {
            attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ProviderEntry;
    use async_trait::async_trait;
    use ni_core::RewriteCapability;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config() -> OrchestratorConfig {
        OrchestratorConfig {
            auto_fallback: true,
            attempt_timeout: Duration::from_millis(200),
            retry_delay: Duration::ZERO,
        }
    }

    #[derive(Debug)]
    struct StaticCapability {
        name: &'static str,
        reply: &'static str,
    }

    #[async_trait]
    impl RewriteCapability for StaticCapability {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn rewrite_title(&self, _title: &str, _keywords: &[String]) -> Result<String> {
            Ok(self.reply.to_string())
        }

        async fn rewrite_body(&self, _content: &str, _keywords: &[String]) -> Result<String> {
            Ok(self.reply.to_string())
        }
    }

    #[derive(Debug)]
    struct FailingCapability {
        name: &'static str,
        message: &'static str,
        calls: AtomicU32,
    }

    impl FailingCapability {
        fn new(name: &'static str, message: &'static str) -> Self {
            Self {
                name,
                message,
                calls: AtomicU32::new(0),
            }
        }

        fn fail(&self) -> Error {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Error::Provider {
                name: self.name.to_string(),
                message: self.message.to_string(),
            }
        }
    }

    #[async_trait]
    impl RewriteCapability for FailingCapability {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn rewrite_title(&self, _title: &str, _keywords: &[String]) -> Result<String> {
            Err(self.fail())
        }

        async fn rewrite_body(&self, _content: &str, _keywords: &[String]) -> Result<String> {
            Err(self.fail())
        }
    }

    #[derive(Debug)]
    struct SlowCapability;

    #[async_trait]
    impl RewriteCapability for SlowCapability {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn rewrite_title(&self, title: &str, _keywords: &[String]) -> Result<String> {
            sleep(Duration::from_secs(60)).await;
            Ok(title.to_string())
        }

        async fn rewrite_body(&self, content: &str, _keywords: &[String]) -> Result<String> {
            sleep(Duration::from_secs(60)).await;
            Ok(content.to_string())
        }
    }

    fn keywords() -> Vec<String> {
        vec!["rust".to_string()]
    }

    #[tokio::test]
    async fn test_quota_failure_on_preferred_provider_fails_over_in_order() {
        let registry = Arc::new(ProviderRegistry::from_entries(vec![
            ProviderEntry::new(
                Arc::new(FailingCapability::new("primary", "daily quota exceeded")),
                10,
                3,
            ),
            ProviderEntry::new(
                Arc::new(StaticCapability {
                    name: "backup",
                    reply: "rewritten by backup",
                }),
                20,
                3,
            ),
        ]));
        let orchestrator = FailoverOrchestrator::with_config(registry.clone(), fast_config());

        let outcome = orchestrator
            .rewrite(RewriteKind::Title, "some title", &keywords())
            .await
            .unwrap();
        assert_eq!(outcome.provider, "backup");
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.content, "rewritten by backup");

        // Quota error opened the primary circuit in one shot.
        assert_eq!(registry.health("primary").unwrap().failure_count, 3);
        assert_eq!(registry.health("backup").unwrap().failure_count, 0);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_attempts_and_last_error() {
        let registry = Arc::new(ProviderRegistry::from_entries(vec![
            ProviderEntry::new(Arc::new(FailingCapability::new("one", "boom one")), 10, 3),
            ProviderEntry::new(Arc::new(FailingCapability::new("two", "boom two")), 20, 3),
            ProviderEntry::new(Arc::new(FailingCapability::new("three", "boom three")), 30, 3),
        ]));
        let orchestrator = FailoverOrchestrator::with_config(registry, fast_config());

        let err = orchestrator
            .rewrite(RewriteKind::Body, "body text", &keywords())
            .await
            .unwrap_err();
        match err {
            Error::ProvidersExhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("boom three"), "was: {last_error}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_registry_is_exhausted_without_attempts() {
        let registry = Arc::new(ProviderRegistry::from_entries(vec![]));
        let orchestrator = FailoverOrchestrator::with_config(registry, fast_config());

        let err = orchestrator
            .rewrite(RewriteKind::Title, "title", &keywords())
            .await
            .unwrap_err();
        match err {
            Error::ProvidersExhausted { attempts, .. } => assert_eq!(attempts, 0),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_auto_fallback_off_stops_after_one_attempt() {
        let registry = Arc::new(ProviderRegistry::from_entries(vec![
            ProviderEntry::new(Arc::new(FailingCapability::new("first", "boom")), 10, 3),
            ProviderEntry::new(
                Arc::new(StaticCapability {
                    name: "second",
                    reply: "never reached",
                }),
                20,
                3,
            ),
        ]));
        let config = OrchestratorConfig {
            auto_fallback: false,
            ..fast_config()
        };
        let orchestrator = FailoverOrchestrator::with_config(registry, config);

        let err = orchestrator
            .rewrite(RewriteKind::Title, "title", &keywords())
            .await
            .unwrap_err();
        match err {
            Error::ProvidersExhausted { attempts, .. } => assert_eq!(attempts, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_hung_provider_times_out_and_fails_over() {
        let registry = Arc::new(ProviderRegistry::from_entries(vec![
            ProviderEntry::new(Arc::new(SlowCapability), 10, 3),
            ProviderEntry::new(
                Arc::new(StaticCapability {
                    name: "fallback",
                    reply: "made it",
                }),
                20,
                3,
            ),
        ]));
        let orchestrator = FailoverOrchestrator::with_config(registry.clone(), fast_config());

        let outcome = orchestrator
            .rewrite(RewriteKind::Body, "body", &keywords())
            .await
            .unwrap();
        assert_eq!(outcome.provider, "fallback");
        // Timeouts are transient failures, not quota ones.
        assert_eq!(registry.health("slow").unwrap().failure_count, 1);
    }

    #[tokio::test]
    async fn test_transient_failure_does_not_poison_later_calls() {
        let flaky = Arc::new(FailingCapability::new("flaky", "connection reset"));
        let registry = Arc::new(ProviderRegistry::from_entries(vec![
            ProviderEntry::new(flaky.clone(), 10, 3),
            ProviderEntry::new(
                Arc::new(StaticCapability {
                    name: "steady",
                    reply: "ok",
                }),
                20,
                3,
            ),
        ]));
        let orchestrator = FailoverOrchestrator::with_config(registry.clone(), fast_config());

        let first = orchestrator
            .rewrite(RewriteKind::Title, "title", &keywords())
            .await
            .unwrap();
        assert_eq!(first.provider, "steady");
        assert_eq!(registry.health("flaky").unwrap().failure_count, 1);

        // The flaky provider is under its ceiling, so the next call tries it
        // again first.
        let second = orchestrator
            .rewrite(RewriteKind::Title, "title", &keywords())
            .await
            .unwrap();
        assert_eq!(second.provider, "steady");
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        let registry = Arc::new(ProviderRegistry::from_entries(vec![]));
        let orchestrator = FailoverOrchestrator::new(registry);
        let err = orchestrator
            .rewrite(RewriteKind::Title, "   ", &keywords())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_config_reads_settings_overrides() {
        use ni_storage::MemorySettings;
        let settings = MemorySettings::new()
            .with("auto_fallback_enabled", "false")
            .with("rewrite_timeout_secs", "5")
            .with("rewrite_retry_delay_ms", "250");
        let config = OrchestratorConfig::from_settings(&settings).await.unwrap();
        assert!(!config.auto_fallback);
        assert_eq!(config.attempt_timeout, Duration::from_secs(5));
        assert_eq!(config.retry_delay, Duration::from_millis(250));
    }
}
