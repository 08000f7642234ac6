//! Provider configuration and live health state.
//!
//! The registry is built from the settings store: a provider from the catalog
//! is enabled only when its credential is present. Priorities are fixed
//! constants; lower values are tried first, so the free-tier capabilities sit
//! at the front and the metered ones at the back. Health counters live behind
//! a mutex per provider because concurrent pipeline instances share the
//! registry.

use crate::providers::{DeepSeekCapability, GeminiCapability, GroqCapability, OpenAiCapability};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use ni_core::{Error, Result, RewriteCapability, SettingsStore};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{info, warn};

/// Error text fragments that mark a failure as quota or rate-limit flavored.
/// Such a failure opens the provider's circuit immediately instead of waiting
/// for the failure ceiling.
const QUOTA_MARKERS: [&str; 3] = ["quota", "rate limit", "exceeded"];

pub fn is_quota_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    QUOTA_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Requests allowed per period, carried as provider metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub requests: u32,
    pub period_secs: u64,
}

impl RateLimit {
    pub const fn per_minute(requests: u32) -> Self {
        Self {
            requests,
            period_secs: 60,
        }
    }
}

/// Catalog row describing how to build a provider once its credential shows
/// up in the settings store.
struct ProviderSpec {
    name: &'static str,
    credential_key: &'static str,
    priority: u8,
    max_failures: u32,
    rate_limit: Option<RateLimit>,
    build: fn(String) -> Arc<dyn RewriteCapability>,
}

lazy_static! {
    static ref CATALOG: Vec<ProviderSpec> = vec![
        ProviderSpec {
            name: "gemini",
            credential_key: "gemini_api_key",
            priority: 10,
            max_failures: 3,
            rate_limit: Some(RateLimit::per_minute(15)),
            build: |key| Arc::new(GeminiCapability::new(key)),
        },
        ProviderSpec {
            name: "groq",
            credential_key: "groq_api_key",
            priority: 20,
            max_failures: 3,
            rate_limit: Some(RateLimit::per_minute(30)),
            build: |key| Arc::new(GroqCapability::new(key)),
        },
        ProviderSpec {
            name: "deepseek",
            credential_key: "deepseek_api_key",
            priority: 30,
            max_failures: 3,
            rate_limit: None,
            build: |key| Arc::new(DeepSeekCapability::new(key)),
        },
        ProviderSpec {
            name: "openai",
            credential_key: "openai_api_key",
            priority: 40,
            max_failures: 2,
            rate_limit: None,
            build: |key| Arc::new(OpenAiCapability::new(key)),
        },
    ];
}

/// Mutable health counters for one provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderHealth {
    pub failure_count: u32,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// One enabled provider with its fixed configuration and live health.
pub struct ProviderEntry {
    pub name: &'static str,
    pub priority: u8,
    pub max_failures: u32,
    pub rate_limit: Option<RateLimit>,
    pub capability: Arc<dyn RewriteCapability>,
    health: Mutex<ProviderHealth>,
}

impl ProviderEntry {
    pub fn new(capability: Arc<dyn RewriteCapability>, priority: u8, max_failures: u32) -> Self {
        Self {
            name: capability.name(),
            priority,
            max_failures,
            rate_limit: None,
            capability,
            health: Mutex::new(ProviderHealth::default()),
        }
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    pub fn health(&self) -> ProviderHealth {
        *self.health.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Circuit is open once the failure count reaches the ceiling.
    fn available(&self) -> bool {
        self.health().failure_count < self.max_failures
    }
}

pub struct ProviderRegistry {
    settings: Option<Arc<dyn SettingsStore>>,
    entries: RwLock<Vec<Arc<ProviderEntry>>>,
}

impl ProviderRegistry {
    /// Builds the registry from the settings store, enabling every catalog
    /// provider whose credential is configured.
    pub async fn from_settings(settings: Arc<dyn SettingsStore>) -> Result<Self> {
        let entries = build_entries(settings.as_ref()).await?;
        Ok(Self {
            settings: Some(settings),
            entries: RwLock::new(entries),
        })
    }

    /// Registry over explicit entries, for embedders that construct their own
    /// capabilities and for tests. `reload` is unavailable on such a registry.
    pub fn from_entries(entries: Vec<ProviderEntry>) -> Self {
        let mut entries: Vec<Arc<ProviderEntry>> = entries.into_iter().map(Arc::new).collect();
        entries.sort_by_key(|e| e.priority);
        Self {
            settings: None,
            entries: RwLock::new(entries),
        }
    }

    /// Rebuilds the whole registry from the settings store, dropping all
    /// health state. Used when credentials change at runtime.
    pub async fn reload(&self) -> Result<()> {
        let Some(settings) = &self.settings else {
            return Err(Error::Settings(
                "registry was built without a settings store".to_string(),
            ));
        };
        let rebuilt = build_entries(settings.as_ref()).await?;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        *entries = rebuilt;
        info!(providers = entries.len(), "provider registry reloaded");
        Ok(())
    }

    /// Returns the preferred provider: lowest priority value among entries
    /// that are under their failure ceiling and not in `excluding`.
    pub fn next(&self, excluding: &HashSet<String>) -> Option<Arc<ProviderEntry>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .find(|e| !excluding.contains(e.name) && e.available())
            .cloned()
    }

    pub fn record_success(&self, name: &str) {
        if let Some(entry) = self.entry(name) {
            let mut health = entry.health.lock().unwrap_or_else(PoisonError::into_inner);
            health.failure_count = 0;
            health.last_used_at = Some(Utc::now());
        }
    }

    /// Bumps the failure counter. A quota-flavored error jumps the counter
    /// straight to the ceiling, since the provider will keep rejecting calls
    /// for the rest of its period.
    pub fn record_failure(&self, name: &str, error: &Error) {
        let Some(entry) = self.entry(name) else {
            return;
        };
        let message = error.to_string();
        let mut health = entry.health.lock().unwrap_or_else(PoisonError::into_inner);
        if is_quota_error(&message) {
            health.failure_count = entry.max_failures;
            warn!(provider = name, error = %message, "quota exhausted, circuit opened");
        } else {
            health.failure_count += 1;
            if health.failure_count >= entry.max_failures {
                warn!(
                    provider = name,
                    failures = health.failure_count,
                    "failure ceiling reached, circuit opened"
                );
            }
        }
    }

    /// Clears failure counters for one provider, or for all of them when no
    /// name is given. Manual recovery hook.
    pub fn reset(&self, name: Option<&str>) {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        for entry in entries.iter() {
            if name.is_none() || name == Some(entry.name) {
                let mut health = entry.health.lock().unwrap_or_else(PoisonError::into_inner);
                health.failure_count = 0;
            }
        }
    }

    pub fn health(&self, name: &str) -> Option<ProviderHealth> {
        self.entry(name).map(|e| e.health())
    }

    /// Number of enabled providers, circuit state ignored.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|e| e.name)
            .collect()
    }

    fn entry(&self, name: &str) -> Option<Arc<ProviderEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|e| e.name == name)
            .cloned()
    }
}

async fn build_entries(settings: &dyn SettingsStore) -> Result<Vec<Arc<ProviderEntry>>> {
    let mut entries = Vec::new();
    for spec in CATALOG.iter() {
        match settings.get(spec.credential_key).await? {
            Some(credential) if !credential.trim().is_empty() => {
                let capability = (spec.build)(credential);
                entries.push(Arc::new(ProviderEntry {
                    name: spec.name,
                    priority: spec.priority,
                    max_failures: spec.max_failures,
                    rate_limit: spec.rate_limit,
                    capability,
                    health: Mutex::new(ProviderHealth::default()),
                }));
                info!(provider = spec.name, priority = spec.priority, "provider enabled");
            }
            _ => {
                info!(provider = spec.name, "provider disabled, no credential");
            }
        }
    }
    entries.sort_by_key(|e| e.priority);
    Ok(entries)
}
