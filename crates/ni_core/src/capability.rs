use crate::Result;
use async_trait::async_trait;
use std::fmt;

/// A text-generation capability that can rewrite article titles and bodies.
///
/// One implementation exists per configured provider. The failover
/// orchestrator only ever talks to this interface; provider selection and
/// health tracking happen in the registry.
#[async_trait]
pub trait RewriteCapability: Send + Sync + fmt::Debug {
    /// Stable provider name used for health tracking and logging
    fn name(&self) -> &'static str;

    /// Rewrite an article title, weaving in the given keywords
    async fn rewrite_title(&self, title: &str, keywords: &[String]) -> Result<String>;

    /// Rewrite an article body, weaving in the given keywords
    async fn rewrite_body(&self, content: &str, keywords: &[String]) -> Result<String>;
}
