use async_trait::async_trait;
use ni_core::{Result, RewriteCapability};
use std::fmt;

/// Offline capability that echoes its input back. Handy for tests and for
/// running the pipeline without any provider credentials.
pub struct DummyCapability;

impl fmt::Debug for DummyCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyCapability").finish()
    }
}

#[async_trait]
impl RewriteCapability for DummyCapability {
    fn name(&self) -> &'static str {
        "dummy"
    }

    async fn rewrite_title(&self, title: &str, _keywords: &[String]) -> Result<String> {
        Ok(title.trim().to_string())
    }

    async fn rewrite_body(&self, content: &str, _keywords: &[String]) -> Result<String> {
        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dummy_echoes_input() {
        let capability = DummyCapability;
        let keywords = vec!["rust".to_string()];
        let title = capability.rewrite_title("  A title  ", &keywords).await.unwrap();
        assert_eq!(title, "A title");
        let body = capability.rewrite_body("Body text", &keywords).await.unwrap();
        assert_eq!(body, "Body text");
    }
}
