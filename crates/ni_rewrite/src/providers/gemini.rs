use crate::prompt::{body_prompt, title_prompt};
use async_trait::async_trait;
use ni_core::{Error, Result, RewriteCapability};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

pub struct GeminiCapability {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiCapability {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
        }
    }

    async fn generate(&self, prompt: String) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent?key={}",
                self.base_url, self.model, self.api_key
            ))
            .json(&request)
            .send()
            .await
            .map_err(|e| provider_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(provider_error(format!("rate limit exceeded: {body}")));
            }
            return Err(provider_error(format!("API returned status {status}: {body}")));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| provider_error(e.to_string()))?;
        parsed
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.trim().to_string())
            .ok_or_else(|| provider_error("no candidates in response".to_string()))
    }
}

fn provider_error(message: String) -> Error {
    Error::Provider {
        name: "gemini".to_string(),
        message,
    }
}

impl fmt::Debug for GeminiCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiCapability")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl RewriteCapability for GeminiCapability {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn rewrite_title(&self, title: &str, keywords: &[String]) -> Result<String> {
        self.generate(title_prompt(title, keywords)).await
    }

    async fn rewrite_body(&self, content: &str, keywords: &[String]) -> Result<String> {
        self.generate(body_prompt(content, keywords)).await
    }
}
