use crate::prompt::{body_prompt, title_prompt};
use async_trait::async_trait;
use ni_core::{Error, Result, RewriteCapability};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

pub struct DeepSeekCapability {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
}

impl DeepSeekCapability {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Arc::new(Client::new()),
            api_key: api_key.into(),
            base_url: "https://api.deepseek.com/v1".to_string(),
        }
    }

    async fn chat(&self, prompt: String) -> Result<String> {
        let request = ChatRequest {
            model: "deepseek-chat".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
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

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| provider_error(e.to_string()))?;
        parsed
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| provider_error("no choices in response".to_string()))
    }
}

fn provider_error(message: String) -> Error {
    Error::Provider {
        name: "deepseek".to_string(),
        message,
    }
}

impl fmt::Debug for DeepSeekCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepSeekCapability")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl RewriteCapability for DeepSeekCapability {
    fn name(&self) -> &'static str {
        "deepseek"
    }

    async fn rewrite_title(&self, title: &str, keywords: &[String]) -> Result<String> {
        self.chat(title_prompt(title, keywords)).await
    }

    async fn rewrite_body(&self, content: &str, keywords: &[String]) -> Result<String> {
        self.chat(body_prompt(content, keywords)).await
    }
}
