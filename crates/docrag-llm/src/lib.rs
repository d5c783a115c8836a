//! Generation Capability implementation.
//!
//! [`RemoteGenerator`] sends an assembled prompt to any OpenAI-compatible
//! `/v1/chat/completions` endpoint and returns the answer text. One
//! non-streaming request per call; retry policy, if any, belongs to the
//! provider's own transport, not here.

use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use docrag_core::config::Settings;
use docrag_core::traits::Generator;

const DEFAULT_TEMPERATURE: f32 = 0.3;

pub struct RemoteGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
}

impl RemoteGenerator {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.generation.base_url,
            &settings.generation.model,
            settings.generation.api_key.clone(),
        )
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[async_trait]
impl Generator for RemoteGenerator {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let req = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
        };
        let mut call = self.client.post(chat_endpoint(&self.base_url)).json(&req);
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }
        tracing::debug!(model = %self.model, prompt_chars = prompt.chars().count(), "requesting completion");
        let resp = call
            .send()
            .await?
            .error_for_status()?
            .json::<ChatResponse>()
            .await?;
        resp.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow!("chat response contained no choices"))
    }
}

fn has_version_suffix(base_url: &str) -> bool {
    let Some(last_segment) = base_url.rsplit('/').next() else {
        return false;
    };
    let Some(rest) = last_segment.strip_prefix('v') else {
        return false;
    };
    !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

/// Build the `/v1/chat/completions` URL without doubling a version segment
/// the caller already supplied.
fn chat_endpoint(base_url: &str) -> String {
    let normalized = base_url.trim_end_matches('/');
    if normalized.ends_with("/chat/completions") {
        return normalized.to_string();
    }
    if has_version_suffix(normalized) {
        return format!("{normalized}/chat/completions");
    }
    format!("{normalized}/v1/chat/completions")
}

#[cfg(test)]
mod tests {
    use super::chat_endpoint;

    #[test]
    fn endpoint_from_host_base_uses_v1_chat_completions() {
        assert_eq!(
            chat_endpoint("https://api.openai.com"),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn endpoint_from_v1_base_appends_once() {
        assert_eq!(
            chat_endpoint("http://localhost:11434/v1"),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn endpoint_preserves_explicit_chat_url() {
        assert_eq!(
            chat_endpoint("https://api.example.com/v1/chat/completions"),
            "https://api.example.com/v1/chat/completions"
        );
    }
}
