use crate::error::AgentError;
use crate::types::{ChatRequest, ChatResponse, Message};
use lightness_core::config::SuggestionsConfig;
use std::time::Duration;

/// Client for an OpenAI-compatible `POST {base_url}/chat/completions`.
///
/// One attempt per call; there is no retry.
pub struct CompletionClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl CompletionClient {
    pub fn new(api_key: String, settings: &SuggestionsConfig) -> Result<Self, AgentError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AgentError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `messages` and return the first choice's content.
    pub async fn complete(&self, messages: Vec<Message>) -> Result<String, AgentError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AgentError::Status {
                code: status.as_u16(),
                body: truncate(&body, 500).to_string(),
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| AgentError::Parse {
            context: format!("chat completion response (body: {})", truncate(&body, 200)),
            source: e,
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(AgentError::EmptyResponse)
    }
}

/// Cut `s` to at most `max_len` bytes on a char boundary.
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
