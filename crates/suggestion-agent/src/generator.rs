use crate::client::CompletionClient;
use crate::error::AgentError;
use crate::fallback::fallback_suggestions;
use crate::prompt::{build_prompt, parse_completion};
use lightness_core::config::SuggestionsConfig;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestionSource {
    Model,
    Fallback { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionOutcome {
    pub suggestions: [String; 3],
    pub source: SuggestionSource,
}

impl SuggestionOutcome {
    pub fn from_model(&self) -> bool {
        self.source == SuggestionSource::Model
    }
}

/// Produces three suggestions for a task, from the model when it answers and
/// from the static tables otherwise. Never fails.
#[derive(Debug)]
pub struct SuggestionGenerator {
    client: Option<CompletionClient>,
    api_key_env: String,
}

impl SuggestionGenerator {
    /// Without an API key in the environment the generator only serves
    /// fallbacks.
    pub fn from_config(settings: &SuggestionsConfig) -> Result<Self, AgentError> {
        let client = match settings.api_key() {
            Some(key) => Some(CompletionClient::new(key, settings)?),
            None => None,
        };
        Ok(Self {
            client,
            api_key_env: settings.api_key_env.clone(),
        })
    }

    pub fn with_client(client: CompletionClient) -> Self {
        Self {
            client: Some(client),
            api_key_env: String::new(),
        }
    }

    pub fn offline(api_key_env: impl Into<String>) -> Self {
        Self {
            client: None,
            api_key_env: api_key_env.into(),
        }
    }

    pub fn has_model(&self) -> bool {
        self.client.is_some()
    }

    pub async fn generate(&self, task: &str, persona: &str) -> SuggestionOutcome {
        match self.ask_model(task, persona).await {
            Ok(suggestions) => SuggestionOutcome {
                suggestions,
                source: SuggestionSource::Model,
            },
            Err(e) => {
                tracing::warn!(persona, "suggestion model unavailable, using fallback: {e}");
                SuggestionOutcome {
                    suggestions: fallback_suggestions(task, persona),
                    source: SuggestionSource::Fallback {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    async fn ask_model(&self, task: &str, persona: &str) -> Result<[String; 3], AgentError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| AgentError::MissingApiKey(self.api_key_env.clone()))?;
        let content = client.complete(build_prompt(task, persona)).await?;
        parse_completion(&content)
    }
}
