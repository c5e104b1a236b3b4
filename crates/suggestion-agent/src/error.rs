use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("API key not set (environment variable {0})")]
    MissingApiKey(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("failed to parse {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("completion contained no choices")]
    EmptyResponse,

    #[error("expected 3 suggestions, model returned {0}")]
    InsufficientSuggestions(usize),

    #[error("client initialization failed: {0}")]
    ClientInit(String),
}
