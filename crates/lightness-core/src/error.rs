use thiserror::Error;

#[derive(Debug, Error)]
pub enum LightnessError {
    #[error("experience not found: {0}")]
    NotFound(u64),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown persona '{0}'")]
    InvalidPersona(String),

    #[error("unknown emotion '{0}'")]
    InvalidEmotion(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("database error: {0}")]
    Db(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LightnessError {
    /// Wrap any redb error (they do not share a common type) as `Db`.
    pub fn db(err: impl std::fmt::Display) -> Self {
        Self::Db(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LightnessError>;
