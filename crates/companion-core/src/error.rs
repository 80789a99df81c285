use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompanionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("unknown artifact kind: {0}")]
    UnknownArtifactKind(String),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("unknown pipeline platform: {0}")]
    UnknownPlatform(String),

    #[error("unknown documentation type: {0}")]
    UnknownDocType(String),

    #[error("{kind} not found: {id}")]
    ArtifactNotFound { kind: String, id: String },

    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CompanionError>;
