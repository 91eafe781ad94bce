use thiserror::Error;

#[derive(Error, Debug)]
pub enum KartochkiError {
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Transcript unavailable for {url}: {reason}")]
    SourceUnavailable { url: String, reason: String },

    #[error("Model output could not be parsed as key concepts: {reason}")]
    ExtractionParse { reason: String },

    #[error("Unexpected model response: {reason}")]
    ModelResponse { reason: String },

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),
}

impl KartochkiError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        KartochkiError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KartochkiError>;
