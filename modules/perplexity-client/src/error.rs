use thiserror::Error;

pub type Result<T> = std::result::Result<T, PerplexityError>;

#[derive(Debug, Error)]
pub enum PerplexityError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for PerplexityError {
    fn from(err: reqwest::Error) -> Self {
        PerplexityError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for PerplexityError {
    fn from(err: serde_json::Error) -> Self {
        PerplexityError::Parse(err.to_string())
    }
}
