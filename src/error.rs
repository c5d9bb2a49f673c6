use thiserror::Error;

#[derive(Error, Debug)]
pub enum KrishiError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Advisor error: {0}")]
    Advisor(String),

    #[error("No recommendations available: {0}")]
    NoRecommendations(String),
}

pub type Result<T> = std::result::Result<T, KrishiError>;
