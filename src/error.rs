use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model backend returned status {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Model backend request timed out after {0}s")]
    Timeout(u64),

    #[error("Upload rejected: {0}")]
    Upload(String),
}

pub type Result<T> = std::result::Result<T, LeadError>;
