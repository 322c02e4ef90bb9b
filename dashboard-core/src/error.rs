use reqwest::StatusCode;
use thiserror::Error;

/// Why a city produced no observation.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to weather provider failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Weather provider returned status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to parse weather provider response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Object storage failures. None of these abort a run except `Client`,
/// which can only happen while the store is being constructed.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write object '{key}': {reason}")]
    Write { key: String, reason: String },

    #[error("Failed to provision bucket '{bucket}': {reason}")]
    BucketProvision { bucket: String, reason: String },

    #[error("Failed to construct storage client: {0}")]
    Client(String),

    #[error("Failed to serialize archive record: {0}")]
    Serialize(#[from] serde_json::Error),
}
