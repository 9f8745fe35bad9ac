use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request to {0} failed: {1}")]
    Request(String, String),
    #[error("Node responded with status {1} for {0}")]
    Status(String, u16),
    #[error("Invalid response from {0}: {1}")]
    InvalidResponse(String, String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
