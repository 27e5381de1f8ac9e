//! Error types for the ecostream dashboard

/// Errors that can occur in the dashboard service
#[derive(Debug, thiserror::Error)]
pub enum EcostreamError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dashboard server error: {0}")]
    Server(String),
}

/// Result type alias for ecostream operations
pub type Result<T> = std::result::Result<T, EcostreamError>;
