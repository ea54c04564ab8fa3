use thiserror::Error;

/// All errors produced by the Tweet Tracker client.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("HTTP request to {endpoint} failed: {message}")]
    Http { endpoint: String, message: String },

    /// The backend answered with a non-success status code.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The live-update socket failed to connect, read or write.
    #[error("WebSocket error: {0}")]
    Socket(String),

    /// The backend accepted the request but reported a failure in its body.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend base URL is empty or has an unsupported scheme.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrackerError {
    /// `true` when the backend answered 404 Not Found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TrackerError::Status { status: 404, .. })
    }
}

/// Convenience alias used throughout the tracker crates.
pub type Result<T> = std::result::Result<T, TrackerError>;
