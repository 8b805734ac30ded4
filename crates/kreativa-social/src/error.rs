use thiserror::Error;

/// Errors returned by the social-stats client.
#[derive(Debug, Error)]
pub enum SocialError {
    /// No RapidAPI key was configured; no request was made.
    #[error("API key not configured")]
    NotConfigured,

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("{platform} API error: {status}")]
    Status { platform: String, status: u16 },

    /// The response body could not be parsed as JSON.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}
