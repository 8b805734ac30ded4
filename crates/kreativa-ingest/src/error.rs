use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Gemini API key is required")]
    MissingApiKey,

    #[error("Gemini API key required for PDF parsing")]
    PdfRequiresKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer from the model endpoint.
    #[error("Gemini API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid JSON response from AI")]
    InvalidJson,

    #[error("empty response from AI")]
    EmptyResponse,

    #[error("AI Parse Error: {0}")]
    AiParse(String),

    #[error("Failed to parse PDF. Please try a CSV file instead.")]
    PdfParse,

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl IngestError {
    /// True for quota / rate-limit answers, which trigger the offline
    /// text parser instead of surfacing an error.
    #[must_use]
    pub fn is_quota(&self) -> bool {
        match self {
            IngestError::Api { status, message } => {
                *status == 429
                    || message.to_lowercase().contains("quota")
                    || message.contains("Too Many Requests")
                    || message.contains("RESOURCE_EXHAUSTED")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_detection_covers_status_and_message() {
        let by_status = IngestError::Api {
            status: 429,
            message: "slow down".to_string(),
        };
        let by_message = IngestError::Api {
            status: 403,
            message: "Quota exceeded for project".to_string(),
        };
        let other = IngestError::Api {
            status: 500,
            message: "internal".to_string(),
        };
        assert!(by_status.is_quota());
        assert!(by_message.is_quota());
        assert!(!other.is_quota());
        assert!(!IngestError::InvalidJson.is_quota());
    }
}
