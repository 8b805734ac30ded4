//! Minimal client for the Gemini `generateContent` REST endpoint.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::IngestError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    Inline { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Gemini client bound to one API key and model.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

impl GeminiClient {
    /// Creates a client pointed at the public Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, IngestError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client that talks to `base_url` instead of Google.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`IngestError::Http`] if the client cannot be built.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, IngestError> {
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| IngestError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` and asks for a JSON reply.
    ///
    /// # Errors
    ///
    /// See [`GeminiClient::generate`].
    pub async fn generate_json(&self, prompt: &str) -> Result<String, IngestError> {
        self.generate(
            vec![Part::Text { text: prompt }],
            Some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        )
        .await
    }

    /// Sends `prompt` together with a PDF document.
    ///
    /// # Errors
    ///
    /// See [`GeminiClient::generate`].
    pub async fn generate_with_pdf(&self, prompt: &str, pdf: &[u8]) -> Result<String, IngestError> {
        self.generate(
            vec![
                Part::Text { text: prompt },
                Part::Inline {
                    inline_data: InlineData {
                        mime_type: "application/pdf",
                        data: STANDARD.encode(pdf),
                    },
                },
            ],
            None,
        )
        .await
    }

    /// Returns the concatenated text of the first candidate.
    ///
    /// # Errors
    ///
    /// - [`IngestError::Api`] on a non-2xx status, carrying the API message.
    /// - [`IngestError::Http`] on network failure.
    /// - [`IngestError::Deserialize`] if the body is not the expected shape.
    /// - [`IngestError::EmptyResponse`] if no candidate text came back.
    async fn generate(
        &self,
        parts: Vec<Part<'_>>,
        generation_config: Option<GenerationConfig>,
    ) -> Result<String, IngestError> {
        let url = self
            .base_url
            .join(&format!("v1beta/models/{}:generateContent", self.model))
            .map_err(|e| IngestError::InvalidBaseUrl(e.to_string()))?;
        let request = GenerateRequest {
            contents: vec![Content { parts }],
            generation_config,
        };

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());
            tracing::warn!(status = status.as_u16(), %message, "gemini request failed");
            return Err(IngestError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| IngestError::Deserialize {
                context: format!("{} generateContent", self.model),
                source: e,
            })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(IngestError::EmptyResponse);
        }
        Ok(text)
    }
}
