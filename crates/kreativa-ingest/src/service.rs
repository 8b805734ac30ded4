//! Upload entry points: CSV, PDF, and pasted text.

use kreativa_core::{categorize, AppConfig, CandidateProfile, CategorizedProfile};
use serde::Serialize;

use crate::csv::parse_csv;
use crate::error::IngestError;
use crate::extract::{parse_document_reply, parse_profiles_reply};
use crate::gemini::GeminiClient;
use crate::text::parse_text_with_regex;

const TEXT_PROMPT_MAX_CHARS: usize = 30_000;

const NO_PROFILES_IN_FILE: &str = "No profiles found in the file";
const NO_PROFILES_IN_TEXT: &str = "No profiles found in the text";

const PDF_PROMPT: &str = r#"Extract all creative profiles from this document.

For each person/creative found, extract:
- name: Full name
- handle: Social media username (without @)
- platform: Instagram, TikTok, or Twitter
- bio: Brief description if available

Return as JSON array:
[{"name": "...", "handle": "...", "platform": "Instagram|TikTok|Twitter", "bio": "..."}]

If you can't find structured profiles, try to identify any names with associated social handles.
Return empty array [] if no profiles found."#;

fn text_prompt(text: &str) -> String {
    let excerpt: String = text.chars().take(TEXT_PROMPT_MAX_CHARS).collect();
    format!(
        r#"Extract all social media profiles from the text below.
Return a JSON array of objects.
Each object must have:
- "name": Person's name (or handle if name missing)
- "handle": Username (remove @ symbol)
- "platform": "Instagram", "TikTok", or "Twitter". (Infer from context! e.g. if the list is titled "TikTok Faves", all are TikTok. If unsure, default to Instagram).
- "bio": Brief bio/description if available.
- "category": Infer a category (e.g. "Fashion Designers", "Photographers", "Content Creators") based on keywords.

Input Text:
"""
{excerpt}
"""

Return ONLY the JSON array."#
    )
}

/// An uploaded file, already read into memory.
#[derive(Debug, Clone)]
pub enum FileUpload {
    Csv(String),
    Pdf(Vec<u8>),
}

/// Outcome of an upload. Failures are reported in `errors` rather than as
/// `Err` so the admin UI can show them next to the preview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedFileResult {
    pub profiles: Vec<CategorizedProfile>,
    pub errors: Vec<String>,
}

impl ParsedFileResult {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            profiles: Vec::new(),
            errors: vec![message.into()],
        }
    }

    fn from_candidates(candidates: Vec<CandidateProfile>, empty_message: &str) -> Self {
        if candidates.is_empty() {
            Self::failed(empty_message)
        } else {
            Self {
                profiles: categorize(candidates),
                errors: Vec::new(),
            }
        }
    }
}

/// Import parsing service. Without a Gemini client, CSV still works but
/// PDF and pasted-text extraction fail with a missing-key error.
pub struct IngestService {
    gemini: Option<GeminiClient>,
}

impl IngestService {
    #[must_use]
    pub fn new(gemini: Option<GeminiClient>) -> Self {
        Self { gemini }
    }

    /// Builds the service from application config, enabling AI extraction
    /// when a Gemini key is configured.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, IngestError> {
        let gemini = config
            .gemini_api_key
            .as_deref()
            .map(|key| GeminiClient::new(key, &config.gemini_model, config.http_timeout_secs))
            .transpose()?;
        Ok(Self::new(gemini))
    }

    #[must_use]
    pub fn ai_enabled(&self) -> bool {
        self.gemini.is_some()
    }

    /// Extracts profiles from pasted text with the AI extractor, falling
    /// back to the offline parser when the model is out of quota.
    ///
    /// # Errors
    ///
    /// - [`IngestError::MissingApiKey`] when no Gemini client is configured.
    /// - [`IngestError::AiParse`] for any other request failure or an
    ///   unparseable reply.
    pub async fn parse_text(&self, text: &str) -> Result<Vec<CandidateProfile>, IngestError> {
        let gemini = self.gemini.as_ref().ok_or(IngestError::MissingApiKey)?;

        let reply = match gemini.generate_json(&text_prompt(text)).await {
            Ok(reply) => reply,
            Err(e) if e.is_quota() => {
                tracing::warn!(error = %e, "gemini quota exhausted, using offline text parser");
                return Ok(parse_text_with_regex(text));
            }
            Err(e) => return Err(IngestError::AiParse(e.to_string())),
        };

        parse_profiles_reply(&reply).map_err(|e| IngestError::AiParse(e.to_string()))
    }

    /// Extracts profiles from a PDF document via the AI extractor.
    ///
    /// # Errors
    ///
    /// - [`IngestError::PdfRequiresKey`] when no Gemini client is configured.
    /// - [`IngestError::PdfParse`] for any request or parsing failure.
    pub async fn parse_pdf(&self, pdf: &[u8]) -> Result<Vec<CandidateProfile>, IngestError> {
        let gemini = self.gemini.as_ref().ok_or(IngestError::PdfRequiresKey)?;

        let reply = gemini
            .generate_with_pdf(PDF_PROMPT, pdf)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "pdf extraction failed");
                IngestError::PdfParse
            })?;

        parse_document_reply(&reply).map_err(|e| {
            tracing::error!(error = %e, "pdf extraction reply was not valid JSON");
            IngestError::PdfParse
        })
    }

    /// Parses an uploaded file and categorizes every extracted profile.
    pub async fn process_file_upload(&self, upload: FileUpload) -> ParsedFileResult {
        let candidates = match upload {
            FileUpload::Csv(content) => Ok(parse_csv(&content)),
            FileUpload::Pdf(bytes) => self.parse_pdf(&bytes).await,
        };

        match candidates {
            Ok(candidates) => ParsedFileResult::from_candidates(candidates, NO_PROFILES_IN_FILE),
            Err(e) => ParsedFileResult::failed(e.to_string()),
        }
    }

    /// Parses pasted text and categorizes every extracted profile.
    pub async fn process_text(&self, text: &str) -> ParsedFileResult {
        if text.trim().is_empty() {
            return ParsedFileResult::failed(NO_PROFILES_IN_TEXT);
        }
        match self.parse_text(text).await {
            Ok(candidates) => ParsedFileResult::from_candidates(candidates, NO_PROFILES_IN_TEXT),
            Err(e) => ParsedFileResult::failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use kreativa_core::{Category, Location, Platform};

    use super::*;

    #[tokio::test]
    async fn csv_upload_is_categorized() {
        let service = IngestService::new(None);
        let result = service
            .process_file_upload(FileUpload::Csv(
                "Name,Handle,Platform,Bio\nAda,@ada,Instagram,Portrait photographer in Abuja".to_string(),
            ))
            .await;

        assert!(result.errors.is_empty());
        assert_eq!(result.profiles.len(), 1);
        let profile = &result.profiles[0];
        assert_eq!(profile.platform, Platform::Instagram);
        assert_eq!(profile.category, Category::Photographers);
        assert_eq!(profile.location, Location::Abuja);
    }

    #[tokio::test]
    async fn empty_csv_reports_no_profiles() {
        let result = IngestService::new(None)
            .process_file_upload(FileUpload::Csv("Name,Handle\n".to_string()))
            .await;
        assert!(result.profiles.is_empty());
        assert_eq!(result.errors, vec![NO_PROFILES_IN_FILE.to_string()]);
    }

    #[tokio::test]
    async fn pdf_without_key_reports_requirement() {
        let result = IngestService::new(None)
            .process_file_upload(FileUpload::Pdf(b"%PDF-1.4".to_vec()))
            .await;
        assert_eq!(
            result.errors,
            vec!["Gemini API key required for PDF parsing".to_string()]
        );
    }

    #[tokio::test]
    async fn text_without_key_reports_requirement() {
        let result = IngestService::new(None).process_text("Ada @ada").await;
        assert_eq!(result.errors, vec!["Gemini API key is required".to_string()]);
    }

    #[test]
    fn text_prompt_truncates_long_input() {
        let long = "a".repeat(TEXT_PROMPT_MAX_CHARS + 500);
        let prompt = text_prompt(&long);
        assert!(prompt.contains(&"a".repeat(TEXT_PROMPT_MAX_CHARS)));
        assert!(!prompt.contains(&"a".repeat(TEXT_PROMPT_MAX_CHARS + 1)));
    }
}
