//! Turns loosely structured model output into candidate profiles.

use kreativa_core::{CandidateProfile, Category, Platform};
use serde_json::Value;

use crate::error::IngestError;

/// Returns the span from the first `[` to the last `]`, if any.
pub(crate) fn json_array_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

fn field<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn to_candidate(obj: &Value) -> Option<CandidateProfile> {
    let handle = field(obj, "handle")
        .map(|h| h.replacen('@', "", 1).trim().to_string())
        .filter(|h| !h.is_empty())?;
    let name = field(obj, "name").map_or_else(|| handle.clone(), ToOwned::to_owned);
    let platform = field(obj, "platform")
        .and_then(|p| p.parse::<Platform>().ok())
        .unwrap_or(Platform::Instagram);
    let category = field(obj, "category").and_then(|c| c.parse::<Category>().ok());

    Some(CandidateProfile {
        name,
        handle,
        platform,
        bio: field(obj, "bio").unwrap_or_default().to_string(),
        category,
    })
}

fn candidates_from(value: &Value) -> Vec<CandidateProfile> {
    match value {
        Value::Array(items) => items.iter().filter_map(to_candidate).collect(),
        Value::Object(_) => to_candidate(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

/// Parses a model reply that should be a JSON array of profile objects.
///
/// Tolerates prose around the array, a single object instead of an array,
/// unknown platforms (Instagram) and unknown categories (left for the
/// categorizer). Entries without a handle are dropped.
///
/// # Errors
///
/// Returns [`IngestError::InvalidJson`] when no JSON can be recovered.
pub fn parse_profiles_reply(reply: &str) -> Result<Vec<CandidateProfile>, IngestError> {
    let value = match serde_json::from_str::<Value>(reply) {
        Ok(value) => value,
        Err(_) => {
            let span = json_array_span(reply).ok_or(IngestError::InvalidJson)?;
            serde_json::from_str(span).map_err(|_| IngestError::InvalidJson)?
        }
    };
    Ok(candidates_from(&value))
}

/// Like [`parse_profiles_reply`] but a reply with no array at all means
/// "nothing found" rather than an error.
///
/// # Errors
///
/// Returns [`IngestError::InvalidJson`] when an array is present but does
/// not parse.
pub fn parse_document_reply(reply: &str) -> Result<Vec<CandidateProfile>, IngestError> {
    let Some(span) = json_array_span(reply) else {
        return Ok(Vec::new());
    };
    let value: Value = serde_json::from_str(span).map_err(|_| IngestError::InvalidJson)?;
    Ok(candidates_from(&value))
}
