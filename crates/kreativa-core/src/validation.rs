//! Pure input validators and sanitizers.
//!
//! Every validator returns a [`ValidationResult`]; callers concatenate the
//! `errors` of several results when validating a whole profile.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::profiles::{Category, Location, ProfileFields, ProfileStatus};

/// Authoritative bio length cap shared by submission and admin edits.
pub const BIO_MAX_CHARS: usize = 300;
pub const BIO_MIN_CHARS: usize = 10;
pub const HANDLE_MAX_CHARS: usize = 50;
pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 255;
/// Upper bound on ids accepted by a single bulk action.
pub const MAX_BATCH_IDS: usize = 100;

static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+$").expect("valid handle regex"));
static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("valid uuid regex")
});
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self::from_errors(vec![message.into()])
    }

    /// Appends `other`'s errors, preserving order.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.valid = self.errors.is_empty();
    }

    /// All errors joined with `", "`, the form surfaced to API callers.
    #[must_use]
    pub fn message(&self) -> String {
        self.errors.join(", ")
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Validates a social handle for the given platform label.
///
/// One leading `@` is ignored; the remainder must be `[a-zA-Z0-9._-]+`.
#[must_use]
pub fn validate_handle(handle: &str, platform: &str) -> ValidationResult {
    if handle.trim().is_empty() {
        return ValidationResult::fail(format!("{platform} handle is required"));
    }
    if char_len(handle) > HANDLE_MAX_CHARS {
        return ValidationResult::fail(format!(
            "{platform} handle must be less than {HANDLE_MAX_CHARS} characters"
        ));
    }
    let bare = handle.strip_prefix('@').unwrap_or(handle);
    if !HANDLE_RE.is_match(bare) {
        return ValidationResult::fail(format!("{platform} handle contains invalid characters"));
    }
    ValidationResult::ok()
}

#[must_use]
pub fn validate_bio(bio: &str) -> ValidationResult {
    let trimmed = bio.trim();
    if trimmed.is_empty() {
        return ValidationResult::fail("Bio is required");
    }
    let len = char_len(trimmed);
    if len < BIO_MIN_CHARS {
        return ValidationResult::fail(format!(
            "Bio must be at least {BIO_MIN_CHARS} characters"
        ));
    }
    if len > BIO_MAX_CHARS {
        return ValidationResult::fail(format!(
            "Bio must be {BIO_MAX_CHARS} characters or less"
        ));
    }
    ValidationResult::ok()
}

#[must_use]
pub fn validate_name(name: &str) -> ValidationResult {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return ValidationResult::fail("Name is required");
    }
    let len = char_len(trimmed);
    if len < NAME_MIN_CHARS {
        return ValidationResult::fail(format!(
            "Name must be at least {NAME_MIN_CHARS} characters"
        ));
    }
    if len > NAME_MAX_CHARS {
        return ValidationResult::fail(format!(
            "Name must be less than {NAME_MAX_CHARS} characters"
        ));
    }
    ValidationResult::ok()
}

#[must_use]
pub fn validate_email(email: &str) -> ValidationResult {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return ValidationResult::fail("Email is required");
    }
    if char_len(trimmed) > EMAIL_MAX_CHARS {
        return ValidationResult::fail(format!(
            "Email must be less than {EMAIL_MAX_CHARS} characters"
        ));
    }
    if !EMAIL_RE.is_match(trimmed) {
        return ValidationResult::fail("Invalid email format");
    }
    ValidationResult::ok()
}

#[must_use]
pub fn validate_category(category: &str) -> ValidationResult {
    if category.is_empty() {
        return ValidationResult::fail("Category is required");
    }
    match category.parse::<Category>() {
        Ok(_) => ValidationResult::ok(),
        Err(_) => ValidationResult::fail("Invalid category"),
    }
}

#[must_use]
pub fn validate_location(location: &str) -> ValidationResult {
    if location.is_empty() {
        return ValidationResult::fail("Location is required");
    }
    match location.parse::<Location>() {
        Ok(_) => ValidationResult::ok(),
        Err(_) => ValidationResult::fail("Invalid location"),
    }
}

/// Accepts only absolute `http`/`https` URLs.
#[must_use]
pub fn validate_url(url: &str) -> ValidationResult {
    if url.trim().is_empty() {
        return ValidationResult::fail("URL is required");
    }
    match reqwest::Url::parse(url.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => ValidationResult::ok(),
        Ok(_) => ValidationResult::fail("URL must use http or https protocol"),
        Err(_) => ValidationResult::fail("Invalid URL format"),
    }
}

#[must_use]
pub fn validate_profile_id(id: &str) -> ValidationResult {
    if id.is_empty() {
        return ValidationResult::fail("Profile ID is required");
    }
    if !UUID_RE.is_match(id) {
        return ValidationResult::fail("Invalid profile ID format");
    }
    ValidationResult::ok()
}

/// Validates a bulk-action id list. Only the first malformed id is reported.
#[must_use]
pub fn validate_profile_ids<S: AsRef<str>>(ids: &[S]) -> ValidationResult {
    if ids.is_empty() {
        return ValidationResult::fail("At least one profile ID is required");
    }
    if ids.len() > MAX_BATCH_IDS {
        return ValidationResult::fail(format!(
            "Cannot process more than {MAX_BATCH_IDS} profiles at once"
        ));
    }
    if let Some(bad) = ids
        .iter()
        .map(AsRef::as_ref)
        .find(|id| !validate_profile_id(id).valid)
    {
        return ValidationResult::fail(format!("Invalid ID: {bad}"));
    }
    ValidationResult::ok()
}

#[must_use]
pub fn validate_status(status: &str) -> ValidationResult {
    match status.parse::<ProfileStatus>() {
        Ok(_) => ValidationResult::ok(),
        Err(_) => {
            ValidationResult::fail("Invalid status. Must be: pending, approved, or rejected")
        }
    }
}

/// Validates every field present in `fields` and concatenates the errors in
/// the order name, bio, category, location, Instagram, Twitter, `TikTok`.
#[must_use]
pub fn validate_profile(fields: &ProfileFields) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if let Some(name) = &fields.full_name {
        result.merge(validate_name(name));
    }
    if let Some(bio) = &fields.bio {
        result.merge(validate_bio(bio));
    }
    if let Some(category) = &fields.category {
        result.merge(validate_category(category));
    }
    if let Some(location) = &fields.location {
        result.merge(validate_location(location));
    }

    let handles = [
        (&fields.instagram_handle, "Instagram"),
        (&fields.twitter_handle, "Twitter"),
        (&fields.tiktok_handle, "TikTok"),
    ];
    for (handle, platform) in handles {
        if let Some(h) = handle.as_deref().filter(|h| !h.is_empty()) {
            result.merge(validate_handle(h, platform));
        }
    }

    result
}

/// Trims and strips angle brackets.
#[must_use]
pub fn sanitize_string(input: &str) -> String {
    input.trim().replace(['<', '>'], "")
}

/// Trims, drops one leading `@`, and removes characters outside `[a-zA-Z0-9._-]`.
#[must_use]
pub fn sanitize_handle(handle: &str) -> String {
    let trimmed = handle.trim();
    trimmed
        .strip_prefix('@')
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_accepts_leading_at_and_allowed_punctuation() {
        assert!(validate_handle("@jane.doe_01-x", "Instagram").valid);
        assert!(validate_handle("jane", "TikTok").valid);
    }

    #[test]
    fn handle_rejects_empty_long_and_bad_chars() {
        assert_eq!(
            validate_handle("  ", "Instagram").errors,
            vec!["Instagram handle is required"]
        );
        let long = "a".repeat(51);
        assert_eq!(
            validate_handle(&long, "Twitter").errors,
            vec!["Twitter handle must be less than 50 characters"]
        );
        assert_eq!(
            validate_handle("jane doe", "TikTok").errors,
            vec!["TikTok handle contains invalid characters"]
        );
        assert!(!validate_handle("@", "Instagram").valid);
        assert!(!validate_handle("@@jane", "Instagram").valid);
    }

    #[test]
    fn handle_at_exactly_fifty_chars_is_accepted() {
        assert!(validate_handle(&"a".repeat(50), "Instagram").valid);
    }

    #[test]
    fn bio_bounds() {
        assert_eq!(validate_bio("").errors, vec!["Bio is required"]);
        assert_eq!(
            validate_bio("too short").errors,
            vec!["Bio must be at least 10 characters"]
        );
        assert!(validate_bio("long enough bio").valid);
        assert!(validate_bio(&"x".repeat(BIO_MAX_CHARS)).valid);
        assert_eq!(
            validate_bio(&"x".repeat(BIO_MAX_CHARS + 1)).errors,
            vec!["Bio must be 300 characters or less"]
        );
    }

    #[test]
    fn name_bounds() {
        assert_eq!(validate_name(" ").errors, vec!["Name is required"]);
        assert!(!validate_name("A").valid);
        assert!(validate_name("Ada").valid);
        assert!(!validate_name(&"n".repeat(101)).valid);
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("admin@kreativa.ng").valid);
        assert_eq!(validate_email("admin").errors, vec!["Invalid email format"]);
        assert_eq!(validate_email("").errors, vec!["Email is required"]);
    }

    #[test]
    fn category_and_location_membership() {
        assert!(validate_category("UI/UX Designers").valid);
        assert_eq!(validate_category("").errors, vec!["Category is required"]);
        assert_eq!(validate_category("Chefs").errors, vec!["Invalid category"]);
        assert!(validate_location("Benin City").valid);
        assert_eq!(validate_location("Accra").errors, vec!["Invalid location"]);
    }

    #[test]
    fn url_requires_http_scheme() {
        assert!(validate_url("https://example.com/portfolio").valid);
        assert!(validate_url("http://example.com").valid);
        assert_eq!(
            validate_url("ftp://example.com").errors,
            vec!["URL must use http or https protocol"]
        );
        assert_eq!(validate_url("not a url").errors, vec!["Invalid URL format"]);
        assert_eq!(validate_url("").errors, vec!["URL is required"]);
    }

    #[test]
    fn profile_id_is_case_insensitive_uuid() {
        assert!(validate_profile_id("123e4567-e89b-12d3-a456-426614174000").valid);
        assert!(validate_profile_id("123E4567-E89B-12D3-A456-426614174000").valid);
        assert_eq!(
            validate_profile_id("123e4567e89b12d3a456426614174000").errors,
            vec!["Invalid profile ID format"]
        );
        assert_eq!(
            validate_profile_id("").errors,
            vec!["Profile ID is required"]
        );
    }

    #[test]
    fn id_batch_bounds_and_first_bad_id() {
        let empty: Vec<String> = Vec::new();
        assert_eq!(
            validate_profile_ids(&empty).errors,
            vec!["At least one profile ID is required"]
        );

        let too_many: Vec<String> = (0..101)
            .map(|_| "123e4567-e89b-12d3-a456-426614174000".to_string())
            .collect();
        assert_eq!(
            validate_profile_ids(&too_many).errors,
            vec!["Cannot process more than 100 profiles at once"]
        );

        let ids = [
            "123e4567-e89b-12d3-a456-426614174000",
            "bad-one",
            "bad-two",
        ];
        assert_eq!(validate_profile_ids(&ids).errors, vec!["Invalid ID: bad-one"]);

        let hundred: Vec<&str> = vec!["123e4567-e89b-12d3-a456-426614174000"; 100];
        assert!(validate_profile_ids(&hundred).valid);
    }

    #[test]
    fn status_values() {
        assert!(validate_status("pending").valid);
        assert!(validate_status("rejected").valid);
        assert_eq!(
            validate_status("archived").errors,
            vec!["Invalid status. Must be: pending, approved, or rejected"]
        );
    }

    #[test]
    fn validate_profile_collects_errors_in_field_order() {
        let fields = ProfileFields {
            full_name: Some("A".to_string()),
            bio: Some("short".to_string()),
            category: Some("Chefs".to_string()),
            location: Some("Lagos".to_string()),
            instagram_handle: Some("bad handle".to_string()),
            twitter_handle: Some(String::new()),
            tiktok_handle: None,
        };
        let result = validate_profile(&fields);
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![
                "Name must be at least 2 characters",
                "Bio must be at least 10 characters",
                "Invalid category",
                "Instagram handle contains invalid characters",
            ]
        );
        assert_eq!(
            result.message(),
            "Name must be at least 2 characters, Bio must be at least 10 characters, \
             Invalid category, Instagram handle contains invalid characters"
        );
    }

    #[test]
    fn validate_profile_with_no_fields_is_valid() {
        assert!(validate_profile(&ProfileFields::default()).valid);
    }

    #[test]
    fn sanitizers() {
        assert_eq!(sanitize_string("  <b>Ada</b> "), "bAda/b");
        assert_eq!(sanitize_handle(" @jane doe!"), "janedoe");
        assert_eq!(sanitize_handle("plain.handle"), "plain.handle");
    }
}
