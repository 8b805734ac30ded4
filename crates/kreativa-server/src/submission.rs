//! Public profile submission.
//!
//! All field checks run before the rate limiter, storage, or database are
//! touched, and they run on the sanitized values that will be stored. Image
//! uploads are best effort: a failed upload stores no URL.

use kreativa_core::{
    validation::{
        sanitize_handle, sanitize_string, validate_category, validate_handle, validate_location,
        validate_url,
    },
    Platform, BIO_MAX_CHARS,
};
use kreativa_db::{NewProfile, NewSocialLink};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::api::AppState;
use crate::rate_limit::{RateLimitExceeded, RateLimitPolicy};
use crate::storage::{HEADER_IMAGES_BUCKET, PROFILE_PHOTOS_BUCKET};

pub const SUBMITTED_MESSAGE: &str =
    "Profile submitted successfully! We will review it within 48 hours.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SocialLinkInput {
    pub platform: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubmissionRequest {
    /// Primary platform label; defaults to Instagram when blank.
    pub platform: String,
    pub handle: String,
    /// Optional per-platform handles. The primary handle always occupies
    /// its own platform's slot.
    pub instagram_handle: Option<String>,
    pub tiktok_handle: Option<String>,
    pub twitter_handle: Option<String>,
    pub full_name: String,
    pub category: String,
    pub location: String,
    pub bio: String,
    pub portfolio_url: Option<String>,
    pub profile_photo_base64: Option<String>,
    pub header_image_base64: Option<String>,
    pub social_links: Vec<SocialLinkInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub profile_id: Uuid,
    pub message: &'static str,
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    RateLimited(#[from] RateLimitExceeded),
    #[error("Failed to submit profile. Please try again.")]
    Store(#[source] kreativa_db::DbError),
}

impl SubmissionError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SubmissionError::Validation(_) => "validation_error",
            SubmissionError::RateLimited(_) => "rate_limited",
            SubmissionError::Store(_) => "internal_error",
        }
    }
}

fn invalid(message: impl Into<String>) -> SubmissionError {
    SubmissionError::Validation(message.into())
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Checks every field and returns the parsed primary platform.
///
/// Name and bio are checked after sanitizing, so a value made only of
/// markup counts as missing.
///
/// # Errors
///
/// Returns [`SubmissionError::Validation`] with the first failing rule.
pub fn validate_submission(req: &SubmissionRequest) -> Result<Platform, SubmissionError> {
    let full_name = sanitize_string(&req.full_name);
    let bio = sanitize_string(&req.bio);
    let required = [
        (req.handle.trim(), "Handle is required"),
        (full_name.as_str(), "Full name is required"),
        (req.category.trim(), "Category is required"),
        (req.location.trim(), "Location is required"),
        (bio.as_str(), "Bio is required"),
    ];
    if let Some((_, message)) = required.iter().find(|(v, _)| v.is_empty()) {
        return Err(invalid(*message));
    }
    if bio.chars().count() > BIO_MAX_CHARS {
        return Err(invalid(format!(
            "Bio must be {BIO_MAX_CHARS} characters or less"
        )));
    }

    let platform = if req.platform.trim().is_empty() {
        Platform::Instagram
    } else {
        req.platform
            .trim()
            .parse::<Platform>()
            .map_err(|_| invalid("Invalid platform"))?
    };

    let mut checks = vec![validate_handle(req.handle.trim(), platform.label())];
    for (handle, slot) in [
        (req.instagram_handle.as_ref(), Platform::Instagram),
        (req.tiktok_handle.as_ref(), Platform::TikTok),
        (req.twitter_handle.as_ref(), Platform::Twitter),
    ] {
        if let Some(handle) = non_blank(handle) {
            checks.push(validate_handle(handle, slot.label()));
        }
    }
    checks.push(validate_category(&req.category));
    checks.push(validate_location(&req.location));
    if let Some(failed) = checks.into_iter().find(|c| !c.valid) {
        return Err(invalid(failed.message()));
    }
    if let Some(url) = req.portfolio_url.as_deref().filter(|u| !u.trim().is_empty()) {
        let check = validate_url(url);
        if !check.valid {
            return Err(invalid(check.message()));
        }
    }
    Ok(platform)
}

async fn upload_optional(
    state: &AppState,
    bucket: &str,
    stem: &str,
    image: Option<&str>,
) -> Option<String> {
    let image = image.filter(|i| !i.trim().is_empty())?;
    let Some(storage) = state.storage.as_ref() else {
        tracing::warn!(bucket, "image supplied but storage is not configured");
        return None;
    };
    match storage.upload_image(bucket, stem, image).await {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(bucket, error = %e, "image upload failed; continuing without it");
            None
        }
    }
}

fn build_profile(
    req: &SubmissionRequest,
    platform: Platform,
    profile_photo_url: Option<String>,
    header_image_url: Option<String>,
) -> NewProfile {
    let handle = sanitize_handle(&req.handle);
    let secondary = |h: Option<&String>| non_blank(h).map(sanitize_handle);
    let mut profile = NewProfile {
        primary_platform: platform.label().to_string(),
        primary_handle: handle.clone(),
        instagram_handle: secondary(req.instagram_handle.as_ref()),
        tiktok_handle: secondary(req.tiktok_handle.as_ref()),
        twitter_handle: secondary(req.twitter_handle.as_ref()),
        full_name: sanitize_string(&req.full_name),
        category: req.category.clone(),
        location: req.location.clone(),
        bio: sanitize_string(&req.bio),
        portfolio_url: req
            .portfolio_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(ToOwned::to_owned),
        profile_photo_url,
        header_image_url,
        ..NewProfile::default()
    };
    match platform {
        Platform::Instagram => profile.instagram_handle = Some(handle),
        Platform::TikTok => profile.tiktok_handle = Some(handle),
        Platform::Twitter => profile.twitter_handle = Some(handle),
    }
    profile
}

/// Returns the links to store, or `None` when any non-empty URL is invalid.
fn collect_links(links: &[SocialLinkInput]) -> Option<Vec<NewSocialLink>> {
    links
        .iter()
        .filter(|l| !l.url.trim().is_empty())
        .map(|l| {
            validate_url(&l.url).valid.then(|| NewSocialLink {
                platform: sanitize_string(&l.platform),
                url: l.url.trim().to_string(),
            })
        })
        .collect()
}

/// Validates, rate-limits, and stores a public submission as `pending`.
///
/// # Errors
///
/// - [`SubmissionError::Validation`] for any field rule.
/// - [`SubmissionError::RateLimited`] once `client` exhausts its budget.
/// - [`SubmissionError::Store`] if the profile insert fails.
pub async fn submit_profile(
    state: &AppState,
    client: &str,
    req: SubmissionRequest,
) -> Result<SubmissionReceipt, SubmissionError> {
    let platform = validate_submission(&req)?;
    state
        .rate_limiter
        .check("submit-profile", client, RateLimitPolicy::SUBMISSION)
        .await?;

    let (profile_photo_url, header_image_url) = tokio::join!(
        upload_optional(
            state,
            PROFILE_PHOTOS_BUCKET,
            "profile",
            req.profile_photo_base64.as_deref()
        ),
        upload_optional(
            state,
            HEADER_IMAGES_BUCKET,
            "header",
            req.header_image_base64.as_deref()
        ),
    );

    let profile = build_profile(&req, platform, profile_photo_url, header_image_url);
    let profile_id = kreativa_db::insert_profile(&state.pool, &profile)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to insert submitted profile");
            SubmissionError::Store(e)
        })?;

    match collect_links(&req.social_links) {
        Some(links) if !links.is_empty() => {
            if let Err(e) = kreativa_db::insert_social_links(&state.pool, profile_id, &links).await
            {
                tracing::error!(%profile_id, error = %e, "failed to store social links");
            }
        }
        Some(_) => {}
        None => tracing::warn!(%profile_id, "invalid social link URL; links not stored"),
    }

    let notes = json!({ "platform": platform.label(), "category": req.category });
    if let Err(e) = kreativa_db::insert_submission_log(
        &state.pool,
        Some(profile_id),
        "submit_profile",
        None,
        Some(&notes),
    )
    .await
    {
        tracing::error!(%profile_id, error = %e, "failed to write submission audit entry");
    }

    tracing::info!(%profile_id, %platform, "profile submitted");
    Ok(SubmissionReceipt {
        profile_id,
        message: SUBMITTED_MESSAGE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{lazy_state, state_with_pool};

    fn valid_request() -> SubmissionRequest {
        SubmissionRequest {
            platform: "Instagram".to_string(),
            handle: "@ada.lens".to_string(),
            full_name: "Ada Obi".to_string(),
            category: "Photographers".to_string(),
            location: "Lagos".to_string(),
            bio: "Portrait photographer shooting in Lagos.".to_string(),
            ..SubmissionRequest::default()
        }
    }

    #[test]
    fn valid_request_passes() {
        assert_eq!(
            validate_submission(&valid_request()).expect("valid"),
            Platform::Instagram
        );
    }

    #[test]
    fn required_fields_are_reported_in_order() {
        let req = SubmissionRequest {
            handle: String::new(),
            full_name: String::new(),
            ..valid_request()
        };
        let err = validate_submission(&req).expect_err("missing handle");
        assert_eq!(err.to_string(), "Handle is required");

        let req = SubmissionRequest {
            bio: "   ".to_string(),
            ..valid_request()
        };
        let err = validate_submission(&req).expect_err("missing bio");
        assert_eq!(err.to_string(), "Bio is required");
    }

    #[test]
    fn bio_limit_matches_admin_edit_limit() {
        let at_limit = SubmissionRequest {
            bio: "b".repeat(BIO_MAX_CHARS),
            ..valid_request()
        };
        assert!(validate_submission(&at_limit).is_ok());

        let over = SubmissionRequest {
            bio: "b".repeat(BIO_MAX_CHARS + 1),
            ..valid_request()
        };
        let err = validate_submission(&over).expect_err("too long");
        assert_eq!(err.to_string(), "Bio must be 300 characters or less");

        let edit = kreativa_core::ProfileFields {
            bio: Some("b".repeat(BIO_MAX_CHARS + 1)),
            ..kreativa_core::ProfileFields::default()
        };
        assert_eq!(
            kreativa_core::validation::validate_profile(&edit).message(),
            err.to_string()
        );
    }

    #[test]
    fn closed_sets_and_handle_format_are_enforced() {
        let req = SubmissionRequest {
            handle: "ada lens".to_string(),
            ..valid_request()
        };
        assert_eq!(
            validate_submission(&req).expect_err("bad handle").to_string(),
            "Instagram handle contains invalid characters"
        );

        let req = SubmissionRequest {
            category: "Astronauts".to_string(),
            ..valid_request()
        };
        assert_eq!(
            validate_submission(&req).expect_err("bad category").to_string(),
            "Invalid category"
        );

        let req = SubmissionRequest {
            platform: "MySpace".to_string(),
            ..valid_request()
        };
        assert_eq!(
            validate_submission(&req).expect_err("bad platform").to_string(),
            "Invalid platform"
        );
    }

    #[test]
    fn blank_platform_defaults_to_instagram() {
        let req = SubmissionRequest {
            platform: String::new(),
            ..valid_request()
        };
        assert_eq!(validate_submission(&req).expect("valid"), Platform::Instagram);
    }

    #[test]
    fn profile_carries_handle_in_platform_column() {
        let req = SubmissionRequest {
            platform: "TikTok".to_string(),
            full_name: " <i>Ada</i> ".to_string(),
            portfolio_url: Some("  ".to_string()),
            ..valid_request()
        };
        let profile = build_profile(&req, Platform::TikTok, None, None);
        assert_eq!(profile.primary_platform, "TikTok");
        assert_eq!(profile.primary_handle, "ada.lens");
        assert_eq!(profile.tiktok_handle.as_deref(), Some("ada.lens"));
        assert!(profile.instagram_handle.is_none());
        assert_eq!(profile.full_name, "iAda/i");
        assert!(profile.portfolio_url.is_none());
    }

    #[test]
    fn markup_only_name_or_bio_counts_as_missing() {
        let req = SubmissionRequest {
            full_name: "<>".to_string(),
            bio: "<<>>".to_string(),
            ..valid_request()
        };
        let err = validate_submission(&req).expect_err("empty name");
        assert_eq!(err.to_string(), "Full name is required");

        let req = SubmissionRequest {
            bio: " <<>> ".to_string(),
            ..valid_request()
        };
        let err = validate_submission(&req).expect_err("empty bio");
        assert_eq!(err.to_string(), "Bio is required");
    }

    #[test]
    fn bio_limit_counts_the_stored_text() {
        let req = SubmissionRequest {
            bio: format!("<<<<<{}>>>>>", "b".repeat(BIO_MAX_CHARS)),
            ..valid_request()
        };
        assert!(validate_submission(&req).is_ok());
        assert_eq!(
            build_profile(&req, Platform::Instagram, None, None)
                .bio
                .chars()
                .count(),
            BIO_MAX_CHARS
        );
    }

    #[test]
    fn secondary_handles_are_validated_per_platform() {
        let req = SubmissionRequest {
            tiktok_handle: Some("ada lens".to_string()),
            twitter_handle: Some("   ".to_string()),
            ..valid_request()
        };
        assert_eq!(
            validate_submission(&req).expect_err("bad tiktok").to_string(),
            "TikTok handle contains invalid characters"
        );

        let req = SubmissionRequest {
            tiktok_handle: Some("@ada.moves".to_string()),
            twitter_handle: Some("   ".to_string()),
            ..valid_request()
        };
        assert!(validate_submission(&req).is_ok());
    }

    #[test]
    fn secondary_handles_fill_other_slots_and_primary_keeps_its_own() {
        let req = SubmissionRequest {
            platform: "Instagram".to_string(),
            instagram_handle: Some("@someone.else".to_string()),
            tiktok_handle: Some(" @ada.moves ".to_string()),
            twitter_handle: Some(String::new()),
            ..valid_request()
        };
        let profile = build_profile(&req, Platform::Instagram, None, None);
        assert_eq!(profile.instagram_handle.as_deref(), Some("ada.lens"));
        assert_eq!(profile.tiktok_handle.as_deref(), Some("ada.moves"));
        assert!(profile.twitter_handle.is_none());
    }

    #[test]
    fn one_bad_link_drops_all_links() {
        let links = vec![
            SocialLinkInput {
                platform: "Behance".to_string(),
                url: "https://behance.net/ada".to_string(),
            },
            SocialLinkInput {
                platform: "Blank".to_string(),
                url: "  ".to_string(),
            },
        ];
        assert_eq!(collect_links(&links).expect("valid").len(), 1);

        let mut bad = links;
        bad.push(SocialLinkInput {
            platform: "Site".to_string(),
            url: "ftp://ada".to_string(),
        });
        assert!(collect_links(&bad).is_none());
    }

    #[tokio::test]
    async fn invalid_submission_is_rejected_before_any_io() {
        // The lazy pool points at nothing; touching it would fail the test.
        let state = lazy_state();
        let req = SubmissionRequest {
            bio: String::new(),
            ..valid_request()
        };

        let err = submit_profile(&state, "203.0.113.7", req)
            .await
            .expect_err("missing bio");
        assert!(matches!(err, SubmissionError::Validation(_)));
        assert_eq!(err.to_string(), "Bio is required");
        assert_eq!(state.pool.size(), 0);

        // No rate-limit budget was consumed either.
        for _ in 0..RateLimitPolicy::SUBMISSION.max_requests {
            state
                .rate_limiter
                .check("submit-profile", "203.0.113.7", RateLimitPolicy::SUBMISSION)
                .await
                .expect("budget intact");
        }
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn failed_upload_stores_profile_without_image(pool: sqlx::PgPool) {
        use wiremock::matchers::{method, path_regex};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/storage/v1/object/profile-photos/.+"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let mut state = state_with_pool(pool.clone(), 0);
        state.storage = Some(std::sync::Arc::new(
            crate::storage::StorageClient::new(&server.uri(), "service-key", 5)
                .expect("storage client"),
        ));
        let req = SubmissionRequest {
            profile_photo_base64: Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
            ..valid_request()
        };

        let receipt = submit_profile(&state, "198.51.100.2", req)
            .await
            .expect("submitted");
        assert_eq!(receipt.message, SUBMITTED_MESSAGE);

        let row = kreativa_db::get_profile(&pool, receipt.profile_id)
            .await
            .expect("query")
            .expect("row");
        assert_eq!(row.status, "pending");
        assert!(row.profile_photo_url.is_none());
        assert_eq!(row.instagram_handle.as_deref(), Some("ada.lens"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn invalid_social_link_still_stores_profile(pool: sqlx::PgPool) {
        let state = state_with_pool(pool.clone(), 0);
        let req = SubmissionRequest {
            twitter_handle: Some("ada_writes".to_string()),
            social_links: vec![
                SocialLinkInput {
                    platform: "Behance".to_string(),
                    url: "https://behance.net/ada".to_string(),
                },
                SocialLinkInput {
                    platform: "Files".to_string(),
                    url: "ftp://files.example.com/ada".to_string(),
                },
            ],
            ..valid_request()
        };

        let receipt = submit_profile(&state, "198.51.100.9", req)
            .await
            .expect("submitted");

        let row = kreativa_db::get_profile(&pool, receipt.profile_id)
            .await
            .expect("query")
            .expect("profile stored");
        assert_eq!(row.status, "pending");
        assert_eq!(row.twitter_handle.as_deref(), Some("ada_writes"));
        let links = kreativa_db::list_social_links(&pool, receipt.profile_id)
            .await
            .expect("links query");
        assert!(links.is_empty());
    }
}
