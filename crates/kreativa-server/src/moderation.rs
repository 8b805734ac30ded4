//! Admin moderation actions.
//!
//! Every action runs the same pipeline: authorize the session email against
//! `admin_users`, consume the admin rate-limit budget, validate input,
//! mutate, write an audit entry, and invalidate the public cache. The first
//! failing stage ends the action. Audit failures are logged and ignored.

use kreativa_core::{
    validation::{
        sanitize_handle, sanitize_string, validate_handle, validate_profile,
        validate_profile_id, validate_profile_ids, validate_status, validate_url,
        ValidationResult,
    },
    Platform, ProfileFields, ProfileStatus,
};
use kreativa_db::{DbError, ProfileRow, ProfileUpdate, StatsUpdate};
use kreativa_social::{fetch_all_platform_stats, PlatformHandles, SocialError, SocialStats};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::api::AppState;
use crate::rate_limit::{RateLimitExceeded, RateLimitPolicy};

pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Unauthorized: Admin access required")]
    Forbidden,
    #[error(transparent)]
    RateLimited(#[from] RateLimitExceeded),
    #[error("{0}")]
    Validation(String),
    #[error("Profile not found")]
    NotFound,
    /// Store failure; `message` is the generic text shown to the caller.
    #[error("{message}")]
    Store {
        message: &'static str,
        #[source]
        source: DbError,
    },
    #[error("{0}")]
    Upstream(String),
}

impl ModerationError {
    /// Error code understood by the HTTP error envelope.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ModerationError::Forbidden => "forbidden",
            ModerationError::RateLimited(_) => "rate_limited",
            ModerationError::Validation(_) => "validation_error",
            ModerationError::NotFound => "not_found",
            ModerationError::Store { .. } => "internal_error",
            ModerationError::Upstream(_) => "upstream_error",
        }
    }
}

/// `{ success: true }` body of a mutating action. Failures travel as the
/// error envelope instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    pub success: bool,
}

impl ActionResult {
    pub const OK: Self = Self { success: true };
}

fn store_error(message: &'static str) -> impl FnOnce(DbError) -> ModerationError {
    move |source| {
        tracing::error!(error = %source, "{message}");
        ModerationError::Store { message, source }
    }
}

/// Authorize and consume one unit of the admin budget for `action`.
pub(crate) async fn authorize(
    state: &AppState,
    email: &str,
    action: &str,
) -> Result<(), ModerationError> {
    authorize_with(state, email, action, RateLimitPolicy::ADMIN).await
}

pub(crate) async fn authorize_with(
    state: &AppState,
    email: &str,
    action: &str,
    policy: RateLimitPolicy,
) -> Result<(), ModerationError> {
    let is_admin = kreativa_db::admin_exists(&state.pool, email)
        .await
        .map_err(store_error("Failed to verify admin access"))?;
    if !is_admin {
        tracing::warn!(email, action, "session email is not an admin");
        return Err(ModerationError::Forbidden);
    }
    state.rate_limiter.check(action, email, policy).await?;
    Ok(())
}

pub(crate) fn parse_profile_id(id: &str) -> Result<Uuid, ModerationError> {
    let check = validate_profile_id(id);
    if !check.valid {
        return Err(ModerationError::Validation(check.message()));
    }
    Uuid::parse_str(id).map_err(|_| ModerationError::Validation("Invalid profile ID format".into()))
}

fn parse_profile_ids(ids: &[String]) -> Result<Vec<Uuid>, ModerationError> {
    let check = validate_profile_ids(ids);
    if !check.valid {
        return Err(ModerationError::Validation(check.message()));
    }
    ids.iter().map(|id| parse_profile_id(id)).collect()
}

pub(crate) async fn audit(
    state: &AppState,
    action: &str,
    profile_id: Option<Uuid>,
    email: &str,
    notes: &serde_json::Value,
) {
    if let Err(e) =
        kreativa_db::insert_submission_log(&state.pool, profile_id, action, Some(email), Some(notes))
            .await
    {
        tracing::error!(error = %e, action, "failed to write audit log entry");
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct AdminProfilePage {
    pub profiles: Vec<ProfileRow>,
    pub pagination: Pagination,
}

/// Lists profiles newest first, optionally filtered by status.
///
/// # Errors
///
/// Fails with [`ModerationError::Validation`] when `page < 1` or `limit` is
/// outside `1..=100`.
pub async fn list_profiles(
    state: &AppState,
    email: &str,
    status: Option<&str>,
    page: i64,
    limit: i64,
) -> Result<AdminProfilePage, ModerationError> {
    authorize(state, email, "admin-fetch").await?;

    if page < 1 || !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(ModerationError::Validation(
            "Invalid pagination parameters".into(),
        ));
    }
    let status = match status.filter(|s| !s.is_empty()) {
        Some(s) => {
            let check = validate_status(s);
            if !check.valid {
                return Err(ModerationError::Validation(check.message()));
            }
            s.parse::<ProfileStatus>().ok()
        }
        None => None,
    };

    let result = kreativa_db::list_profiles(&state.pool, status, limit, (page - 1) * limit)
        .await
        .map_err(store_error("Failed to fetch profiles"))?;

    Ok(AdminProfilePage {
        profiles: result.rows,
        pagination: Pagination {
            page,
            limit,
            total: result.total,
            total_pages: (result.total + limit - 1) / limit,
        },
    })
}

// ---------------------------------------------------------------------------
// Single-profile actions
// ---------------------------------------------------------------------------

/// # Errors
///
/// Pipeline failures, or [`ModerationError::NotFound`] for an unknown id.
pub async fn approve_profile(state: &AppState, email: &str, id: &str) -> Result<(), ModerationError> {
    authorize(state, email, "admin-approve").await?;
    let profile_id = parse_profile_id(id)?;

    let found = kreativa_db::approve_profile(&state.pool, profile_id)
        .await
        .map_err(store_error("Failed to approve profile"))?;
    if !found {
        return Err(ModerationError::NotFound);
    }

    audit(state, "approve_profile", Some(profile_id), email, &json!({ "profileId": id })).await;
    state.public_cache.invalidate().await;
    tracing::info!(%profile_id, admin = email, "profile approved");
    Ok(())
}

/// # Errors
///
/// Pipeline failures, or [`ModerationError::NotFound`] for an unknown id.
pub async fn delete_profile(state: &AppState, email: &str, id: &str) -> Result<(), ModerationError> {
    authorize(state, email, "admin-delete").await?;
    let profile_id = parse_profile_id(id)?;

    let found = kreativa_db::delete_profile(&state.pool, profile_id)
        .await
        .map_err(store_error("Failed to delete profile"))?;
    if !found {
        return Err(ModerationError::NotFound);
    }

    audit(state, "delete_profile", Some(profile_id), email, &json!({ "profileId": id })).await;
    state.public_cache.invalidate().await;
    tracing::info!(%profile_id, admin = email, "profile deleted");
    Ok(())
}

/// Sets any status. Moving to `approved` stamps `approved_at`; moving to
/// `rejected` stores `rejection_reason`.
///
/// # Errors
///
/// Pipeline failures, or [`ModerationError::NotFound`] for an unknown id.
pub async fn update_status(
    state: &AppState,
    email: &str,
    id: &str,
    status: &str,
    rejection_reason: Option<&str>,
) -> Result<(), ModerationError> {
    authorize(state, email, "admin-update-status").await?;
    let profile_id = parse_profile_id(id)?;
    let check = validate_status(status);
    if !check.valid {
        return Err(ModerationError::Validation(check.message()));
    }
    let parsed = status
        .parse::<ProfileStatus>()
        .map_err(|e| ModerationError::Validation(e.to_string()))?;
    let reason = rejection_reason
        .map(sanitize_string)
        .filter(|r| !r.is_empty());

    let found = kreativa_db::update_profile_status(&state.pool, profile_id, parsed, reason.as_deref())
        .await
        .map_err(store_error("Failed to update profile status"))?;
    if !found {
        return Err(ModerationError::NotFound);
    }

    audit(
        state,
        "update_profile_status",
        Some(profile_id),
        email,
        &json!({ "profileId": id, "status": status }),
    )
    .await;
    state.public_cache.invalidate().await;
    Ok(())
}

/// Admin edit payload. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileEdit {
    #[serde(flatten)]
    pub fields: ProfileFields,
    pub primary_platform: Option<String>,
    pub primary_handle: Option<String>,
    pub portfolio_url: Option<String>,
    pub profile_photo_url: Option<String>,
    pub header_image_url: Option<String>,
}

fn trimmed_url(url: Option<String>) -> Option<String> {
    url.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ProfileEdit {
    fn changed_fields(&self) -> Vec<&'static str> {
        let f = &self.fields;
        [
            ("primary_platform", self.primary_platform.is_some()),
            ("primary_handle", self.primary_handle.is_some()),
            ("full_name", f.full_name.is_some()),
            ("bio", f.bio.is_some()),
            ("category", f.category.is_some()),
            ("location", f.location.is_some()),
            ("instagram_handle", f.instagram_handle.is_some()),
            ("tiktok_handle", f.tiktok_handle.is_some()),
            ("twitter_handle", f.twitter_handle.is_some()),
            ("portfolio_url", self.portfolio_url.is_some()),
            ("profile_photo_url", self.profile_photo_url.is_some()),
            ("header_image_url", self.header_image_url.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }

    /// Strips markup from the free-text fields so validation sees exactly
    /// what will be stored.
    fn sanitized(mut self) -> Self {
        self.fields.full_name = self.fields.full_name.map(|v| sanitize_string(&v));
        self.fields.bio = self.fields.bio.map(|v| sanitize_string(&v));
        self
    }

    /// Validates every present field, collecting all errors.
    fn validate(&self) -> Result<Option<Platform>, ModerationError> {
        let mut check = validate_profile(&self.fields);

        let platform = match self.primary_platform.as_deref() {
            Some(raw) => match raw.trim().parse::<Platform>() {
                Ok(platform) => Some(platform),
                Err(_) => {
                    check.merge(ValidationResult::from_errors(vec![
                        "Invalid platform".to_string(),
                    ]));
                    None
                }
            },
            None => None,
        };
        if let Some(handle) = self.primary_handle.as_deref() {
            check.merge(validate_handle(
                handle,
                platform.map_or("Primary", Platform::label),
            ));
        }

        for url in [
            &self.portfolio_url,
            &self.profile_photo_url,
            &self.header_image_url,
        ] {
            if let Some(url) = url.as_deref().filter(|u| !u.trim().is_empty()) {
                check.merge(validate_url(url));
            }
        }

        if check.valid {
            Ok(platform)
        } else {
            Err(ModerationError::Validation(check.message()))
        }
    }

    fn into_update(self, platform: Option<Platform>) -> ProfileUpdate {
        let f = self.fields;
        let handle = |h: Option<String>| h.map(|h| sanitize_handle(&h)).filter(|h| !h.is_empty());
        ProfileUpdate {
            primary_platform: platform.map(|p| p.label().to_string()),
            primary_handle: handle(self.primary_handle),
            full_name: f.full_name,
            bio: f.bio,
            category: f.category,
            location: f.location,
            instagram_handle: handle(f.instagram_handle),
            tiktok_handle: handle(f.tiktok_handle),
            twitter_handle: handle(f.twitter_handle),
            portfolio_url: trimmed_url(self.portfolio_url),
            profile_photo_url: trimmed_url(self.profile_photo_url),
            header_image_url: trimmed_url(self.header_image_url),
        }
    }
}

/// Name and bio are sanitized before validation, so markup-only values are
/// rejected as empty rather than stored blank.
///
/// # Errors
///
/// Pipeline failures, or [`ModerationError::NotFound`] for an unknown id.
pub async fn update_profile(
    state: &AppState,
    email: &str,
    id: &str,
    edit: ProfileEdit,
) -> Result<(), ModerationError> {
    authorize(state, email, "admin-update-profile").await?;
    let profile_id = parse_profile_id(id)?;

    let edit = edit.sanitized();
    let platform = edit.validate()?;

    let changes = edit.changed_fields();
    let found = kreativa_db::update_profile_fields(&state.pool, profile_id, &edit.into_update(platform))
        .await
        .map_err(store_error("Failed to update profile"))?;
    if !found {
        return Err(ModerationError::NotFound);
    }

    audit(
        state,
        "update_profile",
        Some(profile_id),
        email,
        &json!({ "profileId": id, "changes": changes }),
    )
    .await;
    state.public_cache.invalidate().await;
    Ok(())
}

// ---------------------------------------------------------------------------
// Bulk actions
// ---------------------------------------------------------------------------

/// Approves every listed profile. Re-approving is harmless.
///
/// # Errors
///
/// Pipeline failures; unknown ids are not an error.
pub async fn bulk_approve(
    state: &AppState,
    email: &str,
    ids: &[String],
) -> Result<u64, ModerationError> {
    authorize(state, email, "admin-bulk-approve").await?;
    let profile_ids = parse_profile_ids(ids)?;

    let count = kreativa_db::approve_profiles(&state.pool, &profile_ids)
        .await
        .map_err(store_error("Failed to bulk approve profiles"))?;

    audit(
        state,
        "bulk_approve_profiles",
        None,
        email,
        &json!({ "profileIds": ids, "count": ids.len() }),
    )
    .await;
    state.public_cache.invalidate().await;
    tracing::info!(requested = ids.len(), approved = count, admin = email, "bulk approve");
    Ok(count)
}

/// # Errors
///
/// Pipeline failures; unknown ids are not an error.
pub async fn bulk_delete(
    state: &AppState,
    email: &str,
    ids: &[String],
) -> Result<u64, ModerationError> {
    authorize(state, email, "admin-bulk-delete").await?;
    let profile_ids = parse_profile_ids(ids)?;

    let count = kreativa_db::delete_profiles(&state.pool, &profile_ids)
        .await
        .map_err(store_error("Failed to bulk delete profiles"))?;

    audit(
        state,
        "bulk_delete_profiles",
        None,
        email,
        &json!({ "profileIds": ids, "count": ids.len() }),
    )
    .await;
    state.public_cache.invalidate().await;
    tracing::info!(requested = ids.len(), deleted = count, admin = email, "bulk delete");
    Ok(count)
}

// ---------------------------------------------------------------------------
// Social stats
// ---------------------------------------------------------------------------

/// Looks up one handle on one platform under the social-stats budget.
///
/// # Errors
///
/// Pipeline failures, or [`ModerationError::Upstream`] when the provider
/// lookup fails.
pub async fn lookup_stats(
    state: &AppState,
    email: &str,
    platform: &str,
    handle: &str,
) -> Result<SocialStats, ModerationError> {
    authorize_with(state, email, "social-stats", RateLimitPolicy::SOCIAL_STATS).await?;

    if platform.is_empty() || handle.trim().is_empty() {
        return Err(ModerationError::Validation(
            "Platform and handle are required".into(),
        ));
    }
    let platform = platform
        .parse::<Platform>()
        .map_err(|_| ModerationError::Validation("Invalid platform".into()))?;

    state
        .social
        .fetch(platform, handle)
        .await
        .map_err(|e| ModerationError::Upstream(e.to_string()))
}

fn handles_for(row: &ProfileRow) -> PlatformHandles {
    let mut handles = PlatformHandles {
        instagram: row.instagram_handle.clone(),
        tiktok: row.tiktok_handle.clone(),
        twitter: row.twitter_handle.clone(),
    };
    let slot = match row.primary_platform.as_str() {
        "TikTok" => &mut handles.tiktok,
        "Twitter" => &mut handles.twitter,
        _ => &mut handles.instagram,
    };
    if slot.as_deref().is_none_or(|h| h.trim().is_empty()) {
        *slot = Some(row.primary_handle.clone());
    }
    handles
}

/// Folds per-platform results into one update, primary platform first. For
/// each field the first present value wins, so a real zero is kept.
fn merge_stats(
    primary: &str,
    results: Vec<(Platform, Result<SocialStats, SocialError>)>,
) -> Option<StatsUpdate> {
    let mut ok: Vec<(Platform, SocialStats)> = results
        .into_iter()
        .filter_map(|(platform, r)| match r {
            Ok(stats) => Some((platform, stats)),
            Err(e) => {
                tracing::warn!(%platform, error = %e, "stats lookup failed");
                None
            }
        })
        .collect();
    if ok.is_empty() {
        return None;
    }
    ok.sort_by_key(|(platform, _)| platform.label() != primary);

    let first = |f: fn(&SocialStats) -> Option<i64>| ok.iter().find_map(|(_, s)| f(s));
    Some(StatsUpdate {
        follower_count: first(|s| s.followers),
        following_count: first(|s| s.following),
        posts_count: first(|s| s.posts),
        bio: None,
        profile_photo_url: ok.iter().find_map(|(_, s)| s.profile_pic_url.clone()),
    })
}

/// Re-fetches public stats for every handle on a profile and stores them.
///
/// # Errors
///
/// Pipeline failures, [`ModerationError::NotFound`] for an unknown id, or
/// [`ModerationError::Upstream`] when every lookup failed.
pub async fn refresh_stats(
    state: &AppState,
    email: &str,
    id: &str,
) -> Result<StatsUpdate, ModerationError> {
    authorize(state, email, "admin-refresh-stats").await?;
    state
        .rate_limiter
        .check("social-stats", email, RateLimitPolicy::SOCIAL_STATS)
        .await?;
    let profile_id = parse_profile_id(id)?;

    let row = kreativa_db::get_profile(&state.pool, profile_id)
        .await
        .map_err(store_error("Failed to load profile"))?
        .ok_or(ModerationError::NotFound)?;

    if !state.social.is_configured() {
        return Err(ModerationError::Upstream(SocialError::NotConfigured.to_string()));
    }

    let all = fetch_all_platform_stats(&state.social, &handles_for(&row)).await;
    let results: Vec<(Platform, Result<SocialStats, SocialError>)> = [
        (Platform::Instagram, all.instagram),
        (Platform::TikTok, all.tiktok),
        (Platform::Twitter, all.twitter),
    ]
    .into_iter()
    .filter_map(|(platform, r)| r.map(|r| (platform, r)))
    .collect();

    let update = merge_stats(&row.primary_platform, results)
        .ok_or_else(|| ModerationError::Upstream("No stats could be fetched".into()))?;

    kreativa_db::update_profile_stats(&state.pool, profile_id, &update)
        .await
        .map_err(store_error("Failed to save stats"))?;

    audit(
        state,
        "refresh_stats",
        Some(profile_id),
        email,
        &json!({ "profileId": id, "followers": update.follower_count }),
    )
    .await;
    state.public_cache.invalidate().await;
    Ok(update)
}
