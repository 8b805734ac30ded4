//! Database operations for the `profiles` table.

use chrono::{DateTime, Utc};
use kreativa_core::{ProfileStatus, ProfileSummary};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const PROFILE_COLUMNS: &str = "id, primary_platform, primary_handle, instagram_handle, \
     tiktok_handle, twitter_handle, full_name, category, location, bio, portfolio_url, \
     profile_photo_url, header_image_url, follower_count, following_count, posts_count, \
     status, rejection_reason, is_featured, rank_score, created_at, updated_at, approved_at";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `profiles` table.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct ProfileRow {
    pub id: Uuid,
    pub primary_platform: String,
    pub primary_handle: String,
    pub instagram_handle: Option<String>,
    pub tiktok_handle: Option<String>,
    pub twitter_handle: Option<String>,
    pub full_name: String,
    pub category: String,
    pub location: String,
    pub bio: String,
    pub portfolio_url: Option<String>,
    pub profile_photo_url: Option<String>,
    pub header_image_url: Option<String>,
    pub follower_count: Option<i64>,
    pub following_count: Option<i64>,
    pub posts_count: Option<i64>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub is_featured: bool,
    pub rank_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl ProfileRow {
    /// Converts the stored labels into the typed public projection.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidValue`] if a stored platform, category, or
    /// location label is outside its closed set.
    pub fn to_summary(&self) -> Result<ProfileSummary, DbError> {
        Ok(ProfileSummary {
            id: self.id,
            full_name: self.full_name.clone(),
            primary_platform: self.primary_platform.parse()?,
            primary_handle: self.primary_handle.clone(),
            instagram_handle: self.instagram_handle.clone(),
            tiktok_handle: self.tiktok_handle.clone(),
            twitter_handle: self.twitter_handle.clone(),
            category: self.category.parse()?,
            location: self.location.parse()?,
            bio: self.bio.clone(),
            portfolio_url: self.portfolio_url.clone(),
            profile_photo_url: self.profile_photo_url.clone(),
            header_image_url: self.header_image_url.clone(),
            follower_count: self.follower_count,
            following_count: self.following_count,
            posts_count: self.posts_count,
            is_featured: self.is_featured,
            approved_at: self.approved_at,
            created_at: self.created_at,
        })
    }
}

/// Values for a new profile row. Rows are always inserted as `pending`.
#[derive(Debug, Clone, Default)]
pub struct NewProfile {
    pub primary_platform: String,
    pub primary_handle: String,
    pub instagram_handle: Option<String>,
    pub tiktok_handle: Option<String>,
    pub twitter_handle: Option<String>,
    pub full_name: String,
    pub category: String,
    pub location: String,
    pub bio: String,
    pub portfolio_url: Option<String>,
    pub profile_photo_url: Option<String>,
    pub header_image_url: Option<String>,
    pub follower_count: Option<i64>,
    pub following_count: Option<i64>,
    pub posts_count: Option<i64>,
}

/// Admin edit; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub primary_platform: Option<String>,
    pub primary_handle: Option<String>,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub instagram_handle: Option<String>,
    pub tiktok_handle: Option<String>,
    pub twitter_handle: Option<String>,
    pub portfolio_url: Option<String>,
    pub profile_photo_url: Option<String>,
    pub header_image_url: Option<String>,
}

/// Refreshed social stats; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct StatsUpdate {
    pub follower_count: Option<i64>,
    pub following_count: Option<i64>,
    pub posts_count: Option<i64>,
    pub bio: Option<String>,
    pub profile_photo_url: Option<String>,
}

/// One page of an admin listing plus the exact total across all pages.
#[derive(Debug, Clone)]
pub struct ProfilePage {
    pub rows: Vec<ProfileRow>,
    pub total: i64,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Inserts a `pending` profile and returns its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_profile(pool: &PgPool, profile: &NewProfile) -> Result<Uuid, DbError> {
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO profiles \
             (primary_platform, primary_handle, instagram_handle, tiktok_handle, twitter_handle, \
              full_name, category, location, bio, portfolio_url, profile_photo_url, \
              header_image_url, follower_count, following_count, posts_count, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, 'pending') \
         RETURNING id",
    )
    .bind(&profile.primary_platform)
    .bind(&profile.primary_handle)
    .bind(&profile.instagram_handle)
    .bind(&profile.tiktok_handle)
    .bind(&profile.twitter_handle)
    .bind(&profile.full_name)
    .bind(&profile.category)
    .bind(&profile.location)
    .bind(&profile.bio)
    .bind(&profile.portfolio_url)
    .bind(&profile.profile_photo_url)
    .bind(&profile.header_image_url)
    .bind(profile.follower_count)
    .bind(profile.following_count)
    .bind(profile.posts_count)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns a profile by id regardless of status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_profile(pool: &PgPool, id: Uuid) -> Result<Option<ProfileRow>, DbError> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns a profile by id only if it is approved.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_approved_profile(pool: &PgPool, id: Uuid) -> Result<Option<ProfileRow>, DbError> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1 AND status = 'approved'"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns every approved profile, most-followed first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_approved_profiles(pool: &PgPool) -> Result<Vec<ProfileRow>, DbError> {
    let rows = sqlx::query_as::<_, ProfileRow>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles \
         WHERE status = 'approved' \
         ORDER BY follower_count DESC NULLS LAST, created_at DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Admin listing, newest first, optionally restricted to one status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either query fails.
pub async fn list_profiles(
    pool: &PgPool,
    status: Option<ProfileStatus>,
    limit: i64,
    offset: i64,
) -> Result<ProfilePage, DbError> {
    let status = status.map(ProfileStatus::label);

    let rows = sqlx::query_as::<_, ProfileRow>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles \
         WHERE ($1::text IS NULL OR status = $1) \
         ORDER BY created_at DESC \
         LIMIT $2 OFFSET $3"
    ))
    .bind(status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM profiles WHERE ($1::text IS NULL OR status = $1)",
    )
    .bind(status)
    .fetch_one(pool)
    .await?;

    Ok(ProfilePage { rows, total })
}

/// Marks one profile approved. Returns `false` if no such profile exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn approve_profile(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE profiles \
         SET status = 'approved', approved_at = NOW(), rejection_reason = NULL, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Marks every listed profile approved; already-approved rows stay approved.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn approve_profiles(pool: &PgPool, ids: &[Uuid]) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE profiles \
         SET status = 'approved', approved_at = NOW(), rejection_reason = NULL, updated_at = NOW() \
         WHERE id = ANY($1)",
    )
    .bind(ids)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Sets the status. Approving stamps `approved_at`; rejecting records the
/// optional reason; any other status clears the reason.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_profile_status(
    pool: &PgPool,
    id: Uuid,
    status: ProfileStatus,
    rejection_reason: Option<&str>,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE profiles \
         SET status = $2, \
             updated_at = NOW(), \
             approved_at = CASE WHEN $2 = 'approved' THEN NOW() ELSE approved_at END, \
             rejection_reason = CASE WHEN $2 = 'rejected' THEN $3 ELSE NULL END \
         WHERE id = $1",
    )
    .bind(id)
    .bind(status.label())
    .bind(rejection_reason)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Applies an admin edit. Returns `false` if no such profile exists.
///
/// A new primary handle is also written to the handle column of the
/// resulting primary platform unless the edit sets that column itself.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_profile_fields(
    pool: &PgPool,
    id: Uuid,
    update: &ProfileUpdate,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE profiles \
         SET primary_platform = COALESCE($2, primary_platform), \
             primary_handle = COALESCE($3, primary_handle), \
             full_name = COALESCE($4, full_name), \
             bio = COALESCE($5, bio), \
             category = COALESCE($6, category), \
             location = COALESCE($7, location), \
             instagram_handle = COALESCE($8, \
                 CASE WHEN COALESCE($2, primary_platform) = 'Instagram' THEN $3 END, \
                 instagram_handle), \
             tiktok_handle = COALESCE($9, \
                 CASE WHEN COALESCE($2, primary_platform) = 'TikTok' THEN $3 END, \
                 tiktok_handle), \
             twitter_handle = COALESCE($10, \
                 CASE WHEN COALESCE($2, primary_platform) = 'Twitter' THEN $3 END, \
                 twitter_handle), \
             portfolio_url = COALESCE($11, portfolio_url), \
             profile_photo_url = COALESCE($12, profile_photo_url), \
             header_image_url = COALESCE($13, header_image_url), \
             updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(&update.primary_platform)
    .bind(&update.primary_handle)
    .bind(&update.full_name)
    .bind(&update.bio)
    .bind(&update.category)
    .bind(&update.location)
    .bind(&update.instagram_handle)
    .bind(&update.tiktok_handle)
    .bind(&update.twitter_handle)
    .bind(&update.portfolio_url)
    .bind(&update.profile_photo_url)
    .bind(&update.header_image_url)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Stores refreshed social stats. Returns `false` if no such profile exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_profile_stats(
    pool: &PgPool,
    id: Uuid,
    stats: &StatsUpdate,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE profiles \
         SET follower_count = COALESCE($2, follower_count), \
             following_count = COALESCE($3, following_count), \
             posts_count = COALESCE($4, posts_count), \
             bio = COALESCE($5, bio), \
             profile_photo_url = COALESCE($6, profile_photo_url), \
             updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(stats.follower_count)
    .bind(stats.following_count)
    .bind(stats.posts_count)
    .bind(&stats.bio)
    .bind(&stats.profile_photo_url)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Deletes one profile; its social links cascade.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_profile(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Deletes every listed profile and returns how many rows were removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_profiles(pool: &PgPool, ids: &[Uuid]) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM profiles WHERE id = ANY($1)")
        .bind(ids)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
