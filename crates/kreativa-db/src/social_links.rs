//! Database operations for the `social_links` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct SocialLinkRow {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub platform: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct NewSocialLink {
    pub platform: String,
    pub url: String,
}

/// Inserts all links for a profile in one transaction; either every link is
/// stored or none are.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails.
pub async fn insert_social_links(
    pool: &PgPool,
    profile_id: Uuid,
    links: &[NewSocialLink],
) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for link in links {
        sqlx::query("INSERT INTO social_links (profile_id, platform, url) VALUES ($1, $2, $3)")
            .bind(profile_id)
            .bind(&link.platform)
            .bind(&link.url)
            .execute(&mut *tx)
            .await?;
        inserted += 1;
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Returns the links for a profile, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_social_links(
    pool: &PgPool,
    profile_id: Uuid,
) -> Result<Vec<SocialLinkRow>, DbError> {
    let rows = sqlx::query_as::<_, SocialLinkRow>(
        "SELECT id, profile_id, platform, url, created_at \
         FROM social_links \
         WHERE profile_id = $1 \
         ORDER BY created_at",
    )
    .bind(profile_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
