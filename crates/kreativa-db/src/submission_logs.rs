//! Append-only audit trail in `submission_logs`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct SubmissionLogRow {
    pub id: Uuid,
    pub profile_id: Option<Uuid>,
    pub action: String,
    pub performed_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Appends an audit entry. `notes` is stored as serialized JSON text.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_submission_log(
    pool: &PgPool,
    profile_id: Option<Uuid>,
    action: &str,
    performed_by: Option<&str>,
    notes: Option<&serde_json::Value>,
) -> Result<Uuid, DbError> {
    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO submission_logs (profile_id, action, performed_by, notes) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(profile_id)
    .bind(action)
    .bind(performed_by)
    .bind(notes.map(ToString::to_string))
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns the newest entries first, optionally for one profile.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_submission_logs(
    pool: &PgPool,
    profile_id: Option<Uuid>,
    limit: i64,
) -> Result<Vec<SubmissionLogRow>, DbError> {
    let rows = sqlx::query_as::<_, SubmissionLogRow>(
        "SELECT id, profile_id, action, performed_by, notes, created_at \
         FROM submission_logs \
         WHERE ($1::uuid IS NULL OR profile_id = $1) \
         ORDER BY created_at DESC \
         LIMIT $2",
    )
    .bind(profile_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
