//! Database operations for the `admin_users` table.
//!
//! Presence of an email here is the only authorization check for moderation.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from `admin_users`. `password_hash` is never serialized.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct AdminUserRow {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Argon2id hash of `password` under a fresh random salt, as a PHC string.
///
/// # Errors
///
/// Returns [`DbError::PasswordHash`] if the salt cannot be encoded or
/// hashing fails.
pub fn hash_password(password: &str) -> Result<String, DbError> {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| DbError::PasswordHash(e.to_string()))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Checks `password` against a stored PHC string. A malformed stored hash
/// never verifies.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Looks up an admin by email (case-insensitive).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_admin_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<AdminUserRow>, DbError> {
    let row = sqlx::query_as::<_, AdminUserRow>(
        "SELECT id, email, password_hash, name, role, created_at, last_login \
         FROM admin_users \
         WHERE lower(email) = lower($1)",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns `true` if `email` belongs to an admin.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn admin_exists(pool: &PgPool, email: &str) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM admin_users WHERE lower(email) = lower($1))",
    )
    .bind(email)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Creates an admin user, or updates name/role/password if the email exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn create_admin_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    name: &str,
    role: &str,
) -> Result<AdminUserRow, DbError> {
    let row = sqlx::query_as::<_, AdminUserRow>(
        "INSERT INTO admin_users (email, password_hash, name, role) \
         VALUES (lower($1), $2, $3, $4) \
         ON CONFLICT (email) DO UPDATE \
         SET password_hash = EXCLUDED.password_hash, name = EXCLUDED.name, role = EXCLUDED.role \
         RETURNING id, email, password_hash, name, role, created_at, last_login",
    )
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(role)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns all admins ordered by email.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_admin_users(pool: &PgPool) -> Result<Vec<AdminUserRow>, DbError> {
    let rows = sqlx::query_as::<_, AdminUserRow>(
        "SELECT id, email, password_hash, name, role, created_at, last_login \
         FROM admin_users \
         ORDER BY email",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Stamps `last_login` for the given admin.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no admin has that id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn touch_last_login(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE admin_users SET last_login = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
