//! Committing reviewed import candidates as `pending` profiles.
//!
//! Rows are written one at a time with a fixed pause between them. Each admin
//! has their own cancel flag, checked before every row after the first; rows
//! committed before cancellation stay committed.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use kreativa_core::{
    validation::{sanitize_handle, sanitize_string},
    CategorizedProfile, Category, Confidence, Location, Platform, BIO_MAX_CHARS,
};
use kreativa_db::NewProfile;
use kreativa_social::SocialStats;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;

use crate::api::AppState;
use crate::moderation::{audit, authorize, ModerationError};

/// Cooperative cancel flags keyed by the email of the admin running the import.
#[derive(Debug, Clone, Default)]
pub struct ImportControl {
    flags: Arc<Mutex<HashMap<String, Arc<AtomicBool>>>>,
}

impl ImportControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags `email`'s running import. Returns `false` when none is running.
    pub async fn cancel(&self, email: &str) -> bool {
        match self.flags.lock().await.get(email) {
            Some(flag) => {
                flag.store(true, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    /// Registers a fresh flag for `email`, replacing any earlier one.
    async fn begin(&self, email: &str) -> Arc<AtomicBool> {
        let flag = Arc::new(AtomicBool::new(false));
        self.flags
            .lock()
            .await
            .insert(email.to_string(), Arc::clone(&flag));
        flag
    }

    /// Drops `flag` unless a newer import by the same admin replaced it.
    async fn finish(&self, email: &str, flag: &Arc<AtomicBool>) {
        let mut flags = self.flags.lock().await;
        if flags.get(email).is_some_and(|current| Arc::ptr_eq(current, flag)) {
            flags.remove(email);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub profile_ids: Vec<uuid::Uuid>,
    pub errors: Vec<String>,
}

/// Manual import: one shared platform/category/location for a list of handles.
#[derive(Debug, Clone, Deserialize)]
pub struct UsernameImport {
    pub usernames: Vec<String>,
    pub platform: Platform,
    pub category: Category,
    pub location: Location,
    #[serde(default)]
    pub fetch_stats: bool,
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Builds the insert for one candidate, folding in looked-up stats.
fn row_to_profile(row: &CategorizedProfile, handle: &str, stats: Option<&SocialStats>) -> NewProfile {
    let name = Some(sanitize_string(&row.name))
        .filter(|n| !n.is_empty())
        .or_else(|| stats.and_then(|s| s.display_name.clone()))
        .unwrap_or_else(|| handle.to_string());

    let bio = Some(sanitize_string(&row.bio))
        .filter(|b| !b.is_empty())
        .or_else(|| stats.and_then(|s| s.bio.as_deref().map(sanitize_string)))
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| format!("{} from {}", row.category, row.location));

    let mut profile = NewProfile {
        primary_platform: row.platform.label().to_string(),
        primary_handle: handle.to_string(),
        full_name: name,
        category: row.category.label().to_string(),
        location: row.location.label().to_string(),
        bio: truncate_chars(&bio, BIO_MAX_CHARS),
        profile_photo_url: stats.and_then(|s| s.profile_pic_url.clone()),
        follower_count: stats.and_then(|s| s.followers),
        following_count: stats.and_then(|s| s.following),
        posts_count: stats.and_then(|s| s.posts),
        ..NewProfile::default()
    };
    let handle = Some(handle.to_string());
    match row.platform {
        Platform::Instagram => profile.instagram_handle = handle,
        Platform::TikTok => profile.tiktok_handle = handle,
        Platform::Twitter => profile.twitter_handle = handle,
    }
    profile
}

async fn lookup(state: &AppState, platform: Platform, handle: &str) -> Option<SocialStats> {
    if !state.social.is_configured() {
        return None;
    }
    match state.social.fetch(platform, handle).await {
        Ok(stats) => Some(stats),
        Err(e) => {
            tracing::warn!(%platform, handle, error = %e, "stats lookup failed; importing basic data");
            None
        }
    }
}

/// Inserts every candidate as a `pending` profile.
///
/// # Errors
///
/// Fails only on authorization or rate limiting; per-row failures are
/// counted in the returned summary.
pub async fn commit_rows(
    state: &AppState,
    email: &str,
    rows: Vec<CategorizedProfile>,
    fetch_stats: bool,
) -> Result<ImportSummary, ModerationError> {
    authorize(state, email, "admin-import").await?;
    let cancel = state.imports.begin(email).await;

    let delay = Duration::from_millis(state.config.import_row_delay_ms);
    let mut summary = ImportSummary::default();

    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(delay).await;
            if cancel.load(Ordering::SeqCst) {
                tracing::info!(done = i, total = rows.len(), "import cancelled");
                summary.cancelled = true;
                break;
            }
        }

        let handle = sanitize_handle(&row.handle);
        if handle.is_empty() {
            summary.failed += 1;
            summary.errors.push(format!("{}: Invalid handle", row.handle));
            continue;
        }

        let stats = if fetch_stats {
            lookup(state, row.platform, &handle).await
        } else {
            None
        };
        let profile = row_to_profile(row, &handle, stats.as_ref());

        match kreativa_db::insert_profile(&state.pool, &profile).await {
            Ok(profile_id) => {
                audit(
                    state,
                    "import_profile",
                    Some(profile_id),
                    email,
                    &json!({ "handle": handle, "platform": row.platform.label() }),
                )
                .await;
                summary.imported += 1;
                summary.profile_ids.push(profile_id);
            }
            Err(e) => {
                tracing::error!(handle, error = %e, "failed to import profile");
                summary.failed += 1;
                summary.errors.push(format!("{handle}: Failed to import profile"));
            }
        }
    }

    state.imports.finish(email, &cancel).await;
    if summary.imported > 0 {
        state.public_cache.invalidate().await;
    }
    tracing::info!(
        imported = summary.imported,
        failed = summary.failed,
        cancelled = summary.cancelled,
        admin = email,
        "import finished"
    );
    Ok(summary)
}

/// Turns a manual handle list into candidates. Blank and repeated handles are
/// dropped; the handle doubles as the display name.
#[must_use]
pub fn username_rows(request: &UsernameImport) -> Vec<CategorizedProfile> {
    let mut seen = HashSet::new();
    request
        .usernames
        .iter()
        .map(|u| sanitize_handle(u))
        .filter(|h| !h.is_empty() && seen.insert(h.to_lowercase()))
        .map(|handle| CategorizedProfile {
            name: handle.clone(),
            handle,
            platform: request.platform,
            bio: String::new(),
            category: request.category,
            location: request.location,
            confidence: Confidence::Medium,
        })
        .collect()
}

/// # Errors
///
/// As [`commit_rows`]; also fails validation when no usable handle is given.
pub async fn import_usernames(
    state: &AppState,
    email: &str,
    request: UsernameImport,
) -> Result<ImportSummary, ModerationError> {
    let rows = username_rows(&request);
    if rows.is_empty() {
        return Err(ModerationError::Validation(
            "At least one username is required".into(),
        ));
    }
    commit_rows(state, email, rows, request.fetch_stats).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{seed_admin, state_with_pool, ADMIN_EMAIL};

    fn candidate(handle: &str, bio: &str) -> CategorizedProfile {
        CategorizedProfile {
            name: String::new(),
            handle: handle.to_string(),
            platform: Platform::TikTok,
            bio: bio.to_string(),
            category: Category::Videographers,
            location: Location::Kano,
            confidence: Confidence::Medium,
        }
    }

    #[tokio::test]
    async fn cancel_reaches_only_the_named_admin() {
        let control = ImportControl::new();
        assert!(!control.cancel(ADMIN_EMAIL).await);

        let flag = control.begin(ADMIN_EMAIL).await;
        assert!(!control.cancel("other@kreativa.test").await);
        assert!(!flag.load(Ordering::SeqCst));

        assert!(control.clone().cancel(ADMIN_EMAIL).await);
        assert!(flag.load(Ordering::SeqCst));

        control.finish(ADMIN_EMAIL, &flag).await;
        assert!(!control.cancel(ADMIN_EMAIL).await);
    }

    #[tokio::test]
    async fn finishing_a_replaced_import_keeps_the_newer_flag() {
        let control = ImportControl::new();
        let first = control.begin(ADMIN_EMAIL).await;
        let second = control.begin(ADMIN_EMAIL).await;
        control.finish(ADMIN_EMAIL, &first).await;

        assert!(control.cancel(ADMIN_EMAIL).await);
        assert!(second.load(Ordering::SeqCst));
        assert!(!first.load(Ordering::SeqCst));
    }

    #[test]
    fn empty_bio_falls_back_to_category_and_location() {
        let profile = row_to_profile(&candidate("tunde", ""), "tunde", None);
        assert_eq!(profile.bio, "Videographers from Kano");
        assert_eq!(profile.full_name, "tunde");
        assert_eq!(profile.tiktok_handle.as_deref(), Some("tunde"));
        assert!(profile.follower_count.is_none());
    }

    #[test]
    fn stats_fill_name_bio_and_counts() {
        let stats = SocialStats {
            followers: Some(0),
            posts: Some(12),
            bio: Some("Short films".to_string()),
            display_name: Some("Tunde A.".to_string()),
            ..SocialStats::default()
        };
        let profile = row_to_profile(&candidate("tunde", ""), "tunde", Some(&stats));
        assert_eq!(profile.full_name, "Tunde A.");
        assert_eq!(profile.bio, "Short films");
        assert_eq!(profile.follower_count, Some(0));
        assert_eq!(profile.posts_count, Some(12));
    }

    #[test]
    fn long_bio_is_truncated() {
        let profile = row_to_profile(&candidate("t", &"é".repeat(400)), "t", None);
        assert_eq!(profile.bio.chars().count(), BIO_MAX_CHARS);
    }

    #[test]
    fn username_rows_dedupe_and_sanitize() {
        let request = UsernameImport {
            usernames: vec![
                "@Ada".to_string(),
                "ada".to_string(),
                "  ".to_string(),
                "tunde.films".to_string(),
            ],
            platform: Platform::Instagram,
            category: Category::Photographers,
            location: Location::Lagos,
            fetch_stats: false,
        };
        let rows = username_rows(&request);
        let handles: Vec<&str> = rows.iter().map(|r| r.handle.as_str()).collect();
        assert_eq!(handles, vec!["Ada", "tunde.films"]);
        assert_eq!(rows[0].name, "Ada");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn commit_inserts_pending_rows_and_audits(pool: sqlx::PgPool) {
        seed_admin(&pool).await;
        let state = state_with_pool(pool.clone(), 0);

        let summary = commit_rows(
            &state,
            ADMIN_EMAIL,
            vec![candidate("tunde", "Short films"), candidate("@@@", "")],
            false,
        )
        .await
        .expect("commit");

        assert_eq!(summary.imported, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.cancelled);

        let row = kreativa_db::get_profile(&pool, summary.profile_ids[0])
            .await
            .expect("query")
            .expect("row");
        assert_eq!(row.status, "pending");
        assert_eq!(row.primary_platform, "TikTok");

        let logs = kreativa_db::list_submission_logs(&pool, Some(row.id), 10)
            .await
            .expect("logs");
        assert_eq!(logs[0].action, "import_profile");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn cancel_keeps_rows_committed_before_it(pool: sqlx::PgPool) {
        seed_admin(&pool).await;
        let state = state_with_pool(pool.clone(), 400);

        let control = state.imports.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            control.cancel(ADMIN_EMAIL).await;
        });

        let rows = vec![
            candidate("one", "first row"),
            candidate("two", "second row"),
            candidate("three", "third row"),
        ];
        let summary = commit_rows(&state, ADMIN_EMAIL, rows, false)
            .await
            .expect("commit");

        assert!(summary.cancelled);
        assert_eq!(summary.imported, 1);
        let page = kreativa_db::list_profiles(&pool, None, 10, 0)
            .await
            .expect("list");
        assert_eq!(page.total, 1);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn another_admins_cancel_leaves_the_import_running(pool: sqlx::PgPool) {
        seed_admin(&pool).await;
        let state = state_with_pool(pool.clone(), 100);

        let control = state.imports.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            control.cancel("other@kreativa.test").await;
        });

        let rows = vec![candidate("one", "first row"), candidate("two", "second row")];
        let summary = commit_rows(&state, ADMIN_EMAIL, rows, false)
            .await
            .expect("commit");

        assert!(!summary.cancelled);
        assert_eq!(summary.imported, 2);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn non_admin_cannot_import(pool: sqlx::PgPool) {
        let state = state_with_pool(pool, 0);
        let err = commit_rows(&state, "stranger@example.com", vec![candidate("a", "")], false)
            .await
            .expect_err("not an admin");
        assert!(matches!(err, ModerationError::Forbidden));
    }
}
