use kreativa_core::Platform;
use serde::Serialize;
use serde_json::Value;

use crate::error::SocialError;

/// Public stats for one social profile. Every field is optional because the
/// providers return sparse, inconsistently shaped payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SocialStats {
    pub followers: Option<i64>,
    pub following: Option<i64>,
    pub posts: Option<i64>,
    pub bio: Option<String>,
    pub profile_pic_url: Option<String>,
    pub display_name: Option<String>,
    pub verified: bool,
}

/// Handles to look up; `None` or blank entries are skipped.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PlatformHandles {
    pub instagram: Option<String>,
    pub tiktok: Option<String>,
    pub twitter: Option<String>,
}

/// Per-platform outcomes of [`crate::fetch_all_platform_stats`]. A platform
/// without a handle stays `None`.
#[derive(Debug, Default)]
pub struct AllPlatformStats {
    pub instagram: Option<Result<SocialStats, SocialError>>,
    pub tiktok: Option<Result<SocialStats, SocialError>>,
    pub twitter: Option<Result<SocialStats, SocialError>>,
}

/// Follows a path of object keys.
fn at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(key))
}

fn first_i64(value: &Value, paths: &[&[&str]]) -> Option<i64> {
    paths
        .iter()
        .find_map(|path| at(value, path).and_then(Value::as_i64))
}

fn first_str(value: &Value, paths: &[&[&str]]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| at(value, path).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

fn any_true(value: &Value, paths: &[&[&str]]) -> bool {
    paths
        .iter()
        .any(|path| at(value, path).and_then(Value::as_bool) == Some(true))
}

pub(crate) fn parse_instagram(body: &Value) -> SocialStats {
    let user = body.get("user").unwrap_or(body);
    SocialStats {
        followers: first_i64(user, &[&["follower_count"], &["edge_followed_by", "count"]]),
        following: first_i64(user, &[&["following_count"], &["edge_follow", "count"]]),
        posts: first_i64(
            user,
            &[&["media_count"], &["edge_owner_to_timeline_media", "count"]],
        ),
        bio: first_str(user, &[&["biography"]]),
        profile_pic_url: first_str(user, &[&["profile_pic_url_hd"], &["profile_pic_url"]]),
        display_name: first_str(user, &[&["full_name"]]),
        verified: any_true(user, &[&["is_verified"]]),
    }
}

pub(crate) fn parse_tiktok(body: &Value) -> SocialStats {
    let empty = Value::Null;
    let user = at(body, &["userInfo", "user"])
        .or_else(|| body.get("user"))
        .unwrap_or(&empty);
    let stats = at(body, &["userInfo", "stats"])
        .or_else(|| body.get("stats"))
        .unwrap_or(&empty);
    SocialStats {
        followers: first_i64(stats, &[&["followerCount"]]),
        following: first_i64(stats, &[&["followingCount"]]),
        posts: first_i64(stats, &[&["videoCount"]]),
        bio: first_str(user, &[&["signature"]]),
        profile_pic_url: first_str(user, &[&["avatarLarger"], &["avatarMedium"]]),
        display_name: first_str(user, &[&["nickname"]]),
        verified: any_true(user, &[&["verified"]]),
    }
}

pub(crate) fn parse_twitter(body: &Value) -> SocialStats {
    SocialStats {
        followers: first_i64(
            body,
            &[&["follower_count"], &["public_metrics", "followers_count"]],
        ),
        following: first_i64(
            body,
            &[&["following_count"], &["public_metrics", "following_count"]],
        ),
        posts: first_i64(
            body,
            &[&["statuses_count"], &["public_metrics", "tweet_count"]],
        ),
        bio: first_str(body, &[&["description"]]),
        // The default avatar is a 48px thumbnail; request the 400px rendition.
        profile_pic_url: first_str(body, &[&["profile_image_url_https"]])
            .map(|u| u.replace("_normal", "_400x400")),
        display_name: first_str(body, &[&["name"]]),
        verified: any_true(body, &[&["verified"], &["is_blue_verified"]]),
    }
}

pub(crate) fn parse_stats(platform: Platform, body: &Value) -> SocialStats {
    match platform {
        Platform::Instagram => parse_instagram(body),
        Platform::TikTok => parse_tiktok(body),
        Platform::Twitter => parse_twitter(body),
    }
}

/// Renders a follower count as `950`, `1.2K`, or `3.4M`; missing or zero
/// counts render as an en dash.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_follower_count(count: Option<i64>) -> String {
    match count {
        None | Some(0) => "\u{2013}".to_string(),
        Some(n) if n >= 1_000_000 => format!("{:.1}M", n as f64 / 1_000_000.0),
        Some(n) if n >= 1_000 => format!("{:.1}K", n as f64 / 1_000.0),
        Some(n) => n.to_string(),
    }
}
