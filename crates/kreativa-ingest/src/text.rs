//! Offline extraction of handles from pasted text, used when the AI
//! extractor is out of quota.
//!
//! Input is either a short dash-separated run (`A @a - B @b`) or one entry
//! per line. Lines such as `Photographers:` with no handle switch the
//! category applied to the entries that follow.

use std::sync::LazyLock;

use kreativa_core::{CandidateProfile, Category, Platform};
use regex::Regex;

const DASH_SPLIT_MAX_LINES: usize = 5;
const MIN_NAME_CHARS: usize = 2;

static HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([a-zA-Z0-9_.]+)").expect("valid handle regex"));
static COLON_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[•\-*]?\s*([^:@]+):").expect("valid colon-name regex"));
static LIST_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[•\-*\d.]+\s*").expect("valid list-prefix regex"));
static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*?\)").expect("valid parenthesized regex"));
static TRAILING_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[:,\-]$").expect("valid trailing-punct regex"));
static OPEN_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[(\[{]?").expect("valid open-bracket regex"));
static CLOSE_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[)\]}]?\s*$").expect("valid close-bracket regex"));
static PLATFORM_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(IG|TikTok|Twitter|/)+").expect("valid platform regex"));
static LEADING_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-:,]+\s*").expect("valid separator regex"));

const SECTION_HEADERS: &[(&str, Category)] = &[
    ("visual artists", Category::Photographers),
    ("photographers", Category::Photographers),
    ("fashion designers", Category::FashionDesigners),
    ("stylists", Category::FashionDesigners),
    ("digital content", Category::ContentCreators),
    ("creatives", Category::ContentCreators),
];

fn section_category(lower: &str) -> Option<Category> {
    SECTION_HEADERS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, category)| *category)
}

fn entry_platform(lower: &str) -> Platform {
    let mentions_ig = lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| w == "ig");
    if lower.contains("tiktok") {
        Platform::TikTok
    } else if lower.contains("twitter") && !mentions_ig {
        Platform::Twitter
    } else {
        Platform::Instagram
    }
}

fn entry_name(entry: &str, handle: &str) -> String {
    let raw = if let Some(caps) = COLON_NAME.captures(entry) {
        caps[1].trim().to_string()
    } else {
        let before = entry.split('@').next().unwrap_or_default();
        let before = LIST_PREFIX.replace(before, "");
        PARENTHESIZED.replace_all(&before, "").trim().to_string()
    };
    let name = TRAILING_PUNCT.replace(&raw, "").trim().to_string();

    if name.chars().count() < MIN_NAME_CHARS || name.to_lowercase().contains("creators") {
        handle.to_string()
    } else {
        name
    }
}

fn entry_bio(entry: &str, handle: &str) -> String {
    let token = format!("@{handle}");
    let after = entry.split(token.as_str()).nth(1).unwrap_or_default();
    let bio = OPEN_BRACKET.replace(after, "");
    let bio = CLOSE_BRACKET.replace(&bio, "");
    let bio = PLATFORM_PREFIX.replace(&bio, "");
    let bio = LEADING_SEPARATORS.replace(&bio, "");
    bio.trim().to_string()
}

/// Extracts every `@handle` entry from free text.
///
/// Entries start in the `Content Creators` category until a section header
/// switches it. Entries without an `@` are ignored.
#[must_use]
pub fn parse_text_with_regex(text: &str) -> Vec<CandidateProfile> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let line_count = normalized
        .split('\n')
        .filter(|l| !l.trim().is_empty())
        .count();

    let entries: Vec<&str> = if line_count <= DASH_SPLIT_MAX_LINES && normalized.contains(" - ") {
        normalized.split(" - ").collect()
    } else {
        normalized.split('\n').collect()
    };

    let mut current = Category::ContentCreators;
    let mut profiles = Vec::new();

    for entry in entries {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            continue;
        }
        let lower = trimmed.to_lowercase();
        if let Some(category) = section_category(&lower) {
            current = category;
        }
        if !trimmed.contains('@') {
            continue;
        }
        let Some(caps) = HANDLE.captures(trimmed) else {
            continue;
        };
        let handle = caps[1].to_string();

        profiles.push(CandidateProfile {
            name: entry_name(trimmed, &handle),
            bio: entry_bio(trimmed, &handle),
            platform: entry_platform(&lower),
            handle,
            category: Some(current),
        });
    }

    profiles
}
