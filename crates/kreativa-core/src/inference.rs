//! Keyword heuristics that assign a category, location, and platform to
//! free text. Rules are ordered and the first match wins.
//!
//! Triggers of three characters or fewer (`ui`, `ux`, `dp`, `ph`, `ig`) only
//! match whole words; longer triggers match anywhere in the lower-cased text.

use crate::profiles::{
    CandidateProfile, CategorizedProfile, Category, Confidence, Location, Platform,
};

const SHORT_TRIGGER_MAX: usize = 3;

const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::Photographers,
        &["photo", "camera", "portrait", "shoot", "visual"],
    ),
    (
        Category::FashionDesigners,
        &["fashion", "style", "design", "cloth", "wear", "stylist"],
    ),
    (
        Category::GraphicDesigners,
        &["graphic", "logo", "brand", "ui", "ux"],
    ),
    (
        Category::DigitalArtists,
        &["art", "paint", "draw", "illustrat", "digital art"],
    ),
    (
        Category::Videographers,
        &["video", "film", "cinema", "direct", "dp"],
    ),
    (
        Category::ContentCreators,
        &["music", "song", "beat", "producer"],
    ),
    (
        Category::Writers,
        &["writ", "author", "poet", "blog", "journal"],
    ),
];

const LOCATION_RULES: &[(Location, &[&str])] = &[
    (Location::Lagos, &["lagos"]),
    (Location::Abuja, &["abuja"]),
    (Location::PortHarcourt, &["port harcourt", "ph"]),
    (Location::Ibadan, &["ibadan"]),
    (Location::Kano, &["kano"]),
    (Location::Enugu, &["enugu"]),
    (Location::Calabar, &["calabar"]),
    (Location::BeninCity, &["benin"]),
    (Location::Kaduna, &["kaduna"]),
];

const PLATFORM_RULES: &[(Platform, &[&str])] = &[
    (Platform::TikTok, &["tiktok", "tik tok"]),
    (Platform::Twitter, &["twitter", "x.com"]),
    (Platform::Instagram, &["instagram", "ig"]),
];

pub const DEFAULT_CATEGORY: Category = Category::ContentCreators;
pub const DEFAULT_LOCATION: Location = Location::Lagos;

/// Lower-cased text plus its alphanumeric word tokens.
struct Haystack {
    text: String,
    words: Vec<String>,
}

impl Haystack {
    fn new(raw: &str) -> Self {
        let text = raw.to_lowercase();
        let words = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        Self { text, words }
    }

    fn hits(&self, trigger: &str) -> bool {
        if trigger.chars().count() <= SHORT_TRIGGER_MAX {
            self.words.iter().any(|w| w == trigger)
        } else {
            self.text.contains(trigger)
        }
    }

    fn first_match<T: Copy>(&self, rules: &[(T, &[&str])]) -> Option<T> {
        rules
            .iter()
            .find(|(_, triggers)| triggers.iter().any(|t| self.hits(t)))
            .map(|(value, _)| *value)
    }
}

#[must_use]
pub fn detect_category(text: &str) -> Category {
    Haystack::new(text)
        .first_match(CATEGORY_RULES)
        .unwrap_or(DEFAULT_CATEGORY)
}

#[must_use]
pub fn detect_location(text: &str) -> Location {
    Haystack::new(text)
        .first_match(LOCATION_RULES)
        .unwrap_or(DEFAULT_LOCATION)
}

/// Returns `None` when no platform keyword is present; callers usually
/// default to [`Platform::Instagram`].
#[must_use]
pub fn detect_platform(text: &str) -> Option<Platform> {
    Haystack::new(text).first_match(PLATFORM_RULES)
}

/// Second-pass categorization applied to every candidate regardless of how
/// it was extracted.
///
/// An upstream category is kept; otherwise one is inferred from name, handle,
/// and bio. Location is always inferred. Keyword matching never earns more
/// than `medium` confidence.
#[must_use]
pub fn categorize(candidates: Vec<CandidateProfile>) -> Vec<CategorizedProfile> {
    candidates
        .into_iter()
        .map(|c| {
            let text = format!("{} {} {}", c.name, c.handle, c.bio);
            let category = c.category.unwrap_or_else(|| detect_category(&text));
            CategorizedProfile {
                location: detect_location(&text),
                name: c.name,
                handle: c.handle,
                platform: c.platform,
                bio: c.bio,
                category,
                confidence: Confidence::Medium,
            }
        })
        .collect()
}
