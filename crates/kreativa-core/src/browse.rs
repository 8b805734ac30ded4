use serde::Deserialize;

use crate::profiles::{Category, Location, Platform, ProfileSummary};

/// Public directory filter. Empty fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowseFilter {
    pub search: Option<String>,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub platform: Option<Platform>,
}

impl BrowseFilter {
    /// Case-insensitive search over name, bio, and primary handle, combined
    /// with exact category/location/platform filters.
    #[must_use]
    pub fn matches(&self, profile: &ProfileSummary) -> bool {
        if self.category.is_some_and(|c| c != profile.category)
            || self.location.is_some_and(|l| l != profile.location)
            || self.platform.is_some_and(|p| p != profile.primary_platform)
        {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let needle = term.to_lowercase();
                [&profile.full_name, &profile.bio, &profile.primary_handle]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }

    /// Filters `profiles` and orders the result by follower count, highest
    /// first; profiles without a count sort last.
    #[must_use]
    pub fn apply(&self, profiles: &[ProfileSummary]) -> Vec<ProfileSummary> {
        let mut out: Vec<ProfileSummary> = profiles
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.follower_count.cmp(&a.follower_count));
        out
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn profile(name: &str, category: Category, followers: Option<i64>) -> ProfileSummary {
        ProfileSummary {
            id: Uuid::new_v4(),
            full_name: name.to_string(),
            primary_platform: Platform::Instagram,
            primary_handle: name.to_lowercase().replace(' ', "."),
            instagram_handle: None,
            tiktok_handle: None,
            twitter_handle: None,
            category,
            location: Location::Lagos,
            bio: format!("{name} makes things"),
            portfolio_url: None,
            profile_photo_url: None,
            header_image_url: None,
            follower_count: followers,
            following_count: None,
            posts_count: None,
            is_featured: false,
            approved_at: Some(Utc::now()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_filter_sorts_by_followers_desc() {
        let profiles = vec![
            profile("Low", Category::Writers, Some(10)),
            profile("None", Category::Writers, None),
            profile("High", Category::Writers, Some(5_000)),
        ];
        let out = BrowseFilter::default().apply(&profiles);
        let names: Vec<&str> = out.iter().map(|p| p.full_name.as_str()).collect();
        assert_eq!(names, vec!["High", "Low", "None"]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let p = profile("Ada Obi", Category::Photographers, None);
        let by_name = BrowseFilter {
            search: Some("ADA".to_string()),
            ..BrowseFilter::default()
        };
        let by_handle = BrowseFilter {
            search: Some("ada.obi".to_string()),
            ..BrowseFilter::default()
        };
        let miss = BrowseFilter {
            search: Some("zzz".to_string()),
            ..BrowseFilter::default()
        };
        assert!(by_name.matches(&p));
        assert!(by_handle.matches(&p));
        assert!(!miss.matches(&p));
    }

    #[test]
    fn facet_filters_are_exact() {
        let p = profile("Ada", Category::Photographers, None);
        let wrong_category = BrowseFilter {
            category: Some(Category::Writers),
            ..BrowseFilter::default()
        };
        let right = BrowseFilter {
            category: Some(Category::Photographers),
            location: Some(Location::Lagos),
            platform: Some(Platform::Instagram),
            search: Some("  ".to_string()),
        };
        assert!(!wrong_category.matches(&p));
        assert!(right.matches(&p));
    }
}
