//! Closed vocabularies (platform, category, location, status) and the
//! profile shapes shared between ingestion, storage, and the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// Declares a closed label set: the enum, its canonical display labels,
/// `ALL` in declaration order, and exact-match parsing.
macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $err:ident {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[must_use]
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            #[must_use]
            pub fn labels() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.label()).collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(CoreError::$err(other.to_string())),
                }
            }
        }
    };
}

label_enum! {
    /// Social platform a profile is primarily listed under.
    Platform, InvalidPlatform {
        Instagram => "Instagram",
        TikTok => "TikTok",
        Twitter => "Twitter",
    }
}

label_enum! {
    Category, InvalidCategory {
        Photographers => "Photographers",
        GraphicDesigners => "Graphic Designers",
        VisualArtists => "Visual Artists",
        FashionDesigners => "Fashion Designers",
        MakeupArtists => "Makeup Artists",
        ContentCreators => "Content Creators",
        Videographers => "Videographers",
        Illustrators => "Illustrators",
        CreativeDirectors => "Creative Directors",
        UiUxDesigners => "UI/UX Designers",
        MusicProducers => "Music Producers",
        Writers => "Writers",
        FashionStylists => "Fashion Stylists",
        ArtDirectors => "Art Directors",
        DigitalArtists => "Digital Artists",
    }
}

label_enum! {
    Location, InvalidLocation {
        Lagos => "Lagos",
        Abuja => "Abuja",
        PortHarcourt => "Port Harcourt",
        Ibadan => "Ibadan",
        Kano => "Kano",
        Enugu => "Enugu",
        BeninCity => "Benin City",
        Calabar => "Calabar",
        Jos => "Jos",
        Kaduna => "Kaduna",
        Other => "Other",
    }
}

label_enum! {
    /// Moderation state. Only `Approved` rows are publicly visible.
    ProfileStatus, InvalidStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

/// How much trust to place in an inferred category/location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// A profile extracted from an upload before the categorization pass.
///
/// `category` is set only when the upstream source (the AI extractor)
/// supplied a recognized label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub handle: String,
    pub platform: Platform,
    pub bio: String,
    pub category: Option<Category>,
}

/// A candidate after categorization, ready for admin review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedProfile {
    pub name: String,
    pub handle: String,
    pub platform: Platform,
    pub bio: String,
    pub category: Category,
    pub location: Location,
    pub confidence: Confidence,
}

/// Editable profile fields; absent fields are not validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileFields {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub instagram_handle: Option<String>,
    pub twitter_handle: Option<String>,
    pub tiktok_handle: Option<String>,
}

/// The public-facing projection of an approved profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: Uuid,
    pub full_name: String,
    pub primary_platform: Platform,
    pub primary_handle: String,
    pub instagram_handle: Option<String>,
    pub tiktok_handle: Option<String>,
    pub twitter_handle: Option<String>,
    pub category: Category,
    pub location: Location,
    pub bio: String,
    pub portfolio_url: Option<String>,
    pub profile_photo_url: Option<String>,
    pub header_image_url: Option<String>,
    pub follower_count: Option<i64>,
    pub following_count: Option<i64>,
    pub posts_count: Option<i64>,
    pub is_featured: bool,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_set_has_fifteen_labels_in_order() {
        let labels = Category::labels();
        assert_eq!(labels.len(), 15);
        assert_eq!(labels[0], "Photographers");
        assert_eq!(labels[9], "UI/UX Designers");
        assert_eq!(labels[14], "Digital Artists");
    }

    #[test]
    fn location_set_has_eleven_labels_ending_with_other() {
        assert_eq!(Location::ALL.len(), 11);
        assert_eq!(Location::ALL.last(), Some(&Location::Other));
    }

    #[test]
    fn labels_parse_exactly() {
        assert_eq!(
            "Port Harcourt".parse::<Location>().ok(),
            Some(Location::PortHarcourt)
        );
        assert!("port harcourt".parse::<Location>().is_err());
        assert_eq!("TikTok".parse::<Platform>().ok(), Some(Platform::TikTok));
        assert!(matches!(
            "Sculptors".parse::<Category>(),
            Err(CoreError::InvalidCategory(ref s)) if s == "Sculptors"
        ));
    }

    #[test]
    fn serde_uses_display_labels() {
        let json = serde_json::to_string(&Category::UiUxDesigners).expect("serialize");
        assert_eq!(json, "\"UI/UX Designers\"");
        let status: ProfileStatus = serde_json::from_str("\"approved\"").expect("deserialize");
        assert_eq!(status, ProfileStatus::Approved);
        let confidence = serde_json::to_string(&Confidence::Medium).expect("serialize");
        assert_eq!(confidence, "\"medium\"");
    }

    #[test]
    fn status_display_is_lowercase() {
        assert_eq!(ProfileStatus::Rejected.to_string(), "rejected");
    }
}
