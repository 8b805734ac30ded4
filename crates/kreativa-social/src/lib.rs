//! Follower/following/post counts for Instagram, `TikTok`, and Twitter
//! profiles via RapidAPI-hosted scrapers.

pub mod client;
pub mod error;
pub mod types;

pub use client::{fetch_all_platform_stats, SocialStatsClient};
pub use error::SocialError;
pub use types::{format_follower_count, AllPlatformStats, PlatformHandles, SocialStats};
