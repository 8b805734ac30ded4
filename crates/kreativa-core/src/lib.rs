pub mod app_config;
pub mod browse;
mod config;
pub mod inference;
pub mod profiles;
pub mod validation;

pub use app_config::{AppConfig, Environment};
pub use browse::BrowseFilter;
pub use config::{load_app_config, load_app_config_from_env};
pub use inference::{categorize, detect_category, detect_location, detect_platform};
pub use profiles::{
    CandidateProfile, CategorizedProfile, Category, Confidence, Location, Platform,
    ProfileFields, ProfileStatus, ProfileSummary,
};
pub use validation::{ValidationResult, BIO_MAX_CHARS};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid platform: {0}")]
    InvalidPlatform(String),
    #[error("invalid category: {0}")]
    InvalidCategory(String),
    #[error("invalid location: {0}")]
    InvalidLocation(String),
    #[error("invalid status: {0}")]
    InvalidStatus(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
