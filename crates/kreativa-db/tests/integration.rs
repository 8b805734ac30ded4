//! Offline unit tests for kreativa-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::Utc;
use kreativa_core::{AppConfig, Category, Environment, Location, Platform};
use kreativa_db::{DbError, PoolConfig, ProfileRow};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use uuid::Uuid;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        http_timeout_secs: 30,
        session_ttl_secs: 3600,
        import_row_delay_ms: 0,
        public_cache_ttl_secs: 60,
        rapidapi_key: None,
        gemini_api_key: None,
        gemini_model: "gemini-2.0-flash".to_string(),
        supabase_url: None,
        supabase_service_key: None,
    }
}

fn profile_row() -> ProfileRow {
    ProfileRow {
        id: Uuid::new_v4(),
        primary_platform: "TikTok".to_string(),
        primary_handle: "ada.films".to_string(),
        instagram_handle: None,
        tiktok_handle: Some("ada.films".to_string()),
        twitter_handle: None,
        full_name: "Ada Films".to_string(),
        category: "Videographers".to_string(),
        location: "Port Harcourt".to_string(),
        bio: "Short films and music videos".to_string(),
        portfolio_url: None,
        profile_photo_url: None,
        header_image_url: None,
        follower_count: Some(1_200),
        following_count: None,
        posts_count: None,
        status: "approved".to_string(),
        rejection_reason: None,
        is_featured: false,
        rank_score: 0.0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        approved_at: Some(Utc::now()),
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn profile_row_converts_to_typed_summary() {
    let summary = profile_row().to_summary().expect("labels are valid");
    assert_eq!(summary.primary_platform, Platform::TikTok);
    assert_eq!(summary.category, Category::Videographers);
    assert_eq!(summary.location, Location::PortHarcourt);
    assert_eq!(summary.follower_count, Some(1_200));
}

#[test]
fn profile_row_with_unknown_category_fails_conversion() {
    let mut row = profile_row();
    row.category = "Sculptors".to_string();
    let err = row.to_summary().expect_err("unknown category");
    assert!(matches!(err, DbError::InvalidValue(_)));
}

#[test]
fn db_error_messages_are_stable() {
    assert_eq!(DbError::NotFound.to_string(), "record not found");
    assert_eq!(
        DbError::MissingDatabaseUrl.to_string(),
        "DATABASE_URL is not set"
    );
}
