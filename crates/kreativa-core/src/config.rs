use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Placeholder value shipped in sample `.env` files; treated as "no key".
const GEMINI_PLACEHOLDER_KEY: &str = "your-gemini-api-key-here";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset for optional integrations.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("KREATIVA_ENV", "development"));

    let bind_addr = parse_addr("KREATIVA_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("KREATIVA_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("KREATIVA_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("KREATIVA_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("KREATIVA_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let http_timeout_secs = parse_u64("KREATIVA_HTTP_TIMEOUT_SECS", "30")?;
    let session_ttl_secs = parse_u64("KREATIVA_SESSION_TTL_SECS", "43200")?;
    let import_row_delay_ms = parse_u64("KREATIVA_IMPORT_ROW_DELAY_MS", "300")?;
    let public_cache_ttl_secs = parse_u64("KREATIVA_PUBLIC_CACHE_TTL_SECS", "60")?;

    let rapidapi_key = optional("RAPIDAPI_KEY");
    let gemini_api_key = optional("GEMINI_API_KEY").filter(|k| k != GEMINI_PLACEHOLDER_KEY);
    let gemini_model = or_default("GEMINI_MODEL", "gemini-2.0-flash");
    let supabase_url = optional("SUPABASE_URL");
    let supabase_service_key = optional("SUPABASE_SERVICE_ROLE_KEY");

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        http_timeout_secs,
        session_ttl_secs,
        import_row_delay_ms,
        public_cache_ttl_secs,
        rapidapi_key,
        gemini_api_key,
        gemini_model,
        supabase_url,
        supabase_service_key,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
