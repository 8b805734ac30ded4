mod admin;
mod import;
mod public;

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use kreativa_core::{AppConfig, Category, Location, Platform};
use kreativa_ingest::IngestService;
use kreativa_social::SocialStatsClient;
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::{
    cache::PublicProfileCache,
    import::ImportControl,
    middleware::{request_id, require_admin_session, RequestId},
    moderation::ModerationError,
    rate_limit::RateLimiter,
    session::SessionStore,
    storage::StorageClient,
};

/// Import uploads carry whole PDFs as base64 JSON.
const IMPORT_BODY_LIMIT: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub rate_limiter: RateLimiter,
    pub sessions: SessionStore,
    pub public_cache: PublicProfileCache,
    pub ingest: Arc<IngestService>,
    pub social: Arc<SocialStatsClient>,
    pub storage: Option<Arc<StorageClient>>,
    pub imports: ImportControl,
}

impl AppState {
    /// Wires the shared services from configuration. Optional integrations
    /// without credentials stay disabled.
    ///
    /// # Errors
    ///
    /// Fails if an HTTP client cannot be built or a configured base URL is
    /// invalid.
    pub fn from_config(pool: PgPool, config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let social = SocialStatsClient::new(config.rapidapi_key.as_deref(), config.http_timeout_secs)?;
        let ingest = IngestService::from_config(&config)?;
        let storage = match (&config.supabase_url, &config.supabase_service_key) {
            (Some(url), Some(key)) => Some(Arc::new(StorageClient::new(
                url,
                key,
                config.http_timeout_secs,
            )?)),
            _ => None,
        };

        tracing::info!(
            social_stats = social.is_configured(),
            ai = ingest.ai_enabled(),
            storage = storage.is_some(),
            "integrations configured"
        );

        Ok(Self {
            pool,
            rate_limiter: RateLimiter::new(),
            sessions: SessionStore::new(Duration::from_secs(config.session_ttl_secs)),
            public_cache: PublicProfileCache::new(Duration::from_secs(
                config.public_cache_ttl_secs,
            )),
            ingest: Arc::new(ingest),
            social: Arc::new(social),
            storage,
            imports: ImportControl::new(),
            config,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

#[derive(Debug, Serialize)]
struct MetaData {
    categories: Vec<&'static str>,
    locations: Vec<&'static str>,
    platforms: Vec<&'static str>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "forbidden" => StatusCode::FORBIDDEN,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 100)
}

pub(super) fn map_db_error(request_id: String, error: &kreativa_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

pub(super) fn map_moderation_error(request_id: String, error: &ModerationError) -> ApiError {
    ApiError::new(request_id, error.code(), error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn browse_router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/profiles", get(public::list_profiles))
        .route("/api/v1/profiles/{id}", get(public::get_profile))
        .route("/api/v1/meta", get(meta))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=60"),
        ))
}

fn protected_router(sessions: SessionStore) -> Router<AppState> {
    let import_routes = Router::new()
        .route("/api/v1/admin/import/csv", post(import::parse_csv))
        .route("/api/v1/admin/import/pdf", post(import::parse_pdf))
        .route("/api/v1/admin/import/text", post(import::parse_text))
        .route("/api/v1/admin/import/commit", post(import::commit))
        .route("/api/v1/admin/import/usernames", post(import::import_usernames))
        .route("/api/v1/admin/import/cancel", post(import::cancel))
        .layer(DefaultBodyLimit::max(IMPORT_BODY_LIMIT));

    Router::new()
        .route("/api/v1/admin/logout", post(admin::logout))
        .route("/api/v1/admin/profiles", get(admin::list_profiles))
        .route(
            "/api/v1/admin/profiles/bulk-approve",
            post(admin::bulk_approve),
        )
        .route(
            "/api/v1/admin/profiles/bulk-delete",
            post(admin::bulk_delete),
        )
        .route(
            "/api/v1/admin/profiles/{id}",
            put(admin::update_profile).delete(admin::delete_profile),
        )
        .route(
            "/api/v1/admin/profiles/{id}/approve",
            post(admin::approve_profile),
        )
        .route(
            "/api/v1/admin/profiles/{id}/status",
            put(admin::update_status),
        )
        .route(
            "/api/v1/admin/profiles/{id}/refresh-stats",
            post(admin::refresh_stats),
        )
        .route("/api/v1/admin/social-stats", get(admin::social_stats))
        .merge(import_routes)
        .layer(axum::middleware::from_fn_with_state(
            sessions,
            require_admin_session,
        ))
}

pub fn build_app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/submissions", post(public::submit))
        .route("/api/v1/admin/login", post(admin::login));

    Router::new()
        .merge(public_routes)
        .merge(browse_router())
        .merge(protected_router(state.sessions.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match kreativa_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

async fn meta(Extension(req_id): Extension<RequestId>) -> Json<ApiResponse<MetaData>> {
    Json(ApiResponse::new(
        MetaData {
            categories: Category::labels(),
            locations: Location::labels(),
            platforms: Platform::labels(),
        },
        req_id.0,
    ))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::{net::SocketAddr, sync::Arc, time::Duration};

    use kreativa_core::{AppConfig, Environment};
    use kreativa_ingest::IngestService;
    use kreativa_social::SocialStatsClient;
    use sqlx::{postgres::PgPoolOptions, PgPool};

    use super::AppState;
    use crate::{
        cache::PublicProfileCache, import::ImportControl, rate_limit::RateLimiter,
        session::SessionStore,
    };

    pub(crate) const ADMIN_EMAIL: &str = "admin@kreativa.test";
    pub(crate) const ADMIN_PASSWORD: &str = "correct horse battery";

    pub(crate) fn test_config(import_row_delay_ms: u64) -> AppConfig {
        AppConfig {
            database_url: "postgres://kreativa@127.0.0.1:1/kreativa".to_string(),
            env: Environment::Test,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            log_level: "warn".to_string(),
            db_max_connections: 2,
            db_min_connections: 0,
            db_acquire_timeout_secs: 1,
            http_timeout_secs: 5,
            session_ttl_secs: 3600,
            import_row_delay_ms,
            public_cache_ttl_secs: 60,
            rapidapi_key: None,
            gemini_api_key: None,
            gemini_model: kreativa_ingest::DEFAULT_MODEL.to_string(),
            supabase_url: None,
            supabase_service_key: None,
        }
    }

    pub(crate) fn state_with_pool(pool: PgPool, import_row_delay_ms: u64) -> AppState {
        let config = test_config(import_row_delay_ms);
        AppState {
            pool,
            rate_limiter: RateLimiter::new(),
            sessions: SessionStore::new(Duration::from_secs(config.session_ttl_secs)),
            public_cache: PublicProfileCache::new(Duration::from_secs(60)),
            ingest: Arc::new(IngestService::new(None)),
            social: Arc::new(SocialStatsClient::new(None, 5).expect("social client")),
            storage: None,
            imports: ImportControl::new(),
            config: Arc::new(config),
        }
    }

    /// A state whose pool never connects; any query against it fails fast.
    pub(crate) fn lazy_state() -> AppState {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(1))
            .connect_lazy("postgres://kreativa@127.0.0.1:1/kreativa")
            .expect("lazy pool");
        state_with_pool(pool, 0)
    }

    pub(crate) async fn seed_admin(pool: &PgPool) {
        kreativa_db::create_admin_user(
            pool,
            ADMIN_EMAIL,
            &kreativa_db::hash_password(ADMIN_PASSWORD).expect("hash"),
            "Test Admin",
            "admin",
        )
        .await
        .expect("seed admin");
    }
}
