use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Extension, Json,
};
use kreativa_db::StatsUpdate;
use kreativa_social::SocialStats;
use serde::{Deserialize, Serialize};

use crate::middleware::{client_key, AdminSession, RequestId};
use crate::moderation::{self, ActionResult, AdminProfilePage, ModerationError, ProfileEdit};
use crate::rate_limit::RateLimitPolicy;

use super::{map_db_error, map_moderation_error, ApiError, ApiResponse, AppState};

const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Debug, Deserialize)]
pub(super) struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub(super) struct LoginData {
    token: String,
    expires_in: u64,
    email: String,
    name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct AdminListQuery {
    status: Option<String>,
    page: Option<i64>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StatusRequest {
    status: String,
    rejection_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BulkRequest {
    ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SocialStatsQuery {
    #[serde(default)]
    platform: String,
    #[serde(default)]
    handle: String,
}

type ActionResponse = Result<Json<ApiResponse<ActionResult>>, ApiError>;

/// Mutating actions answer with `{ success: true }` or the error envelope.
fn action_response<T>(req_id: RequestId, result: &Result<T, ModerationError>) -> ActionResponse {
    match result {
        Ok(_) => Ok(Json(ApiResponse::new(ActionResult::OK, req_id.0))),
        Err(e) => Err(map_moderation_error(req_id.0, e)),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub(in crate::api) async fn login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginData>>, ApiError> {
    state
        .rate_limiter
        .check("admin-login", &client_key(&headers), RateLimitPolicy::LOGIN)
        .await
        .map_err(|e| ApiError::new(req_id.0.clone(), "rate_limited", e.to_string()))?;

    let email = body.email.trim();
    if email.is_empty() || body.password.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "Email and password are required",
        ));
    }

    let invalid = || ApiError::new(req_id.0.clone(), "unauthorized", "Invalid email or password");
    let admin = kreativa_db::get_admin_by_email(&state.pool, email)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(invalid)?;

    if !kreativa_db::verify_password(&body.password, &admin.password_hash) {
        tracing::warn!(email, "admin login rejected");
        return Err(invalid());
    }

    if let Err(e) = kreativa_db::touch_last_login(&state.pool, admin.id).await {
        tracing::warn!(error = %e, "failed to record last login");
    }
    let token = state.sessions.issue(&admin.email).await;
    tracing::info!(email = %admin.email, "admin logged in");

    Ok(Json(ApiResponse::new(
        LoginData {
            token,
            expires_in: state.sessions.ttl().as_secs(),
            email: admin.email,
            name: admin.name,
        },
        req_id.0,
    )))
}

pub(in crate::api) async fn logout(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AdminSession>,
) -> ActionResponse {
    state.sessions.revoke(&session.token).await;
    action_response::<()>(req_id, &Ok(()))
}

// ---------------------------------------------------------------------------
// Moderation
// ---------------------------------------------------------------------------

pub(in crate::api) async fn list_profiles(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AdminSession>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<ApiResponse<AdminProfilePage>>, ApiError> {
    let page = moderation::list_profiles(
        &state,
        &session.email,
        query.status.as_deref(),
        query.page.unwrap_or(1),
        query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    )
    .await
    .map_err(|e| map_moderation_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(page, req_id.0)))
}

pub(in crate::api) async fn approve_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
) -> ActionResponse {
    let result = moderation::approve_profile(&state, &session.email, &id).await;
    action_response(req_id, &result)
}

pub(in crate::api) async fn delete_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
) -> ActionResponse {
    let result = moderation::delete_profile(&state, &session.email, &id).await;
    action_response(req_id, &result)
}

pub(in crate::api) async fn update_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> ActionResponse {
    let result = moderation::update_status(
        &state,
        &session.email,
        &id,
        &body.status,
        body.rejection_reason.as_deref(),
    )
    .await;
    action_response(req_id, &result)
}

pub(in crate::api) async fn update_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
    Json(body): Json<ProfileEdit>,
) -> ActionResponse {
    let result = moderation::update_profile(&state, &session.email, &id, body).await;
    action_response(req_id, &result)
}

pub(in crate::api) async fn bulk_approve(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AdminSession>,
    Json(body): Json<BulkRequest>,
) -> ActionResponse {
    let result = moderation::bulk_approve(&state, &session.email, &body.ids).await;
    action_response(req_id, &result)
}

pub(in crate::api) async fn bulk_delete(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AdminSession>,
    Json(body): Json<BulkRequest>,
) -> ActionResponse {
    let result = moderation::bulk_delete(&state, &session.email, &body.ids).await;
    action_response(req_id, &result)
}

// ---------------------------------------------------------------------------
// Social stats
// ---------------------------------------------------------------------------

pub(in crate::api) async fn refresh_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<StatsUpdate>>, ApiError> {
    let stats = moderation::refresh_stats(&state, &session.email, &id)
        .await
        .map_err(|e| map_moderation_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(stats, req_id.0)))
}

pub(in crate::api) async fn social_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AdminSession>,
    Query(query): Query<SocialStatsQuery>,
) -> Result<Json<ApiResponse<SocialStats>>, ApiError> {
    let stats = moderation::lookup_stats(&state, &session.email, &query.platform, &query.handle)
        .await
        .map_err(|e| map_moderation_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(stats, req_id.0)))
}
