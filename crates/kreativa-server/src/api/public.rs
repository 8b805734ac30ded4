use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use kreativa_core::{BrowseFilter, Category, Location, Platform, ProfileSummary};
use kreativa_db::SocialLinkRow;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::{client_key, RequestId};
use crate::submission::{submit_profile, SubmissionReceipt, SubmissionRequest};

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState};

#[derive(Debug, Default, Deserialize)]
pub(super) struct BrowseQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub platform: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct BrowsePagination {
    page: i64,
    limit: i64,
    total: usize,
    total_pages: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct BrowsePage {
    profiles: Vec<ProfileSummary>,
    pagination: BrowsePagination,
}

#[derive(Debug, Serialize)]
pub(super) struct ProfileDetail {
    #[serde(flatten)]
    profile: ProfileSummary,
    social_links: Vec<SocialLinkRow>,
}

/// Parses an optional closed-set label; blank means "no filter".
fn parse_label<T: std::str::FromStr>(
    req_id: &RequestId,
    raw: Option<&str>,
    message: &str,
) -> Result<Option<T>, ApiError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|_| ApiError::new(req_id.0.clone(), "validation_error", message)),
    }
}

impl BrowseQuery {
    fn filter(&self, req_id: &RequestId) -> Result<BrowseFilter, ApiError> {
        Ok(BrowseFilter {
            search: self.search.clone(),
            category: parse_label::<Category>(req_id, self.category.as_deref(), "Invalid category")?,
            location: parse_label::<Location>(req_id, self.location.as_deref(), "Invalid location")?,
            platform: parse_label::<Platform>(req_id, self.platform.as_deref(), "Invalid platform")?,
        })
    }
}

pub(super) async fn list_profiles(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<ApiResponse<BrowsePage>>, ApiError> {
    let filter = query.filter(&req_id)?;
    let page = query.page.unwrap_or(1).max(1);
    let limit = normalize_limit(query.limit);

    let approved = state
        .public_cache
        .approved_profiles(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let matched = filter.apply(&approved);

    let total = matched.len();
    let limit_usize = usize::try_from(limit).unwrap_or(1);
    let offset = usize::try_from(page - 1)
        .unwrap_or(0)
        .saturating_mul(limit_usize);
    let profiles = matched
        .into_iter()
        .skip(offset)
        .take(limit_usize)
        .collect();

    Ok(Json(ApiResponse::new(
        BrowsePage {
            profiles,
            pagination: BrowsePagination {
                page,
                limit,
                total,
                total_pages: total.div_ceil(limit_usize),
            },
        },
        req_id.0,
    )))
}

pub(super) async fn get_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ProfileDetail>>, ApiError> {
    let not_found = || ApiError::new(req_id.0.clone(), "not_found", "Profile not found");
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;

    let row = kreativa_db::get_approved_profile(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(not_found)?;
    let profile = row
        .to_summary()
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let social_links = kreativa_db::list_social_links(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        ProfileDetail {
            profile,
            social_links,
        },
        req_id.0,
    )))
}

pub(super) async fn submit(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    Json(body): Json<SubmissionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SubmissionReceipt>>), ApiError> {
    let receipt = submit_profile(&state, &client_key(&headers), body)
        .await
        .map_err(|e| ApiError::new(req_id.0.clone(), e.code(), e.to_string()))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(receipt, req_id.0))))
}
