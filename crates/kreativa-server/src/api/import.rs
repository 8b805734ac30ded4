use axum::{extract::State, Extension, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use kreativa_core::CategorizedProfile;
use kreativa_ingest::{FileUpload, ParsedFileResult};
use serde::Deserialize;

use crate::import::{self, ImportSummary, UsernameImport};
use crate::middleware::{AdminSession, RequestId};
use crate::moderation::{authorize, authorize_with, ActionResult, ModerationError};
use crate::rate_limit::RateLimitPolicy;

use super::{map_moderation_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct CsvUpload {
    content: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct PdfUpload {
    /// Base64 document bytes; a `data:` URL prefix is tolerated.
    data: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct TextUpload {
    text: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct CommitRequest {
    profiles: Vec<CategorizedProfile>,
    #[serde(default)]
    fetch_stats: bool,
}

type ParseResponse = Result<Json<ApiResponse<ParsedFileResult>>, ApiError>;
type ImportResponse = Result<Json<ApiResponse<ImportSummary>>, ApiError>;

async fn authorize_parse(state: &AppState, req_id: &RequestId, email: &str) -> Result<(), ApiError> {
    authorize_with(state, email, "ai-categorize", RateLimitPolicy::AI_CATEGORIZE)
        .await
        .map_err(|e| map_moderation_error(req_id.0.clone(), &e))
}

pub(in crate::api) async fn parse_csv(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AdminSession>,
    Json(body): Json<CsvUpload>,
) -> ParseResponse {
    authorize_parse(&state, &req_id, &session.email).await?;
    let result = state
        .ingest
        .process_file_upload(FileUpload::Csv(body.content))
        .await;
    Ok(Json(ApiResponse::new(result, req_id.0)))
}

pub(in crate::api) async fn parse_pdf(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AdminSession>,
    Json(body): Json<PdfUpload>,
) -> ParseResponse {
    authorize_parse(&state, &req_id, &session.email).await?;

    let encoded = body
        .data
        .split_once(";base64,")
        .map_or(body.data.as_str(), |(_, data)| data);
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| ApiError::new(req_id.0.clone(), "validation_error", "Invalid PDF data"))?;

    let result = state
        .ingest
        .process_file_upload(FileUpload::Pdf(bytes))
        .await;
    Ok(Json(ApiResponse::new(result, req_id.0)))
}

pub(in crate::api) async fn parse_text(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AdminSession>,
    Json(body): Json<TextUpload>,
) -> ParseResponse {
    authorize_parse(&state, &req_id, &session.email).await?;
    let result = state.ingest.process_text(&body.text).await;
    Ok(Json(ApiResponse::new(result, req_id.0)))
}

pub(in crate::api) async fn commit(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AdminSession>,
    Json(body): Json<CommitRequest>,
) -> ImportResponse {
    if body.profiles.is_empty() {
        return Err(map_moderation_error(
            req_id.0,
            &ModerationError::Validation("No profiles to import".into()),
        ));
    }
    let summary = import::commit_rows(&state, &session.email, body.profiles, body.fetch_stats)
        .await
        .map_err(|e| map_moderation_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse::new(summary, req_id.0)))
}

pub(in crate::api) async fn import_usernames(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AdminSession>,
    Json(body): Json<UsernameImport>,
) -> ImportResponse {
    let summary = import::import_usernames(&state, &session.email, body)
        .await
        .map_err(|e| map_moderation_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse::new(summary, req_id.0)))
}

pub(in crate::api) async fn cancel(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AdminSession>,
) -> Result<Json<ApiResponse<ActionResult>>, ApiError> {
    authorize(&state, &session.email, "admin-import-cancel")
        .await
        .map_err(|e| map_moderation_error(req_id.0.clone(), &e))?;
    let running = state.imports.cancel(&session.email).await;
    tracing::info!(admin = %session.email, running, "import cancel requested");
    Ok(Json(ApiResponse::new(ActionResult::OK, req_id.0)))
}
