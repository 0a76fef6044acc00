use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::meeting::MeetingDetails;
use crate::models::project::{Project, ProjectInput};
use crate::workflow::intake::{CreatedProject, ProjectOverview};
use crate::workflow::review::{DecisionOutcome, OverrideDraft, OverridePreview, ReviewPage};
use crate::AppState;

// ── Request DTOs ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct TokenParams {
    pub token: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct OverrideRequest {
    pub override_meeting_id: Option<String>,
}

// ── Token Gate Extractor ─────────────────────────────────────

/// The project behind the `?token=` of a client link. Rejects with
/// 401 before the handler runs when the token is missing or unknown.
pub struct TokenScope(pub Project);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for TokenScope {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<TokenParams>::try_from_uri(&parts.uri)
            .map_err(|_| AppError::InvalidToken)?;
        let project = state
            .workflow()
            .resolve_token(params.token.as_deref())
            .await?;
        Ok(TokenScope(project))
    }
}

// ── Client Handlers ──────────────────────────────────────────

/// GET /review?token= — pending recordings of the linked project
pub async fn client_review(
    State(state): State<Arc<AppState>>,
    TokenScope(project): TokenScope,
) -> Result<Json<ReviewPage>, AppError> {
    Ok(Json(state.workflow().review_page(&project, false).await?))
}

/// POST /review/recordings/:zoom_record_id/accept?token=
pub async fn client_accept(
    State(state): State<Arc<AppState>>,
    TokenScope(project): TokenScope,
    Path(zoom_record_id): Path<String>,
) -> Result<Json<DecisionOutcome>, AppError> {
    Ok(Json(state.workflow().accept(&project, &zoom_record_id).await?))
}

/// POST /review/recordings/:zoom_record_id/override?token=
pub async fn client_override(
    State(state): State<Arc<AppState>>,
    TokenScope(project): TokenScope,
    Path(zoom_record_id): Path<String>,
    body: Option<Json<OverrideRequest>>,
) -> Result<Json<DecisionOutcome>, AppError> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    let outcome = state
        .workflow()
        .submit_override(&project, &zoom_record_id, req.override_meeting_id.as_deref())
        .await?;
    Ok(Json(outcome))
}

/// POST /review/recordings/:zoom_record_id/preview?token=
pub async fn client_preview(
    State(state): State<Arc<AppState>>,
    TokenScope(project): TokenScope,
    Path(zoom_record_id): Path<String>,
    body: Option<Json<OverrideRequest>>,
) -> Result<Json<OverridePreview>, AppError> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    let preview = state
        .workflow()
        .preview_override(&project, &zoom_record_id, req.override_meeting_id.as_deref())
        .await?;
    Ok(Json(preview))
}

/// POST /review/recordings/:zoom_record_id/confirm?token=
pub async fn client_confirm(
    State(state): State<Arc<AppState>>,
    TokenScope(project): TokenScope,
    Path(zoom_record_id): Path<String>,
    body: Option<Json<OverrideDraft>>,
) -> Result<Json<DecisionOutcome>, AppError> {
    let draft = body.map(|Json(d)| d).unwrap_or_default();
    let outcome = state
        .workflow()
        .confirm_override(&project, &zoom_record_id, &draft)
        .await?;
    Ok(Json(outcome))
}

// ── Admin Handlers ───────────────────────────────────────────

/// GET /api/v1/projects — every project with its share link
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProjectOverview>>, AppError> {
    Ok(Json(state.workflow().overview().await?))
}

/// POST /api/v1/projects — intake form submission
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProjectInput>,
) -> Result<(StatusCode, Json<CreatedProject>), AppError> {
    let created = state.workflow().create_project(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/projects/:project_id/recordings
pub async fn project_review(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ReviewPage>, AppError> {
    let wf = state.workflow();
    let project = wf.resolve_project(project_id).await?;
    Ok(Json(wf.review_page(&project, true).await?))
}

/// POST /api/v1/projects/:project_id/recordings/:zoom_record_id/accept
pub async fn admin_accept(
    State(state): State<Arc<AppState>>,
    Path((project_id, zoom_record_id)): Path<(Uuid, String)>,
) -> Result<Json<DecisionOutcome>, AppError> {
    let wf = state.workflow();
    let project = wf.resolve_project(project_id).await?;
    Ok(Json(wf.accept(&project, &zoom_record_id).await?))
}

/// POST /api/v1/projects/:project_id/recordings/:zoom_record_id/override
pub async fn admin_override(
    State(state): State<Arc<AppState>>,
    Path((project_id, zoom_record_id)): Path<(Uuid, String)>,
    body: Option<Json<OverrideRequest>>,
) -> Result<Json<DecisionOutcome>, AppError> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    let wf = state.workflow();
    let project = wf.resolve_project(project_id).await?;
    let outcome = wf
        .submit_override(&project, &zoom_record_id, req.override_meeting_id.as_deref())
        .await?;
    Ok(Json(outcome))
}

/// POST /api/v1/projects/:project_id/recordings/:zoom_record_id/preview
pub async fn admin_preview(
    State(state): State<Arc<AppState>>,
    Path((project_id, zoom_record_id)): Path<(Uuid, String)>,
    body: Option<Json<OverrideRequest>>,
) -> Result<Json<OverridePreview>, AppError> {
    let req = body.map(|Json(b)| b).unwrap_or_default();
    let wf = state.workflow();
    let project = wf.resolve_project(project_id).await?;
    let preview = wf
        .preview_override(&project, &zoom_record_id, req.override_meeting_id.as_deref())
        .await?;
    Ok(Json(preview))
}

/// POST /api/v1/projects/:project_id/recordings/:zoom_record_id/confirm
pub async fn admin_confirm(
    State(state): State<Arc<AppState>>,
    Path((project_id, zoom_record_id)): Path<(Uuid, String)>,
    body: Option<Json<OverrideDraft>>,
) -> Result<Json<DecisionOutcome>, AppError> {
    let draft = body.map(|Json(d)| d).unwrap_or_default();
    let wf = state.workflow();
    let project = wf.resolve_project(project_id).await?;
    let outcome = wf.confirm_override(&project, &zoom_record_id, &draft).await?;
    Ok(Json(outcome))
}

/// GET /api/v1/meetings/:meeting_id — meeting platform lookup
pub async fn get_meeting(
    State(state): State<Arc<AppState>>,
    Path(meeting_id): Path<String>,
) -> Result<Json<MeetingDetails>, AppError> {
    Ok(Json(state.workflow().lookup_meeting(&meeting_id).await?))
}
