use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::matching::session::{paginate, Pagination, RankingPage};
use crate::models::job::{validate_job_set, JobPosting, MatchResult};
use crate::models::language::{spoken_or_default, LanguageSet};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct JobSetRequest {
    pub jobs: Vec<JobPosting>,
}

#[derive(Serialize)]
pub struct JobSetResponse {
    pub success: bool,
    pub count: usize,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StartMatchingRequest {
    pub display_batch_size: Option<usize>,
    /// Overrides the languages declared with the resume for this run.
    pub spoken_languages: Option<LanguageSet>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RevealMoreRequest {
    pub page_size: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchJobsRequest {
    pub resume_text: String,
    pub jobs: Vec<JobPosting>,
    /// Languages the candidate can work in.
    #[serde(default)]
    pub required_languages: LanguageSet,
    #[serde(default)]
    pub start: usize,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RankingResponse {
    pub success: bool,
    pub rankings: Vec<MatchResult>,
    pub pagination: Pagination,
}

impl From<RankingPage> for RankingResponse {
    fn from(page: RankingPage) -> Self {
        Self {
            success: true,
            rankings: page.rankings,
            pagination: page.pagination,
        }
    }
}

/// PUT /jobs
pub async fn handle_set_jobs(
    State(state): State<AppState>,
    Json(req): Json<JobSetRequest>,
) -> Result<Json<JobSetResponse>, AppError> {
    let count = req.jobs.len();
    state.coordinator.set_job_set(req.jobs).await?;
    Ok(Json(JobSetResponse {
        success: true,
        count,
    }))
}

/// DELETE /jobs
pub async fn handle_clear_jobs(State(state): State<AppState>) -> StatusCode {
    state.coordinator.clear().await;
    StatusCode::NO_CONTENT
}

/// POST /rankings/start
pub async fn handle_start_matching(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RankingResponse>, AppError> {
    let req: StartMatchingRequest = optional_body(&body)?;
    let display_batch_size =
        page_size(req.display_batch_size, state.config.display_batch_size, "displayBatchSize")?;
    let page = state
        .coordinator
        .start_matching(display_batch_size, req.spoken_languages)
        .await?;
    Ok(Json(page.into()))
}

/// POST /rankings/more
pub async fn handle_reveal_more(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RankingResponse>, AppError> {
    let req: RevealMoreRequest = optional_body(&body)?;
    let page_size = page_size(req.page_size, state.config.display_batch_size, "pageSize")?;
    Ok(Json(state.coordinator.reveal_more(page_size).await.into()))
}

/// GET /rankings
pub async fn handle_current_rankings(State(state): State<AppState>) -> Json<RankingResponse> {
    Json(state.coordinator.current_page().into())
}

/// DELETE /session
pub async fn handle_reset_session(State(state): State<AppState>) -> StatusCode {
    state.coordinator.reset().await;
    StatusCode::NO_CONTENT
}

/// POST /match-jobs
///
/// Stateless: scores the posted jobs against the posted resume text and
/// returns one slice. Touches neither the session nor the in-progress flag.
pub async fn handle_match_jobs(
    State(state): State<AppState>,
    Json(req): Json<MatchJobsRequest>,
) -> Result<Json<RankingResponse>, AppError> {
    if req.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resumeText must not be empty".to_string()));
    }
    if req.jobs.is_empty() {
        return Err(AppError::NoJobs);
    }
    validate_job_set(&req.jobs)?;
    let limit = page_size(req.limit, state.config.display_batch_size, "limit")?;

    let spoken = spoken_or_default(req.required_languages);
    info!(
        "Stateless match request: {} jobs, slice {}+{}",
        req.jobs.len(),
        req.start,
        limit
    );
    let results = state
        .orchestrator
        .rank(&req.resume_text, &req.jobs, &spoken)
        .await;

    Ok(Json(paginate(&results, req.start, limit).into()))
}

/// An empty body means "all defaults"; anything else must parse.
fn optional_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("malformed request body: {e}")))
}

fn page_size(requested: Option<usize>, default: usize, field: &str) -> Result<usize, AppError> {
    match requested {
        Some(0) => Err(AppError::Validation(format!("{field} must be at least 1"))),
        Some(size) => Ok(size),
        None => Ok(default),
    }
}
