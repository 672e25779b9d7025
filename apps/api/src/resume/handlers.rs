use std::time::Duration;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::matching::keywords::{clean_tokens, rank_tokens};
use crate::models::language::LanguageSet;
use crate::models::resume::{ResumeProfile, WeightedKeyword};
use crate::resume::extract::{decode_payload, extract_text};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResumeRequest {
    pub resume_data: String,
    #[serde(default)]
    pub spoken_languages: LanguageSet,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessedResume {
    pub text: String,
    pub tokens: Vec<String>,
    pub keywords: Vec<WeightedKeyword>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResumeResponse {
    pub success: bool,
    pub processed_resume: ProcessedResume,
}

/// POST /upload-resume
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Json(req): Json<UploadResumeRequest>,
) -> Result<Json<UploadResumeResponse>, AppError> {
    let bytes = decode_payload(&req.resume_data)?;
    let timeout = Duration::from_secs(state.config.extraction_timeout_secs);
    let text = extract_text(bytes, timeout).await?;

    let tokens = clean_tokens(&text);
    let keywords = rank_tokens(&tokens)?;
    info!(
        "Resume processed: {} chars, {} tokens, {} keywords",
        text.chars().count(),
        tokens.len(),
        keywords.len()
    );

    state
        .coordinator
        .set_resume(ResumeProfile::new(
            text.clone(),
            keywords.clone(),
            req.spoken_languages,
        ))
        .await;

    Ok(Json(UploadResumeResponse {
        success: true,
        processed_resume: ProcessedResume {
            text,
            tokens,
            keywords,
        },
    }))
}
