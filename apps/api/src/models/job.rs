use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::language::LanguageCode;

/// A raw posting as handed over by the page extraction agent.
/// Only `id` is mandatory; every other field defaults to an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// One scored posting. Immutable once produced by a matching run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    #[serde(flatten)]
    pub job: JobPosting,
    /// Final score after the language factor is applied, 0.0 – 1.0.
    pub score: f64,
    /// "N%" as reported by the oracle, scaled by the language factor.
    pub match_percentage: String,
    pub matching_keywords: Vec<String>,
    pub key_skills: Vec<String>,
    pub language_requirements: Vec<LanguageCode>,
    pub language_match: f64,
}

/// Rejects job sets with blank or repeated ids.
pub fn validate_job_set(jobs: &[JobPosting]) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(jobs.len());
    for (index, job) in jobs.iter().enumerate() {
        if job.id.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "job at position {index} has an empty id"
            )));
        }
        if !seen.insert(job.id.as_str()) {
            return Err(AppError::Validation(format!(
                "duplicate job id '{}' in job set",
                job.id
            )));
        }
    }
    Ok(())
}
