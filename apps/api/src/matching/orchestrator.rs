//! Batch orchestrator: scores a whole job list in fixed-size concurrent batches.
//!
//! Flow per run: chunk postings → for each chunk, detect languages and score
//! every member concurrently (a chunk never exceeds the batch size) → pause →
//! next chunk. Results are reassembled in input order, then stable-sorted by score.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info};

use crate::llm_client::ScoringOracle;
use crate::matching::language::{detect_requirements, language_match};
use crate::matching::scorer::{LanguageAssessment, ScoringClient, ScoringLimits};
use crate::models::job::{JobPosting, MatchResult};
use crate::models::language::LanguageSet;

/// Tunables for one matching run.
#[derive(Debug, Clone)]
pub struct MatchSettings {
    /// Postings per batch, and the maximum number of concurrent oracle calls.
    pub batch_size: usize,
    /// Pause between consecutive batches to stay under the oracle's rate limit.
    pub batch_delay: Duration,
    pub limits: ScoringLimits,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            batch_size: 3,
            batch_delay: Duration::from_millis(1000),
            limits: ScoringLimits::default(),
        }
    }
}

#[derive(Clone)]
pub struct BatchOrchestrator {
    client: ScoringClient,
    settings: MatchSettings,
}

impl BatchOrchestrator {
    /// The scoring client takes its character budgets from `settings.limits`.
    pub fn new(oracle: Arc<dyn ScoringOracle>, settings: MatchSettings) -> Self {
        Self {
            client: ScoringClient::new(oracle, settings.limits),
            settings,
        }
    }

    /// Scores every posting and returns the ranking snapshot.
    /// Always yields exactly one result per input posting.
    pub async fn rank(
        &self,
        resume_text: &str,
        jobs: &[JobPosting],
        spoken: &LanguageSet,
    ) -> Vec<MatchResult> {
        let batch_size = self.settings.batch_size.max(1);
        let total_batches = jobs.len().div_ceil(batch_size);
        let mut results = Vec::with_capacity(jobs.len());

        for (index, batch) in jobs.chunks(batch_size).enumerate() {
            let scored =
                join_all(batch.iter().map(|job| self.score_one(resume_text, job, spoken))).await;
            results.extend(scored);

            info!(
                "Batch {}/{} scored ({} of {} jobs)",
                index + 1,
                total_batches,
                results.len(),
                jobs.len()
            );

            if index + 1 < total_batches && !self.settings.batch_delay.is_zero() {
                tokio::time::sleep(self.settings.batch_delay).await;
            }
        }

        sort_rankings(&mut results);
        results
    }

    async fn score_one(
        &self,
        resume_text: &str,
        job: &JobPosting,
        spoken: &LanguageSet,
    ) -> MatchResult {
        let required = detect_requirements(&job.description);
        let factor = language_match(spoken, &required);
        debug!(
            "Job {}: required={:?} spoken={:?} factor={}",
            job.id, required, spoken, factor
        );
        self.client
            .score(resume_text, job, &LanguageAssessment { required, factor })
            .await
    }
}

/// Descending by score; equal scores keep their input order.
pub fn sort_rankings(results: &mut [MatchResult]) {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
}
