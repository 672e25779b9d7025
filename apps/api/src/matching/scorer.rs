//! Scoring-service client: turns one (resume, posting) pair into a `MatchResult`.
//!
//! Never fails: transport errors become zero-score results and unparsable
//! answers become default results, so a single job cannot abort a batch.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::ScoringOracle;
use crate::matching::language::NO_OVERLAP_FACTOR;
use crate::matching::prompts::{SCORING_PROMPT_TEMPLATE, SCORING_SYSTEM_TEMPLATE};
use crate::matching::response_parser::recover_verdict;
use crate::models::job::{JobPosting, MatchResult};
use crate::models::language::LanguageSet;

/// Score used both for the no-overlap short-circuit and as the unparsable default base.
const FLOOR_SCORE: f64 = 0.1;

/// Language pre-processing computed by the orchestrator for one posting.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageAssessment {
    pub required: LanguageSet,
    pub factor: f64,
}

/// Character budgets respecting the oracle's context window.
#[derive(Debug, Clone, Copy)]
pub struct ScoringLimits {
    pub resume_chars: usize,
    pub description_chars: usize,
}

impl Default for ScoringLimits {
    fn default() -> Self {
        Self {
            resume_chars: 1500,
            description_chars: 1500,
        }
    }
}

#[derive(Clone)]
pub struct ScoringClient {
    oracle: Arc<dyn ScoringOracle>,
    limits: ScoringLimits,
}

impl ScoringClient {
    pub fn new(oracle: Arc<dyn ScoringOracle>, limits: ScoringLimits) -> Self {
        Self { oracle, limits }
    }

    pub async fn score(
        &self,
        resume_text: &str,
        job: &JobPosting,
        language: &LanguageAssessment,
    ) -> MatchResult {
        if language.factor <= NO_OVERLAP_FACTOR {
            debug!("Job {}: no language overlap, skipping oracle", job.id);
            return build_result(job, language, FLOOR_SCORE, "10%".to_string(), vec![], vec![]);
        }

        let prompt = build_scoring_prompt(resume_text, job, &self.limits);
        let system = SCORING_SYSTEM_TEMPLATE.replace("{json_only}", JSON_ONLY_INSTRUCTION);

        let text = match self.oracle.complete(&system, &prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Job {}: oracle call failed, scoring as zero: {e}", job.id);
                let mut result = build_result(job, language, 0.0, "0%".to_string(), vec![], vec![]);
                result.language_match = 0.0;
                return result;
            }
        };

        match recover_verdict(&text) {
            Some((stage, verdict)) => {
                debug!("Job {}: verdict recovered via {:?}", job.id, stage);
                let score = round2(verdict.score * language.factor);
                let percentage = (verdict.percentage * language.factor).round();
                build_result(
                    job,
                    language,
                    score,
                    format_percentage(percentage),
                    verdict.matching_keywords,
                    verdict.key_skills,
                )
            }
            None => {
                warn!(
                    "Job {}: unparsable oracle answer, using default score ({} chars)",
                    job.id,
                    text.len()
                );
                let score = round2(FLOOR_SCORE * language.factor);
                let percentage = (FLOOR_SCORE * 100.0 * language.factor).round();
                build_result(job, language, score, format_percentage(percentage), vec![], vec![])
            }
        }
    }
}

fn build_result(
    job: &JobPosting,
    language: &LanguageAssessment,
    score: f64,
    match_percentage: String,
    matching_keywords: Vec<String>,
    key_skills: Vec<String>,
) -> MatchResult {
    MatchResult {
        job: job.clone(),
        score,
        match_percentage,
        matching_keywords,
        key_skills,
        language_requirements: language.required.iter().copied().collect(),
        language_match: language.factor,
    }
}

fn build_scoring_prompt(resume_text: &str, job: &JobPosting, limits: &ScoringLimits) -> String {
    fill_template(
        SCORING_PROMPT_TEMPLATE,
        &[
            ("resume_text", truncate_chars(resume_text, limits.resume_chars)),
            ("job_title", job.title.as_str()),
            ("company", job.company.as_str()),
            ("location", job.location.as_str()),
            (
                "description",
                truncate_chars(&job.description, limits.description_chars),
            ),
        ],
    )
}

/// Substitutes `{name}` placeholders in one pass over the template.
/// Substituted values are never rescanned, and unknown `{...}` spans are kept.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut filled = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        filled.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let known = after.find('}').and_then(|close| {
            values
                .iter()
                .find(|(name, _)| *name == &after[..close])
                .map(|(_, value)| (*value, close))
        });
        match known {
            Some((value, close)) => {
                filled.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                filled.push('{');
                rest = after;
            }
        }
    }
    filled.push_str(rest);
    filled
}

/// Cuts `text` to at most `budget` characters on a char boundary.
pub fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn format_percentage(percentage: f64) -> String {
    format!("{}%", percentage.clamp(0.0, 100.0) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use crate::models::language::LanguageCode;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct CannedOracle {
        answer: Result<String, u16>,
        calls: AtomicUsize,
        last_prompt: Mutex<String>,
    }

    impl CannedOracle {
        fn ok(answer: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Ok(answer.to_string()),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(String::new()),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                answer: Err(status),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(String::new()),
            })
        }
    }

    #[async_trait]
    impl ScoringOracle for CannedOracle {
        async fn complete(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = prompt.to_string();
            match &self.answer {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(LlmError::Api {
                    status: *status,
                    message: "boom".to_string(),
                }),
            }
        }
    }

    fn job() -> JobPosting {
        JobPosting {
            id: "job-1".to_string(),
            title: "Rust Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            url: "https://jobs.example.com/1".to_string(),
            description: "Build async services in Rust.".to_string(),
        }
    }

    fn assessment(factor: f64, codes: &[LanguageCode]) -> LanguageAssessment {
        LanguageAssessment {
            required: codes.iter().copied().collect(),
            factor,
        }
    }

    const VERDICT: &str = r#"{"score": 0.8, "matchPercentage": "85%", "matchingKeywords": ["rust", "async", "tokio"], "keySkills": ["Rust", "Tokio", "SQL", "gRPC", "Linux"]}"#;

    #[tokio::test]
    async fn test_no_language_overlap_skips_oracle() {
        let oracle = CannedOracle::ok(VERDICT);
        let client = ScoringClient::new(oracle.clone(), ScoringLimits::default());

        let result = client
            .score("resume", &job(), &assessment(0.1, &[LanguageCode::German]))
            .await;

        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
        assert_eq!(result.score, 0.1);
        assert_eq!(result.match_percentage, "10%");
        assert!(result.matching_keywords.is_empty());
        assert!(result.key_skills.is_empty());
        assert_eq!(result.language_requirements, vec![LanguageCode::German]);
        assert_eq!(result.language_match, 0.1);
    }

    #[tokio::test]
    async fn test_verdict_is_scaled_by_language_factor() {
        let oracle = CannedOracle::ok(VERDICT);
        let client = ScoringClient::new(oracle.clone(), ScoringLimits::default());

        let result = client
            .score(
                "resume",
                &job(),
                &assessment(0.5, &[LanguageCode::English, LanguageCode::French]),
            )
            .await;

        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.score, 0.4);
        // 85 * 0.5 = 42.5 rounds independently of the score
        assert_eq!(result.match_percentage, "43%");
        assert_eq!(result.matching_keywords, vec!["rust", "async", "tokio"]);
        assert_eq!(result.key_skills.len(), 5);
        assert_eq!(result.language_match, 0.5);
        assert_eq!(result.job, job());
    }

    #[tokio::test]
    async fn test_full_language_match_keeps_oracle_score() {
        let client = ScoringClient::new(
            CannedOracle::ok(&format!("```json\n{VERDICT}\n```")),
            ScoringLimits::default(),
        );
        let result = client
            .score("resume", &job(), &assessment(1.0, &[LanguageCode::English]))
            .await;
        assert_eq!(result.score, 0.8);
        assert_eq!(result.match_percentage, "85%");
    }

    #[tokio::test]
    async fn test_unparsable_answer_uses_scaled_default() {
        let client = ScoringClient::new(
            CannedOracle::ok("Strong candidate, I'd say about eighty percent."),
            ScoringLimits::default(),
        );
        let result = client
            .score("resume", &job(), &assessment(0.5, &[LanguageCode::English]))
            .await;
        assert_eq!(result.score, 0.05);
        assert_eq!(result.match_percentage, "5%");
        assert!(result.matching_keywords.is_empty());
        assert_eq!(result.language_match, 0.5);
    }

    #[tokio::test]
    async fn test_transport_error_yields_zero_result() {
        let client = ScoringClient::new(CannedOracle::failing(503), ScoringLimits::default());
        let result = client
            .score("resume", &job(), &assessment(1.0, &[LanguageCode::English]))
            .await;
        assert_eq!(result.score, 0.0);
        assert_eq!(result.match_percentage, "0%");
        assert_eq!(result.language_match, 0.0);
        assert_eq!(result.language_requirements, vec![LanguageCode::English]);
    }

    #[tokio::test]
    async fn test_prompt_respects_character_budgets() {
        let oracle = CannedOracle::ok(VERDICT);
        let client = ScoringClient::new(
            oracle.clone(),
            ScoringLimits {
                resume_chars: 10,
                description_chars: 5,
            },
        );
        let mut posting = job();
        posting.description = "ABCDEFGHIJ".to_string();

        client
            .score(
                "0123456789-resume-tail",
                &posting,
                &assessment(1.0, &[LanguageCode::English]),
            )
            .await;

        let prompt = oracle.last_prompt.lock().unwrap().clone();
        assert!(prompt.contains("0123456789\n"));
        assert!(!prompt.contains("resume-tail"));
        assert!(prompt.contains("ABCDE"));
        assert!(!prompt.contains("ABCDEF"));
        assert!(prompt.contains("JOB TITLE: Rust Engineer"));
    }

    #[tokio::test]
    async fn test_placeholders_inside_resume_are_left_verbatim() {
        let oracle = CannedOracle::ok(VERDICT);
        let client = ScoringClient::new(oracle.clone(), ScoringLimits::default());

        client
            .score(
                "Templating work: {job_title} and {description} in Jinja",
                &job(),
                &assessment(1.0, &[LanguageCode::English]),
            )
            .await;

        let prompt = oracle.last_prompt.lock().unwrap().clone();
        assert!(prompt.contains("Templating work: {job_title} and {description} in Jinja"));
        assert!(prompt.contains("JOB TITLE: Rust Engineer"));
        assert!(prompt.contains("Build async services in Rust."));
        // the JSON shape in the instructions survives untouched
        assert!(prompt.contains("\"score\": 0.0"));
    }

    #[test]
    fn test_fill_template_keeps_unknown_braces() {
        let filled = fill_template("{a} {b} {x", &[("a", "{b}"), ("b", "2")]);
        assert_eq!(filled, "{b} 2 {x");
    }

    #[test]
    fn test_truncate_chars_respects_multibyte_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 50), "short");
        assert_eq!(truncate_chars("", 3), "");
    }
}
