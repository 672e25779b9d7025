// Prompt constants for job/resume scoring.

/// System prompt for the scoring oracle. `{json_only}` is filled from
/// `llm_client::prompts::JSON_ONLY_INSTRUCTION`.
pub const SCORING_SYSTEM_TEMPLATE: &str = "You are an expert technical recruiter who \
    evaluates how well a candidate's resume fits a single job posting. {json_only}";

/// Scoring prompt template.
/// Replace: {resume_text}, {job_title}, {company}, {location}, {description}
pub const SCORING_PROMPT_TEMPLATE: &str = r#"Evaluate the candidate below against the job posting.

Steps:
1. Identify 5-10 concrete requirement signals in the job description (skills, tools, domain knowledge, seniority).
2. For each signal, assess whether the resume demonstrates it.
3. Score overall coverage.

Return ONLY a JSON object with EXACTLY these fields:
{
  "score": 0.0,
  "matchPercentage": "0%",
  "matchingKeywords": ["3-5 keywords found in both resume and job"],
  "keySkills": ["the 5 most important skills for this job"]
}

Rules:
- "score" is a number between 0 and 1.
- "matchPercentage" is the same judgment as a whole-number percentage string, e.g. "72%".
- No text before or after the JSON object. No markdown. No LaTeX.

RESUME:
{resume_text}

JOB TITLE: {job_title}
COMPANY: {company}
LOCATION: {location}

JOB DESCRIPTION:
{description}"#;
