//! Recovery of a structured verdict from the oracle's free-text answer.
//!
//! The oracle is told to answer with bare JSON but regularly wraps it in
//! `\boxed{...}`, Markdown fences or prose. Strategies are tried in order and
//! each one either yields a verdict or reports failure; the caller supplies the
//! final default when every strategy fails.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const MAX_LIST_ITEMS: usize = 5;

/// The oracle's judgment before the language factor is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleVerdict {
    /// 0.0 – 1.0
    pub score: f64,
    /// 0 – 100, as reported (not rounded).
    pub percentage: f64,
    pub matching_keywords: Vec<String>,
    pub key_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(OracleVerdict),
    Failed,
}

/// Which strategy produced a verdict. Logged, and useful in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStage {
    /// Unwrapped envelope, greedy brace span.
    Envelope,
    /// Narrow span located by the expected field names.
    FieldSequence,
}

type Strategy = fn(&str) -> ParseOutcome;

const STRATEGIES: &[(RecoveryStage, Strategy)] = &[
    (RecoveryStage::Envelope, parse_envelope),
    (RecoveryStage::FieldSequence, parse_field_sequence),
];

static FIELD_SEQUENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)\{[^{}]*?"score"[^{}]*?"matchPercentage"[^{}]*?"matchingKeywords"[^{}]*?"keySkills"[^{}]*\}"#,
    )
    .expect("static regex")
});

/// Runs the strategies in order and returns the first verdict recovered.
pub fn recover_verdict(text: &str) -> Option<(RecoveryStage, OracleVerdict)> {
    STRATEGIES
        .iter()
        .find_map(|(stage, strategy)| match strategy(text) {
            ParseOutcome::Parsed(verdict) => Some((*stage, verdict)),
            ParseOutcome::Failed => None,
        })
}

/// Stage 1: strip `\boxed{}` and code fences, then parse the widest `{...}` span.
fn parse_envelope(text: &str) -> ParseOutcome {
    let unboxed = strip_boxed(text);
    let unfenced = strip_fences(unboxed);

    let (Some(start), Some(end)) = (unfenced.find('{'), unfenced.rfind('}')) else {
        return ParseOutcome::Failed;
    };
    if end < start {
        return ParseOutcome::Failed;
    }

    parse_object(&unfenced[start..=end])
}

/// Stage 2: find an object that lists the four expected fields in order.
fn parse_field_sequence(text: &str) -> ParseOutcome {
    FIELD_SEQUENCE
        .find_iter(text)
        .map(|m| parse_object(m.as_str()))
        .find(|outcome| matches!(outcome, ParseOutcome::Parsed(_)))
        .unwrap_or(ParseOutcome::Failed)
}

fn parse_object(candidate: &str) -> ParseOutcome {
    match serde_json::from_str::<Value>(candidate) {
        Ok(value) => verdict_from_value(&value)
            .map(ParseOutcome::Parsed)
            .unwrap_or(ParseOutcome::Failed),
        Err(_) => ParseOutcome::Failed,
    }
}

/// Returns the contents of the first `\boxed{...}`, or the input unchanged.
fn strip_boxed(text: &str) -> &str {
    const MARKER: &str = "\\boxed{";
    let Some(pos) = text.find(MARKER) else {
        return text;
    };
    let inner_start = pos + MARKER.len();
    let mut depth = 1usize;
    for (offset, ch) in text[inner_start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return &text[inner_start..inner_start + offset];
                }
            }
            _ => {}
        }
    }
    &text[inner_start..]
}

fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```JSON", "").replace("```", "")
}

/// Field-by-field defaults:
/// - `score` is required; a value in (1, 100] is read as a percentage; clamped to [0, 1]
/// - `matchPercentage` accepts "N%", "N" or a number; otherwise `score * 100`
/// - lists keep string entries only, at most five each; missing lists are empty
fn verdict_from_value(value: &Value) -> Option<OracleVerdict> {
    let object = value.as_object()?;

    let score = normalize_score(number_like(object.get("score")?)?)?;
    let percentage = object
        .get("matchPercentage")
        .and_then(number_like)
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, 100.0))
        .unwrap_or(score * 100.0);

    Some(OracleVerdict {
        score,
        percentage,
        matching_keywords: string_list(object.get("matchingKeywords")),
        key_skills: string_list(object.get("keySkills")),
    })
}

fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

fn normalize_score(raw: f64) -> Option<f64> {
    if !raw.is_finite() {
        return None;
    }
    let score = if raw > 1.0 && raw <= 100.0 {
        raw / 100.0
    } else {
        raw
    };
    Some(score.clamp(0.0, 1.0))
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .take(MAX_LIST_ITEMS)
                .collect()
        })
        .unwrap_or_default()
}
