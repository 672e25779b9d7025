//! Resume keyword extraction: pure TF-IDF ranking over the cleaned resume tokens.
//!
//! The resume is the only document in the corpus, so the smoothed idf
//! `1 + ln(N / (1 + df))` is a constant factor and the ranking follows raw
//! term frequency. Ties keep first-occurrence order.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::resume::WeightedKeyword;

pub const MAX_KEYWORDS: usize = 50;
const MIN_TOKEN_LEN: usize = 3;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("static regex"));

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "aren", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "could", "did", "didn", "do", "does", "doesn", "doing", "don",
    "down", "during", "each", "etc", "few", "for", "from", "further", "had", "has", "have",
    "having", "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "however",
    "i", "if", "in", "into", "is", "isn", "it", "its", "itself", "just", "me", "more", "most",
    "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other",
    "our", "ours", "ourselves", "out", "over", "own", "per", "same", "she", "should", "so",
    "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "upon", "us", "very", "via", "was", "we", "were", "what", "when", "where", "which", "while",
    "who", "whom", "why", "will", "with", "within", "without", "would", "you", "your", "yours",
    "yourself", "yourselves",
];

static STOP_WORD_SET: Lazy<std::collections::HashSet<&'static str>> =
    Lazy::new(|| STOP_WORDS.iter().copied().collect());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeywordError {
    #[error("resume text contains no usable keywords")]
    EmptyInput,
}

/// Lower-cases, tokenizes on word boundaries and drops stop-words, non-alphabetic
/// tokens and tokens shorter than three characters.
pub fn clean_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .filter(|t| t.chars().all(char::is_alphabetic))
        .filter(|t| !STOP_WORD_SET.contains(t))
        .map(str::to_string)
        .collect()
}

/// Ranks cleaned tokens by TF-IDF and returns at most [`MAX_KEYWORDS`] terms.
pub fn rank_tokens(tokens: &[String]) -> Result<Vec<WeightedKeyword>, KeywordError> {
    if tokens.is_empty() {
        return Err(KeywordError::EmptyInput);
    }

    // term -> (first position, count)
    let mut stats: HashMap<&str, (usize, u32)> = HashMap::new();
    for (position, token) in tokens.iter().enumerate() {
        stats
            .entry(token.as_str())
            .and_modify(|(_, count)| *count += 1)
            .or_insert((position, 1));
    }

    let documents = 1.0_f64;
    let idf = 1.0 + (documents / (1.0 + 1.0)).ln();

    let mut ranked: Vec<(usize, WeightedKeyword)> = stats
        .into_iter()
        .map(|(term, (first, count))| {
            (
                first,
                WeightedKeyword {
                    term: term.to_string(),
                    weight: count as f64 * idf,
                },
            )
        })
        .collect();

    ranked.sort_by(|(first_a, a), (first_b, b)| {
        b.weight
            .total_cmp(&a.weight)
            .then_with(|| first_a.cmp(first_b))
    });
    ranked.truncate(MAX_KEYWORDS);

    Ok(ranked.into_iter().map(|(_, kw)| kw).collect())
}
