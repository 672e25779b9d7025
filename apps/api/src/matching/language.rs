//! Language requirement detection and the language match factor.
//!
//! A posting that says nothing about languages is treated as requiring
//! English, never as requiring nothing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::language::{LanguageCode, LanguageSet};

/// Factor returned when the candidate speaks none of the required languages.
pub const NO_OVERLAP_FACTOR: f64 = 0.1;
const PARTIAL_FLOOR: f64 = 0.5;

/// Canonical English name, native name and ASCII-folded native name per language.
const LANGUAGE_KEYWORDS: &[(LanguageCode, &[&str])] = &[
    (LanguageCode::English, &["english", "anglais", "englisch", "inglés", "ingles"]),
    (LanguageCode::French, &["french", "français", "francais"]),
    (LanguageCode::German, &["german", "deutsch"]),
    (LanguageCode::Spanish, &["spanish", "español", "espanol", "castellano"]),
    (LanguageCode::Italian, &["italian", "italiano"]),
    (LanguageCode::Portuguese, &["portuguese", "português", "portugues"]),
    (LanguageCode::Dutch, &["dutch", "nederlands", "flemish", "vlaams"]),
    (LanguageCode::Polish, &["polish", "polski"]),
    (LanguageCode::Swedish, &["swedish", "svenska"]),
    (LanguageCode::Danish, &["danish", "dansk"]),
    (LanguageCode::Norwegian, &["norwegian", "norsk"]),
    (LanguageCode::Finnish, &["finnish", "suomi"]),
    (LanguageCode::Czech, &["czech", "čeština", "cestina"]),
    (LanguageCode::Russian, &["russian", "русский", "russkiy"]),
    (LanguageCode::Turkish, &["turkish", "türkçe", "turkce"]),
    (LanguageCode::Arabic, &["arabic", "العربية", "arabiya"]),
    (LanguageCode::Hindi, &["hindi", "हिन्दी"]),
    (LanguageCode::Chinese, &["chinese", "mandarin", "cantonese", "中文", "zhongwen"]),
    (LanguageCode::Japanese, &["japanese", "日本語", "nihongo"]),
    (LanguageCode::Korean, &["korean", "한국어", "hangugeo"]),
];

/// Phrases that announce a language requirement without naming the language.
const SIGNAL_PHRASES: &[&str] = &[
    "fluent in",
    "fluency in",
    "native speaker",
    "native-level",
    "mother tongue",
    "working knowledge of",
    "business level",
    "business-level",
    "proficient in",
    "proficiency in",
    "language skills",
    "bilingual",
    "written and spoken",
    "spoken and written",
];

/// One compiled matcher per language. Word boundaries keep "german" out of
/// "germany" and "english" out of "englishtown"; scripts without word
/// separators fall back to plain containment.
static LANGUAGE_MATCHERS: Lazy<Vec<(LanguageCode, Vec<Matcher>)>> = Lazy::new(|| {
    LANGUAGE_KEYWORDS
        .iter()
        .map(|(code, variants)| (*code, variants.iter().map(|v| Matcher::new(v)).collect()))
        .collect()
});

enum Matcher {
    Word(Regex),
    Contains(&'static str),
}

impl Matcher {
    fn new(variant: &'static str) -> Self {
        if variant.is_ascii() {
            match Regex::new(&format!(r"\b{}\b", regex::escape(variant))) {
                Ok(re) => Matcher::Word(re),
                Err(_) => Matcher::Contains(variant),
            }
        } else {
            Matcher::Contains(variant)
        }
    }

    fn is_match(&self, haystack: &str) -> bool {
        match self {
            Matcher::Word(re) => re.is_match(haystack),
            Matcher::Contains(needle) => haystack.contains(needle),
        }
    }
}

/// Result of scanning a description, kept separate for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageScan {
    pub matched: LanguageSet,
    pub has_signal_phrase: bool,
}

pub fn scan_description(description: &str) -> LanguageScan {
    let text = description.to_lowercase();
    let matched = LANGUAGE_MATCHERS
        .iter()
        .filter(|(_, matchers)| matchers.iter().any(|m| m.is_match(&text)))
        .map(|(code, _)| *code)
        .collect();
    let has_signal_phrase = SIGNAL_PHRASES.iter().any(|p| text.contains(p));
    LanguageScan {
        matched,
        has_signal_phrase,
    }
}

/// Returns the languages a posting requires. Never empty.
pub fn detect_requirements(description: &str) -> LanguageSet {
    let scan = scan_description(description);
    if !scan.matched.is_empty() {
        return scan.matched;
    }
    if scan.has_signal_phrase {
        tracing::debug!("Language signal phrase without a named language, assuming English");
    }
    LanguageSet::from([LanguageCode::English])
}

/// Multiplicative compatibility factor in `[0.1, 1.0]`.
///
/// 1. no overlap → 0.1
/// 2. every required language covered → 1.0
/// 3. partial coverage → max(0.5, covered / required)
pub fn language_match(spoken: &LanguageSet, required: &LanguageSet) -> f64 {
    let covered = spoken.intersection(required).count();
    if covered == 0 {
        return NO_OVERLAP_FACTOR;
    }
    if covered >= required.len() {
        return 1.0;
    }
    PARTIAL_FLOOR.max(covered as f64 / required.len() as f64)
}
