use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::language::LanguageSet;

/// A single resume term with its TF-IDF weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedKeyword {
    pub term: String,
    pub weight: f64,
}

/// The active resume. Replaced wholesale on re-upload, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeProfile {
    pub raw_text: String,
    pub keywords: Vec<WeightedKeyword>,
    pub spoken_languages: LanguageSet,
    pub uploaded_at: DateTime<Utc>,
}

impl ResumeProfile {
    pub fn new(raw_text: String, keywords: Vec<WeightedKeyword>, spoken: LanguageSet) -> Self {
        Self {
            raw_text,
            keywords,
            spoken_languages: spoken,
            uploaded_at: Utc::now(),
        }
    }
}
