use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// ISO 639-1 codes for the languages the requirement detector knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "nl")]
    Dutch,
    #[serde(rename = "pl")]
    Polish,
    #[serde(rename = "sv")]
    Swedish,
    #[serde(rename = "da")]
    Danish,
    #[serde(rename = "no")]
    Norwegian,
    #[serde(rename = "fi")]
    Finnish,
    #[serde(rename = "cs")]
    Czech,
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "tr")]
    Turkish,
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
}

impl LanguageCode {
    pub fn code(self) -> &'static str {
        match self {
            LanguageCode::English => "en",
            LanguageCode::French => "fr",
            LanguageCode::German => "de",
            LanguageCode::Spanish => "es",
            LanguageCode::Italian => "it",
            LanguageCode::Portuguese => "pt",
            LanguageCode::Dutch => "nl",
            LanguageCode::Polish => "pl",
            LanguageCode::Swedish => "sv",
            LanguageCode::Danish => "da",
            LanguageCode::Norwegian => "no",
            LanguageCode::Finnish => "fi",
            LanguageCode::Czech => "cs",
            LanguageCode::Russian => "ru",
            LanguageCode::Turkish => "tr",
            LanguageCode::Arabic => "ar",
            LanguageCode::Hindi => "hi",
            LanguageCode::Chinese => "zh",
            LanguageCode::Japanese => "ja",
            LanguageCode::Korean => "ko",
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Ordered so that serialized requirement lists are deterministic.
pub type LanguageSet = BTreeSet<LanguageCode>;

/// A user who declared no languages is treated as an English speaker.
pub fn spoken_or_default(spoken: LanguageSet) -> LanguageSet {
    if spoken.is_empty() {
        BTreeSet::from([LanguageCode::English])
    } else {
        spoken
    }
}
