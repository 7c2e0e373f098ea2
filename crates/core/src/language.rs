//! Language tags.
//!
//! The spec treats a language as an opaque tag from a closed set where
//! equality is the only operation. We keep the closed set small and add new
//! members the way the teacher's `Language` enum grows: one variant per
//! supported tag plus an `Other` escape hatch for provider-reported codes we
//! don't special-case.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    En,
    Es,
    Fr,
    Yo,
    Ha,
    Ig,
    Other([u8; 2]),
}

impl Language {
    pub fn code(&self) -> &str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::Yo => "yo",
            Language::Ha => "ha",
            Language::Ig => "ig",
            Language::Other(bytes) => std::str::from_utf8(bytes).unwrap_or("??"),
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        let lower = tag.to_ascii_lowercase();
        Some(match lower.as_str() {
            "en" => Language::En,
            "es" => Language::Es,
            "fr" => Language::Fr,
            "yo" => Language::Yo,
            "ha" => Language::Ha,
            "ig" => Language::Ig,
            other if other.len() == 2 && other.is_ascii() => {
                let bytes = other.as_bytes();
                Language::Other([bytes[0], bytes[1]])
            },
            _ => return None,
        })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<String> for Language {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Language::parse(&value).ok_or_else(|| format!("unrecognized language tag: {value}"))
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        lang.code().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_the_only_defined_operation() {
        assert_eq!(Language::En, Language::parse("EN").unwrap());
        assert_ne!(Language::En, Language::Es);
    }

    #[test]
    fn round_trips_through_string() {
        for code in ["en", "es", "fr", "yo", "ha", "ig", "de"] {
            let lang = Language::parse(code).unwrap();
            assert_eq!(lang.code(), code);
        }
    }

    #[test]
    fn rejects_malformed_tags() {
        assert!(Language::parse("english").is_none());
        assert!(Language::parse("").is_none());
    }
}
