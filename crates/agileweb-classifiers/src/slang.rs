//! Slang and coded-language detection
//!
//! Two detectors live here: a dictionary of slang terms commonly used to
//! talk around filters, and a fixed list of obfuscation patterns (number
//! substitution, leet speak, deliberate misspellings).

use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};

use crate::detector::{Detector, PageText};
use agileweb_core::{Error, Result};

/// (term, category, confidence)
const SLANG_DICTIONARY: &[(&str, &str, f32)] = &[
    // drugs
    ("z", "substances", 0.7),
    ("w", "substances", 0.7),
    ("smoke up", "substances", 0.8),
    ("420", "substances", 0.9),
    ("blaze", "substances", 0.7),
    ("green", "substances", 0.6),
    ("herb", "substances", 0.6),
    ("mary jane", "substances", 0.8),
    ("dank", "substances", 0.6),
    ("high", "substances", 0.5),
    ("stoned", "substances", 0.7),
    // violence
    ("cap", "violence", 0.6),
    ("smoke", "violence", 0.7),
    ("clap", "violence", 0.7),
    ("pop", "violence", 0.6),
    ("drop", "violence", 0.5),
    // sexual
    ("thirst trap", "sexual", 0.8),
    ("onlyfans", "sexual", 0.9),
    ("nsfw", "sexual", 0.9),
    ("lewds", "sexual", 0.8),
    ("simp", "sexual", 0.5),
    // gambling
    ("degen", "substances", 0.7),
    ("yolo", "financial", 0.5),
    ("all in", "substances", 0.6),
    ("bet", "substances", 0.5),
];

/// A dictionary term found in the page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlangMatch {
    pub term: &'static str,
    pub category: &'static str,
    pub confidence: f32,
}

/// Word-boundary slang dictionary lookup
pub struct SlangDetector {
    name: String,
    terms: RegexSet,
}

impl SlangDetector {
    pub fn new() -> Result<Self> {
        let patterns = SLANG_DICTIONARY
            .iter()
            .map(|(term, _, _)| format!(r"\b{}\b", regex::escape(term)));

        let terms = RegexSet::new(patterns)
            .map_err(|e| Error::detector(format!("Failed to compile slang dictionary: {}", e)))?;

        Ok(Self {
            name: "slang".to_string(),
            terms,
        })
    }

    /// Dictionary entries present in the text, in dictionary order
    pub fn scan(&self, text: &str) -> Vec<SlangMatch> {
        self.terms
            .matches(text)
            .into_iter()
            .map(|index| {
                let (term, category, confidence) = SLANG_DICTIONARY[index];
                SlangMatch {
                    term,
                    category,
                    confidence,
                }
            })
            .collect()
    }
}

impl Detector for SlangDetector {
    type Output = Vec<SlangMatch>;

    fn detect(&self, page: &PageText) -> Result<Self::Output> {
        Ok(self.scan(page.content()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Kind of filter-evasion pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodedPattern {
    NumberSubstitution,
    LeetSpeak,
    IntentionalMisspelling,
}

impl CodedPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NumberSubstitution => "number_substitution",
            Self::LeetSpeak => "leet_speak",
            Self::IntentionalMisspelling => "intentional_misspelling",
        }
    }
}

/// Coded-language result; `patterns` holds each kind at most once
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodedLanguage {
    pub detected: bool,
    pub patterns: Vec<CodedPattern>,
}

/// Fixed regex list for obfuscated wording
pub struct CodedLanguageDetector {
    name: String,
    number_substitution: RegexSet,
    leet_marker: Regex,
    leet_words: RegexSet,
    misspellings: RegexSet,
}

fn compile_set(patterns: &[&str], what: &str) -> Result<RegexSet> {
    RegexSet::new(patterns)
        .map_err(|e| Error::detector(format!("Failed to compile {} patterns: {}", what, e)))
}

impl CodedLanguageDetector {
    pub fn new() -> Result<Self> {
        let leet_marker = Regex::new(r"[0-9@$!]")
            .map_err(|e| Error::detector(format!("Failed to compile leet marker: {}", e)))?;

        Ok(Self {
            name: "coded-language".to_string(),
            number_substitution: compile_set(&[r"\b420\b", r"\b69\b"], "number substitution")?,
            leet_marker,
            leet_words: compile_set(&[r"h[3@]ll[0o]", r"[fph][u@][ck]"], "leet speak")?,
            // A substituted character is required, plain spellings are not coded
            misspellings: compile_set(
                &[r"\bp[0*]rn\b", r"\bdr[0*]gs\b", r"\bv[1!]olence\b"],
                "misspelling",
            )?,
        })
    }

    pub fn scan(&self, text: &str) -> CodedLanguage {
        let mut patterns = Vec::new();

        if self.number_substitution.is_match(text) {
            patterns.push(CodedPattern::NumberSubstitution);
        }
        if self.leet_marker.is_match(text) && self.leet_words.is_match(text) {
            patterns.push(CodedPattern::LeetSpeak);
        }
        if self.misspellings.is_match(text) {
            patterns.push(CodedPattern::IntentionalMisspelling);
        }

        CodedLanguage {
            detected: !patterns.is_empty(),
            patterns,
        }
    }
}

impl Detector for CodedLanguageDetector {
    type Output = CodedLanguage;

    fn detect(&self, page: &PageText) -> Result<Self::Output> {
        Ok(self.scan(page.content()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slang_word_boundaries() {
        let detector = SlangDetector::new().unwrap();

        let terms: Vec<_> = detector
            .scan("check my onlyfans, no cap")
            .into_iter()
            .map(|m| m.term)
            .collect();
        assert_eq!(terms, vec!["cap", "onlyfans"]);

        // "capital" and "highway" must not match "cap" / "high"
        assert!(detector.scan("the capital highway").is_empty());
    }

    #[test]
    fn test_slang_multi_word_terms() {
        let detector = SlangDetector::new().unwrap();
        let matches = detector.scan("went all in on mary jane");

        assert_eq!(matches.len(), 2);
        assert!(matches
            .iter()
            .any(|m| m.term == "mary jane" && m.category == "substances"));
        assert!(matches.iter().any(|m| m.term == "all in"));
    }

    #[test]
    fn test_slang_carries_dictionary_confidence() {
        let detector = SlangDetector::new().unwrap();
        let matches = detector.scan("nsfw");

        assert_eq!(
            matches,
            vec![SlangMatch {
                term: "nsfw",
                category: "sexual",
                confidence: 0.9
            }]
        );
    }

    #[test]
    fn test_number_substitution_reported_once() {
        let detector = CodedLanguageDetector::new().unwrap();
        let result = detector.scan("420 and 69");

        assert!(result.detected);
        assert_eq!(result.patterns, vec![CodedPattern::NumberSubstitution]);
    }

    #[test]
    fn test_leet_speak() {
        let detector = CodedLanguageDetector::new().unwrap();

        assert_eq!(detector.scan("h3ll0 there").patterns, vec![CodedPattern::LeetSpeak]);
        // Leet words without any substituted character do not count
        assert!(!detector.scan("hello there").detected);
    }

    #[test]
    fn test_intentional_misspelling() {
        let detector = CodedLanguageDetector::new().unwrap();

        assert_eq!(
            detector.scan("free p0rn").patterns,
            vec![CodedPattern::IntentionalMisspelling]
        );
        assert_eq!(
            detector.scan("v1olence").patterns,
            vec![CodedPattern::IntentionalMisspelling]
        );
        assert!(!detector.scan("a history of violence").detected);
    }

    #[test]
    fn test_clean_text() {
        let detector = CodedLanguageDetector::new().unwrap();
        assert_eq!(detector.scan("a quiet afternoon"), CodedLanguage::default());
    }

    #[test]
    fn test_pattern_names() {
        assert_eq!(CodedPattern::LeetSpeak.as_str(), "leet_speak");
        let json = serde_json::to_string(&CodedPattern::IntentionalMisspelling).unwrap();
        assert_eq!(json, "\"intentional_misspelling\"");
    }
}
