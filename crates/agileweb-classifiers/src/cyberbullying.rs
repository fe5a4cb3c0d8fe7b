//! Cyberbullying detection
//!
//! Scores four buckets: hate-speech terms, harassment phrases (weighted
//! double), exclusion phrases and body-shaming terms.

use regex::RegexSet;
use serde::{Deserialize, Serialize};

use crate::detector::{scaled_confidence, Detector, PageText, Severity};
use crate::patterns::KeywordSet;
use agileweb_core::{Error, Result};

const HATE_SPEECH_TERMS: &[&str] = &[
    "hate",
    "disgusting",
    "gross",
    "ugly",
    "fat",
    "stupid",
    "idiot",
    "moron",
    "loser",
    "pathetic",
    "worthless",
];

const HARASSMENT_PATTERNS: &[&str] = &[
    r"\bkill\s+yourself\b",
    r"\bgo\s+die\b",
    r"\byou\s+should\s+die\b",
    r"\bno\s+one\s+cares\b",
    r"\byou're\s+worthless\b",
    r"\bunfollow\s+me\b",
];

const EXCLUSION_PATTERNS: &[&str] = &[
    r"\bno\s+one\s+likes\s+you\b",
    r"\beveryone\s+hates\s+you\b",
    r"\byou're\s+not\s+welcome\b",
    r"\bstay\s+away\b",
];

const BODY_SHAMING_TERMS: &[&str] = &["fat", "ugly", "disgusting", "gross", "hideous", "repulsive"];

const HARASSMENT_WEIGHT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BullyingPattern {
    HateSpeech,
    Harassment,
    Exclusion,
    BodyShaming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CyberbullyingAnalysis {
    pub detected: bool,
    pub severity: Severity,
    pub confidence: f32,
    /// Buckets that scored, each listed once
    pub patterns: Vec<BullyingPattern>,
    /// Weighted total across buckets
    pub score: usize,
}

impl CyberbullyingAnalysis {
    pub fn none() -> Self {
        Self {
            detected: false,
            severity: Severity::Low,
            confidence: 0.0,
            patterns: Vec::new(),
            score: 0,
        }
    }
}

pub struct CyberbullyingDetector {
    name: String,
    hate_speech: KeywordSet,
    harassment: RegexSet,
    exclusion: RegexSet,
    body_shaming: KeywordSet,
}

impl CyberbullyingDetector {
    pub fn new() -> Result<Self> {
        let harassment = RegexSet::new(HARASSMENT_PATTERNS)
            .map_err(|e| Error::detector(format!("Failed to compile harassment patterns: {}", e)))?;
        let exclusion = RegexSet::new(EXCLUSION_PATTERNS)
            .map_err(|e| Error::detector(format!("Failed to compile exclusion patterns: {}", e)))?;

        Ok(Self {
            name: "cyberbullying".to_string(),
            hate_speech: KeywordSet::new(HATE_SPEECH_TERMS)?,
            harassment,
            exclusion,
            body_shaming: KeywordSet::new(BODY_SHAMING_TERMS)?,
        })
    }

    pub fn analyze(&self, text: &str) -> CyberbullyingAnalysis {
        let hate = self.hate_speech.distinct_hits(text);
        let harassment = self.harassment.matches(text).iter().count();
        let exclusion = self.exclusion.matches(text).iter().count();
        let body_shaming = self.body_shaming.distinct_hits(text);

        let score = hate + harassment * HARASSMENT_WEIGHT + exclusion + body_shaming;
        if score == 0 {
            return CyberbullyingAnalysis::none();
        }

        let patterns = [
            (hate, BullyingPattern::HateSpeech),
            (harassment, BullyingPattern::Harassment),
            (exclusion, BullyingPattern::Exclusion),
            (body_shaming, BullyingPattern::BodyShaming),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(_, pattern)| pattern)
        .collect();

        let severity = if harassment > 0 || score >= 5 {
            Severity::High
        } else if score >= 3 {
            Severity::Medium
        } else {
            Severity::Low
        };

        CyberbullyingAnalysis {
            detected: true,
            severity,
            confidence: scaled_confidence(0.5, score, 0.1, 0.95),
            patterns,
            score,
        }
    }
}

impl Detector for CyberbullyingDetector {
    type Output = CyberbullyingAnalysis;

    fn detect(&self, page: &PageText) -> Result<Self::Output> {
        Ok(self.analyze(page.content()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
