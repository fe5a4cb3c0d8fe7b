//! AI-generated content detection
//!
//! Disclosure-phrase heuristic: a page has to say it was made with AI.
//! Naming an AI product is not a marker. A real detector would score the
//! media itself.

use serde::Serialize;

use crate::detector::{scaled_confidence, Detector, PageText};
use crate::patterns::KeywordSet;
use agileweb_core::Result;

const AI_MARKERS: &[&str] = &[
    "as an ai language model",
    "generated by ai",
    "generated with ai",
    "ai-generated",
    "ai generated",
    "made with ai",
    "created with ai",
    "made with midjourney",
    "generated with midjourney",
    "made with stable diffusion",
    "generated with stable diffusion",
    "created with dall-e",
    "generated with dall-e",
    "#aiart",
    "#aigenerated",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiContentAnalysis {
    pub detected: bool,
    pub confidence: f32,
    pub markers: Vec<&'static str>,
}

pub struct AiContentDetector {
    name: String,
    markers: KeywordSet,
}

impl AiContentDetector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            name: "ai-content".to_string(),
            markers: KeywordSet::new(AI_MARKERS)?,
        })
    }

    pub fn analyze(&self, text: &str) -> AiContentAnalysis {
        let markers = self.markers.matches(text);
        let confidence = if markers.is_empty() {
            0.0
        } else {
            scaled_confidence(0.5, markers.len(), 0.15, 0.9)
        };

        AiContentAnalysis {
            detected: !markers.is_empty(),
            confidence,
            markers,
        }
    }
}

impl Detector for AiContentDetector {
    type Output = AiContentAnalysis;

    fn detect(&self, page: &PageText) -> Result<Self::Output> {
        Ok(self.analyze(page.full_text()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
