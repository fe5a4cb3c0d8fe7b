//! Detector trait and common types

use agileweb_core::{PageMetadata, Result};
use serde::{Deserialize, Serialize};

/// Trait for all page detectors.
///
/// Detectors are pure: the same page always yields the same output and
/// nothing outside the detector is read or written.
pub trait Detector: Send + Sync {
    /// Typed result produced by this detector
    type Output;

    /// Inspect the page
    fn detect(&self, page: &PageText) -> Result<Self::Output>;

    /// Get the detector name
    fn name(&self) -> &str;
}

/// Case-folded view of a page, shared by every detector
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageText {
    url: String,
    content: String,
    full_text: String,
    category: Option<&'static str>,
}

impl PageText {
    /// Build the view from raw request fields
    pub fn new(url: &str, content: &str, metadata: Option<&PageMetadata>) -> Self {
        let (title, description) = metadata
            .map(|m| (m.title(), m.description()))
            .unwrap_or(("", ""));

        Self {
            url: url.to_lowercase(),
            content: content.to_lowercase(),
            full_text: format!("{} {} {}", content, title, description).to_lowercase(),
            category: None,
        }
    }

    /// Attach the category assigned by the category classifier
    pub fn with_category(mut self, category: Option<&'static str>) -> Self {
        self.category = category;
        self
    }

    /// Lower-cased URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Lower-cased body text only
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Lower-cased body, title and description joined by spaces
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Category id, once classified
    pub fn category(&self) -> Option<&'static str> {
        self.category
    }
}

/// Severity attached to harmful-content signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// `min(cap, base + hits * step)`, the confidence curve used by the lexicon detectors
pub fn scaled_confidence(base: f32, hits: usize, step: f32, cap: f32) -> f32 {
    (base + hits as f32 * step).min(cap)
}
