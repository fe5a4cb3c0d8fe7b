//! Context analyzer
//!
//! Labels the framing of a page (educational, promotional, news, ...)
//! from weighted indicator buckets. The label is a secondary signal: the
//! engine uses it to soften or annotate a category decision.

use crate::detector::{scaled_confidence, Detector, PageText};
use crate::patterns::KeywordSet;
use agileweb_core::{ContextLabel, Result};

const STEP: f32 = 0.1;
const DEFAULT_CONFIDENCE: f32 = 0.5;

const EDUCATIONAL: &[&str] = &[
    "educational",
    "education",
    "learn",
    "teaching",
    "tutorial",
    "guide",
    "how to",
    "explained",
    "documentary",
    "history",
    "historical",
    "medical",
    "health",
    "science",
    "academic",
    "school",
    "university",
    "course",
    "lesson",
];

const PROMOTIONAL: &[&str] = &[
    "buy now",
    "purchase",
    "subscribe",
    "sign up",
    "limited time",
    "deal",
    "discount",
    "sale",
    "promo",
    "advertisement",
    "sponsored",
    "affiliate",
];

const GLORIFICATION: &[&str] = &[
    "epic",
    "awesome",
    "cool",
    "badass",
    "legendary",
    "insane",
    "crazy",
    "extreme",
    "ultimate",
    "best ever",
    "amazing",
];

const NEWS: &[&str] = &[
    "news",
    "breaking",
    "report",
    "reported",
    "journalist",
    "article",
    "coverage",
    "update",
    "latest",
    "headline",
];

const HELP_SEEKING: &[&str] = &[
    "help",
    "support",
    "crisis",
    "hotline",
    "suicide prevention",
    "mental health",
    "therapy",
    "counseling",
    "resources",
    "get help",
    "reach out",
];

const RECRUITMENT: &[&str] = &[
    "join us",
    "join our",
    "become a member",
    "sign up for",
    "recruit",
    "recruitment",
    "enlist",
    "propaganda",
    "indoctrination",
];

/// Context label with its confidence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextAnalysis {
    pub label: ContextLabel,
    pub confidence: f32,
    /// Distinct indicators behind the label (0 for the default)
    pub hits: usize,
}

impl ContextAnalysis {
    fn discussion() -> Self {
        Self {
            label: ContextLabel::Discussion,
            confidence: DEFAULT_CONFIDENCE,
            hits: 0,
        }
    }
}

struct Bucket {
    label: ContextLabel,
    indicators: KeywordSet,
    base: f32,
    cap: f32,
    min_hits: usize,
    /// Whether indicators in the URL count
    scan_url: bool,
}

impl Bucket {
    fn new(
        label: ContextLabel,
        indicators: &[&'static str],
        base: f32,
        cap: f32,
        min_hits: usize,
        scan_url: bool,
    ) -> Result<Self> {
        Ok(Self {
            label,
            indicators: KeywordSet::new(indicators)?,
            base,
            cap,
            min_hits,
            scan_url,
        })
    }

    /// Distinct indicators present in the text (or URL, when scanned)
    fn score(&self, page: &PageText) -> usize {
        self.indicators
            .keywords()
            .iter()
            .filter(|indicator| {
                page.full_text().contains(*indicator)
                    || (self.scan_url && page.url().contains(*indicator))
            })
            .count()
    }

    fn analysis(&self, hits: usize, cap: f32) -> ContextAnalysis {
        ContextAnalysis {
            label: self.label,
            confidence: scaled_confidence(self.base, hits, STEP, cap),
            hits,
        }
    }
}

/// Indicator-bucket context analyzer
pub struct ContextAnalyzer {
    name: String,
    /// Declared in tie-break order
    buckets: Vec<Bucket>,
}

impl ContextAnalyzer {
    pub fn new() -> Result<Self> {
        use ContextLabel::*;

        let buckets = vec![
            Bucket::new(HelpSeeking, HELP_SEEKING, 0.7, 0.9, 1, false)?,
            Bucket::new(Recruitment, RECRUITMENT, 0.7, 0.9, 1, true)?,
            Bucket::new(Promotional, PROMOTIONAL, 0.6, 0.9, 1, true)?,
            Bucket::new(Glorification, GLORIFICATION, 0.6, 0.9, 3, false)?,
            Bucket::new(Educational, EDUCATIONAL, 0.5, 0.8, 1, true)?,
            Bucket::new(News, NEWS, 0.6, 0.9, 1, true)?,
        ];

        Ok(Self {
            name: "context".to_string(),
            buckets,
        })
    }

    /// Label the page, taking the assigned category into account
    pub fn analyze(&self, page: &PageText) -> ContextAnalysis {
        let scored: Vec<(&Bucket, usize)> = self
            .buckets
            .iter()
            .map(|bucket| (bucket, bucket.score(page)))
            .collect();

        let hits_for = |label: ContextLabel| {
            scored
                .iter()
                .find(|(bucket, _)| bucket.label == label)
                .map(|(bucket, hits)| (*bucket, *hits))
        };

        // Category-specific framings take precedence over raw scores
        match page.category() {
            Some("sexual") => {
                if let Some((bucket, hits)) = hits_for(ContextLabel::Educational) {
                    if hits > 0 {
                        return bucket.analysis(hits, 0.9);
                    }
                }
            }
            Some("violence") => {
                if let Some((bucket, hits)) = hits_for(ContextLabel::News) {
                    if hits > 0 {
                        return bucket.analysis(hits, bucket.cap);
                    }
                }
            }
            _ => {}
        }

        // Highest score wins; strict comparison keeps the earlier bucket on ties
        let mut best: Option<(&Bucket, usize)> = None;
        for (bucket, hits) in scored {
            if hits == 0 || hits < bucket.min_hits {
                continue;
            }
            if best.map_or(true, |(_, best_hits)| hits > best_hits) {
                best = Some((bucket, hits));
            }
        }

        best.map(|(bucket, hits)| bucket.analysis(hits, bucket.cap))
            .unwrap_or_else(ContextAnalysis::discussion)
    }
}

impl Detector for ContextAnalyzer {
    type Output = ContextAnalysis;

    fn detect(&self, page: &PageText) -> Result<Self::Output> {
        Ok(self.analyze(page))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(url: &str, text: &str, category: Option<&'static str>) -> ContextAnalysis {
        let analyzer = ContextAnalyzer::new().unwrap();
        analyzer.analyze(&PageText::new(url, text, None).with_category(category))
    }

    #[test]
    fn test_default_is_discussion() {
        let result = analyze("https://example.com", "hello world", None);
        assert_eq!(result.label, ContextLabel::Discussion);
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.hits, 0);
    }

    #[test]
    fn test_educational_beats_single_news_hit() {
        let result = analyze(
            "https://example.com",
            "this article explains gun safety for hunters, educational overview",
            Some("weapons"),
        );
        assert_eq!(result.label, ContextLabel::Educational);
        assert_eq!(result.hits, 2);
        assert!((result.confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_sexual_education_precedence_and_cap() {
        let result = analyze(
            "https://example.com",
            "sex education: health science lesson for school, a university course",
            Some("sexual"),
        );
        assert_eq!(result.label, ContextLabel::Educational);
        assert!((result.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_violence_news_precedence() {
        // Promotional outscores news here, but violence pages prefer news framing
        let result = analyze(
            "https://example.com",
            "war report: subscribe for a discount on this limited time deal",
            Some("violence"),
        );
        assert_eq!(result.label, ContextLabel::News);
    }

    #[test]
    fn test_highest_score_wins() {
        let result = analyze(
            "https://example.com",
            "subscribe now, limited time discount, news update",
            None,
        );
        assert_eq!(result.label, ContextLabel::Promotional);
        assert_eq!(result.hits, 3);
    }

    #[test]
    fn test_tie_prefers_help_seeking() {
        let result = analyze("https://example.com", "join us for therapy", None);
        assert_eq!(result.label, ContextLabel::HelpSeeking);
    }

    #[test]
    fn test_glorification_needs_three_hits() {
        let two = analyze("https://example.com", "epic and awesome", None);
        assert_eq!(two.label, ContextLabel::Discussion);

        let three = analyze("https://example.com", "epic, awesome and insane", None);
        assert_eq!(three.label, ContextLabel::Glorification);
    }

    #[test]
    fn test_help_seeking_ignores_url() {
        let result = analyze("https://help.example.com", "a page", None);
        assert_eq!(result.label, ContextLabel::Discussion);
    }

    #[test]
    fn test_url_indicators_count_for_news() {
        let result = analyze("https://news.example.com/story", "a page", None);
        assert_eq!(result.label, ContextLabel::News);
    }
}
