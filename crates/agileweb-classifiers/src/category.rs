//! Content category classifier
//!
//! Assigns at most one (category, content type) pair to a page by walking
//! an ordered chain of keyword rules. The first rule whose triggers occur
//! in the page text or URL wins; a rule's refinements then pick the
//! specific content type. This is a lexicon stand-in for a trained model,
//! so unknown content yields no category rather than a guess.

use crate::detector::{Detector, PageText};
use crate::patterns::KeywordSet;
use agileweb_core::Result;
use tracing::debug;

/// Category and content type assigned to a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryMatch {
    pub category_id: &'static str,
    pub content_type_id: &'static str,
    /// Trigger keyword that selected the category
    pub keyword: &'static str,
}

/// Static description of one link in the rule chain
struct RuleSpec {
    category_id: &'static str,
    /// Triggers searched in body, title and description
    text: &'static [&'static str],
    /// Triggers searched in the URL
    url: &'static [&'static str],
    /// (keywords in text, content type) checked in order
    refinements: &'static [(&'static [&'static str], &'static str)],
    default_type: &'static str,
}

const VIOLENCE: &[&str] = &["violence", "fight", "war", "kill", "murder", "blood", "gore"];
const SEXUAL: &[&str] = &["sex", "porn", "nude", "explicit", "adult"];
const SUBSTANCES: &[&str] = &["drug", "cigarette", "alcohol", "beer", "wine", "smoke"];
const GAMBLING: &[&str] = &["gambl", "bet", "poker", "casino"];
const FINANCIAL: &[&str] = &["crypto", "bitcoin", "get rich", "dropship", "investment"];
const WEAPONS: &[&str] = &["gun", "weapon", "bomb"];
const SHORT_FORM: &[&str] = &["tiktok.com", "instagram.com/reel", "youtube.com/shorts"];

/// Priority order: violence, sexual, substances, gambling, financial,
/// weapons, short-form video URLs, live streams.
const RULE_CHAIN: &[RuleSpec] = &[
    RuleSpec {
        category_id: "violence",
        text: VIOLENCE,
        url: VIOLENCE,
        refinements: &[(&["graphic", "gore"], "graphic-violence")],
        default_type: "non-graphic-violence",
    },
    RuleSpec {
        category_id: "sexual",
        text: SEXUAL,
        url: SEXUAL,
        refinements: &[(&["education", "medical"], "sexual-education")],
        default_type: "explicit-sexual",
    },
    RuleSpec {
        category_id: "substances",
        text: SUBSTANCES,
        url: SUBSTANCES,
        refinements: &[(&["drug", "cigarette"], "drugs-cigarettes")],
        default_type: "alcohol",
    },
    RuleSpec {
        category_id: "substances",
        text: GAMBLING,
        url: &[],
        refinements: &[],
        default_type: "gambling",
    },
    RuleSpec {
        category_id: "financial",
        text: FINANCIAL,
        url: FINANCIAL,
        refinements: &[(&["crypto", "bitcoin"], "crypto")],
        default_type: "get-rich-quick",
    },
    RuleSpec {
        category_id: "weapons",
        text: WEAPONS,
        url: &[],
        refinements: &[],
        default_type: "guns-weapons",
    },
    RuleSpec {
        category_id: "media",
        text: &[],
        url: SHORT_FORM,
        refinements: &[],
        default_type: "short-form-videos",
    },
    RuleSpec {
        category_id: "media",
        text: &["live stream"],
        url: &["twitch.tv"],
        refinements: &[],
        default_type: "live-streams",
    },
];

/// Compiled link of the rule chain
struct CategoryRule {
    category_id: &'static str,
    text_triggers: KeywordSet,
    url_triggers: KeywordSet,
    refinements: Vec<(KeywordSet, &'static str)>,
    default_type: &'static str,
}

impl CategoryRule {
    fn compile(spec: &RuleSpec) -> Result<Self> {
        let refinements = spec
            .refinements
            .iter()
            .map(|(keywords, content_type)| Ok((KeywordSet::new(keywords)?, *content_type)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            category_id: spec.category_id,
            text_triggers: KeywordSet::new(spec.text)?,
            url_triggers: KeywordSet::new(spec.url)?,
            refinements,
            default_type: spec.default_type,
        })
    }

    fn evaluate(&self, page: &PageText) -> Option<CategoryMatch> {
        let keyword = self
            .text_triggers
            .first_in_list_order(page.full_text())
            .or_else(|| self.url_triggers.first_in_list_order(page.url()))?;

        let content_type_id = self
            .refinements
            .iter()
            .find(|(keywords, _)| keywords.is_match(page.full_text()))
            .map(|(_, content_type)| *content_type)
            .unwrap_or(self.default_type);

        Some(CategoryMatch {
            category_id: self.category_id,
            content_type_id,
            keyword,
        })
    }
}

/// Ordered keyword rule chain over the page
pub struct CategoryClassifier {
    name: String,
    rules: Vec<CategoryRule>,
}

impl CategoryClassifier {
    /// Create a classifier with the built-in rule chain
    pub fn new() -> Result<Self> {
        let rules = RULE_CHAIN
            .iter()
            .map(CategoryRule::compile)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: "category".to_string(),
            rules,
        })
    }

    /// First matching rule in priority order, if any
    pub fn classify(&self, page: &PageText) -> Option<CategoryMatch> {
        let matched = self.rules.iter().find_map(|rule| rule.evaluate(page));
        if let Some(m) = &matched {
            debug!(
                category = m.category_id,
                content_type = m.content_type_id,
                keyword = m.keyword,
                "Category matched"
            );
        }
        matched
    }
}

impl Detector for CategoryClassifier {
    type Output = Option<CategoryMatch>;

    fn detect(&self, page: &PageText) -> Result<Self::Output> {
        Ok(self.classify(page))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agileweb_core::PageMetadata;

    fn classify(url: &str, text: &str) -> Option<CategoryMatch> {
        let classifier = CategoryClassifier::new().unwrap();
        classifier.classify(&PageText::new(url, text, None))
    }

    fn ids(m: Option<CategoryMatch>) -> Option<(&'static str, &'static str)> {
        m.map(|m| (m.category_id, m.content_type_id))
    }

    #[test]
    fn test_graphic_violence() {
        let result = classify("https://example.com", "Graphic gore compilation");
        assert_eq!(ids(result), Some(("violence", "graphic-violence")));
    }

    #[test]
    fn test_non_graphic_violence_from_url() {
        let result = classify("https://example.com/fight-club", "a film review");
        assert_eq!(ids(result), Some(("violence", "non-graphic-violence")));
        assert_eq!(result.unwrap().keyword, "fight");
    }

    #[test]
    fn test_sexual_education() {
        let result = classify("https://example.com", "Sex education for teens, medical facts");
        assert_eq!(ids(result), Some(("sexual", "sexual-education")));
    }

    #[test]
    fn test_explicit_sexual() {
        let result = classify("https://example.com", "nude pictures");
        assert_eq!(ids(result), Some(("sexual", "explicit-sexual")));
    }

    #[test]
    fn test_substances_refinement() {
        assert_eq!(
            ids(classify("https://example.com", "where to buy cigarettes")),
            Some(("substances", "drugs-cigarettes"))
        );
        assert_eq!(
            ids(classify("https://example.com", "craft beer festival")),
            Some(("substances", "alcohol"))
        );
    }

    #[test]
    fn test_gambling_is_text_only() {
        assert_eq!(
            ids(classify("https://example.com", "online casino bonus")),
            Some(("substances", "gambling"))
        );
        assert_eq!(classify("https://poker.example.com", "a quiet page"), None);
    }

    #[test]
    fn test_financial() {
        assert_eq!(
            ids(classify("https://example.com", "bitcoin to the moon")),
            Some(("financial", "crypto"))
        );
        assert_eq!(
            ids(classify("https://example.com", "start dropshipping today")),
            Some(("financial", "get-rich-quick"))
        );
    }

    #[test]
    fn test_weapons() {
        let result = classify(
            "https://example.com",
            "this article explains gun safety for hunters, educational overview",
        );
        assert_eq!(ids(result), Some(("weapons", "guns-weapons")));
    }

    #[test]
    fn test_short_form_video_urls() {
        assert_eq!(
            ids(classify("https://www.youtube.com/shorts/abc", "")),
            Some(("media", "short-form-videos"))
        );
        assert_eq!(
            ids(classify("https://www.tiktok.com/@someone", "")),
            Some(("media", "short-form-videos"))
        );
    }

    #[test]
    fn test_live_streams() {
        assert_eq!(
            ids(classify("https://www.twitch.tv/channel", "")),
            Some(("media", "live-streams"))
        );
        assert_eq!(
            ids(classify("https://example.com", "join the live stream now")),
            Some(("media", "live-streams"))
        );
    }

    #[test]
    fn test_priority_order_short_circuits() {
        // Violence outranks weapons even when both appear
        let result = classify("https://example.com", "gun fight");
        assert_eq!(ids(result), Some(("violence", "non-graphic-violence")));
    }

    #[test]
    fn test_metadata_participates() {
        let classifier = CategoryClassifier::new().unwrap();
        let metadata = PageMetadata::new("Casino night", "");
        let page = PageText::new("https://example.com", "welcome", Some(&metadata));

        assert_eq!(ids(classifier.classify(&page)), Some(("substances", "gambling")));
    }

    #[test]
    fn test_unknown_content_has_no_category() {
        assert_eq!(classify("https://randomsite.com", "hello world"), None);
    }
}
