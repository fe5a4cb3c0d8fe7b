//! Age-group rule table
//!
//! Static reference data: category → content type → action per age group.
//! Adults (`AGE_18_PLUS`) are never restricted by this table.

use std::collections::BTreeMap;

use agileweb_core::{AccessAction, AgeGroup};
use serde::Serialize;

use AccessAction::{Allow as A, Block as B, Gate as G};

/// Action for every age group below 18
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeGroupRule {
    pub under_10: AccessAction,
    pub age_10_13: AccessAction,
    pub age_13_16: AccessAction,
    pub age_16_18: AccessAction,
}

impl AgeGroupRule {
    const fn new(
        under_10: AccessAction,
        age_10_13: AccessAction,
        age_13_16: AccessAction,
        age_16_18: AccessAction,
    ) -> Self {
        Self {
            under_10,
            age_10_13,
            age_13_16,
            age_16_18,
        }
    }

    pub fn action(&self, age_group: AgeGroup) -> AccessAction {
        match age_group {
            AgeGroup::Under10 => self.under_10,
            AgeGroup::Age10To13 => self.age_10_13,
            AgeGroup::Age13To16 => self.age_13_16,
            AgeGroup::Age16To18 => self.age_16_18,
            AgeGroup::Age18Plus => AccessAction::Allow,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ContentType {
    pub id: &'static str,
    pub name: &'static str,
    pub rules: AgeGroupRule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ContentCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Parents may loosen or tighten this category per child
    pub parent_configurable: bool,
    pub content_types: &'static [ContentType],
}

impl ContentCategory {
    pub fn content_type(&self, content_type_id: &str) -> Option<&'static ContentType> {
        self.content_types.iter().find(|t| t.id == content_type_id)
    }
}

const fn content_type(
    id: &'static str,
    name: &'static str,
    rules: AgeGroupRule,
    notes: Option<&'static str>,
) -> ContentType {
    ContentType {
        id,
        name,
        rules,
        notes,
    }
}

/// BLOCK below 13, GATE until 16, ALLOW from 16
const STANDARD: AgeGroupRule = AgeGroupRule::new(B, G, G, A);

const SHORT_VIDEO_NOTE: &str =
    "Prefer making the short video unplayable rather than blocking the entire site";

/// Every category known to the engine
pub static CONTENT_CATEGORIES: &[ContentCategory] = &[
    ContentCategory {
        id: "violence",
        name: "Violence & Disturbing Content",
        description: "Content involving violence, horror, crime, and disturbing imagery",
        parent_configurable: false,
        content_types: &[
            content_type(
                "graphic-violence",
                "Graphic violence",
                AgeGroupRule::new(B, B, B, G),
                None,
            ),
            content_type("non-graphic-violence", "Non-graphic violence", STANDARD, None),
            content_type(
                "heavy-fighting",
                "Heavy fighting (WWE, contact sports)",
                AgeGroupRule::new(B, G, A, A),
                None,
            ),
            content_type("horror", "Horror / paranormal / jumpscares", STANDARD, None),
            content_type("crime-news", "Crime / news footage", STANDARD, None),
        ],
    },
    ContentCategory {
        id: "sexual",
        name: "Sexual & Body-Related Content",
        description: "Sexual content, body-related topics, and appearance-related content",
        parent_configurable: false,
        content_types: &[
            content_type(
                "explicit-sexual",
                "Explicit sexual content",
                AgeGroupRule::new(B, B, B, B),
                None,
            ),
            content_type(
                "sexual-education",
                "Sexual education (medical, educational)",
                AgeGroupRule::new(B, G, A, A),
                None,
            ),
            content_type("erotica", "Erotica / fanfiction", AgeGroupRule::new(B, B, G, A), None),
            content_type("indecent", "Indecent clothing or speech", STANDARD, None),
            content_type(
                "body-modification",
                "Body modification (tattoos, piercings)",
                STANDARD,
                None,
            ),
            content_type("beauty-filters", "Beauty & appearance filters", STANDARD, None),
        ],
    },
    ContentCategory {
        id: "substances",
        name: "Substances & Addictive Behavior",
        description: "Drugs, alcohol, gambling, and addictive content",
        parent_configurable: false,
        content_types: &[
            content_type(
                "drugs-cigarettes",
                "Drugs & cigarettes",
                AgeGroupRule::new(B, B, G, A),
                None,
            ),
            content_type("alcohol", "Alcohol content", STANDARD, None),
            content_type(
                "gambling",
                "Gambling & betting",
                AgeGroupRule::new(B, B, G, A),
                Some("Includes sports betting; detect vendors like Kalshi"),
            ),
            content_type(
                "loot-boxes",
                "Loot boxes / gacha mechanics",
                STANDARD,
                Some("Allow parent exceptions"),
            ),
        ],
    },
    ContentCategory {
        id: "financial",
        name: "Financial & Commercial Content",
        description: "Financial advice, crypto, and commercial content",
        parent_configurable: false,
        content_types: &[
            content_type("crypto", "Crypto / speculative finance", STANDARD, None),
            content_type(
                "get-rich-quick",
                "Get-rich-quick schemes",
                STANDARD,
                Some("Includes dropshipping, micro-credit"),
            ),
            content_type("influencer-finance", "Influencer financial advice", STANDARD, None),
            content_type("subscription-pages", "Subscription / purchase pages", STANDARD, None),
        ],
    },
    ContentCategory {
        id: "media",
        name: "Media & Platform-Native Risks",
        description: "Short-form videos, live streams, gaming content, and AI-generated content",
        parent_configurable: false,
        content_types: &[
            content_type(
                "short-form-videos",
                "Short-form videos (<10 sec)",
                STANDARD,
                Some(SHORT_VIDEO_NOTE),
            ),
            content_type("live-streams", "Live streams", STANDARD, None),
            content_type(
                "gaming-content",
                "Gaming content (videos, poker, rummy)",
                AgeGroupRule::new(G, G, A, A),
                Some("Includes poker, rummy, sports gambling content"),
            ),
            content_type("ai-generated", "AI-generated content", STANDARD, None),
        ],
    },
    ContentCategory {
        id: "social",
        name: "Social & Cultural Topics",
        description: "LGBTQ+ topics, religion, immigration, and political content",
        parent_configurable: true,
        content_types: &[
            content_type("lgbtq", "LGBTQ+ topics & orgs", AgeGroupRule::new(G, G, A, A), None),
            content_type("religion", "Religion", AgeGroupRule::new(G, A, A, A), None),
            content_type("immigration", "Immigration", AgeGroupRule::new(G, A, A, A), None),
            content_type("communism", "Communism", STANDARD, None),
            content_type(
                "discrimination",
                "Discrimination & hate speech",
                AgeGroupRule::new(B, B, G, A),
                None,
            ),
            content_type(
                "self-harm",
                "Self-harm & suicide",
                AgeGroupRule::new(B, B, B, B),
                Some("Instructions or encouragement; help resources are never blocked"),
            ),
        ],
    },
    ContentCategory {
        id: "weapons",
        name: "Weapons & Extremism",
        description: "Weapons, guns, and extremist content",
        parent_configurable: false,
        content_types: &[
            content_type(
                "guns-weapons",
                "Guns & weapons",
                AgeGroupRule::new(B, B, G, A),
                Some("Also reduces bomb-making-adjacent exposure"),
            ),
            content_type(
                "extremist-orgs",
                "Extremist orgs / propaganda",
                AgeGroupRule::new(B, B, B, B),
                Some("Treat extremist propaganda as hard-block for all under 18"),
            ),
        ],
    },
];

pub fn find_category(category_id: &str) -> Option<&'static ContentCategory> {
    CONTENT_CATEGORIES.iter().find(|c| c.id == category_id)
}

pub fn find_content_type(category_id: &str, content_type_id: &str) -> Option<&'static ContentType> {
    find_category(category_id)?.content_type(content_type_id)
}

/// Action for a (category, content type, age group) triple.
///
/// Adults always get `Allow`; otherwise `None` when the ids are unknown.
pub fn action_for(
    category_id: &str,
    content_type_id: &str,
    age_group: AgeGroup,
) -> Option<AccessAction> {
    if age_group.is_adult() {
        return Some(AccessAction::Allow);
    }

    find_content_type(category_id, content_type_id).map(|t| t.rules.action(age_group))
}

/// Recommended action for every age group
pub fn recommended_actions(
    category_id: &str,
    content_type_id: &str,
) -> Option<BTreeMap<AgeGroup, AccessAction>> {
    let content_type = find_content_type(category_id, content_type_id)?;

    Some(
        AgeGroup::ALL
            .into_iter()
            .map(|age| (age, content_type.rules.action(age)))
            .collect(),
    )
}
