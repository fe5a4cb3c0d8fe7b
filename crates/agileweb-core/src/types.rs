//! Core types for AgileWeb

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Age bracket of a child profile.
///
/// Variants are declared in order of increasing permissiveness, so the
/// derived `Ord` places `Under10` lowest and `Age18Plus` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "UNDER_10")]
    Under10,
    #[serde(rename = "AGE_10_13")]
    Age10To13,
    #[serde(rename = "AGE_13_16")]
    Age13To16,
    #[serde(rename = "AGE_16_18")]
    Age16To18,
    #[serde(rename = "AGE_18_PLUS")]
    Age18Plus,
}

impl AgeGroup {
    /// Every age group, least permissive first
    pub const ALL: [AgeGroup; 5] = [
        AgeGroup::Under10,
        AgeGroup::Age10To13,
        AgeGroup::Age13To16,
        AgeGroup::Age16To18,
        AgeGroup::Age18Plus,
    ];

    /// Wire identifier, e.g. `AGE_13_16`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Under10 => "UNDER_10",
            Self::Age10To13 => "AGE_10_13",
            Self::Age13To16 => "AGE_13_16",
            Self::Age16To18 => "AGE_16_18",
            Self::Age18Plus => "AGE_18_PLUS",
        }
    }

    /// Human-readable label for dashboards
    pub fn label(&self) -> &'static str {
        match self {
            Self::Under10 => "Under 10",
            Self::Age10To13 => "10-13",
            Self::Age13To16 => "13-16",
            Self::Age16To18 => "16-18",
            Self::Age18Plus => "18+",
        }
    }

    /// Whether this group is exempt from the age rule table
    pub fn is_adult(&self) -> bool {
        matches!(self, Self::Age18Plus)
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgeGroup::ALL
            .into_iter()
            .find(|group| group.as_str() == s)
            .ok_or_else(|| Error::validation(format!("unknown age group '{}'", s)))
    }
}

/// Outcome of an access decision.
///
/// Declared from least to most restrictive: `Block > Gate > Allow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessAction {
    /// Content is shown as-is
    Allow,
    /// Content is shown after friction (warning, delay or parent approval)
    Gate,
    /// Content is not shown
    Block,
}

impl AccessAction {
    /// Wire identifier, e.g. `GATE`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Gate => "GATE",
            Self::Block => "BLOCK",
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Self::Block)
    }

    /// One step more restrictive, saturating at `Block`
    pub fn escalate(self) -> AccessAction {
        match self {
            Self::Allow => Self::Gate,
            Self::Gate | Self::Block => Self::Block,
        }
    }
}

impl fmt::Display for AccessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALLOW" => Ok(Self::Allow),
            "GATE" => Ok(Self::Gate),
            "BLOCK" => Ok(Self::Block),
            other => Err(Error::validation(format!("unknown access action '{}'", other))),
        }
    }
}

/// Kind of friction applied by a `Gate` decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    #[default]
    Warning,
    Delay,
    ParentApproval,
}

/// Secondary classification used to adjust a category decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextLabel {
    Educational,
    Promotional,
    Glorification,
    Discussion,
    Instruction,
    News,
    Historical,
    Recruitment,
    Propaganda,
    HelpSeeking,
    Encouragement,
}

impl ContextLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Educational => "educational",
            Self::Promotional => "promotional",
            Self::Glorification => "glorification",
            Self::Discussion => "discussion",
            Self::Instruction => "instruction",
            Self::News => "news",
            Self::Historical => "historical",
            Self::Recruitment => "recruitment",
            Self::Propaganda => "propaganda",
            Self::HelpSeeking => "help-seeking",
            Self::Encouragement => "encouragement",
        }
    }
}

impl fmt::Display for ContextLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a custom parent control matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlType {
    /// Topic of interest, matched against URL and page text
    Interest,
    /// URL fragment, matched against the URL only
    Url,
    /// Keyword, matched against URL and page text
    Keyword,
}

impl ControlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interest => "interest",
            Self::Url => "url",
            Self::Keyword => "keyword",
        }
    }
}

/// A per-child rule created by a parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomParentControl {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type")]
    pub control_type: ControlType,

    /// Value to match (at most 500 characters once sanitized)
    pub value: String,

    pub action: AccessAction,

    /// Owning child profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_id: Option<String>,
}

impl CustomParentControl {
    pub fn new(
        id: impl Into<String>,
        control_type: ControlType,
        value: impl Into<String>,
        action: AccessAction,
    ) -> Self {
        Self {
            id: id.into(),
            control_type,
            value: value.into(),
            action,
            child_id: None,
        }
    }
}

/// How a site policy pattern is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyType {
    /// Pattern is a URL fragment
    Url,
    /// Pattern is an app identifier
    App,
    /// Pattern is a hostname; subdomains match too
    Domain,
}

/// A per-site or per-app policy, global or scoped to one child
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitePolicy {
    #[serde(default)]
    pub id: String,

    pub site_pattern: String,

    #[serde(rename = "type")]
    pub policy_type: PolicyType,

    pub age_group: AgeGroup,

    pub action: AccessAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_mode: Option<GateMode>,

    /// Absent means the policy applies to every child
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SitePolicy {
    pub fn new(
        id: impl Into<String>,
        site_pattern: impl Into<String>,
        policy_type: PolicyType,
        age_group: AgeGroup,
        action: AccessAction,
    ) -> Self {
        Self {
            id: id.into(),
            site_pattern: site_pattern.into(),
            policy_type,
            age_group,
            action,
            gate_mode: None,
            child_id: None,
            notes: None,
        }
    }

    /// Scope this policy to a single child
    pub fn for_child(mut self, child_id: impl Into<String>) -> Self {
        self.child_id = Some(child_id.into());
        self
    }

    pub fn with_gate_mode(mut self, gate_mode: GateMode) -> Self {
        self.gate_mode = Some(gate_mode);
        self
    }

    /// Whether this policy is visible to the given child
    pub fn applies_to(&self, child_id: &str) -> bool {
        self.child_id.as_deref().map_or(true, |owner| owner == child_id)
    }
}

/// Page metadata extracted alongside the body text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PageMetadata {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
        }
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// Category assigned to a payload by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentClassification {
    pub category_id: String,
    pub content_type_id: String,

    /// Confidence score (0.0-1.0)
    pub confidence: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_label: Option<ContextLabel>,

    /// Action the rule table recommends for every age group
    pub recommended_action: BTreeMap<AgeGroup, AccessAction>,
}

/// Final decision emitted by the engine.
///
/// `category_id` and `content_type_id` are either both present or both
/// absent; use the constructors to keep that invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResult {
    pub blocked: bool,

    pub action: AccessAction,

    pub category_id: Option<String>,

    pub content_type_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_label: Option<ContextLabel>,

    /// Confidence score (0.0-1.0), when a classifier contributed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,

    /// Every pipeline stage that fired, joined for audit rendering
    pub reason: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_mode: Option<GateMode>,
}

impl DecisionResult {
    /// A decision without category attribution
    pub fn new(action: AccessAction, reason: impl Into<String>) -> Self {
        Self {
            blocked: action.is_block(),
            action,
            category_id: None,
            content_type_id: None,
            context_label: None,
            confidence: None,
            reason: reason.into(),
            gate_mode: None,
        }
    }

    /// Unrestricted access
    pub fn allow(reason: impl Into<String>) -> Self {
        Self::new(AccessAction::Allow, reason)
    }

    /// Attribute the decision to a category and content type
    pub fn with_category(
        mut self,
        category_id: impl Into<String>,
        content_type_id: impl Into<String>,
    ) -> Self {
        self.category_id = Some(category_id.into());
        self.content_type_id = Some(content_type_id.into());
        self
    }

    pub fn with_context(mut self, context_label: Option<ContextLabel>) -> Self {
        self.context_label = context_label;
        self
    }

    /// Attach a confidence score, clamped to [0, 1]
    pub fn with_confidence(mut self, confidence: Option<f32>) -> Self {
        self.confidence = confidence.map(|c| c.clamp(0.0, 1.0));
        self
    }

    pub fn with_gate_mode(mut self, gate_mode: Option<GateMode>) -> Self {
        self.gate_mode = gate_mode;
        self
    }
}
