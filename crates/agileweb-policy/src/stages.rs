//! Decision pipeline stages
//!
//! Terminal stages return `Option<Draft>` and are chained in precedence
//! order. Adjustment stages are `Draft -> Draft` functions applied to the
//! category decision. A draft that an override has locked is final.

use agileweb_classifiers::{
    AiContentAnalysis, CategoryMatch, CodedLanguage, ContextAnalysis, CyberbullyingAnalysis,
    SelfHarmAnalysis, Severity, SlangMatch,
};
use agileweb_core::{
    AccessAction, AgeGroup, ContextLabel, CustomParentControl, DecisionResult, GateMode,
    SitePolicy,
};
use tracing::debug;

use crate::config::Thresholds;
use crate::custom_controls::match_control;
use crate::deny_list::{DenyList, DENY_CATEGORY};
use crate::rule_table;
use crate::site_policy::find_applicable;

const SELF_HARM_CATEGORY: (&str, &str) = ("social", "self-harm");
const BULLYING_CATEGORY: (&str, &str) = ("social", "discrimination");
const AI_CATEGORY: (&str, &str) = ("media", "ai-generated");

/// Category that is never softened by the low-confidence fallback
const HARD_CATEGORY: &str = "weapons";

/// Decision in progress
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub action: AccessAction,
    pub category: Option<(&'static str, &'static str)>,
    pub context: Option<ContextLabel>,
    pub confidence: Option<f32>,
    pub gate_mode: Option<GateMode>,
    /// Set by overrides; later adjustments leave the action alone
    pub locked: bool,
    pub reasons: Vec<String>,
}

impl Draft {
    pub fn new(action: AccessAction, reason: impl Into<String>) -> Self {
        Self {
            action,
            category: None,
            context: None,
            confidence: None,
            gate_mode: None,
            locked: false,
            reasons: vec![reason.into()],
        }
    }

    fn with_category(mut self, category: (&'static str, &'static str)) -> Self {
        self.category = Some(category);
        self
    }

    fn note(&mut self, reason: impl Into<String>) {
        self.reasons.push(reason.into());
    }

    fn category_id(&self) -> Option<&'static str> {
        self.category.map(|(category, _)| category)
    }

    pub fn into_result(self) -> DecisionResult {
        let result = DecisionResult::new(self.action, self.reasons.join("; "))
            .with_context(self.context)
            .with_confidence(self.confidence)
            .with_gate_mode(self.gate_mode);

        match self.category {
            Some((category, content_type)) => result.with_category(category, content_type),
            None => result,
        }
    }
}

/// Detector outputs, computed once per evaluation.
///
/// `None` means the detector failed and is treated as "no signal".
#[derive(Debug, Clone, Default)]
pub struct Signals {
    pub context: Option<ContextAnalysis>,
    pub slang: Option<Vec<SlangMatch>>,
    pub coded: Option<CodedLanguage>,
    pub self_harm: Option<SelfHarmAnalysis>,
    pub cyberbullying: Option<CyberbullyingAnalysis>,
    pub ai_content: Option<AiContentAnalysis>,
}

impl Signals {
    fn slang_detected(&self) -> bool {
        self.slang.as_ref().map_or(false, |m| !m.is_empty())
    }

    fn coded_detected(&self) -> bool {
        self.coded.as_ref().map_or(false, |c| c.detected)
    }

    fn self_harm(&self) -> Option<&SelfHarmAnalysis> {
        self.self_harm.as_ref().filter(|a| a.detected)
    }

    fn cyberbullying(&self) -> Option<&CyberbullyingAnalysis> {
        self.cyberbullying.as_ref().filter(|a| a.detected)
    }

    fn ai_content(&self) -> Option<&AiContentAnalysis> {
        self.ai_content.as_ref().filter(|a| a.detected)
    }

    /// Context confidence raised by slang and coded wording, then by
    /// any harmful-content detection
    pub fn combined_confidence(&self) -> f32 {
        let mut confidence = self.context.map_or(0.5, |c| c.confidence);
        if self.slang_detected() {
            confidence = (confidence + 0.1).min(0.95);
        }
        if self.coded_detected() {
            confidence = (confidence + 0.15).min(0.95);
        }
        if let Some(self_harm) = self.self_harm() {
            confidence = confidence.max(self_harm.confidence);
        }
        if let Some(bullying) = self.cyberbullying() {
            confidence = confidence.max(bullying.confidence);
        }
        confidence
    }
}

fn severity_note(kind: &str, severity: Severity) -> String {
    format!("{} ({} severity)", kind, severity.as_str())
}

/// Adult-site deny list, absolute precedence
pub fn deny_list_stage(deny_list: &DenyList, url: &str) -> Option<Draft> {
    let entry = deny_list.matched_entry(url)?;
    debug!(entry, "Deny list matched");

    Some(
        Draft::new(AccessAction::Block, format!("Blocked adult site: {}", entry))
            .with_category(DENY_CATEGORY),
    )
}

/// First site policy for this age group, action taken verbatim
pub fn site_policy_stage(url: &str, age_group: AgeGroup, policies: &[SitePolicy]) -> Option<Draft> {
    let policy = find_applicable(url, age_group, policies)?;
    debug!(policy = %policy.id, pattern = %policy.site_pattern, "Site policy matched");

    let mut draft = Draft::new(policy.action, format!("Site policy: {}", policy.site_pattern));
    if policy.action == AccessAction::Gate {
        draft.gate_mode = Some(policy.gate_mode.unwrap_or_default());
    }
    Some(draft)
}

/// First matching custom control, action taken verbatim
pub fn custom_control_stage(
    url: &str,
    content: &str,
    controls: &[CustomParentControl],
) -> Option<Draft> {
    let matched = match_control(url, content, controls)?;
    debug!(control = %matched.control.id, "Custom control matched");

    Some(Draft::new(matched.action, matched.reason()))
}

/// Nothing restricted was found
pub fn uncategorized() -> Draft {
    Draft::new(AccessAction::Allow, "No restricted category")
}

/// Base decision from the rule table
pub fn rule_table_stage(category: &CategoryMatch, age_group: AgeGroup) -> Draft {
    let ids = (category.category_id, category.content_type_id);

    match rule_table::action_for(category.category_id, category.content_type_id, age_group) {
        Some(action) => Draft::new(
            action,
            format!(
                "Category: {}, Type: {}",
                category.category_id, category.content_type_id
            ),
        )
        .with_category(ids),
        None => Draft::new(AccessAction::Allow, "No rule found for this content type")
            .with_category(ids),
    }
}

/// Record context, slang and coded-language signals on the draft
pub fn annotate_signals(mut draft: Draft, signals: &Signals) -> Draft {
    if let Some(context) = signals.context {
        draft.context = Some(context.label);
        draft.note(format!(
            "Context: {} ({:.0}% confidence)",
            context.label,
            context.confidence * 100.0
        ));
    }

    if let Some(slang) = signals.slang.as_ref().filter(|m| !m.is_empty()) {
        let terms: Vec<&str> = slang.iter().map(|m| m.term).collect();
        draft.note(format!("Slang detected: {}", terms.join(", ")));
    }

    if let Some(coded) = signals.coded.as_ref().filter(|c| c.detected) {
        let patterns: Vec<&str> = coded.patterns.iter().map(|p| p.as_str()).collect();
        draft.note(format!("Coded language detected: {}", patterns.join(", ")));
    }

    draft.confidence = Some(signals.combined_confidence());
    draft
}

/// Harmful self-harm content forces `social/self-harm`
pub fn apply_self_harm(
    mut draft: Draft,
    signals: &Signals,
    age_group: AgeGroup,
    thresholds: &Thresholds,
) -> Draft {
    if draft.locked {
        return draft;
    }
    let Some(analysis) = signals.self_harm() else {
        return draft;
    };
    let Some(kind) = analysis.kind else {
        return draft;
    };

    draft.note(format!(
        "Self-harm content: {}",
        severity_note(kind.as_str(), analysis.severity)
    ));

    if !kind.is_harmful() || analysis.confidence <= thresholds.self_harm {
        return draft;
    }

    let (category, content_type) = SELF_HARM_CATEGORY;
    draft.action =
        rule_table::action_for(category, content_type, age_group).unwrap_or(AccessAction::Block);
    draft.category = Some(SELF_HARM_CATEGORY);
    draft.context = Some(kind.context_label());
    draft.confidence = Some(analysis.confidence);
    draft.locked = true;

    debug!(kind = kind.as_str(), confidence = analysis.confidence, "Self-harm override");
    draft
}

/// Confident cyberbullying on a categorized page forces `social/discrimination`
pub fn apply_cyberbullying(
    mut draft: Draft,
    signals: &Signals,
    age_group: AgeGroup,
    thresholds: &Thresholds,
) -> Draft {
    if draft.locked {
        return draft;
    }
    let Some(analysis) = signals.cyberbullying() else {
        return draft;
    };

    draft.note(format!(
        "Cyberbullying detected: {} severity",
        analysis.severity.as_str()
    ));

    if analysis.confidence <= thresholds.cyberbullying {
        return draft;
    }

    let (category, content_type) = BULLYING_CATEGORY;
    let mut action =
        rule_table::action_for(category, content_type, age_group).unwrap_or(AccessAction::Block);
    if analysis.severity == Severity::High
        && matches!(age_group, AgeGroup::Age13To16 | AgeGroup::Age16To18)
    {
        action = action.escalate();
    }

    draft.action = action;
    draft.category = Some(BULLYING_CATEGORY);
    draft.context = Some(ContextLabel::Encouragement);
    draft.confidence = Some(analysis.confidence);
    draft.locked = true;

    debug!(
        severity = analysis.severity.as_str(),
        confidence = analysis.confidence,
        "Cyberbullying override"
    );
    draft
}

/// AI-generated content is noted on media pages, never decisive
pub fn annotate_ai_content(mut draft: Draft, signals: &Signals) -> Draft {
    let is_media = draft.category.map_or(false, |(category, _)| category == AI_CATEGORY.0);
    if !draft.locked && is_media && signals.ai_content().is_some() {
        draft.note("AI-generated content detected");
    }
    draft
}

/// Educational and help-seeking framings soften a BLOCK
pub fn apply_context(mut draft: Draft, age_group: AgeGroup) -> Draft {
    if draft.locked || draft.action != AccessAction::Block {
        return draft;
    }

    match draft.context {
        Some(ContextLabel::Educational) => {
            draft.action = AccessAction::Gate;
            draft.note("Educational context detected, adjusting action to GATE");
        }
        Some(ContextLabel::HelpSeeking) => {
            draft.action = if age_group == AgeGroup::Under10 {
                AccessAction::Gate
            } else {
                AccessAction::Allow
            };
            draft.note("Help-seeking context detected, adjusting action");
        }
        _ => {}
    }
    draft
}

/// A low-confidence BLOCK becomes GATE, except for weapons
pub fn apply_confidence_fallback(mut draft: Draft, thresholds: &Thresholds) -> Draft {
    if draft.locked || draft.action != AccessAction::Block {
        return draft;
    }
    let Some(confidence) = draft.confidence else {
        return draft;
    };

    if confidence < thresholds.low_confidence && draft.category_id() != Some(HARD_CATEGORY) {
        draft.action = AccessAction::Gate;
        draft.note("Low confidence, defaulting to GATE instead of BLOCK");
    }
    draft
}

/// Uncategorized pages are still swept for self-harm and AI content
pub fn sweep_uncategorized(
    signals: &Signals,
    age_group: AgeGroup,
    thresholds: &Thresholds,
) -> Draft {
    let self_harm = signals.self_harm().filter(|a| a.kind.is_some());

    // Harmful self-harm content gets the same override as categorized pages
    if let Some(analysis) = self_harm {
        let harmful = analysis.kind.map_or(false, |k| k.is_harmful());
        if harmful && analysis.confidence > thresholds.self_harm {
            let mut draft = uncategorized();
            draft.reasons.clear();
            return apply_self_harm(draft, signals, age_group, thresholds);
        }
    }

    let mut draft = match signals.ai_content() {
        Some(ai) => {
            let mut draft = rule_table_stage(
                &CategoryMatch {
                    category_id: AI_CATEGORY.0,
                    content_type_id: AI_CATEGORY.1,
                    keyword: "ai-generated",
                },
                age_group,
            );
            draft.note("AI-generated content detected");
            draft.context = Some(ContextLabel::Promotional);
            draft.confidence = Some(ai.confidence);
            draft
        }
        None => uncategorized(),
    };

    if let Some(analysis) = self_harm {
        if let Some(kind) = analysis.kind {
            draft.note(format!(
                "Self-harm content: {}",
                severity_note(kind.as_str(), analysis.severity)
            ));
            if draft.category.is_none() {
                draft.context = Some(kind.context_label());
                draft.confidence = Some(analysis.confidence);
            }
        }
    }

    draft
}
