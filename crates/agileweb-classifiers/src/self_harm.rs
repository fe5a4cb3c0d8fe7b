//! Self-harm detection
//!
//! Separates pages that could hurt a child (instructions, encouragement)
//! from pages that help one (crisis lines, support resources). Nothing is
//! reported unless a core self-harm term or crisis resource is present.

use serde::{Deserialize, Serialize};

use crate::detector::{scaled_confidence, Detector, PageText, Severity};
use crate::patterns::KeywordSet;
use agileweb_core::{ContextLabel, Result};

const HARM_TERMS: &[&str] = &[
    "suicide",
    "self harm",
    "self-harm",
    "cutting",
    "hurting myself",
    "end my life",
    "take my life",
];

/// Crisis resources imply the topic even when no harm term is present
const CRISIS_RESOURCES: &[&str] = &[
    "crisis hotline",
    "suicide hotline",
    "crisis line",
    "crisis text line",
];

const INSTRUCTION_TERMS: &[&str] = &[
    "how to",
    "method",
    "way to",
    "best way",
    "easiest way",
    "painless",
    "quick",
];

const ENCOURAGEMENT_TERMS: &[&str] = &[
    "kill yourself",
    "end it all",
    "just do it",
    "no one cares",
    "you should die",
    "better off dead",
    "worthless",
    "no one would miss",
];

const HELP_SEEKING_TERMS: &[&str] = &[
    "suicide prevention",
    "crisis hotline",
    "get help",
    "reach out",
    "mental health",
    "therapy",
    "counseling",
    "support",
    "988",
    "lifeline",
    "helpline",
];

const DISCUSSION_TERMS: &[&str] = &[
    "discussion",
    "talk about",
    "conversation",
    "awareness",
    "understanding",
];

/// Intent behind self-harm content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelfHarmKind {
    Instruction,
    Encouragement,
    HelpSeeking,
    Discussion,
}

impl SelfHarmKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instruction => "instruction",
            Self::Encouragement => "encouragement",
            Self::HelpSeeking => "help-seeking",
            Self::Discussion => "discussion",
        }
    }

    /// Context label the engine reports for this intent
    pub fn context_label(&self) -> ContextLabel {
        match self {
            Self::Instruction => ContextLabel::Instruction,
            Self::Encouragement => ContextLabel::Encouragement,
            Self::HelpSeeking => ContextLabel::HelpSeeking,
            Self::Discussion => ContextLabel::Discussion,
        }
    }

    /// Instruction and encouragement are the harmful intents
    pub fn is_harmful(&self) -> bool {
        matches!(self, Self::Instruction | Self::Encouragement)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelfHarmAnalysis {
    pub detected: bool,
    pub kind: Option<SelfHarmKind>,
    pub confidence: f32,
    pub severity: Severity,
}

impl SelfHarmAnalysis {
    pub fn none() -> Self {
        Self {
            detected: false,
            kind: None,
            confidence: 0.0,
            severity: Severity::Low,
        }
    }

    fn found(kind: SelfHarmKind, confidence: f32, severity: Severity) -> Self {
        Self {
            detected: true,
            kind: Some(kind),
            confidence,
            severity,
        }
    }
}

pub struct SelfHarmDetector {
    name: String,
    harm: KeywordSet,
    crisis_resources: KeywordSet,
    instruction: KeywordSet,
    encouragement: KeywordSet,
    help_seeking: KeywordSet,
    discussion: KeywordSet,
}

impl SelfHarmDetector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            name: "self-harm".to_string(),
            harm: KeywordSet::new(HARM_TERMS)?,
            crisis_resources: KeywordSet::new(CRISIS_RESOURCES)?,
            instruction: KeywordSet::new(INSTRUCTION_TERMS)?,
            encouragement: KeywordSet::new(ENCOURAGEMENT_TERMS)?,
            help_seeking: KeywordSet::new(HELP_SEEKING_TERMS)?,
            discussion: KeywordSet::new(DISCUSSION_TERMS)?,
        })
    }

    pub fn analyze(&self, text: &str) -> SelfHarmAnalysis {
        let help = self.help_seeking.distinct_hits(text);

        if !self.harm.is_match(text) {
            // Resource pages are help-seeking by construction
            if self.crisis_resources.is_match(text) {
                return SelfHarmAnalysis::found(
                    SelfHarmKind::HelpSeeking,
                    scaled_confidence(0.7, help.max(1), 0.05, 0.85),
                    Severity::Medium,
                );
            }
            return SelfHarmAnalysis::none();
        }

        // Strict priority: instruction > encouragement > help-seeking > discussion
        let instruction = self.instruction.distinct_hits(text);
        if instruction > 0 {
            return SelfHarmAnalysis::found(
                SelfHarmKind::Instruction,
                scaled_confidence(0.7, instruction, 0.1, 0.95),
                Severity::High,
            );
        }

        let encouragement = self.encouragement.distinct_hits(text);
        if encouragement > 0 {
            return SelfHarmAnalysis::found(
                SelfHarmKind::Encouragement,
                scaled_confidence(0.6, encouragement, 0.15, 0.9),
                Severity::High,
            );
        }

        if help > 0 {
            return SelfHarmAnalysis::found(
                SelfHarmKind::HelpSeeking,
                scaled_confidence(0.7, help, 0.05, 0.85),
                Severity::Medium,
            );
        }

        if self.discussion.is_match(text) {
            return SelfHarmAnalysis::found(SelfHarmKind::Discussion, 0.6, Severity::Low);
        }

        // Topic present, intent unclear
        SelfHarmAnalysis::found(SelfHarmKind::Discussion, 0.5, Severity::Medium)
    }
}

impl Detector for SelfHarmDetector {
    type Output = SelfHarmAnalysis;

    fn detect(&self, page: &PageText) -> Result<Self::Output> {
        Ok(self.analyze(page.full_text()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
