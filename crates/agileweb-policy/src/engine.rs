//! Decision engine
//!
//! Combines the deny list, site policies, custom controls, category
//! classifier, rule table and signal detectors into a single access
//! decision. The engine is synchronous and holds no mutable state; build
//! it once and share it behind an `Arc`.

use agileweb_classifiers::{
    AiContentAnalysis, AiContentDetector, CategoryClassifier, CategoryMatch, CodedLanguage,
    CodedLanguageDetector, ContextAnalysis, ContextAnalyzer, CyberbullyingAnalysis,
    CyberbullyingDetector, Detector, PageText, SelfHarmAnalysis, SelfHarmDetector, SlangDetector,
    SlangMatch,
};
use agileweb_core::{
    AccessAction, AgeGroup, ContentClassification, CustomParentControl, DecisionResult,
    PageMetadata, Result, SitePolicy,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{EngineConfig, FilterMode};
use crate::deny_list::DenyList;
use crate::rule_table;
use crate::stages::{self, Draft, Signals};

/// A detector behind a trait object, so tests and callers can swap it
pub type BoxedDetector<T> = Box<dyn Detector<Output = T>>;

/// Raw evaluation request as received from a client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub url: String,

    #[serde(default)]
    pub content: String,

    /// Wire-form age group, e.g. `AGE_13_16`
    pub age_group: String,

    #[serde(default)]
    pub custom_controls: Vec<CustomParentControl>,

    /// `None` disables the site-policy stage
    #[serde(default)]
    pub site_policies: Option<Vec<SitePolicy>>,

    #[serde(default)]
    pub metadata: Option<PageMetadata>,

    /// Child being evaluated; policies owned by other children are skipped
    #[serde(default)]
    pub child_id: Option<String>,
}

/// Content access decision engine
pub struct DecisionEngine {
    config: EngineConfig,
    deny_list: DenyList,
    category: BoxedDetector<Option<CategoryMatch>>,
    context: BoxedDetector<ContextAnalysis>,
    slang: BoxedDetector<Vec<SlangMatch>>,
    coded: BoxedDetector<CodedLanguage>,
    self_harm: BoxedDetector<SelfHarmAnalysis>,
    cyberbullying: BoxedDetector<CyberbullyingAnalysis>,
    ai_content: BoxedDetector<AiContentAnalysis>,
}

impl DecisionEngine {
    /// Engine with the default configuration and built-in detectors
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> DecisionEngineBuilder {
        DecisionEngineBuilder::new()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decide access for one page.
    ///
    /// Never fails: malformed input and detector errors degrade to ALLOW
    /// or to "no signal" respectively.
    pub fn evaluate(
        &self,
        url: &str,
        content: &str,
        age_group: AgeGroup,
        custom_controls: &[CustomParentControl],
        site_policies: Option<&[SitePolicy]>,
        metadata: Option<&PageMetadata>,
    ) -> DecisionResult {
        if url.trim().is_empty() {
            return invalid_input("url is empty");
        }

        let draft = stages::deny_list_stage(&self.deny_list, url)
            .or_else(|| match (self.config.mode, site_policies) {
                (FilterMode::Enhanced, Some(policies)) => {
                    stages::site_policy_stage(url, age_group, policies)
                }
                _ => None,
            })
            .or_else(|| stages::custom_control_stage(url, content, custom_controls))
            .unwrap_or_else(|| {
                let page = PageText::new(url, content, metadata);
                self.content_decision(&page, age_group, self.config.mode)
            });

        let result = draft.into_result();
        debug!(
            url,
            age_group = %age_group,
            action = %result.action,
            reason = %result.reason,
            "Decision made"
        );
        result
    }

    /// Decide access for a raw request, validating the age group first
    pub fn evaluate_request(&self, request: &EvaluationRequest) -> DecisionResult {
        let age_group = match request.age_group.parse::<AgeGroup>() {
            Ok(age_group) => age_group,
            Err(e) => {
                debug!(error = %e, "Rejected evaluation request");
                return invalid_input(&request.age_group_error());
            }
        };

        let policies: Option<Vec<SitePolicy>> = request.site_policies.as_ref().map(|policies| {
            policies
                .iter()
                .filter(|policy| {
                    request
                        .child_id
                        .as_deref()
                        .map_or(true, |child_id| policy.applies_to(child_id))
                })
                .cloned()
                .collect()
        });

        self.evaluate(
            &request.url,
            &request.content,
            age_group,
            &request.custom_controls,
            policies.as_deref(),
            request.metadata.as_ref(),
        )
    }

    /// Classification of the page content alone, without deny list,
    /// controls or policies. `None` when the page is unrestricted.
    pub fn analyze(
        &self,
        url: &str,
        content: &str,
        age_group: AgeGroup,
        metadata: Option<&PageMetadata>,
    ) -> Option<ContentClassification> {
        let page = PageText::new(url, content, metadata);
        let draft = self.content_decision(&page, age_group, FilterMode::Enhanced);
        let (category_id, content_type_id) = draft.category?;

        let mut recommended_action = rule_table::recommended_actions(category_id, content_type_id)
            .unwrap_or_else(|| {
                AgeGroup::ALL
                    .into_iter()
                    .map(|age| (age, AccessAction::Allow))
                    .collect()
            });
        recommended_action.insert(age_group, draft.action);

        Some(ContentClassification {
            category_id: category_id.to_string(),
            content_type_id: content_type_id.to_string(),
            confidence: draft.confidence.unwrap_or(0.0),
            context_label: draft.context,
            recommended_action,
        })
    }

    fn content_decision(&self, page: &PageText, age_group: AgeGroup, mode: FilterMode) -> Draft {
        let category = run(self.category.as_ref(), page).flatten();

        if mode == FilterMode::Basic {
            return match category {
                Some(category) => stages::rule_table_stage(&category, age_group),
                None => stages::uncategorized(),
            };
        }

        let thresholds = &self.config.thresholds;
        let draft = match category {
            Some(category) => {
                let page = page.clone().with_category(Some(category.category_id));
                let signals = self.signals(&page);

                let draft = stages::rule_table_stage(&category, age_group);
                let draft = stages::annotate_signals(draft, &signals);
                let draft = stages::apply_self_harm(draft, &signals, age_group, thresholds);
                let draft = stages::apply_cyberbullying(draft, &signals, age_group, thresholds);
                stages::annotate_ai_content(draft, &signals)
            }
            None => {
                let signals = Signals {
                    self_harm: run(self.self_harm.as_ref(), page),
                    ai_content: run(self.ai_content.as_ref(), page),
                    ..Default::default()
                };
                stages::sweep_uncategorized(&signals, age_group, thresholds)
            }
        };

        let draft = stages::apply_context(draft, age_group);
        stages::apply_confidence_fallback(draft, thresholds)
    }

    fn signals(&self, page: &PageText) -> Signals {
        Signals {
            context: run(self.context.as_ref(), page),
            slang: run(self.slang.as_ref(), page),
            coded: run(self.coded.as_ref(), page),
            self_harm: run(self.self_harm.as_ref(), page),
            cyberbullying: run(self.cyberbullying.as_ref(), page),
            ai_content: run(self.ai_content.as_ref(), page),
        }
    }
}

/// Run a detector; a failure is logged and treated as "no signal"
fn run<T>(detector: &dyn Detector<Output = T>, page: &PageText) -> Option<T> {
    match detector.detect(page) {
        Ok(output) => Some(output),
        Err(e) => {
            warn!(detector = detector.name(), error = %e, "Detector failed, ignoring its signal");
            None
        }
    }
}

fn invalid_input(detail: &str) -> DecisionResult {
    DecisionResult::allow(format!("Invalid input: {}", detail))
}

impl EvaluationRequest {
    fn age_group_error(&self) -> String {
        if self.age_group.trim().is_empty() {
            "age group is missing".to_string()
        } else {
            format!("unknown age group '{}'", self.age_group)
        }
    }
}

/// Builder for [`DecisionEngine`]; unset detectors use the built-in ones
#[derive(Default)]
pub struct DecisionEngineBuilder {
    config: EngineConfig,
    deny_list: Option<DenyList>,
    category: Option<BoxedDetector<Option<CategoryMatch>>>,
    context: Option<BoxedDetector<ContextAnalysis>>,
    slang: Option<BoxedDetector<Vec<SlangMatch>>>,
    coded: Option<BoxedDetector<CodedLanguage>>,
    self_harm: Option<BoxedDetector<SelfHarmAnalysis>>,
    cyberbullying: Option<BoxedDetector<CyberbullyingAnalysis>>,
    ai_content: Option<BoxedDetector<AiContentAnalysis>>,
}

impl DecisionEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn deny_list(mut self, deny_list: DenyList) -> Self {
        self.deny_list = Some(deny_list);
        self
    }

    pub fn category_classifier(mut self, detector: BoxedDetector<Option<CategoryMatch>>) -> Self {
        self.category = Some(detector);
        self
    }

    pub fn context_analyzer(mut self, detector: BoxedDetector<ContextAnalysis>) -> Self {
        self.context = Some(detector);
        self
    }

    pub fn slang_detector(mut self, detector: BoxedDetector<Vec<SlangMatch>>) -> Self {
        self.slang = Some(detector);
        self
    }

    pub fn coded_language_detector(mut self, detector: BoxedDetector<CodedLanguage>) -> Self {
        self.coded = Some(detector);
        self
    }

    pub fn self_harm_detector(mut self, detector: BoxedDetector<SelfHarmAnalysis>) -> Self {
        self.self_harm = Some(detector);
        self
    }

    pub fn cyberbullying_detector(
        mut self,
        detector: BoxedDetector<CyberbullyingAnalysis>,
    ) -> Self {
        self.cyberbullying = Some(detector);
        self
    }

    pub fn ai_content_detector(mut self, detector: BoxedDetector<AiContentAnalysis>) -> Self {
        self.ai_content = Some(detector);
        self
    }

    /// Compile every matcher not supplied by the caller
    pub fn build(self) -> Result<DecisionEngine> {
        self.config.validate()?;

        let engine = DecisionEngine {
            deny_list: or_build(self.deny_list, DenyList::new)?,
            category: or_build(self.category, || boxed(CategoryClassifier::new()))?,
            context: or_build(self.context, || boxed(ContextAnalyzer::new()))?,
            slang: or_build(self.slang, || boxed(SlangDetector::new()))?,
            coded: or_build(self.coded, || boxed(CodedLanguageDetector::new()))?,
            self_harm: or_build(self.self_harm, || boxed(SelfHarmDetector::new()))?,
            cyberbullying: or_build(self.cyberbullying, || boxed(CyberbullyingDetector::new()))?,
            ai_content: or_build(self.ai_content, || boxed(AiContentDetector::new()))?,
            config: self.config,
        };

        debug!(
            mode = ?engine.config.mode,
            deny_entries = engine.deny_list.len(),
            "Decision engine built"
        );
        Ok(engine)
    }
}

fn or_build<T>(supplied: Option<T>, build: impl FnOnce() -> Result<T>) -> Result<T> {
    match supplied {
        Some(value) => Ok(value),
        None => build(),
    }
}

fn boxed<D>(detector: Result<D>) -> Result<BoxedDetector<D::Output>>
where
    D: Detector + 'static,
{
    let detector: BoxedDetector<D::Output> = Box::new(detector?);
    Ok(detector)
}
