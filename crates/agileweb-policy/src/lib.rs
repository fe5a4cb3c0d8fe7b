//! AgileWeb Policy Engine
//!
//! Decides whether a child may see a page. Evaluation runs in strict
//! precedence order:
//!
//! 1. Adult-site deny list (every age group)
//! 2. Site and app policies (enhanced mode, when supplied)
//! 3. Custom parent controls, first match wins
//! 4. Category classifier and the age-group rule table
//! 5. Signal detector overrides, context adjustment and the
//!    low-confidence fallback
//!
//! Failures never surface as errors from [`DecisionEngine::evaluate`]:
//! malformed input and broken detectors degrade to ALLOW.

pub mod config;
pub mod custom_controls;
pub mod deny_list;
pub mod engine;
pub mod rule_table;
pub mod site_policy;
pub mod stages;

pub use config::{EngineConfig, FilterMode, Thresholds};
pub use custom_controls::{match_control, ControlMatch};
pub use deny_list::{DenyList, ADULT_SITE_DENY_LIST};
pub use engine::{BoxedDetector, DecisionEngine, DecisionEngineBuilder, EvaluationRequest};
pub use rule_table::{AgeGroupRule, ContentCategory, ContentType, CONTENT_CATEGORIES};
pub use site_policy::{find_applicable, find_matches, matches_site_policy};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{EngineConfig, FilterMode};
    pub use crate::engine::{DecisionEngine, EvaluationRequest};
    pub use agileweb_core::prelude::*;
}
