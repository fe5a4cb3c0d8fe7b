//! AgileWeb Classifiers
//!
//! Keyword and pattern detectors that turn a page (URL, body text, title,
//! description) into typed signals for the decision engine:
//!
//! - [`CategoryClassifier`]: at most one (category, content type) pair
//! - [`ContextAnalyzer`]: framing of the page (educational, news, ...)
//! - [`SlangDetector`] and [`CodedLanguageDetector`]: filter-evasion wording
//! - [`SelfHarmDetector`], [`CyberbullyingDetector`], [`AiContentDetector`]
//!
//! Every detector compiles its matchers once in `new()` and is then a
//! pure function of the page, so a single instance can be shared across
//! threads.

pub mod ai_content;
pub mod category;
pub mod context;
pub mod cyberbullying;
pub mod detector;
pub mod patterns;
pub mod self_harm;
pub mod slang;

pub use ai_content::{AiContentAnalysis, AiContentDetector};
pub use category::{CategoryClassifier, CategoryMatch};
pub use context::{ContextAnalysis, ContextAnalyzer};
pub use cyberbullying::{BullyingPattern, CyberbullyingAnalysis, CyberbullyingDetector};
pub use detector::{scaled_confidence, Detector, PageText, Severity};
pub use patterns::KeywordSet;
pub use self_harm::{SelfHarmAnalysis, SelfHarmDetector, SelfHarmKind};
pub use slang::{CodedLanguage, CodedLanguageDetector, CodedPattern, SlangDetector, SlangMatch};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::ai_content::AiContentDetector;
    pub use crate::category::{CategoryClassifier, CategoryMatch};
    pub use crate::context::ContextAnalyzer;
    pub use crate::cyberbullying::CyberbullyingDetector;
    pub use crate::detector::{Detector, PageText};
    pub use crate::self_harm::SelfHarmDetector;
    pub use crate::slang::{CodedLanguageDetector, SlangDetector};
}
