//! AgileWeb Core
//!
//! Core types, errors and input handling shared across the AgileWeb
//! content access engine.
//!
//! This crate provides:
//! - The domain model (age groups, access actions, parent controls, site policies)
//! - The decision and classification records emitted by the engine
//! - Error types and result handling
//! - Input caps, sanitization and validation used at the request boundary

pub mod error;
pub mod limits;
pub mod types;

pub use error::{Error, Result};
pub use limits::InputLimits;
pub use types::{
    AccessAction, AgeGroup, ContentClassification, ContextLabel, ControlType,
    CustomParentControl, DecisionResult, GateMode, PageMetadata, PolicyType, SitePolicy,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        AccessAction, AgeGroup, ContextLabel, ControlType, CustomParentControl, DecisionResult,
        PageMetadata, PolicyType, SitePolicy,
    };
}
