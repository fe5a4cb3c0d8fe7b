//! AgileWeb Telemetry
//!
//! Record keeping around access decisions.
//!
//! Provides:
//! - A bounded, hash-chained audit log for tamper evidence
//! - A bounded history of blocked and gated attempts
//! - Decision metrics exported through the `metrics` facade

pub mod audit;
pub mod metrics;

pub use audit::{
    AuditDetails, AuditKind, AuditLogEntry, AuditTrail, BlockedAttempt, BlockedAttemptLog,
    DecisionRecorder, ParentAction, DEFAULT_CAPACITY,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::audit::{AuditTrail, BlockedAttemptLog, DecisionRecorder};
    pub use crate::metrics::{record_decision, record_rejection};
}
