//! Bounded audit log and blocked attempt history
//!
//! Both lists are kept newest first and capped; once full, the oldest
//! record is dropped. Audit entries are hash-chained so that edits to the
//! retained window can be detected.

use agileweb_core::{AccessAction, ContextLabel, DecisionResult, GateMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use tracing::debug;
use uuid::Uuid;

/// Records kept per list unless configured otherwise
pub const DEFAULT_CAPACITY: usize = 1000;

/// What an audit entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    BlockedAttempt,
    Approval,
}

impl AuditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlockedAttempt => "blocked_attempt",
            Self::Approval => "approval",
        }
    }
}

/// A parent's response to a blocked or gated attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParentAction {
    #[serde(rename = "approved_once")]
    ApprovedOnce,
    #[serde(rename = "approved_24h")]
    Approved24h,
    #[serde(rename = "always_allow")]
    AlwaysAllow,
    #[serde(rename = "blocked")]
    Blocked,
}

impl ParentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApprovedOnce => "approved_once",
            Self::Approved24h => "approved_24h",
            Self::AlwaysAllow => "always_allow",
            Self::Blocked => "blocked",
        }
    }
}

/// Free-form details attached to an audit entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<AccessAction>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_action: Option<ParentAction>,
}

/// One entry of the audit log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: Uuid,

    pub child_id: String,

    pub timestamp: DateTime<Utc>,

    #[serde(rename = "type")]
    pub kind: AuditKind,

    pub details: AuditDetails,

    /// Hash of the entry recorded just before this one
    pub previous_hash: Option<String>,

    /// SHA-256 over this entry's content and `previous_hash`
    pub hash: String,
}

impl AuditLogEntry {
    fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();

        hasher.update(self.id.as_bytes());
        hasher.update(self.child_id.as_bytes());
        hasher.update(self.timestamp.to_rfc3339().as_bytes());
        hasher.update(self.kind.as_str().as_bytes());
        hasher.update(serde_json::to_vec(&self.details).unwrap_or_default());
        if let Some(ref prev) = self.previous_hash {
            hasher.update(prev.as_bytes());
        }

        format!("{:x}", hasher.finalize())
    }
}

/// Newest-first, capped, hash-chained audit log
#[derive(Debug, Clone)]
pub struct AuditTrail {
    entries: VecDeque<AuditLogEntry>,
    capacity: usize,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A trail keeping at most `capacity` entries (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    /// Append an entry, chaining it to the newest one
    pub fn record(
        &mut self,
        child_id: impl Into<String>,
        kind: AuditKind,
        details: AuditDetails,
    ) -> &AuditLogEntry {
        let mut entry = AuditLogEntry {
            id: Uuid::new_v4(),
            child_id: child_id.into(),
            timestamp: Utc::now(),
            kind,
            details,
            previous_hash: self.entries.front().map(|e| e.hash.clone()),
            hash: String::new(),
        };
        entry.hash = entry.compute_hash();

        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
        &self.entries[0]
    }

    /// Check every retained entry's hash and its link to the entry before.
    ///
    /// The oldest retained entry may point at an evicted one, so only its
    /// own hash is checked.
    pub fn verify(&self) -> bool {
        let mut prev_hash: Option<&str> = None;

        for (index, entry) in self.entries.iter().rev().enumerate() {
            if index > 0 && entry.previous_hash.as_deref() != prev_hash {
                return false;
            }
            if entry.compute_hash() != entry.hash {
                return false;
            }
            prev_hash = Some(&entry.hash);
        }

        true
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &AuditLogEntry> {
        self.entries.iter()
    }

    /// Entries for one child, newest first
    pub fn for_child<'a>(&'a self, child_id: &'a str) -> impl Iterator<Item = &'a AuditLogEntry> {
        self.entries.iter().filter(move |e| e.child_id == child_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new()
    }
}

/// A page a child was stopped from, or warned before, opening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedAttempt {
    pub id: Uuid,
    pub child_id: String,
    pub timestamp: DateTime<Utc>,
    pub url: String,

    /// Absent when a control, policy or override without category decided
    pub category: Option<String>,
    pub content_type: Option<String>,

    pub action: AccessAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_label: Option<ContextLabel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_mode: Option<GateMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_action: Option<ParentAction>,
}

/// Newest-first, capped list of blocked attempts
#[derive(Debug, Clone)]
pub struct BlockedAttemptLog {
    attempts: VecDeque<BlockedAttempt>,
    capacity: usize,
}

impl BlockedAttemptLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            attempts: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    pub fn push(&mut self, attempt: BlockedAttempt) {
        self.attempts.push_front(attempt);
        self.attempts.truncate(self.capacity);
    }

    /// Attempts, newest first
    pub fn iter(&self) -> impl Iterator<Item = &BlockedAttempt> {
        self.attempts.iter()
    }

    pub fn get(&self, id: Uuid) -> Option<&BlockedAttempt> {
        self.attempts.iter().find(|a| a.id == id)
    }

    fn get_mut(&mut self, id: Uuid) -> Option<&mut BlockedAttempt> {
        self.attempts.iter_mut().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn clear(&mut self) {
        self.attempts.clear();
    }
}

impl Default for BlockedAttemptLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes BLOCK and GATE decisions to the attempt history and audit log
#[derive(Debug, Clone, Default)]
pub struct DecisionRecorder {
    trail: AuditTrail,
    attempts: BlockedAttemptLog,
}

impl DecisionRecorder {
    /// Recorder keeping at most `capacity` records per list
    pub fn new(capacity: usize) -> Self {
        Self {
            trail: AuditTrail::with_capacity(capacity),
            attempts: BlockedAttemptLog::with_capacity(capacity),
        }
    }

    /// Record a decision for a child. ALLOW decisions are not recorded.
    ///
    /// Returns the id of the new blocked attempt.
    pub fn record(&mut self, child_id: &str, url: &str, decision: &DecisionResult) -> Option<Uuid> {
        if decision.action == AccessAction::Allow {
            return None;
        }

        let attempt = BlockedAttempt {
            id: Uuid::new_v4(),
            child_id: child_id.to_string(),
            timestamp: Utc::now(),
            url: url.to_string(),
            category: decision.category_id.clone(),
            content_type: decision.content_type_id.clone(),
            action: decision.action,
            context_label: decision.context_label,
            confidence: decision.confidence,
            gate_mode: decision.gate_mode,
            parent_action: None,
        };
        let id = attempt.id;

        self.trail.record(
            child_id,
            AuditKind::BlockedAttempt,
            AuditDetails {
                url: Some(attempt.url.clone()),
                category: attempt.category.clone(),
                content_type: attempt.content_type.clone(),
                action: Some(attempt.action),
                ..Default::default()
            },
        );
        self.attempts.push(attempt);
        crate::metrics::record_attempt();

        debug!(
            child_id,
            url,
            action = %decision.action,
            attempt = %id,
            "Blocked attempt recorded"
        );
        Some(id)
    }

    /// Attach a parent's response to an attempt and audit it.
    ///
    /// `None` when the attempt is unknown or already evicted.
    pub fn resolve(
        &mut self,
        attempt_id: Uuid,
        parent_action: ParentAction,
    ) -> Option<&BlockedAttempt> {
        let attempt = self.attempts.get_mut(attempt_id)?;
        attempt.parent_action = Some(parent_action);

        let details = AuditDetails {
            url: Some(attempt.url.clone()),
            category: attempt.category.clone(),
            content_type: attempt.content_type.clone(),
            action: Some(attempt.action),
            parent_action: Some(parent_action),
        };
        let child_id = attempt.child_id.clone();
        self.trail.record(child_id, AuditKind::Approval, details);

        debug!(
            attempt = %attempt_id,
            parent_action = parent_action.as_str(),
            "Blocked attempt resolved"
        );
        self.attempts.get(attempt_id)
    }

    /// Forget the attempt history; the audit log is kept
    pub fn clear_attempts(&mut self) {
        self.attempts.clear();
    }

    pub fn trail(&self) -> &AuditTrail {
        &self.trail
    }

    pub fn attempts(&self) -> &BlockedAttemptLog {
        &self.attempts
    }
}
