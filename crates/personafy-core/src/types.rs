// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Shared data types for the vault, the request/decision pipeline, and the
//! audit trail.
//!
//! All types implement [`Clone`], [`Debug`], [`serde::Serialize`], and
//! [`serde::Deserialize`] so the vault can be sealed, written to disk, and
//! reloaded without any additional conversion step.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Posture
// ---------------------------------------------------------------------------

/// Global disclosure mode. Never promoted or demoted automatically — only
/// [`crate::handle::VaultHandle::set_posture`] changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Posture {
    /// Auto-approve wherever a rule already exists for the persona+agent.
    Open,
    /// Queue anything not already covered by a rule (the default).
    Guarded,
    /// Deny every field outright; no rule lookup occurs.
    Locked,
}

impl Default for Posture {
    fn default() -> Self {
        Posture::Guarded
    }
}

// ---------------------------------------------------------------------------
// Persona / Fact
// ---------------------------------------------------------------------------

/// A named field bag representing one facet of the user (work, personal, …).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub label: String,
    pub fields: HashMap<String, String>,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

/// An out-of-schema annotation tied to a persona; consulted when a field is
/// not present in `Persona::fields`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    pub id: String,
    pub persona: String,
    pub field: String,
    pub value: String,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A user-authored authorization tuple: `(persona, fields, optional agent,
/// optional purpose pattern)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub persona: String,
    pub fields: Vec<String>,
    /// When absent, the rule matches requests from any agent.
    pub agent_id: Option<String>,
    /// Case-insensitive substring match against the request's purpose.
    pub purpose_pattern: Option<String>,
    pub created_at_ms: u64,
}

impl Rule {
    pub fn covers_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Whether the rule's (optional) purpose pattern matches `purpose`.
    pub fn matches_purpose(&self, purpose: &str) -> bool {
        match &self.purpose_pattern {
            None => true,
            Some(pattern) => purpose
                .to_ascii_lowercase()
                .contains(&pattern.to_ascii_lowercase()),
        }
    }

    pub fn matches_agent(&self, agent_id: &str) -> bool {
        match &self.agent_id {
            None => true,
            Some(id) => id == agent_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduled rule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduledRuleKind {
    Heartbeat,
    Cron,
}

/// Inclusive daily time window, `HH:MM` local time. `from > to` wraps past
/// midnight: `[from, 23:59] ∪ [00:00, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from: (u8, u8),
    pub to: (u8, u8),
}

impl TimeWindow {
    /// `contains` takes the current local hour/minute, not a full timestamp,
    /// so the caller — never this type — owns the choice of timezone.
    pub fn contains(&self, hour: u8, minute: u8) -> bool {
        let now = (hour as u16) * 60 + minute as u16;
        let from = (self.from.0 as u16) * 60 + self.from.1 as u16;
        let to = (self.to.0 as u16) * 60 + self.to.1 as u16;
        if from <= to {
            now >= from && now <= to
        } else {
            now >= from || now <= to
        }
    }
}

/// A rule driven by agent-side timers (heartbeat or cron), keyed by an
/// opaque agent-chosen `source_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledRule {
    pub id: String,
    pub kind: ScheduledRuleKind,
    pub source_id: String,
    pub agent_id: String,
    pub persona: String,
    pub fields: Vec<String>,
    pub expires_at_ms: u64,
    pub created_at_ms: u64,
    /// Only meaningful for `kind == Cron`.
    pub time_window: Option<TimeWindow>,
}

impl ScheduledRule {
    pub fn is_active(&self, now_ms: u64) -> bool {
        now_ms < self.expires_at_ms
    }

    pub fn covers_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

// ---------------------------------------------------------------------------
// Approval
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Denied,
    Expired,
}

/// The two legal outcomes an owner can resolve a pending approval to.
/// Deliberately distinct from [`ApprovalStatus`] so resolving to `Pending`
/// or `Expired` — states [`crate::queue::ApprovalQueue`] alone is allowed
/// to produce — isn't even expressible at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Approved,
    Denied,
}

impl From<Resolution> for ApprovalStatus {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Approved => ApprovalStatus::Approved,
            Resolution::Denied => ApprovalStatus::Denied,
        }
    }
}

/// The request kind an agent may submit. Anything else is rejected upstream
/// as an invalid request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Message,
    Heartbeat,
    Cron,
}

/// Inbound ask from an agent-facing host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub agent_id: String,
    pub request_type: RequestType,
    pub persona: String,
    pub fields: Vec<String>,
    pub purpose: String,
    pub source_id: Option<String>,
}

/// A pending or resolved decision record. `status` transitions are monotonic:
/// `pending -> {approved|denied|expired}`, never back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Approval {
    pub id: String,
    pub request: Request,
    pub status: ApprovalStatus,
    pub created_at_ms: u64,
    pub expires_at_ms: u64,
    pub resolved_at_ms: Option<u64>,
    pub resolved_by: Option<String>,
    pub standing_rule_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditDecision {
    Approved,
    Pending,
    Denied,
}

/// One append-only record of a context-request decision.
///
/// Chained via `prev_hash`/`hash` so tampering with any past entry is
/// detectable — not required verbatim by the data model but grounded in the
/// same tamper-evidence idiom the audit log already used elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub agent_id: String,
    pub request_type: RequestType,
    pub persona: String,
    pub fields: Vec<String>,
    pub purpose: String,
    pub decision: AuditDecision,
    pub timestamp_ms: u64,
    pub correlation_id: Option<String>,
    pub source_id: Option<String>,
    /// Hex digest over this entry's fields and `prev_hash`.
    pub hash: String,
    /// Hash of the immediately preceding entry, or 64 zeros for genesis.
    pub prev_hash: String,
}

/// Narrowing filter for [`crate::audit::AuditLogger::query`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditFilter {
    pub agent_id: Option<String>,
    pub since_ms: Option<u64>,
    pub correlation_id: Option<String>,
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// Context engine result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Pending,
    Denied,
}

/// Result of [`crate::engine::ContextEngine::request_context`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextResult {
    pub decision: Decision,
    pub approved_fields: HashMap<String, Option<String>>,
    pub pending_fields: Vec<String>,
    pub denied_fields: Vec<String>,
    pub approval_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// Root aggregate, owned exclusively by the embedding host through a
/// [`crate::handle::VaultHandle`]: one per user, never a literal process
/// global.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vault {
    pub version: u32,
    pub posture: Posture,
    pub personas: HashMap<String, Persona>,
    pub facts: Vec<Fact>,
    pub rules: Vec<Rule>,
    pub scheduled_rules: Vec<ScheduledRule>,
    pub approval_queue: Vec<Approval>,
    pub audit_log: Vec<AuditEntry>,
}

/// Current schema version this crate knows how to read and write.
pub const CURRENT_VAULT_VERSION: u32 = 1;

impl Default for Vault {
    fn default() -> Self {
        Self {
            version: CURRENT_VAULT_VERSION,
            posture: Posture::default(),
            personas: HashMap::new(),
            facts: Vec::new(),
            rules: Vec::new(),
            scheduled_rules: Vec::new(),
            approval_queue: Vec::new(),
            audit_log: Vec::new(),
        }
    }
}

impl Vault {
    pub fn with_posture(posture: Posture) -> Self {
        Self {
            posture,
            ..Self::default()
        }
    }

    /// Check the cross-cutting invariants every mutator is expected to
    /// uphold. Linear scans are fine here — vaults are personal-scale data,
    /// not multi-tenant-scale.
    pub fn check_invariants(&self) -> Result<(), crate::error::PersonafyError> {
        fn check_unique<'a>(
            ids: impl Iterator<Item = &'a str>,
            what: &str,
        ) -> Result<(), crate::error::PersonafyError> {
            let mut seen = std::collections::HashSet::new();
            for id in ids {
                if !seen.insert(id) {
                    return Err(crate::error::PersonafyError::InternalInvariantViolation(
                        format!("duplicate {what} id: {id}"),
                    ));
                }
            }
            Ok(())
        }

        check_unique(self.rules.iter().map(|r| r.id.as_str()), "rule")?;
        check_unique(
            self.scheduled_rules.iter().map(|r| r.id.as_str()),
            "scheduled rule",
        )?;
        check_unique(self.facts.iter().map(|f| f.id.as_str()), "fact")?;
        check_unique(
            self.approval_queue.iter().map(|a| a.id.as_str()),
            "approval",
        )?;
        check_unique(self.audit_log.iter().map(|e| e.id.as_str()), "audit entry")?;

        let mut last_ts = 0u64;
        for entry in &self.audit_log {
            if entry.timestamp_ms < last_ts {
                return Err(crate::error::PersonafyError::InternalInvariantViolation(
                    "audit log timestamps out of order".into(),
                ));
            }
            last_ts = entry.timestamp_ms;
        }
        Ok(())
    }
}
