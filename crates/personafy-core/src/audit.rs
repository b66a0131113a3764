// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Audit log management.
//!
//! [`AuditLogger`] exposes append, query, and correlation over the vault's
//! `audit_log` sequence. Records are chained via SHA-256 hashes so tampering
//! with any past entry is detectable — the log itself is recording-only,
//! there is no anomaly detection or alerting.

use sha2::{Digest, Sha256};

use crate::types::{AuditDecision, AuditEntry, AuditFilter, RequestType};

/// Stateless operations over an [`AuditEntry`] log. There is no `AuditLogger`
/// struct to construct — every method takes the log slice/vec it operates on,
/// since the log itself lives inside [`crate::types::Vault`].
pub struct AuditLogger;

impl AuditLogger {
    /// Append a new entry to `log`, chaining it to the previous entry's hash.
    #[allow(clippy::too_many_arguments)]
    pub fn append(
        log: &mut Vec<AuditEntry>,
        id: String,
        agent_id: String,
        request_type: RequestType,
        persona: String,
        fields: Vec<String>,
        purpose: String,
        decision: AuditDecision,
        timestamp_ms: u64,
        correlation_id: Option<String>,
        source_id: Option<String>,
    ) -> AuditEntry {
        let prev_hash = log
            .last()
            .map(|e| e.hash.clone())
            .unwrap_or_else(|| "0".repeat(64));

        let hash = compute_hash(
            &prev_hash,
            &agent_id,
            &persona,
            &fields,
            &purpose,
            decision,
            timestamp_ms,
        );

        let entry = AuditEntry {
            id,
            agent_id,
            request_type,
            persona,
            fields,
            purpose,
            decision,
            timestamp_ms,
            correlation_id,
            source_id,
            hash,
            prev_hash,
        };

        tracing::debug!(entry_id = %entry.id, decision = ?entry.decision, "audit entry appended");
        log.push(entry.clone());
        entry
    }

    /// Return entries matching `filter`, oldest first.
    pub fn query<'a>(log: &'a [AuditEntry], filter: &AuditFilter) -> Vec<&'a AuditEntry> {
        log.iter()
            .filter(|entry| {
                if let Some(ref agent_id) = filter.agent_id {
                    if &entry.agent_id != agent_id {
                        return false;
                    }
                }
                if let Some(since_ms) = filter.since_ms {
                    if entry.timestamp_ms < since_ms {
                        return false;
                    }
                }
                if let Some(ref correlation_id) = filter.correlation_id {
                    if entry.correlation_id.as_deref() != Some(correlation_id.as_str()) {
                        return false;
                    }
                }
                true
            })
            .take(filter.limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// All entries sharing `correlation_id`, oldest first.
    pub fn correlate<'a>(log: &'a [AuditEntry], correlation_id: &str) -> Vec<&'a AuditEntry> {
        log.iter()
            .filter(|e| e.correlation_id.as_deref() == Some(correlation_id))
            .collect()
    }

    /// Drop entries older than `now_ms - retention_ms`. The hash chain is not
    /// re-linked after a prune — pruned history is gone, not rewritten,
    /// matching the "no guarantee of forgetting beyond retention sweeps"
    /// non-goal.
    pub fn prune_older_than(log: &mut Vec<AuditEntry>, now_ms: u64, retention_ms: u64) -> usize {
        let cutoff = now_ms.saturating_sub(retention_ms);
        let before = log.len();
        log.retain(|e| e.timestamp_ms >= cutoff);
        before - log.len()
    }
}

#[allow(clippy::too_many_arguments)]
fn compute_hash(
    prev_hash: &str,
    agent_id: &str,
    persona: &str,
    fields: &[String],
    purpose: &str,
    decision: AuditDecision,
    timestamp_ms: u64,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prev_hash.as_bytes());
    hasher.update(agent_id.as_bytes());
    hasher.update(persona.as_bytes());
    for field in fields {
        hasher.update(field.as_bytes());
    }
    hasher.update(purpose.as_bytes());
    hasher.update([decision as u8]);
    hasher.update(timestamp_ms.to_be_bytes());
    format!("{:x}", hasher.finalize())
}
