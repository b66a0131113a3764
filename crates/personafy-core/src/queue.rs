// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Approval queue: enqueue pending disclosure requests, resolve them, and
//! sweep stale or excess entries.

use crate::types::{Approval, ApprovalStatus, Request, Resolution};

pub struct ApprovalQueue;

impl ApprovalQueue {
    /// Enqueue a pending approval for `request`, expiring at `now_ms +
    /// ttl_ms` unless resolved first.
    pub fn enqueue(
        queue: &mut Vec<Approval>,
        id: String,
        request: Request,
        now_ms: u64,
        ttl_ms: u64,
    ) -> String {
        queue.push(Approval {
            id: id.clone(),
            request,
            status: ApprovalStatus::Pending,
            created_at_ms: now_ms,
            expires_at_ms: now_ms + ttl_ms,
            resolved_at_ms: None,
            resolved_by: None,
            standing_rule_id: None,
        });
        id
    }

    /// Resolve a pending approval. Returns `false` without mutating anything
    /// if the id is unknown or the approval is no longer pending — resolving
    /// an already-resolved approval never double-resolves or toggles status.
    ///
    /// `standing_rule_id` only records the caller's intent to have minted a
    /// follow-up rule; this queue never touches `Vault::rules` itself — the
    /// host authors the rule separately and reports its id back here.
    pub fn resolve(
        queue: &mut [Approval],
        id: &str,
        decision: Resolution,
        resolved_by: Option<String>,
        standing_rule_id: Option<String>,
        now_ms: u64,
    ) -> bool {
        let Some(approval) = queue.iter_mut().find(|a| a.id == id) else {
            return false;
        };
        if approval.status != ApprovalStatus::Pending {
            return false;
        }
        approval.status = decision.into();
        approval.resolved_at_ms = Some(now_ms);
        approval.resolved_by = resolved_by;
        approval.standing_rule_id = standing_rule_id;
        true
    }

    /// Transition pending entries whose `expires_at_ms <= now_ms` to
    /// `expired`. Returns the count transitioned. Idempotent once `now_ms`
    /// is fixed.
    pub fn expire_stale(queue: &mut [Approval], now_ms: u64) -> usize {
        let mut count = 0;
        for approval in queue.iter_mut() {
            if approval.status == ApprovalStatus::Pending && approval.expires_at_ms <= now_ms {
                approval.status = ApprovalStatus::Expired;
                approval.resolved_at_ms = Some(now_ms);
                count += 1;
            }
        }
        if count > 0 {
            tracing::info!(count, "expired stale approvals");
        }
        count
    }

    /// Remove the oldest resolved entries in excess of `limit`, preserving
    /// insertion order of what remains.
    pub fn prune_resolved(queue: &mut Vec<Approval>, limit: usize) -> usize {
        let resolved_count = queue
            .iter()
            .filter(|a| a.status != ApprovalStatus::Pending)
            .count();
        if resolved_count <= limit {
            return 0;
        }
        let mut to_drop = resolved_count - limit;
        let mut pruned = 0;
        queue.retain(|a| {
            if a.status != ApprovalStatus::Pending && to_drop > 0 {
                to_drop -= 1;
                pruned += 1;
                false
            } else {
                true
            }
        });
        pruned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequestType;

    fn sample_request() -> Request {
        Request {
            agent_id: "agent-1".to_string(),
            request_type: RequestType::Message,
            persona: "work".to_string(),
            fields: vec!["tools".to_string()],
            purpose: "help".to_string(),
            source_id: None,
        }
    }

    #[test]
    fn enqueue_sets_expiry_from_ttl() {
        let mut queue = Vec::new();
        ApprovalQueue::enqueue(&mut queue, "a1".to_string(), sample_request(), 1000, 500);
        assert_eq!(queue[0].expires_at_ms, 1500);
        assert_eq!(queue[0].status, ApprovalStatus::Pending);
    }

    #[test]
    fn resolve_twice_returns_true_then_false_and_keeps_first_decision() {
        let mut queue = Vec::new();
        ApprovalQueue::enqueue(&mut queue, "a1".to_string(), sample_request(), 0, 1000);

        let first = ApprovalQueue::resolve(&mut queue, "a1", Resolution::Approved, None, None, 10);
        let second = ApprovalQueue::resolve(&mut queue, "a1", Resolution::Denied, None, None, 20);

        assert!(first);
        assert!(!second);
        assert_eq!(queue[0].status, ApprovalStatus::Approved);
    }

    #[test]
    fn resolve_unknown_id_returns_false() {
        let mut queue = Vec::new();
        assert!(!ApprovalQueue::resolve(&mut queue, "missing", Resolution::Approved, None, None, 0));
    }

    #[test]
    fn expire_stale_only_touches_expired_pending_entries() {
        let mut queue = Vec::new();
        ApprovalQueue::enqueue(&mut queue, "a1".to_string(), sample_request(), 0, 1000);
        ApprovalQueue::enqueue(&mut queue, "a2".to_string(), sample_request(), 0, 5000);

        let count = ApprovalQueue::expire_stale(&mut queue, 2000);
        assert_eq!(count, 1);
        assert_eq!(queue[0].status, ApprovalStatus::Expired);
        assert_eq!(queue[1].status, ApprovalStatus::Pending);
    }

    #[test]
    fn expire_stale_is_idempotent() {
        let mut queue = Vec::new();
        ApprovalQueue::enqueue(&mut queue, "a1".to_string(), sample_request(), 0, 1000);
        ApprovalQueue::expire_stale(&mut queue, 2000);
        let second_pass = ApprovalQueue::expire_stale(&mut queue, 2000);
        assert_eq!(second_pass, 0);
    }

    #[test]
    fn prune_resolved_keeps_limit_and_preserves_order() {
        let mut queue = Vec::new();
        for i in 0..5 {
            ApprovalQueue::enqueue(&mut queue, format!("a{i}"), sample_request(), 0, 1000);
            ApprovalQueue::resolve(&mut queue, &format!("a{i}"), Resolution::Approved, None, None, 1);
        }
        let pruned = ApprovalQueue::prune_resolved(&mut queue, 2);
        assert_eq!(pruned, 3);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].id, "a3");
        assert_eq!(queue[1].id, "a4");
    }

    #[test]
    fn prune_resolved_never_removes_pending_entries() {
        let mut queue = Vec::new();
        ApprovalQueue::enqueue(&mut queue, "a1".to_string(), sample_request(), 0, 1000);
        let pruned = ApprovalQueue::prune_resolved(&mut queue, 0);
        assert_eq!(pruned, 0);
        assert_eq!(queue.len(), 1);
    }
}
