// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Periodic sweep: expire approvals, expire scheduled rules, prune audit,
//! prune resolved approvals. Safe to call repeatedly.

use serde::{Deserialize, Serialize};

use crate::audit::AuditLogger;
use crate::queue::ApprovalQueue;
use crate::scheduled::ScheduledRuleManager;
use crate::types::Vault;

/// Tuning knobs for a single [`maintenance_sweep`] call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MaintenanceOptions {
    pub audit_retention_ms: u64,
    pub approval_keep_count: usize,
}

/// Counts of what a sweep actually touched, for host-side logging/metrics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MaintenanceSummary {
    pub approvals_expired: usize,
    pub scheduled_rules_expired: usize,
    pub audit_entries_pruned: usize,
    pub approvals_pruned: usize,
}

/// Run the full maintenance cycle against `vault`. Idempotent: calling it
/// twice with the same `now_ms` performs no additional work on the second
/// call.
pub fn maintenance_sweep(
    vault: &mut Vault,
    scheduled: &mut ScheduledRuleManager,
    now_ms: u64,
    opts: MaintenanceOptions,
) -> MaintenanceSummary {
    let approvals_expired = ApprovalQueue::expire_stale(&mut vault.approval_queue, now_ms);
    let scheduled_rules_expired = ScheduledRuleManager::expire_rules(vault, now_ms);
    scheduled.invalidate_stale(vault, now_ms);
    let audit_entries_pruned =
        AuditLogger::prune_older_than(&mut vault.audit_log, now_ms, opts.audit_retention_ms);
    let approvals_pruned =
        ApprovalQueue::prune_resolved(&mut vault.approval_queue, opts.approval_keep_count);

    let summary = MaintenanceSummary {
        approvals_expired,
        scheduled_rules_expired,
        audit_entries_pruned,
        approvals_pruned,
    };
    tracing::info!(?summary, "maintenance sweep complete");
    summary
}
