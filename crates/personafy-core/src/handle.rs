// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Host-facing facade over the vault, context engine, scheduled rules, and
//! maintenance sweep.
//!
//! An explicit handle, not a process-wide global: `VaultHandle` is returned
//! by [`VaultHandle::create`]/[`VaultHandle::load`] and every operation is a
//! method call against it. This removes hidden state and makes handles
//! trivially parallelizable across tests.

use std::collections::HashMap;

use uuid::Uuid;

use crate::backend::VaultBackend;
use crate::config::EngineConfig;
use crate::engine::ContextEngine;
use crate::error::{PersonafyError, PersonafyResult};
use crate::maintenance::{self, MaintenanceOptions, MaintenanceSummary};
use crate::scheduled::ScheduledRuleManager;
use crate::store::{self, VaultStore};
use crate::types::{
    Approval, ApprovalStatus, AuditEntry, AuditFilter, ContextResult, Fact, Posture, Request,
    Resolution, Rule, ScheduledRule, Vault,
};

/// Owns one vault, its context engine, and its process-local scheduled-rule
/// cache. Not `Sync` by convention — see the crate's concurrency note —
/// hosts that need cross-thread access wrap a handle in their own mutex.
pub struct VaultHandle {
    vault: Vault,
    engine: ContextEngine,
    scheduled: ScheduledRuleManager,
    config: EngineConfig,
}

impl VaultHandle {
    /// Create a fresh, empty vault with the given posture (default
    /// `guarded`).
    pub fn create(posture: Posture, config: EngineConfig) -> Self {
        Self {
            vault: VaultStore::create_empty(posture),
            engine: ContextEngine::new(config.clone()),
            scheduled: ScheduledRuleManager::new(),
            config,
        }
    }

    /// Load a vault from `backend`, decrypting with `passphrase` if given.
    /// The passphrase is borrowed only for this call's duration and is never
    /// retained on the handle.
    pub fn load<B: VaultBackend>(
        backend: &B,
        passphrase: Option<&str>,
        strict: bool,
        config: EngineConfig,
    ) -> PersonafyResult<Self> {
        let vault = store::load(backend, passphrase, strict)?;
        Ok(Self {
            vault,
            engine: ContextEngine::new(config.clone()),
            scheduled: ScheduledRuleManager::new(),
            config,
        })
    }

    /// Persist the current vault state to `backend`, sealing with
    /// `passphrase` if given.
    pub fn save<B: VaultBackend>(&self, backend: &B, passphrase: Option<&str>) -> PersonafyResult<()> {
        store::save(backend, &self.vault, passphrase)
    }

    pub fn posture(&self) -> Posture {
        self.vault.posture
    }

    pub fn set_posture(&mut self, posture: Posture) {
        self.vault.posture = posture;
    }

    pub fn set_persona(
        &mut self,
        id: &str,
        label: &str,
        fields: HashMap<String, String>,
        now_ms: u64,
    ) {
        VaultStore::set_persona(&mut self.vault, id, label, fields, now_ms);
    }

    pub fn add_fact(
        &mut self,
        id: &str,
        persona: &str,
        field: &str,
        value: &str,
        now_ms: u64,
    ) -> PersonafyResult<()> {
        VaultStore::add_fact(&mut self.vault, id, persona, field, value, now_ms)
    }

    pub fn delete_fact(&mut self, id: &str) -> bool {
        VaultStore::delete_fact(&mut self.vault, id)
    }

    pub fn add_rule(&mut self, mut rule: Rule, now_ms: u64) -> PersonafyResult<Rule> {
        if self.vault.rules.iter().any(|r| r.id == rule.id) {
            return Err(PersonafyError::DuplicateId(rule.id));
        }
        rule.created_at_ms = now_ms;
        self.vault.rules.push(rule.clone());
        Ok(rule)
    }

    pub fn remove_rule(&mut self, id: &str) -> bool {
        let before = self.vault.rules.len();
        self.vault.rules.retain(|r| r.id != id);
        self.vault.rules.len() != before
    }

    pub fn add_scheduled_rule(&mut self, rule: ScheduledRule) -> PersonafyResult<ScheduledRule> {
        if self.vault.scheduled_rules.iter().any(|r| r.id == rule.id) {
            return Err(PersonafyError::DuplicateId(rule.id));
        }
        self.vault.scheduled_rules.push(rule.clone());
        Ok(rule)
    }

    pub fn revoke_scheduled_rule(&mut self, id: &str) -> bool {
        let before = self.vault.scheduled_rules.len();
        self.vault.scheduled_rules.retain(|r| r.id != id);
        self.vault.scheduled_rules.len() != before
    }

    /// Run one context request through the engine.
    pub fn request_context(&mut self, request: Request, now_ms: u64) -> PersonafyResult<ContextResult> {
        self.engine
            .request_context(&mut self.vault, &mut self.scheduled, request, now_ms)
    }

    pub fn resolve_approval(
        &mut self,
        id: &str,
        decision: Resolution,
        resolved_by: Option<String>,
        standing_rule_id: Option<String>,
        now_ms: u64,
    ) -> bool {
        crate::queue::ApprovalQueue::resolve(
            &mut self.vault.approval_queue,
            id,
            decision,
            resolved_by,
            standing_rule_id,
            now_ms,
        )
    }

    pub fn get_pending_approvals(&self) -> Vec<&Approval> {
        self.vault
            .approval_queue
            .iter()
            .filter(|a| a.status == ApprovalStatus::Pending)
            .collect()
    }

    pub fn get_approval_by_id(&self, id: &str) -> Option<&Approval> {
        self.vault.approval_queue.iter().find(|a| a.id == id)
    }

    pub fn get_audit_log(&self, filter: Option<&AuditFilter>) -> Vec<&AuditEntry> {
        match filter {
            Some(filter) => crate::audit::AuditLogger::query(&self.vault.audit_log, filter),
            None => self.vault.audit_log.iter().collect(),
        }
    }

    pub fn correlate_audit_entries(&self, correlation_id: &str) -> Vec<&AuditEntry> {
        crate::audit::AuditLogger::correlate(&self.vault.audit_log, correlation_id)
    }

    pub fn pre_warm(&mut self, source_id: &str, now_ms: u64) {
        self.scheduled.pre_warm(&self.vault, source_id, now_ms);
    }

    pub fn get_pre_warmed(&self, source_id: &str) -> Option<&crate::scheduled::PreWarmedContext> {
        self.scheduled.get_pre_warmed(source_id)
    }

    pub fn clear_pre_warmed(&mut self, source_id: &str) {
        self.scheduled.clear_pre_warmed(source_id);
    }

    pub fn maintenance_sweep(&mut self, now_ms: u64) -> MaintenanceSummary {
        let opts = MaintenanceOptions {
            audit_retention_ms: self.config.default_audit_retention_ms,
            approval_keep_count: self.config.default_approval_keep_count,
        };
        maintenance::maintenance_sweep(&mut self.vault, &mut self.scheduled, now_ms, opts)
    }

    /// Borrow the underlying vault, for host-side inspection that doesn't
    /// warrant its own facade method (e.g. listing personas).
    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn facts_for_persona(&self, persona: &str) -> Vec<&Fact> {
        VaultStore::get_facts_by_persona(&self.vault, persona)
    }
}

/// Convenience for callers that don't want to track `now_ms` themselves.
/// Never called from inside `rules`, `engine`, `queue`, or `scheduled` —
/// only at this outermost call boundary.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Generate a fresh id for a host-authored rule that doesn't need a
/// meaningful name.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
