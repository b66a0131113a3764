// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Heartbeat and cron scheduled rules: active-match lookup, time-window
//! evaluation, and the process-local pre-warm cache.
//!
//! Scheduled rules themselves live in [`crate::types::Vault::scheduled_rules`]
//! — this module owns only the transient pre-warm cache and the pure
//! functions that read the rule set.

use std::collections::HashMap;

use chrono::{DateTime, Timelike, Utc};

use crate::types::{RequestType, ScheduledRule, ScheduledRuleKind, Vault};

/// Materialized disclosure payload cached ahead of a scheduled tick.
#[derive(Debug, Clone)]
pub struct PreWarmedContext {
    pub source_id: String,
    pub fields: HashMap<String, Option<String>>,
}

/// Process-local cache of pre-warmed cron results, keyed by `source_id`.
/// Never persisted; invalidated whenever the underlying rule expires or the
/// vault is reloaded.
#[derive(Debug, Default)]
pub struct ScheduledRuleManager {
    pre_warmed: HashMap<String, PreWarmedContext>,
}

impl ScheduledRuleManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find an active scheduled rule covering `field` for the given
    /// `(kind, source_id, agent_id, persona)` tuple.
    #[allow(clippy::too_many_arguments)]
    pub fn find_active_match<'a>(
        &self,
        vault: &'a Vault,
        request_type: RequestType,
        source_id: &str,
        agent_id: &str,
        persona: &str,
        field: &str,
        now_ms: u64,
    ) -> Option<&'a ScheduledRule> {
        let expected_kind = match request_type {
            RequestType::Heartbeat => ScheduledRuleKind::Heartbeat,
            RequestType::Cron => ScheduledRuleKind::Cron,
            RequestType::Message => return None,
        };

        vault.scheduled_rules.iter().find(|rule| {
            rule.kind == expected_kind
                && rule.source_id == source_id
                && rule.agent_id == agent_id
                && rule.persona == persona
                && rule.covers_field(field)
                && rule.is_active(now_ms)
                && time_window_allows(rule, now_ms)
        })
    }

    /// Drop scheduled rules that have expired as of `now_ms`. Returns the
    /// count removed.
    pub fn expire_rules(vault: &mut Vault, now_ms: u64) -> usize {
        let before = vault.scheduled_rules.len();
        vault.scheduled_rules.retain(|r| r.is_active(now_ms));
        before - vault.scheduled_rules.len()
    }

    /// Evaluate a cron rule against the vault without recording an audit
    /// entry, caching the materialized fields under `source_id`.
    pub fn pre_warm(
        &mut self,
        vault: &Vault,
        source_id: &str,
        now_ms: u64,
    ) -> Option<PreWarmedContext> {
        let rule = vault
            .scheduled_rules
            .iter()
            .find(|r| r.kind == ScheduledRuleKind::Cron && r.source_id == source_id)?;

        if !rule.is_active(now_ms) || !time_window_allows(rule, now_ms) {
            return None;
        }

        let mut fields = HashMap::new();
        for field in &rule.fields {
            let value = crate::store::VaultStore::get_field_value(vault, &rule.persona, field);
            fields.insert(field.clone(), value);
        }

        let context = PreWarmedContext {
            source_id: source_id.to_string(),
            fields,
        };
        self.pre_warmed.insert(source_id.to_string(), context.clone());
        Some(context)
    }

    pub fn get_pre_warmed(&self, source_id: &str) -> Option<&PreWarmedContext> {
        self.pre_warmed.get(source_id)
    }

    pub fn clear_pre_warmed(&mut self, source_id: &str) {
        self.pre_warmed.remove(source_id);
    }

    /// Drop any cached entry whose rule no longer exists or is inactive.
    /// Called from [`crate::maintenance::maintenance_sweep`] after expiry.
    pub fn invalidate_stale(&mut self, vault: &Vault, now_ms: u64) {
        self.pre_warmed.retain(|source_id, _| {
            vault
                .scheduled_rules
                .iter()
                .any(|r| &r.source_id == source_id && r.is_active(now_ms))
        });
    }
}

/// Whether `rule`'s optional cron time window admits `now_ms`. Heartbeat
/// rules and cron rules without a window always pass.
fn time_window_allows(rule: &ScheduledRule, now_ms: u64) -> bool {
    let Some(window) = rule.time_window else {
        return true;
    };
    let (hour, minute) = local_hour_minute(now_ms);
    window.contains(hour, minute)
}

/// Convert an injected epoch-millisecond timestamp into an hour/minute pair.
/// Uses UTC: the crate has no timezone-configuration surface, and spec.md's
/// "local-time" windows are evaluated against whatever timezone the host's
/// `now_ms` was sourced from — this function is a pure clock-free
/// conversion, never a live clock read.
fn local_hour_minute(now_ms: u64) -> (u8, u8) {
    let secs = (now_ms / 1000) as i64;
    let dt: DateTime<Utc> = DateTime::from_timestamp(secs, 0).unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap());
    (dt.hour() as u8, dt.minute() as u8)
}
