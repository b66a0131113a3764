// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Pure field classification against the vault's posture, rules, and
//! scheduled rules.
//!
//! [`RuleEvaluator::classify`] mutates nothing — it reads the vault and the
//! active scheduled-rule state and reports how each requested field should
//! be treated. The context engine is the only caller that acts on the
//! result.

use std::collections::HashMap;

use crate::scheduled::ScheduledRuleManager;
use crate::types::{Posture, Request, Rule, ScheduledRule, Vault};

/// The rule that granted coverage for a field, recorded so the context
/// engine can attribute audit entries and the "first match wins" tie-break.
#[derive(Debug, Clone)]
pub enum CoveringRule<'a> {
    Standard(&'a Rule),
    Scheduled(&'a ScheduledRule),
}

/// Result of [`RuleEvaluator::classify`]: every requested field appears in
/// exactly one of the three maps/lists.
#[derive(Debug, Default)]
pub struct Classification<'a> {
    pub covered: HashMap<String, CoveringRule<'a>>,
    pub pending: Vec<String>,
    pub blocked: Vec<String>,
}

pub struct RuleEvaluator;

impl RuleEvaluator {
    /// Classify every field in `request.fields` as covered, pending, or
    /// blocked. Classification order follows the fixed five-step precedence:
    /// posture-locked short-circuit, scheduled rules, standard rules,
    /// posture-open promotion, then pending by default.
    pub fn classify<'a>(
        vault: &'a Vault,
        scheduled: &'a ScheduledRuleManager,
        request: &Request,
        now_ms: u64,
    ) -> Classification<'a> {
        let mut result = Classification::default();

        // Step 1: posture gate.
        if vault.posture == Posture::Locked {
            result.blocked = request.fields.clone();
            return result;
        }

        // Step 2: scheduled rules (heartbeat/cron), only when the request
        // carries a matching source id.
        if let Some(source_id) = &request.source_id {
            for field in &request.fields {
                if result.covered.contains_key(field) {
                    continue;
                }
                if let Some(scheduled_rule) = scheduled.find_active_match(
                    vault,
                    request.request_type,
                    source_id,
                    &request.agent_id,
                    &request.persona,
                    field,
                    now_ms,
                ) {
                    result
                        .covered
                        .insert(field.clone(), CoveringRule::Scheduled(scheduled_rule));
                }
            }
        }

        // Step 3: standard rules. Agent-generic rules are recorded first as
        // candidates; an agent-specific rule for the same field overrides in
        // a second pass regardless of insertion order (spec's tie-break).
        let mut generic_candidates: HashMap<String, &Rule> = HashMap::new();
        let mut specific_candidates: HashMap<String, &Rule> = HashMap::new();

        for rule in &vault.rules {
            if rule.persona != request.persona {
                continue;
            }
            if !rule.matches_agent(&request.agent_id) {
                continue;
            }
            if !rule.matches_purpose(&request.purpose) {
                continue;
            }
            for field in &request.fields {
                if result.covered.contains_key(field) || !rule.covers_field(field) {
                    continue;
                }
                if rule.agent_id.is_some() {
                    specific_candidates.entry(field.clone()).or_insert(rule);
                } else {
                    generic_candidates.entry(field.clone()).or_insert(rule);
                }
            }
        }

        for field in &request.fields {
            if result.covered.contains_key(field) {
                continue;
            }
            if let Some(rule) = specific_candidates.get(field).or_else(|| generic_candidates.get(field)) {
                result
                    .covered
                    .insert(field.clone(), CoveringRule::Standard(rule));
            }
        }

        // Step 4: posture `open` promotes a remaining field to covered only
        // when some standard rule for this (agent, persona) pair actually
        // lists that field — ignoring purpose, since `open` waives purpose
        // matching but not field scope. A field no rule lists stays pending
        // even under `open`; "open" never forges coverage for an entirely
        // unauthored persona or an unauthored field.
        if vault.posture == Posture::Open {
            for field in &request.fields {
                if result.covered.contains_key(field) || result.blocked.contains(field) {
                    continue;
                }
                if let Some(rule) = vault
                    .rules
                    .iter()
                    .find(|r| r.persona == request.persona && r.matches_agent(&request.agent_id) && r.covers_field(field))
                {
                    result
                        .covered
                        .insert(field.clone(), CoveringRule::Standard(rule));
                }
            }
        }

        // Step 5: everything left over is a pending candidate.
        for field in &request.fields {
            if !result.covered.contains_key(field) && !result.blocked.contains(field) {
                result.pending.push(field.clone());
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequestType;

    fn rule(persona: &str, fields: &[&str], agent_id: Option<&str>) -> Rule {
        Rule {
            id: format!("rule-{persona}-{:?}", fields),
            persona: persona.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            agent_id: agent_id.map(|s| s.to_string()),
            purpose_pattern: None,
            created_at_ms: 0,
        }
    }

    fn request(agent_id: &str, persona: &str, fields: &[&str]) -> Request {
        Request {
            agent_id: agent_id.to_string(),
            request_type: RequestType::Message,
            persona: persona.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            purpose: "help".to_string(),
            source_id: None,
        }
    }

    #[test]
    fn locked_posture_blocks_everything() {
        let mut vault = Vault::default();
        vault.posture = Posture::Locked;
        vault.rules.push(rule("work", &["tools"], None));

        let scheduled = ScheduledRuleManager::new();
        let req = request("agent-1", "work", &["tools"]);
        let result = RuleEvaluator::classify(&vault, &scheduled, &req, 0);

        assert!(result.covered.is_empty());
        assert_eq!(result.blocked, vec!["tools".to_string()]);
        assert!(result.pending.is_empty());
    }

    #[test]
    fn guarded_posture_covers_matching_rule_and_queues_the_rest() {
        let mut vault = Vault::default();
        vault.posture = Posture::Guarded;
        vault.rules.push(rule("work", &["tools", "communication_style"], None));

        let scheduled = ScheduledRuleManager::new();
        let req = request("agent-1", "work", &["tools", "communication_style", "review_preferences"]);
        let result = RuleEvaluator::classify(&vault, &scheduled, &req, 0);

        assert_eq!(result.covered.len(), 2);
        assert_eq!(result.pending, vec!["review_preferences".to_string()]);
        assert!(result.blocked.is_empty());
    }

    #[test]
    fn agent_specific_rule_overrides_generic_rule_for_same_field() {
        let mut vault = Vault::default();
        vault.rules.push(rule("work", &["tools"], None));
        vault.rules.push(rule("work", &["tools"], Some("agent-1")));

        let scheduled = ScheduledRuleManager::new();
        let req = request("agent-1", "work", &["tools"]);
        let result = RuleEvaluator::classify(&vault, &scheduled, &req, 0);

        match result.covered.get("tools").unwrap() {
            CoveringRule::Standard(r) => assert_eq!(r.agent_id.as_deref(), Some("agent-1")),
            _ => panic!("expected a standard rule"),
        }
    }

    #[test]
    fn open_posture_does_not_forge_coverage_for_unauthored_persona() {
        let mut vault = Vault::default();
        vault.posture = Posture::Open;
        vault.rules.push(rule("personal", &["name"], None));

        let scheduled = ScheduledRuleManager::new();
        let req = request("agent-1", "personal", &["name", "email"]);
        let result = RuleEvaluator::classify(&vault, &scheduled, &req, 0);

        assert!(result.covered.contains_key("name"));
        assert_eq!(result.pending, vec!["email".to_string()]);
    }

    #[test]
    fn agent_compartmentalization_keeps_requests_pending_across_agents() {
        let mut vault = Vault::default();
        vault.rules.push(rule("personal", &["name", "email"], Some("assistant")));
        vault.rules.push(rule("shopping", &["size"], Some("shopper")));

        let scheduled = ScheduledRuleManager::new();

        let shopper_wants_personal = request("shopper", "personal", &["name"]);
        let result = RuleEvaluator::classify(&vault, &scheduled, &shopper_wants_personal, 0);
        assert!(result.covered.is_empty());
        assert_eq!(result.pending, vec!["name".to_string()]);

        let assistant_wants_shopping = request("assistant", "shopping", &["size"]);
        let result = RuleEvaluator::classify(&vault, &scheduled, &assistant_wants_shopping, 0);
        assert!(result.covered.is_empty());
        assert_eq!(result.pending, vec!["size".to_string()]);
    }
}
