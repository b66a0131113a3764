// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Context engine — the top-level state machine: posture gate → classify →
//! materialize values → queue → audit.

use uuid::Uuid;

use crate::audit::AuditLogger;
use crate::config::EngineConfig;
use crate::error::PersonafyError;
use crate::queue::ApprovalQueue;
use crate::rules::RuleEvaluator;
use crate::scheduled::ScheduledRuleManager;
use crate::store::VaultStore;
use crate::types::{AuditDecision, ContextResult, Decision, Request, Vault};

/// Composes the rule evaluator, approval queue, and audit log into a single
/// `request_context` operation.
pub struct ContextEngine {
    config: EngineConfig,
}

impl ContextEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Run one context request through the full six-step algorithm of the
    /// component design: normalize, classify, materialize, queue, decide,
    /// audit.
    ///
    /// Never returns `Err` for a policy outcome — a denial is a `Decision`,
    /// not an error. Only malformed input surfaces as
    /// [`PersonafyError::InvalidRequest`], and in that case nothing is
    /// enqueued and no audit entry is recorded.
    pub fn request_context(
        &mut self,
        vault: &mut Vault,
        scheduled: &mut ScheduledRuleManager,
        request: Request,
        now_ms: u64,
    ) -> Result<ContextResult, PersonafyError> {
        // Step 1: normalize / validate.
        if request.agent_id.trim().is_empty() {
            return Err(PersonafyError::InvalidRequest("agent_id is empty".into()));
        }
        if request.persona.trim().is_empty() {
            return Err(PersonafyError::InvalidRequest("persona is empty".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for field in &request.fields {
            if !seen.insert(field) {
                return Err(PersonafyError::InvalidRequest(format!(
                    "duplicate field in request: {field}"
                )));
            }
        }
        if self.config.require_nonempty_purpose && request.purpose.trim().is_empty() {
            return Err(PersonafyError::InvalidRequest("purpose is empty".into()));
        }

        // Step 2: classify.
        let classification = RuleEvaluator::classify(vault, scheduled, &request, now_ms);
        let covered_fields: Vec<String> = classification.covered.keys().cloned().collect();
        let pending_fields: Vec<String> = classification.pending.clone();
        let blocked_fields: Vec<String> = classification.blocked.clone();
        drop(classification);

        // Step 3: materialize covered values.
        let mut approved_fields = std::collections::HashMap::new();
        for field in &covered_fields {
            let value = VaultStore::get_field_value(vault, &request.persona, field);
            approved_fields.insert(field.clone(), value);
        }

        // Step 4: enqueue pending fields, if any.
        let mut approval_id = None;
        if !pending_fields.is_empty() {
            let id = Uuid::new_v4().to_string();
            let frozen_request = Request {
                agent_id: request.agent_id.clone(),
                request_type: request.request_type,
                persona: request.persona.clone(),
                fields: pending_fields.clone(),
                purpose: request.purpose.clone(),
                source_id: request.source_id.clone(),
            };
            ApprovalQueue::enqueue(
                &mut vault.approval_queue,
                id.clone(),
                frozen_request,
                now_ms,
                self.config.default_approval_ttl_ms,
            );
            approval_id = Some(id);
        }

        // Step 5: decide. Empty-fields requests fall through to `Approved`
        // with nothing in any bucket — preserved deliberately, see
        // DESIGN.md's "empty fields array" decision.
        let decision = if !pending_fields.is_empty() {
            if approved_fields.is_empty() {
                Decision::Pending
            } else {
                Decision::Approved
            }
        } else if !blocked_fields.is_empty() {
            Decision::Denied
        } else {
            Decision::Approved
        };

        // Step 6: audit. Correlation id reuses the request's source id when
        // present (heartbeat/cron ticks naturally correlate on it); plain
        // message requests carry no correlation id.
        let audit_decision = match decision {
            Decision::Approved => AuditDecision::Approved,
            Decision::Pending => AuditDecision::Pending,
            Decision::Denied => AuditDecision::Denied,
        };
        AuditLogger::append(
            &mut vault.audit_log,
            Uuid::new_v4().to_string(),
            request.agent_id.clone(),
            request.request_type,
            request.persona.clone(),
            request.fields.clone(),
            request.purpose.clone(),
            audit_decision,
            now_ms,
            request.source_id.clone(),
            request.source_id.clone(),
        );

        if matches!(decision, Decision::Denied) {
            tracing::warn!(agent_id = %request.agent_id, persona = %request.persona, "context request denied");
        }

        Ok(ContextResult {
            decision,
            approved_fields,
            pending_fields,
            denied_fields: blocked_fields,
            approval_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Posture, RequestType, Rule};

    fn engine() -> ContextEngine {
        ContextEngine::new(EngineConfig::default())
    }

    fn rule(persona: &str, fields: &[&str]) -> Rule {
        Rule {
            id: format!("rule-{persona}"),
            persona: persona.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            agent_id: None,
            purpose_pattern: None,
            created_at_ms: 0,
        }
    }

    fn request(persona: &str, fields: &[&str]) -> Request {
        Request {
            agent_id: "agent-1".to_string(),
            request_type: RequestType::Message,
            persona: persona.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            purpose: "help".to_string(),
            source_id: None,
        }
    }

    #[test]
    fn baseline_coverage_scenario() {
        let mut vault = Vault::default();
        crate::store::VaultStore::set_persona(
            &mut vault,
            "work",
            "Work",
            std::collections::HashMap::from([
                ("tools".to_string(), "vscode".to_string()),
                ("communication_style".to_string(), "concise".to_string()),
            ]),
            0,
        );
        vault.rules.push(rule("work", &["tools", "communication_style"]));
        let mut scheduled = ScheduledRuleManager::new();

        let result = engine()
            .request_context(
                &mut vault,
                &mut scheduled,
                request("work", &["tools", "communication_style", "review_preferences"]),
                0,
            )
            .unwrap();

        assert_eq!(result.decision, Decision::Approved);
        assert_eq!(result.approved_fields.get("tools").unwrap().as_deref(), Some("vscode"));
        assert_eq!(result.pending_fields, vec!["review_preferences".to_string()]);
        assert!(result.approval_id.is_some());
    }

    #[test]
    fn locked_posture_denies_everything() {
        let mut vault = Vault::default();
        vault.posture = Posture::Locked;
        vault.rules.push(rule("work", &["tools"]));
        let mut scheduled = ScheduledRuleManager::new();

        let result = engine()
            .request_context(&mut vault, &mut scheduled, request("work", &["tools"]), 0)
            .unwrap();

        assert_eq!(result.decision, Decision::Denied);
        assert!(result.approved_fields.is_empty());
        assert_eq!(result.denied_fields, vec!["tools".to_string()]);
        assert!(vault.approval_queue.is_empty());
    }

    #[test]
    fn empty_agent_id_is_rejected_without_side_effects() {
        let mut vault = Vault::default();
        let mut scheduled = ScheduledRuleManager::new();
        let mut req = request("work", &["tools"]);
        req.agent_id = String::new();

        let err = engine()
            .request_context(&mut vault, &mut scheduled, req, 0)
            .unwrap_err();

        assert!(matches!(err, PersonafyError::InvalidRequest(_)));
        assert!(vault.audit_log.is_empty());
        assert!(vault.approval_queue.is_empty());
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let mut vault = Vault::default();
        let mut scheduled = ScheduledRuleManager::new();
        let req = request("work", &["tools", "tools"]);

        let err = engine()
            .request_context(&mut vault, &mut scheduled, req, 0)
            .unwrap_err();
        assert!(matches!(err, PersonafyError::InvalidRequest(_)));
    }

    #[test]
    fn empty_fields_array_is_approved_with_nothing_in_any_bucket() {
        let mut vault = Vault::default();
        let mut scheduled = ScheduledRuleManager::new();
        let result = engine()
            .request_context(&mut vault, &mut scheduled, request("work", &[]), 0)
            .unwrap();

        assert_eq!(result.decision, Decision::Approved);
        assert!(result.approved_fields.is_empty());
        assert!(result.pending_fields.is_empty());
        assert!(result.denied_fields.is_empty());
    }

    #[test]
    fn every_accepted_request_appends_exactly_one_audit_entry() {
        let mut vault = Vault::default();
        let mut scheduled = ScheduledRuleManager::new();
        engine()
            .request_context(&mut vault, &mut scheduled, request("work", &["tools"]), 0)
            .unwrap();
        assert_eq!(vault.audit_log.len(), 1);
    }
}
