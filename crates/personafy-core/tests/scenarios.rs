// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! End-to-end scenarios exercising the full vault handle across a realistic
//! sequence of persona, rule, and request operations.

use std::collections::HashMap;

use personafy_core::config::EngineConfig;
use personafy_core::handle::VaultHandle;
use personafy_core::types::{
    ApprovalStatus, Decision, Posture, Request, RequestType, Resolution, Rule, ScheduledRule,
    ScheduledRuleKind, TimeWindow,
};

fn work_persona_handle(posture: Posture) -> VaultHandle {
    let mut handle = VaultHandle::create(posture, EngineConfig::default());
    let mut fields = HashMap::new();
    fields.insert("tools".to_string(), "vscode".to_string());
    fields.insert("communication_style".to_string(), "concise".to_string());
    handle.set_persona("work", "Work", fields, 0);
    handle
        .add_rule(
            Rule {
                id: "r1".to_string(),
                persona: "work".to_string(),
                fields: vec!["tools".to_string(), "communication_style".to_string()],
                agent_id: None,
                purpose_pattern: None,
                created_at_ms: 0,
            },
            0,
        )
        .unwrap();
    handle
}

fn baseline_request() -> Request {
    Request {
        agent_id: "agent-1".to_string(),
        request_type: RequestType::Message,
        persona: "work".to_string(),
        fields: vec![
            "tools".to_string(),
            "communication_style".to_string(),
            "review_preferences".to_string(),
        ],
        purpose: "help".to_string(),
        source_id: None,
    }
}

#[test]
fn baseline_coverage_approves_known_fields_and_queues_the_rest() {
    let mut handle = work_persona_handle(Posture::Guarded);
    let result = handle.request_context(baseline_request(), 1000).unwrap();

    assert_eq!(result.decision, Decision::Approved);
    assert_eq!(
        result.approved_fields.get("tools").cloned().flatten(),
        Some("vscode".to_string())
    );
    assert_eq!(
        result.approved_fields.get("communication_style").cloned().flatten(),
        Some("concise".to_string())
    );
    assert_eq!(result.pending_fields, vec!["review_preferences".to_string()]);
    assert!(result.approval_id.is_some());
}

#[test]
fn locked_posture_denies_everything_and_enqueues_no_approval() {
    let mut handle = work_persona_handle(Posture::Locked);
    let result = handle.request_context(baseline_request(), 1000).unwrap();

    assert_eq!(result.decision, Decision::Denied);
    assert!(result.approved_fields.is_empty());
    assert_eq!(result.denied_fields.len(), 3);
    assert!(result.approval_id.is_none());
    assert!(handle.get_pending_approvals().is_empty());
}

#[test]
fn open_posture_grants_only_where_a_rule_exists() {
    let mut handle = VaultHandle::create(Posture::Open, EngineConfig::default());
    let mut fields = HashMap::new();
    fields.insert("name".to_string(), "Alice".to_string());
    fields.insert("email".to_string(), "alice@example.com".to_string());
    handle.set_persona("personal", "Personal", fields, 0);
    handle
        .add_rule(
            Rule {
                id: "r1".to_string(),
                persona: "personal".to_string(),
                fields: vec!["name".to_string()],
                agent_id: None,
                purpose_pattern: None,
                created_at_ms: 0,
            },
            0,
        )
        .unwrap();

    let result = handle
        .request_context(
            Request {
                agent_id: "agent-1".to_string(),
                request_type: RequestType::Message,
                persona: "personal".to_string(),
                fields: vec!["name".to_string(), "email".to_string()],
                purpose: "help".to_string(),
                source_id: None,
            },
            1000,
        )
        .unwrap();

    assert_eq!(
        result.approved_fields.get("name").cloned().flatten(),
        Some("Alice".to_string())
    );
    assert_eq!(result.pending_fields, vec!["email".to_string()]);
}

#[test]
fn agents_are_compartmentalized_to_their_own_rules() {
    let mut handle = VaultHandle::create(Posture::Guarded, EngineConfig::default());
    let mut personal_fields = HashMap::new();
    personal_fields.insert("name".to_string(), "Alice".to_string());
    personal_fields.insert("email".to_string(), "alice@example.com".to_string());
    handle.set_persona("personal", "Personal", personal_fields, 0);

    let mut shopping_fields = HashMap::new();
    shopping_fields.insert("size".to_string(), "M".to_string());
    handle.set_persona("shopping", "Shopping", shopping_fields, 0);

    handle
        .add_rule(
            Rule {
                id: "r1".to_string(),
                persona: "personal".to_string(),
                fields: vec!["name".to_string(), "email".to_string()],
                agent_id: Some("assistant".to_string()),
                purpose_pattern: None,
                created_at_ms: 0,
            },
            0,
        )
        .unwrap();
    handle
        .add_rule(
            Rule {
                id: "r2".to_string(),
                persona: "shopping".to_string(),
                fields: vec!["size".to_string()],
                agent_id: Some("shopper".to_string()),
                purpose_pattern: None,
                created_at_ms: 0,
            },
            0,
        )
        .unwrap();

    let assistant_wants_shopping = handle
        .request_context(
            Request {
                agent_id: "assistant".to_string(),
                request_type: RequestType::Message,
                persona: "shopping".to_string(),
                fields: vec!["size".to_string()],
                purpose: "help".to_string(),
                source_id: None,
            },
            1000,
        )
        .unwrap();
    assert_eq!(assistant_wants_shopping.decision, Decision::Pending);

    let shopper_wants_personal = handle
        .request_context(
            Request {
                agent_id: "shopper".to_string(),
                request_type: RequestType::Message,
                persona: "personal".to_string(),
                fields: vec!["name".to_string()],
                purpose: "help".to_string(),
                source_id: None,
            },
            1000,
        )
        .unwrap();
    assert_eq!(shopper_wants_personal.decision, Decision::Pending);

    let assistant_wants_own = handle
        .request_context(
            Request {
                agent_id: "assistant".to_string(),
                request_type: RequestType::Message,
                persona: "personal".to_string(),
                fields: vec!["name".to_string()],
                purpose: "help".to_string(),
                source_id: None,
            },
            1000,
        )
        .unwrap();
    assert_eq!(assistant_wants_own.decision, Decision::Approved);
}

#[test]
fn heartbeat_lifecycle_flips_from_approved_to_pending_after_expiry() {
    let mut handle = VaultHandle::create(Posture::Guarded, EngineConfig::default());
    let mut fields = HashMap::new();
    fields.insert("tools".to_string(), "vscode".to_string());
    fields.insert("role".to_string(), "engineer".to_string());
    handle.set_persona("work", "Work", fields, 0);

    handle
        .add_scheduled_rule(ScheduledRule {
            id: "hb1".to_string(),
            kind: ScheduledRuleKind::Heartbeat,
            source_id: "hb1".to_string(),
            agent_id: "agent-1".to_string(),
            persona: "work".to_string(),
            fields: vec!["tools".to_string(), "role".to_string()],
            expires_at_ms: 60_000,
            created_at_ms: 0,
            time_window: None,
        })
        .unwrap();

    let heartbeat_request = Request {
        agent_id: "agent-1".to_string(),
        request_type: RequestType::Heartbeat,
        persona: "work".to_string(),
        fields: vec!["tools".to_string(), "role".to_string()],
        purpose: "tick".to_string(),
        source_id: Some("hb1".to_string()),
    };

    let before_expiry = handle.request_context(heartbeat_request.clone(), 30_000).unwrap();
    assert_eq!(before_expiry.decision, Decision::Approved);

    handle.maintenance_sweep(120_000);

    let after_expiry = handle.request_context(heartbeat_request, 120_000).unwrap();
    assert_eq!(after_expiry.decision, Decision::Pending);
}

#[test]
fn cron_time_window_crosses_midnight_correctly() {
    let mut handle = VaultHandle::create(Posture::Guarded, EngineConfig::default());
    let mut fields = HashMap::new();
    fields.insert("tools".to_string(), "vscode".to_string());
    handle.set_persona("work", "Work", fields, 0);

    handle
        .add_scheduled_rule(ScheduledRule {
            id: "cron1".to_string(),
            kind: ScheduledRuleKind::Cron,
            source_id: "cron1".to_string(),
            agent_id: "agent-1".to_string(),
            persona: "work".to_string(),
            fields: vec!["tools".to_string()],
            expires_at_ms: u64::MAX,
            created_at_ms: 0,
            time_window: Some(TimeWindow { from: (23, 0), to: (1, 0) }),
        })
        .unwrap();

    // 1970-01-01 23:30 UTC.
    let active_late_night = 23 * 3_600_000 + 30 * 60_000;
    // 1970-01-02 00:30 UTC.
    let active_after_midnight = 24 * 3_600_000 + 30 * 60_000;
    // 1970-01-02 02:00 UTC.
    let inactive = 24 * 3_600_000 + 2 * 3_600_000;

    let cron_request = Request {
        agent_id: "agent-1".to_string(),
        request_type: RequestType::Cron,
        persona: "work".to_string(),
        fields: vec!["tools".to_string()],
        purpose: "tick".to_string(),
        source_id: Some("cron1".to_string()),
    };

    assert_eq!(
        handle
            .request_context(cron_request.clone(), active_late_night)
            .unwrap()
            .decision,
        Decision::Approved
    );
    assert_eq!(
        handle
            .request_context(cron_request.clone(), active_after_midnight)
            .unwrap()
            .decision,
        Decision::Approved
    );
    assert_eq!(
        handle.request_context(cron_request, inactive).unwrap().decision,
        Decision::Pending
    );

    handle.pre_warm("cron1", active_late_night);
    let warmed = handle.get_pre_warmed("cron1").expect("pre-warmed entry present");
    assert_eq!(warmed.fields.get("tools").cloned().flatten(), Some("vscode".to_string()));

    handle.clear_pre_warmed("cron1");
    assert!(handle.get_pre_warmed("cron1").is_none());
}

#[test]
fn resolve_approval_twice_is_idempotent_and_final_status_is_first_decision() {
    let mut handle = work_persona_handle(Posture::Guarded);
    let result = handle.request_context(baseline_request(), 1000).unwrap();
    let approval_id = result.approval_id.unwrap();

    let first = handle.resolve_approval(&approval_id, Resolution::Denied, None, None, 2000);
    let second = handle.resolve_approval(&approval_id, Resolution::Approved, None, None, 3000);

    assert!(first);
    assert!(!second);
    assert_eq!(handle.get_approval_by_id(&approval_id).unwrap().status, ApprovalStatus::Denied);
}
