// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # Basic Vault Example
//!
//! Demonstrates the full disclosure pipeline — personas, rules, context
//! requests, approvals, and the audit log — against an in-memory backend.
//! Run with:
//!
//! ```bash
//! cargo run --example basic
//! ```

use std::collections::HashMap;

use personafy_core::{
    config::EngineConfig,
    handle::{new_id, VaultHandle},
    types::{AuditFilter, ContextResult, Posture, Request, RequestType, Resolution, Rule},
};

fn main() {
    println!("Personafy — Basic Vault Example\n");

    let mut handle = VaultHandle::create(Posture::Guarded, EngineConfig::default());

    // -----------------------------------------------------------------------
    // 1. Create personas and seed facts
    // -----------------------------------------------------------------------
    let mut work_fields = HashMap::new();
    work_fields.insert("employer".to_string(), "Acme Corp".to_string());
    handle.set_persona("work", "Work", work_fields, 0);

    handle
        .add_fact("f1", "work", "calendar", "busy until 5pm", 0)
        .expect("seed fact");

    println!("Persona 'work' created with employer + calendar facts.\n");

    // -----------------------------------------------------------------------
    // 2. Author a standing rule granting calendar access to a trusted agent
    // -----------------------------------------------------------------------
    handle
        .add_rule(
            Rule {
                id: "r-scheduling".to_string(),
                persona: "work".to_string(),
                fields: vec!["calendar".to_string()],
                agent_id: Some("agent-scheduler".to_string()),
                purpose_pattern: Some("scheduling".to_string()),
                created_at_ms: 0,
            },
            0,
        )
        .expect("add rule");

    println!("Rule added: agent-scheduler may read 'calendar' for scheduling purposes.\n");

    // -----------------------------------------------------------------------
    // 3. Evaluate context requests
    // -----------------------------------------------------------------------

    // Request A — covered by the standing rule, should auto-approve.
    let result_a = handle
        .request_context(
            Request {
                agent_id: "agent-scheduler".to_string(),
                request_type: RequestType::Message,
                persona: "work".to_string(),
                fields: vec!["calendar".to_string()],
                purpose: "scheduling a meeting".to_string(),
                source_id: None,
            },
            1_000,
        )
        .expect("request_context");
    print_result("agent-scheduler requests calendar", &result_a);

    // Request B — no rule covers 'employer' for this agent, so it queues.
    let result_b = handle
        .request_context(
            Request {
                agent_id: "agent-scheduler".to_string(),
                request_type: RequestType::Message,
                persona: "work".to_string(),
                fields: vec!["employer".to_string()],
                purpose: "verifying identity".to_string(),
                source_id: None,
            },
            2_000,
        )
        .expect("request_context");
    print_result("agent-scheduler requests employer (uncovered)", &result_b);

    // -----------------------------------------------------------------------
    // 4. Resolve the pending approval
    // -----------------------------------------------------------------------
    if let Some(approval_id) = result_b.approval_id {
        println!("Resolving pending approval {approval_id} as approved...");
        handle.resolve_approval(
            &approval_id,
            Resolution::Approved,
            Some("owner".to_string()),
            None,
            3_000,
        );
    }

    println!("\nPending approvals remaining: {}", handle.get_pending_approvals().len());

    // -----------------------------------------------------------------------
    // 5. Lock the vault and confirm every request is now denied
    // -----------------------------------------------------------------------
    handle.set_posture(Posture::Locked);
    let result_c = handle
        .request_context(
            Request {
                agent_id: "agent-scheduler".to_string(),
                request_type: RequestType::Message,
                persona: "work".to_string(),
                fields: vec!["calendar".to_string()],
                purpose: "scheduling a meeting".to_string(),
                source_id: None,
            },
            4_000,
        )
        .expect("request_context");
    print_result("agent-scheduler requests calendar (vault locked)", &result_c);

    // -----------------------------------------------------------------------
    // 6. Query the audit log
    // -----------------------------------------------------------------------
    println!("\nAudit log:");
    let entries = handle.get_audit_log(Some(&AuditFilter::default()));
    for entry in &entries {
        println!(
            "  [{}] agent={} decision={:?} fields={:?}",
            &entry.id[..8.min(entry.id.len())],
            entry.agent_id,
            entry.decision,
            entry.fields
        );
    }

    let _ = new_id();
    println!("\nDone.");
}

fn print_result(label: &str, result: &ContextResult) {
    println!(
        "[{label}] decision={:?} approved={:?} pending={:?} denied={:?}",
        result.decision, result.approved_fields, result.pending_fields, result.denied_fields
    );
}
