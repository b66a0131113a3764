// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # Axum Middleware Example
//!
//! Demonstrates fronting a vault with an Axum HTTP server so remote agents
//! can request personal-data context over the network.
//!
//! Every inbound request carries `X-Agent-Id` and a JSON body naming the
//! persona, fields, and purpose. The middleware runs the request through
//! [`personafy_core::handle::VaultHandle::request_context`] and responds
//! with the disclosed fields, a `202 Accepted` if the request is queued for
//! owner approval, or a `403 Forbidden` if it's denied outright.
//!
//! ## Running
//!
//! Add Axum and Tokio to a downstream crate's `Cargo.toml`:
//!
//! ```toml
//! axum   = "0.7"
//! tokio  = { version = "1", features = ["full"] }
//! personafy-core = { path = "../crates/personafy-core" }
//! ```
//!
//! Then run:
//!
//! ```bash
//! cargo run --example axum_middleware
//! ```
//!
//! Test with:
//!
//! ```bash
//! # Approved — a standing rule covers this field for this agent
//! curl -H "X-Agent-Id: agent-scheduler" http://localhost:3000/context/work/calendar
//!
//! # Queued for approval — no rule covers this field yet
//! curl -H "X-Agent-Id: agent-scheduler" http://localhost:3000/context/work/employer
//! ```

// NOTE: This example requires `axum` and `tokio` as dev-dependencies in a
// crate that depends on personafy-core. It is written as a self-contained
// illustration; the imports below are annotated with the crates they
// originate from.

use std::sync::{Arc, Mutex};

use personafy_core::{
    config::EngineConfig,
    handle::{now_ms, new_id, VaultHandle},
    types::{Decision, Posture, Request, RequestType, Rule},
};

/// Thread-safe handle that can be shared across Axum handlers.
///
/// In production you would back this with `personafy-store::FileBackend`
/// instead of the default in-memory vault, and persist after every mutating
/// call.
type SharedVault = Arc<Mutex<VaultHandle>>;

/// Construct a pre-seeded vault for the API server.
fn build_vault() -> VaultHandle {
    let mut handle = VaultHandle::create(Posture::Guarded, EngineConfig::default());
    handle.set_persona("work", "Work", Default::default(), now_ms());
    handle
        .add_rule(
            Rule {
                id: new_id(),
                persona: "work".to_string(),
                fields: vec!["calendar".to_string()],
                agent_id: Some("agent-scheduler".to_string()),
                purpose_pattern: None,
                created_at_ms: now_ms(),
            },
            now_ms(),
        )
        .expect("seed rule");
    handle
}

// ---------------------------------------------------------------------------
// Middleware logic (framework-agnostic helper)
// ---------------------------------------------------------------------------

/// Disclosure gate result returned by the middleware.
#[derive(Debug)]
pub struct GateResult {
    /// The HTTP status code to return.
    pub status: u16,
    /// Human-readable summary for the response body or log line.
    pub summary: String,
}

/// Evaluate whether `agent_id` may read `field` from `persona`, and map the
/// outcome onto an HTTP status.
///
/// This function is the framework-agnostic core of the middleware. Call it
/// from an Axum `middleware::from_fn` closure, a Tower layer, or any other
/// request interceptor.
pub fn context_gate(vault: &mut VaultHandle, agent_id: &str, persona: &str, field: &str) -> GateResult {
    let request = Request {
        agent_id: agent_id.to_string(),
        request_type: RequestType::Message,
        persona: persona.to_string(),
        fields: vec![field.to_string()],
        purpose: "http request".to_string(),
        source_id: None,
    };

    let result = match vault.request_context(request, now_ms()) {
        Ok(result) => result,
        Err(err) => {
            return GateResult {
                status: 400,
                summary: format!("invalid request: {err}"),
            }
        }
    };

    match result.decision {
        Decision::Approved if !result.approved_fields.is_empty() => GateResult {
            status: 200,
            summary: format!("{:?}", result.approved_fields),
        },
        Decision::Pending => GateResult {
            status: 202,
            summary: format!("queued for approval: {:?}", result.approval_id),
        },
        _ => GateResult {
            status: 403,
            summary: "denied".to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Pseudo-main — illustrates how the middleware would be wired
// ---------------------------------------------------------------------------

fn main() {
    let vault: SharedVault = Arc::new(Mutex::new(build_vault()));

    println!("Personafy — Axum Middleware Example\n");
    println!("Simulating two incoming HTTP requests:\n");

    let requests = vec![
        ("agent-scheduler", "work", "calendar"),
        ("agent-scheduler", "work", "employer"),
    ];

    for (agent_id, persona, field) in requests {
        let mut locked_vault = vault.lock().unwrap();
        let result = context_gate(&mut locked_vault, agent_id, persona, field);
        drop(locked_vault);

        println!("  GET /context/{persona}/{field} (agent={agent_id}) → HTTP {} ({})", result.status, result.summary);
    }

    println!("\nAxum wiring (pseudo-code):");
    println!(
        r#"
  // In your actual Axum server:

  let app = Router::new()
      .route("/context/:persona/:field", get(context_handler))
      .with_state(vault.clone());

  async fn context_handler(
      State(vault): State<SharedVault>,
      Path((persona, field)): Path<(String, String)>,
      headers: HeaderMap,
  ) -> Response {{
      let agent_id = headers
          .get("x-agent-id")
          .and_then(|v| v.to_str().ok())
          .unwrap_or("unknown");

      let result = {{
          let mut vault = vault.lock().unwrap();
          context_gate(&mut vault, agent_id, &persona, &field)
      }};

      (StatusCode::from_u16(result.status).unwrap(), result.summary).into_response()
  }}
"#
    );

    println!("Done.");
}
