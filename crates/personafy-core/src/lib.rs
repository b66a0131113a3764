// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # personafy-core
//!
//! Policy and disclosure engine for Personafy, a personal-data privacy
//! vault that mediates disclosure of user facts to autonomous agents.
//!
//! ## Architecture
//!
//! ```text
//! VaultHandle
//!   ├── Vault                   — personas, facts, rules, approvals, audit log
//!   ├── ContextEngine           — posture gate → classify → materialize → queue → audit
//!   │     └── RuleEvaluator     — pure classification of requested fields
//!   ├── ScheduledRuleManager    — heartbeat/cron rules + pre-warm cache
//!   ├── ApprovalQueue           — pending disclosure resolution
//!   └── AuditLogger             — append-only, hash-chained decision log
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use personafy_core::{
//!     config::EngineConfig,
//!     handle::VaultHandle,
//!     types::{Posture, Request, RequestType},
//! };
//!
//! let mut handle = VaultHandle::create(Posture::Guarded, EngineConfig::default());
//! handle.set_persona("work", "Work", Default::default(), 0);
//! handle.add_rule(
//!     personafy_core::types::Rule {
//!         id: "r1".into(),
//!         persona: "work".into(),
//!         fields: vec!["tools".into()],
//!         agent_id: None,
//!         purpose_pattern: None,
//!         created_at_ms: 0,
//!     },
//!     0,
//! ).unwrap();
//!
//! let result = handle.request_context(
//!     Request {
//!         agent_id: "agent-1".into(),
//!         request_type: RequestType::Message,
//!         persona: "work".into(),
//!         fields: vec!["tools".into()],
//!         purpose: "help".into(),
//!         source_id: None,
//!     },
//!     0,
//! ).unwrap();
//! assert!(matches!(result.decision, personafy_core::types::Decision::Approved));
//! ```

pub mod audit;
pub mod backend;
pub mod config;
pub mod crypto;
pub mod engine;
pub mod error;
pub mod handle;
pub mod maintenance;
pub mod queue;
pub mod rules;
pub mod scheduled;
pub mod store;
pub mod types;

#[cfg(feature = "config-loader")]
pub mod config_loader;

pub use backend::{InMemoryBackend, VaultBackend};
pub use config::EngineConfig;
pub use engine::ContextEngine;
pub use error::{PersonafyError, PersonafyResult};
pub use handle::VaultHandle;
pub use types::{
    Approval, ApprovalStatus, AuditDecision, AuditEntry, AuditFilter, ContextResult, Decision,
    Fact, Persona, Posture, Request, RequestType, Resolution, Rule, ScheduledRule,
    ScheduledRuleKind, Vault,
};

#[cfg(feature = "config-loader")]
pub use config_loader::{load_config, load_config_from_env, ConfigError, PersonafyConfig};
