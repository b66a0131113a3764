// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Engine-level configuration.
//!
//! [`EngineConfig`] is the single entry point for tuning the context engine
//! at construction time. All fields have sensible defaults so that
//! `EngineConfig::default()` is always a valid starting point.

use serde::{Deserialize, Serialize};

/// Top-level configuration for [`crate::engine::ContextEngine`] and
/// [`crate::maintenance::maintenance_sweep`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default approval TTL in milliseconds when a request produces a
    /// pending-candidate field. Defaults to 7 days.
    pub default_approval_ttl_ms: u64,

    /// Default audit retention window in milliseconds used by
    /// `maintenance_sweep` when the caller doesn't override it.
    pub default_audit_retention_ms: u64,

    /// Default number of resolved approvals to retain when pruning.
    pub default_approval_keep_count: usize,

    /// When `true`, `request_context` rejects requests whose `purpose`
    /// string is empty. The base algorithm in spec.md §4.4 doesn't require
    /// this; it's an additional strictness knob a host may opt into.
    pub require_nonempty_purpose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_approval_ttl_ms: 7 * 24 * 60 * 60 * 1000,
            default_audit_retention_ms: 90 * 24 * 60 * 60 * 1000,
            default_approval_keep_count: 1000,
            require_nonempty_purpose: false,
        }
    }
}
