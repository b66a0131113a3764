// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Error taxonomy for the vault and its sub-systems.

use thiserror::Error;

/// Result type alias used throughout `personafy-core`.
pub type PersonafyResult<T> = Result<T, PersonafyError>;

/// Errors surfaced across the vault, crypto envelope, and persistence layer.
///
/// The context engine itself never returns one of these for policy outcomes
/// — a denial is a [`crate::types::Decision`], not an error. Only malformed
/// input (`InvalidRequest`) escapes `request_context`.
#[derive(Error, Debug)]
pub enum PersonafyError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("bad passphrase")]
    BadPassphrase,

    #[error("corrupt vault file: {0}")]
    CorruptFile(String),

    #[error("unsupported vault schema version: {0}")]
    UnsupportedVersion(u32),

    #[error("duplicate id: {0}")]
    DuplicateId(String),

    #[error("io failure: {0}")]
    IoFailure(#[from] std::io::Error),

    #[error("internal invariant violation: {0}")]
    InternalInvariantViolation(String),
}
