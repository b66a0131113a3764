// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # personafy-store
//!
//! `std`-only storage backend for `personafy-core`.
//!
//! This crate provides [`FileBackend`], a JSON-on-disk implementation of the
//! [`personafy_core::backend::VaultBackend`] trait suitable for CLI tools,
//! local agents, and server-side deployments that do not need a full
//! database.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use personafy_store::FileBackend;
//! use personafy_core::{config::EngineConfig, handle::VaultHandle, types::Posture};
//!
//! let backend = FileBackend::open("/var/lib/personafy")
//!     .expect("failed to open vault state directory");
//!
//! let handle = VaultHandle::load(&backend, None, false, EngineConfig::default())
//!     .expect("failed to load vault");
//! ```

pub mod file;

pub use file::FileBackend;
