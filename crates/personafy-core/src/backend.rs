// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Persistence abstraction for the vault blob.
//!
//! [`VaultBackend`] is the single interface between [`crate::store`] and
//! whatever holds the bytes — in-memory for tests, a JSON file on disk via
//! `personafy-store`, or something a host supplies itself. This crate ships
//! only [`InMemoryBackend`]; file-based persistence lives in the downstream
//! `personafy-store` crate so this one stays free of filesystem concerns.

use std::sync::Mutex;

use crate::error::PersonafyError;

/// Pluggable persistence interface for the serialized vault blob.
///
/// `read`/`write` operate on the raw string contents of `vault-data.json` —
/// either pretty-printed plaintext JSON or the base64 envelope of
/// [`crate::crypto`], depending on whether a passphrase is in play. The
/// backend itself never interprets the contents.
///
/// Implementations MUST be `Send + Sync` so a handle can be moved across
/// threads even though the engine itself assumes single-threaded use.
pub trait VaultBackend: Send + Sync {
    /// Read the stored blob, or `None` if nothing has been written yet.
    fn read(&self) -> Result<Option<String>, PersonafyError>;

    /// Overwrite the stored blob.
    fn write(&self, contents: &str) -> Result<(), PersonafyError>;
}

/// A volatile [`VaultBackend`] backed by a single in-process buffer.
///
/// Data lives only as long as the backend does; suitable for tests and for
/// hosts that manage persistence entirely outside this crate.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    blob: Mutex<Option<String>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VaultBackend for InMemoryBackend {
    fn read(&self) -> Result<Option<String>, PersonafyError> {
        Ok(self.blob.lock().expect("in-memory backend mutex poisoned").clone())
    }

    fn write(&self, contents: &str) -> Result<(), PersonafyError> {
        *self.blob.lock().expect("in-memory backend mutex poisoned") = Some(contents.to_string());
        Ok(())
    }
}
