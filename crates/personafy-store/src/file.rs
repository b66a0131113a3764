// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! File-based persistence for the vault blob.
//!
//! [`FileBackend`] persists the vault's serialized (plaintext or sealed)
//! contents to `vault-data.json` inside a state directory. Every write is
//! atomic — written to `vault-data.json.tmp` then renamed over the target —
//! so a crash mid-write never leaves a partially-written file.
//!
//! ## Caveats
//!
//! Concurrent access from multiple processes is not supported; the host
//! must coordinate a single writer, per the crate's single-threaded
//! concurrency contract.

use std::path::{Path, PathBuf};

use personafy_core::backend::VaultBackend;
use personafy_core::error::PersonafyError;

const FILE_NAME: &str = "vault-data.json";

/// A file-backed [`VaultBackend`] rooted at a state directory.
///
/// # Examples
///
/// ```rust,no_run
/// use personafy_store::FileBackend;
///
/// let backend = FileBackend::open("/tmp/personafy-state").expect("could not open backend");
/// ```
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open (creating if missing) a state directory for vault persistence.
    pub fn open<P: AsRef<Path>>(dir: P) -> std::io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn file_path(&self) -> PathBuf {
        self.dir.join(FILE_NAME)
    }

    fn tmp_path(&self) -> PathBuf {
        self.dir.join(format!("{FILE_NAME}.tmp"))
    }
}

impl VaultBackend for FileBackend {
    fn read(&self) -> Result<Option<String>, PersonafyError> {
        let path = self.file_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        Ok(Some(contents))
    }

    fn write(&self, contents: &str) -> Result<(), PersonafyError> {
        let tmp_path = self.tmp_path();
        std::fs::write(&tmp_path, contents)?;
        std::fs::rename(&tmp_path, self.file_path())?;
        tracing::debug!(path = %self.file_path().display(), bytes = contents.len(), "vault state flushed to disk");
        Ok(())
    }
}
