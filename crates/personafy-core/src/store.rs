// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! In-memory CRUD on a [`Vault`], plus envelope-aware load/save against a
//! [`VaultBackend`].

use crate::backend::VaultBackend;
use crate::crypto;
use crate::error::PersonafyError;
use crate::types::{Fact, Persona, Posture, Vault, CURRENT_VAULT_VERSION};

/// Stateless operations on a [`Vault`]. Everything here is a free function or
/// an inherent method taking `&mut Vault` — there is no `VaultStore` struct
/// to hold state, since the vault itself is the only state worth owning.
pub struct VaultStore;

impl VaultStore {
    /// A new vault with empty collections and the given posture.
    pub fn create_empty(posture: Posture) -> Vault {
        Vault::with_posture(posture)
    }

    /// Upsert a persona. Preserves `created_at_ms` on update; bumps
    /// `updated_at_ms`. Incoming `fields` keys overwrite existing ones;
    /// fields not mentioned are left untouched.
    pub fn set_persona(
        vault: &mut Vault,
        id: &str,
        label: &str,
        fields: std::collections::HashMap<String, String>,
        now_ms: u64,
    ) {
        match vault.personas.get_mut(id) {
            Some(existing) => {
                existing.label = label.to_string();
                existing.fields.extend(fields);
                existing.updated_at_ms = now_ms;
            }
            None => {
                vault.personas.insert(
                    id.to_string(),
                    Persona {
                        id: id.to_string(),
                        label: label.to_string(),
                        fields,
                        created_at_ms: now_ms,
                        updated_at_ms: now_ms,
                    },
                );
            }
        }
    }

    pub fn add_fact(
        vault: &mut Vault,
        id: &str,
        persona: &str,
        field: &str,
        value: &str,
        now_ms: u64,
    ) -> Result<(), PersonafyError> {
        if vault.facts.iter().any(|f| f.id == id) {
            return Err(PersonafyError::DuplicateId(id.to_string()));
        }
        vault.facts.push(Fact {
            id: id.to_string(),
            persona: persona.to_string(),
            field: field.to_string(),
            value: value.to_string(),
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        });
        Ok(())
    }

    /// Remove a fact by id. Returns `true` if a fact was actually removed.
    pub fn delete_fact(vault: &mut Vault, id: &str) -> bool {
        let before = vault.facts.len();
        vault.facts.retain(|f| f.id != id);
        vault.facts.len() != before
    }

    pub fn get_facts_by_persona<'a>(vault: &'a Vault, persona: &str) -> Vec<&'a Fact> {
        vault.facts.iter().filter(|f| f.persona == persona).collect()
    }

    /// Field resolution order: `Persona.fields` first, then the first
    /// matching `Fact`, otherwise absent.
    pub fn get_field_value(vault: &Vault, persona: &str, field: &str) -> Option<String> {
        if let Some(p) = vault.personas.get(persona) {
            if let Some(value) = p.fields.get(field) {
                return Some(value.clone());
            }
        }
        vault
            .facts
            .iter()
            .find(|f| f.persona == persona && f.field == field)
            .map(|f| f.value.clone())
    }
}

/// Read a vault from `backend`. An absent blob yields an empty vault unless
/// `strict` is set, in which case it fails with
/// [`PersonafyError::CorruptFile`] describing the missing blob (see
/// DESIGN.md for the "missing file in strict mode" error-kind decision).
pub fn load<B: VaultBackend>(
    backend: &B,
    passphrase: Option<&str>,
    strict: bool,
) -> Result<Vault, PersonafyError> {
    let raw = backend.read()?;
    let raw = match raw {
        Some(raw) => raw,
        None if strict => {
            return Err(PersonafyError::CorruptFile(
                "vault file is missing and strict mode was requested".to_string(),
            ))
        }
        None => {
            tracing::debug!("no existing vault blob; returning empty vault");
            return Ok(Vault::default());
        }
    };

    let json = match passphrase {
        Some(pass) => {
            let plaintext = crypto::open(&raw, pass)?;
            String::from_utf8(plaintext)
                .map_err(|e| PersonafyError::CorruptFile(e.to_string()))?
        }
        None => raw,
    };

    let vault: Vault =
        serde_json::from_str(&json).map_err(|e| PersonafyError::CorruptFile(e.to_string()))?;

    if vault.version > CURRENT_VAULT_VERSION {
        return Err(PersonafyError::UnsupportedVersion(vault.version));
    }

    vault.check_invariants()?;
    Ok(vault)
}

/// Serialize and persist `vault` to `backend`, sealing it when `passphrase`
/// is given.
pub fn save<B: VaultBackend>(
    backend: &B,
    vault: &Vault,
    passphrase: Option<&str>,
) -> Result<(), PersonafyError> {
    vault.check_invariants()?;
    let json = serde_json::to_string_pretty(vault)
        .map_err(|e| PersonafyError::CorruptFile(e.to_string()))?;

    let payload = match passphrase {
        Some(pass) => crypto::seal(json.as_bytes(), pass),
        None => json,
    };

    backend.write(&payload)?;
    tracing::info!(encrypted = passphrase.is_some(), "vault saved");
    Ok(())
}
