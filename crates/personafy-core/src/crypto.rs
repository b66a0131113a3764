// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Encrypted-at-rest envelope for the vault blob.
//!
//! Fixed cipher suite, no agility: PBKDF2-HMAC-SHA256 key derivation feeding
//! AES-256-GCM. Wire format is `salt(16) ‖ iv(12) ‖ tag(16) ‖ ciphertext(n)`,
//! base64-encoded. There is no self-describing header — callers decide ahead
//! of time whether a blob is sealed or plain JSON.

use aes_gcm::aead::{generic_array::GenericArray, Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::Aes256Gcm;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

use crate::error::PersonafyError;

const SALT_LEN: usize = 16;
const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;
const PBKDF2_ROUNDS: u32 = 600_000;
const KEY_LEN: usize = 32;

fn derive_key(passphrase: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, PBKDF2_ROUNDS, &mut key);
    key
}

/// Seal `plaintext` under `passphrase`, returning a base64 envelope.
pub fn seal(plaintext: &[u8], passphrase: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    use aes_gcm::aead::rand_core::RngCore;
    OsRng.fill_bytes(&mut salt);

    let key = derive_key(passphrase, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key).expect("key length is fixed at 32 bytes");
    let iv = Aes256Gcm::generate_nonce(OsRng);

    // `aes-gcm` appends the 16-byte tag to the ciphertext; splitting here
    // keeps the on-disk layout explicit rather than relying on that detail.
    let mut sealed = cipher
        .encrypt(&iv, plaintext)
        .expect("AES-256-GCM encryption cannot fail for in-memory buffers");
    let tag = sealed.split_off(sealed.len() - TAG_LEN);

    let mut out = Vec::with_capacity(SALT_LEN + IV_LEN + TAG_LEN + sealed.len());
    out.extend_from_slice(&salt);
    out.extend_from_slice(iv.as_slice());
    out.extend_from_slice(&tag);
    out.extend_from_slice(&sealed);

    BASE64.encode(out)
}

/// Open an envelope produced by [`seal`]. Fails with
/// [`PersonafyError::BadPassphrase`] on any corruption or tag mismatch —
/// never on partial success, and never carrying partial plaintext.
pub fn open(sealed: &str, passphrase: &str) -> Result<Vec<u8>, PersonafyError> {
    let bytes = BASE64
        .decode(sealed.trim())
        .map_err(|_| PersonafyError::BadPassphrase)?;

    if bytes.len() < SALT_LEN + IV_LEN + TAG_LEN {
        return Err(PersonafyError::BadPassphrase);
    }

    let (salt, rest) = bytes.split_at(SALT_LEN);
    let (iv, rest) = rest.split_at(IV_LEN);
    let (tag, ciphertext) = rest.split_at(TAG_LEN);

    let key = derive_key(passphrase, salt);
    let cipher = Aes256Gcm::new_from_slice(&key).expect("key length is fixed at 32 bytes");

    let mut combined = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    combined.extend_from_slice(ciphertext);
    combined.extend_from_slice(tag);

    let nonce = GenericArray::from_slice(iv);
    cipher
        .decrypt(nonce, combined.as_ref())
        .map_err(|_| PersonafyError::BadPassphrase)
}
