// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Configuration loader for [`crate::config::EngineConfig`].
//!
//! Supports two load strategies:
//!
//! 1. **TOML file** — [`load_config`] reads and deserializes a TOML file
//!    into a [`PersonafyConfig`] struct.
//! 2. **Environment variables** — [`load_config_from_env`] reads
//!    `PERSONAFY_`-prefixed environment variables.
//!
//! Both loaders require the `config-loader` feature.
//!
//! # File format
//!
//! ```toml
//! default_approval_ttl_ms    = 604800000   # 7 days
//! default_audit_retention_ms = 7776000000  # 90 days
//! default_approval_keep_count = 1000
//! require_nonempty_purpose    = false
//! ```
//!
//! # Environment variables
//!
//! | Variable                                  | Type    | Default       |
//! |--------------------------------------------|---------|--------------|
//! | `PERSONAFY_DEFAULT_APPROVAL_TTL_MS`         | integer | 604800000    |
//! | `PERSONAFY_DEFAULT_AUDIT_RETENTION_MS`      | integer | 7776000000   |
//! | `PERSONAFY_DEFAULT_APPROVAL_KEEP_COUNT`     | integer | 1000         |
//! | `PERSONAFY_REQUIRE_NONEMPTY_PURPOSE`        | boolean | false        |

#![cfg(feature = "config-loader")]

use std::fmt;
use std::fs;
use std::num::ParseIntError;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

// ---------------------------------------------------------------------------
// PersonafyConfig
// ---------------------------------------------------------------------------

/// Flat, serialization-friendly mirror of [`EngineConfig`] used for TOML
/// file and environment-variable loading without coupling the on-disk
/// schema to the engine's internal struct shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonafyConfig {
    #[serde(default = "default_approval_ttl_ms")]
    pub default_approval_ttl_ms: u64,

    #[serde(default = "default_audit_retention_ms")]
    pub default_audit_retention_ms: u64,

    #[serde(default = "default_approval_keep_count")]
    pub default_approval_keep_count: usize,

    #[serde(default)]
    pub require_nonempty_purpose: bool,
}

fn default_approval_ttl_ms() -> u64 {
    7 * 24 * 60 * 60 * 1000
}
fn default_audit_retention_ms() -> u64 {
    90 * 24 * 60 * 60 * 1000
}
fn default_approval_keep_count() -> usize {
    1000
}

impl Default for PersonafyConfig {
    fn default() -> Self {
        Self {
            default_approval_ttl_ms: default_approval_ttl_ms(),
            default_audit_retention_ms: default_audit_retention_ms(),
            default_approval_keep_count: default_approval_keep_count(),
            require_nonempty_purpose: false,
        }
    }
}

impl From<PersonafyConfig> for EngineConfig {
    fn from(cfg: PersonafyConfig) -> Self {
        EngineConfig {
            default_approval_ttl_ms: cfg.default_approval_ttl_ms,
            default_audit_retention_ms: cfg.default_audit_retention_ms,
            default_approval_keep_count: cfg.default_approval_keep_count,
            require_nonempty_purpose: cfg.require_nonempty_purpose,
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or parsing engine configuration.
#[derive(Debug)]
pub enum ConfigError {
    FileRead { path: String, source: std::io::Error },
    TomlParse { source: toml::de::Error },
    ParseField { field: String, value: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileRead { path, source } => {
                write!(f, "failed to read config file \"{path}\": {source}")
            }
            ConfigError::TomlParse { source } => write!(f, "failed to parse TOML config: {source}"),
            ConfigError::ParseField { field, value, reason } => {
                write!(f, "field \"{field}\": cannot parse \"{value}\" — {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileRead { source, .. } => Some(source),
            ConfigError::TomlParse { source } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TOML loader
// ---------------------------------------------------------------------------

/// Load a [`PersonafyConfig`] from a TOML file.
pub fn load_config(path: &str) -> Result<PersonafyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_owned(),
        source,
    })?;

    toml::from_str::<PersonafyConfig>(&content)
        .map_err(|source| ConfigError::TomlParse { source })
}

// ---------------------------------------------------------------------------
// Environment variable loader
// ---------------------------------------------------------------------------

/// Load a [`PersonafyConfig`] from `PERSONAFY_`-prefixed environment
/// variables. Unset variables fall back to their defaults.
pub fn load_config_from_env() -> Result<PersonafyConfig, ConfigError> {
    let default_approval_ttl_ms = read_env_u64(
        "PERSONAFY_DEFAULT_APPROVAL_TTL_MS",
        default_approval_ttl_ms(),
    )?;
    let default_audit_retention_ms = read_env_u64(
        "PERSONAFY_DEFAULT_AUDIT_RETENTION_MS",
        default_audit_retention_ms(),
    )?;
    let default_approval_keep_count = read_env_usize(
        "PERSONAFY_DEFAULT_APPROVAL_KEEP_COUNT",
        default_approval_keep_count(),
    )?;
    let require_nonempty_purpose = read_env_bool("PERSONAFY_REQUIRE_NONEMPTY_PURPOSE", false)?;

    Ok(PersonafyConfig {
        default_approval_ttl_ms,
        default_audit_retention_ms,
        default_approval_keep_count,
        require_nonempty_purpose,
    })
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn read_env_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<u64>()
            .map_err(|source: ParseIntError| ConfigError::ParseField {
                field: key.to_owned(),
                value: val,
                reason: source.to_string(),
            }),
        Err(_) => Ok(default),
    }
}

fn read_env_usize(key: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<usize>()
            .map_err(|source: ParseIntError| ConfigError::ParseField {
                field: key.to_owned(),
                value: val,
                reason: source.to_string(),
            }),
        Err(_) => Ok(default),
    }
}

fn read_env_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            other => Err(ConfigError::ParseField {
                field: key.to_owned(),
                value: other.to_owned(),
                reason: "expected one of: true/false, 1/0, yes/no, on/off".into(),
            }),
        },
        Err(_) => Ok(default),
    }
}
