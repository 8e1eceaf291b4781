//! Guard configuration from the environment.
//!
//! | variable | meaning | default |
//! |---|---|---|
//! | `ROLEGATE_BIND_ADDR` | listen address | `127.0.0.1:8080` |
//! | `ROLEGATE_REQUIRED_ROLE` | required role | none |
//! | `ROLEGATE_REQUIRED_PERMISSIONS` | comma-separated permissions | none |
//! | `ROLEGATE_REDIRECT` | redirect target on denial | `/` |

use std::net::SocketAddr;

use axum::http::HeaderValue;
use rolegate_auth::{Permission, Role};
use thiserror::Error;

use crate::guard::GuardOptions;

pub const BIND_ADDR_VAR: &str = "ROLEGATE_BIND_ADDR";
pub const REQUIRED_ROLE_VAR: &str = "ROLEGATE_REQUIRED_ROLE";
pub const REQUIRED_PERMISSIONS_VAR: &str = "ROLEGATE_REQUIRED_PERMISSIONS";
pub const REDIRECT_VAR: &str = "ROLEGATE_REDIRECT";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    pub bind_addr: SocketAddr,
    pub options: GuardOptions,
}

impl GuardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests, layered config sources).
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: BIND_ADDR_VAR,
                value: bind_raw.clone(),
                reason: e.to_string(),
            })?;

        let required_role = lookup(REQUIRED_ROLE_VAR)
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .map(Role::from);

        let required_permissions = lookup(REQUIRED_PERMISSIONS_VAR).map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(|p| Permission::from(p.to_string()))
                .collect::<Vec<_>>()
        });

        let redirect = lookup(REDIRECT_VAR).filter(|r| !r.trim().is_empty());
        if let Some(destination) = &redirect {
            HeaderValue::try_from(destination.as_str()).map_err(|e| ConfigError::Invalid {
                key: REDIRECT_VAR,
                value: destination.clone(),
                reason: e.to_string(),
            })?;
        }

        let options = GuardOptions {
            required_role,
            required_permissions,
            redirect,
        };

        tracing::info!(
            %bind_addr,
            required_role = options.required_role.as_ref().map(|r| r.as_str()),
            required_permissions = options.required_permissions.as_ref().map(Vec::len),
            destination = options.destination(),
            "guard configuration loaded"
        );

        Ok(Self { bind_addr, options })
    }
}
