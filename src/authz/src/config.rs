//! Environment configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AuthzError, Result};

pub const TENANT_ID_VAR: &str = "AZURE_TENANT_ID";
pub const CLIENT_ID_VAR: &str = "AZURE_CLIENT_ID";
pub const ROLE_CONFIG_VAR: &str = "AUTHZ_ROLE_CONFIG";
pub const KEY_CACHE_TTL_VAR: &str = "AUTHZ_KEY_CACHE_TTL_SECS";

/// Default lifetime of a fetched key set
pub const DEFAULT_KEY_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Authorizer configuration
///
/// Tenant and client ids are optional here so that a misconfigured process
/// still answers every request, with a deny.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizerConfig {
    /// Directory tenant the tokens are issued under
    pub tenant_id: Option<String>,

    /// Accepted audiences, comma separated
    pub client_id: Option<String>,

    /// JSON file replacing the built-in role tables
    pub role_config: Option<PathBuf>,

    pub key_cache_ttl: Duration,
}

/// Tenant and audience ids of a usable configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity<'a> {
    pub tenant_id: &'a str,
    pub client_id: &'a str,
}

impl AuthorizerConfig {
    pub fn new(tenant_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            tenant_id: Some(tenant_id.into()),
            client_id: Some(client_id.into()),
            role_config: None,
            key_cache_ttl: DEFAULT_KEY_CACHE_TTL,
        }
    }

    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through a variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let key_cache_ttl = non_blank(KEY_CACHE_TTL_VAR)
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_KEY_CACHE_TTL);

        Self {
            tenant_id: non_blank(TENANT_ID_VAR),
            client_id: non_blank(CLIENT_ID_VAR),
            role_config: non_blank(ROLE_CONFIG_VAR).map(PathBuf::from),
            key_cache_ttl,
        }
    }

    /// Tenant and client ids, or `ConfigurationMissing`
    pub fn require(&self) -> Result<Identity<'_>> {
        let tenant_id = self
            .tenant_id
            .as_deref()
            .ok_or(AuthzError::ConfigurationMissing(TENANT_ID_VAR))?;
        let client_id = self
            .client_id
            .as_deref()
            .ok_or(AuthzError::ConfigurationMissing(CLIENT_ID_VAR))?;

        Ok(Identity {
            tenant_id,
            client_id,
        })
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        Self { port }
    }
}
