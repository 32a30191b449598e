use std::env;

use crate::error::{Result, RotogateError};
use crate::regions;

/// Display-name suffix for gateways that must be cleaned up by hand
pub const MANUAL_DELETION_MARKER: &str = " (Manual Deletion Required)";

/// AWS credential pair used to sign provider requests
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Session token for temporary credentials, if any
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    /// Resolve credentials from the ambient AWS environment variables
    pub fn from_env() -> Result<Self> {
        let access_key_id = env::var("AWS_ACCESS_KEY_ID")
            .map_err(|_| RotogateError::MissingCredentials("AWS_ACCESS_KEY_ID not set".into()))?;
        let secret_access_key = env::var("AWS_SECRET_ACCESS_KEY").map_err(|_| {
            RotogateError::MissingCredentials("AWS_SECRET_ACCESS_KEY not set".into())
        })?;
        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token: env::var("AWS_SESSION_TOKEN").ok(),
        })
    }
}

/// Orchestrator configuration
///
/// An explicit value handed to the orchestrator at construction; there is
/// no process-wide mutable configuration state.
#[derive(Debug, Clone)]
pub struct RotatorConfig {
    /// Target site the gateways forward to (trailing slash stripped)
    pub site: String,
    /// Regions to provision one gateway in
    pub regions: Vec<String>,
    /// Explicit credential pair; `None` falls back to ambient resolution
    pub credentials: Option<Credentials>,
    /// Always create a fresh gateway instead of reusing a discovered one
    pub force: bool,
    /// Tag created gateways as requiring manual deletion
    pub require_manual_deletion: bool,
}

impl RotatorConfig {
    /// Create a configuration for `site` across `regions`
    pub fn new(site: impl Into<String>, regions: Vec<String>) -> Self {
        Self {
            site: normalize_site(site.into()),
            regions,
            credentials: None,
            force: false,
            require_manual_deletion: false,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let site = env::var("ROTOGATE_SITE")
            .map_err(|_| RotogateError::InvalidConfig("ROTOGATE_SITE must be set".into()))?;

        let regions: Vec<String> = get_env_or("ROTOGATE_REGIONS", "")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let regions = if regions.is_empty() {
            regions::DEFAULT_REGIONS
                .iter()
                .map(|r| r.to_string())
                .collect()
        } else {
            regions
        };

        Ok(Self {
            site: normalize_site(site),
            regions,
            credentials: Credentials::from_env().ok(),
            force: get_env_or("ROTOGATE_FORCE", "false").parse().unwrap_or(false),
            require_manual_deletion: get_env_or("ROTOGATE_REQUIRE_MANUAL_DELETION", "false")
                .parse()
                .unwrap_or(false),
        })
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_require_manual_deletion(mut self, require: bool) -> Self {
        self.require_manual_deletion = require;
        self
    }

    /// Display name used to create gateways and to recognize ours
    pub fn api_name(&self) -> String {
        format!("{} - IP Rotate API", self.site)
    }
}

/// Strip a single trailing path separator from the site URL
fn normalize_site(site: String) -> String {
    match site.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => site,
    }
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
