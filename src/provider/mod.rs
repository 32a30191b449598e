//! Cloud resource-management client
//!
//! The orchestrator talks to the provider through the [`GatewayApi`] trait;
//! [`rest::RestGatewayClient`] is the real implementation over the API
//! Gateway control plane.

mod rest;
mod signer;

pub use rest::RestGatewayClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::RestApiPage;

/// Error code for a region that is not enabled for this account
pub const UNRECOGNIZED_CLIENT: &str = "UnrecognizedClientException";

/// Error code for provider-side rate limiting
pub const TOO_MANY_REQUESTS: &str = "TooManyRequestsException";

/// Error reported by the cloud provider
///
/// Carries the machine-readable error code when the provider supplied one;
/// errors without a recognized code are treated as opaque and fatal.
#[derive(Error, Debug, Clone)]
pub struct ProviderError {
    pub code: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Region/account is not usable for this API type (non-fatal)
    pub fn is_unrecognized_client(&self) -> bool {
        self.code.as_deref() == Some(UNRECOGNIZED_CLIENT)
    }

    /// Provider-side rate limit hit (retryable)
    pub fn is_too_many_requests(&self) -> bool {
        self.code.as_deref() == Some(TOO_MANY_REQUESTS)
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Result type for provider operations
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Operations the orchestrator needs from the resource-management API
///
/// One logical gateway is a REST API container with a wildcard child
/// resource, a catch-all method and forwarding integration on both, and a
/// deployment to a named stage.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// Create a REST API container and return its id
    async fn create_rest_api(&self, region: &str, name: &str) -> ProviderResult<String>;

    /// List one page of REST APIs, continuing from `position` when given
    async fn get_rest_apis(
        &self,
        region: &str,
        position: Option<&str>,
    ) -> ProviderResult<RestApiPage>;

    /// Resolve the root resource id of a REST API
    async fn get_root_resource(&self, region: &str, api_id: &str) -> ProviderResult<String>;

    /// Create a child resource under `parent_id` and return its id
    async fn create_resource(
        &self,
        region: &str,
        api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> ProviderResult<String>;

    /// Attach an unauthenticated any-verb method to a resource
    async fn put_method(&self, region: &str, api_id: &str, resource_id: &str)
        -> ProviderResult<()>;

    /// Attach a forwarding integration pointing at `uri`
    async fn put_integration(
        &self,
        region: &str,
        api_id: &str,
        resource_id: &str,
        uri: &str,
    ) -> ProviderResult<()>;

    /// Deploy the API configuration to a named stage
    async fn create_deployment(
        &self,
        region: &str,
        api_id: &str,
        stage_name: &str,
    ) -> ProviderResult<()>;

    /// Delete a REST API container
    async fn delete_rest_api(&self, region: &str, api_id: &str) -> ProviderResult<()>;
}
