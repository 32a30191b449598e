use serde::{Deserialize, Serialize};

/// Domain suffix shared by all gateway endpoints
pub const GATEWAY_DOMAIN: &str = "amazonaws.com";

/// Deployment stage every gateway is published under
pub const STAGE_NAME: &str = "ProxyStage";

/// Standard forwarding header stripped from outgoing requests
pub const FORWARDED_FOR_HEADER: &str = "X-Forwarded-For";

/// Custom header carrying the spoofed client address
///
/// The gateway integration maps this header back onto `X-Forwarded-For`
/// on the far side, so intermediate hops cannot strip or overwrite it.
pub const SPOOF_HEADER: &str = "X-My-X-Forwarded-For";

/// Remote representation of a provisioned gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestApiSummary {
    pub id: String,
    /// Display name; absent on APIs created without one
    pub name: Option<String>,
}

/// One page of a paginated gateway listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestApiPage {
    #[serde(default, rename = "item")]
    pub items: Vec<RestApiSummary>,
    /// Continuation cursor; `None` signals the last page
    pub position: Option<String>,
}

/// Result of provisioning one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A gateway is live in the region
    Ready { endpoint: String, is_new: bool },
    /// The region is not usable for this account; expected and non-fatal
    Unavailable,
}

impl ProvisionOutcome {
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            ProvisionOutcome::Ready { endpoint, .. } => Some(endpoint),
            ProvisionOutcome::Unavailable => None,
        }
    }
}

/// Deletion results for one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionTeardown {
    pub region: String,
    /// Ids of the gateways deleted in this region
    pub deleted: Vec<String>,
}

/// Build the externally reachable hostname for a gateway
pub fn endpoint_for(api_id: &str, region: &str) -> String {
    format!("{}.execute-api.{}.{}", api_id, region, GATEWAY_DOMAIN)
}

/// Extract the gateway id from an endpoint hostname
///
/// The id is the hostname portion before the first domain separator.
pub fn endpoint_api_id(endpoint: &str) -> &str {
    endpoint.split('.').next().unwrap_or(endpoint)
}
