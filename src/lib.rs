//! Rotogate - IP Rotation Through Regional Gateways
//!
//! Provisions one API Gateway proxy per cloud region for a fixed target
//! site and routes outgoing requests through a randomly chosen regional
//! endpoint, so each request appears to egress from a different address.
//!
//! ## Features
//!
//! - Concurrent per-region gateway provisioning with partial-failure
//!   tolerance (disabled regions are skipped, not fatal)
//! - Idempotent starts: existing gateways are discovered and reused
//! - Uniform random endpoint selection per request
//! - Spoofed `X-Forwarded-For` carried through a custom header the
//!   gateway maps back on the far side
//! - Scoped sessions with symmetric start/shutdown

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod provider;
pub mod regions;
pub mod router;
pub mod session;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{Credentials, RotatorConfig};
pub use error::{Result, RotogateError};
pub use orchestrator::GatewayOrchestrator;
pub use provider::{GatewayApi, ProviderError, RestGatewayClient};
pub use router::{random_ipv4, RequestRewriter, RotatingRouter, Transport};
pub use session::GatewaySession;
