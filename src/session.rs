//! Scoped gateway session
//!
//! Pairs an orchestrator with a router so that opening a session starts
//! gateways and closing it shuts them down, symmetric on every exit path
//! the caller takes. Remote gateways are never garbage-collected; a
//! session dropped without [`GatewaySession::close`] leaves them running
//! by design.

use std::sync::Arc;

use tracing::warn;

use crate::config::{Credentials, RotatorConfig};
use crate::error::Result;
use crate::models::RegionTeardown;
use crate::orchestrator::GatewayOrchestrator;
use crate::provider::{GatewayApi, RestGatewayClient};
use crate::router::{RequestRewriter, RotatingRouter, Transport};

/// A live set of gateways bound to a router
pub struct GatewaySession<T: Transport> {
    orchestrator: GatewayOrchestrator,
    router: RotatingRouter<T>,
    endpoints: Vec<String>,
    closed: bool,
}

impl GatewaySession<reqwest::Client> {
    /// Open a session against the real control plane with a default
    /// HTTP transport
    pub async fn connect(config: RotatorConfig) -> Result<Self> {
        let credentials = match &config.credentials {
            Some(credentials) => credentials.clone(),
            None => Credentials::from_env()?,
        };
        let client = Arc::new(RestGatewayClient::new(credentials));
        Self::open(config, client, reqwest::Client::new()).await
    }
}

impl<T: Transport> GatewaySession<T> {
    /// Start gateways in every configured region and bind them to the
    /// router
    pub async fn open(
        config: RotatorConfig,
        client: Arc<dyn GatewayApi>,
        transport: T,
    ) -> Result<Self> {
        Self::open_preloaded(config, client, transport, &[]).await
    }

    /// Like [`GatewaySession::open`], adopting `preloaded` endpoints
    /// instead of provisioning when the list is non-empty
    pub async fn open_preloaded(
        config: RotatorConfig,
        client: Arc<dyn GatewayApi>,
        transport: T,
        preloaded: &[String],
    ) -> Result<Self> {
        let force = config.force;
        let require_manual_deletion = config.require_manual_deletion;
        let orchestrator = GatewayOrchestrator::new(config, client);
        let endpoints = orchestrator
            .start(force, require_manual_deletion, preloaded)
            .await?;
        let router = RotatingRouter::with_endpoints(transport, endpoints.clone());
        Ok(Self {
            orchestrator,
            router,
            endpoints,
            closed: false,
        })
    }

    /// Endpoints this session is routing through
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn router(&self) -> &RotatingRouter<T> {
        &self.router
    }

    pub fn orchestrator(&self) -> &GatewayOrchestrator {
        &self.orchestrator
    }

    /// Route one request through a random gateway
    pub async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response> {
        self.router.route_request(request).await
    }

    /// Delete this session's gateways and consume the session
    ///
    /// Only gateways backing this session's endpoints are torn down;
    /// same-named gateways from other sessions are left alone.
    pub async fn close(mut self) -> Result<Vec<RegionTeardown>> {
        self.closed = true;
        let endpoints = self.endpoints.clone();
        self.orchestrator.shutdown(Some(&endpoints)).await
    }
}

impl<T: Transport> Drop for GatewaySession<T> {
    fn drop(&mut self) {
        if !self.closed && !self.endpoints.is_empty() {
            warn!(
                "Gateway session dropped without close(); {} remote gateways left running",
                self.endpoints.len()
            );
        }
    }
}
