//! Request router
//!
//! Rewrites each outgoing request to traverse a randomly selected gateway
//! endpoint and delegates the send to an underlying transport. The router
//! is a pure request transform; transport errors pass straight through and
//! no retries happen here.

mod spoof;

pub use spoof::random_ipv4;

use async_trait::async_trait;
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use reqwest::header::{HeaderName, HeaderValue, HOST};
use tracing::debug;

use crate::error::{Result, RotogateError};
use crate::models::{FORWARDED_FOR_HEADER, SPOOF_HEADER, STAGE_NAME};

/// Underlying send path the router delegates to after rewriting
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: reqwest::Request,
    ) -> std::result::Result<reqwest::Response, reqwest::Error>;
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn send(
        &self,
        request: reqwest::Request,
    ) -> std::result::Result<reqwest::Response, reqwest::Error> {
        self.execute(request).await
    }
}

/// Capability interface for routing a request through a gateway
#[async_trait]
pub trait RequestRewriter: Send + Sync {
    async fn route_request(&self, request: reqwest::Request) -> Result<reqwest::Response>;
}

/// Routes requests through a uniformly random gateway endpoint
pub struct RotatingRouter<T: Transport> {
    endpoints: RwLock<Vec<String>>,
    transport: T,
}

impl<T: Transport> RotatingRouter<T> {
    pub fn new(transport: T) -> Self {
        Self {
            endpoints: RwLock::new(Vec::new()),
            transport,
        }
    }

    pub fn with_endpoints(transport: T, endpoints: Vec<String>) -> Self {
        Self {
            endpoints: RwLock::new(endpoints),
            transport,
        }
    }

    /// Replace the endpoint list
    pub fn refresh(&self, endpoints: Vec<String>) {
        *self.endpoints.write() = endpoints;
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.endpoints.read().clone()
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.read().len()
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Pick one endpoint uniformly at random
    pub fn select_endpoint(&self) -> Result<String> {
        let endpoints = self.endpoints.read();
        let mut rng = rand::thread_rng();
        endpoints
            .choose(&mut rng)
            .cloned()
            .ok_or(RotogateError::NoEndpointsAvailable)
    }
}

#[async_trait]
impl<T: Transport> RequestRewriter for RotatingRouter<T> {
    async fn route_request(&self, mut request: reqwest::Request) -> Result<reqwest::Response> {
        let endpoint = self.select_endpoint()?;
        rewrite_request(&mut request, &endpoint)?;
        debug!(url = %request.url(), "routing request through {}", endpoint);
        Ok(self.transport.send(request).await?)
    }
}

/// Rewrite a request in place to traverse `endpoint`
///
/// The destination becomes `https://<endpoint>/ProxyStage/<path-and-query>`,
/// the `Host` header is pinned to the endpoint (the gateway edge routes on
/// it), and the spoofed client address moves into the custom header the
/// gateway integration maps back onto `X-Forwarded-For`.
pub fn rewrite_request(request: &mut reqwest::Request, endpoint: &str) -> Result<()> {
    let original = request.url().as_str().to_string();
    let (_, remainder) = original
        .split_once("://")
        .ok_or_else(|| RotogateError::InvalidRequestUrl(original.clone()))?;
    let path_and_query = remainder.split_once('/').map(|(_, p)| p).unwrap_or("");

    let rewritten = format!("https://{}/{}/{}", endpoint, STAGE_NAME, path_and_query);
    *request.url_mut() = url::Url::parse(&rewritten)?;

    let headers = request.headers_mut();
    headers.insert(HOST, HeaderValue::from_str(endpoint)?);

    let spoofed = match headers.get(FORWARDED_FOR_HEADER) {
        Some(value) => value
            .to_str()
            .map(|v| v.to_string())
            .map_err(|_| RotogateError::InvalidRequestUrl(original))?,
        None => random_ipv4().to_string(),
    };
    headers.remove(FORWARDED_FOR_HEADER);
    headers.insert(
        HeaderName::from_bytes(SPOOF_HEADER.as_bytes())?,
        HeaderValue::from_str(&spoofed)?,
    );
    Ok(())
}
