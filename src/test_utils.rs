//! Shared fakes for unit tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::models::RestApiPage;
use crate::models::RestApiSummary;
use crate::provider::{GatewayApi, ProviderError, ProviderResult, TOO_MANY_REQUESTS, UNRECOGNIZED_CLIENT};
use crate::router::Transport;

#[derive(Debug, Clone)]
struct MockApi {
    id: String,
    name: String,
}

/// In-memory [`GatewayApi`] with per-region state and injectable failures
#[derive(Default)]
pub(crate) struct MockGatewayApi {
    state: Mutex<HashMap<String, Vec<MockApi>>>,
    unavailable: Mutex<HashSet<String>>,
    listing_failures: Mutex<HashSet<String>>,
    delete_rate_limits: Mutex<HashMap<String, u32>>,
    page_size: AtomicUsize,
    next_id: AtomicUsize,
    create_calls: AtomicUsize,
    list_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    put_method_calls: AtomicUsize,
    put_integration_calls: AtomicUsize,
    deployment_calls: AtomicUsize,
}

impl MockGatewayApi {
    pub fn new() -> Self {
        let mock = Self::default();
        mock.page_size.store(usize::MAX, Ordering::SeqCst);
        mock
    }

    /// Make a region report `UnrecognizedClientException` on every call
    pub fn set_unavailable(&self, region: &str) {
        self.unavailable.lock().insert(region.to_string());
    }

    /// Make listings in a region fail with an opaque provider error
    pub fn set_listing_failure(&self, region: &str) {
        self.listing_failures.lock().insert(region.to_string());
    }

    /// Fail the next `count` deletes of `api_id` with a rate-limit error
    pub fn set_delete_rate_limit(&self, api_id: &str, count: u32) {
        self.delete_rate_limits
            .lock()
            .insert(api_id.to_string(), count);
    }

    pub fn set_page_size(&self, size: usize) {
        self.page_size.store(size, Ordering::SeqCst);
    }

    /// Insert a pre-existing API into a region
    pub fn seed_api(&self, region: &str, id: &str, name: &str) {
        self.state
            .lock()
            .entry(region.to_string())
            .or_default()
            .push(MockApi {
                id: id.to_string(),
                name: name.to_string(),
            });
    }

    pub fn api_count(&self, region: &str) -> usize {
        self.state.lock().get(region).map_or(0, |apis| apis.len())
    }

    pub fn api_names(&self, region: &str) -> Vec<String> {
        self.state
            .lock()
            .get(region)
            .map(|apis| apis.iter().map(|a| a.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn put_method_calls(&self) -> usize {
        self.put_method_calls.load(Ordering::SeqCst)
    }

    pub fn put_integration_calls(&self) -> usize {
        self.put_integration_calls.load(Ordering::SeqCst)
    }

    pub fn deployment_calls(&self) -> usize {
        self.deployment_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self, region: &str) -> ProviderResult<()> {
        if self.unavailable.lock().contains(region) {
            return Err(ProviderError::with_code(
                UNRECOGNIZED_CLIENT,
                "region not enabled for this account",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl GatewayApi for MockGatewayApi {
    async fn create_rest_api(&self, region: &str, name: &str) -> ProviderResult<String> {
        self.check_available(region)?;
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let id = format!("gw{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.seed_api(region, &id, name);
        Ok(id)
    }

    async fn get_rest_apis(
        &self,
        region: &str,
        position: Option<&str>,
    ) -> ProviderResult<RestApiPage> {
        self.check_available(region)?;
        if self.listing_failures.lock().contains(region) {
            return Err(ProviderError::new("internal provider failure"));
        }
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let state = self.state.lock();
        let apis = state.get(region).cloned().unwrap_or_default();
        let start: usize = position.and_then(|p| p.parse().ok()).unwrap_or(0);
        let page_size = self.page_size.load(Ordering::SeqCst);
        let end = start.saturating_add(page_size).min(apis.len());

        let items = apis[start.min(apis.len())..end]
            .iter()
            .map(|a| RestApiSummary {
                id: a.id.clone(),
                name: Some(a.name.clone()),
            })
            .collect();
        let next = if end < apis.len() {
            Some(end.to_string())
        } else {
            None
        };
        Ok(RestApiPage {
            items,
            position: next,
        })
    }

    async fn get_root_resource(&self, _region: &str, api_id: &str) -> ProviderResult<String> {
        Ok(format!("root-{}", api_id))
    }

    async fn create_resource(
        &self,
        _region: &str,
        api_id: &str,
        _parent_id: &str,
        _path_part: &str,
    ) -> ProviderResult<String> {
        Ok(format!("res-{}", api_id))
    }

    async fn put_method(
        &self,
        _region: &str,
        _api_id: &str,
        _resource_id: &str,
    ) -> ProviderResult<()> {
        self.put_method_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn put_integration(
        &self,
        _region: &str,
        _api_id: &str,
        _resource_id: &str,
        _uri: &str,
    ) -> ProviderResult<()> {
        self.put_integration_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create_deployment(
        &self,
        _region: &str,
        _api_id: &str,
        _stage_name: &str,
    ) -> ProviderResult<()> {
        self.deployment_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_rest_api(&self, region: &str, api_id: &str) -> ProviderResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        let mut limits = self.delete_rate_limits.lock();
        if let Some(remaining) = limits.get_mut(api_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ProviderError::with_code(TOO_MANY_REQUESTS, "rate exceeded"));
            }
        }
        drop(limits);

        let mut state = self.state.lock();
        let apis = state.entry(region.to_string()).or_default();
        let before = apis.len();
        apis.retain(|a| a.id != api_id);
        if apis.len() == before {
            return Err(ProviderError::with_code("NotFoundException", "no such API"));
        }
        Ok(())
    }
}

/// Captured copy of a routed request
pub(crate) struct CapturedRequest {
    pub url: String,
    pub headers: reqwest::header::HeaderMap,
}

/// [`Transport`] that records rewritten requests and answers 200
#[derive(Default)]
pub(crate) struct CapturingTransport {
    pub captured: Mutex<Vec<CapturedRequest>>,
}

impl CapturingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> CapturedRequest {
        let captured = self.captured.lock();
        let last = captured.last().expect("no request captured");
        CapturedRequest {
            url: last.url.clone(),
            headers: last.headers.clone(),
        }
    }
}

#[async_trait]
impl Transport for CapturingTransport {
    async fn send(
        &self,
        request: reqwest::Request,
    ) -> std::result::Result<reqwest::Response, reqwest::Error> {
        self.captured.lock().push(CapturedRequest {
            url: request.url().to_string(),
            headers: request.headers().clone(),
        });
        let response = http::Response::builder()
            .status(200)
            .body("ok")
            .expect("static response");
        Ok(reqwest::Response::from(response))
    }
}
