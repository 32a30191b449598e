//! Region orchestrator
//!
//! Ensures one reachable gateway exists per requested region and removes
//! them on demand. Work fans out across regions through a bounded pool;
//! per-region failures are collected rather than aborting the batch.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

use crate::config::{RotatorConfig, MANUAL_DELETION_MARKER};
use crate::error::Result;
use crate::models::{
    endpoint_api_id, endpoint_for, ProvisionOutcome, RegionTeardown, RestApiSummary, STAGE_NAME,
};
use crate::provider::{GatewayApi, ProviderResult};

/// Worker pool size for per-region tasks, independent of region count
const MAX_CONCURRENT_REGIONS: usize = 10;

/// Backoff between retries of a rate-limited deletion
const RATE_LIMIT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Path part of the catch-all child resource
const WILDCARD_PATH_PART: &str = "{proxy+}";

/// Manages the lifecycle of one gateway per region
pub struct GatewayOrchestrator {
    config: RotatorConfig,
    client: Arc<dyn GatewayApi>,
}

impl GatewayOrchestrator {
    pub fn new(config: RotatorConfig, client: Arc<dyn GatewayApi>) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &RotatorConfig {
        &self.config
    }

    /// Provision gateways in every configured region
    ///
    /// A non-empty `preloaded` list is adopted unchanged and no provider
    /// calls are made. Regions that are unavailable or fail fatally
    /// contribute nothing; the rest of the batch still completes.
    #[instrument(skip(self, preloaded))]
    pub async fn start(
        &self,
        force: bool,
        require_manual_deletion: bool,
        preloaded: &[String],
    ) -> Result<Vec<String>> {
        if !preloaded.is_empty() {
            info!("Adopting {} preloaded endpoints", preloaded.len());
            return Ok(preloaded.to_vec());
        }

        info!(
            "Starting API gateway{} in {} region{}",
            if self.config.regions.len() > 1 { "s" } else { "" },
            self.config.regions.len(),
            if self.config.regions.len() > 1 { "s" } else { "" },
        );

        let mut outcomes = stream::iter(self.config.regions.iter().cloned().map(|region| {
            async move {
                let outcome = self
                    .provision(&region, force, require_manual_deletion)
                    .await;
                (region, outcome)
            }
        }))
        .buffer_unordered(MAX_CONCURRENT_REGIONS);

        let mut endpoints = Vec::new();
        let mut new_endpoints = 0usize;
        while let Some((region, outcome)) = outcomes.next().await {
            match outcome {
                Ok(ProvisionOutcome::Ready { endpoint, is_new }) => {
                    if is_new {
                        new_endpoints += 1;
                    }
                    endpoints.push(endpoint);
                }
                Ok(ProvisionOutcome::Unavailable) => {}
                Err(e) => {
                    error!("Failed to provision gateway in {}: {}", region, e);
                }
            }
        }

        info!(
            "Using {} endpoints with name '{}' ({} new)",
            endpoints.len(),
            self.config.api_name(),
            new_endpoints
        );
        Ok(endpoints)
    }

    /// Delete this proxy's gateways in every configured region
    ///
    /// When `endpoints` is given, only gateways whose id backs one of those
    /// endpoints are deleted. A region yielding zero deletions is not an
    /// error.
    #[instrument(skip(self, endpoints))]
    pub async fn shutdown(&self, endpoints: Option<&[String]>) -> Result<Vec<RegionTeardown>> {
        info!(
            "Deleting gateway{} for site '{}'",
            if self.config.regions.len() > 1 { "s" } else { "" },
            self.config.site
        );

        let mut tasks = stream::iter(self.config.regions.iter().cloned().map(|region| {
            async move {
                let deleted = self.teardown(&region, endpoints).await;
                (region, deleted)
            }
        }))
        .buffer_unordered(MAX_CONCURRENT_REGIONS);

        let mut results = Vec::new();
        while let Some((region, deleted)) = tasks.next().await {
            match deleted {
                Ok(deleted) => results.push(RegionTeardown { region, deleted }),
                Err(e) => {
                    error!("Failed to tear down region {}: {}", region, e);
                    results.push(RegionTeardown {
                        region,
                        deleted: Vec::new(),
                    });
                }
            }
        }

        let total: usize = results.iter().map(|r| r.deleted.len()).sum();
        info!(
            "Deleted {} endpoints for site '{}'",
            total, self.config.site
        );
        Ok(results)
    }

    /// Ensure one gateway exists in `region`, reusing a discovered one
    /// unless `force` is set
    #[instrument(skip(self))]
    pub async fn provision(
        &self,
        region: &str,
        force: bool,
        require_manual_deletion: bool,
    ) -> Result<ProvisionOutcome> {
        let api_name = self.config.api_name();

        if !force {
            match self.discover(region).await {
                Ok(apis) => {
                    for api in apis {
                        let name = api.name.as_deref().unwrap_or_default();
                        if name.starts_with(&api_name) {
                            return Ok(ProvisionOutcome::Ready {
                                endpoint: endpoint_for(&api.id, region),
                                is_new: false,
                            });
                        }
                    }
                }
                Err(e) if e.is_unrecognized_client() => {
                    warn!(
                        "Could not create region (some regions require manual enabling): {}",
                        region
                    );
                    return Ok(ProvisionOutcome::Unavailable);
                }
                Err(e) => return Err(e.into()),
            }
        }

        match self.create_gateway(region, require_manual_deletion).await {
            Ok(api_id) => Ok(ProvisionOutcome::Ready {
                endpoint: endpoint_for(&api_id, region),
                is_new: true,
            }),
            Err(e) if e.is_unrecognized_client() => {
                warn!(
                    "Could not create region (some regions require manual enabling): {}",
                    region
                );
                Ok(ProvisionOutcome::Unavailable)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create and deploy a fresh gateway, returning its id
    async fn create_gateway(
        &self,
        region: &str,
        require_manual_deletion: bool,
    ) -> ProviderResult<String> {
        let mut name = self.config.api_name();
        if require_manual_deletion {
            name.push_str(MANUAL_DELETION_MARKER);
        }

        let api_id = self.client.create_rest_api(region, &name).await?;
        let root_id = self.client.get_root_resource(region, &api_id).await?;
        let wildcard_id = self
            .client
            .create_resource(region, &api_id, &root_id, WILDCARD_PATH_PART)
            .await?;

        // Root forwards to the site itself, the wildcard to site/{proxy}.
        self.client.put_method(region, &api_id, &root_id).await?;
        self.client
            .put_integration(region, &api_id, &root_id, &self.config.site)
            .await?;
        self.client.put_method(region, &api_id, &wildcard_id).await?;
        self.client
            .put_integration(
                region,
                &api_id,
                &wildcard_id,
                &format!("{}/{{proxy}}", self.config.site),
            )
            .await?;

        self.client
            .create_deployment(region, &api_id, STAGE_NAME)
            .await?;

        Ok(api_id)
    }

    /// List every gateway in `region`, following pagination to the end
    pub async fn discover(&self, region: &str) -> ProviderResult<Vec<RestApiSummary>> {
        let mut apis = Vec::new();
        let mut position: Option<String> = None;
        loop {
            let page = self
                .client
                .get_rest_apis(region, position.as_deref())
                .await?;
            apis.extend(page.items);
            match page.position {
                Some(next) => position = Some(next),
                None => break,
            }
        }
        Ok(apis)
    }

    /// Delete this proxy's gateways in one region
    ///
    /// Matches by exact display name, so gateways carrying the manual
    /// deletion marker are left alone. Rate-limited deletes are retried
    /// until they resolve; other failures skip that gateway only.
    #[instrument(skip(self, endpoints))]
    pub async fn teardown(
        &self,
        region: &str,
        endpoints: Option<&[String]>,
    ) -> Result<Vec<String>> {
        let api_name = self.config.api_name();
        let id_filter: Option<HashSet<&str>> =
            endpoints.map(|eps| eps.iter().map(|e| endpoint_api_id(e)).collect());

        let apis = match self.discover(region).await {
            Ok(apis) => apis,
            Err(e) if e.is_unrecognized_client() => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut deleted = Vec::new();
        for api in apis {
            if api.name.as_deref() != Some(api_name.as_str()) {
                continue;
            }
            if let Some(ids) = &id_filter {
                if !ids.contains(api.id.as_str()) {
                    continue;
                }
            }

            loop {
                match self.client.delete_rest_api(region, &api.id).await {
                    Ok(()) => {
                        deleted.push(api.id.clone());
                        break;
                    }
                    Err(e) if e.is_too_many_requests() => {
                        sleep(RATE_LIMIT_RETRY_DELAY).await;
                    }
                    Err(e) => {
                        error!("Failed to delete API {}: {}", api.id, e);
                        break;
                    }
                }
            }
        }
        Ok(deleted)
    }
}
