//! REST control-plane implementation of [`GatewayApi`]
//!
//! Talks to `https://apigateway.<region>.amazonaws.com` with SigV4-signed
//! JSON requests, mirroring the operations the orchestrator needs.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::signer::{self, SigningParams};
use super::{GatewayApi, ProviderError, ProviderResult};
use crate::config::Credentials;
use crate::models::{RestApiPage, FORWARDED_FOR_HEADER, SPOOF_HEADER};

/// Page size for gateway listings
const PAGE_LIMIT: u32 = 500;

/// Header the provider uses to carry the machine-readable error code
const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

/// SigV4-signing REST client for the gateway control plane
pub struct RestGatewayClient {
    http: reqwest::Client,
    credentials: Credentials,
    /// Test override for the per-region control-plane URL
    base_url: Option<String>,
}

impl RestGatewayClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            base_url: None,
        }
    }

    /// Point the client at a fixed base URL instead of the regional one
    #[cfg(test)]
    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            base_url: Some(base_url.into()),
        }
    }

    fn base_url(&self, region: &str) -> String {
        match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://apigateway.{}.amazonaws.com", region),
        }
    }

    /// Issue one signed control-plane call and parse the JSON response
    async fn call(
        &self,
        region: &str,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> ProviderResult<Value> {
        let base = self.base_url(region);
        let parsed = url::Url::parse(&base)
            .map_err(|e| ProviderError::new(format!("invalid control-plane URL: {}", e)))?;
        let host = match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(ProviderError::new("control-plane URL missing host")),
        };

        let payload = match &body {
            Some(value) => serde_json::to_vec(value)
                .map_err(|e| ProviderError::new(format!("failed to encode request: {}", e)))?,
            None => Vec::new(),
        };

        let signed_headers = signer::sign(
            &SigningParams {
                method: method.as_str(),
                host: &host,
                path,
                query,
                payload: &payload,
                region,
                now: Utc::now(),
            },
            &self.credentials,
        );

        // The query string must be byte-identical to the signed one.
        let query_string = signer::canonical_query(query);
        let url = if query_string.is_empty() {
            format!("{}{}", base, path)
        } else {
            format!("{}{}?{}", base, path, query_string)
        };

        debug!(%region, %method, %path, "control-plane call");

        let mut request = self
            .http
            .request(method, &url)
            .header("accept", "application/json");
        for (name, value) in &signed_headers {
            if name != "host" {
                request = request.header(name.as_str(), value.as_str());
            }
        }
        if !payload.is_empty() {
            request = request
                .header("content-type", "application/json")
                .body(payload);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::new(format!("control-plane request failed: {}", e)))?;

        let status = response.status();
        let error_code = response
            .headers()
            .get(ERROR_TYPE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(':').next())
            .map(|v| v.trim().to_string());

        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::new(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(parse_error(status.as_u16(), error_code, &text));
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ProviderError::new(format!("malformed provider response: {}", e)))
    }
}

/// Build a [`ProviderError`] from a failed control-plane response
fn parse_error(status: u16, header_code: Option<String>, body: &str) -> ProviderError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let code = header_code.or_else(|| {
        parsed
            .as_ref()
            .and_then(|v| v.get("__type"))
            .and_then(|v| v.as_str())
            .map(|t| t.rsplit('#').next().unwrap_or(t).to_string())
    });

    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message").or_else(|| v.get("Message")))
        .and_then(|v| v.as_str())
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("HTTP {}", status));

    match code {
        Some(code) => ProviderError::with_code(code, message),
        None => ProviderError::new(message),
    }
}

fn string_field(value: &Value, field: &str, context: &str) -> ProviderResult<String> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| ProviderError::new(format!("{} response missing `{}`", context, field)))
}

#[derive(Debug, Deserialize)]
struct ResourceItem {
    id: String,
    #[serde(default)]
    path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResourcePage {
    #[serde(default, rename = "item")]
    items: Vec<ResourceItem>,
}

#[async_trait]
impl GatewayApi for RestGatewayClient {
    async fn create_rest_api(&self, region: &str, name: &str) -> ProviderResult<String> {
        let body = json!({
            "name": name,
            "endpointConfiguration": { "types": ["REGIONAL"] },
        });
        let response = self
            .call(region, Method::POST, "/restapis", &[], Some(body))
            .await?;
        string_field(&response, "id", "create_rest_api")
    }

    async fn get_rest_apis(
        &self,
        region: &str,
        position: Option<&str>,
    ) -> ProviderResult<RestApiPage> {
        let mut query = vec![("limit".to_string(), PAGE_LIMIT.to_string())];
        if let Some(position) = position {
            query.push(("position".to_string(), position.to_string()));
        }
        let response = self
            .call(region, Method::GET, "/restapis", &query, None)
            .await?;
        serde_json::from_value(response)
            .map_err(|e| ProviderError::new(format!("malformed listing page: {}", e)))
    }

    async fn get_root_resource(&self, region: &str, api_id: &str) -> ProviderResult<String> {
        let path = format!("/restapis/{}/resources", api_id);
        let response = self.call(region, Method::GET, &path, &[], None).await?;
        let page: ResourcePage = serde_json::from_value(response)
            .map_err(|e| ProviderError::new(format!("malformed resource listing: {}", e)))?;

        page.items
            .iter()
            .find(|item| item.path.as_deref() == Some("/"))
            .or_else(|| page.items.first())
            .map(|item| item.id.clone())
            .ok_or_else(|| ProviderError::new("API has no root resource"))
    }

    async fn create_resource(
        &self,
        region: &str,
        api_id: &str,
        parent_id: &str,
        path_part: &str,
    ) -> ProviderResult<String> {
        let path = format!("/restapis/{}/resources/{}", api_id, parent_id);
        let body = json!({ "pathPart": path_part });
        let response = self.call(region, Method::POST, &path, &[], Some(body)).await?;
        string_field(&response, "id", "create_resource")
    }

    async fn put_method(
        &self,
        region: &str,
        api_id: &str,
        resource_id: &str,
    ) -> ProviderResult<()> {
        let path = format!("/restapis/{}/resources/{}/methods/ANY", api_id, resource_id);
        let body = json!({
            "authorizationType": "NONE",
            "requestParameters": {
                "method.request.path.proxy": true,
                (format!("method.request.header.{}", SPOOF_HEADER)): true,
            },
        });
        self.call(region, Method::PUT, &path, &[], Some(body)).await?;
        Ok(())
    }

    async fn put_integration(
        &self,
        region: &str,
        api_id: &str,
        resource_id: &str,
        uri: &str,
    ) -> ProviderResult<()> {
        let path = format!(
            "/restapis/{}/resources/{}/methods/ANY/integration",
            api_id, resource_id
        );
        let body = json!({
            "type": "HTTP_PROXY",
            "httpMethod": "ANY",
            "uri": uri,
            "connectionType": "INTERNET",
            "requestParameters": {
                "integration.request.path.proxy": "method.request.path.proxy",
                (format!("integration.request.header.{}", FORWARDED_FOR_HEADER)):
                    format!("method.request.header.{}", SPOOF_HEADER),
            },
        });
        self.call(region, Method::PUT, &path, &[], Some(body)).await?;
        Ok(())
    }

    async fn create_deployment(
        &self,
        region: &str,
        api_id: &str,
        stage_name: &str,
    ) -> ProviderResult<()> {
        let path = format!("/restapis/{}/deployments", api_id);
        let body = json!({ "stageName": stage_name });
        self.call(region, Method::POST, &path, &[], Some(body)).await?;
        Ok(())
    }

    async fn delete_rest_api(&self, region: &str, api_id: &str) -> ProviderResult<()> {
        let path = format!("/restapis/{}", api_id);
        self.call(region, Method::DELETE, &path, &[], None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> RestGatewayClient {
        RestGatewayClient::with_base_url(
            Credentials::new("AKIDEXAMPLE", "secret"),
            server.uri(),
        )
    }

    #[tokio::test]
    async fn test_create_rest_api_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/restapis"))
            .and(header_exists("authorization"))
            .and(header_exists("x-amz-date"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "abc123",
                "name": "https://site.example - IP Rotate API",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let id = client
            .create_rest_api("us-east-1", "https://site.example - IP Rotate API")
            .await
            .unwrap();
        assert_eq!(id, "abc123");
    }

    #[tokio::test]
    async fn test_get_rest_apis_pagination_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/restapis"))
            .and(query_param("position", "p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "item": [{"id": "b2", "name": "second"}],
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/restapis"))
            .and(query_param("limit", "500"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "item": [{"id": "a1", "name": "first"}],
                "position": "p1",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);

        let first = client.get_rest_apis("us-east-1", None).await.unwrap();
        assert_eq!(first.items[0].id, "a1");
        assert_eq!(first.position.as_deref(), Some("p1"));

        let second = client.get_rest_apis("us-east-1", Some("p1")).await.unwrap();
        assert_eq!(second.items[0].id, "b2");
        assert!(second.position.is_none());
    }

    #[tokio::test]
    async fn test_error_code_from_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/restapis"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-amzn-ErrorType", "UnrecognizedClientException")
                    .set_body_json(json!({"message": "token invalid"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.get_rest_apis("ap-east-1", None).await.unwrap_err();
        assert!(err.is_unrecognized_client());
        assert!(err.to_string().contains("token invalid"));
    }

    #[tokio::test]
    async fn test_error_code_from_body_type() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "__type": "com.amazonaws#TooManyRequestsException",
                "message": "rate exceeded",
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.delete_rest_api("us-east-1", "abc").await.unwrap_err();
        assert!(err.is_too_many_requests());
    }

    #[tokio::test]
    async fn test_delete_accepts_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/restapis/abc123"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        client.delete_rest_api("us-east-1", "abc123").await.unwrap();
    }

    #[test]
    fn test_parse_error_without_body() {
        let err = parse_error(500, None, "");
        assert!(err.code.is_none());
        assert_eq!(err.message, "HTTP 500");
    }
}
