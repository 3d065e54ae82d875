use crate::core::{
    AnalysisResponse, CacheClearResponse, CalculationRequest, CalculationResponse,
    ComparisonResponse, ExchangeRate, LicenseValidation, LimitStatus, OpportunityQuery, RvcApi,
    TopOpportunitiesResponse,
};
use crate::utils::error::{Result, RvcError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error body shared by every endpoint: `{error}` or `{message}`, plus
/// `limit_info` on HTTP 429.
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    limit_info: Option<LimitStatus>,
    #[serde(default)]
    details: Option<Vec<String>>,
}

/// reqwest-backed implementation of [`RvcApi`].
#[derive(Debug, Clone)]
pub struct HttpRvcClient {
    base_url: Url,
    client: Client,
}

impl HttpRvcClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url).map_err(|e| RvcError::InvalidConfigValue {
            field: "base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| RvcError::Config {
                field: "base_url".to_string(),
                message: format!("cannot build URL for {}: {}", path, e),
            })
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value, fallback: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        let request = self.client.post(url).json(body);
        self.send(request, path, fallback).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
        fallback: &str,
    ) -> Result<T> {
        let (status, body) = self.execute(request, path).await?;
        if status.is_success() {
            return Ok(serde_json::from_slice(&body)?);
        }
        Err(error_from_response(status, &body, fallback))
    }

    async fn execute(&self, request: RequestBuilder, path: &str) -> Result<(StatusCode, Vec<u8>)> {
        tracing::debug!("Calling {}", path);
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("{} responded with {}", path, status);
        let body = response.bytes().await?;
        Ok((status, body.to_vec()))
    }
}

fn error_from_response(status: StatusCode, body: &[u8], fallback: &str) -> RvcError {
    let envelope: ErrorEnvelope = serde_json::from_slice(body).unwrap_or_default();
    if let Some(details) = envelope.details.as_ref().filter(|d| !d.is_empty()) {
        tracing::debug!("Server error details: {}", details.join("; "));
    }
    let message = envelope
        .error
        .or(envelope.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("{} (HTTP {})", fallback, status.as_u16()));

    if status == StatusCode::TOO_MANY_REQUESTS {
        return RvcError::LimitReached {
            message,
            limit: envelope.limit_info,
        };
    }
    RvcError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl RvcApi for HttpRvcClient {
    async fn analyze(&self, ticker: &str, license_key: Option<&str>) -> Result<AnalysisResponse> {
        let body = json!({ "ticker": ticker, "license_key": license_key });
        self.post_json("/analyze", &body, "The analysis could not be completed")
            .await
    }

    async fn apply_manual_metrics(
        &self,
        ticker: &str,
        overrides: &Map<String, Value>,
    ) -> Result<AnalysisResponse> {
        let body = json!({ "ticker": ticker, "overrides": overrides });
        self.post_json("/api/manual-metrics", &body, "Manual metrics were not applied")
            .await
    }

    async fn clear_cache(&self, ticker: Option<&str>) -> Result<CacheClearResponse> {
        let body = json!({ "ticker": ticker });
        self.post_json("/cache/clear", &body, "The cache could not be cleared")
            .await
    }

    async fn calculate(&self, request: &CalculationRequest) -> Result<CalculationResponse> {
        let body = serde_json::to_value(request)?;
        self.post_json("/api/calcular-inversion", &body, "Calculation failed")
            .await
    }

    async fn compare(
        &self,
        tickers: &[String],
        license_key: Option<&str>,
    ) -> Result<ComparisonResponse> {
        let body = json!({ "tickers": tickers, "license_key": license_key });
        self.post_json("/api/comparar", &body, "The comparison could not be completed")
            .await
    }

    async fn exchange_rate(&self, base: &str, target: &str) -> Result<ExchangeRate> {
        let url = self.endpoint("/api/exchange-rate")?;
        let request = self
            .client
            .get(url)
            .query(&[("base", base), ("target", target)]);
        self.send(request, "/api/exchange-rate", "Exchange rate unavailable")
            .await
    }

    async fn check_limit(&self, license_key: Option<&str>) -> Result<LimitStatus> {
        let body = json!({ "license_key": license_key });
        self.post_json("/api/check-limit", &body, "Usage limit check failed")
            .await
    }

    async fn validate_license(&self, license_key: &str) -> Result<LicenseValidation> {
        let url = self.endpoint("/api/validate-license")?;
        let request = self
            .client
            .post(url)
            .json(&json!({ "license_key": license_key }));
        let (status, body) = self.execute(request, "/api/validate-license").await?;

        let parsed = serde_json::from_slice::<LicenseValidation>(&body);
        if status.is_success() {
            return Ok(parsed?);
        }
        // Rejections come back as 4xx with a regular `{valid, reason}` body.
        match parsed {
            Ok(validation) if !validation.valid => Ok(validation),
            _ => Err(error_from_response(
                status,
                &body,
                "License validation failed",
            )),
        }
    }

    async fn top_opportunities(&self, query: &OpportunityQuery) -> Result<TopOpportunitiesResponse> {
        let url = self.endpoint("/api/top-opportunities")?;
        let request = self.client.get(url).query(&query.query_pairs());
        let (status, body) = self.execute(request, "/api/top-opportunities").await?;

        if !status.is_success() {
            // This endpoint puts the human-readable text in `message`.
            let envelope: ErrorEnvelope = serde_json::from_slice(&body).unwrap_or_default();
            let message = envelope
                .message
                .or(envelope.error)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(RvcError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response: TopOpportunitiesResponse = serde_json::from_slice(&body)?;
        if response.status.as_deref() != Some("success") {
            return Err(RvcError::Api {
                status: status.as_u16(),
                message: response
                    .message
                    .clone()
                    .unwrap_or_else(|| "Invalid response from server".to_string()),
            });
        }
        Ok(response)
    }
}
