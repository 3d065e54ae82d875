use crate::domain::model::{
    AnalysisResponse, CacheClearResponse, CalculationRequest, CalculationResponse,
    ComparisonResponse, ExchangeRate, LicenseValidation, LimitStatus, TopOpportunitiesResponse,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Key/value persistence for client-side state (license key, currency, caches).
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Wall clock in Unix milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Filters for the opportunity ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct OpportunityQuery {
    pub min_score: f64,
    pub sector: Option<String>,
    pub sort_by: String,
    pub limit: u32,
    pub currency: Option<String>,
}

/// One method per backend endpoint.
#[async_trait]
pub trait RvcApi: Send + Sync {
    async fn analyze(&self, ticker: &str, license_key: Option<&str>) -> Result<AnalysisResponse>;

    async fn apply_manual_metrics(
        &self,
        ticker: &str,
        overrides: &Map<String, Value>,
    ) -> Result<AnalysisResponse>;

    async fn clear_cache(&self, ticker: Option<&str>) -> Result<CacheClearResponse>;

    async fn calculate(&self, request: &CalculationRequest) -> Result<CalculationResponse>;

    async fn compare(
        &self,
        tickers: &[String],
        license_key: Option<&str>,
    ) -> Result<ComparisonResponse>;

    async fn exchange_rate(&self, base: &str, target: &str) -> Result<ExchangeRate>;

    async fn check_limit(&self, license_key: Option<&str>) -> Result<LimitStatus>;

    async fn validate_license(&self, license_key: &str) -> Result<LicenseValidation>;

    async fn top_opportunities(&self, query: &OpportunityQuery) -> Result<TopOpportunitiesResponse>;
}
