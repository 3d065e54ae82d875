use crate::utils::format::{coerce_number, json_number};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Display-only numbers: numeric strings are parsed, anything else that is
/// not a number becomes `None` instead of failing the whole payload.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_number))
}

/// Loose key/value bag as sent by the server for metrics and provenance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct MetricBag(pub Map<String, Value>);

impl MetricBag {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(json_number)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.get(key).and_then(Value::as_object)
    }

    pub fn strings(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| i.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// /analyze and /api/manual-metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub ticker: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub analysis_allowed: Option<bool>,
    #[serde(default)]
    pub metrics: MetricBag,
    #[serde(default)]
    pub rvc_score: RvcScore,
    #[serde(default)]
    pub etf_summary: Option<EtfSummary>,
    #[serde(default)]
    pub manual_overrides: Option<ManualOverrides>,
}

impl AnalysisResponse {
    pub fn is_etf(&self) -> bool {
        self.metrics.flag("is_etf")
    }

    pub fn effective_asset_type(&self) -> Option<&str> {
        self.asset_type
            .as_deref()
            .or_else(|| self.metrics.text("asset_type"))
    }

    /// Only plain equities get a full score breakdown.
    pub fn analysis_allowed(&self) -> bool {
        self.effective_asset_type() == Some("EQUITY")
            && self.analysis_allowed != Some(false)
            && !self.is_etf()
    }

    pub fn currency(&self) -> &str {
        self.metrics
            .text("price_currency")
            .or_else(|| self.metrics.text("currency"))
            .unwrap_or("USD")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RvcScore {
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_score: Option<f64>,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub confidence_level: Option<String>,
    #[serde(default)]
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    #[serde(default)]
    pub valoracion: Dimension,
    #[serde(default)]
    pub calidad: Dimension,
    #[serde(default)]
    pub salud: Dimension,
    #[serde(default)]
    pub crecimiento: Dimension,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(default, deserialize_with = "lenient_number")]
    pub score: Option<f64>,
    #[serde(default)]
    pub metrics_used: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EtfSummary {
    #[serde(default)]
    pub score: Option<EtfScore>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EtfScore {
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_score: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManualOverrides {
    #[serde(default)]
    pub applied: Value,
    #[serde(default)]
    pub invalid: Value,
}

impl ManualOverrides {
    fn keys(value: &Value) -> Vec<String> {
        match value {
            Value::Object(map) => map.keys().cloned().collect(),
            Value::Array(items) => items
                .iter()
                .map(|i| match i {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn applied_fields(&self) -> Vec<String> {
        Self::keys(&self.applied)
    }

    pub fn invalid_fields(&self) -> Vec<String> {
        Self::keys(&self.invalid)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheClearResponse {
    #[serde(default)]
    pub status: Option<String>,
    pub cleared: CacheScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheScope {
    Ticker,
    All,
}

// ---------------------------------------------------------------------------
// /api/calcular-inversion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Scenario {
    Conservador,
    #[default]
    Moderado,
    Optimista,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Conservador => "conservador",
            Scenario::Moderado => "moderado",
            Scenario::Optimista => "optimista",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "conservador" => Some(Scenario::Conservador),
            "moderado" => Some(Scenario::Moderado),
            "optimista" => Some(Scenario::Optimista),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum MarketTiming {
    Crisis,
    #[default]
    Normal,
    Burbuja,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum CompoundMode {
    #[default]
    Deterministic,
    Simulation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "calculation_type", rename_all = "snake_case")]
pub enum CalculationRequest {
    Dca {
        monthly_amount: f64,
        years: u32,
        scenario: Scenario,
        market_timing: MarketTiming,
        #[serde(skip_serializing_if = "Option::is_none")]
        initial_amount: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        annual_inflation: Option<f64>,
    },
    LumpSumVsDca {
        total_amount: f64,
        years: u32,
        scenario: Scenario,
    },
    CompoundInterest {
        initial_amount: f64,
        monthly_amount: f64,
        years: u32,
        scenario: Scenario,
        mode: CompoundMode,
        #[serde(skip_serializing_if = "Option::is_none")]
        num_paths: Option<u32>,
    },
    RetirementPlan {
        current_age: u32,
        retirement_age: u32,
        initial_amount: f64,
        monthly_amount: f64,
        scenario: Scenario,
        annual_inflation: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        annual_return_override: Option<f64>,
    },
}

impl CalculationRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            CalculationRequest::Dca { .. } => "dca",
            CalculationRequest::LumpSumVsDca { .. } => "lump_sum_vs_dca",
            CalculationRequest::CompoundInterest { .. } => "compound_interest",
            CalculationRequest::RetirementPlan { .. } => "retirement_plan",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalculationResponse {
    #[serde(default)]
    pub calculation_type: Option<String>,
    pub result: Value,
}

/// A calculator result decoded according to the request that produced it.
#[derive(Debug, Clone)]
pub enum CalculationOutcome {
    Dca(DcaResult),
    LumpSumVsDca(LumpSumComparison),
    CompoundInterest(CompoundInterestResult),
    RetirementPlan(RetirementPlanResult),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DcaResult {
    #[serde(default)]
    pub input: DcaInput,
    #[serde(default)]
    pub results: DcaTotals,
    #[serde(default)]
    pub breakdown: DcaMilestones,
    #[serde(default)]
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DcaInput {
    #[serde(default, deserialize_with = "lenient_number")]
    pub monthly_amount: Option<f64>,
    #[serde(default)]
    pub years: Option<u32>,
    #[serde(default)]
    pub total_months: Option<u32>,
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(default)]
    pub market_timing_label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DcaTotals {
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_invested: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub final_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_gain: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_return_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DcaMilestones {
    #[serde(default)]
    pub years_5: Option<Milestone>,
    #[serde(default)]
    pub years_10: Option<Milestone>,
    #[serde(default)]
    pub years_15: Option<Milestone>,
    #[serde(default)]
    pub years_20: Option<Milestone>,
}

impl DcaMilestones {
    pub fn present(&self) -> Vec<&Milestone> {
        [&self.years_5, &self.years_10, &self.years_15, &self.years_20]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Milestone {
    #[serde(default)]
    pub years: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub invested: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub gain: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LumpSumComparison {
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub lump_sum: StrategyOutcome,
    #[serde(default)]
    pub dca: StrategyOutcome,
    #[serde(default)]
    pub comparison: StrategyVerdict,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StrategyOutcome {
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub monthly_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub final_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_gain: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub return_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StrategyVerdict {
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub difference: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub difference_pct: Option<f64>,
    #[serde(default)]
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompoundInterestResult {
    #[serde(default)]
    pub years: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_contributed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub final_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub interest_earned: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub interest_contribution_pct: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub annual_return_pct: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CompoundInterestResult {
    pub fn contribution_pct(&self) -> Option<f64> {
        self.interest_contribution_pct.map(|pct| 100.0 - pct)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetirementPlanResult {
    #[serde(default)]
    pub input: RetirementInput,
    #[serde(default)]
    pub results: RetirementTotals,
    #[serde(default)]
    pub scenarios: std::collections::BTreeMap<String, RetirementScenario>,
    #[serde(default)]
    pub milestones: Vec<RetirementMilestone>,
    #[serde(default)]
    pub composition: RetirementComposition,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetirementInput {
    #[serde(default)]
    pub current_age: Option<u32>,
    #[serde(default)]
    pub retirement_age: Option<u32>,
    #[serde(default)]
    pub years_to_retirement: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetirementTotals {
    #[serde(default, deserialize_with = "lenient_number")]
    pub final_capital: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub initial_capital: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_contributions: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_interest: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetirementScenario {
    #[serde(default, deserialize_with = "lenient_number")]
    pub final_value: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetirementMilestone {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Share of the final capital coming from each source, in percent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetirementComposition {
    #[serde(default, deserialize_with = "lenient_number")]
    pub initial_pct: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub contributions_pct: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub interest_pct: Option<f64>,
}

// ---------------------------------------------------------------------------
// /api/comparar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComparisonResponse {
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Company {
    pub ticker: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub current_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub price_currency: Option<String>,
    #[serde(default)]
    pub price_converted: Option<Map<String, Value>>,
    #[serde(default)]
    pub market_cap_converted: Option<Map<String, Value>>,
    #[serde(default)]
    pub primary_source: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub quality_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub valuation_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub financial_health_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub growth_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub investment_score: Option<f64>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub confidence_level: Option<String>,
    #[serde(default)]
    pub breakdown: CompanyBreakdown,
    #[serde(default)]
    pub metrics: MetricBag,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyBreakdown {
    #[serde(default)]
    pub quality: Dimension,
    #[serde(default)]
    pub valuation: Dimension,
    #[serde(default)]
    pub health: Dimension,
    #[serde(default)]
    pub growth: Dimension,
}

impl Company {
    pub fn currency(&self) -> &str {
        self.price_currency
            .as_deref()
            .or(self.currency.as_deref())
            .unwrap_or("USD")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
}

// ---------------------------------------------------------------------------
// Exchange rate, usage limits, licenses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeRate {
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub rate: Option<f64>,
    #[serde(default)]
    pub cached: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitStatus {
    pub allowed: bool,
    #[serde(default)]
    pub remaining: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub reset_in: Option<String>,
    #[serde(default)]
    pub reset_date: Option<String>,
    #[serde(default)]
    pub license_days_left: Option<i64>,
}

impl LimitStatus {
    /// Used when the limit service itself cannot be reached.
    pub fn fail_open() -> Self {
        Self {
            allowed: true,
            ..Self::default()
        }
    }

    pub fn plan(&self) -> Plan {
        match self.plan.as_deref() {
            Some("PRO") => Plan::Pro,
            _ => Plan::Free,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Free,
    Pro,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "FREE",
            Plan::Pro => "PRO",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LicenseValidation {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// /api/top-opportunities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TopOpportunitiesResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<OpportunityPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpportunityPage {
    #[serde(default)]
    pub opportunities: Vec<Opportunity>,
    #[serde(default)]
    pub metadata: OpportunityMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Opportunity {
    pub ticker: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub rvc_score: Option<f64>,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub market_cap: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub pe_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpportunityMetadata {
    #[serde(default)]
    pub total_count: usize,
    #[serde(default, deserialize_with = "lenient_number")]
    pub average_score: Option<f64>,
    #[serde(default)]
    pub sectors_available: Vec<String>,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_analysis_decodes_with_missing_fields() {
        let payload = json!({
            "ticker": "AAPL",
            "metrics": {"pe_ratio": 28.5, "market_cap": "n/a", "is_etf": false},
            "rvc_score": {"total_score": null, "breakdown": {"calidad": {"score": 80}}}
        });
        let analysis: AnalysisResponse = serde_json::from_value(payload).unwrap();
        assert_eq!(analysis.metrics.number("pe_ratio"), Some(28.5));
        assert_eq!(analysis.metrics.number("market_cap"), None);
        assert_eq!(analysis.rvc_score.total_score, None);
        assert_eq!(analysis.rvc_score.breakdown.calidad.score, Some(80.0));
        assert!(analysis.rvc_score.breakdown.salud.metrics_used.is_empty());
        assert_eq!(analysis.currency(), "USD");
    }

    #[test]
    fn test_malformed_display_numbers_do_not_fail_decoding() {
        let response: ComparisonResponse = serde_json::from_value(json!({
            "companies": [{
                "ticker": "AAPL",
                "current_price": "N/A",
                "market_cap": "2.9e12",
                "investment_score": {"oops": true},
                "quality_score": null
            }]
        }))
        .unwrap();
        let company = &response.companies[0];
        assert_eq!(company.current_price, None);
        assert_eq!(company.market_cap, Some(2.9e12));
        assert_eq!(company.investment_score, None);
        assert_eq!(company.quality_score, None);

        let score: RvcScore =
            serde_json::from_value(json!({"total_score": "74.5"})).unwrap();
        assert_eq!(score.total_score, Some(74.5));

        let page: OpportunityPage = serde_json::from_value(json!({
            "opportunities": [{"ticker": "V", "pe_ratio": "-", "rvc_score": 76}]
        }))
        .unwrap();
        assert_eq!(page.opportunities[0].pe_ratio, None);
        assert_eq!(page.opportunities[0].rvc_score, Some(76.0));
    }

    #[test]
    fn test_analysis_allowed_only_for_equities() {
        let mut analysis = AnalysisResponse {
            ticker: "MSFT".into(),
            asset_type: Some("EQUITY".into()),
            ..Default::default()
        };
        assert!(analysis.analysis_allowed());

        analysis.analysis_allowed = Some(false);
        assert!(!analysis.analysis_allowed());

        let etf: AnalysisResponse = serde_json::from_value(json!({
            "ticker": "VOO",
            "metrics": {"is_etf": true, "asset_type": "EQUITY"}
        }))
        .unwrap();
        assert!(!etf.analysis_allowed());
    }

    #[test]
    fn test_calculation_request_is_tagged() {
        let request = CalculationRequest::Dca {
            monthly_amount: 500.0,
            years: 10,
            scenario: Scenario::Moderado,
            market_timing: MarketTiming::Normal,
            initial_amount: None,
            annual_inflation: None,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "calculation_type": "dca",
                "monthly_amount": 500.0,
                "years": 10,
                "scenario": "moderado",
                "market_timing": "normal"
            })
        );
    }

    #[test]
    fn test_manual_override_field_lists() {
        let overrides = ManualOverrides {
            applied: json!({"pe_ratio": 12.0, "roe": 0.2}),
            invalid: json!(["beta"]),
        };
        assert_eq!(overrides.applied_fields(), vec!["pe_ratio", "roe"]);
        assert_eq!(overrides.invalid_fields(), vec!["beta"]);
    }

    #[test]
    fn test_limit_status_plan() {
        let status: LimitStatus =
            serde_json::from_value(json!({"allowed": false, "remaining": 0, "limit": 200, "plan": "PRO"}))
                .unwrap();
        assert_eq!(status.plan(), Plan::Pro);
        assert!(LimitStatus::fail_open().allowed);
        assert_eq!(LimitStatus::fail_open().plan(), Plan::Free);
    }
}
