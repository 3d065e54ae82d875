use crate::core::state::AppState;
use crate::core::{AnalysisResponse, CacheScope, Result, RvcApi};
use crate::utils::error::RvcError;
use serde_json::{Map, Number, Value};

pub fn normalize_ticker(raw: &str) -> Result<String> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(RvcError::validation("Enter a ticker"));
    }
    Ok(ticker)
}

/// Runs a full analysis and remembers the ticker for follow-up commands.
pub async fn analyze(api: &dyn RvcApi, state: &mut AppState, raw_ticker: &str) -> Result<AnalysisResponse> {
    let ticker = normalize_ticker(raw_ticker)?;
    tracing::info!("Analyzing {}", ticker);

    let analysis = api.analyze(&ticker, state.license_key()).await?;
    state.current_ticker = Some(ticker);
    Ok(analysis)
}

/// Parses `key=value` pairs. Numeric values are sent as numbers, anything
/// else as text for the server to judge.
pub fn parse_overrides<S: AsRef<str>>(pairs: &[S]) -> Result<Map<String, Value>> {
    let mut overrides = Map::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| RvcError::validation(format!("Expected key=value, got '{}'", pair)))?;
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            return Err(RvcError::validation(format!("Expected key=value, got '{}'", pair)));
        }

        let value = value
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string()));
        overrides.insert(key.to_string(), value);
    }

    if overrides.is_empty() {
        return Err(RvcError::validation("Provide at least one metric to adjust"));
    }
    Ok(overrides)
}

pub async fn apply_overrides<S: AsRef<str>>(
    api: &dyn RvcApi,
    state: &mut AppState,
    ticker: Option<&str>,
    pairs: &[S],
) -> Result<AnalysisResponse> {
    let ticker = match ticker.or(state.current_ticker.as_deref()) {
        Some(t) => normalize_ticker(t)?,
        None => return Err(RvcError::validation("Analyze a ticker first or pass --ticker")),
    };
    let overrides = parse_overrides(pairs)?;
    tracing::info!("Applying {} manual metric(s) to {}", overrides.len(), ticker);

    let analysis = api.apply_manual_metrics(&ticker, &overrides).await?;
    state.current_ticker = Some(ticker);
    Ok(analysis)
}

/// Clears the server cache for one ticker, or globally, and describes what happened.
pub async fn clear_cache(api: &dyn RvcApi, ticker: Option<&str>) -> Result<String> {
    let ticker = ticker
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty());
    let response = api.clear_cache(ticker.as_deref()).await?;

    Ok(match (response.cleared, ticker) {
        (CacheScope::Ticker, Some(t)) => format!("Cache cleared for {}", t),
        (CacheScope::Ticker, None) => "Ticker cache cleared".to_string(),
        (CacheScope::All, _) => "Global cache cleared".to_string(),
    })
}
