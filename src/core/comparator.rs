use crate::core::{ComparisonResponse, Result, RvcApi};
use crate::utils::error::RvcError;
use std::collections::HashSet;

pub const MIN_TICKERS: usize = 2;
pub const MAX_TICKERS: usize = 5;

/// Normalizes ticker inputs and rejects sets the server would refuse.
pub fn validate_tickers<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<String>> {
    let tickers: Vec<String> = inputs
        .iter()
        .map(|t| t.as_ref().trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect();

    if tickers.len() < MIN_TICKERS {
        return Err(RvcError::validation(
            "Enter at least 2 tickers to compare",
        ));
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = tickers.iter().find(|t| !seen.insert(t.as_str())) {
        return Err(RvcError::validation(format!(
            "Duplicate ticker {} in comparison",
            duplicate
        )));
    }

    if tickers.len() > MAX_TICKERS {
        return Err(RvcError::validation(format!(
            "At most {} tickers can be compared at once",
            MAX_TICKERS
        )));
    }

    Ok(tickers)
}

/// Validates locally, then asks the server to rank the companies.
pub async fn compare<S: AsRef<str>>(
    api: &dyn RvcApi,
    inputs: &[S],
    license_key: Option<&str>,
) -> Result<ComparisonResponse> {
    let tickers = validate_tickers(inputs)?;
    tracing::info!("Comparing {}", tickers.join(", "));

    let response = api.compare(&tickers, license_key).await?;
    if response.companies.is_empty() {
        return Err(RvcError::Api {
            status: 200,
            message: "No data was returned for any ticker".to_string(),
        });
    }
    if let Some(errors) = response.errors.as_ref().filter(|e| !e.is_empty()) {
        tracing::warn!("Comparison returned {} ticker error(s)", errors.len());
    }
    Ok(response)
}
