use crate::core::{CalculationOutcome, CalculationRequest, CompoundMode, Result, RvcApi};
use crate::utils::error::RvcError;
use serde_json::Value;

pub const MAX_YEARS: u32 = 50;
pub const MIN_SIMULATION_PATHS: u32 = 3;
pub const MAX_SIMULATION_PATHS: u32 = 10;
pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 75;
pub const MAX_INFLATION: f64 = 0.15;
pub const MIN_RETURN_OVERRIDE: f64 = -0.10;
pub const MAX_RETURN_OVERRIDE: f64 = 0.20;

fn check(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(RvcError::validation(message))
    }
}

fn check_years(years: u32) -> Result<()> {
    check(
        (1..=MAX_YEARS).contains(&years),
        "Enter a valid period (1-50 years)",
    )
}

fn check_non_negative(amounts: &[f64]) -> Result<()> {
    check(
        amounts.iter().all(|a| a.is_finite() && *a >= 0.0),
        "Amounts cannot be negative",
    )
}

fn check_inflation(inflation: Option<f64>) -> Result<()> {
    match inflation {
        Some(rate) => check(
            rate.is_finite() && (0.0..=MAX_INFLATION).contains(&rate),
            "Annual inflation must be between 0% and 15%",
        ),
        None => Ok(()),
    }
}

/// Local checks that stop a request before it reaches the server.
pub fn validate(request: &CalculationRequest) -> Result<()> {
    match request {
        CalculationRequest::Dca {
            monthly_amount,
            years,
            initial_amount,
            annual_inflation,
            ..
        } => {
            check(
                monthly_amount.is_finite() && *monthly_amount > 0.0,
                "Enter a valid monthly amount",
            )?;
            check_years(*years)?;
            check_non_negative(&[initial_amount.unwrap_or(0.0)])?;
            check_inflation(*annual_inflation)
        }
        CalculationRequest::LumpSumVsDca {
            total_amount,
            years,
            ..
        } => {
            check(
                total_amount.is_finite() && *total_amount > 0.0,
                "The total amount must be greater than 0",
            )?;
            check_years(*years)
        }
        CalculationRequest::CompoundInterest {
            initial_amount,
            monthly_amount,
            years,
            mode,
            num_paths,
            ..
        } => {
            check_non_negative(&[*initial_amount, *monthly_amount])?;
            check(
                *initial_amount > 0.0 || *monthly_amount > 0.0,
                "Enter an initial amount or a monthly contribution",
            )?;
            check_years(*years)?;
            if *mode == CompoundMode::Simulation {
                if let Some(paths) = num_paths {
                    check(
                        (MIN_SIMULATION_PATHS..=MAX_SIMULATION_PATHS).contains(paths),
                        "Simulations use between 3 and 10 paths",
                    )?;
                }
            }
            Ok(())
        }
        CalculationRequest::RetirementPlan {
            current_age,
            retirement_age,
            initial_amount,
            monthly_amount,
            annual_inflation,
            annual_return_override,
            ..
        } => {
            check(
                (MIN_AGE..=MAX_AGE).contains(current_age),
                "Current age must be between 18 and 75",
            )?;
            check(
                retirement_age > current_age && *retirement_age <= MAX_AGE,
                "Retirement age must be above the current age and at most 75",
            )?;
            check_non_negative(&[*initial_amount, *monthly_amount])?;
            if let Some(rate) = annual_return_override {
                check(
                    rate.is_finite() && (MIN_RETURN_OVERRIDE..=MAX_RETURN_OVERRIDE).contains(rate),
                    "The annual return must be between -10% and 20%",
                )?;
            }
            check_inflation(Some(*annual_inflation))
        }
    }
}

/// Decodes `result` according to the request that produced it.
pub fn decode_outcome(request: &CalculationRequest, result: Value) -> Result<CalculationOutcome> {
    let outcome = match request {
        CalculationRequest::Dca { .. } => CalculationOutcome::Dca(serde_json::from_value(result)?),
        CalculationRequest::LumpSumVsDca { .. } => {
            CalculationOutcome::LumpSumVsDca(serde_json::from_value(result)?)
        }
        CalculationRequest::CompoundInterest { .. } => {
            CalculationOutcome::CompoundInterest(serde_json::from_value(result)?)
        }
        CalculationRequest::RetirementPlan { .. } => {
            CalculationOutcome::RetirementPlan(serde_json::from_value(result)?)
        }
    };
    Ok(outcome)
}

pub async fn calculate(api: &dyn RvcApi, request: &CalculationRequest) -> Result<CalculationOutcome> {
    validate(request)?;
    tracing::debug!("Running {} calculation", request.kind());

    let response = api.calculate(request).await?;
    if let Some(kind) = response.calculation_type.as_deref() {
        if kind != request.kind() {
            tracing::warn!("Asked for {} but the server answered {}", request.kind(), kind);
        }
    }
    decode_outcome(request, response.result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MarketTiming, Scenario};
    use serde_json::json;

    fn dca(monthly_amount: f64, years: u32) -> CalculationRequest {
        CalculationRequest::Dca {
            monthly_amount,
            years,
            scenario: Scenario::Moderado,
            market_timing: MarketTiming::Normal,
            initial_amount: None,
            annual_inflation: None,
        }
    }

    fn compound(initial: f64, monthly: f64, paths: Option<u32>) -> CalculationRequest {
        CalculationRequest::CompoundInterest {
            initial_amount: initial,
            monthly_amount: monthly,
            years: 10,
            scenario: Scenario::Moderado,
            mode: CompoundMode::Simulation,
            num_paths: paths,
        }
    }

    fn retirement(current_age: u32, retirement_age: u32, override_rate: Option<f64>) -> CalculationRequest {
        CalculationRequest::RetirementPlan {
            current_age,
            retirement_age,
            initial_amount: 10_000.0,
            monthly_amount: 300.0,
            scenario: Scenario::Moderado,
            annual_inflation: 0.03,
            annual_return_override: override_rate,
        }
    }

    #[test]
    fn test_dca_rules() {
        assert!(validate(&dca(500.0, 10)).is_ok());
        assert!(validate(&dca(0.0, 10)).is_err());
        assert!(validate(&dca(500.0, 0)).is_err());
        assert!(validate(&dca(500.0, 51)).is_err());
        assert!(validate(&dca(500.0, 50)).is_ok());
    }

    #[test]
    fn test_lump_sum_rules() {
        let ok = CalculationRequest::LumpSumVsDca {
            total_amount: 10_000.0,
            years: 5,
            scenario: Scenario::Conservador,
        };
        assert!(validate(&ok).is_ok());
        let zero = CalculationRequest::LumpSumVsDca {
            total_amount: 0.0,
            years: 5,
            scenario: Scenario::Conservador,
        };
        assert!(validate(&zero).is_err());
    }

    #[test]
    fn test_compound_rules() {
        assert!(validate(&compound(1000.0, 0.0, Some(5))).is_ok());
        assert!(validate(&compound(0.0, 0.0, None)).is_err());
        assert!(validate(&compound(-1.0, 100.0, None)).is_err());
        assert!(validate(&compound(1000.0, 0.0, Some(2))).is_err());
        assert!(validate(&compound(1000.0, 0.0, Some(11))).is_err());
    }

    #[test]
    fn test_retirement_rules() {
        assert!(validate(&retirement(35, 65, None)).is_ok());
        assert!(validate(&retirement(17, 65, None)).is_err());
        assert!(validate(&retirement(40, 40, None)).is_err());
        assert!(validate(&retirement(40, 76, None)).is_err());
        assert!(validate(&retirement(35, 65, Some(0.2))).is_ok());
        assert!(validate(&retirement(35, 65, Some(0.25))).is_err());
        assert!(validate(&retirement(35, 65, Some(-0.11))).is_err());
    }

    #[test]
    fn test_decode_by_request_kind() {
        let result = json!({
            "total_contributed": 13000.0,
            "final_value": 21000.0,
            "interest_earned": 8000.0,
            "interest_contribution_pct": 38.1
        });
        match decode_outcome(&compound(1000.0, 100.0, None), result).unwrap() {
            CalculationOutcome::CompoundInterest(r) => {
                assert_eq!(r.final_value, Some(21000.0));
                assert!((r.contribution_pct().unwrap() - 61.9).abs() < 1e-9);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
