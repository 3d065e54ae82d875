use super::render_table;
use crate::core::{
    CalculationOutcome, CompoundInterestResult, DcaResult, LumpSumComparison, RetirementPlanResult,
    StrategyOutcome,
};
use crate::utils::format::{format_integer, format_text, NOT_AVAILABLE};

fn money(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("${}", format_integer(Some(v))),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn signed_pct(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{:+.1}%", v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Share of `value` in `total`, when both are usable.
fn share(value: Option<f64>, total: Option<f64>) -> Option<f64> {
    match (value, total) {
        (Some(v), Some(t)) if t.is_finite() && v.is_finite() && t > 0.0 => Some(v / t * 100.0),
        _ => None,
    }
}

pub fn render(outcome: &CalculationOutcome) -> String {
    match outcome {
        CalculationOutcome::Dca(result) => render_dca(result),
        CalculationOutcome::LumpSumVsDca(result) => render_lump_sum(result),
        CalculationOutcome::CompoundInterest(result) => render_compound(result),
        CalculationOutcome::RetirementPlan(result) => render_retirement(result),
    }
}

fn render_dca(result: &DcaResult) -> String {
    let input = &result.input;
    let totals = &result.results;
    let mut lines = vec![
        format!(
            "Dollar-cost averaging: {} per month for {} months ({} scenario, {})",
            money(input.monthly_amount),
            input
                .total_months
                .or(input.years.map(|y| y * 12))
                .map(|m| m.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            format_text(input.scenario.as_deref()),
            format_text(input.market_timing_label.as_deref()),
        ),
        format!("  Total invested  {}", money(totals.total_invested)),
        format!("  Final value     {}", money(totals.final_value)),
        format!(
            "  Total gain      {} ({})",
            money(totals.total_gain),
            signed_pct(totals.total_return_pct)
        ),
    ];

    let milestones = result.breakdown.present();
    if !milestones.is_empty() {
        lines.push("Milestones".to_string());
        for milestone in milestones {
            let years = milestone
                .years
                .map(|y| format!("{} years", y))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            let of_final = share(milestone.value, totals.final_value)
                .map(|p| format!("{:.0}% of final", p))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            lines.push(format!(
                "  {:<9} {} ({}) · invested {} · gain {}",
                years,
                money(milestone.value),
                of_final,
                money(milestone.invested),
                money(milestone.gain),
            ));
        }
    }

    push_insights(&mut lines, &result.insights);
    lines.join("\n")
}

fn push_insights(lines: &mut Vec<String>, insights: &[String]) {
    if insights.is_empty() {
        return;
    }
    lines.push("Insights".to_string());
    lines.extend(insights.iter().map(|i| format!("  - {}", i)));
}

fn is_winner(verdict: Option<&str>, strategy: &str) -> bool {
    verdict.is_some_and(|w| w.eq_ignore_ascii_case(strategy))
}

fn strategy_value(outcome: &StrategyOutcome, winner: bool) -> String {
    let value = money(outcome.final_value);
    if winner {
        format!("{} (winner)", value)
    } else {
        value
    }
}

fn render_lump_sum(result: &LumpSumComparison) -> String {
    let verdict = &result.comparison;
    let lump_wins = is_winner(verdict.winner.as_deref(), "Lump Sum");
    let dca_wins = is_winner(verdict.winner.as_deref(), "DCA");
    let (lump, dca) = (&result.lump_sum, &result.dca);

    let rows = vec![
        vec![
            "Invested".to_string(),
            format!("{} (month 1)", money(result.total_amount)),
            format!("{}/month", money(dca.monthly_amount)),
        ],
        vec![
            "Final value".to_string(),
            strategy_value(lump, lump_wins),
            strategy_value(dca, dca_wins),
        ],
        vec![
            "Total gain".to_string(),
            money(lump.total_gain),
            money(dca.total_gain),
        ],
        vec![
            "Return".to_string(),
            signed_pct(lump.return_pct),
            signed_pct(dca.return_pct),
        ],
    ];

    let mut lines = vec![
        "Lump sum vs DCA".to_string(),
        render_table(&["Metric", "Lump Sum", "DCA"], &rows),
    ];
    if let Some(winner) = verdict.winner.as_deref() {
        let pct = verdict
            .difference_pct
            .map(|p| format!(" ({:.1}%)", p))
            .unwrap_or_default();
        lines.push(format!(
            "{} comes out ahead by {}{}",
            winner,
            money(verdict.difference),
            pct
        ));
    }
    if let Some(recommendation) = verdict.recommendation.as_deref() {
        lines.push(recommendation.to_string());
    }
    lines.join("\n")
}

fn render_compound(result: &CompoundInterestResult) -> String {
    let years = result
        .years
        .map(|y| y.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let mut lines = vec![
        "Compound interest".to_string(),
        format!("  Total contributed  {}", money(result.total_contributed)),
        format!(
            "  Final value        {} after {} years",
            money(result.final_value),
            years
        ),
        format!("  Interest earned    {}", money(result.interest_earned)),
    ];

    if let (Some(interest), Some(contributions)) =
        (result.interest_contribution_pct, result.contribution_pct())
    {
        lines.push(format!(
            "  Composition        {:.1}% contributions · {:.1}% interest",
            contributions, interest
        ));
    }
    if let Some(message) = result.message.as_deref() {
        lines.push(message.to_string());
    }
    if let (Some(rate), Some(multiple)) = (
        result.annual_return_pct,
        share(result.final_value, result.total_contributed),
    ) {
        lines.push(format!(
            "At {:.0}% a year your money grew {:.2}x.",
            rate,
            multiple / 100.0 - 1.0
        ));
    }
    lines.join("\n")
}

fn render_retirement(result: &RetirementPlanResult) -> String {
    let input = &result.input;
    let totals = &result.results;
    let age = |a: Option<u32>| {
        a.map(|a| a.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    };
    let mut lines = vec![
        format!(
            "Retirement plan: age {} to {} ({} years)",
            age(input.current_age),
            age(input.retirement_age),
            age(input.years_to_retirement),
        ),
        format!("  Final capital        {}", money(totals.final_capital)),
        format!("  Initial capital      {}", money(totals.initial_capital)),
        format!("  Total contributions  {}", money(totals.total_contributions)),
        format!("  Total interest       {}", money(totals.total_interest)),
    ];

    let composition = &result.composition;
    let pct = |value: Option<f64>| match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{:.1}%", v),
        None => NOT_AVAILABLE.to_string(),
    };
    if composition.initial_pct.is_some()
        || composition.contributions_pct.is_some()
        || composition.interest_pct.is_some()
    {
        lines.push(format!(
            "  Composition          {} initial · {} contributions · {} interest",
            pct(composition.initial_pct),
            pct(composition.contributions_pct),
            pct(composition.interest_pct),
        ));
    }

    if !result.scenarios.is_empty() {
        let rows: Vec<Vec<String>> = result
            .scenarios
            .iter()
            .map(|(name, scenario)| vec![name.clone(), money(scenario.final_value)])
            .collect();
        lines.push("Scenarios".to_string());
        lines.push(render_table(&["Scenario", "Final value"], &rows));
    }

    if !result.milestones.is_empty() {
        let rows: Vec<Vec<String>> = result
            .milestones
            .iter()
            .map(|m| {
                vec![
                    format_text(m.label.as_deref()),
                    age(m.year),
                    age(m.age),
                    money(m.amount),
                ]
            })
            .collect();
        lines.push("Milestones".to_string());
        lines.push(render_table(&["Milestone", "Year", "Age", "Amount"], &rows));
    }
    lines.join("\n")
}
