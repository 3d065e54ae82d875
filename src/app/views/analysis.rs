use super::{compass, render_table, ScoreBand};
use crate::core::{AnalysisResponse, Dimension, MetricBag};
use crate::utils::format::{
    format_compact_number, format_currency_amount, format_integer, format_market_cap,
    format_market_cap_display, format_percentage, format_price_display, format_ratio,
    format_score, format_source_name, format_text, format_value_text, is_suspicious_name,
    coerce_number, NOT_AVAILABLE,
};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldFormat {
    Price,
    NavPrice,
    MarketCap,
    PlainMarketCap,
    Percent,
    Ratio,
    Integer,
    Compact,
    Text,
}

struct Field {
    key: &'static str,
    label: &'static str,
    format: FieldFormat,
}

const fn field(key: &'static str, label: &'static str, format: FieldFormat) -> Field {
    Field { key, label, format }
}

const EQUITY_FIELDS: [Field; 14] = [
    field("current_price", "Price", FieldFormat::Price),
    field("market_cap", "Market Cap", FieldFormat::MarketCap),
    field("pe_ratio", "P/E Ratio", FieldFormat::Ratio),
    field("peg_ratio", "PEG Ratio", FieldFormat::Ratio),
    field("price_to_book", "P/B Ratio", FieldFormat::Ratio),
    field("roe", "ROE", FieldFormat::Percent),
    field("roic", "ROIC", FieldFormat::Percent),
    field("operating_margin", "Op. Margin", FieldFormat::Percent),
    field("net_margin", "Net Margin", FieldFormat::Percent),
    field("debt_to_equity", "Debt/Equity", FieldFormat::Ratio),
    field("current_ratio", "Current Ratio", FieldFormat::Ratio),
    field("quick_ratio", "Quick Ratio", FieldFormat::Ratio),
    field("revenue_growth", "Rev. Growth", FieldFormat::Percent),
    field("earnings_growth", "Earn. Growth", FieldFormat::Percent),
];

const ETF_FIELDS: [Field; 10] = [
    field("current_price", "Market Price", FieldFormat::Price),
    field("nav", "NAV", FieldFormat::NavPrice),
    field("expense_ratio", "Expense Ratio", FieldFormat::Percent),
    field("ytd_return", "YTD Return", FieldFormat::Percent),
    field("premium_discount", "Premium/Discount", FieldFormat::Percent),
    field("assets_under_management", "AUM", FieldFormat::PlainMarketCap),
    field("dividend_yield", "Dividend Yield", FieldFormat::Percent),
    field("holdings_count", "Holdings", FieldFormat::Integer),
    field("index_tracked", "Index", FieldFormat::Text),
    field("volume", "Daily Volume", FieldFormat::Compact),
];

/// Alternative keys tried, in order, when a growth metric is absent.
fn fallbacks(key: &str) -> &'static [&'static str] {
    match key {
        "revenue_growth" => &["revenue_growth_5y", "revenue_growth_qoq"],
        "earnings_growth" => &[
            "earnings_growth_this_y",
            "earnings_growth_next_y",
            "earnings_growth_next_5y",
            "earnings_growth_qoq",
        ],
        _ => &[],
    }
}

/// Resolves a field, following fallbacks only when the key is absent
/// (an explicit `null` is kept).
fn lookup<'a>(metrics: &'a MetricBag, key: &'static str) -> (Option<&'a Value>, &'static str) {
    if let Some(value) = metrics.0.get(key) {
        return (Some(value), key);
    }
    for alt in fallbacks(key) {
        if let Some(value) = metrics.0.get(*alt) {
            return (Some(value), *alt);
        }
    }
    (None, key)
}

fn render_value(metrics: &MetricBag, field: &Field, value: Option<&Value>, currency: &str) -> String {
    let number = value.and_then(coerce_number);
    let nav_currency = metrics.text("nav_currency").unwrap_or(currency);
    match field.format {
        FieldFormat::Price => {
            format_price_display(number, currency, metrics.object("price_converted"))
        }
        FieldFormat::NavPrice => format_currency_amount(number, nav_currency),
        FieldFormat::MarketCap => {
            format_market_cap_display(number, currency, metrics.object("market_cap_converted"))
        }
        FieldFormat::PlainMarketCap => format_market_cap(number, currency),
        FieldFormat::Percent => format_percentage(number),
        FieldFormat::Ratio => format_ratio(number),
        FieldFormat::Integer => format_integer(number),
        FieldFormat::Compact => format_compact_number(number),
        FieldFormat::Text => format_value_text(value),
    }
}

fn metric_rows(analysis: &AnalysisResponse) -> Vec<Vec<String>> {
    let metrics = &analysis.metrics;
    let currency = analysis.currency();
    let provenance = metrics.object("provenance");
    let fields: &[Field] = if analysis.is_etf() {
        &ETF_FIELDS
    } else {
        &EQUITY_FIELDS
    };

    fields
        .iter()
        .map(|field| {
            let (value, source_key) = lookup(metrics, field.key);
            let label = match field.format {
                FieldFormat::Price | FieldFormat::MarketCap => {
                    format!("{} ({})", field.label, currency)
                }
                FieldFormat::NavPrice => format!(
                    "{} ({})",
                    field.label,
                    metrics.text("nav_currency").unwrap_or(currency)
                ),
                _ => field.label.to_string(),
            };
            let source = provenance
                .and_then(|p| p.get(source_key))
                .and_then(Value::as_str);
            vec![
                label,
                render_value(metrics, field, value, currency),
                format_source_name(source),
            ]
        })
        .collect()
}

fn sector_line(analysis: &AnalysisResponse) -> String {
    match analysis.sector.as_deref().map(str::trim) {
        Some(sector) if !sector.is_empty() && sector != "Desconocido" && sector != "Unknown" => {
            sector.to_string()
        }
        _ => {
            let last_tried = analysis
                .metrics
                .object("provenance")
                .and_then(|p| p.get("sector"))
                .and_then(Value::as_str)
                .or_else(|| analysis.metrics.text("primary_source"));
            format!("no sector data ({})", format_source_name(last_tried))
        }
    }
}

fn asset_type_label(analysis: &AnalysisResponse) -> Option<String> {
    if analysis.is_etf() {
        return Some("ETF".to_string());
    }
    analysis
        .metrics
        .text("asset_type_label")
        .or_else(|| analysis.effective_asset_type())
        .map(str::to_string)
}

fn dimension_line(name: &str, dimension: &Dimension) -> String {
    let used = if dimension.metrics_used.is_empty() {
        "no data".to_string()
    } else {
        dimension.metrics_used.join(", ")
    };
    format!(
        "  {:<12} {:>5} [{}]  {}",
        name,
        format_score(dimension.score),
        ScoreBand::of(dimension.score),
        used
    )
}

pub fn render(analysis: &AnalysisResponse) -> String {
    let metrics = &analysis.metrics;
    let allowed = analysis.analysis_allowed();
    let score = &analysis.rvc_score;

    let title = analysis
        .company_name
        .as_deref()
        .filter(|n| !is_suspicious_name(n))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Analysis of {}", analysis.ticker));

    let mut out = vec![format!("{} [{}]", title, analysis.ticker)];

    let mut badges = vec![
        format!("Source: {}", format_source_name(metrics.text("primary_source"))),
        format!("Sector: {}", sector_line(analysis)),
    ];
    if let Some(asset_type) = asset_type_label(analysis) {
        badges.push(format!("Type: {}", asset_type));
    }
    badges.push(format!(
        "Confidence: {}",
        format_text(score.confidence_level.as_deref())
    ));
    out.push(badges.join(" | "));
    if metrics.text("primary_source") == Some("fallback_example") {
        out.push("Warning: showing sample data, live sources were unavailable".to_string());
    }

    // ETF scores replace the equity classification when present.
    let etf_score = analysis
        .etf_summary
        .as_ref()
        .and_then(|s| s.score.as_ref())
        .filter(|s| s.total_score.is_some());
    let classification = match etf_score {
        Some(etf) if analysis.is_etf() => etf.label.clone().unwrap_or_else(|| "ETF".to_string()),
        _ => format_text(score.classification.as_deref()),
    };

    out.push(String::new());
    out.push(format!(
        "RVC score: {} ({}){}",
        format_score(score.total_score),
        ScoreBand::of(score.total_score),
        if allowed { "" } else { " [limited analysis]" }
    ));
    out.push(format!("Classification: {}", classification));
    out.push(format!(
        "Recommendation: {}",
        format_text(score.recommendation.as_deref())
    ));

    if allowed {
        let breakdown = &score.breakdown;
        out.push(String::new());
        out.push("Dimensions:".to_string());
        out.push(dimension_line("Valuation", &breakdown.valoracion));
        out.push(dimension_line("Quality", &breakdown.calidad));
        out.push(dimension_line("Health", &breakdown.salud));
        out.push(dimension_line("Growth", &breakdown.crecimiento));
    } else {
        out.push("The full RVC breakdown is only available for individual stocks.".to_string());
    }

    out.push(String::new());
    out.push(render_table(&["Metric", "Value", "Source"], &metric_rows(analysis)));

    let completeness = metrics
        .number("data_completeness")
        .map(|c| format!("{:.0}%", c))
        .unwrap_or_else(|| "0%".to_string());
    match metrics.text("scraped_at") {
        Some(at) => out.push(format!("Data completeness: {} | Data fetched: {}", completeness, at)),
        None => out.push(format!("Data completeness: {}", completeness)),
    }

    let warnings = metrics.strings("warnings");
    if !warnings.is_empty() {
        out.push(String::new());
        out.push("Warnings:".to_string());
        out.extend(warnings.iter().map(|w| format!("  - {}", w)));
    }

    if analysis.is_etf() {
        out.push(String::new());
        out.push(etf_profile(analysis));
    }

    if let Some(overrides) = &analysis.manual_overrides {
        let applied = overrides.applied_fields();
        let invalid = overrides.invalid_fields();
        out.push(String::new());
        out.push(format!(
            "Manual metrics applied: {}",
            if applied.is_empty() { NOT_AVAILABLE.to_string() } else { applied.join(", ") }
        ));
        if !invalid.is_empty() {
            out.push(format!("Rejected: {}", invalid.join(", ")));
        }
    }

    if allowed {
        out.push(String::new());
        out.push(compass::render(analysis));
    }

    out.join("\n")
}

fn etf_profile(analysis: &AnalysisResponse) -> String {
    let profile = analysis.metrics.object("etf_profile");
    let text = |key: &str| profile.and_then(|p| p.get(key)).and_then(Value::as_str);

    let description = text("description")
        .or(analysis.rvc_score.recommendation.as_deref())
        .unwrap_or("ETF detected.");
    let mut lines = vec!["ETF profile:".to_string(), format!("  {}", description)];

    let category = text("category").or_else(|| analysis.metrics.text("category"));
    let details = [
        ("Category", category),
        ("Provider", text("provider")),
        ("Data source", text("data_source")),
    ];
    lines.extend(
        details
            .iter()
            .filter_map(|(label, value)| value.map(|v| format!("  {}: {}", label, v))),
    );
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn equity() -> AnalysisResponse {
        serde_json::from_value(json!({
            "ticker": "AAPL",
            "company_name": "Apple Inc.",
            "sector": "Technology",
            "asset_type": "EQUITY",
            "metrics": {
                "primary_source": "yahoo",
                "current_price": 189.5,
                "market_cap": 2.95e12,
                "pe_ratio": 29.1,
                "roe": 147.2,
                "revenue_growth_5y": 8.4,
                "earnings_growth": null,
                "earnings_growth_qoq": 12.0,
                "provenance": {"revenue_growth_5y": "finviz", "pe_ratio": "fmp"},
                "data_completeness": 85,
                "warnings": ["ROIC missing from every source"]
            },
            "rvc_score": {
                "total_score": 72.4,
                "classification": "Good",
                "recommendation": "Consider",
                "confidence_level": "High",
                "breakdown": {
                    "valoracion": {"score": 55.0, "metrics_used": ["pe_ratio"]},
                    "calidad": {"score": 85.0, "metrics_used": ["roe", "roic"]}
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_equity_render() {
        let text = render(&equity());
        assert!(text.starts_with("Apple Inc. [AAPL]"));
        assert!(text.contains("Source: Yahoo Finance | Sector: Technology | Type: EQUITY | Confidence: High"));
        assert!(text.contains("RVC score: 72.4 (high)"));
        assert!(text.contains("Health"));
        assert!(text.contains("no data"));
        assert!(text.contains("$2.95T USD"));
        assert!(text.contains("Compass: QUALITY"));
        assert!(text.contains("  - ROIC missing from every source"));
    }

    #[test]
    fn test_growth_fallbacks_only_for_absent_keys() {
        let analysis = equity();
        let (value, key) = lookup(&analysis.metrics, "revenue_growth");
        assert_eq!(key, "revenue_growth_5y");
        assert_eq!(value, Some(&json!(8.4)));

        // An explicit null does not trigger the fallback chain.
        let (value, key) = lookup(&analysis.metrics, "earnings_growth");
        assert_eq!(key, "earnings_growth");
        assert_eq!(value, Some(&Value::Null));

        let rows = metric_rows(&analysis);
        let revenue = rows.iter().find(|r| r[0] == "Rev. Growth").unwrap();
        assert_eq!(revenue[1], "8.40%");
        assert_eq!(revenue[2], "Finviz");
        let earnings = rows.iter().find(|r| r[0] == "Earn. Growth").unwrap();
        assert_eq!(earnings[1], "N/A");
    }

    #[test]
    fn test_missing_sector_names_last_source() {
        let mut analysis = equity();
        analysis.sector = None;
        assert_eq!(sector_line(&analysis), "no sector data (Yahoo Finance)");

        analysis.metrics.0.insert(
            "provenance".to_string(),
            json!({"sector": "finviz:profile"}),
        );
        assert_eq!(sector_line(&analysis), "no sector data (Finviz)");
    }

    #[test]
    fn test_etf_render_is_limited() {
        let analysis: AnalysisResponse = serde_json::from_value(json!({
            "ticker": "VOO",
            "company_name": "Vanguard S&P 500 ETF",
            "metrics": {
                "is_etf": true,
                "asset_type": "ETF",
                "expense_ratio": 0.03,
                "holdings_count": 503,
                "index_tracked": "S&P 500",
                "etf_profile": {"provider": "Vanguard", "category": "Large Blend"}
            },
            "rvc_score": {"total_score": null, "recommendation": "Core holding"},
            "etf_summary": {"score": {"total_score": 81.0, "label": "Core ETF"}}
        }))
        .unwrap();

        let text = render(&analysis);
        assert!(text.contains("Type: ETF"));
        assert!(text.contains("RVC score: -- (unknown) [limited analysis]"));
        assert!(text.contains("Classification: Core ETF"));
        assert!(!text.contains("Dimensions:"));
        assert!(!text.contains("Compass:"));
        assert!(text.contains("Expense Ratio"));
        assert!(text.contains("503"));
        assert!(text.contains("  Provider: Vanguard"));
        assert!(text.contains("  Category: Large Blend"));
    }

    #[test]
    fn test_numeric_strings_are_rendered() {
        let analysis: AnalysisResponse = serde_json::from_value(json!({
            "ticker": "VOO",
            "metrics": {
                "is_etf": true,
                "asset_type": "ETF",
                "holdings_count": "503",
                "volume": "1250000",
                "expense_ratio": "N/A"
            }
        }))
        .unwrap();

        let text = render(&analysis);
        let row = |label: &str| {
            text.lines()
                .find(|l| l.starts_with(label))
                .unwrap_or_default()
                .to_string()
        };
        assert!(row("Holdings").contains("503"));
        assert!(row("Daily Volume").contains("1.25M"));
        assert!(row("Expense Ratio").contains("N/A"));
    }

    #[test]
    fn test_suspicious_name_falls_back_to_ticker() {
        let mut analysis = equity();
        analysis.company_name = Some("Yahoo Finance - Captcha".to_string());
        assert!(render(&analysis).starts_with("Analysis of AAPL [AAPL]"));
    }
}
