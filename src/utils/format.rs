//! Presentation formatting for values coming back from the analysis server.
//!
//! Every formatter accepts possibly-missing input and returns a printable
//! string. Missing, non-numeric and non-finite values render as [`NOT_AVAILABLE`].

use serde_json::{Map, Value};

pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_SCORE: &str = "--";

const SCALES: [(f64, &str); 3] = [(1e12, "T"), (1e9, "B"), (1e6, "M")];
const COMPACT_SCALES: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

const SUSPICIOUS_NAMES: [&str; 6] = [
    "yahoo finance",
    "finance.yahoo.com",
    "captcha",
    "temporarily unavailable",
    "will be right back",
    "service unavailable",
];

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Strict numeric read: only JSON numbers count.
pub fn json_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

/// Lenient numeric read for display: numeric strings such as `"503"` count too.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        other => json_number(other),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Fixed decimals with `,` thousands separators (en-US style).
fn format_grouped(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let mut out = String::new();
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn trim_fraction(text: String) -> String {
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn currency_symbol(currency: &str) -> &'static str {
    match currency {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        _ => "",
    }
}

/// Scales by T/B/M with two decimals: `2.5e12` becomes `2.50T`.
pub fn format_compact_scale(value: Option<f64>) -> String {
    let Some(amount) = finite(value) else {
        return NOT_AVAILABLE.to_string();
    };
    for (threshold, suffix) in SCALES {
        if amount >= threshold {
            return format!("{}{}", format_grouped(amount / threshold, 2), suffix);
        }
    }
    format_grouped(amount, 2)
}

pub fn format_market_cap(value: Option<f64>, currency: &str) -> String {
    if finite(value).is_none() {
        return NOT_AVAILABLE.to_string();
    }
    format!(
        "{}{} {}",
        currency_symbol(currency),
        format_compact_scale(value),
        currency
    )
}

pub fn format_currency_amount(value: Option<f64>, currency: &str) -> String {
    match finite(value) {
        Some(amount) => format!(
            "{}{} {}",
            currency_symbol(currency),
            format_grouped(amount, 2),
            currency
        ),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn with_conversions(
    primary: String,
    currency: &str,
    conversions: Option<&Map<String, Value>>,
    render: impl Fn(f64, &str) -> String,
) -> String {
    let extras: Vec<String> = conversions
        .into_iter()
        .flat_map(|map| map.iter())
        .filter(|(code, _)| code.as_str() != currency)
        .filter_map(|(code, amount)| coerce_number(amount).map(|a| render(a, code)))
        .collect();
    if extras.is_empty() {
        primary
    } else {
        format!("{} ({})", primary, extras.join(" | "))
    }
}

/// Price in its own currency followed by any server-side conversions.
pub fn format_price_display(
    value: Option<f64>,
    currency: &str,
    conversions: Option<&Map<String, Value>>,
) -> String {
    if finite(value).is_none() {
        return NOT_AVAILABLE.to_string();
    }
    with_conversions(
        format_currency_amount(value, currency),
        currency,
        conversions,
        |amount, code| format_currency_amount(Some(amount), code),
    )
}

pub fn format_market_cap_display(
    value: Option<f64>,
    currency: &str,
    conversions: Option<&Map<String, Value>>,
) -> String {
    if finite(value).is_none() {
        return NOT_AVAILABLE.to_string();
    }
    with_conversions(
        format_market_cap(value, currency),
        currency,
        conversions,
        |amount, code| format_market_cap(Some(amount), code),
    )
}

/// Two decimals below 10%, one decimal otherwise.
pub fn format_percentage(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => {
            let decimals = if v.abs() < 10.0 { 2 } else { 1 };
            format!("{:.*}%", decimals, v)
        }
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_ratio(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => format!("{:.2}", v),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Fixed decimals with thousands separators.
pub fn format_decimal(value: Option<f64>, decimals: usize) -> String {
    match finite(value) {
        Some(v) => format_grouped(v, decimals),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Grouped and rounded to units, used for counts and calculator amounts.
pub fn format_integer(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => format_grouped(v, 0),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Short compact notation with at most two decimals: `1234` becomes `1.23K`.
pub fn format_compact_number(value: Option<f64>) -> String {
    let Some(v) = finite(value) else {
        return NOT_AVAILABLE.to_string();
    };
    let sign = if v < 0.0 { "-" } else { "" };
    let magnitude = v.abs();
    for (threshold, suffix) in COMPACT_SCALES {
        if magnitude >= threshold {
            let scaled = trim_fraction(format!("{:.2}", magnitude / threshold));
            return format!("{}{}{}", sign, scaled, suffix);
        }
    }
    format!("{}{}", sign, trim_fraction(format!("{:.2}", magnitude)))
}

pub fn format_text(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Any JSON value as display text: strings verbatim, numbers as written.
pub fn format_value_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => format_text(Some(s)),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_score(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => format!("{:.1}", v),
        None => NO_SCORE.to_string(),
    }
}

/// Human name for a data provider id such as `fmp` or `yahoo:quote`.
pub fn format_source_name(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return "Unknown".to_string();
    };
    let normalized = raw.split(':').next().unwrap_or(raw).trim();
    match normalized {
        "yahoo" | "yfinance" => "Yahoo Finance".to_string(),
        "finviz" => "Finviz".to_string(),
        "marketwatch" => "MarketWatch".to_string(),
        "fmp" => "Financial Modeling Prep".to_string(),
        "twelvedata" | "twelve_data" => "Twelve Data".to_string(),
        "alpha_vantage" => "Alpha Vantage".to_string(),
        "fallback_example" => "Sample data".to_string(),
        "manual" => "Manual".to_string(),
        other => other.to_uppercase(),
    }
}

pub fn is_suspicious_name(name: &str) -> bool {
    let normalized = name.trim().to_lowercase();
    normalized.is_empty() || SUSPICIOUS_NAMES.iter().any(|k| normalized.contains(k))
}

/// Scrapers occasionally return an error page title as the company name.
pub fn display_company_name(name: Option<&str>) -> String {
    match name {
        Some(n) if !is_suspicious_name(n) => n.trim().to_string(),
        _ => "Name unavailable".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compact_scale_suffixes() {
        assert_eq!(format_compact_scale(Some(2.5e12)), "2.50T");
        assert_eq!(format_compact_scale(Some(1e12)), "1.00T");
        assert_eq!(format_compact_scale(Some(3.456e9)), "3.46B");
        assert_eq!(format_compact_scale(Some(7.2e6)), "7.20M");
        assert_eq!(format_compact_scale(Some(999_999.0)), "999,999.00");
        assert_eq!(format_compact_scale(Some(1500e12)), "1,500.00T");
    }

    #[test]
    fn test_missing_values_render_not_available() {
        assert_eq!(format_compact_scale(None), "N/A");
        assert_eq!(format_compact_scale(Some(f64::NAN)), "N/A");
        assert_eq!(format_market_cap(Some(f64::INFINITY), "USD"), "N/A");
        assert_eq!(format_currency_amount(None, "USD"), "N/A");
        assert_eq!(format_percentage(Some(f64::NAN)), "N/A");
        assert_eq!(format_ratio(None), "N/A");
        assert_eq!(format_integer(None), "N/A");
        assert_eq!(format_compact_number(None), "N/A");
        assert_eq!(format_text(Some("   ")), "N/A");
        assert_eq!(format_value_text(Some(&Value::Null)), "N/A");
        assert_eq!(format_price_display(None, "USD", None), "N/A");
        assert_eq!(format_market_cap_display(None, "USD", None), "N/A");
    }

    #[test]
    fn test_currency_amounts() {
        assert_eq!(format_currency_amount(Some(1234.5), "USD"), "$1,234.50 USD");
        assert_eq!(format_currency_amount(Some(-0.001), "EUR"), "€0.00 EUR");
        assert_eq!(format_currency_amount(Some(12.0), "CHF"), "12.00 CHF");
        assert_eq!(format_market_cap(Some(2.5e12), "USD"), "$2.50T USD");
    }

    #[test]
    fn test_price_display_lists_other_currencies() {
        let conversions = json!({"USD": 10.0, "EUR": 9.2, "GBP": "bad"});
        let text = format_price_display(Some(10.0), "USD", conversions.as_object());
        assert_eq!(text, "$10.00 USD (€9.20 EUR)");

        let caps = json!({"EUR": 2.3e12});
        let text = format_market_cap_display(Some(2.5e12), "USD", caps.as_object());
        assert_eq!(text, "$2.50T USD (€2.30T EUR)");
    }

    #[test]
    fn test_percentage_precision() {
        assert_eq!(format_percentage(Some(5.1234)), "5.12%");
        assert_eq!(format_percentage(Some(-9.999)), "-10.00%");
        assert_eq!(format_percentage(Some(25.55)), "25.6%");
    }

    #[test]
    fn test_compact_number() {
        assert_eq!(format_compact_number(Some(1234.0)), "1.23K");
        assert_eq!(format_compact_number(Some(1_500_000.0)), "1.5M");
        assert_eq!(format_compact_number(Some(42.0)), "42");
        assert_eq!(format_compact_number(Some(-2_000.0)), "-2K");
    }

    #[test]
    fn test_integer_grouping() {
        assert_eq!(format_integer(Some(1_234_567.4)), "1,234,567");
        assert_eq!(format_integer(Some(999.0)), "999");
        assert_eq!(format_integer(Some(-12_000.0)), "-12,000");
    }

    #[test]
    fn test_json_number_is_strict() {
        assert_eq!(json_number(&json!(1.5e9)), Some(1.5e9));
        assert_eq!(json_number(&json!("1.5")), None);
        assert_eq!(json_number(&json!(null)), None);
    }

    #[test]
    fn test_coerce_number_accepts_numeric_strings() {
        assert_eq!(coerce_number(&json!("503")), Some(503.0));
        assert_eq!(coerce_number(&json!(" 1.5e9 ")), Some(1.5e9));
        assert_eq!(coerce_number(&json!(42)), Some(42.0));
        assert_eq!(coerce_number(&json!("N/A")), None);
        assert_eq!(coerce_number(&json!("NaN")), None);
        assert_eq!(coerce_number(&json!(true)), None);
        assert_eq!(format_integer(coerce_number(&json!("1234567"))), "1,234,567");
    }

    #[test]
    fn test_score_and_text() {
        assert_eq!(format_score(Some(72.345)), "72.3");
        assert_eq!(format_score(None), "--");
        assert_eq!(format_value_text(Some(&json!("S&P 500"))), "S&P 500");
        assert_eq!(format_value_text(Some(&json!(503))), "503");
    }

    #[test]
    fn test_source_names() {
        assert_eq!(format_source_name(Some("fmp")), "Financial Modeling Prep");
        assert_eq!(format_source_name(Some("yahoo:quote")), "Yahoo Finance");
        assert_eq!(format_source_name(Some("polygon")), "POLYGON");
        assert_eq!(format_source_name(None), "Unknown");
    }

    #[test]
    fn test_company_name_filter() {
        assert_eq!(display_company_name(Some("Apple Inc.")), "Apple Inc.");
        assert_eq!(
            display_company_name(Some("Yahoo Finance - Captcha")),
            "Name unavailable"
        );
        assert_eq!(display_company_name(None), "Name unavailable");
    }
}
