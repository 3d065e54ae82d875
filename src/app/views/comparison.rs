use super::{render_table, Tone};
use crate::core::currency::CurrencyDisplay;
use crate::core::{Company, ComparisonResponse, Dimension, Result};
use crate::utils::format::{
    display_company_name, format_compact_scale, format_decimal, format_ratio, format_score,
    format_source_name, format_text, NOT_AVAILABLE,
};
use std::fmt;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationTone {
    Buy,
    Consider,
    Wait,
    Avoid,
}

impl RecommendationTone {
    /// The server sends Spanish verdicts, usually prefixed with a coloured marker.
    pub fn of(recommendation: Option<&str>) -> Self {
        let text = recommendation.unwrap_or_default();
        if text.contains("COMPRAR") || text.contains('🟢') {
            RecommendationTone::Buy
        } else if text.contains("CONSIDERAR") || text.contains('🟡') {
            RecommendationTone::Consider
        } else if text.contains("ESPERAR") || text.contains('⚠') {
            RecommendationTone::Wait
        } else {
            RecommendationTone::Avoid
        }
    }
}

impl fmt::Display for RecommendationTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecommendationTone::Buy => "buy",
            RecommendationTone::Consider => "consider",
            RecommendationTone::Wait => "wait",
            RecommendationTone::Avoid => "avoid",
        };
        f.write_str(label)
    }
}

fn medal(position: usize) -> String {
    match position {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("#{}", n),
    }
}

fn category_label(company: &Company) -> String {
    let name = format_text(company.category.name.as_deref());
    match company.category.emoji.as_deref().filter(|e| !e.is_empty()) {
        Some(emoji) => format!("{} {}", emoji, name),
        None => name,
    }
}

fn recommendation_label(company: &Company) -> String {
    let tone = RecommendationTone::of(company.recommendation.as_deref());
    format!("{} ({})", format_text(company.recommendation.as_deref()), tone)
}

fn score_cell(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{:.0} ({})", v, Tone::of_score(v)),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn percent_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}% ({})", v, Tone::of_percentage(v)),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn price_cell(company: &Company, display: &CurrencyDisplay) -> String {
    let Some(price) = company.current_price.filter(|p| p.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };
    let (amount, symbol) = display.convert(
        price,
        company.currency(),
        company.price_converted.as_ref(),
    );
    format!("{} {}", symbol, format_decimal(Some(amount), 2))
}

pub fn market_cap_cell(company: &Company, display: &CurrencyDisplay) -> String {
    let Some(cap) = company.market_cap.filter(|c| c.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };
    let (amount, symbol) = display.convert(
        cap,
        company.currency(),
        company.market_cap_converted.as_ref(),
    );
    format!("{} {}", symbol, format_compact_scale(Some(amount)))
}

fn render_ranking(companies: &[Company]) -> String {
    let mut lines = vec!["Ranking".to_string()];
    for (i, company) in companies.iter().enumerate() {
        lines.push(format!(
            "{} {}  {} · {} · {} · confidence {}",
            medal(i + 1),
            company.ticker,
            display_company_name(company.company_name.as_deref()),
            format_source_name(company.primary_source.as_deref()),
            category_label(company),
            format_text(company.confidence_level.as_deref()),
        ));
        lines.push(format!(
            "    score {} · {}",
            score_cell(company.investment_score),
            recommendation_label(company),
        ));
    }
    lines.join("\n")
}

type Cell = fn(&Company, &CurrencyDisplay) -> String;

const TABLE_SECTIONS: [(&str, &[(&str, Cell)]); 7] = [
    (
        "DECISION",
        &[
            ("Score", |c, _| score_cell(c.investment_score)),
            ("Category", |c, _| category_label(c)),
            ("Recommendation", |c, _| recommendation_label(c)),
            ("Source", |c, _| format_source_name(c.primary_source.as_deref())),
        ],
    ),
    (
        "PRICE",
        &[("Price", price_cell), ("Market cap", market_cap_cell)],
    ),
    (
        "SCORES",
        &[
            ("Quality", |c, _| score_cell(c.quality_score)),
            ("Valuation", |c, _| score_cell(c.valuation_score)),
            ("Health", |c, _| score_cell(c.financial_health_score)),
            ("Growth", |c, _| score_cell(c.growth_score)),
        ],
    ),
    (
        "BUSINESS QUALITY",
        &[
            ("ROE", |c, _| percent_cell(c.metrics.number("roe"))),
            ("ROIC", |c, _| percent_cell(c.metrics.number("roic"))),
            ("Operating margin", |c, _| {
                percent_cell(c.metrics.number("operating_margin"))
            }),
            ("Net margin", |c, _| percent_cell(c.metrics.number("net_margin"))),
        ],
    ),
    (
        "VALUATION",
        &[
            ("P/E", |c, _| format_ratio(c.metrics.number("pe_ratio"))),
            ("PEG", |c, _| format_ratio(c.metrics.number("peg_ratio"))),
            ("P/B", |c, _| format_ratio(c.metrics.number("price_to_book"))),
        ],
    ),
    (
        "FINANCIAL HEALTH",
        &[
            ("Debt/Equity", |c, _| {
                format_ratio(c.metrics.number("debt_to_equity"))
            }),
            ("Current ratio", |c, _| {
                format_ratio(c.metrics.number("current_ratio"))
            }),
            ("Quick ratio", |c, _| format_ratio(c.metrics.number("quick_ratio"))),
        ],
    ),
    (
        "GROWTH",
        &[
            ("Revenue growth", |c, _| {
                percent_cell(c.metrics.number("revenue_growth"))
            }),
            ("Earnings growth", |c, _| {
                percent_cell(c.metrics.number("earnings_growth"))
            }),
        ],
    ),
];

/// Metrics down the side, one column per ticker.
fn render_table_section(companies: &[Company], display: &CurrencyDisplay) -> String {
    let mut headers = vec!["Metric"];
    headers.extend(companies.iter().map(|c| c.ticker.as_str()));

    let mut rows = Vec::new();
    for (section, cells) in TABLE_SECTIONS {
        let mut title = vec![format!("[{}]", section)];
        title.extend(companies.iter().map(|_| String::new()));
        rows.push(title);
        for (label, cell) in cells {
            let mut row = vec![format!("  {}", label)];
            row.extend(companies.iter().map(|c| cell(c, display)));
            rows.push(row);
        }
    }
    render_table(&headers, &rows)
}

fn dimension_line(label: &str, dimension: &Dimension) -> String {
    let metrics = if dimension.metrics_used.is_empty() {
        "no data available".to_string()
    } else {
        dimension.metrics_used.join(", ")
    };
    format!("    {:<17}{:>5}  {}", label, format_score(dimension.score), metrics)
}

fn render_breakdown(companies: &[Company]) -> String {
    let mut lines = vec!["Breakdown".to_string()];
    for company in companies {
        lines.push(format!(
            "  {} {}/100 · {} · confidence {}",
            company.ticker,
            format_score(company.investment_score),
            display_company_name(company.company_name.as_deref()),
            format_text(company.confidence_level.as_deref()),
        ));
        let b = &company.breakdown;
        lines.push(dimension_line("Quality", &b.quality));
        lines.push(dimension_line("Valuation", &b.valuation));
        lines.push(dimension_line("Financial health", &b.health));
        lines.push(dimension_line("Growth", &b.growth));
    }
    lines.join("\n")
}

fn render_conclusion(companies: &[Company]) -> Option<String> {
    let best = companies.first()?;
    let mut lines = vec![
        format!("Best option: {} ({})", best.ticker, category_label(best)),
        format!(
            "  {} · confidence {} · {}",
            format_text(best.category.desc.as_deref()),
            format_text(best.confidence_level.as_deref()),
            recommendation_label(best),
        ),
    ];
    if companies.len() > 1 {
        if let Some(worst) = companies.last() {
            lines.push(format!(
                "Weakest option: {} ({}) · score {} · avoid",
                worst.ticker,
                category_label(worst),
                score_cell(worst.investment_score),
            ));
        }
    }
    Some(lines.join("\n"))
}

/// Companies come ranked from the server; the first is the best.
pub fn render(response: &ComparisonResponse, display: &CurrencyDisplay) -> String {
    let companies = &response.companies;
    let mut sections = vec![
        render_ranking(companies),
        render_table_section(companies, display),
        render_breakdown(companies),
    ];
    sections.extend(render_conclusion(companies));

    if let Some(errors) = response.errors.as_ref().filter(|e| !e.is_empty()) {
        let mut lines = vec!["Some tickers could not be compared:".to_string()];
        lines.extend(errors.iter().map(|e| format!("  - {}", e)));
        sections.push(lines.join("\n"));
    }
    sections.join("\n\n")
}

const CSV_HEADERS: [&str; 26] = [
    "ticker",
    "company",
    "investment_score",
    "category",
    "recommendation",
    "confidence",
    "source",
    "currency",
    "price",
    "market_cap",
    "quality_score",
    "valuation_score",
    "health_score",
    "growth_score",
    "roe",
    "roic",
    "operating_margin",
    "net_margin",
    "pe_ratio",
    "peg_ratio",
    "price_to_book",
    "debt_to_equity",
    "current_ratio",
    "quick_ratio",
    "revenue_growth",
    "earnings_growth",
];

fn raw(value: Option<f64>) -> String {
    value
        .filter(|v| v.is_finite())
        .map(|v| v.to_string())
        .unwrap_or_default()
}

/// Writes one row per company with raw numbers, blank when missing.
pub fn write_csv<W: io::Write>(writer: W, response: &ComparisonResponse) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADERS)?;
    for c in &response.companies {
        let mut record = vec![
            c.ticker.clone(),
            c.company_name.clone().unwrap_or_default(),
            raw(c.investment_score),
            c.category.name.clone().unwrap_or_default(),
            c.recommendation.clone().unwrap_or_default(),
            c.confidence_level.clone().unwrap_or_default(),
            c.primary_source.clone().unwrap_or_default(),
            c.currency().to_string(),
            raw(c.current_price),
            raw(c.market_cap),
            raw(c.quality_score),
            raw(c.valuation_score),
            raw(c.financial_health_score),
            raw(c.growth_score),
        ];
        record.extend(CSV_HEADERS[14..].iter().map(|key| raw(c.metrics.number(key))));
        csv.write_record(&record)?;
    }
    csv.flush()?;
    Ok(())
}
