use super::render_table;
use crate::core::{Opportunity, OpportunityPage, Result};
use crate::utils::format::{format_compact_scale, format_decimal, format_score, format_text};
use std::io;

const EMPTY: &str = "-";

fn rank(position: usize) -> String {
    match position {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => n.to_string(),
    }
}

fn score_class(score: f64) -> &'static str {
    if score >= 80.0 {
        "excellent"
    } else if score >= 70.0 {
        "good"
    } else if score >= 60.0 {
        "fair"
    } else {
        "poor"
    }
}

fn score_cell(score: Option<f64>) -> String {
    match score.filter(|s| s.is_finite()) {
        Some(s) => format!("{:.1} ({})", s, score_class(s)),
        None => EMPTY.to_string(),
    }
}

fn price_cell(price: Option<f64>) -> String {
    match price.filter(|p| p.is_finite()) {
        Some(p) => format!("${}", format_decimal(Some(p), 2)),
        None => EMPTY.to_string(),
    }
}

/// `$2.9T`, `$310.4B`, `$850.0M`.
fn market_cap_cell(cap: Option<f64>) -> String {
    let Some(cap) = cap.filter(|c| c.is_finite()) else {
        return EMPTY.to_string();
    };
    for (threshold, suffix) in [(1e12, "T"), (1e9, "B"), (1e6, "M")] {
        if cap >= threshold {
            return format!("${:.1}{}", cap / threshold, suffix);
        }
    }
    format!("${}", format_compact_scale(Some(cap)))
}

fn pe_cell(pe: Option<f64>) -> String {
    match pe.filter(|p| p.is_finite()) {
        Some(p) => format!("{:.1}", p),
        None => EMPTY.to_string(),
    }
}

fn row(position: usize, o: &Opportunity) -> Vec<String> {
    vec![
        rank(position),
        o.ticker.clone(),
        o.company_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| o.ticker.clone()),
        score_cell(o.rvc_score),
        format_text(o.classification.as_deref()),
        format_text(o.sector.as_deref()),
        price_cell(o.current_price),
        market_cap_cell(o.market_cap),
        pe_cell(o.pe_ratio),
    ]
}

pub fn render(page: &OpportunityPage) -> String {
    let meta = &page.metadata;
    let found = page.opportunities.len();
    let mut lines = vec![
        format!(
            "{} {} found",
            found,
            if found == 1 { "opportunity" } else { "opportunities" }
        ),
        format!(
            "Total analysed: {} · Average score: {} · Sectors: {} · Top pick: {}",
            meta.total_count,
            format_score(meta.average_score),
            meta.sectors_available.len(),
            page.opportunities
                .first()
                .map(|o| o.ticker.as_str())
                .unwrap_or(EMPTY),
        ),
    ];
    if page.opportunities.is_empty() {
        lines.push("No opportunities match these filters.".to_string());
        return lines.join("\n");
    }

    let rows: Vec<Vec<String>> = page
        .opportunities
        .iter()
        .enumerate()
        .map(|(i, o)| row(i + 1, o))
        .collect();
    lines.push(String::new());
    lines.push(render_table(
        &[
            "#",
            "Ticker",
            "Company",
            "RVC score",
            "Classification",
            "Sector",
            "Price",
            "Market cap",
            "P/E",
        ],
        &rows,
    ));
    if let Some(generated_at) = &meta.generated_at {
        lines.push(format!("Generated at {}", generated_at));
    }
    lines.join("\n")
}

/// One CSV row per opportunity, serialized straight from the decoded records.
pub fn write_csv<W: io::Write>(writer: W, page: &OpportunityPage) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for opportunity in &page.opportunities {
        csv.serialize(opportunity)?;
    }
    csv.flush()?;
    Ok(())
}
