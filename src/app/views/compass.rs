//! The RVC compass: where a company sits on valuation (x, 100 = cheap)
//! against quality (y, 100 = excellent).

use super::Tone;
use crate::core::AnalysisResponse;
use crate::utils::format::format_score;

const UPPER_BREAK: f64 = 70.0;
const LOWER_BREAK: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompassZone {
    SweetSpot,
    Quality,
    Premium,
    Value,
    Fair,
    Caution,
    Risky,
    Speculative,
    Overvalued,
}

impl CompassZone {
    pub fn classify(valuation: f64, quality: f64) -> Self {
        let column = band(valuation);
        match (band(quality), column) {
            (2, 2) => CompassZone::SweetSpot,
            (2, 1) => CompassZone::Quality,
            (2, _) => CompassZone::Premium,
            (1, 2) => CompassZone::Value,
            (1, 1) => CompassZone::Fair,
            (1, _) => CompassZone::Caution,
            (_, 2) => CompassZone::Risky,
            (_, 1) => CompassZone::Speculative,
            _ => CompassZone::Overvalued,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompassZone::SweetSpot => "SWEET SPOT",
            CompassZone::Quality => "QUALITY",
            CompassZone::Premium => "PREMIUM",
            CompassZone::Value => "VALUE",
            CompassZone::Fair => "FAIR",
            CompassZone::Caution => "CAUTION",
            CompassZone::Risky => "RISKY",
            CompassZone::Speculative => "SPECULATIVE",
            CompassZone::Overvalued => "OVERVALUED",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CompassZone::SweetSpot => "High quality at an attractive price",
            CompassZone::Quality => "Good quality at a reasonable valuation",
            CompassZone::Premium => "Excellent business with a rich valuation",
            CompassZone::Value => "Acceptable quality at a good price",
            CompassZone::Fair => "Balanced quality and valuation",
            CompassZone::Caution => "Average quality at a high price",
            CompassZone::Risky => "Low quality, even if cheap",
            CompassZone::Speculative => "Questionable quality, high risk",
            CompassZone::Overvalued => "Low quality at a high price, avoid",
        }
    }
}

/// 0 below 40, 1 from 40 up to 70, 2 from 70.
fn band(score: f64) -> u8 {
    if score >= UPPER_BREAK {
        2
    } else if score >= LOWER_BREAK {
        1
    } else {
        0
    }
}

/// Data confidence from the server's level and the completeness percentage.
pub fn confidence_score(level: Option<&str>, completeness: Option<f64>) -> f64 {
    let base = match level {
        Some("Alta") | Some("High") => 0.95,
        Some("Baja") | Some("Low") => 0.60,
        _ => 0.80,
    };
    base * completeness.unwrap_or(0.0).clamp(0.0, 100.0) / 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompassPoint {
    pub valuation: f64,
    pub quality: f64,
    pub rvc_score: f64,
    pub zone: CompassZone,
    pub tone: Tone,
}

impl CompassPoint {
    /// Missing dimension scores sit at 0, as on the chart.
    pub fn from_analysis(analysis: &AnalysisResponse) -> Self {
        let breakdown = &analysis.rvc_score.breakdown;
        let valuation = breakdown.valoracion.score.unwrap_or(0.0);
        let quality = breakdown.calidad.score.unwrap_or(0.0);
        let rvc_score = analysis.rvc_score.total_score.unwrap_or(0.0);
        Self {
            valuation,
            quality,
            rvc_score,
            zone: CompassZone::classify(valuation, quality),
            tone: Tone::of_score(rvc_score),
        }
    }
}

pub fn render(analysis: &AnalysisResponse) -> String {
    let point = CompassPoint::from_analysis(analysis);
    let breakdown = &analysis.rvc_score.breakdown;
    let confidence = confidence_score(
        analysis.rvc_score.confidence_level.as_deref(),
        analysis.metrics.number("data_completeness"),
    );

    let mut lines = vec![
        format!(
            "Compass: {} ({})",
            point.zone.label(),
            point.zone.description()
        ),
        format!(
            "  quality {} · valuation {} · health {} · growth {}",
            format_score(breakdown.calidad.score),
            format_score(breakdown.valoracion.score),
            format_score(breakdown.salud.score),
            format_score(breakdown.crecimiento.score),
        ),
        format!(
            "  RVC {} ({}) · data confidence {:.0}%",
            format_score(Some(point.rvc_score)),
            point.tone,
            confidence * 100.0
        ),
    ];
    lines.push(grid(point.zone));
    lines.join("\n")
}

/// Nine-cell map with the company's cell marked.
fn grid(current: CompassZone) -> String {
    const ROWS: [[CompassZone; 3]; 3] = [
        [CompassZone::Premium, CompassZone::Quality, CompassZone::SweetSpot],
        [CompassZone::Caution, CompassZone::Fair, CompassZone::Value],
        [CompassZone::Overvalued, CompassZone::Speculative, CompassZone::Risky],
    ];
    let mut out = vec!["  quality ↑   valuation → (cheaper)".to_string()];
    for row in ROWS {
        let cells: Vec<String> = row
            .iter()
            .map(|zone| {
                let marker = if *zone == current { '*' } else { ' ' };
                format!("{}{:<11}", marker, zone.label())
            })
            .collect();
        out.push(format!("  |{}|", cells.join("|")));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_grid() {
        assert_eq!(CompassZone::classify(85.0, 90.0), CompassZone::SweetSpot);
        assert_eq!(CompassZone::classify(55.0, 90.0), CompassZone::Quality);
        assert_eq!(CompassZone::classify(10.0, 90.0), CompassZone::Premium);
        assert_eq!(CompassZone::classify(85.0, 50.0), CompassZone::Value);
        assert_eq!(CompassZone::classify(55.0, 50.0), CompassZone::Fair);
        assert_eq!(CompassZone::classify(10.0, 50.0), CompassZone::Caution);
        assert_eq!(CompassZone::classify(85.0, 10.0), CompassZone::Risky);
        assert_eq!(CompassZone::classify(55.0, 10.0), CompassZone::Speculative);
        assert_eq!(CompassZone::classify(10.0, 10.0), CompassZone::Overvalued);
    }

    #[test]
    fn test_breaks_belong_to_the_upper_zone() {
        assert_eq!(CompassZone::classify(70.0, 70.0), CompassZone::SweetSpot);
        assert_eq!(CompassZone::classify(40.0, 40.0), CompassZone::Fair);
        assert_eq!(CompassZone::classify(39.9, 69.9), CompassZone::Caution);
    }

    #[test]
    fn test_confidence_score() {
        assert!((confidence_score(Some("Alta"), Some(100.0)) - 0.95).abs() < 1e-9);
        assert!((confidence_score(Some("Low"), Some(50.0)) - 0.30).abs() < 1e-9);
        assert_eq!(confidence_score(None, None), 0.0);
    }

    #[test]
    fn test_render_marks_zone() {
        let analysis: AnalysisResponse = serde_json::from_value(serde_json::json!({
            "ticker": "AAPL",
            "metrics": {"data_completeness": 90},
            "rvc_score": {
                "total_score": 78.0,
                "confidence_level": "High",
                "breakdown": {"valoracion": {"score": 72.0}, "calidad": {"score": 88.0}}
            }
        }))
        .unwrap();
        let text = render(&analysis);
        assert!(text.starts_with("Compass: SWEET SPOT"));
        assert!(text.contains("RVC 78.0 (excellent)"));
        assert!(text.contains("*SWEET SPOT"));
    }
}
